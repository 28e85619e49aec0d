use proptest::prelude::*;

use trackid_types::{ProofKey, ProofType, PublicKey, Timestamp, UserId, Username};

proptest! {
    /// UserId parse -> as_str -> parse produces the same id.
    #[test]
    fn user_id_roundtrip(bytes in prop::array::uniform16(0u8..)) {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        let id = UserId::parse(&hex).unwrap();
        prop_assert_eq!(UserId::parse(id.as_str()).unwrap(), id);
    }

    /// Any 32-byte public key maps to a well-formed user id.
    #[test]
    fn derived_user_ids_are_valid(bytes in prop::array::uniform32(0u8..)) {
        let id = UserId::from_public_key(&PublicKey(bytes));
        prop_assert!(UserId::parse(id.as_str()).is_ok());
    }

    /// Usernames built from the allowed alphabet always parse, and parsing is idempotent.
    #[test]
    fn username_parse_idempotent(raw in "[a-zA-Z0-9_]{2,16}") {
        let name = Username::parse(&raw).unwrap();
        prop_assert_eq!(Username::parse(name.as_str()).unwrap(), name);
    }

    /// ProofKey display -> parse produces an equal key.
    #[test]
    fn proof_key_display_parse(value in "[a-z0-9.]{1,20}", idx in 0usize..7) {
        let key = ProofKey::new(ProofType::KNOWN[idx].clone(), value);
        prop_assert_eq!(ProofKey::parse(&key.to_string()).unwrap(), key);
    }

    /// has_expired agrees with elapsed_since.
    #[test]
    fn expiry_consistent(start in 0u64..1_000_000, dur in 0u64..1_000_000, now in 0u64..3_000_000) {
        let t = Timestamp::new(start);
        let now = Timestamp::new(now);
        prop_assert_eq!(t.has_expired(dur, now), now.as_secs() >= start + dur);
    }
}
