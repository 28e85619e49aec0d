//! Outstanding proof claims awaiting a verdict.

use std::collections::HashMap;
use trackid_types::{Identity, ProofKey, ProofStatement, PublicKey, UserId};

/// One claim to verify, detached from the identity so it can move into its own task.
#[derive(Clone, Debug)]
pub struct ProofProspect {
    pub uid: UserId,
    pub public_key: PublicKey,
    pub statement: ProofStatement,
    /// Seqno of a later statement with the same key, if one exists.
    pub superseded_by: Option<u64>,
}

impl ProofProspect {
    pub fn key(&self) -> &ProofKey {
        &self.statement.key
    }
}

/// Build one prospect per statement in `identity`'s proof table, in table order.
pub fn prospects_for(identity: &Identity) -> Vec<ProofProspect> {
    let mut newest: HashMap<&ProofKey, u64> = HashMap::new();
    for st in &identity.proofs {
        let seqno = newest.entry(&st.key).or_insert(st.seqno);
        *seqno = (*seqno).max(st.seqno);
    }

    identity
        .proofs
        .iter()
        .map(|st| {
            let latest = newest.get(&st.key).copied().unwrap_or(st.seqno);
            ProofProspect {
                uid: identity.id.clone(),
                public_key: identity.public_key.clone(),
                statement: st.clone(),
                superseded_by: (latest > st.seqno).then_some(latest),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackid_types::{ProofType, Signature, Username};

    fn statement(ty: ProofType, value: &str, seqno: u64) -> ProofStatement {
        ProofStatement {
            key: ProofKey::new(ty, value),
            remote: String::new(),
            seqno,
            sig_id: String::new(),
            signature: Signature([0u8; 64]),
            revoked: false,
        }
    }

    #[test]
    fn older_duplicates_are_marked_superseded() {
        let identity = Identity {
            id: UserId::parse(&"1".repeat(32)).unwrap(),
            username: Username::parse("bob").unwrap(),
            public_key: PublicKey([2u8; 32]),
            proofs: vec![
                statement(ProofType::Twitter, "bob", 1),
                statement(ProofType::Github, "bob", 2),
                statement(ProofType::Twitter, "bob", 5),
            ],
        };
        let prospects = prospects_for(&identity);
        assert_eq!(prospects.len(), 3);
        assert_eq!(prospects[0].superseded_by, Some(5));
        assert_eq!(prospects[1].superseded_by, None);
        assert_eq!(prospects[2].superseded_by, None);
    }
}
