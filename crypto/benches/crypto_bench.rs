use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trackid_crypto::sign::TRACK_DOMAIN;
use trackid_types::{Identity, ProofKey, ProofType, UserId, Username};

fn ed25519_sign_bench(c: &mut Criterion) {
    let kp = trackid_crypto::keypair_from_seed(&[1u8; 32]);
    let msg = [42u8; 512];

    c.bench_function("ed25519_sign_512B", |b| {
        b.iter(|| trackid_crypto::sign_message(TRACK_DOMAIN, black_box(&msg), &kp.private))
    });
}

fn ed25519_verify_bench(c: &mut Criterion) {
    let kp = trackid_crypto::keypair_from_seed(&[1u8; 32]);
    let msg = [42u8; 512];
    let sig = trackid_crypto::sign_message(TRACK_DOMAIN, &msg, &kp.private);

    c.bench_function("ed25519_verify_512B", |b| {
        b.iter(|| trackid_crypto::verify_signature(TRACK_DOMAIN, black_box(&msg), &sig, &kp.public))
    });
}

fn verify_proof_bench(c: &mut Criterion) {
    let kp = trackid_crypto::keypair_from_seed(&[2u8; 32]);
    let uid = UserId::from_public_key(&kp.public);
    let st = trackid_crypto::sign_proof(
        &uid,
        ProofKey::new(ProofType::Github, "alice"),
        "https://gist.github.com/alice/1",
        1,
        &kp.private,
    );
    let identity = Identity {
        id: uid,
        username: Username::parse("alice").unwrap(),
        public_key: kp.public,
        proofs: vec![st.clone()],
    };

    c.bench_function("verify_proof", |b| {
        b.iter(|| trackid_crypto::verify_proof(black_box(&identity), &st))
    });
}

criterion_group!(benches, ed25519_sign_bench, ed25519_verify_bench, verify_proof_bench);
criterion_main!(benches);
