//! HttpDirectory against a local in-memory directory server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use trackid_crypto::{keypair_from_seed, sign_proof};
use trackid_directory::{DirectoryError, HttpDirectory, IdentityDirectory};
use trackid_track::{build_statement, sign, TrackSet, TrackingStatement};
use trackid_types::{Identity, ProofKey, ProofType, Timestamp, UserId, Username};

#[derive(Default)]
struct Store {
    identities: HashMap<String, Identity>,
    statements: HashMap<(String, String), serde_json::Value>,
}

type Shared = Arc<Mutex<Store>>;

async fn by_name(State(s): State<Shared>, Path(name): Path<String>) -> Response {
    let store = s.lock().unwrap();
    match store.identities.values().find(|i| i.username.as_str() == name) {
        Some(i) => Json(serde_json::json!({ "uid": i.id })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn by_proof(State(s): State<Shared>, Path((ty, value)): Path<(String, String)>) -> Response {
    let store = s.lock().unwrap();
    let hit = store.identities.values().find(|i| {
        i.proofs
            .iter()
            .any(|p| p.key.proof_type.as_str() == ty && p.key.value == value)
    });
    match hit {
        Some(i) => Json(serde_json::json!({ "uid": i.id })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn user(State(s): State<Shared>, Path(uid): Path<String>) -> Response {
    match s.lock().unwrap().identities.get(&uid) {
        Some(i) => Json(i.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn latest(State(s): State<Shared>, Path(pair): Path<(String, String)>) -> Response {
    match s.lock().unwrap().statements.get(&pair) {
        Some(st) => Json(st.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn publish(State(s): State<Shared>, Json(st): Json<serde_json::Value>) -> StatusCode {
    let Ok(statement) = TrackingStatement::from_json(&st.to_string()) else {
        return StatusCode::BAD_REQUEST;
    };
    if statement.verify().is_err() {
        return StatusCode::UNPROCESSABLE_ENTITY;
    }
    let pair = (
        statement.body.tracker.to_string(),
        statement.body.tracked.to_string(),
    );
    s.lock().unwrap().statements.insert(pair, st);
    StatusCode::CREATED
}

async fn serve(store: Store) -> SocketAddr {
    let app = Router::new()
        .route("/v1/users/by-name/:name", get(by_name))
        .route("/v1/users/by-proof/:ty/:value", get(by_proof))
        .route("/v1/users/:uid", get(user))
        .route("/v1/tracking/:tracker/:tracked", get(latest))
        .route("/v1/tracking", post(publish))
        .with_state(Arc::new(Mutex::new(store)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn bob() -> Identity {
    let kp = keypair_from_seed(&[5; 32]);
    let id = UserId::from_public_key(&kp.public);
    let proof = sign_proof(
        &id,
        ProofKey::new(ProofType::Web, "bob.example.com"),
        "https://bob.example.com/trackid.txt",
        1,
        &kp.private,
    );
    Identity {
        id,
        username: Username::parse("bob").unwrap(),
        public_key: kp.public,
        proofs: vec![proof],
    }
}

async fn directory_with_bob() -> (HttpDirectory, Identity) {
    let bob = bob();
    let mut store = Store::default();
    store.identities.insert(bob.id.to_string(), bob.clone());
    let addr = serve(store).await;
    (HttpDirectory::new(&format!("http://{addr}")).unwrap(), bob)
}

#[tokio::test]
async fn username_and_proof_lookups() {
    let (dir, bob) = directory_with_bob().await;
    let name = Username::parse("bob").unwrap();
    assert_eq!(dir.lookup_username(&name).await.unwrap(), Some(bob.id.clone()));

    let missing = Username::parse("carol").unwrap();
    assert_eq!(dir.lookup_username(&missing).await.unwrap(), None);

    let key = ProofKey::new(ProofType::Web, "bob.example.com");
    assert_eq!(dir.lookup_proof(&key).await.unwrap(), Some(bob.id));
}

#[tokio::test]
async fn load_identity_roundtrips_and_reports_missing() {
    let (dir, bob) = directory_with_bob().await;
    assert_eq!(dir.load_identity(&bob.id).await.unwrap(), bob);

    let nobody = UserId::parse(&"0".repeat(32)).unwrap();
    assert!(matches!(
        dir.load_identity(&nobody).await,
        Err(DirectoryError::NotFound(_))
    ));
}

#[tokio::test]
async fn publish_then_fetch_latest_statement() {
    let (dir, bob) = directory_with_bob().await;
    let alice = keypair_from_seed(&[6; 32]);
    let alice_id = UserId::from_public_key(&alice.public);

    assert!(dir
        .latest_tracking_statement(&alice_id, &bob.id)
        .await
        .unwrap()
        .is_none());

    let unsigned = build_statement(
        alice_id.clone(),
        bob.id.clone(),
        bob.public_key.clone(),
        TrackSet::default(),
        Timestamp::new(1_700_000_000),
        None,
    );
    let statement = sign(unsigned, alice.private);
    dir.publish_tracking_statement(&statement).await.unwrap();

    let fetched = dir
        .latest_tracking_statement(&alice_id, &bob.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, statement);
    assert_eq!(fetched.id(), statement.id());
}

#[tokio::test]
async fn rejected_publication_is_an_error() {
    let (dir, bob) = directory_with_bob().await;
    let alice = keypair_from_seed(&[6; 32]);
    let unsigned = build_statement(
        UserId::from_public_key(&alice.public),
        bob.id.clone(),
        bob.public_key.clone(),
        TrackSet::default(),
        Timestamp::new(1),
        None,
    );
    let mut statement = sign(unsigned, alice.private);
    statement.body.ctime = Timestamp::new(2);
    assert!(matches!(
        dir.publish_tracking_statement(&statement).await,
        Err(DirectoryError::Rejected(_))
    ));
}

#[tokio::test]
async fn unreachable_directory_is_retriable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let dir = HttpDirectory::new(&format!("http://{addr}")).unwrap();
    let err = dir
        .lookup_username(&Username::parse("bob").unwrap())
        .await
        .unwrap_err();
    assert!(err.is_retriable(), "{err}");
}
