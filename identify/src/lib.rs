//! Identify engine.
//!
//! Resolves an assertion to an identity, verifies the identity's proofs
//! concurrently through the proof checker registry, compares the result with
//! the caller's last tracking statement, and optionally signs a new one. How
//! strict each step is depends on the calling context's [`IdentifyBehavior`].

pub mod cache;
pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod key;
pub mod outcome;
pub mod policy;
pub mod resolver;
pub mod state;
pub mod ui;
pub mod verify;

pub use cache::{CacheKey, IdentifyCache};
pub use cancel::{CancelSource, CancelToken};
pub use config::EngineConfig;
pub use engine::{IdentifyEngine, IdentifyRequest, RunContext};
pub use error::{IdentifyError, KeyError, ResolveError, UiError};
pub use key::{SecretKeySource, StaticKeySource};
pub use outcome::{
    compute_status, GroupIdentifyOutcome, IdentifyOutcome, IdentifyStatus, ProofResult,
    UserBreaks,
};
pub use policy::{IdentifyBehavior, IdentifyPolicy};
pub use resolver::{resolve, Resolution};
pub use state::{IdentifyState, StateMachine};
pub use ui::{IdentifyUi, NoUi, ProgressEvent, ProgressKind, TrackSummary};
pub use verify::verify_all;
