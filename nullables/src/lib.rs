//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the identify engine (clock, directory, UI,
//! proof checkers, signing keys) has a test-friendly implementation here that:
//! - Returns deterministic values
//! - Can be controlled programmatically
//! - Never touches the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod checker;
pub mod clock;
pub mod directory;
pub mod fixtures;
pub mod keys;
pub mod ui;

pub use checker::NullChecker;
pub use clock::NullClock;
pub use directory::NullDirectory;
pub use fixtures::TestUser;
pub use keys::NullKeySource;
pub use ui::{ConfirmAnswer, NullUi};
