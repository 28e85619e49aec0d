//! The identity assertion language.
//!
//! An assertion is a disjunction of conjunctions over service/value terms:
//! `alice+twitter:bob,dns:example.com` means
//! `(keybase:alice AND twitter:bob) OR dns:example.com`.
//!
//! Parsing is purely syntactic and performs no I/O. Whether a service exists is
//! decided later, at resolution time.

pub mod component;
pub mod error;
pub mod parser;

pub use component::{AssertionComponent, ComponentKind};
pub use error::ParseError;
pub use parser::{parse, Assertion, Conjunction};
