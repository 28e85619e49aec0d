//! Identity directory: the remote store the resolver queries and tracking
//! statements are published to.

pub mod directory;
pub mod error;
pub mod http;

pub use directory::IdentityDirectory;
pub use error::DirectoryError;
pub use http::HttpDirectory;
