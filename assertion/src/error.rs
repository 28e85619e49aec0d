use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty assertion")]
    Empty,

    #[error("empty term at position {position}")]
    EmptyTerm { position: usize },

    #[error("missing service name in {term:?}")]
    EmptyService { term: String },

    #[error("invalid service name {service:?}")]
    InvalidService { service: String },

    #[error("missing value in {term:?}")]
    EmptyValue { term: String },

    #[error("invalid value in {term:?}")]
    InvalidValue { term: String },
}
