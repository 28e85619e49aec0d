use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("no such identity: {0}")]
    NotFound(String),

    #[error("directory unreachable: {0}")]
    Unreachable(String),

    #[error("directory request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response from directory: {0}")]
    InvalidResponse(String),

    #[error("directory rejected the statement: {0}")]
    Rejected(String),

    #[error("invalid directory url: {0}")]
    InvalidUrl(String),
}

impl DirectoryError {
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DirectoryError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            DirectoryError::Unreachable(format!("connection failed: {e}"))
        } else if e.is_decode() {
            DirectoryError::InvalidResponse(e.to_string())
        } else {
            DirectoryError::RequestFailed(e.to_string())
        }
    }
}
