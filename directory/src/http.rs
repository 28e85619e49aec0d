//! HTTP client for a remote identity directory.
//!
//! Routes, relative to the base URL:
//!
//! | call                       | route                                        |
//! |----------------------------|----------------------------------------------|
//! | lookup_username            | `GET  /v1/users/by-name/{username}`          |
//! | lookup_proof               | `GET  /v1/users/by-proof/{type}/{value}`     |
//! | load_identity              | `GET  /v1/users/{uid}`                       |
//! | latest_tracking_statement  | `GET  /v1/tracking/{tracker}/{tracked}`      |
//! | publish_tracking_statement | `POST /v1/tracking`                          |
//!
//! A 404 means "nothing there", not an error.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use trackid_track::TrackingStatement;
use trackid_types::{Identity, ProofKey, UserId, Username};

use crate::directory::IdentityDirectory;
use crate::error::DirectoryError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct UidResponse {
    uid: UserId,
}

pub struct HttpDirectory {
    base: Url,
    http_client: reqwest::Client,
}

impl HttpDirectory {
    pub fn new(base_url: &str) -> Result<Self, DirectoryError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, DirectoryError> {
        let base = Url::parse(base_url)
            .map_err(|e| DirectoryError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(DirectoryError::InvalidUrl(base_url.to_string()));
        }
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| DirectoryError::RequestFailed(e.to_string()))?;
        Ok(Self { base, http_client })
    }

    /// Base URL plus percent-encoded path segments.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in the constructor: the base can carry path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET a JSON document; 404 maps to `None`.
    async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<T>, DirectoryError> {
        debug!(%url, "directory GET");
        let response = self.http_client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_server_error() => Err(DirectoryError::Unreachable(format!("HTTP status {s}"))),
            s if !s.is_success() => Err(DirectoryError::RequestFailed(format!("HTTP status {s}"))),
            _ => response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|e| DirectoryError::InvalidResponse(e.to_string())),
        }
    }
}

#[async_trait]
impl IdentityDirectory for HttpDirectory {
    async fn lookup_username(&self, username: &Username) -> Result<Option<UserId>, DirectoryError> {
        let url = self.url(&["v1", "users", "by-name", username.as_str()]);
        Ok(self.get_optional::<UidResponse>(url).await?.map(|r| r.uid))
    }

    async fn lookup_proof(&self, key: &ProofKey) -> Result<Option<UserId>, DirectoryError> {
        let url = self.url(&["v1", "users", "by-proof", key.proof_type.as_str(), &key.value]);
        Ok(self.get_optional::<UidResponse>(url).await?.map(|r| r.uid))
    }

    async fn load_identity(&self, uid: &UserId) -> Result<Identity, DirectoryError> {
        let url = self.url(&["v1", "users", uid.as_str()]);
        let identity: Identity = self
            .get_optional(url)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(uid.to_string()))?;
        if &identity.id != uid {
            return Err(DirectoryError::InvalidResponse(format!(
                "asked for {uid}, got {}",
                identity.id
            )));
        }
        Ok(identity)
    }

    async fn latest_tracking_statement(
        &self,
        tracker: &UserId,
        tracked: &UserId,
    ) -> Result<Option<TrackingStatement>, DirectoryError> {
        let url = self.url(&["v1", "tracking", tracker.as_str(), tracked.as_str()]);
        let Some(raw) = self.get_optional::<serde_json::Value>(url).await? else {
            return Ok(None);
        };
        let statement = TrackingStatement::from_json(&raw.to_string())
            .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))?;
        Ok(Some(statement))
    }

    async fn publish_tracking_statement(
        &self,
        statement: &TrackingStatement,
    ) -> Result<(), DirectoryError> {
        let url = self.url(&["v1", "tracking"]);
        debug!(%url, id = %statement.id(), "publishing tracking statement");
        let response = self
            .http_client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(statement.to_json())
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.is_server_error() {
            Err(DirectoryError::Unreachable(format!("HTTP status {status}")))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(DirectoryError::Rejected(format!("HTTP status {status}: {body}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_percent_encoded_segments() {
        let dir = HttpDirectory::new("https://dir.example.com/api/").unwrap();
        let url = dir.url(&["v1", "users", "by-proof", "web", "a b/c"]);
        assert_eq!(
            url.as_str(),
            "https://dir.example.com/api/v1/users/by-proof/web/a%20b%2Fc"
        );
    }

    #[test]
    fn base_without_trailing_slash() {
        let dir = HttpDirectory::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(dir.url(&["v1", "tracking"]).as_str(), "http://127.0.0.1:8080/v1/tracking");
    }

    #[test]
    fn rejects_unusable_base() {
        assert!(matches!(
            HttpDirectory::new("mailto:dir@example.com"),
            Err(DirectoryError::InvalidUrl(_))
        ));
        assert!(HttpDirectory::new("not a url").is_err());
    }

    #[test]
    fn uid_response_deserialization() {
        let json = format!(r#"{{"uid":"{}"}}"#, "f".repeat(32));
        let resp: UidResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(resp.uid.as_str(), "f".repeat(32));
    }
}
