use async_trait::async_trait;

use rentdesk_core::{AppResult, SessionIdentity};

/// Persistent storage for the bearer token between runs.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the stored token, if any.
    async fn load(&self) -> AppResult<Option<String>>;

    /// Replaces the stored token.
    async fn save(&self, token: &str) -> AppResult<()>;

    /// Removes the stored token.
    async fn clear(&self) -> AppResult<()>;
}

/// Decodes a bearer token into the identity it carries.
pub trait TokenDecoder: Send + Sync {
    /// Decodes claims without contacting the backend.
    fn decode(&self, token: &str) -> AppResult<SessionIdentity>;
}
