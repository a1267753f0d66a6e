use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use rentdesk_core::{AppError, AppResult, SessionIdentity};
use rentdesk_domain::{AppRole, Dashboard, RouteDecision, check_route};

use crate::{TokenDecoder, TokenStore};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
struct ActiveSession {
    token: String,
    identity: SessionIdentity,
}

/// Explicit session holder built once at startup.
///
/// The token is read from the store only by [`SessionService::restore`] and
/// replaced only by [`SessionService::sign_in`].
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn TokenStore>,
    decoder: Arc<dyn TokenDecoder>,
    active: Arc<RwLock<Option<ActiveSession>>>,
}

impl SessionService {
    /// Creates a signed-out session service.
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, decoder: Arc<dyn TokenDecoder>) -> Self {
        Self {
            store,
            decoder,
            active: Arc::new(RwLock::new(None)),
        }
    }

    /// Restores the session from the stored token.
    ///
    /// A token that cannot be decoded or has expired is removed from the store.
    pub async fn restore(&self) -> AppResult<Option<SessionIdentity>> {
        let Some(token) = self.store.load().await? else {
            *self.active.write().await = None;
            return Ok(None);
        };

        match self.decode_live(token.as_str()) {
            Ok(identity) => {
                *self.active.write().await = Some(ActiveSession {
                    token,
                    identity: identity.clone(),
                });
                Ok(Some(identity))
            }
            Err(error) => {
                warn!(error = %error, "discarding stored session token");
                self.store.clear().await?;
                *self.active.write().await = None;
                Ok(None)
            }
        }
    }

    /// Stores a freshly issued token and makes it the active session.
    pub async fn sign_in(&self, token: &str) -> AppResult<SessionIdentity> {
        let token = token.trim();
        let identity = self.decode_live(token)?;

        self.store.save(token).await?;
        *self.active.write().await = Some(ActiveSession {
            token: token.to_owned(),
            identity: identity.clone(),
        });

        info!(subject = %identity.subject(), roles = ?identity.roles(), "signed in");
        Ok(identity)
    }

    /// Clears the stored token and the active session.
    pub async fn sign_out(&self) -> AppResult<()> {
        self.store.clear().await?;
        *self.active.write().await = None;
        Ok(())
    }

    /// Returns the active identity.
    pub async fn current(&self) -> Option<SessionIdentity> {
        self.active
            .read()
            .await
            .as_ref()
            .map(|session| session.identity.clone())
    }

    /// Returns the bearer token of the active session.
    pub async fn bearer_token(&self) -> Option<String> {
        self.active
            .read()
            .await
            .as_ref()
            .map(|session| session.token.clone())
    }

    /// Decides whether the active session may open a dashboard.
    pub async fn check(&self, dashboard: Dashboard) -> RouteDecision {
        let roles = self.current().await.map(|identity| app_roles(&identity));
        check_route(roles.as_deref(), dashboard)
    }

    /// Returns the active identity when it may open the dashboard.
    pub async fn require(&self, dashboard: Dashboard) -> AppResult<SessionIdentity> {
        let identity = self.current().await;
        let roles = identity.as_ref().map(app_roles);

        match (check_route(roles.as_deref(), dashboard), identity) {
            (RouteDecision::Allowed, Some(identity)) => Ok(identity),
            (RouteDecision::Forbidden, Some(identity)) => Err(AppError::Forbidden(format!(
                "subject '{}' is missing role '{}'",
                identity.subject(),
                dashboard.required_role().as_str()
            ))),
            _ => Err(AppError::Unauthorized("sign in to continue".to_owned())),
        }
    }

    fn decode_live(&self, token: &str) -> AppResult<SessionIdentity> {
        if token.is_empty() {
            return Err(AppError::Unauthorized("token must not be empty".to_owned()));
        }

        let identity = self.decoder.decode(token)?;
        if identity.is_expired_at(Utc::now()) {
            return Err(AppError::Unauthorized(format!(
                "token of subject '{}' has expired",
                identity.subject()
            )));
        }

        Ok(identity)
    }
}

/// Maps token role names onto application roles, skipping unknown ones.
#[must_use]
pub fn app_roles(identity: &SessionIdentity) -> Vec<AppRole> {
    identity
        .roles()
        .iter()
        .filter_map(|role| AppRole::from_str(role).ok())
        .collect()
}
