use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use rentdesk_core::{AppError, AppResult, SessionIdentity};
use rentdesk_domain::{Dashboard, RouteDecision};

use super::SessionService;
use crate::{TokenDecoder, TokenStore};

#[derive(Default)]
struct FakeTokenStore {
    token: Mutex<Option<String>>,
}

#[async_trait]
impl TokenStore for FakeTokenStore {
    async fn load(&self) -> AppResult<Option<String>> {
        Ok(self.token.lock().await.clone())
    }

    async fn save(&self, token: &str) -> AppResult<()> {
        *self.token.lock().await = Some(token.to_owned());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.token.lock().await = None;
        Ok(())
    }
}

/// Decodes `subject:ROLE1,ROLE2:expired|live` tokens.
struct FakeTokenDecoder;

impl TokenDecoder for FakeTokenDecoder {
    fn decode(&self, token: &str) -> AppResult<SessionIdentity> {
        let parts: Vec<&str> = token.split(':').collect();
        let [subject, roles, freshness] = parts.as_slice() else {
            return Err(AppError::Unauthorized("malformed token".to_owned()));
        };

        let expires_at = if *freshness == "expired" {
            Utc::now() - Duration::minutes(5)
        } else {
            Utc::now() + Duration::hours(1)
        };

        Ok(SessionIdentity::new(
            *subject,
            roles.split(',').map(str::to_owned),
            Some(expires_at),
        ))
    }
}

fn service_with_store(store: Arc<FakeTokenStore>) -> SessionService {
    SessionService::new(store, Arc::new(FakeTokenDecoder))
}

#[tokio::test]
async fn sign_in_persists_token_and_sets_identity() {
    let store = Arc::new(FakeTokenStore::default());
    let service = service_with_store(store.clone());

    let identity = service.sign_in(" alice:OWNER:live ").await;

    assert!(identity.is_ok());
    assert_eq!(
        store.token.lock().await.as_deref(),
        Some("alice:OWNER:live")
    );
    assert_eq!(service.bearer_token().await.as_deref(), Some("alice:OWNER:live"));
    assert_eq!(
        service.current().await.map(|identity| identity.subject().to_owned()),
        Some("alice".to_owned())
    );
}

#[tokio::test]
async fn expired_token_is_rejected_on_sign_in() {
    let store = Arc::new(FakeTokenStore::default());
    let service = service_with_store(store.clone());

    let result = service.sign_in("alice:OWNER:expired").await;

    assert!(matches!(result, Err(AppError::Unauthorized(_))));
    assert!(store.token.lock().await.is_none());
}

#[tokio::test]
async fn restore_discards_expired_token() {
    let store = Arc::new(FakeTokenStore {
        token: Mutex::new(Some("alice:OWNER:expired".to_owned())),
    });
    let service = service_with_store(store.clone());

    let restored = service.restore().await;

    assert_eq!(restored.ok(), Some(None));
    assert!(store.token.lock().await.is_none());
    assert_eq!(
        service.check(Dashboard::Owner).await,
        RouteDecision::RedirectToLogin
    );
}

#[tokio::test]
async fn route_guard_follows_token_roles() {
    let store = Arc::new(FakeTokenStore {
        token: Mutex::new(Some("olivia:ROLE_OWNER:live".to_owned())),
    });
    let service = service_with_store(store);

    let restored = service.restore().await;
    assert!(matches!(restored, Ok(Some(_))));

    assert_eq!(service.check(Dashboard::Owner).await, RouteDecision::Allowed);
    assert_eq!(service.check(Dashboard::Admin).await, RouteDecision::Forbidden);
    assert!(matches!(
        service.require(Dashboard::Admin).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn sign_out_clears_everything() {
    let store = Arc::new(FakeTokenStore::default());
    let service = service_with_store(store.clone());
    assert!(service.sign_in("root:ADMIN:live").await.is_ok());

    assert!(service.sign_out().await.is_ok());

    assert!(service.current().await.is_none());
    assert!(store.token.lock().await.is_none());
    assert!(matches!(
        service.require(Dashboard::Admin).await,
        Err(AppError::Unauthorized(_))
    ));
}
