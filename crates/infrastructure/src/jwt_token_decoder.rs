use std::collections::HashSet;

use chrono::DateTime;
use jsonwebtoken::{DecodingKey, Validation};
use serde::Deserialize;

use rentdesk_application::TokenDecoder;
use rentdesk_core::{AppError, AppResult, SessionIdentity};

#[derive(Debug, Deserialize)]
struct Claims {
    sub: Option<String>,
    exp: Option<i64>,
    scope: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

/// Reads identity claims from a JWT.
///
/// The signature is not verified; the backend checks it on every request.
/// Expired tokens still decode; callers check `expires_at`.
#[derive(Clone)]
pub struct JwtTokenDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenDecoder {
    /// Creates a decoder.
    #[must_use]
    pub fn new() -> Self {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            decoding_key: DecodingKey::from_secret(&[]),
            validation,
        }
    }
}

impl Default for JwtTokenDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenDecoder for JwtTokenDecoder {
    fn decode(&self, token: &str) -> AppResult<SessionIdentity> {
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token);

        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|error| AppError::Unauthorized(format!("invalid token: {error}")))?
            .claims;

        let subject = claims
            .sub
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthorized("token has no subject".to_owned()))?;

        let expires_at = claims
            .exp
            .map(|seconds| {
                DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
                    AppError::Unauthorized(format!("token expiry '{seconds}' is out of range"))
                })
            })
            .transpose()?;

        let scope_roles = claims
            .scope
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_owned)
            .collect::<Vec<_>>();

        Ok(SessionIdentity::new(
            subject,
            scope_roles.into_iter().chain(claims.roles),
            expires_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{Algorithm, EncodingKey, Header};
    use rentdesk_application::TokenDecoder;
    use rentdesk_core::AppError;
    use serde_json::json;

    use super::JwtTokenDecoder;

    fn token(claims: serde_json::Value) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"backend-only-secret"),
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn scope_roles_are_read_without_prefix() {
        let decoded = JwtTokenDecoder::new().decode(&token(json!({
            "sub": "olivia",
            "scope": "ROLE_OWNER HOUSE_CREATE",
            "exp": 1_900_000_000
        })));

        assert!(decoded.is_ok());
        let identity = decoded.unwrap_or_else(|_| unreachable!());
        assert_eq!(identity.subject(), "olivia");
        assert!(identity.has_role("OWNER"));
        assert_eq!(
            identity.expires_at().map(|expires_at| expires_at.timestamp()),
            Some(1_900_000_000)
        );
    }

    #[test]
    fn roles_array_is_accepted_without_expiry() {
        let decoded = JwtTokenDecoder::new().decode(&format!(
            "Bearer {}",
            token(json!({"sub": "root", "roles": ["ADMIN"]}))
        ));

        assert!(decoded.is_ok_and(|identity| {
            identity.has_role("ADMIN") && identity.expires_at().is_none()
        }));
    }

    #[test]
    fn expired_tokens_still_decode_with_their_expiry() {
        let decoded = JwtTokenDecoder::new().decode(&token(json!({
            "sub": "olivia",
            "scope": "ROLE_TENANT",
            "exp": 1_000
        })));

        assert_eq!(
            decoded
                .ok()
                .and_then(|identity| identity.expires_at())
                .map(|expires_at| expires_at.timestamp()),
            Some(1_000)
        );
    }

    #[test]
    fn malformed_tokens_are_unauthorized() {
        let decoder = JwtTokenDecoder::new();

        assert!(matches!(
            decoder.decode("only.two"),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            decoder.decode("a.%%%.c"),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            decoder.decode(&token(json!({"scope": "ROLE_ADMIN"}))),
            Err(AppError::Unauthorized(_))
        ));
    }
}
