use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use rentdesk_core::{AppError, AppResult};

/// Envelope code the backend uses for success.
pub const SUCCESS_CODE: i32 = 1000;

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    code: Option<i32>,
    #[serde(default)]
    result: Value,
    message: Option<String>,
}

/// Decodes a `{code, result, message}` response body into its result.
///
/// Empty bodies are accepted only for successful statuses and decode `result`
/// from `null`, which suits endpoints that return nothing.
pub(crate) fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> AppResult<T> {
    if body.trim().is_empty() {
        if status.is_success() {
            return decode_result(Value::Null);
        }
        return Err(status_error(status, None, None));
    }

    let envelope = match serde_json::from_str::<ApiEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(_) => {
            let message = Some(body.trim().chars().take(200).collect::<String>());
            return Err(status_error(status, None, message));
        }
    };

    if envelope.code == Some(SUCCESS_CODE) && status.is_success() {
        return decode_result(envelope.result);
    }

    Err(status_error(status, envelope.code, envelope.message))
}

fn decode_result<T: DeserializeOwned>(result: Value) -> AppResult<T> {
    serde_json::from_value(result)
        .map_err(|error| AppError::Internal(format!("unexpected response result shape: {error}")))
}

fn status_error(status: StatusCode, code: Option<i32>, message: Option<String>) -> AppError {
    let message = message
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND if code.is_none() => AppError::NotFound(message),
        _ => AppError::Api {
            code: code.unwrap_or_else(|| i32::from(status.as_u16())),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use rentdesk_core::AppError;

    use super::decode_envelope;

    #[test]
    fn success_code_yields_result() {
        let decoded: Result<Vec<u32>, _> =
            decode_envelope(StatusCode::OK, r#"{"code":1000,"result":[1,2]}"#);
        assert_eq!(decoded.ok(), Some(vec![1, 2]));
    }

    #[test]
    fn other_codes_carry_backend_message() {
        let decoded: Result<(), _> = decode_envelope(
            StatusCode::BAD_REQUEST,
            r#"{"code":1005,"message":"Permission existed"}"#,
        );
        assert_eq!(
            decoded.err(),
            Some(AppError::Api {
                code: 1005,
                message: "Permission existed".to_owned(),
            })
        );
    }

    #[test]
    fn missing_code_is_a_failure() {
        let decoded: Result<(), _> = decode_envelope(StatusCode::OK, r#"{"result":null}"#);
        assert!(matches!(decoded, Err(AppError::Api { code: 200, .. })));
    }

    #[test]
    fn unauthorized_status_maps_to_unauthorized() {
        let decoded: Result<(), _> = decode_envelope(
            StatusCode::UNAUTHORIZED,
            r#"{"code":1006,"message":"Unauthenticated"}"#,
        );
        assert_eq!(
            decoded.err(),
            Some(AppError::Unauthorized("Unauthenticated".to_owned()))
        );
    }

    #[test]
    fn empty_success_body_decodes_unit() {
        let decoded: Result<(), _> = decode_envelope(StatusCode::NO_CONTENT, "");
        assert!(decoded.is_ok());
    }

    #[test]
    fn non_json_error_body_is_quoted() {
        let decoded: Result<(), _> = decode_envelope(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(
            decoded.err(),
            Some(AppError::Api {
                code: 502,
                message: "upstream down".to_owned(),
            })
        );
    }
}
