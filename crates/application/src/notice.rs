use rentdesk_core::{AppError, AppResult};
use serde::Serialize;

/// Severity of a user notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Operation completed.
    Success,
    /// Operation failed and may be retried.
    Error,
}

/// Single user-facing report of an operation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserNotice {
    /// Notice severity.
    pub level: NoticeLevel,
    /// Message shown to the user.
    pub message: String,
}

impl UserNotice {
    /// Creates a success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Creates an error notice from an application error.
    ///
    /// Backend messages are shown verbatim; an empty message falls back to a
    /// generic text.
    #[must_use]
    pub fn from_error(error: &AppError) -> Self {
        let message = error.user_message().trim();
        Self {
            level: NoticeLevel::Error,
            message: if message.is_empty() {
                "Something went wrong, please try again".to_owned()
            } else {
                message.to_owned()
            },
        }
    }

    /// Creates the notice for an operation result.
    #[must_use]
    pub fn from_result<T>(result: &AppResult<T>, success_message: impl Into<String>) -> Self {
        match result {
            Ok(_) => Self::success(success_message),
            Err(error) => Self::from_error(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use rentdesk_core::{AppError, AppResult};

    use super::{NoticeLevel, UserNotice};

    #[test]
    fn api_message_is_shown_verbatim() {
        let result: AppResult<()> = Err(AppError::Api {
            code: 1004,
            message: "Role already has this permission".to_owned(),
        });

        let notice = UserNotice::from_result(&result, "Saved");

        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Role already has this permission");
    }

    #[test]
    fn blank_messages_fall_back_to_generic_text() {
        let notice = UserNotice::from_error(&AppError::Network("  ".to_owned()));
        assert_eq!(notice.message, "Something went wrong, please try again");
    }

    #[test]
    fn success_uses_given_message() {
        let result: AppResult<u8> = Ok(1);
        assert_eq!(UserNotice::from_result(&result, "Saved"), UserNotice::success("Saved"));
    }
}
