use crate::providers::ProviderError;

/// Fixed user-visible failure categories. Every generation failure is
/// normalized into exactly one of these before any message text is
/// rendered, so the categorization lives in one place instead of
/// scattered string checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 403: the key cannot access the selected model.
    PermissionDenied,
    /// 429, or a quota-exceeded message on another status.
    QuotaExhausted,
    /// 503: backend busy.
    Overloaded,
    /// Anything else, with the underlying message when one exists.
    Generic(Option<String>),
}

impl ErrorCategory {
    pub fn from_provider_error(err: &ProviderError) -> Self {
        match err {
            ProviderError::AuthError(_) => ErrorCategory::PermissionDenied,
            ProviderError::RateLimited => ErrorCategory::QuotaExhausted,
            ProviderError::Overloaded => ErrorCategory::Overloaded,
            ProviderError::RequestFailed(msg) | ProviderError::InvalidResponse(msg) => {
                if msg.contains("Quota exceeded") {
                    ErrorCategory::QuotaExhausted
                } else {
                    ErrorCategory::Generic(Some(msg.clone()))
                }
            }
            ProviderError::NetworkError(msg) => ErrorCategory::Generic(Some(msg.clone())),
        }
    }

    /// Only the permission-denied path prompts the UI to open the
    /// settings panel for a credential change.
    pub fn prompts_for_credentials(&self) -> bool {
        matches!(self, ErrorCategory::PermissionDenied)
    }

    /// The fixed transcript text for this category. `assistant_name` is
    /// the preset the failed call was issued against.
    pub fn user_message(&self, assistant_name: &str) -> String {
        match self {
            ErrorCategory::PermissionDenied => format!(
                "Permission denied (403).\n\nYour current API key cannot access the \
                 \"{assistant_name}\" model.\n\n\u{2022} Try switching back to Nano Banana \
                 (the basic preset).\n\u{2022} Or enter an API key with billing enabled in \
                 Settings."
            ),
            ErrorCategory::QuotaExhausted => "Quota exhausted (429).\n\nYour usage has reached \
                 the free-tier limit.\n\n\u{2022} Wait a moment and try again (limits usually \
                 reset every minute).\n\u{2022} Or enter an API key from a paid project in \
                 Settings for a higher quota."
                .to_string(),
            ErrorCategory::Overloaded => {
                "Service overloaded (503).\n\nGemini is busy right now. Please try again later."
                    .to_string()
            }
            ErrorCategory::Generic(Some(msg)) => format!("Error: {msg}"),
            ErrorCategory::Generic(None) => "Unable to generate a response.".to_string(),
        }
    }
}

impl From<ProviderError> for ErrorCategory {
    fn from(err: ProviderError) -> Self {
        Self::from_provider_error(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_covers_the_taxonomy() {
        assert_eq!(
            ErrorCategory::from_provider_error(&ProviderError::AuthError("bad key".into())),
            ErrorCategory::PermissionDenied
        );
        assert_eq!(
            ErrorCategory::from_provider_error(&ProviderError::RateLimited),
            ErrorCategory::QuotaExhausted
        );
        assert_eq!(
            ErrorCategory::from_provider_error(&ProviderError::Overloaded),
            ErrorCategory::Overloaded
        );
        assert_eq!(
            ErrorCategory::from_provider_error(&ProviderError::RequestFailed(
                "HTTP 400: Quota exceeded for metric".into()
            )),
            ErrorCategory::QuotaExhausted
        );
        assert_eq!(
            ErrorCategory::from_provider_error(&ProviderError::NetworkError("timed out".into())),
            ErrorCategory::Generic(Some("timed out".into()))
        );
    }

    #[test]
    fn only_permission_denied_opens_settings() {
        assert!(ErrorCategory::PermissionDenied.prompts_for_credentials());
        assert!(!ErrorCategory::QuotaExhausted.prompts_for_credentials());
        assert!(!ErrorCategory::Overloaded.prompts_for_credentials());
        assert!(!ErrorCategory::Generic(None).prompts_for_credentials());
    }

    #[test]
    fn messages_name_the_assistant_on_permission_denied() {
        let msg = ErrorCategory::PermissionDenied.user_message("Nano Banana Pro");
        assert!(msg.contains("Nano Banana Pro"));
        assert!(msg.contains("403"));

        let msg = ErrorCategory::Generic(Some("boom".into())).user_message("x");
        assert_eq!(msg, "Error: boom");
    }
}
