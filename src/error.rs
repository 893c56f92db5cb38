use thiserror::Error;

/// Reasons a translation table could not be loaded.
///
/// None of these ever reach the player: a failed load leaves the session on
/// whatever it had before and untranslated text keeps being shown.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The fetch itself failed (network or filesystem error).
    #[error("failed to fetch translations for '{code}': {message}")]
    Transport { code: String, message: String },

    /// The source answered with an error status.
    #[error("translations for '{code}' not available (status {status})")]
    NotFound { code: String, status: u16 },

    /// The payload was retrieved but is not a flat text-to-text object.
    #[error("invalid translation file for '{code}': {message}")]
    Parse { code: String, message: String },
}

impl LoadError {
    /// Language code the failed load was for.
    pub fn code(&self) -> &str {
        match self {
            LoadError::Transport { code, .. }
            | LoadError::NotFound { code, .. }
            | LoadError::Parse { code, .. } => code,
        }
    }

    /// Transport errors and 5xx statuses may succeed on a later attempt.
    /// Client errors and bad payloads will not.
    pub fn is_transient(&self) -> bool {
        match self {
            LoadError::Transport { .. } => true,
            LoadError::NotFound { status, .. } => *status >= 500,
            LoadError::Parse { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_accessor() {
        let err = LoadError::NotFound {
            code: "ja".to_string(),
            status: 404,
        };
        assert_eq!(err.code(), "ja");
    }

    #[test]
    fn test_transient_classification() {
        let transport = LoadError::Transport {
            code: "en".to_string(),
            message: "connection refused".to_string(),
        };
        let server_error = LoadError::NotFound {
            code: "en".to_string(),
            status: 503,
        };
        let missing = LoadError::NotFound {
            code: "en".to_string(),
            status: 404,
        };
        let parse = LoadError::Parse {
            code: "en".to_string(),
            message: "expected value".to_string(),
        };

        assert!(transport.is_transient());
        assert!(server_error.is_transient());
        assert!(!missing.is_transient());
        assert!(!parse.is_transient());
    }

    #[test]
    fn test_display_mentions_status() {
        let err = LoadError::NotFound {
            code: "fr".to_string(),
            status: 404,
        };
        let message = err.to_string();
        assert!(message.contains("fr"));
        assert!(message.contains("404"));
    }
}
