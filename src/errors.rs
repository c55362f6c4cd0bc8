use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    InvalidInput,
    NotFound,
    ServerError,
    NetworkError,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidInput => "invalid-input",
            ErrorCategory::NotFound => "not-found",
            ErrorCategory::ServerError => "server-error",
            ErrorCategory::NetworkError => "network-error",
            ErrorCategory::Unknown => "unknown",
        }
    }

    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => ErrorCategory::InvalidInput,
            404 => ErrorCategory::NotFound,
            500..=599 => ErrorCategory::ServerError,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Best-effort classification of an untyped error string.
    pub fn from_message(message: &str) -> Self {
        if message.contains("400") || message.contains("Invalid") {
            ErrorCategory::InvalidInput
        } else if message.contains("404") || message.contains("not found") {
            ErrorCategory::NotFound
        } else if message.contains("500") || message.contains("Internal") {
            ErrorCategory::ServerError
        } else if message.contains("Network") || message.contains("fetch") {
            ErrorCategory::NetworkError
        } else {
            ErrorCategory::Unknown
        }
    }
}

/// Failure reported by the upstream analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Invalid GitHub repository URL. Please check the URL and try again.")]
    InvalidInput(String),
    #[error("Repository not found. Please verify the repository exists and is public.")]
    NotFound(String),
    #[error("Server error occurred. Please try again in a few moments.")]
    ServerError(String),
    #[error("Network connection error. Please check your internet connection and try again.")]
    NetworkError(String),
    #[error("{0}")]
    Unknown(String),
}

impl AnalysisError {
    pub fn new(category: ErrorCategory, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match category {
            ErrorCategory::InvalidInput => AnalysisError::InvalidInput(detail),
            ErrorCategory::NotFound => AnalysisError::NotFound(detail),
            ErrorCategory::ServerError => AnalysisError::ServerError(detail),
            ErrorCategory::NetworkError => AnalysisError::NetworkError(detail),
            ErrorCategory::Unknown => AnalysisError::Unknown(detail),
        }
    }

    /// Builds an error from a service error body, preferring the HTTP status
    /// when one is known.
    pub fn from_response(status: Option<u16>, message: &str) -> Self {
        let category = status
            .map(ErrorCategory::from_status)
            .filter(|category| *category != ErrorCategory::Unknown)
            .unwrap_or_else(|| ErrorCategory::from_message(message));
        AnalysisError::new(category, message)
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::InvalidInput(_) => ErrorCategory::InvalidInput,
            AnalysisError::NotFound(_) => ErrorCategory::NotFound,
            AnalysisError::ServerError(_) => ErrorCategory::ServerError,
            AnalysisError::NetworkError(_) => ErrorCategory::NetworkError,
            AnalysisError::Unknown(_) => ErrorCategory::Unknown,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            AnalysisError::InvalidInput(detail)
            | AnalysisError::NotFound(detail)
            | AnalysisError::ServerError(detail)
            | AnalysisError::NetworkError(detail)
            | AnalysisError::Unknown(detail) => detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_categories() {
        assert_eq!(ErrorCategory::from_status(400), ErrorCategory::InvalidInput);
        assert_eq!(ErrorCategory::from_status(404), ErrorCategory::NotFound);
        assert_eq!(ErrorCategory::from_status(503), ErrorCategory::ServerError);
        assert_eq!(ErrorCategory::from_status(429), ErrorCategory::Unknown);
    }

    #[test]
    fn message_fallback_follows_marker_order() {
        assert_eq!(
            ErrorCategory::from_message("Invalid repository URL"),
            ErrorCategory::InvalidInput
        );
        assert_eq!(
            ErrorCategory::from_message("Repository not found"),
            ErrorCategory::NotFound
        );
        assert_eq!(
            ErrorCategory::from_message("Internal Server Error"),
            ErrorCategory::ServerError
        );
        assert_eq!(
            ErrorCategory::from_message("Failed to fetch"),
            ErrorCategory::NetworkError
        );
        assert_eq!(
            ErrorCategory::from_message("rate limit exceeded"),
            ErrorCategory::Unknown
        );
        // 400 is checked before 404
        assert_eq!(
            ErrorCategory::from_message("HTTP 400: not found"),
            ErrorCategory::InvalidInput
        );
    }

    #[test]
    fn status_takes_precedence_over_message() {
        let err = AnalysisError::from_response(Some(404), "Internal lookup failed");
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let err = AnalysisError::from_response(Some(429), "Failed to fetch stargazers");
        assert_eq!(err.category(), ErrorCategory::NetworkError);
    }

    #[test]
    fn unknown_errors_keep_original_message() {
        let err = AnalysisError::from_response(None, "GitHub API quota exhausted");
        assert_eq!(err.to_string(), "GitHub API quota exhausted");
        assert_eq!(err.detail(), "GitHub API quota exhausted");
        assert_eq!(err.category().as_str(), "unknown");
    }
}
