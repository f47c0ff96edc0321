//! Error types for hnf1b-variants
//!
//! Every failure surfaced by the classifier, validator, recoder and annotator
//! is a [`VariantError`]. Each variant carries an [`ErrorCode`] for
//! programmatic handling and maps onto the HTTP status the REST layer returns.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Error codes for categorizing errors
///
/// Codes are grouped by layer: notation (E1xxx), conversion (E2xxx),
/// upstream (E3xxx) and infrastructure (E9xxx).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Notation errors (E1xxx)
    /// Input is not a well-formed variant notation
    InvalidNotation = 1001,

    // Conversion errors (E2xxx)
    /// Input is valid but cannot be mapped to the requested representation
    UnsupportedConversion = 2001,

    // Upstream errors (E3xxx)
    /// Upstream has no record for the variant
    NotFound = 3001,
    /// Upstream throttled the request
    RateLimited = 3002,
    /// Network or service failure talking to upstream
    UpstreamUnavailable = 3003,

    // Infrastructure errors (E9xxx)
    /// Configuration problem
    Config = 9001,
    /// File IO error
    Io = 9002,
    /// JSON (de)serialization error
    Json = 9003,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidNotation => "invalid variant notation",
            ErrorCode::UnsupportedConversion => "unsupported conversion",
            ErrorCode::NotFound => "variant not found",
            ErrorCode::RateLimited => "rate limited by upstream",
            ErrorCode::UpstreamUnavailable => "upstream service unavailable",
            ErrorCode::Config => "configuration error",
            ErrorCode::Io => "file I/O error",
            ErrorCode::Json => "JSON error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for hnf1b-variants
#[derive(Debug, Error)]
pub enum VariantError {
    /// Syntactically invalid input, with ordered correction suggestions
    #[error("invalid variant notation: {msg}")]
    InvalidNotation { msg: String, suggestions: Vec<String> },

    /// Valid input whose target notation is undefined
    #[error("unsupported conversion: {msg}")]
    UnsupportedConversion { msg: String },

    /// Upstream (or a local lookup) has no record
    #[error("not found: {msg}")]
    NotFound { msg: String },

    /// Upstream throttling; retryable by the caller after `retry_after`
    #[error("rate limited by upstream{}", fmt_retry_after(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// Transient network or service failure
    #[error("upstream unavailable: {msg}")]
    UpstreamUnavailable { msg: String },

    /// Configuration error
    #[error("configuration error: {msg}")]
    Config { msg: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn fmt_retry_after(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(" (retry after {}s)", d.as_secs().max(1)),
        None => String::new(),
    }
}

impl VariantError {
    /// Shorthand for an invalid notation without suggestions
    pub fn invalid(msg: impl Into<String>) -> Self {
        VariantError::InvalidNotation {
            msg: msg.into(),
            suggestions: Vec::new(),
        }
    }

    /// Shorthand for an unsupported conversion
    pub fn unsupported(msg: impl Into<String>) -> Self {
        VariantError::UnsupportedConversion { msg: msg.into() }
    }

    /// Shorthand for a missing record
    pub fn not_found(msg: impl Into<String>) -> Self {
        VariantError::NotFound { msg: msg.into() }
    }

    /// Shorthand for an upstream failure
    pub fn upstream(msg: impl Into<String>) -> Self {
        VariantError::UpstreamUnavailable { msg: msg.into() }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            VariantError::InvalidNotation { .. } => ErrorCode::InvalidNotation,
            VariantError::UnsupportedConversion { .. } => ErrorCode::UnsupportedConversion,
            VariantError::NotFound { .. } => ErrorCode::NotFound,
            VariantError::RateLimited { .. } => ErrorCode::RateLimited,
            VariantError::UpstreamUnavailable { .. } => ErrorCode::UpstreamUnavailable,
            VariantError::Config { .. } => ErrorCode::Config,
            VariantError::Io(_) => ErrorCode::Io,
            VariantError::Json(_) => ErrorCode::Json,
        }
    }

    /// HTTP status the REST layer reports for this error
    pub fn status_code(&self) -> u16 {
        match self {
            VariantError::InvalidNotation { .. } => 400,
            VariantError::UnsupportedConversion { .. } => 422,
            VariantError::NotFound { .. } => 404,
            VariantError::RateLimited { .. } => 429,
            VariantError::UpstreamUnavailable { .. } => 503,
            VariantError::Config { .. } | VariantError::Io(_) | VariantError::Json(_) => 500,
        }
    }

    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VariantError::RateLimited { .. } | VariantError::UpstreamUnavailable { .. }
        )
    }

    /// Suggested corrections carried by the error, if any
    pub fn suggestions(&self) -> &[String] {
        match self {
            VariantError::InvalidNotation { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    /// Short machine-readable name used in REST error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            VariantError::InvalidNotation { .. } => "invalid_notation",
            VariantError::UnsupportedConversion { .. } => "unsupported_conversion",
            VariantError::NotFound { .. } => "not_found",
            VariantError::RateLimited { .. } => "rate_limited",
            VariantError::UpstreamUnavailable { .. } => "upstream_unavailable",
            VariantError::Config { .. } => "config_error",
            VariantError::Io(_) => "io_error",
            VariantError::Json(_) => "json_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::InvalidNotation.as_str(), "E1001");
        assert_eq!(ErrorCode::UpstreamUnavailable.to_string(), "E3003");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(VariantError::invalid("x").status_code(), 400);
        assert_eq!(VariantError::not_found("x").status_code(), 404);
        assert_eq!(VariantError::unsupported("x").status_code(), 422);
        assert_eq!(
            VariantError::RateLimited { retry_after: None }.status_code(),
            429
        );
        assert_eq!(VariantError::upstream("x").status_code(), 503);
    }

    #[test]
    fn test_rate_limited_message() {
        let err = VariantError::RateLimited {
            retry_after: Some(Duration::from_secs(2)),
        };
        assert_eq!(err.to_string(), "rate limited by upstream (retry after 2s)");
        assert!(err.is_retryable());
        assert!(!VariantError::invalid("x").is_retryable());
    }

    #[test]
    fn test_suggestions_only_on_invalid_notation() {
        let err = VariantError::InvalidNotation {
            msg: "missing colon".to_string(),
            suggestions: vec!["NM_000458.4:c.544+1G>A".to_string()],
        };
        assert_eq!(err.suggestions(), ["NM_000458.4:c.544+1G>A"]);
        assert!(VariantError::not_found("rs1").suggestions().is_empty());
    }
}
