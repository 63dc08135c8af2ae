//! Upload/generation gateway: validates uploaded files, forwards them to
//! the hosted models, and normalizes every outcome into a small error
//! taxonomy the HTTP boundary can map onto status codes.

pub mod avatar;
pub mod backend;
pub mod cards;
pub mod extract;

pub use avatar::generate_avatar;
pub use backend::{GenerationBackend, OpenAiBackend, UpstreamError};
pub use cards::generate_cards;

use thiserror::Error;
use tracing::error;

/// Maximum accepted upload size, checked before any network call.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Normalized classification of a failed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// Bad media type, oversized upload, malformed request
    InvalidInput,
    /// Policy violation reported by the service
    ContentRejected,
    /// Billing or quota limits
    QuotaExceeded,
    /// Rate limit; the user may retry manually
    RateLimited,
    /// Anything unclassified, including no result returned
    ServerError,
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
}

impl GenerationError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::InvalidInput,
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::ServerError,
            message: message.into(),
        }
    }

    /// Classify an upstream failure. The raw detail is logged server-side;
    /// the client only ever sees the fixed message for the classified kind.
    pub fn from_upstream(upstream: UpstreamError) -> Self {
        error!(code = ?upstream.code, detail = %upstream.message, "upstream generation error");
        let (kind, message) = classify_upstream(&upstream);
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

/// Upstream error code → (classification, user-facing message). Unknown
/// codes fall through to the message heuristics below and finally to
/// `ServerError`.
const UPSTREAM_CODE_TABLE: &[(&str, GenerationErrorKind, &str)] = &[
    (
        "unsupported_media_type",
        GenerationErrorKind::InvalidInput,
        "Unsupported image format. Please upload a PNG, JPEG, or WebP image.",
    ),
    (
        "invalid_request_error",
        GenerationErrorKind::InvalidInput,
        "Invalid request. Please check your file format and try again.",
    ),
    (
        "content_policy_violation",
        GenerationErrorKind::ContentRejected,
        "Image rejected by content policy. Please try a different photo.",
    ),
    (
        "insufficient_quota",
        GenerationErrorKind::QuotaExceeded,
        "Generation quota exceeded. Please check the billing settings.",
    ),
    (
        "rate_limit_exceeded",
        GenerationErrorKind::RateLimited,
        "Rate limit exceeded. Please try again in a moment.",
    ),
];

const QUOTA_MESSAGE: &str = "Generation quota exceeded. Please check the billing settings.";
const POLICY_MESSAGE: &str = "Image rejected by content policy. Please try a different photo.";
const FALLBACK_MESSAGE: &str = "Failed to generate image. Please try again.";

fn classify_upstream(upstream: &UpstreamError) -> (GenerationErrorKind, &'static str) {
    if let Some(code) = upstream.code.as_deref() {
        for (known, kind, message) in UPSTREAM_CODE_TABLE {
            if code == *known {
                return (*kind, message);
            }
        }
    }
    let detail = upstream.message.to_lowercase();
    if detail.contains("billing") || detail.contains("quota") {
        return (GenerationErrorKind::QuotaExceeded, QUOTA_MESSAGE);
    }
    if detail.contains("content_policy") {
        return (GenerationErrorKind::ContentRejected, POLICY_MESSAGE);
    }
    (GenerationErrorKind::ServerError, FALLBACK_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(code: Option<&str>, message: &str) -> UpstreamError {
        UpstreamError {
            code: code.map(str::to_string),
            message: message.to_string(),
        }
    }

    #[test]
    fn every_known_code_maps_to_its_kind() {
        for (code, kind, _) in UPSTREAM_CODE_TABLE {
            let (classified, _) = classify_upstream(&upstream(Some(code), "detail"));
            assert_eq!(classified, *kind, "code {code}");
        }
    }

    #[test]
    fn unknown_codes_fall_through_to_server_error() {
        let (kind, message) = classify_upstream(&upstream(Some("banana"), "detail"));
        assert_eq!(kind, GenerationErrorKind::ServerError);
        assert_eq!(message, FALLBACK_MESSAGE);
    }

    #[test]
    fn codeless_errors_use_message_heuristics() {
        let (kind, _) = classify_upstream(&upstream(None, "You exceeded your billing limit"));
        assert_eq!(kind, GenerationErrorKind::QuotaExceeded);

        let (kind, _) = classify_upstream(&upstream(None, "rejected by content_policy filter"));
        assert_eq!(kind, GenerationErrorKind::ContentRejected);

        let (kind, _) = classify_upstream(&upstream(None, "connection reset by peer"));
        assert_eq!(kind, GenerationErrorKind::ServerError);
    }

    #[test]
    fn raw_upstream_detail_is_not_leaked() {
        let error = GenerationError::from_upstream(upstream(Some("banana"), "secret internal detail"));
        assert_eq!(error.kind, GenerationErrorKind::ServerError);
        assert!(!error.message.contains("secret"));
    }
}
