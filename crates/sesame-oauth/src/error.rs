//! Mapping of HTTP failures into sesame errors.

use serde_json::Value;
use sesame_core::error::{ProviderError, UpstreamError};

/// Classify a transport failure talking to `provider`.
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout {
            provider: provider.to_string(),
        }
    } else if err.is_decode() {
        UpstreamError::MalformedResponse {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    } else {
        UpstreamError::Connection {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }
}

/// Build a provider error from an error status and its body.
///
/// Providers disagree on the error shape; the first of `error_description`,
/// `message` and `error` that is a string wins.
pub(crate) fn provider_error(provider: &str, status: u16, body: &str) -> UpstreamError {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["error_description", "message", "error"]
            .iter()
            .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
    });

    UpstreamError::Provider(ProviderError::new(provider, status, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_prefers_description() {
        let err = provider_error(
            "github",
            401,
            r#"{"error": "invalid_token", "error_description": "token revoked"}"#,
        );
        assert_eq!(err.to_string(), "github returned HTTP 401: token revoked");
    }

    #[test]
    fn provider_error_without_json_body() {
        let err = provider_error("github", 502, "<html>Bad Gateway</html>");
        match err {
            UpstreamError::Provider(e) => {
                assert_eq!(e.status, 502);
                assert!(e.message.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
