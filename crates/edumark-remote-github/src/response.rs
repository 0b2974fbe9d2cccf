//! Classification of GitHub responses into [`RemoteError`].

use std::time::Duration;

use edumark_remote::RemoteError;

/// Longest diagnostic kept from an error body, in characters.
const MAX_DIAGNOSTIC: usize = 200;

/// Map a transport failure. Timeouts get their own class.
pub(crate) fn transport_error(err: &ureq::Error, timeout: Duration) -> RemoteError {
    match err {
        ureq::Error::Timeout(_) => RemoteError::Timeout {
            secs: timeout.as_secs(),
        },
        ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
            RemoteError::Timeout {
                secs: timeout.as_secs(),
            }
        }
        other => RemoteError::Unavailable(other.to_string()),
    }
}

/// Map a non-success status that is not a "not found" for the caller.
pub(crate) fn status_error(status: u16, body: &str) -> RemoteError {
    match status {
        401 | 403 => RemoteError::Unauthorized { status },
        _ => RemoteError::Rejected {
            status,
            message: diagnostic(body),
        },
    }
}

/// Short human-readable diagnostic from an error body.
///
/// GitHub error bodies are `{"message": "..."}`; anything else is used raw.
pub(crate) fn diagnostic(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_owned());
    truncate(&message, MAX_DIAGNOSTIC)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_unauthorized_statuses() {
        assert_eq!(
            status_error(401, "{}"),
            RemoteError::Unauthorized { status: 401 }
        );
        assert_eq!(
            status_error(403, "rate limited"),
            RemoteError::Unauthorized { status: 403 }
        );
    }

    #[test]
    fn test_rejected_uses_message_field() {
        let err = status_error(
            422,
            r#"{"message": "No commit found for SHA: nope", "documentation_url": "https://docs"}"#,
        );
        assert_eq!(
            err,
            RemoteError::Rejected {
                status: 422,
                message: "No commit found for SHA: nope".to_owned(),
            }
        );
    }

    #[test]
    fn test_diagnostic_is_truncated() {
        let body = "é".repeat(500);
        let message = diagnostic(&body);
        assert_eq!(message.chars().count(), MAX_DIAGNOSTIC + 3);
        assert!(message.ends_with("..."));
    }

    #[test]
    fn test_diagnostic_raw_body() {
        assert_eq!(diagnostic("  Bad Gateway\n"), "Bad Gateway");
    }
}
