//! Raw file contents.

use edumark_remote::{FetchResult, RemoteContent, RemoteError};
use tracing::debug;

use super::{GitHubRemote, encode_path, encode_segment};
use crate::response::{status_error, transport_error};

impl RemoteContent for GitHubRemote {
    fn fetch(&self, path: &str, branch: &str) -> Result<FetchResult, RemoteError> {
        let url = format!(
            "{}/contents/{}?ref={}",
            self.repo_url(),
            encode_path(path),
            encode_segment(branch)
        );

        debug!(path, branch, "Fetching remote document");

        let response = self
            .prepare(self.content_agent.get(&url))
            .header("Accept", "application/vnd.github.raw")
            .call()
            .map_err(|e| transport_error(&e, self.content_timeout))?;

        let status = response.status().as_u16();
        let last_modified = response
            .headers()
            .get("last-modified")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| transport_error(&e, self.content_timeout))?;

        classify_content(status, last_modified, body, path)
    }
}

/// Turn a contents response into a document or a classified failure.
///
/// 404 is [`RemoteError::NotFound`] so the resolver can heal a stale path.
fn classify_content(
    status: u16,
    last_modified: Option<String>,
    body: String,
    path: &str,
) -> Result<FetchResult, RemoteError> {
    if status == 404 {
        return Err(RemoteError::NotFound {
            path: path.to_owned(),
        });
    }
    if status >= 400 {
        return Err(status_error(status, &body));
    }

    Ok(FetchResult {
        text: body,
        last_modified,
        path: path.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    const LAST_MODIFIED: &str = "Wed, 21 Oct 2026 07:28:00 GMT";

    #[test]
    fn test_content_success_keeps_last_modified() {
        let result = classify_content(
            200,
            Some(LAST_MODIFIED.to_owned()),
            "# Intro\n".to_owned(),
            "week1/intro.md",
        )
        .unwrap();

        assert_eq!(
            result,
            FetchResult {
                text: "# Intro\n".to_owned(),
                last_modified: Some(LAST_MODIFIED.to_owned()),
                path: "week1/intro.md".to_owned(),
            }
        );
    }

    #[test]
    fn test_content_without_last_modified() {
        let result = classify_content(200, None, "body".to_owned(), "a.md").unwrap();
        assert_eq!(result.last_modified, None);
        assert_eq!(result.text, "body");
    }

    #[test]
    fn test_content_404_is_not_found() {
        let err = classify_content(
            404,
            None,
            r#"{"message": "Not Found"}"#.to_owned(),
            "week1/intro.md",
        )
        .unwrap_err();

        assert_eq!(
            err,
            RemoteError::NotFound {
                path: "week1/intro.md".to_owned()
            }
        );
    }

    #[test]
    fn test_content_auth_failures_are_unauthorized() {
        for status in [401, 403] {
            let err = classify_content(status, None, "{}".to_owned(), "a.md").unwrap_err();
            assert_eq!(err, RemoteError::Unauthorized { status });
        }
    }

    #[test]
    fn test_content_other_status_is_rejected() {
        let err = classify_content(
            500,
            None,
            r#"{"message": "Server Error"}"#.to_owned(),
            "a.md",
        )
        .unwrap_err();

        assert_eq!(
            err,
            RemoteError::Rejected {
                status: 500,
                message: "Server Error".to_owned(),
            }
        );
    }

    #[test]
    fn test_content_timeout() {
        let timeout = Duration::from_secs(10);

        let err = transport_error(&ureq::Error::Timeout(ureq::Timeout::Global), timeout);
        assert_eq!(err, RemoteError::Timeout { secs: 10 });

        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        let err = transport_error(&ureq::Error::Io(io), timeout);
        assert_eq!(err, RemoteError::Timeout { secs: 10 });
    }
}
