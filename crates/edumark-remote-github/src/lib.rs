//! GitHub REST client for EduMark.
//!
//! Implements [`RemoteTree`](edumark_remote::RemoteTree) with one recursive
//! git tree listing and [`RemoteContent`](edumark_remote::RemoteContent) with
//! the raw contents endpoint. Both are sync `ureq` calls with their own global
//! timeout.

mod contents;
mod response;
mod tree;

use std::time::Duration;

use edumark_config::{GitHubConfig, Token};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use ureq::Agent;

/// Characters escaped inside one URL path segment or query value.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const USER_AGENT: &str = concat!("edumark/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// GitHub repository remote.
pub struct GitHubRemote {
    tree_agent: Agent,
    content_agent: Agent,
    api_url: String,
    owner: String,
    repo: String,
    token: Token,
    tree_timeout: Duration,
    content_timeout: Duration,
}

impl GitHubRemote {
    /// Create a remote from validated config values.
    #[must_use]
    pub fn from_config(config: &GitHubConfig) -> Self {
        let tree_timeout = config.tree_timeout();
        let content_timeout = config.content_timeout();

        Self {
            tree_agent: build_agent(tree_timeout),
            content_agent: build_agent(content_timeout),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token: config.token.clone(),
            tree_timeout,
            content_timeout,
        }
    }

    /// Repository API base: `{api}/repos/{owner}/{repo}`.
    fn repo_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_url,
            encode_segment(&self.owner),
            encode_segment(&self.repo)
        )
    }

    /// Attach the headers every call carries.
    fn prepare<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        let request = request
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION);
        if self.token.is_empty() {
            request
        } else {
            request.header("Authorization", &format!("Bearer {}", self.token.expose()))
        }
    }
}

impl std::fmt::Debug for GitHubRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubRemote")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

fn build_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// Encode a repository path segment by segment, keeping `/` separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn config(token: &str) -> GitHubConfig {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            github: GitHubConfig,
        }
        let wrapper: Wrapper = serde_json::from_value(serde_json::json!({
            "github": {
                "owner": "acme",
                "repo": "lectures",
                "token": token,
                "api_url": "https://ghe.example.com/api/v3/",
            }
        }))
        .unwrap();
        wrapper.github
    }

    #[test]
    fn test_repo_url_trims_trailing_slash() {
        let remote = GitHubRemote::from_config(&config(""));
        assert_eq!(
            remote.repo_url(),
            "https://ghe.example.com/api/v3/repos/acme/lectures"
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let remote = GitHubRemote::from_config(&config("ghp_secret"));
        let debug = format!("{remote:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("acme"));
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(
            encode_path("week 1/intro & setup.md"),
            "week%201/intro%20%26%20setup.md"
        );
        assert_eq!(encode_segment("feature/x"), "feature%2Fx");
    }
}
