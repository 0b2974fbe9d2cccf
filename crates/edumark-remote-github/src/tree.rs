//! Recursive git tree listing.

use edumark_remote::{BranchIndex, RemoteError, RemoteTree};
use serde::Deserialize;
use tracing::{info, warn};

use super::{GitHubRemote, encode_segment};
use crate::response::{status_error, transport_error};

/// Upper bound on a tree listing body. GitHub caps listings well below this.
const MAX_TREE_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Option<Vec<TreeEntry>>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl RemoteTree for GitHubRemote {
    fn scan(&self, branch: &str) -> Result<BranchIndex, RemoteError> {
        let url = format!(
            "{}/git/trees/{}?recursive=1",
            self.repo_url(),
            encode_segment(branch)
        );

        info!(branch, "Listing remote tree");

        let response = self
            .prepare(self.tree_agent.get(&url))
            .header("Accept", "application/vnd.github+json")
            .call()
            .map_err(|e| transport_error(&e, self.tree_timeout))?;

        let status = response.status().as_u16();
        let body = response
            .into_body()
            .with_config()
            .limit(MAX_TREE_BYTES)
            .read_to_string()
            .map_err(|e| transport_error(&e, self.tree_timeout))?;

        if status >= 400 {
            return Err(status_error(status, &body));
        }

        let index = parse_tree(branch, &body)?;
        info!(
            branch,
            files = index.len(),
            paths = index.path_count(),
            "Indexed remote tree"
        );
        Ok(index)
    }
}

/// Build a [`BranchIndex`] from a tree listing body.
///
/// Only blobs are indexed; subtrees and submodule commits are skipped.
fn parse_tree(branch: &str, body: &str) -> Result<BranchIndex, RemoteError> {
    let response: TreeResponse = serde_json::from_str(body)
        .map_err(|e| RemoteError::Malformed(format!("tree listing is not valid JSON: {e}")))?;

    let entries = response
        .tree
        .ok_or_else(|| RemoteError::Malformed("tree listing has no `tree` field".to_owned()))?;

    if response.truncated {
        warn!(
            branch,
            entries = entries.len(),
            "Remote tree listing is truncated; some files will not resolve"
        );
    }

    Ok(BranchIndex::from_paths(
        branch,
        entries
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .map(|entry| entry.path),
    ))
}
