//! Per-branch filename index.

use std::collections::HashMap;

/// Bare filename of a repository path (text after the last `/`).
#[must_use]
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Known file layout of one branch at one point in time.
///
/// Maps a bare filename to every full path where it occurs, in the order the
/// paths were discovered. The first path wins when a filename is ambiguous.
///
/// Every key has at least one path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchIndex {
    branch: String,
    entries: Vec<(String, Vec<String>)>,
    positions: HashMap<String, usize>,
}

impl BranchIndex {
    /// Create an empty index for `branch`.
    #[must_use]
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Build an index from full file paths in listing order.
    #[must_use]
    pub fn from_paths<I, S>(branch: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::new(branch);
        for path in paths {
            index.insert(path);
        }
        index
    }

    /// Rebuild an index from its persisted association list.
    ///
    /// Empty path lists are dropped; a repeated filename has its paths
    /// appended to the first occurrence.
    #[must_use]
    pub fn from_pairs(branch: impl Into<String>, pairs: Vec<(String, Vec<String>)>) -> Self {
        let mut index = Self::new(branch);
        for (name, paths) in pairs {
            if paths.is_empty() {
                continue;
            }
            match index.positions.get(&name) {
                Some(&pos) => index.entries[pos].1.extend(paths),
                None => {
                    index.positions.insert(name.clone(), index.entries.len());
                    index.entries.push((name, paths));
                }
            }
        }
        index
    }

    /// Persistable association list `[(filename, [path, ...]), ...]`.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, Vec<String>)> {
        self.entries.clone()
    }

    /// Record a full path under its bare filename.
    ///
    /// Paths ending in `/` or empty paths are ignored.
    pub fn insert(&mut self, path: impl Into<String>) {
        let path = path.into();
        let name = basename(&path);
        if name.is_empty() {
            return;
        }
        if let Some(&pos) = self.positions.get(name) {
            self.entries[pos].1.push(path);
        } else {
            let name = name.to_owned();
            self.positions.insert(name.clone(), self.entries.len());
            self.entries.push((name, vec![path]));
        }
    }

    /// Primary path for `filename`: the first one discovered.
    #[must_use]
    pub fn lookup(&self, filename: &str) -> Option<&str> {
        self.candidates(filename)
            .and_then(|paths| paths.first())
            .map(String::as_str)
    }

    /// All known paths for `filename`, in discovery order.
    #[must_use]
    pub fn candidates(&self, filename: &str) -> Option<&[String]> {
        let pos = *self.positions.get(filename)?;
        Some(&self.entries[pos].1)
    }

    /// Branch this index describes.
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Number of distinct filenames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no file is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of indexed paths.
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.entries.iter().map(|(_, paths)| paths.len()).sum()
    }

    /// Filenames with more than one path.
    pub fn ambiguous(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(name, paths)| (name.as_str(), paths.as_slice()))
    }
}
