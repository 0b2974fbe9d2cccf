//! Remote and local documents behind one interface.
//!
//! [`Site`] owns the page renderer and, when a remote repository is
//! configured, the [`Resolver`]. Its methods are blocking: remote calls go
//! through `ureq` and local reads through `std::fs`. Async callers run them
//! on a blocking pool.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tracing::debug;

use crate::DocumentError;
use crate::page::{PageRenderer, PageSource, RenderedPage};
use crate::request::{validate_branch, validate_filename};
use crate::resolver::Resolver;

/// Configuration for [`Site`].
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Directory of local Markdown files for preview.
    pub source_dir: PathBuf,
    /// Branch used when a request names none.
    pub default_branch: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("docs"),
            default_branch: "main".to_owned(),
        }
    }
}

/// Serves rendered documents.
pub struct Site {
    config: SiteConfig,
    resolver: Option<Resolver>,
    renderer: PageRenderer,
}

impl Site {
    /// Create a site. Without a resolver every remote request fails with
    /// [`DocumentError::ConfigurationMissing`].
    #[must_use]
    pub fn new(config: SiteConfig, resolver: Option<Resolver>) -> Self {
        Self {
            config,
            resolver,
            renderer: PageRenderer::new(),
        }
    }

    /// Replace the page renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: PageRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Branch used when a request names none.
    pub fn default_branch(&self) -> &str {
        &self.config.default_branch
    }

    /// Local source directory.
    pub fn source_dir(&self) -> &Path {
        &self.config.source_dir
    }

    /// The remote resolver.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::ConfigurationMissing`] if no remote repository
    /// is configured.
    pub fn resolver(&self) -> Result<&Resolver, DocumentError> {
        self.resolver.as_ref().ok_or_else(|| {
            DocumentError::ConfigurationMissing(
                "no remote repository configured ([github] owner and repo)".to_owned(),
            )
        })
    }

    /// Resolve, fetch and render a remote document by bare filename.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::BadRequest`] for a malformed filename or
    /// branch, [`DocumentError::ConfigurationMissing`] without a remote, and
    /// whatever resolution or fetching fails with otherwise.
    pub fn render_remote(
        &self,
        filename: &str,
        branch: Option<&str>,
    ) -> Result<RenderedPage, DocumentError> {
        let branch = branch.unwrap_or(&self.config.default_branch);
        validate_filename(filename)?;
        validate_branch(branch)?;

        let resolved = self.resolver()?.fetch(filename, branch)?;
        let content = self.renderer.render(filename, &resolved.document.text);

        Ok(RenderedPage {
            filename: filename.to_owned(),
            content,
            source: PageSource::Remote {
                branch: resolved.resolution.branch,
                path: resolved.resolution.path,
                last_modified: resolved.document.last_modified,
                candidates: resolved.resolution.candidates,
            },
        })
    }

    /// Read and render a file from the local source directory.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::BadRequest`] for a malformed filename,
    /// [`DocumentError::NotFound`] if the file does not exist and
    /// [`DocumentError::Io`] for other read failures.
    pub fn render_local(&self, filename: &str) -> Result<RenderedPage, DocumentError> {
        let path = self.local_path(filename)?;
        let markdown = fs::read_to_string(&path).map_err(|e| local_error(e, filename))?;
        let content = self.renderer.render(filename, &markdown);

        Ok(RenderedPage {
            filename: filename.to_owned(),
            content,
            source: PageSource::Local { path },
        })
    }

    /// Modification time of a local file as Unix seconds.
    ///
    /// # Errors
    ///
    /// Same as [`Site::render_local`].
    pub fn local_mtime(&self, filename: &str) -> Result<f64, DocumentError> {
        let path = self.local_path(filename)?;
        let modified = fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .map_err(|e| local_error(e, filename))?;
        Ok(modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0))
    }

    /// Markdown files in the local source directory, sorted by name.
    ///
    /// A missing directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Io`] if the directory cannot be read.
    pub fn local_documents(&self) -> Result<Vec<String>, DocumentError> {
        let entries = match fs::read_dir(&self.config.source_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %self.config.source_dir.display(), "Local source directory missing");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && Path::new(name).extension().is_some_and(|ext| ext == "md")
            {
                names.push(name.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn local_path(&self, filename: &str) -> Result<PathBuf, DocumentError> {
        validate_filename(filename)?;
        Ok(self.config.source_dir.join(filename))
    }
}

fn local_error(err: std::io::Error, filename: &str) -> DocumentError {
    if err.kind() == ErrorKind::NotFound {
        DocumentError::NotFound(format!("local file {filename}"))
    } else {
        DocumentError::Io(err)
    }
}
