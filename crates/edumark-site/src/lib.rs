//! Document resolution and page rendering for EduMark.
//!
//! This crate provides:
//! - [`Resolver`]: bare filename to remote document, with a persisted
//!   per-branch index that heals itself once per request when stale
//! - [`TagExtractor`]: the `tags: a, b, c` metadata line
//! - [`PageRenderer`]: tags, body HTML and table of contents for one document
//! - [`Site`]: remote and local documents behind one interface
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use edumark_cache::NullCache;
//! use edumark_site::{Resolver, Site, SiteConfig};
//!
//! let remote = Arc::new(github_remote);
//! let resolver = Resolver::new(remote.clone(), remote, &NullCache);
//! let site = Site::new(SiteConfig::default(), Some(resolver));
//!
//! let page = site.render_remote("intro.md", None)?;
//! println!("{}: {:?}", page.title, page.tags);
//! ```

mod error;
mod page;
mod request;
mod resolver;
mod site;
mod tags;

pub use error::DocumentError;
pub use page::{PageContent, PageRenderer, PageSource, RenderedPage};
pub use request::{validate_branch, validate_filename};
pub use resolver::{Resolution, ResolvedDocument, Resolver};
pub use site::{Site, SiteConfig};
pub use tags::{LooseTagExtractor, TagExtractor, extract_tags, strip_tags_line};

pub use edumark_renderer::TocEntry;
