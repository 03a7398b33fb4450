//! Version-Control Abstraction Layer
//!
//! This crate provides a trait-based abstraction over version control
//! systems, supporting Subversion, Git, and Mercurial through their
//! command-line tools.
//!
//! # Design Goals
//!
//! - **One contract, three backends**: membership checks, revision chains,
//!   diffs, blob retrieval, and working-copy reverts behave identically
//!   regardless of the underlying tool
//! - **Soft membership failure**: `is_versioned` never raises; a missing
//!   tool or a path outside any repository is an ordinary `false`
//! - **No ambient state**: backend enablement and executable overrides live
//!   in an explicit [`VersionControlRegistry`], never in globals
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use vcs::{BackendKind, DiffTarget, VersionControlRegistry};
//!
//! # fn main() -> Result<(), vcs::VcsError> {
//! let registry = VersionControlRegistry::new();
//! let git = registry.backend(BackendKind::Git);
//!
//! let path = Path::new("/path/to/repo/file.rs");
//! if git.is_versioned(path) {
//!     let patch = git.diff(path, DiffTarget::WorkingBase)?;
//!     println!("{}", String::from_utf8_lossy(&patch));
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod registry;
mod traits;
mod types;

pub mod backend;

pub use error::VcsError;
pub use registry::{BackendSettings, VersionControlRegistry};
pub use traits::VcsBackend;
pub use types::{
    BackendKind, DiffTarget, EnabledState, RevisionId, SvnItemState, SvnStatus, SvnStatusEntry,
};

pub use backend::{git::GitClient, hg::HgClient, svn::SvnClient};
