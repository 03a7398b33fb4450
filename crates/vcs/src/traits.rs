use std::path::Path;

use crate::error::VcsError;
use crate::types::{BackendKind, DiffTarget, RevisionId};

/// Shared contract implemented by every version-control backend.
///
/// Backends are cheap, stateless clients around one tool executable;
/// repository roots are rediscovered on every call so the contract stays
/// valid across arbitrary working-copy edits between calls.
pub trait VcsBackend {
    /// Which VCS this backend speaks
    fn kind(&self) -> BackendKind;

    /// Whether `path` is tracked by this VCS.
    ///
    /// Fails soft: a path that does not exist, lies outside any repository,
    /// or cannot be probed (tool missing, tool error) is `false`, never an
    /// error. Ignored and untracked files are not versioned.
    fn is_versioned(&self, path: &Path) -> bool;

    /// The most recent revisions touching `path`, newest first. May return
    /// fewer than `count` entries when history is short.
    fn revision_chain(&self, path: &Path, count: usize) -> Result<Vec<RevisionId>, VcsError>;

    /// Unified diff of the working file against `target`. Empty bytes mean
    /// no difference; diffing against a previous revision that does not
    /// exist is also empty bytes, not an error.
    fn diff(&self, path: &Path, target: DiffTarget) -> Result<Vec<u8>, VcsError>;

    /// Historical content of `path` at `revision` (working base when
    /// `None`). `Ok(None)` when the backend cannot produce the blob.
    fn fetch_blob(
        &self,
        path: &Path,
        revision: Option<&RevisionId>,
    ) -> Result<Option<Vec<u8>>, VcsError>;

    /// Restore `path` to its last-committed state. Errors propagate; user
    /// confirmation is the caller's responsibility.
    fn revert(&self, path: &Path) -> Result<(), VcsError>;

    /// The tool's own version string, used as the enablement probe. An
    /// error means the tool is not available.
    fn version(&self) -> Result<String, VcsError>;
}
