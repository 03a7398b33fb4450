//! Version-control command orchestration.
//!
//! Each user-invoked operation runs in two phases: [`VcsCommands::prepare`]
//! performs the cheap checks (enablement probe, buffer-name sanitization,
//! membership) and either short-circuits with a status message or yields a
//! [`PreparedOperation`]; [`VcsCommands::execute`] performs the subprocess
//! work. Terminal failures surface as host notifications and never
//! propagate out of `execute`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utils::diff::decode_output;
use utils::path::sanitize_buffer_name;
use utils::process::launch_detached;
use vcs::{
    BackendKind, BackendSettings, DiffTarget, EnabledState, RevisionId, VcsBackend, VcsError,
    VersionControlRegistry,
};

use crate::services::host::EditorHost;

/// The full configuration surface consumed from the host's settings store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffSettings {
    pub svn: BackendSettings,
    pub git: BackendSettings,
    pub hg: BackendSettings,
    /// External diff executable; internal panel display when absent
    pub external_diff: Option<PathBuf>,
}

impl DiffSettings {
    fn for_kind(&self, kind: BackendKind) -> &BackendSettings {
        match kind {
            BackendKind::Subversion => &self.svn,
            BackendKind::Git => &self.git,
            BackendKind::Mercurial => &self.hg,
        }
    }
}

/// What to do with the prepared file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsAction {
    /// Show a unified diff in the internal panel
    Diff(DiffTarget),
    /// Restore the working file to its last-committed state
    Revert,
    /// Export the historical side and hand both files to the external tool
    ExternalDiff(DiffTarget),
}

/// Output of the prepare phase: a checked, normalized operation
#[derive(Debug, Clone)]
pub struct PreparedOperation {
    pub kind: BackendKind,
    pub path: PathBuf,
    pub action: VcsAction,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrepareError {
    #[error("No file behind the current view")]
    NoFile,
    #[error("{0} support is disabled")]
    Disabled(BackendKind),
    #[error("\"{path}\" is not versioned under {kind}")]
    NotVersioned { kind: BackendKind, path: String },
}

/// Orchestrator for the version-control commands, owned by the host and
/// driven from its (single-threaded) command dispatch.
pub struct VcsCommands<H> {
    registry: VersionControlRegistry,
    external_diff: Option<PathBuf>,
    // Lazily created, reused for every export, and deliberately never
    // deleted: the external tool is launched without waiting, so the
    // exported files must outlive this process (accepted accumulation).
    export_dir: Option<PathBuf>,
    host: H,
}

impl<H: EditorHost> VcsCommands<H> {
    pub fn new(settings: DiffSettings, host: H) -> Self {
        let mut commands = Self {
            registry: VersionControlRegistry::new(),
            external_diff: None,
            export_dir: None,
            host,
        };
        commands.update_settings(settings);
        commands
    }

    /// Re-apply host settings; backends whose executable path changed are
    /// re-probed on their next use
    pub fn update_settings(&mut self, settings: DiffSettings) {
        for kind in BackendKind::all() {
            self.registry.configure(kind, settings.for_kind(kind).clone());
        }
        self.external_diff = settings.external_diff;
    }

    pub fn registry(&self) -> &VersionControlRegistry {
        &self.registry
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Prepare and execute in one step. Negative membership is prominent;
    /// the other prepare failures stay in the status bar.
    pub fn run(&mut self, kind: BackendKind, buffer_name: &str, action: VcsAction) {
        match self.prepare(kind, buffer_name, action) {
            Ok(op) => self.execute(op),
            Err(err @ PrepareError::NotVersioned { .. }) => self.host.notify(&err.to_string()),
            Err(err) => self.host.status(&err.to_string()),
        }
    }

    /// Phase one: enablement, name normalization, membership
    pub fn prepare(
        &mut self,
        kind: BackendKind,
        buffer_name: &str,
        action: VcsAction,
    ) -> Result<PreparedOperation, PrepareError> {
        let name = sanitize_buffer_name(buffer_name);
        if name.is_empty() {
            return Err(PrepareError::NoFile);
        }

        let backend = self.registry.backend(kind);
        if self.registry.ensure_probed(kind, backend.as_ref()) != EnabledState::Enabled {
            return Err(PrepareError::Disabled(kind));
        }

        let path = PathBuf::from(name);
        if !backend.is_versioned(&path) {
            return Err(PrepareError::NotVersioned {
                kind,
                path: path.display().to_string(),
            });
        }

        Ok(PreparedOperation { kind, path, action })
    }

    /// Phase two: run the action; failures become notifications
    pub fn execute(&mut self, op: PreparedOperation) {
        let backend = self.registry.backend(op.kind);
        let result = match op.action {
            VcsAction::Diff(target) => self.internal_diff(backend.as_ref(), &op.path, target),
            VcsAction::Revert => self.revert_flow(backend.as_ref(), &op.path),
            VcsAction::ExternalDiff(target) => {
                self.external_flow(backend.as_ref(), &op.path, target)
            }
        };

        if let Err(err) = result {
            tracing::error!(
                kind = %op.kind,
                path = %op.path.display(),
                error = %err,
                "version-control operation failed"
            );
            self.host.notify(&format!(
                "{} operation failed; check that the {} tool is installed and working",
                op.kind,
                op.kind.name()
            ));
        }
    }

    fn internal_diff(
        &self,
        backend: &dyn VcsBackend,
        path: &Path,
        target: DiffTarget,
    ) -> Result<(), VcsError> {
        let raw = backend.diff(path, target)?;
        let encoding = self.host.buffer_encoding(path);
        let text = decode_output(&raw, encoding.as_deref());

        if text.is_empty() {
            self.host.status("No Difference");
            return Ok(());
        }

        let basename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.host
            .present_diff(&format!("{} ({})", backend.kind().name(), basename), &text);
        Ok(())
    }

    fn revert_flow(&self, backend: &dyn VcsBackend, path: &Path) -> Result<(), VcsError> {
        // Check for pending changes first so the confirmation dialog is
        // skipped when there is nothing to do.
        let pending = backend.diff(path, DiffTarget::WorkingBase)?;
        if pending.is_empty() {
            self.host.notify("Nothing to Revert");
            return Ok(());
        }

        if !self.host.confirm(&format!("Revert \"{}\"?", path.display())) {
            return Ok(());
        }

        if let Err(err) = backend.revert(path) {
            tracing::error!(path = %path.display(), error = %err, "revert failed");
            self.host
                .notify(&format!("Failed to revert \"{}\"", path.display()));
        }
        Ok(())
    }

    fn external_flow(
        &mut self,
        backend: &dyn VcsBackend,
        path: &Path,
        target: DiffTarget,
    ) -> Result<(), VcsError> {
        let Some(tool) = self.external_diff.clone() else {
            self.host.notify("No external diff tool is configured");
            return Ok(());
        };

        let revision = match target {
            DiffTarget::WorkingBase | DiffTarget::Staged => None,
            DiffTarget::PreviousRevision => {
                let chain = backend.revision_chain(path, 2)?;
                match chain.into_iter().nth(1) {
                    Some(rev) => Some(rev),
                    None => {
                        self.host.status("No previous revision");
                        return Ok(());
                    }
                }
            }
        };

        let Some(blob) = backend.fetch_blob(path, revision.as_ref())? else {
            self.host
                .notify("Could not retrieve the requested revision for comparison");
            return Ok(());
        };

        let dir = self.export_dir()?;
        let left = dir.join(export_file_name(path, revision.as_ref()));
        std::fs::write(&left, &blob)?;

        // Fire and forget: no wait, no output capture.
        launch_detached(
            &tool.to_string_lossy(),
            [left.as_os_str(), path.as_os_str()],
        )?;
        Ok(())
    }

    fn export_dir(&mut self) -> std::io::Result<PathBuf> {
        if let Some(dir) = &self.export_dir {
            return Ok(dir.clone());
        }

        let dir = tempfile::Builder::new().prefix("vcsdiff-").tempdir()?.keep();
        tracing::debug!(dir = %dir.display(), "created export directory");
        self.export_dir = Some(dir.clone());
        Ok(dir)
    }
}

/// Deterministic name for an exported historical blob:
/// `<basename>-r<revision>-LEFT<ext>`; the working file itself is always
/// the right side.
fn export_file_name(path: &Path, revision: Option<&RevisionId>) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string());
    let ext = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let rev = revision.map(RevisionId::as_str).unwrap_or("BASE");
    format!("{stem}-r{rev}-LEFT{ext}")
}
