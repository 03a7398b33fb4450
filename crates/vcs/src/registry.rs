use serde::{Deserialize, Serialize};

use crate::backend::{git::GitClient, hg::HgClient, svn::SvnClient};
use crate::traits::VcsBackend;
use crate::types::{BackendKind, EnabledState};

/// Host-provided configuration for one backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Executable path override; the tool name on `PATH` when absent
    pub executable: Option<String>,
    /// Hard-disable the backend regardless of probing
    pub disabled: bool,
    /// Treat the backend as enabled without running the version probe
    pub skip_version_check: bool,
}

#[derive(Debug, Default)]
struct BackendEntry {
    settings: BackendSettings,
    enabled: EnabledState,
}

/// Explicit per-backend state: executable overrides and the tri-state
/// enablement cache.
///
/// The registry is plain owned data handed to the orchestrator; it carries
/// no synchronization because the host dispatches commands on a single
/// thread. A concurrent host must wrap it in a mutex.
#[derive(Debug, Default)]
pub struct VersionControlRegistry {
    svn: BackendEntry,
    git: BackendEntry,
    hg: BackendEntry,
}

impl VersionControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, kind: BackendKind) -> &BackendEntry {
        match kind {
            BackendKind::Subversion => &self.svn,
            BackendKind::Git => &self.git,
            BackendKind::Mercurial => &self.hg,
        }
    }

    fn entry_mut(&mut self, kind: BackendKind) -> &mut BackendEntry {
        match kind {
            BackendKind::Subversion => &mut self.svn,
            BackendKind::Git => &mut self.git,
            BackendKind::Mercurial => &mut self.hg,
        }
    }

    /// Apply new settings for one backend. Any settings change resets the
    /// enablement cache so the next operation re-resolves it; a disable that
    /// arrives after a successful probe must win.
    pub fn configure(&mut self, kind: BackendKind, settings: BackendSettings) {
        let entry = self.entry_mut(kind);
        if entry.settings != settings {
            entry.enabled = EnabledState::Unknown;
        }
        entry.settings = settings;
    }

    /// The executable this backend will invoke
    pub fn executable(&self, kind: BackendKind) -> String {
        self.entry(kind)
            .settings
            .executable
            .clone()
            .unwrap_or_else(|| kind.default_program().to_string())
    }

    /// Construct a client for `kind` with the currently configured
    /// executable
    pub fn backend(&self, kind: BackendKind) -> Box<dyn VcsBackend> {
        let executable = self.executable(kind);
        match kind {
            BackendKind::Subversion => Box::new(SvnClient::new(executable)),
            BackendKind::Git => Box::new(GitClient::new(executable)),
            BackendKind::Mercurial => Box::new(HgClient::new(executable)),
        }
    }

    /// Cached enablement state without probing
    pub fn state(&self, kind: BackendKind) -> EnabledState {
        self.entry(kind).enabled
    }

    pub fn is_enabled(&self, kind: BackendKind) -> bool {
        self.entry(kind).enabled == EnabledState::Enabled
    }

    /// Resolve the enablement state, running the version probe at most once
    /// per executable-path configuration. Probe failures disable the backend
    /// and are logged, never surfaced as errors.
    pub fn ensure_probed(&mut self, kind: BackendKind, backend: &dyn VcsBackend) -> EnabledState {
        let entry = self.entry_mut(kind);

        if entry.enabled != EnabledState::Unknown {
            return entry.enabled;
        }

        entry.enabled = if entry.settings.disabled {
            tracing::debug!(%kind, "backend disabled by configuration");
            EnabledState::Disabled
        } else if entry.settings.skip_version_check {
            tracing::debug!(%kind, "version check skipped, assuming enabled");
            EnabledState::Enabled
        } else {
            match backend.version() {
                Ok(version) => {
                    tracing::info!(%kind, version, "backend enabled");
                    EnabledState::Enabled
                }
                Err(err) => {
                    tracing::warn!(%kind, error = %err, "version probe failed, backend disabled");
                    EnabledState::Disabled
                }
            }
        };

        entry.enabled
    }
}
