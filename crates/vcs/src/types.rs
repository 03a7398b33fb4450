use serde::{Deserialize, Serialize};

/// Represents a single revision identifier in the VCS: a 40-hex commit hash
/// (Git), a changeset node (Mercurial), a numeric revision, or a keyword
/// revision such as `BASE` or `PREV` (Subversion).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RevisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RevisionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Which version-control system a backend speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    Subversion,
    Git,
    Mercurial,
}

impl BackendKind {
    /// Short user-facing name, used in notifications and panel titles
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Subversion => "SVN",
            BackendKind::Git => "Git",
            BackendKind::Mercurial => "Mercurial",
        }
    }

    /// Default executable when no path override is configured
    pub fn default_program(&self) -> &'static str {
        let unix = match self {
            BackendKind::Subversion => ("svn", "svn.exe"),
            BackendKind::Git => ("git", "git.exe"),
            BackendKind::Mercurial => ("hg", "hg.exe"),
        };
        if cfg!(windows) {
            unix.1
        } else {
            unix.0
        }
    }

    pub fn all() -> [BackendKind; 3] {
        [
            BackendKind::Subversion,
            BackendKind::Git,
            BackendKind::Mercurial,
        ]
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a diff is computed against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTarget {
    /// The last-committed snapshot of the file
    WorkingBase,
    /// The parent of the current revision; a no-op when history is shorter
    /// than two revisions
    PreviousRevision,
    /// Staged content only. Git-specific; the other backends have no staging
    /// area and treat this as [`DiffTarget::WorkingBase`].
    Staged,
}

/// Per-backend enablement, cached at process scope and re-probed only when
/// the configured executable path changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnabledState {
    #[default]
    Unknown,
    Enabled,
    Disabled,
}

/// The fixed set of working-copy item states reported by `svn status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SvnItemState {
    Added,
    Conflicted,
    Deleted,
    External,
    Ignored,
    Incomplete,
    Merged,
    Missing,
    Modified,
    None,
    Normal,
    Obstructed,
    Replaced,
    Unversioned,
}

impl SvnItemState {
    /// Classify the `item` attribute of a `wc-status` element
    pub fn parse(item: &str) -> Option<Self> {
        Some(match item {
            "added" => Self::Added,
            "conflicted" => Self::Conflicted,
            "deleted" => Self::Deleted,
            "external" => Self::External,
            "ignored" => Self::Ignored,
            "incomplete" => Self::Incomplete,
            "merged" => Self::Merged,
            "missing" => Self::Missing,
            "modified" => Self::Modified,
            "none" => Self::None,
            "normal" => Self::Normal,
            "obstructed" => Self::Obstructed,
            "replaced" => Self::Replaced,
            "unversioned" => Self::Unversioned,
            _ => return None,
        })
    }
}

/// A classified `svn status` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvnStatusEntry {
    pub path: String,
    pub state: SvnItemState,
}

/// Classified output of one `svn status` query
#[derive(Debug, Clone, Default)]
pub struct SvnStatus {
    pub entries: Vec<SvnStatusEntry>,
}

impl SvnStatus {
    /// Paths reported in the given state
    pub fn with_state(&self, state: SvnItemState) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |entry| entry.state == state)
            .map(|entry| entry.path.as_str())
    }

    /// Whether any entry is in the given state
    pub fn any(&self, state: SvnItemState) -> bool {
        self.entries.iter().any(|entry| entry.state == state)
    }
}
