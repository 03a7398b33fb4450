//! Git client for the VCS abstraction layer.
//!
//! Shells out to the `git` executable. Repository discovery walks parent
//! directories for a `.git` folder, and every command passes the discovered
//! tree explicitly via `--work-tree`/`--git-dir` so invocations are
//! independent of the process working directory.

use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use utils::path::{discover_tree, repo_relative};
use utils::process::run_tool;

use crate::error::VcsError;
use crate::traits::VcsBackend;
use crate::types::{BackendKind, DiffTarget, RevisionId};

static COMMIT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([0-9a-f]{40})\b").expect("valid regex"));
static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" version ([0-9A-Za-z.]+)").expect("valid regex"));

#[derive(Debug, Clone)]
pub struct GitClient {
    executable: String,
}

impl GitClient {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Nearest ancestor directory containing `.git`
    fn tree_for(&self, path: &Path) -> Option<PathBuf> {
        discover_tree(path, ".git")
    }

    /// Run git with explicit work-tree/git-dir arguments when a tree is
    /// known
    fn git<I, S>(&self, tree: Option<&Path>, args: I) -> Result<Vec<u8>, VcsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut full: Vec<OsString> = Vec::new();
        if let Some(tree) = tree {
            full.push(format!("--work-tree={}", tree.display()).into());
            full.push(format!("--git-dir={}", tree.join(".git").display()).into());
        }
        full.extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));

        Ok(run_tool(&self.executable, full, None)?)
    }
}

fn parse_revisions(output: &str) -> Vec<RevisionId> {
    COMMIT_LINE
        .captures_iter(output)
        .map(|caps| RevisionId::new(&caps[1]))
        .collect()
}

fn parse_version(output: &str) -> Option<String> {
    VERSION
        .captures(output)
        .map(|caps| caps[1].to_string())
}

impl VcsBackend for GitClient {
    fn kind(&self) -> BackendKind {
        BackendKind::Git
    }

    fn is_versioned(&self, path: &Path) -> bool {
        if !path.exists() {
            return false;
        }
        let Some(tree) = self.tree_for(path) else {
            return false;
        };

        let mut args: Vec<OsString> =
            vec!["status".into(), "--ignored".into(), "--porcelain".into(), "--".into()];
        args.push(path.as_os_str().to_os_string());

        match self.git(Some(&tree), args) {
            // `!!` marks ignored entries and `??` untracked ones; a tracked,
            // unmodified file produces no output at all.
            Ok(output) => !(output.starts_with(b"!!") || output.starts_with(b"??")),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "git status probe failed");
                false
            }
        }
    }

    fn revision_chain(&self, path: &Path, count: usize) -> Result<Vec<RevisionId>, VcsError> {
        let Some(tree) = self.tree_for(path) else {
            return Ok(Vec::new());
        };

        let mut args: Vec<OsString> = vec![
            "log".into(),
            "--no-color".into(),
            "--pretty=oneline".into(),
            "-n".into(),
            count.to_string().into(),
            "--".into(),
        ];
        args.push(path.as_os_str().to_os_string());

        let output = self.git(Some(&tree), args)?;
        Ok(parse_revisions(&String::from_utf8_lossy(&output)))
    }

    fn diff(&self, path: &Path, target: DiffTarget) -> Result<Vec<u8>, VcsError> {
        let Some(tree) = self.tree_for(path) else {
            return Ok(Vec::new());
        };

        let mut args: Vec<OsString> = vec!["diff".into(), "--no-color".into()];
        match target {
            DiffTarget::WorkingBase => args.push("HEAD".into()),
            DiffTarget::Staged => {
                args.push("--cached".into());
                args.push("HEAD".into());
            }
            DiffTarget::PreviousRevision => {
                let chain = self.revision_chain(path, 2)?;
                if chain.len() < 2 {
                    return Ok(Vec::new());
                }
                args.push(chain[1].as_str().into());
            }
        }
        args.push("--".into());
        args.push(path.as_os_str().to_os_string());

        self.git(Some(&tree), args)
    }

    fn fetch_blob(
        &self,
        path: &Path,
        revision: Option<&RevisionId>,
    ) -> Result<Option<Vec<u8>>, VcsError> {
        let Some(tree) = self.tree_for(path) else {
            return Ok(None);
        };
        let Some(rel) = repo_relative(path, &tree) else {
            return Ok(None);
        };

        let rev = revision.map(RevisionId::as_str).unwrap_or("HEAD");
        match self.git(Some(&tree), ["show".to_string(), format!("{rev}:{rel}")]) {
            Ok(blob) => Ok(Some(blob)),
            Err(VcsError::Exec(utils::process::ExecError::Failed { output, .. })) => {
                tracing::warn!(path = %path.display(), rev, output, "git show could not produce blob");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn revert(&self, path: &Path) -> Result<(), VcsError> {
        let tree = self
            .tree_for(path)
            .ok_or_else(|| VcsError::not_versioned(path))?;

        let mut args: Vec<OsString> = vec!["checkout".into(), "--".into()];
        args.push(path.as_os_str().to_os_string());

        self.git(Some(&tree), args)?;
        Ok(())
    }

    fn version(&self) -> Result<String, VcsError> {
        let output = self.git(None, ["--version"])?;
        parse_version(&String::from_utf8_lossy(&output))
            .ok_or_else(|| VcsError::parse("git", "no version string in --version output"))
    }
}
