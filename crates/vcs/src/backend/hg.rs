//! Mercurial client for the VCS abstraction layer.
//!
//! Shells out to the `hg` executable with the target file's directory as
//! the working directory; hg resolves its own repository root from there.
//! History queries use the XML log style, which is stable across hg
//! versions and locales.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use utils::process::run_tool;

use crate::error::VcsError;
use crate::traits::VcsBackend;
use crate::types::{BackendKind, DiffTarget, RevisionId};

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bversion ([0-9A-Za-z.]+)").expect("valid regex"));

#[derive(Debug, Clone)]
pub struct HgClient {
    executable: String,
}

impl HgClient {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Directory hg runs from: the file's parent, or the path itself for
    /// directories
    fn cwd_for(path: &Path) -> Option<PathBuf> {
        if path.is_dir() {
            Some(path.to_path_buf())
        } else {
            path.parent().map(Path::to_path_buf)
        }
    }

    fn hg<I, S>(&self, cwd: Option<&Path>, args: I) -> Result<Vec<u8>, VcsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Ok(run_tool(&self.executable, args, cwd)?)
    }

    /// XML-formatted log for `path`, limited to `limit` entries when
    /// non-zero
    fn log_xml(&self, path: &Path, limit: usize) -> Result<Vec<u8>, VcsError> {
        let mut args: Vec<std::ffi::OsString> = vec!["log".into(), "--style=xml".into()];
        if limit != 0 {
            args.push("-l".into());
            args.push(limit.to_string().into());
        }
        args.push(path.as_os_str().to_os_string());

        self.hg(Self::cwd_for(path).as_deref(), args)
    }
}

/// Extract the changeset node of each `logentry` element
fn parse_log_nodes(xml: &str) -> Result<Vec<RevisionId>, VcsError> {
    if xml.trim().is_empty() {
        return Ok(Vec::new());
    }

    let doc = roxmltree::Document::parse(xml.trim())
        .map_err(|err| VcsError::parse("hg", err.to_string()))?;

    Ok(doc
        .descendants()
        .filter(|node| node.has_tag_name("logentry"))
        .filter_map(|node| node.attribute("node"))
        .map(RevisionId::new)
        .collect())
}

fn parse_version(output: &str) -> Option<String> {
    VERSION.captures(output).map(|caps| caps[1].to_string())
}

impl VcsBackend for HgClient {
    fn kind(&self) -> BackendKind {
        BackendKind::Mercurial
    }

    fn is_versioned(&self, path: &Path) -> bool {
        if !path.exists() {
            return false;
        }

        // A 1-entry log query doubles as the membership probe; any failure
        // (not a repository, tool missing) is an ordinary negative.
        match self
            .log_xml(path, 1)
            .and_then(|output| parse_log_nodes(&String::from_utf8_lossy(&output)))
        {
            Ok(nodes) => !nodes.is_empty(),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "hg log probe failed");
                false
            }
        }
    }

    fn revision_chain(&self, path: &Path, count: usize) -> Result<Vec<RevisionId>, VcsError> {
        let output = self.log_xml(path, count)?;
        parse_log_nodes(&String::from_utf8_lossy(&output))
    }

    fn diff(&self, path: &Path, target: DiffTarget) -> Result<Vec<u8>, VcsError> {
        let mut args: Vec<std::ffi::OsString> = vec!["diff".into(), "-p".into()];
        match target {
            // No staging area; staged content is the working base.
            DiffTarget::WorkingBase | DiffTarget::Staged => {}
            DiffTarget::PreviousRevision => {
                let chain = self.revision_chain(path, 2)?;
                if chain.len() < 2 {
                    return Ok(Vec::new());
                }
                args.push("-r".into());
                args.push(chain[1].as_str().into());
            }
        }
        args.push(path.as_os_str().to_os_string());

        self.hg(Self::cwd_for(path).as_deref(), args)
    }

    fn fetch_blob(
        &self,
        path: &Path,
        revision: Option<&RevisionId>,
    ) -> Result<Option<Vec<u8>>, VcsError> {
        let mut args: Vec<std::ffi::OsString> = vec!["cat".into()];
        args.push(path.as_os_str().to_os_string());
        if let Some(rev) = revision {
            args.push("-r".into());
            args.push(rev.as_str().into());
        }

        match self.hg(Self::cwd_for(path).as_deref(), args) {
            Ok(blob) => Ok(Some(blob)),
            Err(VcsError::Exec(utils::process::ExecError::Failed { output, .. })) => {
                tracing::warn!(path = %path.display(), output, "hg cat could not produce blob");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn revert(&self, path: &Path) -> Result<(), VcsError> {
        // --no-backup is destructive: no .orig file is left behind, so
        // callers must confirm first.
        let mut args: Vec<std::ffi::OsString> = vec!["revert".into(), "--no-backup".into()];
        args.push(path.as_os_str().to_os_string());

        self.hg(Self::cwd_for(path).as_deref(), args)?;
        Ok(())
    }

    fn version(&self) -> Result<String, VcsError> {
        let output = self.hg(None, ["--version"])?;
        parse_version(&String::from_utf8_lossy(&output))
            .ok_or_else(|| VcsError::parse("hg", "no version string in --version output"))
    }
}
