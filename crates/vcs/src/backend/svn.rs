//! Subversion client for the VCS abstraction layer.
//!
//! Shells out to the `svn` executable with `--non-interactive` on every
//! call. Working-copy membership is decided from the XML status query
//! scoped to the target path (`--depth empty`), and previous-revision diffs
//! are built by fetching the `PREV` blob and diffing locally against the
//! working file, sharing the blob-retrieval path used for external diffs.

use std::{
    ffi::{OsStr, OsString},
    path::Path,
    sync::LazyLock,
};

use regex::Regex;
use utils::diff::{file_timestamp, unified_diff_text};
use utils::path::discover_tree;
use utils::process::run_tool;

use crate::error::VcsError;
use crate::traits::VcsBackend;
use crate::types::{
    BackendKind, DiffTarget, RevisionId, SvnItemState, SvnStatus, SvnStatusEntry,
};

static NOT_WORKING_COPY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"svn: warning: (W\d+: )?'.*' is not a working copy").expect("valid regex"));
static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" version (\d+\.\d+\.\d+)").expect("valid regex"));

#[derive(Debug, Clone)]
pub struct SvnClient {
    executable: String,
}

impl SvnClient {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    fn svn<I, S>(&self, args: I) -> Result<Vec<u8>, VcsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut full: Vec<OsString> = vec!["--non-interactive".into()];
        full.extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        Ok(run_tool(&self.executable, full, None)?)
    }

    /// Classified status for `path`. `depth` scopes the query; `empty`
    /// restricts it to the target path itself, which is all the membership
    /// check needs.
    pub fn status(&self, path: &Path, depth: &str) -> Result<SvnStatus, VcsError> {
        let mut args: Vec<OsString> =
            vec!["status".into(), "--xml".into(), "--depth".into(), depth.into()];
        args.push(path.as_os_str().to_os_string());

        let output = self.svn(args)?;
        parse_status(
            &String::from_utf8_lossy(&output),
            &path.display().to_string(),
        )
    }
}

/// Parse `svn status --xml` output into classified entries.
///
/// Warning text is matched before the XML because stderr is merged into the
/// captured stream: a path outside any working copy produces the warning
/// alongside an empty target element.
fn parse_status(output: &str, queried_path: &str) -> Result<SvnStatus, VcsError> {
    if NOT_WORKING_COPY.is_match(output) {
        return Ok(SvnStatus {
            entries: vec![SvnStatusEntry {
                path: queried_path.to_string(),
                state: SvnItemState::Unversioned,
            }],
        });
    }

    // Slice out the document itself; merged stderr may trail the XML.
    let start = output
        .find("<?xml")
        .or_else(|| output.find("<status"))
        .ok_or_else(|| VcsError::parse("svn", "no XML in status output"))?;
    let end = output
        .rfind("</status>")
        .map(|pos| pos + "</status>".len())
        .ok_or_else(|| VcsError::parse("svn", "unterminated status XML"))?;

    let doc = roxmltree::Document::parse(&output[start..end])
        .map_err(|err| VcsError::parse("svn", err.to_string()))?;

    let mut entries = Vec::new();
    for entry in doc.descendants().filter(|node| node.has_tag_name("entry")) {
        let Some(path) = entry.attribute("path") else {
            continue;
        };
        let state = entry
            .descendants()
            .find(|node| node.has_tag_name("wc-status"))
            .and_then(|status| status.attribute("item"))
            .and_then(SvnItemState::parse);
        if let Some(state) = state {
            entries.push(SvnStatusEntry {
                path: path.to_string(),
                state,
            });
        }
    }

    Ok(SvnStatus { entries })
}

/// Extract the revision attribute of each `logentry` element
fn parse_log_revisions(xml: &str) -> Result<Vec<RevisionId>, VcsError> {
    if xml.trim().is_empty() {
        return Ok(Vec::new());
    }

    let doc = roxmltree::Document::parse(xml.trim())
        .map_err(|err| VcsError::parse("svn", err.to_string()))?;

    Ok(doc
        .descendants()
        .filter(|node| node.has_tag_name("logentry"))
        .filter_map(|node| node.attribute("revision"))
        .map(RevisionId::new)
        .collect())
}

fn parse_version(output: &str) -> Option<String> {
    VERSION.captures(output).map(|caps| caps[1].to_string())
}

impl VcsBackend for SvnClient {
    fn kind(&self) -> BackendKind {
        BackendKind::Subversion
    }

    fn is_versioned(&self, path: &Path) -> bool {
        if !path.exists() {
            return false;
        }
        // No .svn metadata folder anywhere up the chain means the status
        // query cannot succeed either; skip it.
        if discover_tree(path, ".svn").is_none() {
            return false;
        }

        match self.status(path, "empty") {
            Ok(status) => {
                !status.any(SvnItemState::Unversioned) && !status.any(SvnItemState::Ignored)
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "svn status probe failed");
                false
            }
        }
    }

    fn revision_chain(&self, path: &Path, count: usize) -> Result<Vec<RevisionId>, VcsError> {
        let mut args: Vec<OsString> = vec![
            "log".into(),
            "--xml".into(),
            "-l".into(),
            count.to_string().into(),
        ];
        args.push(path.as_os_str().to_os_string());

        let output = self.svn(args)?;
        parse_log_revisions(&String::from_utf8_lossy(&output))
    }

    fn diff(&self, path: &Path, target: DiffTarget) -> Result<Vec<u8>, VcsError> {
        match target {
            // No staging area; staged content is the working base.
            DiffTarget::WorkingBase | DiffTarget::Staged => {
                let mut args: Vec<OsString> = vec!["diff".into()];
                args.push(path.as_os_str().to_os_string());
                self.svn(args)
            }
            DiffTarget::PreviousRevision => {
                let chain = self.revision_chain(path, 2)?;
                if chain.len() < 2 {
                    return Ok(Vec::new());
                }
                let prev = RevisionId::new("PREV");
                let Some(blob) = self.fetch_blob(path, Some(&prev))? else {
                    return Ok(Vec::new());
                };

                let left = String::from_utf8_lossy(&blob);
                let working = std::fs::read(path)?;
                let right = String::from_utf8_lossy(&working);
                let label = path.display().to_string();

                let text = unified_diff_text(
                    &label,
                    &label,
                    &left,
                    &right,
                    "(revision PREV)",
                    &format!("(working copy) {}", file_timestamp(path)),
                );
                Ok(text.into_bytes())
            }
        }
    }

    fn fetch_blob(
        &self,
        path: &Path,
        revision: Option<&RevisionId>,
    ) -> Result<Option<Vec<u8>>, VcsError> {
        let rev = revision.map(RevisionId::as_str).unwrap_or("BASE");
        let mut args: Vec<OsString> = vec!["cat".into(), "-r".into(), rev.into()];
        args.push(path.as_os_str().to_os_string());

        match self.svn(args) {
            Ok(blob) => Ok(Some(blob)),
            Err(VcsError::Exec(utils::process::ExecError::Failed { output, .. })) => {
                tracing::warn!(path = %path.display(), rev, output, "svn cat could not produce blob");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn revert(&self, path: &Path) -> Result<(), VcsError> {
        let mut args: Vec<OsString> = vec!["revert".into()];
        args.push(path.as_os_str().to_os_string());
        self.svn(args)?;
        Ok(())
    }

    fn version(&self) -> Result<String, VcsError> {
        let output = self.svn(["--version"])?;
        parse_version(&String::from_utf8_lossy(&output))
            .ok_or_else(|| VcsError::parse("svn", "no version string in --version output"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS_MODIFIED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<status>
<target path="/wc/src/lib.rs">
<entry path="/wc/src/lib.rs">
<wc-status item="modified" props="none" revision="42">
<commit revision="40">
<author>dev</author>
<date>2013-05-01T10:00:00.000000Z</date>
</commit>
</wc-status>
</entry>
</target>
</status>
"#;

    const STATUS_UNVERSIONED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<status>
<target path="/wc/notes.txt">
<entry path="/wc/notes.txt">
<wc-status item="unversioned" props="none">
</wc-status>
</entry>
</target>
</status>
"#;

    #[test]
    fn classifies_modified_entry() {
        let status = parse_status(STATUS_MODIFIED, "/wc/src/lib.rs").unwrap();
        assert_eq!(status.entries.len(), 1);
        assert!(status.any(SvnItemState::Modified));
        assert_eq!(
            status.with_state(SvnItemState::Modified).collect::<Vec<_>>(),
            vec!["/wc/src/lib.rs"]
        );
        assert!(!status.any(SvnItemState::Unversioned));
    }

    #[test]
    fn classifies_unversioned_entry() {
        let status = parse_status(STATUS_UNVERSIONED, "/wc/notes.txt").unwrap();
        assert!(status.any(SvnItemState::Unversioned));
    }

    #[test]
    fn warning_text_means_unversioned() {
        let output = "svn: warning: W155007: '/outside/file.txt' is not a working copy\n";
        let status = parse_status(output, "/outside/file.txt").unwrap();
        assert!(status.any(SvnItemState::Unversioned));
        assert_eq!(status.entries[0].path, "/outside/file.txt");
    }

    #[test]
    fn tolerates_trailing_stderr_noise() {
        let output = format!("{STATUS_MODIFIED}svn: warning: W000000: unrelated noise\n");
        // Warning regex must not match arbitrary warnings, only the
        // not-a-working-copy form; the XML still parses.
        let status = parse_status(&output, "/wc/src/lib.rs").unwrap();
        assert!(status.any(SvnItemState::Modified));
    }

    #[test]
    fn missing_xml_is_parse_error() {
        assert!(matches!(
            parse_status("svn: E155007: something else entirely", "/x"),
            Err(VcsError::Parse { .. })
        ));
    }

    #[test]
    fn parses_log_revisions() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<log>
<logentry revision="42"><author>dev</author><date>2013-06-01T10:00:00.000000Z</date><msg>second</msg></logentry>
<logentry revision="40"><author>dev</author><date>2013-05-01T10:00:00.000000Z</date><msg>first</msg></logentry>
</log>
"#;
        let revs = parse_log_revisions(xml).unwrap();
        assert_eq!(revs.len(), 2);
        assert_eq!(revs[0].as_str(), "42");
        assert_eq!(revs[1].as_str(), "40");
    }

    #[test]
    fn parses_version_banner() {
        let banner = "svn, version 1.14.2 (r1899510)\n   compiled ...";
        assert_eq!(parse_version(banner).as_deref(), Some("1.14.2"));
        assert!(parse_version("svn 1.14").is_none());
    }
}
