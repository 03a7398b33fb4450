//! Integration tests driving a real `hg` binary against throwaway
//! repositories. Skipped (with a note) when Mercurial is not installed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use vcs::{DiffTarget, HgClient, RevisionId, VcsBackend};

fn hg_available() -> bool {
    Command::new("hg")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn hg(dir: &Path, args: &[&str]) {
    let out = Command::new("hg")
        .current_dir(dir)
        .env("HGUSER", "Test User <test@example.com>")
        .args(args)
        .output()
        .expect("run hg");
    assert!(
        out.status.success(),
        "hg {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
}

struct Fixture {
    _root: TempDir,
    repo: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().expect("create temp dir");
        let repo = root.path().join("repo");
        fs::create_dir(&repo).expect("create repo dir");
        hg(&repo, &["init"]);
        Self { _root: root, repo }
    }

    fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.repo.join(rel);
        fs::write(&path, content).expect("write file");
        path
    }

    fn commit(&self, rel: &str, message: &str) {
        hg(&self.repo, &["add", rel]);
        hg(&self.repo, &["commit", "-m", message]);
    }
}

#[test]
fn path_outside_any_repository_is_not_versioned() {
    if !hg_available() {
        eprintln!("Skipping test: hg not available");
        return;
    }

    let outside = TempDir::new().unwrap();
    let file = outside.path().join("loose.txt");
    fs::write(&file, "content").unwrap();

    let client = HgClient::new("hg");
    assert!(!client.is_versioned(&file));
}

#[test]
fn untracked_and_committed_membership() {
    if !hg_available() {
        eprintln!("Skipping test: hg not available");
        return;
    }

    let fixture = Fixture::new();
    let file = fixture.write("file.txt", "hello\n");
    let client = HgClient::new("hg");

    assert!(!client.is_versioned(&file));

    fixture.commit("file.txt", "add file");
    assert!(client.is_versioned(&file));
}

#[test]
fn unmodified_file_has_empty_diff() {
    if !hg_available() {
        eprintln!("Skipping test: hg not available");
        return;
    }

    let fixture = Fixture::new();
    let file = fixture.write("file.txt", "line one\nline two\n");
    fixture.commit("file.txt", "add file");

    let client = HgClient::new("hg");
    let diff = client.diff(&file, DiffTarget::WorkingBase).unwrap();
    assert!(diff.is_empty());
}

#[test]
fn previous_revision_diff_with_single_commit_is_empty() {
    if !hg_available() {
        eprintln!("Skipping test: hg not available");
        return;
    }

    let fixture = Fixture::new();
    let file = fixture.write("file.txt", "only\n");
    fixture.commit("file.txt", "first");

    let client = HgClient::new("hg");
    let diff = client.diff(&file, DiffTarget::PreviousRevision).unwrap();
    assert!(diff.is_empty(), "short history must be a no-op, not an error");
}

#[test]
fn previous_revision_diff_shows_changed_line() {
    if !hg_available() {
        eprintln!("Skipping test: hg not available");
        return;
    }

    let fixture = Fixture::new();
    let file = fixture.write("file.txt", "one\ntwo\nthree\nfour\nfive\n");
    fixture.commit("file.txt", "first");
    fixture.write("file.txt", "one\ntwo\nthree changed\nfour\nfive\n");
    hg(&fixture.repo, &["commit", "-m", "second"]);

    let client = HgClient::new("hg");
    let diff = client.diff(&file, DiffTarget::PreviousRevision).unwrap();
    let text = String::from_utf8_lossy(&diff);

    assert!(text.contains("-three\n"), "unexpected diff: {text}");
    assert!(text.contains("+three changed\n"), "unexpected diff: {text}");
}

#[test]
fn revision_chain_is_newest_first_and_truncates() {
    if !hg_available() {
        eprintln!("Skipping test: hg not available");
        return;
    }

    let fixture = Fixture::new();
    let file = fixture.write("file.txt", "v1\n");
    fixture.commit("file.txt", "first");
    fixture.write("file.txt", "v2\n");
    hg(&fixture.repo, &["commit", "-m", "second"]);

    let client = HgClient::new("hg");
    let chain = client.revision_chain(&file, 2).unwrap();
    assert_eq!(chain.len(), 2);
    assert_ne!(chain[0], chain[1]);

    let longer = client.revision_chain(&file, 10).unwrap();
    assert_eq!(longer.len(), 2);
    assert_eq!(longer[0], chain[0]);

    let head_blob = client.fetch_blob(&file, Some(&chain[0])).unwrap().unwrap();
    assert_eq!(head_blob, b"v2\n");
    let prev_blob = client.fetch_blob(&file, Some(&chain[1])).unwrap().unwrap();
    assert_eq!(prev_blob, b"v1\n");
}

#[test]
fn blob_for_unknown_revision_is_none() {
    if !hg_available() {
        eprintln!("Skipping test: hg not available");
        return;
    }

    let fixture = Fixture::new();
    let file = fixture.write("file.txt", "content\n");
    fixture.commit("file.txt", "first");

    let client = HgClient::new("hg");
    let bogus = RevisionId::new("ffffffffffffffffffffffffffffffffffffffff");
    assert!(client.fetch_blob(&file, Some(&bogus)).unwrap().is_none());
}

#[test]
fn revert_restores_content_without_backup() {
    if !hg_available() {
        eprintln!("Skipping test: hg not available");
        return;
    }

    let fixture = Fixture::new();
    let file = fixture.write("file.txt", "committed\n");
    fixture.commit("file.txt", "first");
    fixture.write("file.txt", "dirty\n");

    let client = HgClient::new("hg");
    client.revert(&file).unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), "committed\n");
    assert!(
        !fixture.repo.join("file.txt.orig").exists(),
        "revert must not leave a backup file"
    );
}

#[test]
fn version_probe_yields_a_version_string() {
    if !hg_available() {
        eprintln!("Skipping test: hg not available");
        return;
    }

    let client = HgClient::new("hg");
    let version = client.version().unwrap();
    assert!(version.chars().next().unwrap().is_ascii_digit());
}
