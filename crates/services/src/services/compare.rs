//! Plain two-source compare: diff any two host-fed texts (open documents,
//! clipboard, selections) without touching version control.

use std::path::Path;

use utils::diff::{file_timestamp, now_timestamp, unified_diff_text};

use crate::services::host::EditorHost;

/// One side of a two-source compare
#[derive(Debug, Clone)]
pub struct SourceText {
    pub label: String,
    pub content: String,
    pub timestamp: String,
}

impl SourceText {
    /// A source with no backing file (clipboard, selection, unsaved view);
    /// stamped with the current time
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
            timestamp: now_timestamp(),
        }
    }

    /// A source backed by a file on disk, stamped with its mtime
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            label: path.display().to_string(),
            content: std::fs::read_to_string(path)?,
            timestamp: file_timestamp(path),
        })
    }
}

/// Diff two sources and present the result; identical content is a status
/// message, not a panel.
pub fn compare_sources(host: &dyn EditorHost, left: &SourceText, right: &SourceText) {
    let text = unified_diff_text(
        &left.label,
        &right.label,
        &left.content,
        &right.content,
        &left.timestamp,
        &right.timestamp,
    );

    if text.is_empty() {
        host.status("No Difference");
        return;
    }

    host.present_diff(&format!("Diff: {} -> {}", left.label, right.label), &text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingHost {
        statuses: RefCell<Vec<String>>,
        panels: RefCell<Vec<(String, String)>>,
    }

    impl EditorHost for RecordingHost {
        fn notify(&self, _message: &str) {}

        fn status(&self, message: &str) {
            self.statuses.borrow_mut().push(message.to_string());
        }

        fn confirm(&self, _message: &str) -> bool {
            false
        }

        fn buffer_encoding(&self, _path: &Path) -> Option<String> {
            None
        }

        fn present_diff(&self, title: &str, text: &str) {
            self.panels
                .borrow_mut()
                .push((title.to_string(), text.to_string()));
        }
    }

    #[test]
    fn identical_sources_show_no_difference_and_no_panel() {
        let host = RecordingHost::default();
        let left = SourceText::new("left.txt", "same\ncontent\n");
        let right = SourceText::new("right.txt", "same\ncontent\n");

        compare_sources(&host, &left, &right);

        assert_eq!(host.statuses.borrow().as_slice(), ["No Difference"]);
        assert!(host.panels.borrow().is_empty());
    }

    #[test]
    fn file_backed_source_carries_content_and_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("left.txt");
        std::fs::write(&path, "from disk\n").unwrap();

        let source = SourceText::from_file(&path).unwrap();
        assert_eq!(source.content, "from disk\n");
        assert_eq!(source.label, path.display().to_string());
        assert!(!source.timestamp.is_empty());
    }

    #[test]
    fn differing_sources_open_a_panel() {
        let host = RecordingHost::default();
        let left = SourceText::new("a", "one\ntwo\n");
        let right = SourceText::new("b", "one\nTWO\n");

        compare_sources(&host, &left, &right);

        let panels = host.panels.borrow();
        assert_eq!(panels.len(), 1);
        assert!(panels[0].0.contains("a -> b"));
        assert!(panels[0].1.contains("-two"));
        assert!(panels[0].1.contains("+TWO"));
    }
}
