//! Unified-diff text rendering and tool-output decoding.

use std::path::Path;

use chrono::{DateTime, Local};
use similar::TextDiff;

const TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Render a unified diff between two texts with labeled, timestamped
/// headers. Returns an empty string when the inputs are identical.
pub fn unified_diff_text(
    left_label: &str,
    right_label: &str,
    left: &str,
    right: &str,
    left_time: &str,
    right_time: &str,
) -> String {
    if left == right {
        return String::new();
    }

    let diff = TextDiff::from_lines(left, right);
    diff.unified_diff()
        .context_radius(3)
        .header(
            &format!("{left_label}\t{left_time}"),
            &format!("{right_label}\t{right_time}"),
        )
        .to_string()
}

/// Decode tool output with the buffer's detected encoding, falling back to
/// UTF-8 when the label is unknown or the bytes are malformed for it.
/// Carriage returns are stripped so panel content is `\n`-only.
pub fn decode_output(bytes: &[u8], encoding_label: Option<&str>) -> String {
    let decoded = encoding_label
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
        .map(|encoding| {
            let (text, _, had_errors) = encoding.decode(bytes);
            (text.into_owned(), had_errors)
        });

    let text = match decoded {
        Some((text, false)) => text,
        Some((_, true)) => {
            tracing::warn!(?encoding_label, "malformed bytes for buffer encoding, falling back to UTF-8");
            String::from_utf8_lossy(bytes).into_owned()
        }
        None => String::from_utf8_lossy(bytes).into_owned(),
    };

    text.replace('\r', "")
}

/// Modification time of a file formatted for diff headers; empty when the
/// file cannot be stat'd.
pub fn file_timestamp(path: &Path) -> String {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(|mtime| DateTime::<Local>::from(mtime).format(TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// The current time formatted for diff headers, used for unsaved sources.
pub fn now_timestamp() -> String {
    Local::now().format(TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_yield_empty_diff() {
        let text = unified_diff_text("a", "b", "same\ncontent\n", "same\ncontent\n", "t1", "t2");
        assert!(text.is_empty());
    }

    #[test]
    fn single_changed_line_yields_one_hunk() {
        let left = "one\ntwo\nthree\nfour\nfive\n";
        let right = "one\ntwo\nTHREE\nfour\nfive\n";
        let text = unified_diff_text("old", "new", left, right, "t1", "t2");

        assert!(text.starts_with("--- old\tt1\n+++ new\tt2\n"));
        assert_eq!(text.matches("@@").count() / 2, 1);
        assert!(text.contains("-three"));
        assert!(text.contains("+THREE"));
    }

    #[test]
    fn decode_strips_carriage_returns() {
        assert_eq!(decode_output(b"a\r\nb\r\n", None), "a\nb\n");
    }

    #[test]
    fn decode_honors_encoding_label() {
        // 0xE9 is e-acute in Windows-1252 but malformed UTF-8.
        assert_eq!(decode_output(&[0xE9], Some("windows-1252")), "é");
    }

    #[test]
    fn decode_falls_back_to_utf8() {
        // Valid UTF-8 bytes with an unknown label decode losslessly.
        assert_eq!(decode_output("héllo".as_bytes(), Some("no-such-encoding")), "héllo");
        // Malformed bytes with no label decode lossily rather than erroring.
        assert_eq!(decode_output(&[0xFF], None), "\u{FFFD}");
    }
}
