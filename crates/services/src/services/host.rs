//! Collaborator interface to the editor host.
//!
//! The core consumes these operations; it never renders UI itself. Hosts
//! implement this trait over their own window/panel/dialog machinery.

use std::path::Path;

pub trait EditorHost {
    /// Prominent user-facing message (dialog or equivalent)
    fn notify(&self, message: &str);

    /// Low-key status-bar message
    fn status(&self, message: &str);

    /// Ask the user a yes/no question; `true` means proceed
    fn confirm(&self, message: &str) -> bool;

    /// Detected encoding of the buffer backing `path`, when known
    fn buffer_encoding(&self, path: &Path) -> Option<String>;

    /// Show unified-diff text in a panel or scratch buffer
    fn present_diff(&self, title: &str, text: &str);
}
