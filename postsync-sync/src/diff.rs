//! Unified diff support for `postsync diff`.

use std::path::Path;

use similar::TextDiff;

/// Unified diff of `previous` (empty when the file is new) against `next`.
///
/// Headers use the file name relative to the publications directory.
pub fn unified(path: &Path, previous: Option<&str>, next: &str) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let old_header = if previous.is_some() {
        format!("a/{name}")
    } else {
        "/dev/null".to_string()
    };
    let new_header = format!("b/{name}");
    TextDiff::from_lines(previous.unwrap_or(""), next)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}
