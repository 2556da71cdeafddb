//! Utility functions shared across pipq crates.

/// Canonicalize a package name: runs of `-`, `_` and `.` collapse to a
/// single `-` and the result is lowercased.
pub fn canonicalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for ch in name.chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !in_run {
                out.push('-');
                in_run = true;
            }
        } else {
            out.push(ch.to_ascii_lowercase());
            in_run = false;
        }
    }
    out
}
