//! Shared helpers.

pub mod hash;
pub mod path;

/// Format a count with its noun: `1 tag`, `3 tags`.
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
