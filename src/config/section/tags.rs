//! `[[script]]`, `[[style]]`, `[[file]]` and `[[bundle]]` declarations.
//!
//! # Example
//!
//! ```toml
//! [[script]]
//! name = "core"
//! files = ["/js/a.js", "/js/b.js"]
//!
//! [[style]]
//! name = "theme"
//! files = ["/css/theme.css"]
//!
//! [[bundle]]                 # tag-sets prebuilt by `pith build`
//! family = "script"
//! tags = ["core", "ui"]
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::asset::{AssetFamily, AssetKey, is_valid_tag_name};
use crate::config::{ConfigDiagnostics, FieldPath};

/// A named group of logical content paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagEntry {
    pub name: String,
    /// Logical paths, in output order.
    pub files: Vec<String>,
}

/// A tag-set to resolve ahead of time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleEntry {
    pub family: AssetFamily,
    pub tags: Vec<String>,
}

const BUNDLE: FieldPath = FieldPath::new("bundle");

const fn family_field(family: AssetFamily) -> FieldPath {
    match family {
        AssetFamily::Script => FieldPath::new("script"),
        AssetFamily::Style => FieldPath::new("style"),
        AssetFamily::File => FieldPath::new("file"),
    }
}

/// Tracks declared tags to detect duplicates and dangling bundle references.
struct TagTracker<'a> {
    seen: FxHashMap<AssetKey, &'a str>,
}

impl<'a> TagTracker<'a> {
    fn new() -> Self {
        Self {
            seen: FxHashMap::default(),
        }
    }

    fn check_and_insert(
        &mut self,
        family: AssetFamily,
        entry: &'a TagEntry,
        idx: usize,
        diag: &mut ConfigDiagnostics,
    ) {
        let field = family_field(family);

        if entry.name.trim().is_empty() {
            diag.error(field, format!("[{idx}] tag name must not be empty"));
            return;
        }
        if !is_valid_tag_name(&entry.name) {
            diag.error_with_hint(
                field,
                format!("[{idx}] tag '{}' contains a path separator", entry.name),
                "tag names become artifact file names; drop `/` and `\\`",
            );
            return;
        }
        if entry.files.is_empty() {
            diag.error_with_hint(
                field,
                format!("[{idx}] tag '{}' lists no files", entry.name),
                "add at least one logical path to `files`",
            );
        }
        if let Some(path) = entry.files.iter().find(|f| f.trim().is_empty()) {
            diag.error(
                field,
                format!("[{idx}] tag '{}' has an empty path {path:?}", entry.name),
            );
        }

        let key = AssetKey::tag(family, &entry.name);
        if let Some(prev) = self.seen.get(&key) {
            diag.error_with_hint(
                field,
                format!("[{idx}] duplicate tag '{}' (already declared as '{prev}')", entry.name),
                "tag names are case-insensitive",
            );
        } else {
            self.seen.insert(key, &entry.name);
        }
    }

    fn contains(&self, family: AssetFamily, name: &str) -> bool {
        self.seen.contains_key(&AssetKey::tag(family, name))
    }
}

/// Validate every tag declaration and bundle reference.
pub(crate) fn validate_tags(
    declared: [(AssetFamily, &[TagEntry]); 3],
    bundles: &[BundleEntry],
    diag: &mut ConfigDiagnostics,
) {
    let mut tracker = TagTracker::new();
    for (family, entries) in declared {
        for (idx, entry) in entries.iter().enumerate() {
            tracker.check_and_insert(family, entry, idx, diag);
        }
    }

    for (idx, bundle) in bundles.iter().enumerate() {
        if bundle.tags.is_empty() {
            diag.error(BUNDLE, format!("[{idx}] {} bundle lists no tags", bundle.family));
            continue;
        }
        for tag in &bundle.tags {
            if !tracker.contains(bundle.family, tag) {
                diag.error_with_hint(
                    BUNDLE,
                    format!("[{idx}] unknown {} tag '{tag}'", bundle.family),
                    format!("declare it in a [[{}]] table", bundle.family),
                );
            }
        }
    }
}
