//! Cache identities for tag-set lookups.
//!
//! [`CompoundKey`] folds an ordered sequence of values into one identity.
//! [`AssetKey`] canonicalizes a `(family, tags)` request on top of it, so
//! `["a", "b"]` and `["B", "A"]` name the same cache entry.

use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use super::AssetFamily;

// ============================================================================
// CompoundKey
// ============================================================================

/// Ordered, immutable sequence of values with a position-sensitive hash.
///
/// The hash is the exclusive-or of every value's hash offset by its index,
/// so permutations of the same values generally hash differently. Equality
/// is strict positional equality.
#[derive(Debug, Clone)]
pub struct CompoundKey<T> {
    values: Box<[T]>,
    hash: u64,
}

impl<T: Hash> CompoundKey<T> {
    pub fn new(values: impl Into<Box<[T]>>) -> Self {
        let values = values.into();
        let hash = values
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, value)| acc ^ positional_hash(value, i));
        Self { values, hash }
    }
}

impl<T> CompoundKey<T> {
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Precomputed hash of the whole sequence.
    #[inline]
    pub fn hash_value(&self) -> u64 {
        self.hash
    }
}

#[inline]
fn positional_hash<T: Hash>(value: &T, index: usize) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish().wrapping_add(index as u64)
}

impl<T: PartialEq> PartialEq for CompoundKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.values == other.values
    }
}

impl<T: Eq> Eq for CompoundKey<T> {}

impl<T> Hash for CompoundKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

// ============================================================================
// AssetKey
// ============================================================================

/// Canonical identity of a `(family, tag-set)` request.
///
/// Tags are upper-cased and sorted on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey {
    family: AssetFamily,
    tags: CompoundKey<String>,
}

impl AssetKey {
    /// Canonicalize a tag-set for `family`.
    pub fn new<I, S>(family: AssetFamily, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical: Vec<String> = tags.into_iter().map(|t| canonical_tag(t.as_ref())).collect();
        canonical.sort_unstable();
        Self {
            family,
            tags: CompoundKey::new(canonical),
        }
    }

    /// Key of a single registered tag.
    pub fn tag(family: AssetFamily, name: &str) -> Self {
        Self {
            family,
            tags: CompoundKey::new(vec![canonical_tag(name)]),
        }
    }

    #[inline]
    pub fn family(&self) -> AssetFamily {
        self.family
    }

    /// Canonical (upper-cased, sorted) tags.
    #[inline]
    pub fn tags(&self) -> &[String] {
        self.tags.values()
    }

    /// Deterministic artifact stem: `<family>_<TAG>_<TAG>...`.
    pub fn compiled_name(&self) -> String {
        let mut name = String::from(self.family.name());
        for tag in self.tags() {
            name.push('_');
            name.push_str(tag);
        }
        name
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.family, self.tags().join(","))
    }
}

/// Whether `name` can be registered as a tag.
///
/// Tag names end up in artifact file names, so they must be non-blank and
/// free of path separators.
pub fn is_valid_tag_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(['/', '\\', '\0'])
}

#[inline]
fn canonical_tag(tag: &str) -> String {
    tag.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[test]
    fn test_tag_name_validity() {
        assert!(is_valid_tag_name("core"));
        assert!(is_valid_tag_name("jquery.ui"));
        assert!(!is_valid_tag_name(""));
        assert!(!is_valid_tag_name("   "));
        assert!(!is_valid_tag_name("a/b"));
        assert!(!is_valid_tag_name("../escape"));
        assert!(!is_valid_tag_name("a\\b"));
    }

    #[test]
    fn test_compound_key_positional_equality() {
        let a = CompoundKey::new(vec!["x", "y"]);
        let b = CompoundKey::new(vec!["x", "y"]);
        let c = CompoundKey::new(vec!["y", "x"]);
        assert_eq!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());
        assert_ne!(a, c);
        assert_ne!(a.hash_value(), c.hash_value());
    }

    #[test]
    fn test_compound_key_length_mismatch() {
        let a = CompoundKey::new(vec![1u32, 2]);
        let b = CompoundKey::new(vec![1u32, 2, 3]);
        assert_ne!(a, b);
        assert!(CompoundKey::<u32>::new(Vec::new()).is_empty());
    }

    #[test]
    fn test_asset_key_order_and_case_insensitive() {
        let a = AssetKey::new(AssetFamily::Script, ["a", "b"]);
        let b = AssetKey::new(AssetFamily::Script, ["B", "A"]);
        assert_eq!(a, b);
        assert_eq!(a.tags(), ["A", "B"]);

        let mut map = FxHashMap::default();
        map.insert(a, 1);
        assert_eq!(map.get(&b), Some(&1));
    }

    #[test]
    fn test_asset_key_family_distinguishes() {
        let script = AssetKey::new(AssetFamily::Script, ["core"]);
        let style = AssetKey::new(AssetFamily::Style, ["core"]);
        assert_ne!(script, style);
    }

    #[test]
    fn test_asset_key_duplicates_are_kept() {
        let once = AssetKey::new(AssetFamily::Script, ["core"]);
        let twice = AssetKey::new(AssetFamily::Script, ["core", "CORE"]);
        assert_ne!(once, twice);
    }

    #[test]
    fn test_single_tag_key_matches_set_key() {
        assert_eq!(
            AssetKey::tag(AssetFamily::Style, "Theme"),
            AssetKey::new(AssetFamily::Style, ["theme"])
        );
    }

    #[test]
    fn test_compiled_name() {
        let key = AssetKey::new(AssetFamily::Script, ["ui", "core"]);
        assert_eq!(key.compiled_name(), "script_CORE_UI");
        assert_eq!(key.to_string(), "script[CORE,UI]");
    }
}
