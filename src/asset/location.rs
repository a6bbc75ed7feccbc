//! Resolved asset locations and registered tags.

use std::path::{Path, PathBuf};

use super::AssetFamily;

/// One resolved resource: where it is served from and where it lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocation {
    /// Path consumers use to reference the resource.
    pub deliverable: String,
    /// Filesystem path of the content.
    pub physical: PathBuf,
}

impl AssetLocation {
    pub fn new(deliverable: impl Into<String>, physical: impl Into<PathBuf>) -> Self {
        Self {
            deliverable: deliverable.into(),
            physical: physical.into(),
        }
    }

    #[inline]
    pub fn deliverable(&self) -> &str {
        &self.deliverable
    }

    #[inline]
    pub fn physical(&self) -> &Path {
        &self.physical
    }

    /// File name of the physical path, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.physical.file_name().and_then(|n| n.to_str())
    }
}

/// A named group of locations registered for one family.
#[derive(Debug, Clone)]
pub struct AssetTag {
    family: AssetFamily,
    name: String,
    locations: Box<[AssetLocation]>,
}

impl AssetTag {
    /// Create a tag. `locations` keeps registration order.
    pub(crate) fn new(family: AssetFamily, name: impl Into<String>, locations: Vec<AssetLocation>) -> Self {
        Self {
            family,
            name: name.into(),
            locations: locations.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn family(&self) -> AssetFamily {
        self.family
    }

    /// Name as registered (original casing).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn locations(&self) -> &[AssetLocation] {
        &self.locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        let loc = AssetLocation::new("/js/app.js", "/srv/site/js/app.js");
        assert_eq!(loc.file_name(), Some("app.js"));
        assert_eq!(loc.deliverable(), "/js/app.js");
    }

    #[test]
    fn test_tag_keeps_order() {
        let tag = AssetTag::new(
            AssetFamily::Script,
            "Core",
            vec![
                AssetLocation::new("/b.js", "/x/b.js"),
                AssetLocation::new("/a.js", "/x/a.js"),
            ],
        );
        assert_eq!(tag.name(), "Core");
        let names: Vec<_> = tag.locations().iter().map(|l| l.deliverable()).collect();
        assert_eq!(names, ["/b.js", "/a.js"]);
    }
}
