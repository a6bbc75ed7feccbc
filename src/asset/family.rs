//! Asset family definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Family of a registered asset.
///
/// The family selects the processor chain and compressor that apply.
/// `File` assets are always served as registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFamily {
    /// JavaScript sources.
    Script,
    /// Stylesheets.
    Style,
    /// Arbitrary files (never processed or compressed).
    File,
}

impl AssetFamily {
    /// All families, in lock-domain order.
    pub const ALL: [Self; 3] = [Self::Script, Self::Style, Self::File];

    /// Lowercase name used in compiled filenames and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Style => "style",
            Self::File => "file",
        }
    }

    /// Canonical output extension (without the dot).
    pub const fn extension(self) -> Option<&'static str> {
        match self {
            Self::Script => Some("js"),
            Self::Style => Some("css"),
            Self::File => None,
        }
    }

    /// Whether processors and compressors may touch this family.
    #[inline]
    pub const fn is_processable(self) -> bool {
        !matches!(self, Self::File)
    }

    /// Dense index for per-family storage.
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AssetFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "script" | "js" => Ok(Self::Script),
            "style" | "css" => Ok(Self::Style),
            "file" => Ok(Self::File),
            other => Err(format!(
                "unknown asset family `{other}` (expected script, style or file)"
            )),
        }
    }
}
