//! `[cache_buster]` section configuration.
//!
//! Present only when URL cache busting is wanted. Every occurrence of
//! `marker` in the listed families is replaced by `?r=<key>`.
//!
//! # Example
//!
//! ```toml
//! [cache_buster]
//! mode = "fixed"                  # "fixed" | "startup" | "fingerprint"
//! key = "20240101"                # required for "fixed"
//! marker = "?r=0"
//! families = ["script", "style"]
//! ```

use serde::{Deserialize, Serialize};

use crate::asset::AssetFamily;
use crate::cachebust::CacheBusterMode;
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::plugins::DEFAULT_MARKER;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheBusterConfig {
    pub mode: CacheBusterMode,
    pub key: Option<String>,
    pub marker: String,
    /// Families the marker is rewritten in.
    pub families: Vec<AssetFamily>,
}

impl CacheBusterConfig {
    pub const MODE: FieldPath = FieldPath::new("cache_buster.mode");
    pub const KEY: FieldPath = FieldPath::new("cache_buster.key");
    pub const MARKER: FieldPath = FieldPath::new("cache_buster.marker");
    pub const FAMILIES: FieldPath = FieldPath::new("cache_buster.families");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.marker.is_empty() {
            diag.error(Self::MARKER, "must not be empty");
        }

        match (self.mode, self.key.as_deref()) {
            (CacheBusterMode::Fixed, None | Some("")) => diag.error_with_hint(
                Self::KEY,
                format!("required when {} = \"fixed\"", Self::MODE),
                "set a key or use mode = \"startup\"",
            ),
            (CacheBusterMode::Startup | CacheBusterMode::Fingerprint, Some(_)) => {
                diag.warn(Self::KEY, "ignored unless mode = \"fixed\"")
            }
            _ => {}
        }

        for family in &self.families {
            if !family.is_processable() {
                diag.error(
                    Self::FAMILIES,
                    format!("{family} assets are never processed"),
                );
            }
        }
    }
}

impl Default for CacheBusterConfig {
    fn default() -> Self {
        Self {
            mode: CacheBusterMode::default(),
            key: None,
            marker: DEFAULT_MARKER.to_string(),
            families: vec![AssetFamily::Script, AssetFamily::Style],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_cache_buster_absent_by_default() {
        assert!(test_parse_config("").cache_buster.is_none());
    }

    #[test]
    fn test_cache_buster_defaults() {
        let config = test_parse_config("[cache_buster]");
        let section = config.cache_buster.unwrap();
        assert_eq!(section.mode, CacheBusterMode::Startup);
        assert_eq!(section.marker, "?r=0");
        assert_eq!(section.families, [AssetFamily::Script, AssetFamily::Style]);
    }

    #[test]
    fn test_fixed_mode_requires_key() {
        let config = test_parse_config("[cache_buster]\nmode = \"fixed\"");
        let mut diag = ConfigDiagnostics::new();
        config.cache_buster.unwrap().validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field.as_str(), "cache_buster.key");
    }

    #[test]
    fn test_key_ignored_outside_fixed_mode() {
        let config = test_parse_config("[cache_buster]\nmode = \"fingerprint\"\nkey = \"v1\"");
        let mut diag = ConfigDiagnostics::new();
        config.cache_buster.unwrap().validate(&mut diag);
        assert!(!diag.has_errors());
        assert_eq!(diag.warnings().len(), 1);
    }

    #[test]
    fn test_file_family_rejected() {
        let config = test_parse_config("[cache_buster]\nfamilies = [\"file\"]");
        let mut diag = ConfigDiagnostics::new();
        config.cache_buster.unwrap().validate(&mut diag);
        assert!(diag.has_errors());
    }
}
