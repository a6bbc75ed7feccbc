//! Manifest handling for `pith.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Section definitions
//! │   ├── pipeline   # [pipeline]
//! │   ├── cache_buster # [cache_buster]
//! │   └── tags       # [[script]] [[style]] [[file]] [[bundle]]
//! ├── types/         # ConfigError, diagnostics, field paths
//! ├── registry       # PithConfig -> AssetRegistry
//! └── mod.rs         # PithConfig (this file)
//! ```

mod registry;
pub mod section;
pub mod types;
mod util;

pub use section::{BundleEntry, CacheBusterConfig, PipelineConfig, TagEntry};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};
pub use util::find_config_file;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::asset::AssetFamily;
use crate::log;
use crate::utils::path::{expand_path, normalize_path};

type Result<T> = std::result::Result<T, ConfigError>;

/// Command-line values that take precedence over the manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub compress: Option<bool>,
    pub debug: Option<bool>,
}

/// Root configuration structure representing `pith.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PithConfig {
    /// Absolute path to the manifest (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory containing the manifest (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub cache_buster: Option<CacheBusterConfig>,

    #[serde(default)]
    pub script: Vec<TagEntry>,

    #[serde(default)]
    pub style: Vec<TagEntry>,

    #[serde(default)]
    pub file: Vec<TagEntry>,

    #[serde(default)]
    pub bundle: Vec<BundleEntry>,
}

impl PithConfig {
    /// Locate, parse and validate the manifest.
    ///
    /// `config_name` is searched for upward from the current directory.
    pub fn load(config_name: &Path, overrides: Overrides) -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|err| ConfigError::Io(PathBuf::from("."), err))?;
        let config_path = find_config_file(config_name, &cwd)
            .ok_or_else(|| ConfigError::NotFound(config_name.to_path_buf()))?;

        let mut config = Self::from_path(&config_path)?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parse a manifest file, anchoring relative paths at its directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.config_path = normalize_path(path);
        config.root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        Self::update_option(&mut self.pipeline.compress, overrides.compress.as_ref());
        Self::update_option(&mut self.pipeline.debug, overrides.debug.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // accessors
    // ========================================================================

    /// Physical root every logical path is resolved under.
    pub fn physical_root(&self) -> PathBuf {
        expand_path(&self.pipeline.root, &self.root)
    }

    /// Declared tags of one family, in manifest order.
    pub fn tags(&self, family: AssetFamily) -> &[TagEntry] {
        match family {
            AssetFamily::Script => &self.script,
            AssetFamily::Style => &self.style,
            AssetFamily::File => &self.file,
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the whole manifest.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.pipeline.validate(&mut diag);
        if let Some(cache_buster) = &self.cache_buster {
            cache_buster.validate(&mut diag);
        }
        self.validate_tags(&mut diag);

        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    fn validate_tags(&self, diag: &mut ConfigDiagnostics) {
        let declared = AssetFamily::ALL.map(|family| (family, self.tags(family)));
        section::validate_tags(declared, &self.bundle, diag);
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse a manifest fragment.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PithConfig {
    let (parsed, ignored) = PithConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
