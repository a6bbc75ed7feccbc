//! `[pipeline]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [pipeline]
//! root = "public"            # physical directory logical paths resolve under
//! output = "/assets/gen"     # logical directory for generated artifacts
//! compress = true            # bundle + minify scripts and stylesheets
//! debug = false              # recompute every resolution (no caching)
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Pipeline-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Physical root, relative to the manifest directory. `~` is expanded.
    pub root: PathBuf,

    /// Logical output directory, resolved through the same root.
    pub output: Option<String>,

    pub compress: bool,

    /// Bypass the resolution cache.
    pub debug: bool,
}

impl PipelineConfig {
    pub const OUTPUT: FieldPath = FieldPath::new("pipeline.output");
    pub const COMPRESS: FieldPath = FieldPath::new("pipeline.compress");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(output) = &self.output
            && output.trim().is_empty()
        {
            diag.error_with_hint(
                Self::OUTPUT,
                "must not be empty",
                "remove the field or point it at a directory such as \"/assets/gen\"",
            );
        }

        if self.compress && self.output.is_none() {
            diag.error_with_hint(
                Self::OUTPUT,
                format!("required when {} = true", Self::COMPRESS),
                "compressed bundles are written into the output directory",
            );
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output: None,
            compress: false,
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};
    use std::path::Path;

    #[test]
    fn test_pipeline_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.pipeline.root, Path::new("."));
        assert!(config.pipeline.output.is_none());
        assert!(!config.pipeline.compress);
        assert!(!config.pipeline.debug);
    }

    #[test]
    fn test_pipeline_section() {
        let config = test_parse_config(
            "[pipeline]\nroot = \"public\"\noutput = \"/gen\"\ncompress = true\ndebug = true",
        );
        assert_eq!(config.pipeline.root, Path::new("public"));
        assert_eq!(config.pipeline.output.as_deref(), Some("/gen"));
        assert!(config.pipeline.compress);
        assert!(config.pipeline.debug);
    }

    #[test]
    fn test_compress_requires_output() {
        let config = test_parse_config("[pipeline]\ncompress = true");
        let mut diag = ConfigDiagnostics::new();
        config.pipeline.validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field.as_str(), "pipeline.output");
    }
}
