//! Pipeline error types.

use std::fmt;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use crate::asset::AssetFamily;

// ============================================================================
// PipelineError
// ============================================================================

/// Errors raised while configuring or resolving assets.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A write-once setting was set twice, or a required setting is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{family} tag `{name}` is already registered")]
    DuplicateTag { family: AssetFamily, name: String },

    // NOTE: No #[source] here - the list is the whole message
    #[error("{0}")]
    MissingAssetFiles(MissingAssets),

    #[error("unknown {family} tag `{tag}`")]
    UnknownTag { family: AssetFamily, tag: String },

    #[error("compression is not supported for {0} assets")]
    UnsupportedFamily(AssetFamily),

    #[error("IO error when {action} `{}`", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("processor `{processor}` failed on `{}`", .path.display())]
    Processor {
        processor: String,
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to compress {family} bundle `{name}`")]
    Compress {
        family: AssetFamily,
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

// ============================================================================
// MissingAssets
// ============================================================================

/// A registered file that does not exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAsset {
    pub family: AssetFamily,
    pub tag: String,
    pub path: PathBuf,
}

/// Every missing file found during one freeze, in registration order.
#[derive(Debug, Clone, Default)]
pub struct MissingAssets(Vec<MissingAsset>);

impl MissingAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, family: AssetFamily, tag: impl Into<String>, path: impl Into<PathBuf>) {
        self.0.push(MissingAsset {
            family,
            tag: tag.into(),
            path: path.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MissingAsset> {
        self.0.iter()
    }

    /// Convert to Result (returns Err if anything is missing).
    pub fn into_result(self) -> Result<(), PipelineError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::MissingAssetFiles(self))
        }
    }
}

impl fmt::Display for MissingAssets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", "asset files not found:".red().bold())?;
        for missing in &self.0 {
            write!(
                f,
                "\n{} {}{}{} {}",
                "→".red(),
                "[".dimmed(),
                format_args!("{}:{}", missing.family, missing.tag).cyan(),
                "]".dimmed(),
                missing.path.display()
            )?;
        }
        Ok(())
    }
}
