//! Command-line interface module.

mod args;
pub mod build;
pub mod check;
pub mod resolve;

pub use args::{Cli, Commands};

use anyhow::Result;
use pith::{AssetPipeline, FreezeError, PithConfig};

/// Build the registry from the manifest and freeze it.
pub fn freeze(config: &PithConfig) -> Result<AssetPipeline> {
    let pipeline = config
        .registry()?
        .freeze()
        .map_err(FreezeError::into_error)?;
    Ok(pipeline)
}
