//! Pith - a tag-based asset pipeline.
//!
//! Scripts, stylesheets and plain files are registered under named tags
//! against an [`AssetRegistry`]. Freezing the registry yields an
//! [`AssetPipeline`] that resolves any set of tags to the deliverable paths
//! a page should reference, bundling, processing and minifying on first use
//! and serving later requests from a per-family cache.
//!
//! ```ignore
//! let mut registry = AssetRegistry::new(Arc::new(RootedPathMapper::new("public")));
//! registry.set_output_directory("/assets/gen")?;
//! registry.set_compression_enabled(true)?;
//! registry.register_tag(AssetFamily::Script, "core", ["/js/a.js", "/js/b.js"])?;
//!
//! let pipeline = registry.freeze()?;
//! let urls = pipeline.resolve(AssetFamily::Script, &["core"])?;
//! assert_eq!(urls, ["/assets/gen/script_CORE.js"]);
//! ```

pub mod asset;
pub mod cachebust;
pub mod config;
pub mod logger;
pub mod pipeline;
pub mod plugins;
pub mod utils;

pub use asset::{AssetFamily, AssetKey, AssetLocation, PathMapper, RootedPathMapper};
pub use config::PithConfig;
pub use pipeline::{AssetPipeline, AssetRegistry, FreezeError, PipelineError};
