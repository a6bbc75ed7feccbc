//! Open (configurable) side of the pipeline.
//!
//! Everything is registered against an [`AssetRegistry`] during startup.
//! [`AssetRegistry::freeze`] validates the registration, consumes the
//! registry and returns the immutable [`AssetPipeline`], so nothing can be
//! registered once requests are being served.

use std::fmt;
use std::fs;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::error::{MissingAssets, PipelineError};
use super::{AssetPipeline, OutputDir, PipelineSettings};
use crate::asset::{
    AssetFamily, AssetKey, AssetLocation, AssetTag, Compressor, PathMapper, ProcessorChain,
    ResourceProcessor, default_compressor, is_valid_tag_name,
};

type Result<T> = std::result::Result<T, PipelineError>;

/// Accepts tags, processors and settings until frozen.
pub struct AssetRegistry {
    mapper: Arc<dyn PathMapper>,
    output: Option<OutputDir>,
    compress: Option<bool>,
    debug: bool,
    /// Registered tags in registration order.
    tags: Vec<AssetTag>,
    index: FxHashMap<AssetKey, usize>,
    processors: [ProcessorChain; 3],
    compressors: [Option<Arc<dyn Compressor>>; 3],
}

impl AssetRegistry {
    pub fn new(mapper: Arc<dyn PathMapper>) -> Self {
        Self {
            mapper,
            output: None,
            compress: None,
            debug: false,
            tags: Vec::new(),
            index: FxHashMap::default(),
            processors: Default::default(),
            compressors: Default::default(),
        }
    }

    // ========================================================================
    // settings
    // ========================================================================

    /// Set the logical output directory; generated artifacts are written to
    /// its mapped physical path. Can only be set once.
    pub fn set_output_directory(&mut self, logical: impl Into<String>) -> Result<()> {
        if self.output.is_some() {
            return Err(PipelineError::config("output directory can only be set once"));
        }
        let logical = logical.into();
        let physical = self.mapper.map(&logical);
        self.output = Some(OutputDir { logical, physical });
        Ok(())
    }

    /// Enable bundling + minification. Can only be set once.
    pub fn set_compression_enabled(&mut self, enabled: bool) -> Result<()> {
        if self.compress.is_some() {
            return Err(PipelineError::config("compression flag can only be set once"));
        }
        self.compress = Some(enabled);
        Ok(())
    }

    /// Disable caching. May be changed freely until frozen.
    pub fn set_debug_mode(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Replace the built-in compressor of `family`. Can only be set once per family.
    pub fn set_compressor(&mut self, family: AssetFamily, compressor: Arc<dyn Compressor>) -> Result<()> {
        if !family.is_processable() {
            return Err(PipelineError::UnsupportedFamily(family));
        }
        let slot = &mut self.compressors[family.index()];
        if slot.is_some() {
            return Err(PipelineError::config(format!(
                "{family} compressor can only be set once"
            )));
        }
        *slot = Some(compressor);
        Ok(())
    }

    /// Append a processor to the chain of `family`.
    ///
    /// Adding the same instance twice is a no-op. File assets are never
    /// processed, so processors added for [`AssetFamily::File`] never run.
    pub fn add_processor(&mut self, family: AssetFamily, processor: Arc<dyn ResourceProcessor>) {
        if !self.processors[family.index()].push(processor) {
            crate::debug!("registry"; "{} processor already registered", family);
        }
    }

    // ========================================================================
    // tags
    // ========================================================================

    /// Register `name` for `family` with one or more logical content paths.
    ///
    /// Names are case-insensitive: `Core` and `CORE` are the same tag.
    pub fn register_tag<I, S>(&mut self, family: AssetFamily, name: &str, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if name.trim().is_empty() {
            return Err(PipelineError::config(format!("{family} tag name must not be empty")));
        }
        if !is_valid_tag_name(name) {
            return Err(PipelineError::config(format!(
                "{family} tag `{name}` must not contain path separators"
            )));
        }

        let key = AssetKey::tag(family, name);
        if self.index.contains_key(&key) {
            return Err(PipelineError::DuplicateTag {
                family,
                name: name.to_string(),
            });
        }

        let locations: Vec<_> = paths
            .into_iter()
            .map(|p| {
                let logical = p.as_ref();
                AssetLocation::new(logical, self.mapper.map(logical))
            })
            .collect();
        if locations.is_empty() {
            return Err(PipelineError::config(format!(
                "{family} tag `{name}` must list at least one file"
            )));
        }

        self.index.insert(key, self.tags.len());
        self.tags.push(AssetTag::new(family, name, locations));
        Ok(())
    }

    /// Registered tags in registration order.
    pub fn tags(&self) -> &[AssetTag] {
        &self.tags
    }

    // ========================================================================
    // freeze
    // ========================================================================

    /// Validate the configuration and produce the serving pipeline.
    ///
    /// Reports every missing file at once. On failure the registry is handed
    /// back unchanged inside the error so the caller may fix and retry.
    pub fn freeze(self) -> std::result::Result<AssetPipeline, FreezeError> {
        match self.check() {
            Ok(()) => Ok(self.into_pipeline()),
            Err(error) => Err(FreezeError {
                registry: Box::new(self),
                error,
            }),
        }
    }

    fn check(&self) -> Result<()> {
        let compress = self.compress.unwrap_or(false);
        let writes_artifacts = compress
            || AssetFamily::ALL
                .iter()
                .any(|f| f.is_processable() && !self.processors[f.index()].is_empty());
        if writes_artifacts && self.output.is_none() {
            return Err(PipelineError::config(
                "output directory must be set when compression or processors are enabled",
            ));
        }

        let mut missing = MissingAssets::new();
        for tag in &self.tags {
            for location in tag.locations() {
                if !location.physical().is_file() {
                    missing.push(tag.family(), tag.name(), location.physical());
                }
            }
        }
        missing.into_result()?;

        if let Some(output) = &self.output
            && !output.physical.is_dir()
        {
            fs::create_dir_all(&output.physical)
                .map_err(|e| PipelineError::io("creating", &output.physical, e))?;
            crate::debug!("registry"; "created output directory {}", output.physical.display());
        }
        Ok(())
    }

    fn into_pipeline(self) -> AssetPipeline {
        let compress = self.compress.unwrap_or(false);
        let mut compressors = self.compressors;
        if compress {
            for family in AssetFamily::ALL {
                let slot = &mut compressors[family.index()];
                if slot.is_none() {
                    *slot = default_compressor(family).ok();
                }
            }
        }

        let tags = self
            .tags
            .into_iter()
            .map(|tag| (AssetKey::tag(tag.family(), tag.name()), tag))
            .collect();

        let settings = PipelineSettings {
            output: self.output,
            compress,
            debug: self.debug,
        };
        crate::debug!("registry"; "frozen: compress={} debug={}", settings.compress, settings.debug);
        AssetPipeline::new(settings, tags, self.processors, compressors)
    }
}

impl fmt::Debug for AssetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetRegistry")
            .field("output", &self.output)
            .field("compress", &self.compress)
            .field("debug", &self.debug)
            .field("tags", &self.tags.len())
            .field("processors", &self.processors)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// FreezeError
// ============================================================================

/// A failed freeze: the error plus the still-open registry.
#[derive(Debug)]
pub struct FreezeError {
    registry: Box<AssetRegistry>,
    error: PipelineError,
}

impl FreezeError {
    #[inline]
    pub fn error(&self) -> &PipelineError {
        &self.error
    }

    /// Drop the registry, keeping the error.
    pub fn into_error(self) -> PipelineError {
        self.error
    }

    /// Take back the open registry.
    pub fn into_registry(self) -> AssetRegistry {
        *self.registry
    }
}

impl fmt::Display for FreezeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for FreezeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.error)
    }
}

impl From<FreezeError> for PipelineError {
    fn from(err: FreezeError) -> Self {
        err.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{ProcessContext, RootedPathMapper};
    use std::path::Path;
    use tempfile::TempDir;

    struct Noop;

    impl ResourceProcessor for Noop {
        fn transform(&self, content: String, _ctx: &ProcessContext<'_>) -> anyhow::Result<String> {
            Ok(content)
        }
    }

    fn site() -> (TempDir, AssetRegistry) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js/a.js"), "var a = 1;").unwrap();
        fs::write(dir.path().join("js/b.js"), "var b = 2;").unwrap();
        let registry = AssetRegistry::new(Arc::new(RootedPathMapper::new(dir.path())));
        (dir, registry)
    }

    #[test]
    fn test_output_directory_write_once() {
        let (_dir, mut registry) = site();
        registry.set_output_directory("/gen").unwrap();
        let err = registry.set_output_directory("/other").unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_compression_write_once() {
        let (_dir, mut registry) = site();
        registry.set_compression_enabled(false).unwrap();
        assert!(matches!(
            registry.set_compression_enabled(true),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_debug_mode_may_change_while_open() {
        let (_dir, mut registry) = site();
        registry.set_debug_mode(true);
        registry.set_debug_mode(false);
        registry.set_debug_mode(true);
        let pipeline = registry.freeze().unwrap();
        assert!(pipeline.is_debug());
    }

    #[test]
    fn test_duplicate_tag_is_case_insensitive() {
        let (_dir, mut registry) = site();
        registry.register_tag(AssetFamily::Script, "core", ["/js/a.js"]).unwrap();
        let err = registry
            .register_tag(AssetFamily::Script, "CORE", ["/js/b.js"])
            .unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateTag { ref name, .. } if name == "CORE"));

        // Same name in another family is a different identity
        registry.register_tag(AssetFamily::File, "core", ["/js/b.js"]).unwrap();
    }

    #[test]
    fn test_empty_tag_rejected() {
        let (_dir, mut registry) = site();
        let none: [&str; 0] = [];
        assert!(matches!(
            registry.register_tag(AssetFamily::Script, "core", none),
            Err(PipelineError::Configuration(_))
        ));
        assert!(matches!(
            registry.register_tag(AssetFamily::Script, "  ", ["/js/a.js"]),
            Err(PipelineError::Configuration(_))
        ));
        assert!(registry.tags().is_empty());
    }

    #[test]
    fn test_tag_name_with_separator_rejected() {
        let (_dir, mut registry) = site();
        for name in ["a/b", "../out", "a\\b"] {
            assert!(matches!(
                registry.register_tag(AssetFamily::Script, name, ["/js/a.js"]),
                Err(PipelineError::Configuration(_))
            ));
        }
        assert!(registry.tags().is_empty());
    }

    #[test]
    fn test_register_maps_paths() {
        let (dir, mut registry) = site();
        registry
            .register_tag(AssetFamily::Script, "core", ["/js/a.js", "~/js/b.js"])
            .unwrap();
        let tag = &registry.tags()[0];
        let root = crate::utils::path::normalize_path(dir.path());
        assert_eq!(tag.locations()[0].deliverable(), "/js/a.js");
        assert_eq!(tag.locations()[0].physical(), root.join("js/a.js"));
        assert_eq!(tag.locations()[1].physical(), root.join("js/b.js"));
    }

    #[test]
    fn test_freeze_reports_all_missing_files_and_stays_open() {
        let (_dir, mut registry) = site();
        registry
            .register_tag(AssetFamily::Script, "core", ["/js/a.js", "/js/gone.js"])
            .unwrap();
        registry
            .register_tag(AssetFamily::Style, "theme", ["/css/gone.css"])
            .unwrap();

        let failure = registry.freeze().unwrap_err();
        match failure.error() {
            PipelineError::MissingAssetFiles(missing) => {
                assert_eq!(missing.len(), 2);
                let tags: Vec<_> = missing.iter().map(|m| m.tag.as_str()).collect();
                assert_eq!(tags, ["core", "theme"]);
                assert!(missing.iter().all(|m| m.path.ends_with("gone.js") || m.path.ends_with("gone.css")));
            }
            other => panic!("unexpected error: {other}"),
        }

        // Still open: registration keeps working
        let mut registry = failure.into_registry();
        registry.register_tag(AssetFamily::Script, "extra", ["/js/b.js"]).unwrap();
        assert_eq!(registry.tags().len(), 3);
    }

    #[test]
    fn test_freeze_requires_output_for_processing() {
        let (_dir, mut registry) = site();
        registry.add_processor(AssetFamily::Style, Arc::new(Noop));
        let err = registry.freeze().unwrap_err().into_error();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_freeze_without_output_for_pass_through() {
        let (_dir, mut registry) = site();
        registry.register_tag(AssetFamily::Script, "core", ["/js/a.js"]).unwrap();
        // File processors never run, so no output directory is needed
        registry.add_processor(AssetFamily::File, Arc::new(Noop));
        assert!(registry.freeze().is_ok());
    }

    #[test]
    fn test_freeze_creates_output_directory() {
        let (dir, mut registry) = site();
        registry.set_output_directory("/assets/gen").unwrap();
        registry.set_compression_enabled(true).unwrap();
        assert!(!dir.path().join("assets/gen").exists());
        registry.freeze().unwrap();
        assert!(Path::new(&dir.path().join("assets/gen")).is_dir());
    }

    #[test]
    fn test_set_compressor_rules() {
        let (_dir, mut registry) = site();
        assert!(matches!(
            registry.set_compressor(AssetFamily::File, Arc::new(crate::asset::JsCompressor)),
            Err(PipelineError::UnsupportedFamily(AssetFamily::File))
        ));
        registry
            .set_compressor(AssetFamily::Script, Arc::new(crate::asset::JsCompressor))
            .unwrap();
        assert!(matches!(
            registry.set_compressor(AssetFamily::Script, Arc::new(crate::asset::JsCompressor)),
            Err(PipelineError::Configuration(_))
        ));
    }
}
