//! Turn a validated manifest into an open [`AssetRegistry`].

use std::path::PathBuf;
use std::sync::Arc;

use super::{ConfigError, PithConfig};
use crate::asset::{AssetFamily, RootedPathMapper};
use crate::cachebust::{CacheBuster, CacheBusterMode, FingerprintToken, FixedToken, StartupToken};
use crate::debug;
use crate::pipeline::AssetRegistry;
use crate::plugins::CacheBusterProcessor;

impl PithConfig {
    /// Register every declared setting, tag and processor.
    ///
    /// The registry is returned open so callers can still add their own
    /// processors or compressors before freezing it.
    pub fn registry(&self) -> Result<AssetRegistry, ConfigError> {
        let root = self.physical_root();
        debug!("config"; "physical root {}", root.display());

        let mut registry = AssetRegistry::new(Arc::new(RootedPathMapper::new(&root)));
        registry.set_debug_mode(self.pipeline.debug);
        registry.set_compression_enabled(self.pipeline.compress)?;
        if let Some(output) = &self.pipeline.output {
            registry.set_output_directory(output.as_str())?;
        }

        for family in AssetFamily::ALL {
            for entry in self.tags(family) {
                registry.register_tag(family, &entry.name, &entry.files)?;
            }
        }

        if let Some(section) = &self.cache_buster {
            let token = self.cache_buster_token(&registry)?;
            debug!("config"; "cache buster key {}", token.key());
            let processor = Arc::new(CacheBusterProcessor::with_marker(token, section.marker.as_str()));
            for &family in &section.families {
                registry.add_processor(family, processor.clone());
            }
        }

        Ok(registry)
    }

    fn cache_buster_token(&self, registry: &AssetRegistry) -> Result<Arc<dyn CacheBuster>, ConfigError> {
        let Some(section) = &self.cache_buster else {
            return Err(ConfigError::Validation("[cache_buster] is not configured".into()));
        };

        Ok(match section.mode {
            CacheBusterMode::Fixed => {
                let key = section.key.as_deref().ok_or_else(|| {
                    ConfigError::Validation("cache_buster.key is required for mode = \"fixed\"".into())
                })?;
                Arc::new(FixedToken::new(key))
            }
            CacheBusterMode::Startup => Arc::new(StartupToken::now()),
            CacheBusterMode::Fingerprint => {
                // Missing files are reported by freeze; hash what exists
                let files: Vec<PathBuf> = registry
                    .tags()
                    .iter()
                    .filter(|tag| section.families.contains(&tag.family()))
                    .flat_map(|tag| tag.locations())
                    .map(|location| location.physical().to_path_buf())
                    .filter(|path| path.is_file())
                    .collect();
                let token = FingerprintToken::from_files(&files)
                    .map_err(|err| ConfigError::Io(self.physical_root(), err))?;
                Arc::new(token)
            }
        })
    }
}
