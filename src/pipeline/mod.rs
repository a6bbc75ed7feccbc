//! Tag resolution and caching.
//!
//! # Lifecycle
//!
//! ```text
//! AssetRegistry ──register/set──► freeze() ──► AssetPipeline ──resolve()──► paths
//!      (open)                                    (frozen, shared)
//! ```
//!
//! # Locking
//!
//! Each family owns one mutex around its cache. `resolve` holds it for the
//! whole call (lookup, reads, processing, compression, insert), so a new
//! tag-set is computed at most once per family and no two threads write the
//! same artifact. Families never contend with each other. The price is that
//! cold misses within one family are serialized.

mod compile;
mod error;
mod registry;

pub use compile::Strategy;
pub use error::{MissingAsset, MissingAssets, PipelineError};
pub use registry::{AssetRegistry, FreezeError};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::asset::{AssetFamily, AssetKey, AssetLocation, AssetTag, Compressor, ProcessorChain};

type Result<T> = std::result::Result<T, PipelineError>;

/// Resolved deliverables for one tag-set, shared between cache and callers.
pub type Resolved = Arc<[AssetLocation]>;

/// Output directory: logical content root and its physical path.
#[derive(Debug, Clone)]
pub struct OutputDir {
    pub logical: String,
    pub physical: PathBuf,
}

/// Settings fixed at freeze time.
#[derive(Debug, Clone)]
pub(crate) struct PipelineSettings {
    pub output: Option<OutputDir>,
    pub compress: bool,
    pub debug: bool,
}

/// Per-family processors, compressor and cache behind one lock.
struct FamilyDomain {
    family: AssetFamily,
    processors: ProcessorChain,
    compressor: Option<Arc<dyn Compressor>>,
    cache: Mutex<FxHashMap<AssetKey, Resolved>>,
}

// ============================================================================
// AssetPipeline
// ============================================================================

/// Frozen pipeline serving `resolve` requests from any number of threads.
pub struct AssetPipeline {
    settings: PipelineSettings,
    tags: FxHashMap<AssetKey, AssetTag>,
    domains: [FamilyDomain; 3],
    stats: CacheCounters,
}

impl AssetPipeline {
    pub(crate) fn new(
        settings: PipelineSettings,
        tags: FxHashMap<AssetKey, AssetTag>,
        processors: [ProcessorChain; 3],
        compressors: [Option<Arc<dyn Compressor>>; 3],
    ) -> Self {
        let [script_chain, style_chain, file_chain] = processors;
        let [script_comp, style_comp, file_comp] = compressors;
        let domain = |family, processors, compressor| FamilyDomain {
            family,
            processors,
            compressor,
            cache: Mutex::new(FxHashMap::default()),
        };
        Self {
            settings,
            tags,
            domains: [
                domain(AssetFamily::Script, script_chain, script_comp),
                domain(AssetFamily::Style, style_chain, style_comp),
                domain(AssetFamily::File, file_chain, file_comp),
            ],
            stats: CacheCounters::default(),
        }
    }

    #[inline]
    pub fn is_debug(&self) -> bool {
        self.settings.debug
    }

    #[inline]
    pub fn is_compressing(&self) -> bool {
        self.settings.compress
    }

    pub fn output(&self) -> Option<&OutputDir> {
        self.settings.output.as_ref()
    }

    /// Registered tag by family and (case-insensitive) name.
    pub fn tag(&self, family: AssetFamily, name: &str) -> Option<&AssetTag> {
        self.tags.get(&AssetKey::tag(family, name))
    }

    /// All registered tags (unordered).
    pub fn tags(&self) -> impl Iterator<Item = &AssetTag> {
        self.tags.values()
    }

    /// Strategy a cache miss for `family` would use.
    pub fn strategy(&self, family: AssetFamily) -> Strategy {
        let domain = &self.domains[family.index()];
        Strategy::select(family, self.settings.compress, !domain.processors.is_empty())
    }

    /// Resolve a tag-set to deliverable paths.
    ///
    /// Tag order decides output order; case and order do not affect caching.
    pub fn resolve<S: AsRef<str>>(&self, family: AssetFamily, tags: &[S]) -> Result<Vec<String>> {
        let resolved = self.resolve_locations(family, tags)?;
        Ok(resolved.iter().map(|l| l.deliverable.clone()).collect())
    }

    /// Resolve a tag-set to locations (deliverable and physical).
    pub fn resolve_locations<S: AsRef<str>>(&self, family: AssetFamily, tags: &[S]) -> Result<Resolved> {
        let key = AssetKey::new(family, tags);
        let domain = &self.domains[family.index()];

        // Held until return: at most one computation per family at a time
        let mut cache = domain.cache.lock();

        if !self.settings.debug
            && let Some(hit) = cache.get(&key)
        {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(hit));
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);

        let resolved: Resolved = self.compute(domain, &key, tags)?.into();

        if self.settings.debug {
            crate::debug!("resolve"; "{} (debug, not cached)", key);
        } else {
            crate::debug!("resolve"; "{} -> {} file(s)", key, resolved.len());
            cache.insert(key, Arc::clone(&resolved));
        }
        Ok(resolved)
    }

    fn compute<S: AsRef<str>>(&self, domain: &FamilyDomain, key: &AssetKey, tags: &[S]) -> Result<Vec<AssetLocation>> {
        let locations = self.collect_locations(domain.family, tags)?;
        if locations.is_empty() {
            return Ok(locations);
        }

        match self.strategy(domain.family) {
            Strategy::PassThrough => Ok(locations),
            Strategy::PerFile => compile::process_each(
                domain.family,
                &locations,
                &domain.processors,
                self.require_output()?,
            ),
            Strategy::Bundle => {
                let compressor = domain
                    .compressor
                    .as_deref()
                    .ok_or(PipelineError::UnsupportedFamily(domain.family))?;
                let bundled = compile::bundle(
                    key,
                    &locations,
                    &domain.processors,
                    compressor,
                    self.require_output()?,
                )?;
                Ok(vec![bundled])
            }
        }
    }

    /// Concatenate tag locations in argument order.
    fn collect_locations<S: AsRef<str>>(&self, family: AssetFamily, tags: &[S]) -> Result<Vec<AssetLocation>> {
        let mut locations = Vec::new();
        for name in tags {
            let name = name.as_ref();
            let tag = self
                .tag(family, name)
                .ok_or_else(|| PipelineError::UnknownTag {
                    family,
                    tag: name.to_string(),
                })?;
            locations.extend_from_slice(tag.locations());
        }
        Ok(locations)
    }

    fn require_output(&self) -> Result<&OutputDir> {
        self.settings
            .output
            .as_ref()
            .ok_or_else(|| PipelineError::config("output directory is not set"))
    }

    /// Snapshot of cache counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            entries: self.domains.iter().map(|d| d.cache.lock().len()).sum(),
        }
    }
}

impl fmt::Debug for AssetPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetPipeline")
            .field("settings", &self.settings)
            .field("tags", &self.tags.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Stats
// ============================================================================

#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicUsize,
    misses: AtomicUsize,
}

/// Cache counters at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Requests served from cache.
    pub hits: usize,
    /// Requests that computed their result (every request in debug mode).
    pub misses: usize,
    /// Cached tag-sets across all families.
    pub entries: usize,
}

// ============================================================================
// Tests
// ============================================================================
