//! Configuration section definitions.
//!
//! Each module corresponds to a section in `pith.toml`:
//!
//! | Module         | TOML Section                       | Purpose                          |
//! |----------------|------------------------------------|----------------------------------|
//! | `pipeline`     | `[pipeline]`                       | Root, output, compress, debug    |
//! | `cache_buster` | `[cache_buster]`                   | URL cache-busting token          |
//! | `tags`         | `[[script]]` `[[style]]` `[[file]]` `[[bundle]]` | Tag and bundle declarations |

mod cache_buster;
mod pipeline;
mod tags;

pub use cache_buster::CacheBusterConfig;
pub use pipeline::PipelineConfig;
pub use tags::{BundleEntry, TagEntry};

pub(crate) use tags::validate_tags;
