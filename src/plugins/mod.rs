//! Built-in resource processors.

mod cache_buster;

pub use cache_buster::{CacheBusterProcessor, DEFAULT_MARKER};
