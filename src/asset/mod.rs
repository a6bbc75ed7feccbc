//! Asset model: families, locations, tags, keys and the capabilities the
//! pipeline consumes (processors, compressors, path mapping).

pub mod compress;
mod family;
mod key;
mod location;
mod mapper;
mod processor;

// Types
pub use family::AssetFamily;
pub use key::{AssetKey, CompoundKey, is_valid_tag_name};
pub use location::{AssetLocation, AssetTag};

// Capabilities
pub use compress::{Compressor, CssCompressor, JsCompressor, default_compressor};
pub use mapper::{PathMapper, RootedPathMapper};
pub use processor::{ProcessContext, ProcessorChain, ResourceProcessor};

pub(crate) use mapper::join_logical;
