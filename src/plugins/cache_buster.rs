//! Rewrites cache-busting markers embedded in asset URLs.

use std::sync::Arc;

use anyhow::Result;

use crate::asset::{ProcessContext, ResourceProcessor};
use crate::cachebust::CacheBuster;

/// Placeholder written by authors after URLs that should be versioned.
pub const DEFAULT_MARKER: &str = "?r=0";

/// Replaces every marker (e.g. `url(logo.png?r=0)`) with `?r=<key>`.
pub struct CacheBusterProcessor {
    marker: String,
    token: Arc<dyn CacheBuster>,
}

impl CacheBusterProcessor {
    pub fn new(token: Arc<dyn CacheBuster>) -> Self {
        Self::with_marker(token, DEFAULT_MARKER)
    }

    pub fn with_marker(token: Arc<dyn CacheBuster>, marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            token,
        }
    }

    fn replacement(&self) -> String {
        format!("?r={}", self.token.key())
    }
}

impl ResourceProcessor for CacheBusterProcessor {
    fn name(&self) -> &str {
        "cache-buster"
    }

    fn transform(&self, content: String, _ctx: &ProcessContext<'_>) -> Result<String> {
        if self.marker.is_empty() || !content.contains(&self.marker) {
            return Ok(content);
        }
        Ok(content.replace(&self.marker, &self.replacement()))
    }
}
