//! Cache-busting tokens.
//!
//! A token is a short string appended to emitted URLs so browsers refetch
//! assets after a deploy. Every provider computes its key once, at
//! construction, so all bundles produced by one process agree on it.

use std::fs::File;
use std::hash::Hasher;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::utils::hash;

/// Provides the current cache-busting key.
pub trait CacheBuster: Send + Sync {
    fn key(&self) -> &str;
}

/// How the manifest asks for the token to be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBusterMode {
    /// Explicit key from configuration.
    Fixed,
    /// Process start time.
    #[default]
    Startup,
    /// Hash of every registered source file.
    Fingerprint,
}

/// Explicitly configured key.
#[derive(Debug, Clone)]
pub struct FixedToken(String);

impl FixedToken {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl CacheBuster for FixedToken {
    fn key(&self) -> &str {
        &self.0
    }
}

/// Milliseconds since the Unix epoch, captured once.
#[derive(Debug, Clone)]
pub struct StartupToken(String);

impl StartupToken {
    pub fn now() -> Self {
        Self::at(SystemTime::now())
    }

    pub fn at(time: SystemTime) -> Self {
        let millis = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self(millis.to_string())
    }
}

impl CacheBuster for StartupToken {
    fn key(&self) -> &str {
        &self.0
    }
}

/// 8-char content fingerprint over a list of files, in order.
#[derive(Debug, Clone)]
pub struct FingerprintToken(String);

impl FingerprintToken {
    pub fn from_files<I, P>(paths: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut hasher = FxHasher::default();
        for path in paths {
            let path = path.as_ref();
            // Separate files so moving bytes between them changes the key
            hasher.write(path.as_os_str().as_encoded_bytes());
            hash::update_reader(&mut hasher, File::open(path)?)?;
        }
        Ok(Self(hash::to_fingerprint(hasher.finish())))
    }
}

impl CacheBuster for FingerprintToken {
    fn key(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_fixed_token() {
        assert_eq!(FixedToken::new("v42").key(), "v42");
    }

    #[test]
    fn test_startup_token_is_captured_once() {
        let token = StartupToken::at(UNIX_EPOCH + Duration::from_millis(1234));
        assert_eq!(token.key(), "1234");
        assert_eq!(token.key(), token.key());
    }

    #[test]
    fn test_fingerprint_token_tracks_content() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        fs::write(&a, "var a = 1;").unwrap();
        fs::write(&b, "var b = 2;").unwrap();

        let first = FingerprintToken::from_files([&a, &b]).unwrap();
        let again = FingerprintToken::from_files([&a, &b]).unwrap();
        assert_eq!(first.key(), again.key());
        assert_eq!(first.key().len(), 8);

        fs::write(&b, "var b = 3;").unwrap();
        let changed = FingerprintToken::from_files([&a, &b]).unwrap();
        assert_ne!(first.key(), changed.key());
    }

    #[test]
    fn test_fingerprint_token_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(FingerprintToken::from_files([dir.path().join("nope.js")]).is_err());
    }
}
