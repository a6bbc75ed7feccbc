//! Hashing helpers using FxHash.
//!
//! Fast and deterministic, which is all cache-busting tokens need.
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let mut hasher = FxHasher::default();
//! hash::update_reader(&mut hasher, File::open(path)?)?;
//! let fp = hash::to_fingerprint(hasher.finish()); // -> "a1b2c3d4"
//! ```

use rustc_hash::FxHasher;
use std::hash::Hasher;
use std::io::{self, Read};

/// Feed a reader into `hasher` in fixed-size chunks.
pub fn update_reader(hasher: &mut FxHasher, mut reader: impl Read) -> io::Result<()> {
    let mut buffer = [0u8; 8192];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            return Ok(());
        }
        hasher.write(&buffer[..n]);
    }
}

/// Render a hash as an 8-char hex fingerprint.
#[inline]
pub fn to_fingerprint(hash: u64) -> String {
    format!("{hash:016x}")[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_fingerprint_width() {
        assert_eq!(to_fingerprint(0), "00000000");
        assert_eq!(to_fingerprint(0xdead_beef_0000_0001), "deadbeef");
    }

    #[test]
    fn test_update_reader_spans_chunks() {
        let data = vec![7u8; 8192 * 2 + 5];
        let mut streamed = FxHasher::default();
        update_reader(&mut streamed, &data[..]).unwrap();

        let mut chunked = FxHasher::default();
        for chunk in data.chunks(8192) {
            chunked.write(chunk);
        }
        assert_eq!(streamed.finish(), chunked.finish());
    }
}
