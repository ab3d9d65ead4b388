//! SHA-256 content hashes for tier files.
//!
//! Hashes are lowercase hex without an algorithm prefix; that is what the
//! package importer compares against.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{TierError, TierResult};

const CHUNK_SIZE: usize = 8192;

pub fn sha256_hex_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = [0_u8; CHUNK_SIZE];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

pub fn sha256_hex_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hash a file's raw bytes, streaming it in fixed-size chunks.
pub fn sha256_file(path: impl AsRef<Path>) -> TierResult<String> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| TierError::io(path, e))?;
    sha256_hex_reader(file).map_err(|e| TierError::io(path, e))
}
