//! Byte-level primitives: hex conversion, byte-order reversal and double SHA-256.
//!
//! Bitcoin keeps hashes in internal (little-endian) byte order and prints them
//! reversed. Helpers here name the direction explicitly.

use sha2::{Digest, Sha256};

use crate::error::{Result, SpvError};

/// A 32-byte hash in internal byte order
pub type Hash256 = [u8; 32];

/// Return a copy of `bytes` with the byte order reversed
pub fn reverse_bytes(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().copied().collect()
}

/// SHA-256 applied twice, used for both transaction ids and block hashes
pub fn hash256(bytes: &[u8]) -> Hash256 {
    let first = Sha256::digest(bytes);
    Sha256::digest(first).into()
}

/// Hash the concatenation of two nodes (Merkle interior node)
pub fn hash256_pair(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    let first = hasher.finalize();
    Sha256::digest(first).into()
}

pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode an even-length hex string; fails with `MalformedHex` otherwise
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    hex::decode(s).map_err(|e| SpvError::MalformedHex(format!("{e} in {:?}", truncate(s))))
}

/// Decode exactly 32 bytes of hex without changing byte order
pub fn decode_hash(s: &str) -> Result<Hash256> {
    let bytes = decode_hex(s)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| SpvError::MalformedHex(format!("expected 32 bytes, got {len}")))
}

/// Convert a hash as printed by a node (display order) into internal byte order
pub fn display_to_internal(s: &str) -> Result<Hash256> {
    let mut hash = decode_hash(s)?;
    hash.reverse();
    Ok(hash)
}

/// Convert an internal-order hash into the display form printed by a node
pub fn internal_to_display(hash: &Hash256) -> String {
    encode_hex(&reverse_bytes(hash))
}

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(16) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
