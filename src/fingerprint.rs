//! Deterministic artifact fingerprints.
//!
//! Derived graphs and policies are fingerprinted so that identical inputs
//! provably produce identical outputs. Fingerprints are xxh64 hashes over
//! canonical JSON bytes.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: struct fields serialize in declaration order
//! - Stable sequence order: vectors serialize in index order
//! - No `HashMap` in fingerprinted data: use `BTreeMap`/`BTreeSet` so map
//!   iteration order is canonical

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Serialize a value to canonical JSON bytes.
pub fn fingerprint_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("fingerprint serialization failed")
}

/// Compute the 64-bit fingerprint of a serializable value.
pub fn fingerprint_u64<T: Serialize>(value: &T) -> u64 {
    xxh64(&fingerprint_bytes(value), 0)
}

/// Compute a fingerprint and render it as a fixed-width hex string.
pub fn fingerprint_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", fingerprint_u64(value))
}
