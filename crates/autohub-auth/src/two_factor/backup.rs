//! Single-use backup codes.
//!
//! Plaintext codes are shown once at enrollment; only their SHA-256 digests
//! are persisted.

use rand::Rng;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generates `count` random codes of `length` characters from `[0-9A-Z]`.
pub fn generate(count: usize, length: usize) -> Vec<String> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| {
            (0..length)
                .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
                .collect()
        })
        .collect()
}

/// Hex SHA-256 digest of a normalized code.
pub fn digest(code: &str) -> String {
    format!(
        "{:x}",
        Sha256::digest(code.trim().to_ascii_uppercase().as_bytes())
    )
}
