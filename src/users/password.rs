//! Salted password hashing.
//!
//! Stored form: `blake3$<salt hex>$<digest hex>`.

use std::fmt::Write as _;

const SCHEME: &str = "blake3";

pub fn hash_password(plain: &str) -> String {
    let salt: [u8; 16] = rand::random();
    let digest = digest(&salt, plain);
    format!("{}${}${}", SCHEME, to_hex(&salt), digest.to_hex())
}

/// Check `plain` against a value produced by [`hash_password`].
pub fn verify_password(plain: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(SCHEME), Some(salt_hex), Some(digest_hex)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let (Some(salt), Ok(expected)) = (from_hex(salt_hex), blake3::Hash::from_hex(digest_hex)) else {
        return false;
    };
    // blake3::Hash equality is constant-time.
    digest(&salt, plain) == expected
}

fn digest(salt: &[u8], plain: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt);
    hasher.update(plain.as_bytes());
    hasher.finalize()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{:02x}", b);
        out
    })
}

fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}
