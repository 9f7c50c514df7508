//! Password digest.
//!
//! Credentials are stored and compared as the lowercase hex SHA-256 digest of
//! the password bytes. The digest is unsalted so equal passwords always map to
//! equal digests; existing `chat.db` files depend on this exact format.

use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Length of a digest produced by [`hash_password`].
pub const DIGEST_HEX_LEN: usize = 64;

/// Hash a password into a 64-character lowercase hex string.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest
        .iter()
        .fold(String::with_capacity(DIGEST_HEX_LEN), |mut out, b| {
            let _ = write!(out, "{:02x}", b);
            out
        })
}
