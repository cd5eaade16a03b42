/*++

Licensed under the Apache-2.0 license.

File Name:

    sha256.rs

Abstract:

    File contains API for SHA-256 Cryptography operations

--*/

use sha2::{Digest, Sha256};

pub const SHA256_DIGEST_SIZE: usize = 32;

pub type Sha256Digest = [u8; SHA256_DIGEST_SIZE];

/// Calculate the digest of the concatenation of `parts`
pub fn sha256(parts: &[&[u8]]) -> Sha256Digest {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
