/*++

Licensed under the Apache-2.0 license.

File Name:

    rsa2048.rs

Abstract:

    File contains deterministic RSA-2048 key generation and PKCS#1 v1.5 signing.

--*/

use crate::drbg::DrbgRng;
use ftpm_helper_error::{HelperError, HelperResult};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Sign, RsaPrivateKey};
use sha2::Sha256;

/// Modulus size in bytes
pub const RSA_2048_MODULUS_SIZE: usize = 256;

/// Public exponent used for endorsement keys
pub const RSA_2048_EXPONENT: u32 = 65537;

/// An RSA-2048 private key. `rsa` wipes the private components on drop.
pub struct Rsa2048KeyPair {
    key: RsaPrivateKey,
}

impl core::fmt::Debug for Rsa2048KeyPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rsa2048KeyPair").finish_non_exhaustive()
    }
}

impl Rsa2048KeyPair {
    /// Big-endian modulus, left padded to 256 bytes
    pub fn modulus(&self) -> [u8; RSA_2048_MODULUS_SIZE] {
        let n = self.key.n().to_bytes_be();
        let mut out = [0u8; RSA_2048_MODULUS_SIZE];
        let start = RSA_2048_MODULUS_SIZE.saturating_sub(n.len());
        out[start..].copy_from_slice(&n[n.len().saturating_sub(RSA_2048_MODULUS_SIZE)..]);
        out
    }

    /// Big-endian public exponent without leading zeros
    pub fn exponent(&self) -> Vec<u8> {
        self.key.e().to_bytes_be()
    }

    /// RSASSA-PKCS1-v1_5 over a SHA-256 digest
    pub fn sign_sha256(&self, digest: &[u8; 32]) -> HelperResult<Vec<u8>> {
        self.key
            .sign(Pkcs1v15Sign::new::<Sha256>(), digest)
            .map_err(|_| HelperError::CRYPTO_FAILURE)
    }

    pub fn public_key(&self) -> rsa::RsaPublicKey {
        self.key.to_public_key()
    }
}

pub enum Rsa2048 {}

impl Rsa2048 {
    /// Generate a deterministic RSA key pair with e = 65537 from `seed`
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed used to derive the deterministic key
    /// * `personalization` - DRBG personalization string
    pub fn gen_key_pair(seed: &[u8], personalization: &[u8]) -> HelperResult<Rsa2048KeyPair> {
        let mut drbg = DrbgRng::new(seed, personalization);
        let exp = BigUint::from(RSA_2048_EXPONENT);
        let key = RsaPrivateKey::new_with_exp(&mut drbg, RSA_2048_MODULUS_SIZE * 8, &exp)
            .map_err(|_| HelperError::CRYPTO_FAILURE)?;
        Ok(Rsa2048KeyPair { key })
    }
}
