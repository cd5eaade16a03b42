/*++

Licensed under the Apache-2.0 license.

File Name:

    ecc256.rs

Abstract:

    File contains implementation of Elliptic Curve Cryptography P-256 (ECC-256) Algorithm.

--*/

use crate::drbg::DrbgRng;
use ftpm_helper_error::{HelperError, HelperResult};
use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::{Signature, SigningKey};
use p256::EncodedPoint;
use rand_core::RngCore;
use zeroize::Zeroizing;

/// ECC-256 coordinate size in bytes
pub const ECC_256_COORD_SIZE: usize = 32;

/// Candidate scalars outside [1, n) are redrawn; this bounds the loop.
const MAX_KEYGEN_ATTEMPTS: usize = 16;

/// ECC-256 Coordinate
pub type Ecc256Scalar = [u8; ECC_256_COORD_SIZE];

/// ECC-256 Public Key
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct Ecc256PubKey {
    /// X coordinate
    pub x: Ecc256Scalar,

    /// Y coordinate
    pub y: Ecc256Scalar,
}

impl Ecc256PubKey {
    /// Uncompressed SEC1 encoding: `04 || x || y`
    pub fn to_sec1(&self) -> [u8; 1 + 2 * ECC_256_COORD_SIZE] {
        let mut out = [0u8; 1 + 2 * ECC_256_COORD_SIZE];
        out[0] = 0x04;
        out[1..1 + ECC_256_COORD_SIZE].copy_from_slice(&self.x);
        out[1 + ECC_256_COORD_SIZE..].copy_from_slice(&self.y);
        out
    }
}

impl TryFrom<EncodedPoint> for Ecc256PubKey {
    type Error = HelperError;

    fn try_from(point: EncodedPoint) -> HelperResult<Self> {
        let mut pub_key = Self::default();
        pub_key
            .x
            .copy_from_slice(point.x().ok_or(HelperError::CRYPTO_FAILURE)?);
        pub_key
            .y
            .copy_from_slice(point.y().ok_or(HelperError::CRYPTO_FAILURE)?);
        Ok(pub_key)
    }
}

/// ECC-256 Signature
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct Ecc256Signature {
    /// Random point
    pub r: Ecc256Scalar,

    /// Proof
    pub s: Ecc256Scalar,
}

impl From<Signature> for Ecc256Signature {
    fn from(ecc_sig: Signature) -> Self {
        let (r, s) = ecc_sig.split_bytes();
        let mut sig = Self::default();
        sig.r.copy_from_slice(&r);
        sig.s.copy_from_slice(&s);
        sig
    }
}

impl TryFrom<&Ecc256Signature> for Signature {
    type Error = HelperError;

    fn try_from(sig: &Ecc256Signature) -> HelperResult<Self> {
        Signature::from_scalars(sig.r, sig.s).map_err(|_| HelperError::CRYPTO_FAILURE)
    }
}

impl Ecc256Signature {
    /// DER `ECDSA-Sig-Value`
    pub fn to_der(&self) -> HelperResult<Vec<u8>> {
        let sig = Signature::try_from(self)?;
        Ok(sig.to_der().as_bytes().to_vec())
    }
}

/// A P-256 private key; the scalar is wiped when dropped.
pub struct Ecc256KeyPair {
    key: SigningKey,
}

impl core::fmt::Debug for Ecc256KeyPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ecc256KeyPair")
            .field("pub_key", &self.pub_key())
            .finish_non_exhaustive()
    }
}

impl Ecc256KeyPair {
    pub fn pub_key(&self) -> Ecc256PubKey {
        let point = self.key.verifying_key().to_encoded_point(false);
        // An uncompressed point always carries both coordinates.
        Ecc256PubKey::try_from(point).unwrap_or_default()
    }

    /// Sign a 32 byte prehashed digest (RFC 6979 nonce).
    pub fn sign(&self, hash: &[u8; ECC_256_COORD_SIZE]) -> HelperResult<Ecc256Signature> {
        let sig: Signature = self
            .key
            .sign_prehash(hash)
            .map_err(|_| HelperError::CRYPTO_FAILURE)?;
        Ok(sig.into())
    }
}

pub enum Ecc256 {}

impl Ecc256 {
    /// Generate a deterministic ECC private & public key pair based on the seed
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed used to derive the deterministic key
    /// * `personalization` - DRBG personalization string
    ///
    /// # Result
    ///
    /// *  Ecc256KeyPair - Private key with its public half
    pub fn gen_key_pair(seed: &[u8], personalization: &[u8]) -> HelperResult<Ecc256KeyPair> {
        let mut drbg = DrbgRng::new(seed, personalization);
        let mut priv_key = Zeroizing::new([0u8; ECC_256_COORD_SIZE]);

        for attempt in 0..MAX_KEYGEN_ATTEMPTS {
            drbg.fill_bytes(&mut priv_key[..]);
            if let Ok(key) = SigningKey::from_slice(&priv_key[..]) {
                return Ok(Ecc256KeyPair { key });
            }
            log::debug!("[ecc256] Scalar out of range, redraw {}", attempt + 1);
        }
        log::error!("[ecc256] Key generation exhausted {} attempts", MAX_KEYGEN_ATTEMPTS);
        Err(HelperError::CRYPTO_FAILURE)
    }

}
