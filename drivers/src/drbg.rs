/*++

Licensed under the Apache-2.0 license.

File Name:

    drbg.rs

Abstract:

    Deterministic HMAC-DRBG (SHA-256) exposed as a `rand_core` generator so
    key generation is reproducible from a seed.

--*/

use rand_core::{impls, CryptoRng, RngCore};
use rfc6979::HmacDrbg;
use sha2::Sha256;

pub struct DrbgRng {
    drbg: HmacDrbg<Sha256>,
}

impl DrbgRng {
    /// # Arguments
    ///
    /// * `seed` - Entropy input
    /// * `personalization` - Domain separation string
    pub fn new(seed: &[u8], personalization: &[u8]) -> Self {
        Self {
            drbg: HmacDrbg::<Sha256>::new(seed, &[], personalization),
        }
    }
}

impl RngCore for DrbgRng {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.drbg.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for DrbgRng {}
