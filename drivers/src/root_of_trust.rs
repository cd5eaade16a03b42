/*++

Licensed under the Apache-2.0 license.

File Name:

    root_of_trust.rs

Abstract:

    Hardware root of trust: a KDF keyed by a device-unique secret that never
    leaves the implementation.

--*/

use crate::{hmac_kdf, Okm};
use ftpm_helper_error::HelperResult;
use zeroize::ZeroizeOnDrop;

/// Unique device secret length
pub const UDS_LEN: usize = 32;

pub trait RootOfTrust: Send + Sync {
    /// Derive 64 bytes bound to the device-unique secret.
    fn derive(&self, label: &[u8], context: &[u8]) -> HelperResult<Okm<64>>;
}

/// Software root of trust holding the unique device secret in memory.
#[derive(ZeroizeOnDrop)]
pub struct SoftRootOfTrust {
    uds: [u8; UDS_LEN],
}

impl SoftRootOfTrust {
    pub fn new(uds: [u8; UDS_LEN]) -> Self {
        Self { uds }
    }
}

impl core::fmt::Debug for SoftRootOfTrust {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SoftRootOfTrust(<redacted>)")
    }
}

impl RootOfTrust for SoftRootOfTrust {
    fn derive(&self, label: &[u8], context: &[u8]) -> HelperResult<Okm<64>> {
        hmac_kdf(&self.uds, label, Some(context))
    }
}
