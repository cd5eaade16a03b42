/*++

Licensed under the Apache-2.0 license.

File Name:

    hmac_kdf.rs

Abstract:

    A KDF implementation that is compliant with SP 800-108 Section 4.1 (KDF in Counter Mode).

--*/

use ftpm_helper_error::{HelperError, HelperResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroizing, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

const KDF_HASH_LEN: usize = 32;

/// Output keying material; wiped when dropped.
#[derive(ZeroizeOnDrop)]
pub struct Okm<const LEN: usize> {
    data: [u8; LEN],
}

impl<const LEN: usize> Okm<LEN> {
    pub fn as_array(&self) -> &[u8; LEN] {
        &self.data
    }
}

impl<const LEN: usize> AsRef<[u8]> for Okm<LEN> {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl<const LEN: usize> core::fmt::Debug for Okm<LEN> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Okm<{LEN}>(<redacted>)")
    }
}

/// Calculate HMAC-KDF
///
/// # Arguments
///
/// * `key` - HMAC key
/// * `label` - Label for the KDF. If `context` is omitted, this is considered
///             the fixed input data.
/// * `context` - Context for KDF. If present, a NULL byte is included between
///               the label and context.
///
/// # Returns
///
/// * `Okm<LEN>` - `LEN` bytes of output, one HMAC-SHA256 block per counter value
pub fn hmac_kdf<const LEN: usize>(
    key: &[u8],
    label: &[u8],
    context: Option<&[u8]>,
) -> HelperResult<Okm<LEN>> {
    let mut okm = Okm { data: [0u8; LEN] };

    for (i, chunk) in okm.data.chunks_mut(KDF_HASH_LEN).enumerate() {
        let counter = u32::try_from(i + 1).map_err(|_| HelperError::CRYPTO_FAILURE)?;
        let mut mac =
            <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| HelperError::CRYPTO_FAILURE)?;

        mac.update(&counter.to_be_bytes());
        mac.update(label);

        if let Some(context) = context {
            mac.update(&[0x00]);
            mac.update(context);
        }

        let block: Zeroizing<[u8; KDF_HASH_LEN]> =
            Zeroizing::new(mac.finalize().into_bytes().into());
        chunk.copy_from_slice(&block[..chunk.len()]);
    }

    Ok(okm)
}
