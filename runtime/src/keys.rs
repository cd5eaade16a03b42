// Licensed under the Apache-2.0 license

use crate::seed::SeedCustodian;
use ftpm_helper_drivers::{
    hmac_kdf, DeviceIdentity, Ecc256, Ecc256KeyPair, Okm, RootOfTrust, Rsa2048, Rsa2048KeyPair,
};
use ftpm_helper_error::{HelperError, HelperResult};
use zerocopy::IntoBytes;

const SILICON_ID_LABEL: &[u8] = b"silicon_id";
const FIRMWARE_ID_LABEL: &[u8] = b"firmware_id";
const EK_ECC_LABEL: &[u8] = b"ek_ecc";
const EK_RSA_LABEL: &[u8] = b"ek_rsa";

/// A DICE layer key with the CDI the next layer is derived from.
pub struct IdentityKey {
    pub key: Ecc256KeyPair,
    cdi: Okm<64>,
}

impl core::fmt::Debug for IdentityKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdentityKey")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Silicon ID layer, bound to the root of trust and the device identity
pub fn derive_silicon_id(
    rot: &dyn RootOfTrust,
    identity: &DeviceIdentity,
) -> HelperResult<IdentityKey> {
    let cdi = rot.derive(SILICON_ID_LABEL, identity.as_bytes())?;
    let key = Ecc256::gen_key_pair(cdi.as_ref(), SILICON_ID_LABEL)?;
    Ok(IdentityKey { key, cdi })
}

/// Firmware ID layer, bound to the Silicon ID CDI and the firmware measurement
pub fn derive_firmware_id(sid: &IdentityKey, measurement: &[u8; 32]) -> HelperResult<IdentityKey> {
    let cdi = hmac_kdf::<64>(sid.cdi.as_ref(), FIRMWARE_ID_LABEL, Some(&measurement[..]))?;
    let key = Ecc256::gen_key_pair(cdi.as_ref(), FIRMWARE_ID_LABEL)?;
    Ok(IdentityKey { key, cdi })
}

/// EK seeds are bound to the EPS and the device identity. Key generation
/// runs without the custodian lock held.
pub fn derive_ek_ecc(custodian: &SeedCustodian) -> HelperResult<Ecc256KeyPair> {
    let identity = custodian.identity();
    let seed = custodian.derive_from_seed(EK_ECC_LABEL, identity.as_bytes())?;
    Ecc256::gen_key_pair(seed.as_ref(), EK_ECC_LABEL)
}

pub fn derive_ek_rsa(custodian: &SeedCustodian) -> HelperResult<Rsa2048KeyPair> {
    let identity = custodian.identity();
    let seed = custodian.derive_from_seed(EK_RSA_LABEL, identity.as_bytes())?;
    Rsa2048::gen_key_pair(seed.as_ref(), EK_RSA_LABEL)
}

/// Keys derived for one context. Entries are filled on first use and
/// wiped when the context is dropped.
#[derive(Debug, Default)]
pub struct KeyCache {
    silicon_id: Option<IdentityKey>,
    firmware_id: Option<IdentityKey>,
    ek_ecc: Option<Ecc256KeyPair>,
    ek_rsa: Option<Rsa2048KeyPair>,
}

impl KeyCache {
    pub fn silicon_id(&mut self, custodian: &SeedCustodian) -> HelperResult<&IdentityKey> {
        if self.silicon_id.is_none() {
            let key = derive_silicon_id(custodian.root_of_trust(), &custodian.identity())?;
            self.silicon_id = Some(key);
        }
        self.silicon_id.as_ref().ok_or(HelperError::INTERNAL)
    }

    pub fn firmware_id(
        &mut self,
        custodian: &SeedCustodian,
        measurement: &[u8; 32],
    ) -> HelperResult<&IdentityKey> {
        if self.firmware_id.is_none() {
            let key = derive_firmware_id(self.silicon_id(custodian)?, measurement)?;
            self.firmware_id = Some(key);
        }
        self.firmware_id.as_ref().ok_or(HelperError::INTERNAL)
    }

    pub fn ek_ecc(&mut self, custodian: &SeedCustodian) -> HelperResult<&Ecc256KeyPair> {
        if self.ek_ecc.is_none() {
            self.ek_ecc = Some(derive_ek_ecc(custodian)?);
        }
        self.ek_ecc.as_ref().ok_or(HelperError::INTERNAL)
    }

    pub fn ek_rsa(&mut self, custodian: &SeedCustodian) -> HelperResult<&Rsa2048KeyPair> {
        if self.ek_rsa.is_none() {
            self.ek_rsa = Some(derive_ek_rsa(custodian)?);
        }
        self.ek_rsa.as_ref().ok_or(HelperError::INTERNAL)
    }
}
