/*++

Licensed under the Apache-2.0 license.

File Name:

    x509.rs

Abstract:

    X509 API used to derive certificate fields from keys and the device
    identity.

--*/

use ftpm_helper_drivers::{sha256, DeviceIdentity, Ecc256KeyPair, Ecc256Signature};
use ftpm_helper_error::{HelperError, HelperResult};
use ftpm_helper_x509::{EcdsaSignature, PublicKeyInfo, KEY_ID_LEN, SERIAL_NUMBER_LEN};

/// X509 API
pub enum X509 {}

impl X509 {
    /// Get the subject serial number string (hex of the device serial)
    pub fn subj_sn(identity: &DeviceIdentity) -> String {
        identity.serial_hex()
    }

    /// Get the subject key identifier of a public key
    ///
    /// # Arguments
    ///
    /// * `pub_key` - Public key
    ///
    /// # Returns
    ///
    /// First 20 bytes of SHA-256 over the subjectPublicKey bits
    pub fn subj_key_id(pub_key: &PublicKeyInfo) -> HelperResult<[u8; KEY_ID_LEN]> {
        let bits = Self::key_bits(pub_key)?;
        let digest = sha256(&[&bits[..]]);
        let mut id = [0u8; KEY_ID_LEN];
        id.copy_from_slice(&digest[..KEY_ID_LEN]);
        Ok(id)
    }

    /// Get the certificate serial number of a public key
    ///
    /// The serial is positive and never starts with a zero octet.
    pub fn cert_sn(pub_key: &PublicKeyInfo) -> HelperResult<[u8; SERIAL_NUMBER_LEN]> {
        let bits = Self::key_bits(pub_key)?;
        let digest = sha256(&[&bits[..]]);
        let mut sn = [0u8; SERIAL_NUMBER_LEN];
        sn.copy_from_slice(&digest[..SERIAL_NUMBER_LEN]);
        sn[0] &= !0x80;
        sn[0] |= 0x04;
        Ok(sn)
    }

    fn key_bits(pub_key: &PublicKeyInfo) -> HelperResult<Vec<u8>> {
        pub_key.key_bits().ok_or(HelperError::X509_ENCODING)
    }

    /// Sign a TBS blob with ecdsa-with-SHA256
    pub fn sign_tbs(key: &Ecc256KeyPair, tbs: &[u8]) -> HelperResult<EcdsaSignature> {
        let sig: Ecc256Signature = key.sign(&sha256(&[tbs]))?;
        Ok(EcdsaSignature { r: sig.r, s: sig.s })
    }
}
