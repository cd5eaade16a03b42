/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the fTPM helper driver library: crypto
    primitives and the platform collaborators (fuses, root of trust,
    secure storage).

--*/

mod drbg;
mod ecc256;
mod fuse_bank;
mod hmac_kdf;
mod root_of_trust;
mod rsa2048;
mod sha256;
mod storage;

pub use ecc256::{
    Ecc256, Ecc256KeyPair, Ecc256PubKey, Ecc256Scalar, Ecc256Signature, ECC_256_COORD_SIZE,
};
pub use fuse_bank::{DeviceIdentity, DeviceIdentitySource, FuseBank, ProvisioningFuse};
pub use hmac_kdf::{hmac_kdf, Okm};
pub use root_of_trust::{RootOfTrust, SoftRootOfTrust};
pub use rsa2048::{Rsa2048, Rsa2048KeyPair, RSA_2048_MODULUS_SIZE};
pub use sha256::sha256;
pub use storage::{MemStorage, SecureStorage};

pub use ftpm_helper_error::{HelperError, HelperResult};
