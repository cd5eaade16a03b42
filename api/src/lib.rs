// Licensed under the Apache-2.0 license

#![cfg_attr(not(test), no_std)]

pub mod command;

pub mod params;

pub use ftpm_helper_error as error;

pub use command::{
    CertKind, CommandId, CsrKind, EkCsrSignature, HelperCmd, NsState, ProvisioningMode,
};
pub use params::{HelperParams, Memref, Param, ParamType, Value};

use uuid::Uuid;

/// Identity of the helper service, used by the normal world to open a session.
pub const FTPM_HELPER_UUID: Uuid = Uuid::from_fields(
    0x6c87_9517,
    0x2dfc,
    0x4663,
    &[0x86, 0x3d, 0x48, 0x96, 0xe8, 0xcc, 0xbe, 0x3a],
);

/// Protocol version reported by QUERY_PROV_MODE.
pub const VERSION_MAJOR: u32 = 2;
pub const VERSION_MINOR: u32 = 0;

pub const SN_LEN: usize = 10;
pub const ECID_LEN: usize = 8;
pub const CERT_BUF_LEN: usize = 2048;
pub const CSR_BUF_LEN: usize = 2048;
pub const CSR_SIGNATURE_LEN: usize = 80;
/// Endorsement primary seed length.
pub const EPS_LEN: usize = 64;
/// SHA-256 digest length accepted by SIGN_EK_CSR.
pub const DIGEST_LEN: usize = 32;
