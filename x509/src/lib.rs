/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Main entry point for fTPM helper X509 related functionality

--*/

mod cert_bldr;
mod cert_fields;
mod ek_cert;
mod ek_csr;
mod fwid_cert;
mod sid_cert;
mod test_util;

pub use cert_bldr::{CertBuilder, CsrBuilder, EcdsaSignature};
pub use cert_fields::{PublicKeyInfo, EC_PUBLIC_KEY_LEN, KEY_ID_LEN, SERIAL_NUMBER_LEN};
pub use ek_cert::{EkCertTbs, EkCertTbsParams, TpmInfo};
pub use ek_csr::{EkCsrTbs, EkCsrTbsParams};
pub use fwid_cert::{FirmwareIdCertTbs, FirmwareIdCertTbsParams};
pub use sid_cert::{SiliconIdCertTbs, SiliconIdCertTbsParams};

pub const NOT_BEFORE: &str = "20230101000000Z";
pub const NOT_AFTER: &str = "99991231235959Z";
