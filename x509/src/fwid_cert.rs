/*++

Licensed under the Apache-2.0 license.

File Name:

    fwid_cert.rs

Abstract:

    Firmware ID Certificate related code. Issued by the Silicon ID key and
    carrying the firmware measurement in a DICE TcbInfo extension.

--*/

use crate::cert_bldr::CertTbsFields;
use crate::cert_fields::{
    self, NameParams, PublicKeyInfo, EC_PUBLIC_KEY_LEN, KEY_ID_LEN, SERIAL_NUMBER_LEN,
};
use crate::SiliconIdCertTbs;
use x509_cert::ext::pkix::{KeyUsage, KeyUsages};

/// Firmware ID Certificate To Be Signed parameters
#[derive(Debug)]
pub struct FirmwareIdCertTbsParams<'a> {
    pub serial_number: &'a [u8; SERIAL_NUMBER_LEN],
    pub public_key: &'a [u8; EC_PUBLIC_KEY_LEN],
    pub subject_sn: &'a str,
    pub issuer_sn: &'a str,
    pub organization: &'a str,
    pub subject_key_id: &'a [u8; KEY_ID_LEN],
    pub authority_key_id: &'a [u8; KEY_ID_LEN],
    pub tcb_info_fw_digest: &'a [u8; 32],
}

pub struct FirmwareIdCertTbs {
    tbs: Vec<u8>,
}

impl FirmwareIdCertTbs {
    pub const COMMON_NAME: &'static str = "Firmware ID";

    pub fn new(params: &FirmwareIdCertTbsParams) -> Option<Self> {
        Self::encode(params).ok().map(|tbs| Self { tbs })
    }

    fn encode(params: &FirmwareIdCertTbsParams) -> der::Result<Vec<u8>> {
        CertTbsFields {
            serial_number: params.serial_number,
            issuer: SiliconIdCertTbs::subject(params.issuer_sn, params.organization).to_name()?,
            subject: Self::subject(params.subject_sn, params.organization).to_name()?,
            public_key: PublicKeyInfo::EcP256(params.public_key).to_spki()?,
            extensions: vec![
                cert_fields::basic_constraints(true, Some(0))?,
                cert_fields::key_usage(KeyUsage(KeyUsages::KeyCertSign.into()))?,
                cert_fields::subject_key_id(params.subject_key_id)?,
                cert_fields::authority_key_id(params.authority_key_id)?,
                cert_fields::tcb_info(params.organization, params.tcb_info_fw_digest)?,
            ],
        }
        .to_der()
    }

    /// Subject name, also the issuer of the EK certificates
    pub fn subject<'a>(subject_sn: &'a str, organization: &'a str) -> NameParams<'a> {
        NameParams {
            common_name: Self::COMMON_NAME,
            serial_number: subject_sn,
            organization: Some(organization),
        }
    }

    pub fn sign<Sig, Error>(
        &self,
        sign_fn: impl Fn(&[u8]) -> Result<Sig, Error>,
    ) -> Result<Sig, Error> {
        sign_fn(&self.tbs)
    }

    pub fn tbs(&self) -> &[u8] {
        &self.tbs
    }
}
