/*++

Licensed under the Apache-2.0 license.

File Name:

    ek_cert.rs

Abstract:

    Endorsement Key Certificate related code. The EK certificate is the
    end-entity certificate issued by the Firmware ID key for either the
    RSA-2048 or the P-256 endorsement key.

--*/

use crate::cert_bldr::CertTbsFields;
use crate::cert_fields::{self, oid, NameParams, PublicKeyInfo, KEY_ID_LEN, SERIAL_NUMBER_LEN};
use crate::FirmwareIdCertTbs;

/// TPM identity placed in the subject alternative name
#[derive(Debug, Clone, Copy)]
pub struct TpmInfo<'a> {
    pub manufacturer: &'a str,
    pub model: &'a str,
    pub version: &'a str,
}

/// EK Certificate To Be Signed parameters
#[derive(Debug)]
pub struct EkCertTbsParams<'a> {
    pub serial_number: &'a [u8; SERIAL_NUMBER_LEN],
    pub public_key: PublicKeyInfo<'a>,
    pub subject_sn: &'a str,
    pub issuer_sn: &'a str,
    pub organization: &'a str,
    pub subject_key_id: &'a [u8; KEY_ID_LEN],
    pub authority_key_id: &'a [u8; KEY_ID_LEN],
    pub tpm: TpmInfo<'a>,
}

pub struct EkCertTbs {
    tbs: Vec<u8>,
}

impl EkCertTbs {
    pub const COMMON_NAME: &'static str = "TPM EK";

    pub fn new(params: &EkCertTbsParams) -> Option<Self> {
        Self::encode(params).ok().map(|tbs| Self { tbs })
    }

    fn encode(params: &EkCertTbsParams) -> der::Result<Vec<u8>> {
        let subject = NameParams {
            common_name: Self::COMMON_NAME,
            serial_number: params.subject_sn,
            organization: Some(params.organization),
        };
        CertTbsFields {
            serial_number: params.serial_number,
            issuer: FirmwareIdCertTbs::subject(params.issuer_sn, params.organization).to_name()?,
            subject: subject.to_name()?,
            public_key: params.public_key.to_spki()?,
            extensions: vec![
                cert_fields::basic_constraints(false, None)?,
                cert_fields::key_usage(params.public_key.ek_key_usage())?,
                cert_fields::ext_key_usage(oid::TCG_KP_EK_CERTIFICATE)?,
                cert_fields::subject_key_id(params.subject_key_id)?,
                cert_fields::authority_key_id(params.authority_key_id)?,
                cert_fields::tpm_subject_alt_name(
                    params.tpm.manufacturer,
                    params.tpm.model,
                    params.tpm.version,
                )?,
            ],
        }
        .to_der()
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
