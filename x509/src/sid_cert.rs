/*++

Licensed under the Apache-2.0 license.

File Name:

    sid_cert.rs

Abstract:

    Silicon ID Certificate related code. The Silicon ID certificate is the
    self-signed root of the device identity chain.

--*/

use crate::cert_bldr::CertTbsFields;
use crate::cert_fields::{
    self, NameParams, PublicKeyInfo, EC_PUBLIC_KEY_LEN, KEY_ID_LEN, SERIAL_NUMBER_LEN,
};
use x509_cert::ext::pkix::{KeyUsage, KeyUsages};

/// Silicon ID Certificate To Be Signed parameters
#[derive(Debug)]
pub struct SiliconIdCertTbsParams<'a> {
    pub serial_number: &'a [u8; SERIAL_NUMBER_LEN],
    pub public_key: &'a [u8; EC_PUBLIC_KEY_LEN],
    pub subject_sn: &'a str,
    pub organization: &'a str,
    pub subject_key_id: &'a [u8; KEY_ID_LEN],
}

impl SiliconIdCertTbsParams<'_> {
    pub const SERIAL_NUMBER_LEN: usize = SERIAL_NUMBER_LEN;
    pub const PUBLIC_KEY_LEN: usize = EC_PUBLIC_KEY_LEN;
    pub const KEY_ID_LEN: usize = KEY_ID_LEN;
}

/// Silicon ID Certificate To Be Signed
pub struct SiliconIdCertTbs {
    tbs: Vec<u8>,
}

impl SiliconIdCertTbs {
    pub const COMMON_NAME: &'static str = "Silicon ID";

    /// Path length allows the Firmware ID CA below it
    const PATH_LEN: u8 = 1;

    pub fn new(params: &SiliconIdCertTbsParams) -> Option<Self> {
        Self::encode(params).ok().map(|tbs| Self { tbs })
    }

    fn encode(params: &SiliconIdCertTbsParams) -> der::Result<Vec<u8>> {
        let name = Self::subject(params.subject_sn, params.organization).to_name()?;
        let usage = KeyUsage(KeyUsages::KeyCertSign | KeyUsages::CRLSign);
        CertTbsFields {
            serial_number: params.serial_number,
            issuer: name.clone(),
            subject: name,
            public_key: PublicKeyInfo::EcP256(params.public_key).to_spki()?,
            extensions: vec![
                cert_fields::basic_constraints(true, Some(Self::PATH_LEN))?,
                cert_fields::key_usage(usage)?,
                cert_fields::subject_key_id(params.subject_key_id)?,
                cert_fields::authority_key_id(params.subject_key_id)?,
            ],
        }
        .to_der()
    }

    /// Subject name, also the issuer of the Firmware ID certificate
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
