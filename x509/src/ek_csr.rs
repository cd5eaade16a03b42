/*++

Licensed under the Apache-2.0 license.

File Name:

    ek_csr.rs

Abstract:

    Endorsement Key Certificate Signing Request related code.

--*/

use crate::cert_fields::{self, oid, NameParams, PublicKeyInfo};
use der::asn1::{Any, Ia5StringRef, SetOfVec};
use der::Encode;
use x509_cert::attr::Attribute;
use x509_cert::request::{self, CertReqInfo};

/// EK CSR To Be Signed parameters
#[derive(Debug)]
pub struct EkCsrTbsParams<'a> {
    pub public_key: PublicKeyInfo<'a>,

    /// Device serial number (hex)
    pub subject_sn: &'a str,

    /// ECID (hex), placed in the unstructuredName attribute
    pub ecid: &'a str,
}

/// EK CSR To Be Signed (`CertificationRequestInfo`)
pub struct EkCsrTbs {
    tbs: Vec<u8>,
}

impl EkCsrTbs {
    pub const COMMON_NAME: &'static str = "TPM EK";

    pub fn new(params: &EkCsrTbsParams) -> Option<Self> {
        Self::encode(params).ok().map(|tbs| Self { tbs })
    }

    fn encode(params: &EkCsrTbsParams) -> der::Result<Vec<u8>> {
        let subject = NameParams {
            common_name: Self::COMMON_NAME,
            serial_number: params.subject_sn,
            organization: None,
        };
        let key_usage = cert_fields::key_usage(params.public_key.ek_key_usage())?;
        let attributes = vec![
            Self::attribute(
                oid::UNSTRUCTURED_NAME,
                Any::encode_from(&Ia5StringRef::new(params.ecid)?)?,
            )?,
            Self::attribute(oid::EXTENSION_REQUEST, Any::encode_from(&vec![key_usage])?)?,
        ];
        CertReqInfo {
            version: request::Version::V1,
            subject: subject.to_name()?,
            public_key: params.public_key.to_spki()?,
            attributes: SetOfVec::try_from(attributes)?,
        }
        .to_der()
    }

    /// Attribute with a single value
    fn attribute(oid: const_oid::ObjectIdentifier, value: Any) -> der::Result<Attribute> {
        Ok(Attribute {
            oid,
            values: SetOfVec::try_from(vec![value])?,
        })
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
