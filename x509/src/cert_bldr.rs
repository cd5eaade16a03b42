/*++

Licensed under the Apache-2.0 license.

File Name:

    cert_bldr.rs

Abstract:

    X509 API to construct Certificate or Certificate Signing Request
    from "To Be Signed" blob and an ECDSA P-256 or RSA signature.

--*/

use crate::cert_fields::oid;
use crate::{NOT_AFTER, NOT_BEFORE};
use der::asn1::{Any, AnyRef, BitString, GeneralizedTime, Null, UintRef};
use der::{Decode, Encode, Header, Sequence, Tag};
use x509_cert::certificate::{TbsCertificate, Version};
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::time::{Time, Validity};

pub type CsrBuilder = CertBuilder;

/// Max Cert or CSR size
const MAX_CERT_LEN: usize = 4096;

/// ECDSA P-256 Signature
#[derive(Debug, Default)]
pub struct EcdsaSignature {
    /// Signature R-Coordinate
    pub r: [u8; Self::ECDSA_COORD_LEN],

    /// Signature S-Coordinate
    pub s: [u8; Self::ECDSA_COORD_LEN],
}

/// `ECDSA-Sig-Value ::= SEQUENCE { r INTEGER, s INTEGER }`
#[derive(Sequence)]
struct EcdsaSigValue<'a> {
    r: UintRef<'a>,
    s: UintRef<'a>,
}

impl EcdsaSignature {
    /// ECDSA Coordinate length
    const ECDSA_COORD_LEN: usize = 32;

    /// Convert the signature to a DER `ECDSA-Sig-Value`
    pub fn to_der(&self) -> Option<Vec<u8>> {
        let sig = EcdsaSigValue {
            r: UintRef::new(&self.r).ok()?,
            s: UintRef::new(&self.s).ok()?,
        };
        sig.to_der().ok()
    }
}

/// Issuer signature algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    EcdsaWithSha256,
    Sha256WithRsa,
}

impl SignatureAlgorithm {
    pub fn algorithm_identifier(&self) -> der::Result<AlgorithmIdentifierOwned> {
        Ok(match self {
            // Parameters absent for ECDSA
            SignatureAlgorithm::EcdsaWithSha256 => AlgorithmIdentifierOwned {
                oid: oid::ECDSA_WITH_SHA256,
                parameters: None,
            },
            // NULL parameters for RSA
            SignatureAlgorithm::Sha256WithRsa => AlgorithmIdentifierOwned {
                oid: oid::SHA256_WITH_RSA,
                parameters: Some(Any::encode_from(&Null)?),
            },
        })
    }
}

fn generalized_time(value: &str) -> der::Result<Time> {
    let mut der = Header::new(Tag::GeneralizedTime, value.len())?.to_der()?;
    der.extend_from_slice(value.as_bytes());
    Ok(Time::GeneralTime(GeneralizedTime::from_der(&der)?))
}

/// Fields of a v3 TBSCertificate signed with ecdsa-with-SHA256.
pub(crate) struct CertTbsFields<'a> {
    pub serial_number: &'a [u8],
    pub issuer: Name,
    pub subject: Name,
    pub public_key: SubjectPublicKeyInfoOwned,
    pub extensions: Vec<Extension>,
}

impl CertTbsFields<'_> {
    pub(crate) fn to_der(self) -> der::Result<Vec<u8>> {
        TbsCertificate {
            version: Version::V3,
            serial_number: SerialNumber::new(self.serial_number)?,
            signature: SignatureAlgorithm::EcdsaWithSha256.algorithm_identifier()?,
            issuer: self.issuer,
            validity: Validity {
                not_before: generalized_time(NOT_BEFORE)?,
                not_after: generalized_time(NOT_AFTER)?,
            },
            subject: self.subject,
            subject_public_key_info: self.public_key,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(self.extensions),
        }
        .to_der()
    }
}

/// `Certificate` and `CertificationRequest` share this shape
#[derive(Sequence)]
struct SignedObject<'a> {
    tbs: AnyRef<'a>,
    algorithm: AlgorithmIdentifierOwned,
    signature: BitString,
}

/// Certificate and CSR Builder
#[derive(Debug)]
pub struct CertBuilder {
    /// DER encoded Certificate or CSR
    der: Vec<u8>,
}

impl CertBuilder {
    /// Create a builder for an ECDSA signed Certificate or CSR
    ///
    /// # Arguments
    ///
    /// * `tbs` - DER encoded To be signed portion
    /// * `sig` - Signature of the To be signed portion
    pub fn new_ecdsa(tbs: &[u8], sig: &EcdsaSignature) -> Option<Self> {
        Self::new(tbs, SignatureAlgorithm::EcdsaWithSha256, &sig.to_der()?)
    }

    /// Create a builder for an RSASSA-PKCS1-v1_5 signed Certificate or CSR
    pub fn new_rsa(tbs: &[u8], sig: &[u8]) -> Option<Self> {
        Self::new(tbs, SignatureAlgorithm::Sha256WithRsa, sig)
    }

    fn new(tbs: &[u8], alg: SignatureAlgorithm, sig: &[u8]) -> Option<Self> {
        let signed = SignedObject {
            tbs: AnyRef::from_der(tbs).ok()?,
            algorithm: alg.algorithm_identifier().ok()?,
            signature: BitString::from_bytes(sig).ok()?,
        };
        let der = signed.to_der().ok()?;
        if der.len() > MAX_CERT_LEN {
            None?;
        }
        Some(Self { der })
    }

    /// Build the Certificate or Certificate Signing Request
    ///
    /// # Arguments
    ///
    /// * `buf` - Buffer to construct the certificate in
    ///
    /// # Returns
    ///
    /// * Number of bytes written
    pub fn build(&self, buf: &mut [u8]) -> Option<usize> {
        buf.get_mut(..self.der.len())?.copy_from_slice(&self.der);
        Some(self.der.len())
    }

    /// Return the length of Certificate or Certificate Signing Request
    pub fn len(&self) -> usize {
        self.der.len()
    }
}
