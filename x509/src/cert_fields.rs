/*++

Licensed under the Apache-2.0 license.

File Name:

    cert_fields.rs

Abstract:

    Object identifiers, names, public keys and extensions shared by the
    certificates and CSRs issued by the helper.

--*/

use const_oid::{AssociatedOid, ObjectIdentifier};
use der::asn1::{
    Any, BitString, Null, OctetString, PrintableStringRef, SetOfVec, UintRef, Utf8StringRef,
};
use der::{Encode, Sequence};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage, KeyUsages,
    SubjectAltName, SubjectKeyIdentifier,
};
use x509_cert::ext::Extension;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

/// Certificate serial number length
pub const SERIAL_NUMBER_LEN: usize = 20;

/// Subject and authority key identifier length
pub const KEY_ID_LEN: usize = 20;

/// Uncompressed SEC1 P-256 point length
pub const EC_PUBLIC_KEY_LEN: usize = 65;

pub mod oid {
    use const_oid::ObjectIdentifier;

    pub const ECDSA_WITH_SHA256: ObjectIdentifier =
        ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");
    pub const SHA256_WITH_RSA: ObjectIdentifier =
        ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
    pub const RSA_ENCRYPTION: ObjectIdentifier =
        ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
    pub const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
    pub const PRIME256V1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
    pub const SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");

    pub const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
    pub const SERIAL_NUMBER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.5");
    pub const ORGANIZATION: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");

    // TCG
    pub const TPM_MANUFACTURER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.23.133.2.1");
    pub const TPM_MODEL: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.23.133.2.2");
    pub const TPM_VERSION: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.23.133.2.3");
    pub const TCG_KP_EK_CERTIFICATE: ObjectIdentifier =
        ObjectIdentifier::new_unwrap("2.23.133.8.1");
    pub const TCG_DICE_TCB_INFO: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.23.133.5.4.1");

    // PKCS#9
    pub const UNSTRUCTURED_NAME: ObjectIdentifier =
        ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.2");
    pub const EXTENSION_REQUEST: ObjectIdentifier =
        ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.14");
}

/// Distinguished name made of one attribute per RDN.
#[derive(Debug, Clone, Copy)]
pub struct NameParams<'a> {
    pub common_name: &'a str,

    /// Hex string; encoded as a PrintableString
    pub serial_number: &'a str,

    pub organization: Option<&'a str>,
}

fn rdn(oid: ObjectIdentifier, value: Any) -> der::Result<RelativeDistinguishedName> {
    let atv = AttributeTypeAndValue { oid, value };
    Ok(RelativeDistinguishedName(SetOfVec::try_from(vec![atv])?))
}

fn utf8(value: &str) -> der::Result<Any> {
    Any::encode_from(&Utf8StringRef::new(value)?)
}

impl NameParams<'_> {
    pub fn to_name(&self) -> der::Result<Name> {
        let mut rdns = vec![
            rdn(oid::COMMON_NAME, utf8(self.common_name)?)?,
            rdn(
                oid::SERIAL_NUMBER,
                Any::encode_from(&PrintableStringRef::new(self.serial_number)?)?,
            )?,
        ];
        if let Some(org) = self.organization {
            rdns.push(rdn(oid::ORGANIZATION, utf8(org)?)?);
        }
        Ok(RdnSequence(rdns))
    }
}

/// `RSAPublicKey ::= SEQUENCE { modulus INTEGER, publicExponent INTEGER }`
#[derive(Sequence)]
struct RsaPublicKeyDer<'a> {
    modulus: UintRef<'a>,
    public_exponent: UintRef<'a>,
}

/// Public key carried in a certificate or CSR.
#[derive(Debug, Clone, Copy)]
pub enum PublicKeyInfo<'a> {
    /// Uncompressed SEC1 point on P-256
    EcP256(&'a [u8; EC_PUBLIC_KEY_LEN]),

    /// Big-endian modulus and exponent
    Rsa { modulus: &'a [u8], exponent: &'a [u8] },
}

impl PublicKeyInfo<'_> {
    fn encoded_key_bits(&self) -> der::Result<Vec<u8>> {
        match self {
            PublicKeyInfo::EcP256(point) => Ok(point.to_vec()),
            PublicKeyInfo::Rsa { modulus, exponent } => RsaPublicKeyDer {
                modulus: UintRef::new(modulus)?,
                public_exponent: UintRef::new(exponent)?,
            }
            .to_der(),
        }
    }

    /// The subjectPublicKey bits, as hashed for key identifiers.
    pub fn key_bits(&self) -> Option<Vec<u8>> {
        self.encoded_key_bits().ok()
    }

    pub fn to_spki(&self) -> der::Result<SubjectPublicKeyInfoOwned> {
        let algorithm = match self {
            PublicKeyInfo::EcP256(_) => AlgorithmIdentifierOwned {
                oid: oid::EC_PUBLIC_KEY,
                parameters: Some(Any::encode_from(&oid::PRIME256V1)?),
            },
            PublicKeyInfo::Rsa { .. } => AlgorithmIdentifierOwned {
                oid: oid::RSA_ENCRYPTION,
                parameters: Some(Any::encode_from(&Null)?),
            },
        };
        Ok(SubjectPublicKeyInfoOwned {
            algorithm,
            subject_public_key: BitString::from_bytes(&self.encoded_key_bits()?)?,
        })
    }

    /// RSA EKs decrypt credential blobs, EC EKs run ECDH
    pub(crate) fn ek_key_usage(&self) -> KeyUsage {
        match self {
            PublicKeyInfo::Rsa { .. } => KeyUsage(KeyUsages::KeyEncipherment.into()),
            PublicKeyInfo::EcP256(_) => KeyUsage(KeyUsages::KeyAgreement.into()),
        }
    }
}

/// Wrap an encodable extension value
fn extension<T: AssociatedOid + Encode>(value: &T, critical: bool) -> der::Result<Extension> {
    Ok(Extension {
        extn_id: T::OID,
        critical,
        extn_value: OctetString::new(value.to_der()?)?,
    })
}

pub fn basic_constraints(ca: bool, path_len: Option<u8>) -> der::Result<Extension> {
    let bc = BasicConstraints {
        ca,
        path_len_constraint: if ca { path_len } else { None },
    };
    extension(&bc, true)
}

pub fn key_usage(usage: KeyUsage) -> der::Result<Extension> {
    extension(&usage, true)
}

pub fn subject_key_id(key_id: &[u8]) -> der::Result<Extension> {
    extension(&SubjectKeyIdentifier(OctetString::new(key_id)?), false)
}

pub fn authority_key_id(key_id: &[u8]) -> der::Result<Extension> {
    let aki = AuthorityKeyIdentifier {
        key_identifier: Some(OctetString::new(key_id)?),
        authority_cert_issuer: None,
        authority_cert_serial_number: None,
    };
    extension(&aki, false)
}

pub fn ext_key_usage(purpose: ObjectIdentifier) -> der::Result<Extension> {
    extension(&ExtendedKeyUsage(vec![purpose]), false)
}

/// TPM identity as a directoryName subject alternative name.
pub fn tpm_subject_alt_name(
    manufacturer: &str,
    model: &str,
    version: &str,
) -> der::Result<Extension> {
    let name = RdnSequence(vec![
        rdn(oid::TPM_MANUFACTURER, utf8(manufacturer)?)?,
        rdn(oid::TPM_MODEL, utf8(model)?)?,
        rdn(oid::TPM_VERSION, utf8(version)?)?,
    ]);
    extension(&SubjectAltName(vec![GeneralName::DirectoryName(name)]), false)
}

#[derive(Sequence)]
struct Fwid<'a> {
    hash_alg: ObjectIdentifier,
    #[asn1(type = "OCTET STRING")]
    digest: &'a [u8],
}

/// DICE TcbInfo carrying the vendor and the firmware digests.
#[derive(Sequence)]
#[asn1(tag_mode = "IMPLICIT")]
struct TcbInfo<'a> {
    #[asn1(context_specific = "0", optional = "true")]
    vendor: Option<Utf8StringRef<'a>>,

    #[asn1(context_specific = "6", optional = "true")]
    fwids: Option<Vec<Fwid<'a>>>,
}

impl AssociatedOid for TcbInfo<'_> {
    const OID: ObjectIdentifier = oid::TCG_DICE_TCB_INFO;
}

/// TcbInfo with one SHA-256 firmware digest.
pub fn tcb_info(vendor: &str, fwid: &[u8; 32]) -> der::Result<Extension> {
    let tcb_info = TcbInfo {
        vendor: Some(Utf8StringRef::new(vendor)?),
        fwids: Some(vec![Fwid {
            hash_alg: oid::SHA256,
            digest: fwid,
        }]),
    };
    extension(&tcb_info, false)
}
