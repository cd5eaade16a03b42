/*++

Licensed under the Apache-2.0 license.

File Name:

    certs.rs

Abstract:

    Issues the identity chain (Silicon ID, Firmware ID) and the EK
    certificates, caching each one for the life of the context.

--*/

use crate::x509::X509;
use crate::HelperContext;
use ftpm_helper_api::{CertKind, CsrKind, HelperParams, ParamType, CERT_BUF_LEN};
use ftpm_helper_drivers::RSA_2048_MODULUS_SIZE;
use ftpm_helper_error::{HelperError, HelperResult};
use ftpm_helper_x509::{
    CertBuilder, EcdsaSignature, EkCertTbs, EkCertTbsParams, FirmwareIdCertTbs,
    FirmwareIdCertTbsParams, PublicKeyInfo, SiliconIdCertTbs, SiliconIdCertTbsParams, TpmInfo,
    EC_PUBLIC_KEY_LEN,
};

/// Certificates issued in this context
#[derive(Debug, Default)]
pub struct CertCache {
    ek_rsa: Option<Vec<u8>>,
    ek_ec: Option<Vec<u8>>,
    silicon_id: Option<Vec<u8>>,
    firmware_id: Option<Vec<u8>>,
}

impl CertCache {
    fn get(&self, kind: CertKind) -> Option<&[u8]> {
        match kind {
            CertKind::EkRsa => self.ek_rsa.as_deref(),
            CertKind::EkEc => self.ek_ec.as_deref(),
            CertKind::SiliconId => self.silicon_id.as_deref(),
            CertKind::FirmwareId => self.firmware_id.as_deref(),
        }
    }

    fn slot(&mut self, kind: CertKind) -> &mut Option<Vec<u8>> {
        match kind {
            CertKind::EkRsa => &mut self.ek_rsa,
            CertKind::EkEc => &mut self.ek_ec,
            CertKind::SiliconId => &mut self.silicon_id,
            CertKind::FirmwareId => &mut self.firmware_id,
        }
    }
}

/// Encode a signed certificate
fn build_cert(tbs: &[u8], sig: &EcdsaSignature) -> HelperResult<Vec<u8>> {
    let builder = CertBuilder::new_ecdsa(tbs, sig).ok_or(HelperError::X509_ENCODING)?;
    let mut cert = vec![0u8; builder.len()];
    let len = builder.build(&mut cert).ok_or(HelperError::X509_ENCODING)?;
    cert.truncate(len);
    if cert.len() > CERT_BUF_LEN {
        return Err(HelperError::X509_ENCODING);
    }
    Ok(cert)
}

fn silicon_id_cert(ctx: &mut HelperContext) -> HelperResult<Vec<u8>> {
    let identity = ctx.custodian.identity();
    let sid = ctx.keys.silicon_id(&ctx.custodian)?;
    let pub_key = sid.key.pub_key().to_sec1();
    let key_info = PublicKeyInfo::EcP256(&pub_key);

    let tbs = SiliconIdCertTbs::new(&SiliconIdCertTbsParams {
        serial_number: &X509::cert_sn(&key_info)?,
        public_key: &pub_key,
        subject_sn: &X509::subj_sn(&identity),
        organization: &ctx.config.organization,
        subject_key_id: &X509::subj_key_id(&key_info)?,
    })
    .ok_or(HelperError::X509_ENCODING)?;

    let sig = tbs.sign(|b| X509::sign_tbs(&sid.key, b))?;
    build_cert(tbs.tbs(), &sig)
}

fn firmware_id_cert(ctx: &mut HelperContext) -> HelperResult<Vec<u8>> {
    let identity = ctx.custodian.identity();
    let measurement = ctx.config.firmware_measurement;

    let fw_pub_key = ctx
        .keys
        .firmware_id(&ctx.custodian, &measurement)?
        .key
        .pub_key()
        .to_sec1();
    let fw_key_info = PublicKeyInfo::EcP256(&fw_pub_key);

    let sid = ctx.keys.silicon_id(&ctx.custodian)?;
    let sid_pub_key = sid.key.pub_key().to_sec1();
    let subject_sn = X509::subj_sn(&identity);

    let tbs = FirmwareIdCertTbs::new(&FirmwareIdCertTbsParams {
        serial_number: &X509::cert_sn(&fw_key_info)?,
        public_key: &fw_pub_key,
        subject_sn: &subject_sn,
        issuer_sn: &subject_sn,
        organization: &ctx.config.organization,
        subject_key_id: &X509::subj_key_id(&fw_key_info)?,
        authority_key_id: &X509::subj_key_id(&PublicKeyInfo::EcP256(&sid_pub_key))?,
        tcb_info_fw_digest: &measurement,
    })
    .ok_or(HelperError::X509_ENCODING)?;

    let sig = tbs.sign(|b| X509::sign_tbs(&sid.key, b))?;
    build_cert(tbs.tbs(), &sig)
}

fn ek_cert(ctx: &mut HelperContext, kind: CertKind) -> HelperResult<Vec<u8>> {
    let identity = ctx.custodian.identity();
    let measurement = ctx.config.firmware_measurement;

    // Copy the EK public half out before borrowing the issuer key
    let modulus: [u8; RSA_2048_MODULUS_SIZE];
    let exponent: Vec<u8>;
    let ec_point: [u8; EC_PUBLIC_KEY_LEN];
    let key_info = match CsrKind::try_from(kind)? {
        CsrKind::EkRsa => {
            let ek = ctx.keys.ek_rsa(&ctx.custodian)?;
            modulus = ek.modulus();
            exponent = ek.exponent();
            PublicKeyInfo::Rsa {
                modulus: &modulus,
                exponent: &exponent,
            }
        }
        CsrKind::EkEc => {
            ec_point = ctx.keys.ek_ecc(&ctx.custodian)?.pub_key().to_sec1();
            PublicKeyInfo::EcP256(&ec_point)
        }
    };

    let fwid = ctx.keys.firmware_id(&ctx.custodian, &measurement)?;
    let fw_pub_key = fwid.key.pub_key().to_sec1();
    let subject_sn = X509::subj_sn(&identity);
    let config = &ctx.config;

    let tbs = EkCertTbs::new(&EkCertTbsParams {
        serial_number: &X509::cert_sn(&key_info)?,
        public_key: key_info,
        subject_sn: &subject_sn,
        issuer_sn: &subject_sn,
        organization: &config.organization,
        subject_key_id: &X509::subj_key_id(&key_info)?,
        authority_key_id: &X509::subj_key_id(&PublicKeyInfo::EcP256(&fw_pub_key))?,
        tpm: TpmInfo {
            manufacturer: &config.tpm_manufacturer,
            model: &config.tpm_model,
            version: &config.tpm_version,
        },
    })
    .ok_or(HelperError::X509_ENCODING)?;

    let sig = tbs.sign(|b| X509::sign_tbs(&fwid.key, b))?;
    build_cert(tbs.tbs(), &sig)
}

/// Get a certificate, issuing it on first use.
pub fn get_certificate(ctx: &mut HelperContext, kind: CertKind) -> HelperResult<&[u8]> {
    ctx.require_mode()?;
    // The identity chain is released only once the EPS exists
    ctx.custodian.require_seed()?;

    if ctx.certs.get(kind).is_none() {
        let cert = match kind {
            CertKind::SiliconId => silicon_id_cert(ctx)?,
            CertKind::FirmwareId => firmware_id_cert(ctx)?,
            CertKind::EkRsa | CertKind::EkEc => ek_cert(ctx, kind)?,
        };
        log::info!("[ftpm] Issued {:?} certificate ({} bytes)", kind, cert.len());
        *ctx.certs.slot(kind) = Some(cert);
    }
    ctx.certs.get(kind).ok_or(HelperError::INTERNAL)
}

pub struct GetCertCmd;
impl GetCertCmd {
    pub(crate) fn execute(
        ctx: &mut HelperContext,
        kind: CertKind,
        params: &mut HelperParams,
    ) -> HelperResult<()> {
        params.expect_types([
            ParamType::MemrefOutput,
            ParamType::None,
            ParamType::None,
            ParamType::None,
        ])?;
        let cert = get_certificate(ctx, kind)?;
        params.memref_out(0)?.write(cert)
    }
}
