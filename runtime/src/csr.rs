/*++

Licensed under the Apache-2.0 license.

File Name:

    csr.rs

Abstract:

    EK certificate signing requests and signing of a CSR digest with the
    EC endorsement key.

--*/

use crate::x509::X509;
use crate::HelperContext;
use ftpm_helper_api::{CsrKind, EkCsrSignature, HelperParams, ParamType, CSR_BUF_LEN, DIGEST_LEN};
use ftpm_helper_drivers::sha256;
use ftpm_helper_error::{HelperError, HelperResult};
use ftpm_helper_x509::{CsrBuilder, EkCsrTbs, EkCsrTbsParams, PublicKeyInfo};
use zerocopy::IntoBytes;

fn build_csr(builder: CsrBuilder) -> HelperResult<Vec<u8>> {
    let mut csr = vec![0u8; builder.len()];
    let len = builder.build(&mut csr).ok_or(HelperError::X509_ENCODING)?;
    csr.truncate(len);
    if csr.len() > CSR_BUF_LEN {
        return Err(HelperError::X509_ENCODING);
    }
    Ok(csr)
}

/// Build a self-signed PKCS#10 request for an endorsement key.
pub fn get_csr(ctx: &mut HelperContext, kind: CsrKind) -> HelperResult<Vec<u8>> {
    ctx.require_mode()?;
    let identity = ctx.custodian.identity();
    let subject_sn = X509::subj_sn(&identity);
    let ecid = identity.ecid_hex();

    match kind {
        CsrKind::EkEc => {
            let ek = ctx.keys.ek_ecc(&ctx.custodian)?;
            let pub_key = ek.pub_key().to_sec1();
            let tbs = EkCsrTbs::new(&EkCsrTbsParams {
                public_key: PublicKeyInfo::EcP256(&pub_key),
                subject_sn: &subject_sn,
                ecid: &ecid,
            })
            .ok_or(HelperError::X509_ENCODING)?;
            let sig = tbs.sign(|b| X509::sign_tbs(ek, b))?;
            build_csr(CsrBuilder::new_ecdsa(tbs.tbs(), &sig).ok_or(HelperError::X509_ENCODING)?)
        }
        CsrKind::EkRsa => {
            let ek = ctx.keys.ek_rsa(&ctx.custodian)?;
            let modulus = ek.modulus();
            let exponent = ek.exponent();
            let tbs = EkCsrTbs::new(&EkCsrTbsParams {
                public_key: PublicKeyInfo::Rsa {
                    modulus: &modulus,
                    exponent: &exponent,
                },
                subject_sn: &subject_sn,
                ecid: &ecid,
            })
            .ok_or(HelperError::X509_ENCODING)?;
            let sig = tbs.sign(|b| ek.sign_sha256(&sha256(&[b])))?;
            build_csr(CsrBuilder::new_rsa(tbs.tbs(), &sig).ok_or(HelperError::X509_ENCODING)?)
        }
    }
}

/// Sign a caller supplied SHA-256 digest with the EC endorsement key.
pub fn sign_digest(ctx: &mut HelperContext, digest: &[u8]) -> HelperResult<EkCsrSignature> {
    ctx.require_mode()?;
    let digest: &[u8; DIGEST_LEN] = digest
        .try_into()
        .map_err(|_| HelperError::INVALID_DIGEST_LENGTH)?;

    let ek = ctx.keys.ek_ecc(&ctx.custodian).map_err(|e| {
        if e == HelperError::SEED_NOT_PROVISIONED {
            HelperError::SIGNING_KEY_UNAVAILABLE
        } else {
            e
        }
    })?;
    let sig = ek.sign(digest)?;
    EkCsrSignature::from_der(&sig.to_der()?)
}

pub struct GetEkCsrCmd;
impl GetEkCsrCmd {
    pub(crate) fn execute(
        ctx: &mut HelperContext,
        kind: CsrKind,
        params: &mut HelperParams,
    ) -> HelperResult<()> {
        params.expect_types([
            ParamType::MemrefOutput,
            ParamType::None,
            ParamType::None,
            ParamType::None,
        ])?;
        let csr = get_csr(ctx, kind)?;
        params.memref_out(0)?.write(&csr)
    }
}

pub struct SignEkCsrCmd;
impl SignEkCsrCmd {
    pub(crate) fn execute(ctx: &mut HelperContext, params: &mut HelperParams) -> HelperResult<()> {
        params.expect_types([
            ParamType::MemrefInput,
            ParamType::MemrefOutput,
            ParamType::None,
            ParamType::None,
        ])?;
        let sig = sign_digest(ctx, params.memref_in(0)?)?;
        params.memref_out(1)?.write(sig.as_bytes())
    }
}
