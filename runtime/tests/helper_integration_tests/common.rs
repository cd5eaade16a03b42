// Licensed under the Apache-2.0 license

use ftpm_helper_api::{CommandId, HelperParams, Memref, Param, Value};
use ftpm_helper_drivers::{DeviceIdentity, MemStorage, SoftRootOfTrust};
use ftpm_helper_error::HelperResult;
use ftpm_helper_runtime::{handle_command, FuseSetting, HelperConfig, HelperContext, SeedCustodian};
use log::LevelFilter;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use simple_logger::SimpleLogger;
use std::sync::Arc;
use x509_parser::prelude::*;

pub const IDENTITY: DeviceIdentity = DeviceIdentity {
    serial_number: [0x14, 0x23, 0x32, 0x41, 0x50, 0x6f, 0x7e, 0x8d, 0x9c, 0xab],
    ecid: [0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77],
};

pub const UDS: [u8; 32] = [0xc3; 32];

pub const TEST_EPS: [u8; 64] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10,
    0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f, 0x20,
    0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x2b, 0x2c, 0x2d, 0x2e, 0x2f, 0x30,
    0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x3b, 0x3c, 0x3d, 0x3e, 0x3f, 0x40,
];

pub const FW_MEASUREMENT: [u8; 32] = [0x5e; 32];

pub fn init_logging() {
    let _ = SimpleLogger::new().with_level(LevelFilter::Debug).init();
}

/// One device: its configuration, its flash, and the custodian of the
/// current boot.
pub struct TestDevice {
    pub config: HelperConfig,
    pub storage: MemStorage,
    pub custodian: Arc<SeedCustodian>,
}

impl TestDevice {
    pub fn new(fuse: FuseSetting) -> Self {
        Self::with_storage(fuse, MemStorage::new())
    }

    pub fn with_storage(fuse: FuseSetting, storage: MemStorage) -> Self {
        init_logging();
        let config = HelperConfig {
            provisioning_fuse: fuse,
            firmware_measurement: FW_MEASUREMENT,
            organization: "Test Org".into(),
            ..Default::default()
        };
        let custodian = SeedCustodian::new(
            Arc::new(config.fuse_bank(IDENTITY)),
            Arc::new(SoftRootOfTrust::new(UDS)),
            Arc::new(storage.clone()),
        );
        Self {
            config,
            storage,
            custodian: Arc::new(custodian),
        }
    }

    /// Open a session on the current boot.
    pub fn context(&self) -> HelperContext {
        HelperContext::new(self.config.clone(), self.custodian.clone())
    }

    /// Same device and flash, fresh service instance.
    pub fn reboot(&self) -> Self {
        Self::with_storage(self.config.provisioning_fuse, self.storage.clone())
    }
}

pub fn ping(ctx: &mut HelperContext) -> HelperResult<u32> {
    let mut params = HelperParams::new([
        Param::ValueOutput(Value::default()),
        Param::None,
        Param::None,
        Param::None,
    ]);
    handle_command(ctx, CommandId::PING_NS, &mut params)?;
    Ok(params.value(0)?.a)
}

/// Returns (mode, version major, version minor)
pub fn query_mode(ctx: &mut HelperContext) -> HelperResult<(u32, u32, u32)> {
    let mut params = HelperParams::new([
        Param::ValueOutput(Value::default()),
        Param::ValueOutput(Value::default()),
        Param::ValueOutput(Value::default()),
        Param::None,
    ]);
    handle_command(ctx, CommandId::QUERY_PROV_MODE, &mut params)?;
    Ok((params.value(0)?.a, params.value(1)?.a, params.value(2)?.a))
}

/// Run a command whose only parameter is an output memref of `len` bytes.
pub fn read_buf(ctx: &mut HelperContext, cmd: CommandId, len: usize) -> HelperResult<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let mut params = HelperParams::new([
        Param::MemrefOutput(Memref::new(&mut buf)),
        Param::None,
        Param::None,
        Param::None,
    ]);
    handle_command(ctx, cmd, &mut params)?;
    let size = params.output_size(0).unwrap();
    drop(params);
    buf.truncate(size);
    Ok(buf)
}

pub fn inject_eps(ctx: &mut HelperContext, eps: &[u8]) -> HelperResult<()> {
    let mut params = HelperParams::new([
        Param::MemrefInput(eps),
        Param::None,
        Param::None,
        Param::None,
    ]);
    handle_command(ctx, CommandId::INJECT_EPS, &mut params)
}

pub fn sign_ek_csr(ctx: &mut HelperContext, digest: &[u8], out_len: usize) -> HelperResult<Vec<u8>> {
    let mut out = vec![0u8; out_len];
    let mut params = HelperParams::new([
        Param::MemrefInput(digest),
        Param::MemrefOutput(Memref::new(&mut out)),
        Param::None,
        Param::None,
    ]);
    handle_command(ctx, CommandId::SIGN_EK_CSR, &mut params)?;
    let size = params.output_size(1).unwrap();
    drop(params);
    out.truncate(size);
    Ok(out)
}

/// An online device that has been pinged and provisioned with `TEST_EPS`.
pub fn provisioned_online() -> (TestDevice, HelperContext) {
    let device = TestDevice::new(FuseSetting::Online);
    let mut ctx = device.context();
    ping(&mut ctx).unwrap();
    inject_eps(&mut ctx, &TEST_EPS).unwrap();
    (device, ctx)
}

pub fn verify_ecdsa(msg: &[u8], sig_der: &[u8], pub_key_sec1: &[u8]) -> bool {
    let key = VerifyingKey::from_sec1_bytes(pub_key_sec1).unwrap();
    let sig = Signature::from_der(sig_der).unwrap();
    key.verify(msg, &sig).is_ok()
}

/// Check that `cert` is signed by the key in `issuer`.
pub fn verify_issued_by(cert: &X509Certificate, issuer: &X509Certificate) -> bool {
    assert_eq!(cert.issuer().as_raw(), issuer.subject().as_raw());
    verify_ecdsa(
        cert.tbs_certificate.as_ref(),
        &cert.signature_value.data,
        &issuer.public_key().subject_public_key.data,
    )
}
