// Licensed under the Apache-2.0 license

use crate::common::*;
use ftpm_helper_api::{CommandId, CERT_BUF_LEN};
use ftpm_helper_error::HelperError;
use ftpm_helper_runtime::FuseSetting;
use sha2::{Digest, Sha256};
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

const CERT_CMDS: [CommandId; 4] = [
    CommandId::GET_RSA_EK_CERT,
    CommandId::GET_EC_EK_CERT,
    CommandId::GET_SID_CERT,
    CommandId::GET_FW_ID_CERT,
];

const TCB_INFO_OID: &str = "2.23.133.5.4.1";

fn cert_chain(ctx: &mut ftpm_helper_runtime::HelperContext) -> [Vec<u8>; 4] {
    CERT_CMDS.map(|cmd| read_buf(ctx, cmd, CERT_BUF_LEN).unwrap())
}

#[test]
fn test_certs_need_seed() {
    let device = TestDevice::new(FuseSetting::Online);
    let mut ctx = device.context();

    for cmd in CERT_CMDS {
        assert_eq!(
            read_buf(&mut ctx, cmd, CERT_BUF_LEN),
            Err(HelperError::NOT_INITIALIZED)
        );
    }

    ping(&mut ctx).unwrap();
    for cmd in CERT_CMDS {
        assert_eq!(
            read_buf(&mut ctx, cmd, CERT_BUF_LEN),
            Err(HelperError::SEED_NOT_PROVISIONED)
        );
    }

    inject_eps(&mut ctx, &TEST_EPS).unwrap();
    let cert = read_buf(&mut ctx, CommandId::GET_RSA_EK_CERT, CERT_BUF_LEN).unwrap();
    assert!(cert.len() <= CERT_BUF_LEN);
    assert!(X509Certificate::from_der(&cert).is_ok());
}

#[test]
fn test_chain_verifies() {
    let (_device, mut ctx) = provisioned_online();
    let [ek_rsa, ek_ec, sid, fwid] = cert_chain(&mut ctx);

    let (_, sid) = X509Certificate::from_der(&sid).unwrap();
    let (_, fwid) = X509Certificate::from_der(&fwid).unwrap();
    let (_, ek_rsa) = X509Certificate::from_der(&ek_rsa).unwrap();
    let (_, ek_ec) = X509Certificate::from_der(&ek_ec).unwrap();

    assert!(verify_issued_by(&sid, &sid));
    assert!(verify_issued_by(&fwid, &sid));
    assert!(verify_issued_by(&ek_rsa, &fwid));
    assert!(verify_issued_by(&ek_ec, &fwid));

    assert!(sid.is_ca());
    assert!(fwid.is_ca());
    assert!(!ek_rsa.is_ca());
    assert!(!ek_ec.is_ca());

    let sn_hex = hex::encode_upper(IDENTITY.serial_number);
    for cert in [&sid, &fwid, &ek_rsa, &ek_ec] {
        assert!(cert.subject().to_string().contains(&sn_hex));
        assert_eq!(
            cert.subject()
                .iter_organization()
                .next()
                .unwrap()
                .as_str()
                .unwrap(),
            "Test Org"
        );
        // Positive 20 byte serial derived from the key
        let serial = cert.raw_serial();
        assert_eq!(serial.len(), 20);
        assert_eq!(serial[0] & 0x80, 0);
        let digest = Sha256::digest(&cert.public_key().subject_public_key.data[..]);
        assert_eq!(&serial[1..], &digest[1..20]);
    }
}

#[test]
fn test_firmware_id_carries_measurement() {
    let (_device, mut ctx) = provisioned_online();
    let fwid = read_buf(&mut ctx, CommandId::GET_FW_ID_CERT, CERT_BUF_LEN).unwrap();
    let (_, fwid) = X509Certificate::from_der(&fwid).unwrap();
    let tcb_info = fwid
        .extensions()
        .iter()
        .find(|ext| ext.oid.to_id_string() == TCB_INFO_OID)
        .unwrap();
    assert!(tcb_info
        .value
        .windows(FW_MEASUREMENT.len())
        .any(|w| w == FW_MEASUREMENT));
}

#[test]
fn test_ek_key_types() {
    let (_device, mut ctx) = provisioned_online();
    let ek_rsa = read_buf(&mut ctx, CommandId::GET_RSA_EK_CERT, CERT_BUF_LEN).unwrap();
    let ek_ec = read_buf(&mut ctx, CommandId::GET_EC_EK_CERT, CERT_BUF_LEN).unwrap();

    let (_, ek_rsa) = X509Certificate::from_der(&ek_rsa).unwrap();
    match ek_rsa.public_key().parsed().unwrap() {
        PublicKey::RSA(rsa) => {
            assert_eq!(rsa.key_size(), 2048);
            assert_eq!(rsa.try_exponent().unwrap(), 65537);
        }
        _ => panic!("expected an RSA key"),
    }
    assert!(ek_rsa.key_usage().unwrap().unwrap().value.key_encipherment());

    let (_, ek_ec) = X509Certificate::from_der(&ek_ec).unwrap();
    assert!(matches!(
        ek_ec.public_key().parsed().unwrap(),
        PublicKey::EC(_)
    ));
    assert!(ek_ec.key_usage().unwrap().unwrap().value.key_agreement());
}

#[test]
fn test_certs_are_deterministic() {
    let (first, mut ctx) = provisioned_online();
    let chain = cert_chain(&mut ctx);
    // Cached copy
    assert_eq!(cert_chain(&mut ctx), chain);

    // Another device with the same identity and seed
    let (_second, mut other) = provisioned_online();
    assert_eq!(cert_chain(&mut other), chain);

    // Same device after a reboot
    let rebooted = first.reboot();
    let mut ctx = rebooted.context();
    ping(&mut ctx).unwrap();
    assert_eq!(cert_chain(&mut ctx), chain);
}

#[test]
fn test_offline_device_issues_without_injection() {
    let device = TestDevice::new(FuseSetting::Offline);
    let mut ctx = device.context();
    ping(&mut ctx).unwrap();
    let [ek_rsa, ek_ec, _, _] = cert_chain(&mut ctx);

    let (_online, mut online_ctx) = provisioned_online();
    // The offline EPS is not the injected test seed
    assert_ne!(
        read_buf(&mut online_ctx, CommandId::GET_EC_EK_CERT, CERT_BUF_LEN).unwrap(),
        ek_ec
    );
    assert!(X509Certificate::from_der(&ek_rsa).is_ok());
}

#[test]
fn test_short_buffer() {
    let (_device, mut ctx) = provisioned_online();
    let cert = read_buf(&mut ctx, CommandId::GET_SID_CERT, CERT_BUF_LEN).unwrap();

    assert_eq!(
        read_buf(&mut ctx, CommandId::GET_SID_CERT, cert.len() - 1),
        Err(HelperError::BUFFER_TOO_SMALL)
    );
    assert_eq!(
        read_buf(&mut ctx, CommandId::GET_SID_CERT, cert.len()).unwrap(),
        cert
    );
}
