// Licensed under the Apache-2.0 license

use crate::common::*;
use ftpm_helper_api::{
    CommandId, HelperParams, Memref, Param, ProvisioningMode, CERT_BUF_LEN, ECID_LEN, SN_LEN,
    VERSION_MAJOR, VERSION_MINOR,
};
use ftpm_helper_error::{tee, HelperError};
use ftpm_helper_runtime::{handle_command, invoke_command, FuseSetting};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_query_identity_before_ping() {
    let device = TestDevice::new(FuseSetting::Unfused);
    let mut ctx = device.context();

    let sn = read_buf(&mut ctx, CommandId::QUERY_SN, SN_LEN).unwrap();
    assert_eq!(sn, IDENTITY.serial_number);

    let ecid = read_buf(&mut ctx, CommandId::QUERY_ECID, 64).unwrap();
    assert_eq!(ecid.len(), ECID_LEN);
    assert_eq!(ecid, IDENTITY.ecid);
}

#[test]
fn test_query_short_buffer_writes_nothing() {
    let device = TestDevice::new(FuseSetting::Unfused);
    let mut ctx = device.context();

    let mut buf = [0xeeu8; SN_LEN - 1];
    let mut params = HelperParams::new([
        Param::MemrefOutput(Memref::new(&mut buf)),
        Param::None,
        Param::None,
        Param::None,
    ]);
    assert_eq!(
        handle_command(&mut ctx, CommandId::QUERY_SN, &mut params),
        Err(HelperError::BUFFER_TOO_SMALL)
    );
    assert_eq!(params.output_size(0), Some(SN_LEN - 1));
    drop(params);
    assert_eq!(buf, [0xee; SN_LEN - 1]);
}

#[test]
fn test_prov_mode() {
    let cases = [
        (FuseSetting::Offline, ProvisioningMode::OFFLINE_VALUE),
        (FuseSetting::Online, ProvisioningMode::ONLINE_VALUE),
        (FuseSetting::Unfused, ProvisioningMode::ONLINE_VALUE),
    ];
    for (fuse, expected) in cases {
        let device = TestDevice::new(fuse);
        let mut ctx = device.context();
        assert_eq!(
            query_mode(&mut ctx),
            Ok((ProvisioningMode::UNKNOWN_VALUE, VERSION_MAJOR, VERSION_MINOR))
        );
        ping(&mut ctx).unwrap();
        assert_eq!(query_mode(&mut ctx), Ok((expected, 2, 0)));
    }
}

#[test]
fn test_unsupported_command() {
    let device = TestDevice::new(FuseSetting::Offline);
    let mut ctx = device.context();
    let mut params = HelperParams::default();
    assert_eq!(
        invoke_command(&mut ctx, 0xffff_000d, &mut params),
        tee::TEE_ERROR_NOT_SUPPORTED
    );
    assert_eq!(
        invoke_command(&mut ctx, 0, &mut params),
        tee::TEE_ERROR_NOT_SUPPORTED
    );
}

#[test]
fn test_prov_mode_while_ek_is_generated() {
    let (device, mut issuer) = provisioned_online();
    let mut session = device.context();

    let done = Arc::new(AtomicBool::new(false));
    let start = Arc::new(Barrier::new(2));
    let worker = {
        let (done, start) = (done.clone(), start.clone());
        thread::spawn(move || {
            start.wait();
            let begin = Instant::now();
            let cert = read_buf(&mut issuer, CommandId::GET_RSA_EK_CERT, CERT_BUF_LEN);
            done.store(true, Ordering::SeqCst);
            (cert, begin.elapsed())
        })
    };

    // RSA key generation dominates the certificate request; no single
    // query may wait for it
    start.wait();
    let mut slowest = Duration::ZERO;
    while !done.load(Ordering::SeqCst) {
        let begin = Instant::now();
        let (mode, _, _) = query_mode(&mut session).unwrap();
        slowest = slowest.max(begin.elapsed());
        assert_eq!(mode, ProvisioningMode::ONLINE_VALUE);
        thread::sleep(Duration::from_millis(1));
    }

    let (cert, issue_time) = worker.join().unwrap();
    assert!(!cert.unwrap().is_empty());
    assert!(
        slowest < issue_time / 2,
        "query took {slowest:?} while issuing took {issue_time:?}"
    );
}
