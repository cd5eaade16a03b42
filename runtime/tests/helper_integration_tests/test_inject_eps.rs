// Licensed under the Apache-2.0 license

use crate::common::*;
use ftpm_helper_api::{CommandId, HelperParams, Param, ProvisioningMode, CERT_BUF_LEN, EPS_LEN};
use ftpm_helper_error::{tee, HelperError};
use ftpm_helper_runtime::{invoke_command, FuseSetting, EPS_OBJECT_ID};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_inject_before_ping() {
    let device = TestDevice::new(FuseSetting::Online);
    let mut ctx = device.context();
    assert_eq!(
        inject_eps(&mut ctx, &TEST_EPS),
        Err(HelperError::NOT_INITIALIZED)
    );
    assert!(!device.storage.contains(EPS_OBJECT_ID));
}

#[test]
fn test_inject_once() {
    let (device, mut ctx) = provisioned_online();
    assert!(device.storage.contains(EPS_OBJECT_ID));
    let cert = read_buf(&mut ctx, CommandId::GET_EC_EK_CERT, CERT_BUF_LEN).unwrap();

    assert_eq!(
        inject_eps(&mut ctx, &[0x99; EPS_LEN]),
        Err(HelperError::ALREADY_PROVISIONED)
    );
    // Checked before the input is looked at
    assert_eq!(
        inject_eps(&mut ctx, &[0x99; 3]),
        Err(HelperError::ALREADY_PROVISIONED)
    );

    // A new session derives the same certificate from the unchanged seed
    let mut other = device.context();
    assert_eq!(
        read_buf(&mut other, CommandId::GET_EC_EK_CERT, CERT_BUF_LEN).unwrap(),
        cert
    );
}

#[test]
fn test_inject_offline() {
    let device = TestDevice::new(FuseSetting::Offline);
    let mut ctx = device.context();
    ping(&mut ctx).unwrap();

    let mut params = HelperParams::new([
        Param::MemrefInput(&TEST_EPS),
        Param::None,
        Param::None,
        Param::None,
    ]);
    assert_eq!(
        invoke_command(&mut ctx, CommandId::INJECT_EPS.into(), &mut params),
        tee::TEE_ERROR_BAD_STATE
    );
}

#[test]
fn test_inject_rejects_bad_seed() {
    let device = TestDevice::new(FuseSetting::Online);
    let mut ctx = device.context();
    ping(&mut ctx).unwrap();

    assert_eq!(
        inject_eps(&mut ctx, &TEST_EPS[..EPS_LEN - 1]),
        Err(HelperError::INVALID_PARAMETERS)
    );
    assert_eq!(
        inject_eps(&mut ctx, &[0u8; EPS_LEN]),
        Err(HelperError::INVALID_PARAMETERS)
    );
    let mut long = TEST_EPS.to_vec();
    long.push(0x41);
    assert_eq!(
        inject_eps(&mut ctx, &long),
        Err(HelperError::INVALID_PARAMETERS)
    );
    assert_eq!(ctx.custodian.is_provisioned(), Ok(false));
    assert_eq!(inject_eps(&mut ctx, &TEST_EPS), Ok(()));
}

#[test]
fn test_storage_failure_keeps_online_unprovisioned() {
    let device = TestDevice::new(FuseSetting::Online);
    let mut ctx = device.context();
    ping(&mut ctx).unwrap();

    device.storage.set_fail_writes(true);
    assert_eq!(
        inject_eps(&mut ctx, &TEST_EPS),
        Err(HelperError::STORAGE_FAILURE)
    );
    assert_eq!(ctx.custodian.is_provisioned(), Ok(false));

    device.storage.set_fail_writes(false);
    assert_eq!(inject_eps(&mut ctx, &TEST_EPS), Ok(()));
}

#[test]
fn test_injected_seed_survives_reboot() {
    let (device, mut ctx) = provisioned_online();
    let cert = read_buf(&mut ctx, CommandId::GET_RSA_EK_CERT, CERT_BUF_LEN).unwrap();

    // An unfused device adopts the online record it finds
    let rebooted = TestDevice::with_storage(FuseSetting::Unfused, device.storage.clone());
    let mut ctx = rebooted.context();
    ping(&mut ctx).unwrap();
    assert_eq!(ctx.mode(), Ok(ProvisioningMode::Online));
    assert_eq!(
        inject_eps(&mut ctx, &TEST_EPS),
        Err(HelperError::ALREADY_PROVISIONED)
    );
    assert_eq!(
        read_buf(&mut ctx, CommandId::GET_RSA_EK_CERT, CERT_BUF_LEN).unwrap(),
        cert
    );
}

#[test]
fn test_factory_reset() {
    let (device, _) = provisioned_online();
    device.storage.wipe();

    let rebooted = device.reboot();
    let mut ctx = rebooted.context();
    ping(&mut ctx).unwrap();
    assert_eq!(ctx.custodian.is_provisioned(), Ok(false));
    assert_eq!(
        read_buf(&mut ctx, CommandId::GET_EC_EK_CERT, CERT_BUF_LEN),
        Err(HelperError::SEED_NOT_PROVISIONED)
    );
}

#[test]
fn test_concurrent_injection() {
    const SESSIONS: usize = 8;

    let device = TestDevice::new(FuseSetting::Online);
    let mut ctx = device.context();
    ping(&mut ctx).unwrap();

    let barrier = Arc::new(Barrier::new(SESSIONS));
    let handles: Vec<_> = (0..SESSIONS)
        .map(|i| {
            let mut ctx = device.context();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let seed = [i as u8 + 1; EPS_LEN];
                barrier.wait();
                inject_eps(&mut ctx, &seed)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| *r == Err(HelperError::ALREADY_PROVISIONED)));
}
