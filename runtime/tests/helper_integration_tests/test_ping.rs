// Licensed under the Apache-2.0 license

use crate::common::*;
use ftpm_helper_api::{CommandId, HelperParams, NsState, Param, ProvisioningMode, Value};
use ftpm_helper_error::{tee, HelperError};
use ftpm_helper_runtime::{handle_command, invoke_command, FuseSetting};

#[test]
fn test_ping_twice() {
    let device = TestDevice::new(FuseSetting::Offline);
    let mut ctx = device.context();
    assert!(!ctx.state.is_ready());

    assert_eq!(ping(&mut ctx), Ok(NsState::READY_VALUE));
    assert_eq!(ping(&mut ctx), Ok(NsState::READY_VALUE));
    assert_eq!(ctx.state.ns_state(), NsState::Ready);
    assert_eq!(ctx.mode(), Ok(ProvisioningMode::Offline));
}

#[test]
fn test_ping_via_invoke_command() {
    let device = TestDevice::new(FuseSetting::Online);
    let mut ctx = device.context();
    let mut params = HelperParams::new([
        Param::ValueOutput(Value::default()),
        Param::None,
        Param::None,
        Param::None,
    ]);
    assert_eq!(
        invoke_command(&mut ctx, CommandId::PING_NS.into(), &mut params),
        tee::TEE_SUCCESS
    );
    assert_eq!(params.value(0).unwrap().a, NsState::READY_VALUE);
}

#[test]
fn test_ping_bad_params_leaves_state() {
    let device = TestDevice::new(FuseSetting::Offline);
    let mut ctx = device.context();
    let mut params = HelperParams::new([
        Param::ValueInput(Value::default()),
        Param::None,
        Param::None,
        Param::None,
    ]);
    assert_eq!(
        handle_command(&mut ctx, CommandId::PING_NS, &mut params),
        Err(HelperError::INVALID_PARAMETERS)
    );
    assert!(!ctx.state.is_ready());
    assert_eq!(ctx.mode(), Ok(ProvisioningMode::Unknown));
    assert!(!device.storage.contains(ftpm_helper_runtime::EPS_OBJECT_ID));
}

#[test]
fn test_ping_retry_after_storage_failure() {
    let device = TestDevice::new(FuseSetting::Offline);
    let mut ctx = device.context();

    device.storage.set_fail_writes(true);
    assert_eq!(ping(&mut ctx), Err(HelperError::STORAGE_FAILURE));
    assert!(!ctx.state.is_ready());
    assert_eq!(ctx.mode(), Ok(ProvisioningMode::Unknown));

    device.storage.set_fail_writes(false);
    assert_eq!(ping(&mut ctx), Ok(NsState::READY_VALUE));
    assert_eq!(ctx.mode(), Ok(ProvisioningMode::Offline));
}

#[test]
fn test_mode_is_shared_by_sessions() {
    let device = TestDevice::new(FuseSetting::Offline);
    let mut first = device.context();
    let second = device.context();
    ping(&mut first).unwrap();

    // The mode belongs to the service instance, readiness to the session
    assert_eq!(second.mode(), Ok(ProvisioningMode::Offline));
    assert!(!second.state.is_ready());
}
