// Licensed under the Apache-2.0 license

use crate::common::*;
use ftpm_helper_api::{CommandId, HelperParams, Memref, Param, Value};
use ftpm_helper_error::{tee, HelperError};
use ftpm_helper_runtime::{handle_command, invoke_command, FuseSetting};

const ALL_CMDS: [CommandId; 12] = [
    CommandId::PING_NS,
    CommandId::QUERY_SN,
    CommandId::QUERY_ECID,
    CommandId::QUERY_PROV_MODE,
    CommandId::GET_RSA_EK_CERT,
    CommandId::GET_EC_EK_CERT,
    CommandId::GET_SID_CERT,
    CommandId::GET_FW_ID_CERT,
    CommandId::GET_RSA_EK_CSR,
    CommandId::GET_EC_EK_CSR,
    CommandId::SIGN_EK_CSR,
    CommandId::INJECT_EPS,
];

#[test]
fn test_all_none_rejected() {
    let (_device, mut ctx) = provisioned_online();
    for cmd in ALL_CMDS {
        let mut params = HelperParams::default();
        assert_eq!(
            handle_command(&mut ctx, cmd, &mut params),
            Err(HelperError::INVALID_PARAMETERS),
            "{cmd:?}"
        );
    }
}

#[test]
fn test_unused_slot_must_be_none() {
    let (_device, mut ctx) = provisioned_online();
    for cmd in ALL_CMDS {
        let mut out = vec![0u8; 2048];
        let mut sig = [0u8; 80];
        let mut params = HelperParams::new([
            Param::MemrefOutput(Memref::new(&mut out)),
            Param::MemrefOutput(Memref::new(&mut sig)),
            Param::ValueOutput(Value::default()),
            Param::ValueInput(Value::default()),
        ]);
        assert_eq!(
            invoke_command(&mut ctx, cmd.into(), &mut params),
            tee::TEE_ERROR_BAD_PARAMETERS,
            "{cmd:?}"
        );
    }
}

#[test]
fn test_bad_params_do_not_touch_state() {
    let device = TestDevice::new(FuseSetting::Online);
    let mut ctx = device.context();
    ping(&mut ctx).unwrap();

    let mut params = HelperParams::new([
        Param::MemrefInput(&TEST_EPS),
        Param::ValueInput(Value::default()),
        Param::None,
        Param::None,
    ]);
    assert_eq!(
        handle_command(&mut ctx, CommandId::INJECT_EPS, &mut params),
        Err(HelperError::INVALID_PARAMETERS)
    );
    assert_eq!(ctx.custodian.is_provisioned(), Ok(false));
}

#[test]
fn test_output_memref_for_input() {
    let (_device, mut ctx) = provisioned_online();
    let mut digest = [0x11u8; 32];
    let mut out = [0u8; 80];
    let mut params = HelperParams::new([
        Param::MemrefOutput(Memref::new(&mut digest)),
        Param::MemrefOutput(Memref::new(&mut out)),
        Param::None,
        Param::None,
    ]);
    assert_eq!(
        handle_command(&mut ctx, CommandId::SIGN_EK_CSR, &mut params),
        Err(HelperError::INVALID_PARAMETERS)
    );
}
