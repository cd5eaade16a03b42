// Licensed under the Apache-2.0 license

use crate::HelperContext;
use ftpm_helper_api::{HelperParams, ParamType, VERSION_MAJOR, VERSION_MINOR};
use ftpm_helper_error::HelperResult;

const MEMREF_OUT_ONLY: [ParamType; 4] = [
    ParamType::MemrefOutput,
    ParamType::None,
    ParamType::None,
    ParamType::None,
];

pub struct QuerySnCmd;
impl QuerySnCmd {
    pub(crate) fn execute(ctx: &mut HelperContext, params: &mut HelperParams) -> HelperResult<()> {
        params.expect_types(MEMREF_OUT_ONLY)?;
        let identity = ctx.custodian.identity();
        params.memref_out(0)?.write(&identity.serial_number)
    }
}

pub struct QueryEcidCmd;
impl QueryEcidCmd {
    pub(crate) fn execute(ctx: &mut HelperContext, params: &mut HelperParams) -> HelperResult<()> {
        params.expect_types(MEMREF_OUT_ONLY)?;
        let identity = ctx.custodian.identity();
        params.memref_out(0)?.write(&identity.ecid)
    }
}

pub struct QueryProvModeCmd;
impl QueryProvModeCmd {
    /// Reports `Unknown` until the first ping decides the mode.
    pub(crate) fn execute(ctx: &mut HelperContext, params: &mut HelperParams) -> HelperResult<()> {
        params.expect_types([
            ParamType::ValueOutput,
            ParamType::ValueOutput,
            ParamType::ValueOutput,
            ParamType::None,
        ])?;
        params.value_out(0)?.a = ctx.mode()?.into();
        params.value_out(1)?.a = VERSION_MAJOR;
        params.value_out(2)?.a = VERSION_MINOR;
        Ok(())
    }
}
