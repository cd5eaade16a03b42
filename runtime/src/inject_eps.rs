// Licensed under the Apache-2.0 license

use crate::HelperContext;
use ftpm_helper_api::{HelperParams, ParamType};
use ftpm_helper_error::HelperResult;

pub struct InjectEpsCmd;
impl InjectEpsCmd {
    pub(crate) fn execute(ctx: &mut HelperContext, params: &mut HelperParams) -> HelperResult<()> {
        params.expect_types([
            ParamType::MemrefInput,
            ParamType::None,
            ParamType::None,
            ParamType::None,
        ])?;
        ctx.custodian.inject_seed(params.memref_in(0)?)
    }
}
