// Licensed under the Apache-2.0 license

use crate::HelperContext;
use ftpm_helper_api::{HelperParams, NsState, ParamType};
use ftpm_helper_error::HelperResult;

pub struct PingNsCmd;
impl PingNsCmd {
    /// Record that the normal world is ready. The first ping of the service
    /// instance also decides the provisioning mode.
    pub(crate) fn execute(ctx: &mut HelperContext, params: &mut HelperParams) -> HelperResult<()> {
        params.expect_types([
            ParamType::ValueOutput,
            ParamType::None,
            ParamType::None,
            ParamType::None,
        ])?;

        if !ctx.state.is_ready() {
            ctx.custodian.ensure_seed()?;
            ctx.state.mark_ready();
            log::info!("[ftpm] Normal world ready");
        } else {
            log::debug!("[ftpm] Normal world already ready");
        }

        params.value_out(0)?.a = NsState::Ready.into();
        Ok(())
    }
}
