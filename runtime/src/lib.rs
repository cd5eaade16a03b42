/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the fTPM helper runtime and the command
    dispatch logic.

--*/

mod certs;
pub mod config;
mod context;
mod csr;
mod inject_eps;
mod keys;
mod ping;
mod query;
pub mod seed;
mod state;
mod x509;

pub use certs::{get_certificate, GetCertCmd};
pub use config::{FuseSetting, HelperConfig};
pub use context::HelperContext;
pub use csr::{get_csr, sign_digest, GetEkCsrCmd, SignEkCsrCmd};
pub use inject_eps::InjectEpsCmd;
pub use ping::PingNsCmd;
pub use query::{QueryEcidCmd, QueryProvModeCmd, QuerySnCmd};
pub use seed::{SeedCustodian, EPS_OBJECT_ID};
pub use state::ProvisioningState;

use ftpm_helper_api::{CommandId, HelperCmd, HelperParams};
use ftpm_helper_error::{tee_status, HelperResult};

/// Handles one command invocation
///
/// # Arguments
///
/// * `ctx` - Session context
/// * `cmd_id` - Command identifier
/// * `params` - The four parameter slots
///
/// # Returns
///
/// * `HelperResult<()>` - Output is written into `params`
pub fn handle_command(
    ctx: &mut HelperContext,
    cmd_id: CommandId,
    params: &mut HelperParams,
) -> HelperResult<()> {
    let cmd = HelperCmd::try_from(cmd_id).inspect_err(|_| {
        log::warn!("[ftpm] Unsupported command={:?}", cmd_id);
    })?;
    log::info!(
        "[ftpm] Received command=0x{:08x} ({}), param_types=0x{:04x}",
        cmd_id.0,
        cmd.name(),
        params.param_types()
    );

    let result = match cmd {
        HelperCmd::PingNs => PingNsCmd::execute(ctx, params),
        HelperCmd::QuerySn => QuerySnCmd::execute(ctx, params),
        HelperCmd::QueryEcid => QueryEcidCmd::execute(ctx, params),
        HelperCmd::QueryProvMode => QueryProvModeCmd::execute(ctx, params),
        HelperCmd::GetCert(kind) => GetCertCmd::execute(ctx, kind, params),
        HelperCmd::GetCsr(kind) => GetEkCsrCmd::execute(ctx, kind, params),
        HelperCmd::SignEkCsr => SignEkCsrCmd::execute(ctx, params),
        HelperCmd::InjectEps => InjectEpsCmd::execute(ctx, params),
    };

    if let Err(e) = result {
        log::warn!("[ftpm] {} failed: {}", cmd.name(), e);
    }
    result
}

/// Entry point used by the TEE glue; returns the TEE status word.
pub fn invoke_command(ctx: &mut HelperContext, cmd_id: u32, params: &mut HelperParams) -> u32 {
    tee_status(&handle_command(ctx, CommandId::from(cmd_id), params))
}
