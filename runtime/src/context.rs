/*++

Licensed under the Apache-2.0 license.

File Name:

    context.rs

Abstract:

    Per-session helper state passed to every command handler.

--*/

use crate::certs::CertCache;
use crate::config::HelperConfig;
use crate::keys::KeyCache;
use crate::seed::SeedCustodian;
use crate::state::ProvisioningState;
use ftpm_helper_api::ProvisioningMode;
use ftpm_helper_drivers::{DeviceIdentitySource, RootOfTrust, SecureStorage};
use ftpm_helper_error::{HelperError, HelperResult};
use std::sync::Arc;

pub struct HelperContext {
    pub config: HelperConfig,

    /// Shared with every other context of the same service instance
    pub custodian: Arc<SeedCustodian>,

    pub state: ProvisioningState,

    pub(crate) keys: KeyCache,

    pub(crate) certs: CertCache,
}

impl core::fmt::Debug for HelperContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HelperContext")
            .field("custodian", &self.custodian)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl HelperContext {
    pub fn new(config: HelperConfig, custodian: Arc<SeedCustodian>) -> Self {
        Self {
            config,
            custodian,
            state: ProvisioningState::default(),
            keys: KeyCache::default(),
            certs: CertCache::default(),
        }
    }

    /// Context with its own custodian over the given platform.
    pub fn with_platform(
        config: HelperConfig,
        identity: Arc<dyn DeviceIdentitySource>,
        root_of_trust: Arc<dyn RootOfTrust>,
        storage: Arc<dyn SecureStorage>,
    ) -> Self {
        let custodian = SeedCustodian::new(identity, root_of_trust, storage);
        Self::new(config, Arc::new(custodian))
    }

    pub fn mode(&self) -> HelperResult<ProvisioningMode> {
        self.custodian.mode()
    }

    /// Gate for commands that need the provisioning mode decided.
    pub(crate) fn require_mode(&self) -> HelperResult<ProvisioningMode> {
        match self.custodian.mode()? {
            ProvisioningMode::Unknown => Err(HelperError::NOT_INITIALIZED),
            mode => Ok(mode),
        }
    }
}
