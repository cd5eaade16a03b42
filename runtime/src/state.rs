// Licensed under the Apache-2.0 license

use ftpm_helper_api::NsState;

/// Per-context readiness of the normal world. Moves to `Ready` once and
/// never reverts.
#[derive(Debug)]
pub struct ProvisioningState {
    ns_state: NsState,
}

impl Default for ProvisioningState {
    fn default() -> Self {
        Self {
            ns_state: NsState::NotReady,
        }
    }
}

impl ProvisioningState {
    pub fn ns_state(&self) -> NsState {
        self.ns_state
    }

    pub fn is_ready(&self) -> bool {
        self.ns_state == NsState::Ready
    }

    /// Returns `true` on the transition, `false` if already ready.
    pub fn mark_ready(&mut self) -> bool {
        let was_ready = self.is_ready();
        self.ns_state = NsState::Ready;
        !was_ready
    }
}
