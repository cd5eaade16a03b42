/*++

Licensed under the Apache-2.0 license.

File Name:

    fuse_bank.rs

Abstract:

    File contains API for the Fuse Bank holding the device identity and the
    provisioning mode fuse.

--*/

use ftpm_helper_api::{ECID_LEN, SN_LEN};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Immutable per-device identifiers. The byte layout (`serial || ecid`) is
/// also the context used when binding derived keys to the device.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct DeviceIdentity {
    pub serial_number: [u8; SN_LEN],
    pub ecid: [u8; ECID_LEN],
}

impl DeviceIdentity {
    /// Uppercase hex, as placed in certificate subjects
    pub fn serial_hex(&self) -> String {
        hex::encode_upper(self.serial_number)
    }

    pub fn ecid_hex(&self) -> String {
        hex::encode_upper(self.ecid)
    }
}

/// Provisioning mode selected at manufacturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProvisioningFuse {
    /// Not blown; the mode follows whatever seed has been persisted.
    #[default]
    Unfused,
    Offline,
    Online,
}

pub trait DeviceIdentitySource: Send + Sync {
    fn identity(&self) -> DeviceIdentity;

    fn provisioning_fuse(&self) -> ProvisioningFuse;
}

#[derive(Debug, Clone)]
pub struct FuseBank {
    identity: DeviceIdentity,
    fuse: ProvisioningFuse,
}

impl FuseBank {
    pub fn new(identity: DeviceIdentity, fuse: ProvisioningFuse) -> Self {
        Self { identity, fuse }
    }
}

impl DeviceIdentitySource for FuseBank {
    /// Get the serial number and ECID.
    fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    /// Get the provisioning mode fuse.
    fn provisioning_fuse(&self) -> ProvisioningFuse {
        self.fuse
    }
}
