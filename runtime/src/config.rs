/*++

Licensed under the Apache-2.0 license.

File Name:

    config.rs

Abstract:

    Helper configuration: provisioning fuse, firmware measurement and the
    organization placed in certificate subjects.

--*/

use ftpm_helper_drivers::{DeviceIdentity, FuseBank, ProvisioningFuse};
use ftpm_helper_error::{HelperError, HelperResult};
use serde::Deserialize;

/// Provisioning fuse as written in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuseSetting {
    #[default]
    Unfused,
    Offline,
    Online,
}

impl From<FuseSetting> for ProvisioningFuse {
    fn from(setting: FuseSetting) -> Self {
        match setting {
            FuseSetting::Unfused => ProvisioningFuse::Unfused,
            FuseSetting::Offline => ProvisioningFuse::Offline,
            FuseSetting::Online => ProvisioningFuse::Online,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HelperConfig {
    pub provisioning_fuse: FuseSetting,

    /// SHA-256 of the running firmware, hex encoded in the file
    #[serde(with = "hex")]
    pub firmware_measurement: [u8; 32],

    pub organization: String,

    pub tpm_manufacturer: String,
    pub tpm_model: String,
    pub tpm_version: String,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            provisioning_fuse: FuseSetting::default(),
            firmware_measurement: [0u8; 32],
            organization: "NVIDIA".into(),
            tpm_manufacturer: "id:4E564441".into(),
            tpm_model: "fTPM".into(),
            tpm_version: "id:00020000".into(),
        }
    }
}

impl HelperConfig {
    pub fn from_toml_str(s: &str) -> HelperResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| {
            log::error!("[ftpm] Invalid helper configuration: {}", e.message());
            HelperError::CONFIG_INVALID
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> HelperResult<()> {
        // Organization and TPM strings end up in DER strings with no length
        // ceiling of their own; keep certificates inside the 2048 byte buffer.
        let fields = [
            &self.organization,
            &self.tpm_manufacturer,
            &self.tpm_model,
            &self.tpm_version,
        ];
        if fields.iter().any(|f| f.is_empty() || f.len() > 64) {
            log::error!("[ftpm] Configuration strings must be 1..=64 bytes");
            return Err(HelperError::CONFIG_INVALID);
        }
        Ok(())
    }

    /// Fuse bank for a software device with the configured fuse.
    pub fn fuse_bank(&self, identity: DeviceIdentity) -> FuseBank {
        FuseBank::new(identity, self.provisioning_fuse.into())
    }
}
