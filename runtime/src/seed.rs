/*++

Licensed under the Apache-2.0 license.

File Name:

    seed.rs

Abstract:

    Endorsement primary seed custodian. Decides the provisioning mode,
    derives or accepts the EPS and keeps it out of reach of everything but
    key derivation.

--*/

use ftpm_helper_api::{ProvisioningMode, EPS_LEN};
use ftpm_helper_drivers::{
    hmac_kdf, DeviceIdentity, DeviceIdentitySource, Okm, ProvisioningFuse, RootOfTrust,
    SecureStorage,
};
use ftpm_helper_error::{HelperError, HelperResult};
use std::sync::{Arc, Mutex, MutexGuard};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Secure storage object holding the seed record
pub const EPS_OBJECT_ID: &str = "ftpm_eps";

/// KDF label for the offline EPS
const OFFLINE_EPS_LABEL: &[u8] = b"ftpm_eps";

const EPS_RECORD_MAGIC: [u8; 4] = *b"EPS1";

/// The endorsement primary seed. Only borrowed by key derivation.
#[derive(ZeroizeOnDrop)]
pub struct Eps {
    bytes: Zeroizing<[u8; EPS_LEN]>,
}

impl Eps {
    pub(crate) fn as_bytes(&self) -> &[u8; EPS_LEN] {
        &self.bytes
    }
}

impl core::fmt::Debug for Eps {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Eps(<redacted>)")
    }
}

/// Where a persisted seed came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeedOrigin {
    Offline,
    Online,
}

impl SeedOrigin {
    const OFFLINE: u8 = 0x01;
    const ONLINE: u8 = 0x02;

    fn mode(self) -> ProvisioningMode {
        match self {
            SeedOrigin::Offline => ProvisioningMode::Offline,
            SeedOrigin::Online => ProvisioningMode::Online,
        }
    }
}

/// Persisted form: `magic || origin || seed`
#[repr(C)]
#[derive(IntoBytes, FromBytes, Immutable, KnownLayout, Zeroize, ZeroizeOnDrop)]
struct EpsRecord {
    magic: [u8; 4],
    origin: u8,
    seed: [u8; EPS_LEN],
}

impl EpsRecord {
    fn new(origin: SeedOrigin, seed: &[u8; EPS_LEN]) -> Self {
        Self {
            magic: EPS_RECORD_MAGIC,
            origin: match origin {
                SeedOrigin::Offline => SeedOrigin::OFFLINE,
                SeedOrigin::Online => SeedOrigin::ONLINE,
            },
            seed: *seed,
        }
    }

    fn parse(bytes: &[u8]) -> HelperResult<(SeedOrigin, Eps)> {
        let record = Self::read_from_bytes(bytes).map_err(|_| HelperError::CORRUPT_SEED_RECORD)?;
        if record.magic != EPS_RECORD_MAGIC {
            return Err(HelperError::CORRUPT_SEED_RECORD);
        }
        let origin = match record.origin {
            SeedOrigin::OFFLINE => SeedOrigin::Offline,
            SeedOrigin::ONLINE => SeedOrigin::Online,
            _ => return Err(HelperError::CORRUPT_SEED_RECORD),
        };
        Ok((
            origin,
            Eps {
                bytes: Zeroizing::new(record.seed),
            },
        ))
    }
}

#[derive(Default)]
struct CustodianState {
    mode: Option<ProvisioningMode>,
    eps: Option<Eps>,
}

/// Owner of the EPS. Shared by every helper context of one service
/// instance; seed changes happen under a single lock.
pub struct SeedCustodian {
    identity: Arc<dyn DeviceIdentitySource>,
    root_of_trust: Arc<dyn RootOfTrust>,
    storage: Arc<dyn SecureStorage>,
    state: Mutex<CustodianState>,
}

impl core::fmt::Debug for SeedCustodian {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SeedCustodian")
            .field("mode", &self.mode())
            .field("provisioned", &self.is_provisioned())
            .finish_non_exhaustive()
    }
}

impl SeedCustodian {
    pub fn new(
        identity: Arc<dyn DeviceIdentitySource>,
        root_of_trust: Arc<dyn RootOfTrust>,
        storage: Arc<dyn SecureStorage>,
    ) -> Self {
        Self {
            identity,
            root_of_trust,
            storage,
            state: Mutex::new(CustodianState::default()),
        }
    }

    fn lock(&self) -> HelperResult<MutexGuard<'_, CustodianState>> {
        self.state.lock().map_err(|_| {
            log::error!("[ftpm] Seed custodian lock poisoned");
            HelperError::INTERNAL
        })
    }

    pub fn identity(&self) -> DeviceIdentity {
        self.identity.identity()
    }

    pub(crate) fn root_of_trust(&self) -> &dyn RootOfTrust {
        self.root_of_trust.as_ref()
    }

    /// The provisioning mode, `Unknown` until the first bootstrap.
    pub fn mode(&self) -> HelperResult<ProvisioningMode> {
        Ok(self.lock()?.mode.unwrap_or(ProvisioningMode::Unknown))
    }

    pub fn is_provisioned(&self) -> HelperResult<bool> {
        Ok(self.lock()?.eps.is_some())
    }

    /// Decide the provisioning mode and load or derive the seed.
    ///
    /// Runs once; later calls return the mode decided by the first
    /// successful call. A failure leaves the custodian untouched.
    pub fn ensure_seed(&self) -> HelperResult<ProvisioningMode> {
        let mut state = self.lock()?;
        if let Some(mode) = state.mode {
            return Ok(mode);
        }

        let fuse = self.identity.provisioning_fuse();
        let persisted = match self.storage.read(EPS_OBJECT_ID)? {
            Some(bytes) => Some(EpsRecord::parse(&bytes).inspect_err(|_| {
                log::error!("[ftpm] Persisted seed record is corrupt");
            })?),
            None => None,
        };

        let (mode, eps) = match (fuse, persisted) {
            (ProvisioningFuse::Unfused, Some((origin, eps))) => (origin.mode(), Some(eps)),
            (ProvisioningFuse::Unfused, None) => (ProvisioningMode::Online, None),
            (ProvisioningFuse::Offline, Some((SeedOrigin::Offline, eps))) => {
                (ProvisioningMode::Offline, Some(eps))
            }
            (ProvisioningFuse::Offline, persisted) => {
                if persisted.is_some() {
                    log::warn!("[ftpm] Ignoring online seed record on an offline fused device");
                }
                let eps = self.derive_offline_eps()?;
                self.persist(SeedOrigin::Offline, &eps)?;
                log::info!("[ftpm] Offline EPS derived and persisted");
                (ProvisioningMode::Offline, Some(eps))
            }
            (ProvisioningFuse::Online, Some((SeedOrigin::Online, eps))) => {
                (ProvisioningMode::Online, Some(eps))
            }
            (ProvisioningFuse::Online, persisted) => {
                if persisted.is_some() {
                    log::warn!("[ftpm] Ignoring offline seed record on an online fused device");
                }
                (ProvisioningMode::Online, None)
            }
        };

        log::info!(
            "[ftpm] Provisioning mode {:?} (fuse {:?}, seed {})",
            mode,
            fuse,
            if eps.is_some() { "present" } else { "absent" }
        );
        state.mode = Some(mode);
        state.eps = eps;
        Ok(mode)
    }

    /// Accept the EPS from the provisioning authority, exactly once.
    pub fn inject_seed(&self, seed: &[u8]) -> HelperResult<()> {
        let mut state = self.lock()?;
        match state.mode {
            None => return Err(HelperError::NOT_INITIALIZED),
            Some(ProvisioningMode::Offline) => return Err(HelperError::INVALID_MODE),
            Some(_) => {}
        }
        if state.eps.is_some() {
            return Err(HelperError::ALREADY_PROVISIONED);
        }

        let bytes: &[u8; EPS_LEN] = seed
            .try_into()
            .map_err(|_| HelperError::INVALID_PARAMETERS)?;
        if bytes.iter().all(|&b| b == 0) {
            return Err(HelperError::INVALID_PARAMETERS);
        }

        let eps = Eps {
            bytes: Zeroizing::new(*bytes),
        };
        self.persist(SeedOrigin::Online, &eps)?;
        state.eps = Some(eps);
        log::info!("[ftpm] EPS injected and persisted");
        Ok(())
    }

    /// Run `f` with the seed, under the custodian lock.
    ///
    /// Fails `NOT_INITIALIZED` before the mode is decided and
    /// `SEED_NOT_PROVISIONED` while no seed exists.
    pub(crate) fn with_seed<R>(&self, f: impl FnOnce(&Eps) -> HelperResult<R>) -> HelperResult<R> {
        let state = self.lock()?;
        if state.mode.is_none() {
            return Err(HelperError::NOT_INITIALIZED);
        }
        let eps = state.eps.as_ref().ok_or(HelperError::SEED_NOT_PROVISIONED)?;
        f(eps)
    }

    /// Derive key material from the seed.
    ///
    /// Only the KDF runs under the lock; key generation from the returned
    /// material happens after it is released.
    pub(crate) fn derive_from_seed(&self, label: &[u8], context: &[u8]) -> HelperResult<Okm<64>> {
        self.with_seed(|eps| hmac_kdf::<64>(eps.as_bytes(), label, Some(context)))
    }

    /// Fails like [`Self::with_seed`] when no seed is available.
    pub(crate) fn require_seed(&self) -> HelperResult<()> {
        self.with_seed(|_| Ok(()))
    }

    fn derive_offline_eps(&self) -> HelperResult<Eps> {
        let identity = self.identity.identity();
        let okm = self
            .root_of_trust
            .derive(OFFLINE_EPS_LABEL, identity.as_bytes())?;
        Ok(Eps {
            bytes: Zeroizing::new(*okm.as_array()),
        })
    }

    fn persist(&self, origin: SeedOrigin, eps: &Eps) -> HelperResult<()> {
        let record = EpsRecord::new(origin, eps.as_bytes());
        self.storage
            .write(EPS_OBJECT_ID, record.as_bytes())
            .inspect_err(|e| log::error!("[ftpm] Failed to persist seed record: {e}"))
    }
}
