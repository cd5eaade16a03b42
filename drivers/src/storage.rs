/*++

Licensed under the Apache-2.0 license.

File Name:

    storage.rs

Abstract:

    Secure persistent object storage and an in-memory implementation.

--*/

use ftpm_helper_error::{HelperError, HelperResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use zeroize::Zeroizing;

pub trait SecureStorage: Send + Sync {
    /// Read a whole object; `None` if it does not exist.
    fn read(&self, id: &str) -> HelperResult<Option<Zeroizing<Vec<u8>>>>;

    /// Create or replace an object atomically.
    fn write(&self, id: &str, data: &[u8]) -> HelperResult<()>;
}

#[derive(Default)]
struct MemStorageInner {
    objects: HashMap<String, Zeroizing<Vec<u8>>>,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-memory storage. Clones share the same objects, so a clone outlives a
/// helper instance the way flash outlives a reboot.
#[derive(Clone, Default)]
pub struct MemStorage {
    inner: Arc<Mutex<MemStorageInner>>,
}

impl core::fmt::Debug for MemStorage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let objects = self.lock().map(|s| s.objects.len()).unwrap_or(0);
        f.debug_struct("MemStorage")
            .field("objects", &objects)
            .finish()
    }
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> HelperResult<MutexGuard<'_, MemStorageInner>> {
        self.inner.lock().map_err(|_| HelperError::STORAGE_FAILURE)
    }

    /// Make subsequent reads fail with `STORAGE_FAILURE`.
    pub fn set_fail_reads(&self, fail: bool) {
        if let Ok(mut s) = self.lock() {
            s.fail_reads = fail;
        }
    }

    /// Make subsequent writes fail with `STORAGE_FAILURE`.
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut s) = self.lock() {
            s.fail_writes = fail;
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock()
            .map(|s| s.objects.contains_key(id))
            .unwrap_or(false)
    }

    /// Remove every object.
    pub fn wipe(&self) {
        if let Ok(mut s) = self.lock() {
            s.objects.clear();
        }
    }
}

impl SecureStorage for MemStorage {
    fn read(&self, id: &str) -> HelperResult<Option<Zeroizing<Vec<u8>>>> {
        let s = self.lock()?;
        if s.fail_reads {
            return Err(HelperError::STORAGE_FAILURE);
        }
        Ok(s.objects.get(id).cloned())
    }

    fn write(&self, id: &str, data: &[u8]) -> HelperResult<()> {
        let mut s = self.lock()?;
        if s.fail_writes {
            log::error!("[storage] Write of {} failed", id);
            return Err(HelperError::STORAGE_FAILURE);
        }
        log::debug!("[storage] Wrote {} ({} bytes)", id, data.len());
        s.objects
            .insert(id.to_string(), Zeroizing::new(data.to_vec()));
        Ok(())
    }

}
