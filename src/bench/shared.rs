//! Counter shared between worker processes through a file-backed mapping
//!
//! Layout: a spin lock word at offset 0 and the counter at offset 8.

use crate::error::{AppError, Result};
use memmap2::{MmapMut, MmapOptions};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use uuid::Uuid;

const LOCK_OFFSET: usize = 0;
const COUNTER_OFFSET: usize = 8;
const MAPPING_LEN: u64 = 16;

/// Handle on the shared lock and counter
pub struct SharedCounter {
    map: MmapMut,
    path: PathBuf,
    owner: bool,
}

impl SharedCounter {
    /// Create a fresh zeroed mapping in the temp directory. The file is
    /// removed when this handle is dropped.
    pub fn create() -> Result<Self> {
        let path = std::env::temp_dir().join(format!("scalab-shm-{}", Uuid::new_v4()));
        Self::create_at(path)
    }

    pub fn create_at(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| AppError::benchmark(format!("Failed to create {}: {}", path.display(), e)))?;
        file.set_len(MAPPING_LEN)?;

        let map = unsafe { MmapOptions::new().len(MAPPING_LEN as usize).map_mut(&file) }
            .map_err(|e| AppError::benchmark(format!("Failed to map {}: {}", path.display(), e)))?;

        Ok(Self { map, path, owner: true })
    }

    /// Attach to a mapping created by the parent process
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| AppError::benchmark(format!("Failed to open {}: {}", path.display(), e)))?;

        let len = file.metadata()?.len();
        if len < MAPPING_LEN {
            return Err(AppError::benchmark(format!(
                "Shared counter file {} is {} bytes, expected {}",
                path.display(),
                len,
                MAPPING_LEN
            )));
        }

        let map = unsafe { MmapOptions::new().len(MAPPING_LEN as usize).map_mut(&file) }
            .map_err(|e| AppError::benchmark(format!("Failed to map {}: {}", path.display(), e)))?;

        Ok(Self {
            map,
            path: path.to_path_buf(),
            owner: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_word(&self) -> &AtomicU32 {
        // Mapping is page aligned and at least MAPPING_LEN bytes long
        unsafe { &*(self.map.as_ptr().add(LOCK_OFFSET) as *const AtomicU32) }
    }

    fn counter(&self) -> &AtomicU64 {
        unsafe { &*(self.map.as_ptr().add(COUNTER_OFFSET) as *const AtomicU64) }
    }

    fn lock(&self) {
        let word = self.lock_word();
        while word
            .compare_exchange_weak(0, 1, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            while word.load(Ordering::Relaxed) != 0 {
                std::hint::spin_loop();
            }
        }
    }

    fn unlock(&self) {
        self.lock_word().store(0, Ordering::Release);
    }

    /// Increment under the shared lock
    pub fn increment_locked(&self) {
        self.lock();
        let counter = self.counter();
        counter.store(counter.load(Ordering::Relaxed) + 1, Ordering::Relaxed);
        self.unlock();
    }

    /// Unguarded read-modify-write; concurrent callers lose updates
    pub fn increment_racy(&self) {
        let counter = self.counter();
        let value = counter.load(Ordering::Relaxed);
        counter.store(value + 1, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.counter().load(Ordering::SeqCst)
    }
}

impl Drop for SharedCounter {
    fn drop(&mut self) {
        if self.owner {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
