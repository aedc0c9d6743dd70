//! Two-tier response cache for GET requests.
//!
//! The cache is an explicit object handed to the executor, never a process
//! global. Memory and disk tiers are each bounded by a byte capacity and
//! evict oldest-first. Disk entries are keyed by the SHA-256 of the URL;
//! files left by an earlier cache over the same directory are adopted in
//! modification order and count against the disk capacity.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::CacheConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Reuse a cached entry unless the request itself says `no-cache`.
    UseProtocol,
    /// Always go to the network; refresh the cache with the result.
    ReloadIgnoringCache,
    ReturnCacheElseLoad,
    /// Cached entry or `CacheMiss`, never the network.
    ReturnCacheDontLoad,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub body: Bytes,
}

pub struct UrlCache {
    config: CacheConfig,
    state: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    memory: HashMap<String, CachedResponse>,
    memory_order: VecDeque<String>,
    memory_bytes: usize,
    /// File name and on-disk length, oldest first.
    disk_order: VecDeque<(String, u64)>,
    disk_bytes: u64,
}

impl UrlCache {
    pub fn new(config: CacheConfig) -> Self {
        let mut state = CacheState::default();
        if let Some(dir) = &config.disk_path {
            if let Err(e) = std::fs::create_dir_all(dir) {
                warn!("URL cache disk tier unavailable at {}: {}", dir.display(), e);
            }
            for (key, len) in scan_disk(dir) {
                state.disk_bytes += len;
                state.disk_order.push_back((key, len));
            }
            evict_disk(&mut state, dir, config.disk_capacity);
            debug!(
                "URL cache adopted {} disk entries ({} bytes) from {}",
                state.disk_order.len(),
                state.disk_bytes,
                dir.display()
            );
        }
        Self {
            config,
            state: Mutex::new(state),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn get(&self, url: &str) -> Option<CachedResponse> {
        let mut state = self.state.lock().ok()?;
        if let Some(hit) = state.memory.get(url) {
            debug!("URL cache memory hit: {}", url);
            return Some(hit.clone());
        }

        let dir = self.config.disk_path.as_deref()?;
        let hit = read_disk_entry(&disk_file(dir, url))?;
        debug!("URL cache disk hit: {}", url);
        self.insert_memory(&mut state, url, hit.clone());
        Some(hit)
    }

    pub fn put(&self, url: &str, response: CachedResponse) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if let Some(dir) = self.config.disk_path.as_deref() {
            self.insert_disk(&mut state, dir, url, &response);
        }
        self.insert_memory(&mut state, url, response);
    }

    pub fn remove_all(&self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if let Some(dir) = self.config.disk_path.as_deref() {
            for (key, _) in state.disk_order.drain(..) {
                let _ = std::fs::remove_file(dir.join(key));
            }
        }
        *state = CacheState::default();
    }

    pub fn memory_usage(&self) -> usize {
        self.state.lock().map(|s| s.memory_bytes).unwrap_or(0)
    }

    pub fn disk_usage(&self) -> u64 {
        self.state.lock().map(|s| s.disk_bytes).unwrap_or(0)
    }

    fn insert_memory(&self, state: &mut CacheState, url: &str, response: CachedResponse) {
        let size = response.body.len();
        if size > self.config.memory_capacity {
            return;
        }
        if let Some(old) = state.memory.remove(url) {
            state.memory_bytes -= old.body.len();
            state.memory_order.retain(|k| k != url);
        }
        while state.memory_bytes + size > self.config.memory_capacity {
            let Some(oldest) = state.memory_order.pop_front() else {
                break;
            };
            if let Some(evicted) = state.memory.remove(&oldest) {
                state.memory_bytes -= evicted.body.len();
            }
        }
        state.memory_bytes += size;
        state.memory_order.push_back(url.to_string());
        state.memory.insert(url.to_string(), response);
    }

    fn insert_disk(&self, state: &mut CacheState, dir: &Path, url: &str, response: &CachedResponse) {
        let mut contents = format!("{}\n", response.status).into_bytes();
        contents.extend_from_slice(&response.body);
        let size = contents.len() as u64;
        if size > self.config.disk_capacity {
            return;
        }

        let key = disk_key(url);
        if let Some(pos) = state.disk_order.iter().position(|(k, _)| *k == key) {
            if let Some((_, old)) = state.disk_order.remove(pos) {
                state.disk_bytes -= old;
            }
        }
        evict_disk(state, dir, self.config.disk_capacity - size);

        match std::fs::write(dir.join(&key), contents) {
            Ok(()) => {
                state.disk_bytes += size;
                state.disk_order.push_back((key, size));
            }
            Err(e) => warn!("URL cache write failed for {}: {}", url, e),
        }
    }
}

/// Drop oldest files until the tier holds at most `limit` bytes.
fn evict_disk(state: &mut CacheState, dir: &Path, limit: u64) {
    while state.disk_bytes > limit {
        let Some((oldest, size)) = state.disk_order.pop_front() else {
            break;
        };
        let _ = std::fs::remove_file(dir.join(oldest));
        state.disk_bytes -= size;
    }
}

fn disk_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

fn disk_file(dir: &Path, url: &str) -> PathBuf {
    dir.join(disk_key(url))
}

/// Cache files already in `dir`, oldest first. Anything not named like a
/// cache key is left alone.
fn scan_disk(dir: &Path) -> Vec<(String, u64)> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<(SystemTime, String, u64)> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let meta = entry.metadata().ok()?;
            let name = entry.file_name().into_string().ok()?;
            let is_key = name.len() == 64 && name.bytes().all(|b| b.is_ascii_hexdigit());
            (meta.is_file() && is_key).then(|| (meta.modified().unwrap_or(SystemTime::UNIX_EPOCH), name, meta.len()))
        })
        .collect();
    files.sort();
    files.into_iter().map(|(_, name, len)| (name, len)).collect()
}

/// Disk layout: decimal status, newline, raw body.
fn read_disk_entry(path: &Path) -> Option<CachedResponse> {
    let raw = std::fs::read(path).ok()?;
    let split = raw.iter().position(|b| *b == b'\n')?;
    let status = std::str::from_utf8(&raw[..split]).ok()?.parse().ok()?;
    Some(CachedResponse {
        status,
        body: Bytes::copy_from_slice(&raw[split + 1..]),
    })
}
