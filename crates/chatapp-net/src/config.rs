use std::path::{Path, PathBuf};
use std::time::Duration;

use chatapp_types::{FileError, codec};
use serde::{Deserialize, Serialize};

/// How host names are turned into addresses for API requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Operating system resolver.
    System,
    /// DoH installed as the HTTP client's resolver. URL and Host untouched.
    #[default]
    DohNative,
    /// Resolve via DoH first, then rewrite the request URL to the address.
    DohRewrite,
}

/// Value sent as `Host` after a DoH URL rewrite.
///
/// `ResolvedAddress` reproduces the long-standing behaviour of sending the
/// IP. It breaks name-based virtual hosting; `OriginalName` keeps the
/// hostname instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DohHostHeader {
    #[default]
    ResolvedAddress,
    OriginalName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub memory_capacity: usize,
    pub disk_capacity: u64,
    /// Disk tier is only used when a directory is configured.
    pub disk_path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_capacity: 20 * 1024 * 1024,
            disk_capacity: 100 * 1024 * 1024,
            disk_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme + authority every API path is appended to.
    pub api_host: String,
    pub timeout_secs: u64,
    pub resolution: ResolutionMode,
    pub doh_host_header: DohHostHeader,
    pub cache: CacheConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: "http://127.0.0.1:3000".into(),
            timeout_secs: 30,
            resolution: ResolutionMode::default(),
            doh_host_header: DohHostHeader::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load from a JSON file; absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, FileError> {
        codec::decode_file(path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
