use serde::{Deserialize, Serialize};
use std::path::Path;
use anyhow::{Context, Result};

pub const CONFIG_ENV: &str = "PIEBRIDGE_CONFIG";
pub const LOG_ENV: &str = "PIEBRIDGE_LOG";

/// Engine settings applied by `Session::init`. The worker pool size is not
/// configurable: the bridge always searches on exactly one thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Transposition table size in MB.
    pub hash_mb: usize,
    /// Requested depths above this are clamped.
    pub max_depth: u32,
    pub use_nullmove: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self { Self { hash_mb: 16, max_depth: 64, use_nullmove: true } }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> { std::env::var(name).ok().and_then(|s| s.trim().parse().ok()) }

impl BridgeConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(|| format!("read config file: {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse config file: {}", path.display()))
    }

    /// Defaults, then the JSON file named by `PIEBRIDGE_CONFIG`, then
    /// `PIEBRIDGE_HASH_MB` / `PIEBRIDGE_MAX_DEPTH`. A broken file is logged
    /// and ignored.
    pub fn from_env() -> Self {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_json_file(path.trim()).unwrap_or_else(|e| {
                log::warn!("ignoring {}: {:#}", CONFIG_ENV, e);
                Self::default()
            }),
            _ => Self::default(),
        };
        if let Some(mb) = env_parse::<usize>("PIEBRIDGE_HASH_MB") { cfg.hash_mb = mb; }
        if let Some(d) = env_parse::<u32>("PIEBRIDGE_MAX_DEPTH") { cfg.max_depth = d; }
        cfg.sanitized()
    }

    pub fn sanitized(mut self) -> Self {
        self.hash_mb = self.hash_mb.clamp(1, 4096);
        self.max_depth = self.max_depth.clamp(1, crate::search::eval::MAX_PLY as u32 - 1);
        self
    }
}
