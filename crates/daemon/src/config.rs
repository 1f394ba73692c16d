// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-level configuration: the engine's typed config plus the bits that
//! only make sense for a standalone process (broker URL, scan root, task
//! cadences). Loaded from a TOML file at startup.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use wq_engine::EngineConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    pub root: PathBuf,
    #[serde(default)]
    pub extension_priority: HashMap<String, String>,
    pub default_priority: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    pub redis_url: String,
    pub engine: EngineConfig,
    pub scanner: ScannerConfig,
    #[serde(default = "default_producer_interval_ms")]
    pub producer_interval_ms: u64,
    /// Reaper cadence; defaults to `heartbeat_ttl / 2` (spec.md §4.7) when
    /// absent.
    pub reaper_interval_ms: Option<u64>,
}

fn default_producer_interval_ms() -> u64 {
    5_000
}

impl DaemonConfig {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&raw)?;
        Ok(config)
    }

    pub fn reaper_interval(&self) -> std::time::Duration {
        let ms = self.reaper_interval_ms.unwrap_or(self.engine.worker.heartbeat_ttl_ms / 2);
        std::time::Duration::from_millis(ms.max(1))
    }

    pub fn producer_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.producer_interval_ms)
    }
}
