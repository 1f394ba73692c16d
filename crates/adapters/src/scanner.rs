// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scanner interface (spec.md §6): the Producer's source of candidate work.

use async_trait::async_trait;
use wq_core::Priority;

/// One candidate item discovered by a scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanItem {
    pub path: String,
    pub size: u64,
    pub priority_hint: Priority,
}

/// A finite, restartable sequence of candidate work items; an empty
/// sequence is permitted (spec.md §6).
#[async_trait]
pub trait Scanner: Send + Sync + 'static {
    async fn scan(&self) -> Result<Vec<ScanItem>, ScanError>;
}

#[derive(Debug, thiserror::Error)]
#[error("scan failed: {0}")]
pub struct ScanError(pub String);

/// Default scanner: walks a directory tree and classifies priority by file
/// extension against a configured hint table. This is a reasonable shipped
/// default, not a requirement of the core's correctness guarantees (spec.md
/// §1 lists "filesystem glob discovery implementation" as an external
/// collaborator).
pub struct WalkDirScanner {
    root: std::path::PathBuf,
    extension_priority: Vec<(String, Priority)>,
    default_priority: Priority,
}

impl WalkDirScanner {
    pub fn new(root: impl Into<std::path::PathBuf>, extension_priority: Vec<(String, Priority)>, default_priority: Priority) -> Self {
        Self { root: root.into(), extension_priority, default_priority }
    }

    fn classify(&self, path: &std::path::Path) -> Priority {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.extension_priority
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(ext))
            .map(|(_, priority)| priority.clone())
            .unwrap_or_else(|| self.default_priority.clone())
    }
}

#[async_trait]
impl Scanner for WalkDirScanner {
    async fn scan(&self) -> Result<Vec<ScanItem>, ScanError> {
        let root = self.root.clone();
        let extension_priority = self.extension_priority.clone();
        let default_priority = self.default_priority.clone();
        tokio::task::spawn_blocking(move || {
            let scanner = WalkDirScanner { root: root.clone(), extension_priority, default_priority };
            let mut items = Vec::new();
            for entry in walkdir::WalkDir::new(&root).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let metadata = match entry.metadata() {
                    Ok(m) => m,
                    Err(_) => continue,
                };
                items.push(ScanItem {
                    path: entry.path().to_string_lossy().into_owned(),
                    size: metadata.len(),
                    priority_hint: scanner.classify(entry.path()),
                });
            }
            items
        })
        .await
        .map_err(|e| ScanError(e.to_string()))
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;

    /// Fixed-list scanner for tests: returns the same items every call.
    #[derive(Clone, Default)]
    pub struct FixedScanner {
        items: Vec<ScanItem>,
    }

    impl FixedScanner {
        pub fn new(items: Vec<ScanItem>) -> Self {
            Self { items }
        }
    }

    #[async_trait]
    impl Scanner for FixedScanner {
        async fn scan(&self) -> Result<Vec<ScanItem>, ScanError> {
            Ok(self.items.clone())
        }
    }
}
