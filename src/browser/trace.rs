//! In-memory action trace: records every page and locator action with timing
//! and outcome. Kept traces are written as JSONL next to the test artifacts.

use crate::error::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

const MAX_ENTRIES: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub id: String, // uuid v4
    pub ts: i64,    // Unix ms
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub duration_ms: u64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Cheaply clonable handle; disabled traces drop every entry.
#[derive(Clone)]
pub struct ActionTrace {
    enabled: bool,
    buffer: Arc<Mutex<VecDeque<TraceEntry>>>,
}

impl ActionTrace {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            buffer: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(
        &self,
        action: &str,
        target: Option<&str>,
        duration_ms: u64,
        error: Option<String>,
    ) {
        if !self.enabled {
            return;
        }
        let entry = TraceEntry {
            id: uuid::Uuid::new_v4().to_string(),
            ts: chrono::Utc::now().timestamp_millis(),
            action: action.to_string(),
            target: target.map(str::to_string),
            duration_ms,
            success: error.is_none(),
            error,
        };
        let mut buf = self.buffer.lock();
        if buf.len() >= MAX_ENTRIES {
            buf.pop_front();
        }
        buf.push_back(entry);
    }

    pub fn entries(&self) -> Vec<TraceEntry> {
        self.buffer.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write all entries, oldest first, one JSON object per line.
    pub async fn write_jsonl(&self, path: &Path) -> Result<()> {
        let mut out = String::new();
        for entry in self.entries() {
            out.push_str(&serde_json::to_string(&entry)?);
            out.push('\n');
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, out).await?;
        Ok(())
    }
}

impl Default for ActionTrace {
    fn default() -> Self {
        Self::disabled()
    }
}
