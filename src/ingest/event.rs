//! Watch events in the API server's streaming format
//!
//! A watch stream is newline separated JSON, one event per line:
//! `{"type": "ADDED", "object": {...}}`.

use crate::error::{KfzfError, KfzfResult};
use crate::resources::K8sResource;
use serde::{Deserialize, Serialize};

/// A raw event from a watch stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "object", rename_all = "UPPERCASE")]
pub enum WatchEvent {
    /// Resource was added
    Added(K8sResource),
    /// Resource was modified
    Modified(K8sResource),
    /// Resource was deleted; the object carries its final state
    Deleted(K8sResource),
    /// Resource version checkpoint, carries no object change
    Bookmark(serde_json::Value),
    /// The server reported a watch error
    Error(serde_json::Value),
}

/// Parse one line of a watch stream; blank lines yield `None`
pub fn parse_line(line_no: usize, line: &str) -> KfzfResult<Option<WatchEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| KfzfError::EventParse {
            line: line_no,
            reason: e.to_string(),
        })
}
