use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::NodeId;

/// Key under which the identification record is stored on a table root
pub const METADATA_KEY: &str = "tables-for-express-table";

/// Identification record attached to every table root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    /// Id of the root group at creation time
    pub node_id: NodeId,
    pub columns: u32,
    pub rows: u32,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}

impl TableMetadata {
    pub fn new(node_id: NodeId, columns: u32, rows: u32) -> Self {
        Self {
            node_id,
            columns,
            rows,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
