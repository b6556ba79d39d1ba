//! JSON document store
//!
//! Loads the per-user financial documents (`assets.json`, `liabilities.json`,
//! ...) from a data directory. Missing or malformed files degrade to empty
//! documents so one bad file never takes the whole snapshot down.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use crate::models::{DataType, FinancialData};

/// Read-only loader for a user's financial documents.
pub struct DocumentStore {
    data_dir: PathBuf,
}

impl DocumentStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load all six documents. Never fails: absent or unparseable files are
    /// logged and replaced with empty objects.
    pub fn load(&self) -> FinancialData {
        let mut data = FinancialData::default();
        for dt in DataType::ALL {
            data.set(dt, self.load_document(dt));
        }
        data
    }

    /// How many documents are present and non-empty, for the health check.
    pub fn loaded_document_count(&self) -> usize {
        DataType::ALL
            .iter()
            .filter(|dt| {
                let doc = self.load_document(**dt);
                doc.as_object().map(|o| !o.is_empty()).unwrap_or(false)
            })
            .count()
    }

    fn load_document(&self, data_type: DataType) -> Value {
        let path = self.data_dir.join(format!("{}.json", data_type));
        if !path.exists() {
            warn!(file = %path.display(), "Financial document not found");
            return Value::Object(Default::default());
        }

        match std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|text| serde_json::from_str(&text).map_err(anyhow::Error::from))
        {
            Ok(value) => {
                info!(document = %data_type, "Loaded financial document");
                value
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "Failed to load financial document");
                Value::Object(Default::default())
            }
        }
    }
}
