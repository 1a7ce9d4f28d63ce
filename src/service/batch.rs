use super::traits::CloudBatch;
use crate::error::{Result, SearchServiceError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ACTION_KEY: &str = "@search.action";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchAction {
    Upload,
    Merge,
    MergeOrUpload,
    Delete,
}

impl BatchAction {
    fn as_str(&self) -> &'static str {
        match self {
            BatchAction::Upload => "upload",
            BatchAction::Merge => "merge",
            BatchAction::MergeOrUpload => "mergeOrUpload",
            BatchAction::Delete => "delete",
        }
    }
}

/// Ready-made [`CloudBatch`] producing the bulk indexing payload
/// `{"value": [{"@search.action": "upload", ...}, ...]}`.
#[derive(Debug, Clone, Default)]
pub struct DocumentBatch {
    actions: Vec<(BatchAction, Map<String, Value>)>,
}

impl DocumentBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `document` under `action`. The document must be a JSON object
    /// and must not carry its own `@search.action`.
    pub fn push(&mut self, action: BatchAction, document: Value) -> Result<()> {
        match document {
            Value::Object(fields) if fields.contains_key(ACTION_KEY) => {
                Err(SearchServiceError::Json(format!(
                    "Batch documents must not contain the reserved key '{}'",
                    ACTION_KEY
                )))
            }
            Value::Object(fields) => {
                self.actions.push((action, fields));
                Ok(())
            }
            other => Err(SearchServiceError::Json(format!(
                "Batch documents must be JSON objects, got {}",
                other
            ))),
        }
    }

    pub fn upload(&mut self, document: Value) -> Result<()> {
        self.push(BatchAction::Upload, document)
    }

    pub fn merge(&mut self, document: Value) -> Result<()> {
        self.push(BatchAction::Merge, document)
    }

    pub fn merge_or_upload(&mut self, document: Value) -> Result<()> {
        self.push(BatchAction::MergeOrUpload, document)
    }

    pub fn delete(&mut self, key_field: &str, key: &str) {
        let mut fields = Map::new();
        fields.insert(key_field.to_string(), Value::String(key.to_string()));
        self.actions.push((BatchAction::Delete, fields));
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl CloudBatch for DocumentBatch {
    fn to_json(&self) -> Result<String> {
        let value: Vec<Value> = self
            .actions
            .iter()
            .map(|(action, fields)| {
                let mut entry = Map::with_capacity(fields.len() + 1);
                entry.insert(
                    ACTION_KEY.to_string(),
                    Value::String(action.as_str().to_string()),
                );
                for (k, v) in fields {
                    entry.insert(k.clone(), v.clone());
                }
                Value::Object(entry)
            })
            .collect();

        let mut payload = Map::new();
        payload.insert("value".to_string(), Value::Array(value));
        Ok(serde_json::to_string(&Value::Object(payload))?)
    }
}
