use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which snapshot `find_one_and_update` returns for a matched document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReturnDocument {
    Before,
    #[default]
    After,
}

/// Options for `find_one`.
#[derive(Debug, Clone, Default)]
pub struct FindOneOptions {
    pub projection: Option<Value>,
}

/// Options for `find_one_and_update`.
#[derive(Debug, Clone, Default)]
pub struct FindOneAndUpdateOptions {
    pub upsert: bool,
    pub return_document: ReturnDocument,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: u64,
}
