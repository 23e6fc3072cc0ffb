pub type CollectionName = String;
pub type DocumentId = String;
