use crate::{Document, Error};

impl Document {
    /// Encodes the object tree as JSON: a block is an array of entries, an attribute is
    /// `{"key": ..., "args": [...]}`.
    pub fn to_json_string(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Json {
            message: e.to_string(),
        })
    }

    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        serde_json::from_str(input).map_err(|e| Error::Json {
            message: e.to_string(),
        })
    }
}
