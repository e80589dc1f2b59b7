//! Persisted settings of the sample extension.

use gallery_extension_sdk::prelude::*;

/// Settings template; saved values override these defaults key by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSettings {
    /// Greeting used by the `greet` operation.
    pub greeting: String,
    /// Keyword added to every photo's metadata.
    pub keyword: String,
    /// Name of the tag log inside the data directory.
    pub tag_log: String,
}

impl Default for SampleSettings {
    fn default() -> Self {
        Self {
            greeting: "Hello".to_string(),
            keyword: "sample".to_string(),
            tag_log: "tags.jsonl".to_string(),
        }
    }
}
