//! Hook handlers of the sample extension.

use gallery_extension_sdk::prelude::*;

/// Adds a keyword to photo metadata after it is loaded.
#[derive(Debug, Clone)]
pub struct KeywordTagger {
    keyword: String,
}

impl KeywordTagger {
    /// Creates a tagger adding `keyword`.
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }

    /// Appends the keyword to `output.keywords` unless already present.
    ///
    /// Outputs without a `keywords` array pass through untouched.
    pub fn tag(&self, data: AfterData) -> AppResult<Value> {
        let mut output = data.output;
        if let Some(keywords) = output.get_mut("keywords").and_then(Value::as_array_mut) {
            if !keywords.iter().any(|k| k.as_str() == Some(self.keyword.as_str())) {
                keywords.push(Value::String(self.keyword.clone()));
            }
        }
        Ok(output)
    }
}

/// Trims and lowercases `input.query` before a search runs.
pub fn normalize_query(mut input: Value) -> AppResult<BeforeOutcome> {
    if let Some(query) = input.get_mut("query") {
        if let Some(text) = query.as_str() {
            *query = Value::String(text.trim().to_lowercase());
        }
    }
    Ok(BeforeOutcome::Continue(input))
}
