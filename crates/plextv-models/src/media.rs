use serde::{Deserialize, Serialize};

/// Media kind as reported by the source (`type` attribute on metadata).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Show,
    #[serde(untagged)]
    Other(String),
}

impl MediaType {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "movie" => MediaType::Movie,
            "show" => MediaType::Show,
            other => MediaType::Other(other.to_string()),
        }
    }
}
