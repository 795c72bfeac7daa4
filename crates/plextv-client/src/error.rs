use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid auth token")]
    InvalidAuthToken,

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML decode error: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected status: {0}")]
    Status(StatusCode),

    #[error("Metadata item not found")]
    MetadataNotFound,

    #[error("Plex {0} is not configured")]
    NotConfigured(&'static str),

    #[error("User {0} does not exist on the account's shared list")]
    UserNotShared(u64),

    #[error("No pong response")]
    NoPong,
}
