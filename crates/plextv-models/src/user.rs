use serde::{Deserialize, Serialize};

/// Account identity from the `/users/account.json` lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlexUser {
    pub id: u64,
    pub uuid: String,
    pub email: Option<String>,
    pub username: String,
    pub title: String,
    pub thumb: Option<String>,
}
