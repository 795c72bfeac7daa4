use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A device registered against the Plex account, from the resources listing.
///
/// Boolean attributes arrive on the wire as "0"/"1" strings and are decoded
/// to real booleans before this record is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Device {
    pub name: String,
    pub product: String,
    pub product_version: String,
    pub platform: Option<String>,
    pub platform_version: Option<String>,
    pub device: Option<String>,
    pub client_identifier: String,
    pub created_at: Option<DateTime<Utc>>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub provides: Vec<String>,
    pub owned: bool,
    pub access_token: Option<String>,
    pub public_address: Option<String>,
    pub public_address_matches: bool,
    pub https_required: bool,
    pub synced: bool,
    pub relay: bool,
    pub dns_rebinding_protection: bool,
    pub nat_loopback_supported: bool,
    pub presence: bool,
    pub home: bool,
    pub owner_id: Option<String>,
    pub source_title: Option<String>,
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    pub protocol: String,
    pub address: String,
    pub port: u16,
    pub uri: String,
    pub local: bool,
}
