//! Typed views of the Plex.tv wire payloads.
//!
//! The XML endpoints (device resources, shared users, watchlist listing and
//! per-item detail) decode into explicit structs here; boolean attributes
//! arrive as "0"/"1" strings and timestamps as epoch seconds, so each raw
//! record carries a conversion into the normalized model types.

use chrono::{DateTime, TimeZone, Utc};
use plextv_models::{Connection, Device, MediaType, PlexUser, WatchlistItem};
use serde::Deserialize;

/// "0"/"1" wire flag. Anything other than "1" (including absence) is false.
fn flag(value: Option<&str>) -> bool {
    value == Some("1")
}

/// Epoch-seconds attribute to an absolute time value.
fn epoch(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
}

/// Find a namespaced cross-reference id, e.g. `guid_id(guids, "tmdb")`
/// matches `tmdb://603` and yields 603.
pub fn guid_id(guids: &[Guid], namespace: &str) -> Option<u32> {
    guids.iter().find_map(|guid| {
        guid.id
            .strip_prefix(namespace)?
            .strip_prefix("://")?
            .parse()
            .ok()
    })
}

// ---- /api/resources (XML) ----

#[derive(Debug, Deserialize)]
pub struct ResourceContainer {
    #[serde(default, rename = "Device")]
    pub devices: Vec<ResourceDevice>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceDevice {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@product")]
    pub product: String,
    #[serde(rename = "@productVersion")]
    pub product_version: String,
    #[serde(default, rename = "@platform")]
    pub platform: Option<String>,
    #[serde(default, rename = "@platformVersion")]
    pub platform_version: Option<String>,
    #[serde(default, rename = "@device")]
    pub device: Option<String>,
    #[serde(rename = "@clientIdentifier")]
    pub client_identifier: String,
    #[serde(default, rename = "@createdAt")]
    pub created_at: Option<String>,
    #[serde(default, rename = "@lastSeenAt")]
    pub last_seen_at: Option<String>,
    #[serde(rename = "@provides")]
    pub provides: String,
    #[serde(default, rename = "@owned")]
    pub owned: Option<String>,
    #[serde(default, rename = "@accessToken")]
    pub access_token: Option<String>,
    #[serde(default, rename = "@publicAddress")]
    pub public_address: Option<String>,
    #[serde(default, rename = "@publicAddressMatches")]
    pub public_address_matches: Option<String>,
    #[serde(default, rename = "@httpsRequired")]
    pub https_required: Option<String>,
    #[serde(default, rename = "@synced")]
    pub synced: Option<String>,
    #[serde(default, rename = "@relay")]
    pub relay: Option<String>,
    #[serde(default, rename = "@dnsRebindingProtection")]
    pub dns_rebinding_protection: Option<String>,
    #[serde(default, rename = "@natLoopbackSupported")]
    pub nat_loopback_supported: Option<String>,
    #[serde(default, rename = "@presence")]
    pub presence: Option<String>,
    #[serde(default, rename = "@ownerID")]
    pub owner_id: Option<String>,
    #[serde(default, rename = "@home")]
    pub home: Option<String>,
    #[serde(default, rename = "@sourceTitle")]
    pub source_title: Option<String>,
    #[serde(default, rename = "Connection")]
    pub connections: Vec<ResourceConnection>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceConnection {
    #[serde(rename = "@protocol")]
    pub protocol: String,
    #[serde(rename = "@address")]
    pub address: String,
    #[serde(rename = "@port")]
    pub port: u16,
    #[serde(rename = "@uri")]
    pub uri: String,
    #[serde(default, rename = "@local")]
    pub local: Option<String>,
}

impl ResourceDevice {
    pub fn into_device(self) -> Device {
        Device {
            name: self.name,
            product: self.product,
            product_version: self.product_version,
            platform: self.platform,
            platform_version: self.platform_version,
            device: self.device,
            client_identifier: self.client_identifier,
            created_at: epoch(self.created_at.as_deref()),
            last_seen_at: epoch(self.last_seen_at.as_deref()),
            provides: self
                .provides
                .split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            owned: flag(self.owned.as_deref()),
            access_token: self.access_token,
            public_address: self.public_address,
            public_address_matches: flag(self.public_address_matches.as_deref()),
            https_required: flag(self.https_required.as_deref()),
            synced: flag(self.synced.as_deref()),
            relay: flag(self.relay.as_deref()),
            dns_rebinding_protection: flag(self.dns_rebinding_protection.as_deref()),
            nat_loopback_supported: flag(self.nat_loopback_supported.as_deref()),
            presence: flag(self.presence.as_deref()),
            home: flag(self.home.as_deref()),
            owner_id: self.owner_id,
            source_title: self.source_title,
            connections: self
                .connections
                .into_iter()
                .map(|conn| Connection {
                    protocol: conn.protocol,
                    address: conn.address,
                    port: conn.port,
                    uri: conn.uri,
                    local: flag(conn.local.as_deref()),
                })
                .collect(),
        }
    }
}

// ---- /users/account.json (JSON) ----

#[derive(Debug, Deserialize)]
pub struct AccountResponse {
    pub user: PlexUser,
}

// ---- /api/users (XML) ----

#[derive(Debug, Deserialize)]
pub struct UserContainer {
    #[serde(default, rename = "User")]
    pub users: Vec<SharedUser>,
}

#[derive(Debug, Deserialize)]
pub struct SharedUser {
    #[serde(rename = "@id")]
    pub id: u64,
    #[serde(default, rename = "@title")]
    pub title: Option<String>,
    #[serde(default, rename = "@username")]
    pub username: Option<String>,
    #[serde(default, rename = "Server")]
    pub servers: Vec<SharedServer>,
}

#[derive(Debug, Deserialize)]
pub struct SharedServer {
    #[serde(rename = "@machineIdentifier")]
    pub machine_identifier: String,
    #[serde(default, rename = "@name")]
    pub name: Option<String>,
}

// ---- /library/sections/watchlist/all (XML) ----

/// The listing page as cached: total count plus item stubs. Decoded once per
/// fresh response and reused verbatim on 304 revalidations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WatchlistContainer {
    #[serde(default, rename = "@totalSize")]
    pub total_size: u32,
    #[serde(default, rename = "Metadata")]
    pub metadata: Vec<WatchlistStub>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WatchlistStub {
    #[serde(rename = "@ratingKey")]
    pub rating_key: String,
}

// ---- /library/metadata/{ratingKey} (XML) ----

#[derive(Debug, Deserialize)]
pub struct MetadataContainer {
    #[serde(default, rename = "Metadata")]
    pub metadata: Vec<MetadataDetail>,
}

#[derive(Debug, Deserialize)]
pub struct MetadataDetail {
    #[serde(rename = "@ratingKey")]
    pub rating_key: String,
    #[serde(rename = "@title")]
    pub title: String,
    #[serde(rename = "@type")]
    pub media_type: String,
    #[serde(default, rename = "Guid")]
    pub guids: Vec<Guid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Guid {
    #[serde(rename = "@id")]
    pub id: String,
}

impl MetadataDetail {
    /// A missing TMDB cross-reference becomes the 0 sentinel; the page
    /// builder drops those items.
    pub fn into_item(self) -> WatchlistItem {
        let tmdb_id = guid_id(&self.guids, "tmdb").unwrap_or(0);
        let tvdb_id = guid_id(&self.guids, "tvdb");
        WatchlistItem {
            rating_key: self.rating_key,
            tmdb_id,
            tvdb_id,
            title: self.title,
            media_type: MediaType::from_wire(&self.media_type),
        }
    }
}

// ---- /api/v2/ping (JSON) ----

#[derive(Debug, Deserialize)]
pub struct PingResponse {
    #[serde(default)]
    pub pong: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn guid(id: &str) -> Guid {
        Guid { id: id.to_string() }
    }

    #[test]
    fn test_flag_conversion() {
        assert!(flag(Some("1")));
        assert!(!flag(Some("0")));
        assert!(!flag(Some("true")));
        assert!(!flag(None));
    }

    #[test]
    fn test_epoch_conversion() {
        let expected = Utc.timestamp_opt(1580000000, 0).single().unwrap();
        assert_eq!(epoch(Some("1580000000")), Some(expected));
        assert_eq!(epoch(Some("not-a-number")), None);
        assert_eq!(epoch(None), None);
    }

    #[test]
    fn test_guid_id_extraction() {
        let guids = vec![
            guid("imdb://tt0137523"),
            guid("tmdb://550"),
            guid("tvdb://290434"),
        ];
        assert_eq!(guid_id(&guids, "tmdb"), Some(550));
        assert_eq!(guid_id(&guids, "tvdb"), Some(290434));
        assert_eq!(guid_id(&guids, "anidb"), None);
    }

    #[test]
    fn test_guid_id_ignores_non_numeric_suffix() {
        let guids = vec![guid("tmdb://not-a-number")];
        assert_eq!(guid_id(&guids, "tmdb"), None);
    }

    #[test]
    fn test_decode_device_container() {
        let xml = r#"
            <MediaContainer size="1">
              <Device name="My Server" product="Plex Media Server"
                      productVersion="1.40.0" platform="Linux"
                      clientIdentifier="abc123" createdAt="1580000000"
                      lastSeenAt="1580000100" provides="server"
                      owned="1" publicAddressMatches="0" httpsRequired="1"
                      synced="0" relay="1" dnsRebindingProtection="0"
                      natLoopbackSupported="0" presence="1" home="0">
                <Connection protocol="https" address="10.0.0.5" port="32400"
                            uri="https://10-0-0-5.example.plex.direct:32400"
                            local="1"/>
              </Device>
            </MediaContainer>"#;

        let container: ResourceContainer = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(container.devices.len(), 1);

        let device = container.devices.into_iter().next().unwrap().into_device();
        assert_eq!(device.name, "My Server");
        assert_eq!(device.provides, vec!["server".to_string()]);
        assert!(device.owned);
        assert!(!device.public_address_matches);
        assert!(device.https_required);
        assert!(!device.synced);
        assert!(device.relay);
        assert!(!device.dns_rebinding_protection);
        assert!(!device.nat_loopback_supported);
        assert!(device.presence);
        assert!(!device.home);
        assert_eq!(
            device.created_at,
            Utc.timestamp_opt(1580000000, 0).single()
        );
        assert_eq!(
            device.last_seen_at,
            Utc.timestamp_opt(1580000100, 0).single()
        );
        assert_eq!(device.connections.len(), 1);
        assert_eq!(device.connections[0].port, 32400);
        assert!(device.connections[0].local);
    }

    #[test]
    fn test_decode_device_provides_splits_on_comma() {
        let xml = r#"
            <MediaContainer size="1">
              <Device name="App" product="Plex for Android" productVersion="9.0"
                      clientIdentifier="xyz" provides="client,player,pubsub-player"/>
            </MediaContainer>"#;

        let container: ResourceContainer = quick_xml::de::from_str(xml).unwrap();
        let device = container.devices.into_iter().next().unwrap().into_device();
        assert_eq!(device.provides, vec!["client", "player", "pubsub-player"]);
        assert!(device.connections.is_empty());
        assert!(!device.owned);
    }

    #[test]
    fn test_decode_shared_users() {
        let xml = r#"
            <MediaContainer friendlyName="myPlex" size="2">
              <User id="1001" title="Friend" username="friend">
                <Server id="1" machineIdentifier="machine-a" name="Home"/>
                <Server id="2" machineIdentifier="machine-b" name="Remote"/>
              </User>
              <User id="1002" title="Other"/>
            </MediaContainer>"#;

        let container: UserContainer = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(container.users.len(), 2);
        assert_eq!(container.users[0].id, 1001);
        assert_eq!(container.users[0].servers.len(), 2);
        assert_eq!(container.users[0].servers[1].machine_identifier, "machine-b");
        assert!(container.users[1].servers.is_empty());
    }

    #[test]
    fn test_decode_watchlist_container() {
        let xml = r#"
            <MediaContainer totalSize="42">
              <Metadata ratingKey="key-1"/>
              <Metadata ratingKey="key-2"/>
            </MediaContainer>"#;

        let container: WatchlistContainer = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(container.total_size, 42);
        assert_eq!(container.metadata.len(), 2);
        assert_eq!(container.metadata[0].rating_key, "key-1");
    }

    #[test]
    fn test_decode_empty_watchlist_container() {
        let xml = r#"<MediaContainer totalSize="0"></MediaContainer>"#;
        let container: WatchlistContainer = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(container.total_size, 0);
        assert!(container.metadata.is_empty());
    }

    #[test]
    fn test_detail_into_item_with_tmdb_guid() {
        let detail = MetadataDetail {
            rating_key: "key-1".to_string(),
            title: "Fight Club".to_string(),
            media_type: "movie".to_string(),
            guids: vec![guid("imdb://tt0137523"), guid("tmdb://550")],
        };

        let item = detail.into_item();
        assert_eq!(item.tmdb_id, 550);
        assert_eq!(item.tvdb_id, None);
        assert_eq!(item.title, "Fight Club");
        assert_eq!(item.media_type, MediaType::Movie);
    }

    #[test]
    fn test_detail_into_item_without_tmdb_guid_uses_sentinel() {
        let detail = MetadataDetail {
            rating_key: "key-2".to_string(),
            title: "Obscure Show".to_string(),
            media_type: "show".to_string(),
            guids: vec![guid("tvdb://290434")],
        };

        let item = detail.into_item();
        assert_eq!(item.tmdb_id, 0);
        assert_eq!(item.tvdb_id, Some(290434));
        assert_eq!(item.media_type, MediaType::Show);
    }

    #[test]
    fn test_detail_into_item_unknown_type() {
        let detail = MetadataDetail {
            rating_key: "key-3".to_string(),
            title: "Concert".to_string(),
            media_type: "artist".to_string(),
            guids: vec![guid("tmdb://7")],
        };

        let item = detail.into_item();
        assert_eq!(item.media_type, MediaType::Other("artist".to_string()));
    }

    #[test]
    fn test_decode_account_envelope() {
        let json = r#"{"user":{"id":42,"uuid":"u-42","email":null,"username":"alice","title":"Alice","thumb":null}}"#;
        let account: AccountResponse = serde_json::from_str(json).unwrap();
        assert_eq!(account.user.id, 42);
        assert_eq!(account.user.username, "alice");
        assert!(account.user.email.is_none());
    }

    #[test]
    fn test_decode_ping_response_defaults_to_no_pong() {
        let ping: PingResponse = serde_json::from_str(r#"{"pong":true}"#).unwrap();
        assert!(ping.pong);
        let ping: PingResponse = serde_json::from_str("{}").unwrap();
        assert!(!ping.pong);
    }

    #[test]
    fn test_decode_detail_container() {
        let xml = r#"
            <MediaContainer size="1">
              <Metadata ratingKey="key-1" title="Fight Club" type="movie">
                <Guid id="imdb://tt0137523"/>
                <Guid id="tmdb://550"/>
                <Guid id="tvdb:/malformed"/>
              </Metadata>
            </MediaContainer>"#;

        let container: MetadataContainer = quick_xml::de::from_str(xml).unwrap();
        let detail = container.metadata.into_iter().next().unwrap();
        assert_eq!(detail.guids.len(), 3);

        let item = detail.into_item();
        assert_eq!(item.tmdb_id, 550);
        assert_eq!(item.tvdb_id, None);
    }
}
