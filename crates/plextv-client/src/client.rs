use futures::future::try_join_all;
use plextv_models::{Device, PlexUser, WatchlistItem, WatchlistPage};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::cache::{WatchlistCache, WatchlistCacheEntry};
use crate::error::Error;
use crate::wire::{
    AccountResponse, MetadataContainer, PingResponse, ResourceContainer, UserContainer,
    WatchlistContainer, WatchlistStub,
};

const PLEX_TV_BASE_URL: &str = "https://plex.tv";
const DISCOVER_BASE_URL: &str = "https://discover.provider.plex.tv";

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Client for the Plex.tv account and discover metadata APIs.
///
/// Watchlist retrieval revalidates against an injected [`WatchlistCache`]
/// using entity tags; the remaining operations are single-request lookups.
pub struct PlexTvClient {
    client: reqwest::Client,
    token: String,
    machine_id: Option<String>,
    watchlist_cache: WatchlistCache,
    plex_tv_url: String,
    discover_url: String,
}

impl PlexTvClient {
    pub fn new(
        token: String,
        machine_id: Option<String>,
        watchlist_cache: WatchlistCache,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .default_headers({
                let mut headers = HeaderMap::new();
                headers.insert(
                    HeaderName::from_static("x-plex-token"),
                    HeaderValue::from_str(&token).map_err(|_| Error::InvalidAuthToken)?,
                );
                headers.insert(
                    HeaderName::from_static("x-plex-client-identifier"),
                    HeaderValue::from_static("plextv-client"),
                );
                headers
            })
            .build()?;

        Ok(Self {
            client,
            token,
            machine_id,
            watchlist_cache,
            plex_tv_url: PLEX_TV_BASE_URL.to_string(),
            discover_url: DISCOVER_BASE_URL.to_string(),
        })
    }

    /// Build a client against loaded settings, taking the machine identifier
    /// used by the access check from the `[plex]` section.
    pub fn from_config(
        token: String,
        config: &plextv_config::Config,
        watchlist_cache: WatchlistCache,
    ) -> Result<Self, Error> {
        Self::new(token, config.plex.machine_id.clone(), watchlist_cache)
    }

    /// Point the client at different base URLs (local test servers, proxies).
    pub fn with_base_urls(mut self, plex_tv_url: String, discover_url: String) -> Self {
        self.plex_tv_url = plex_tv_url;
        self.discover_url = discover_url;
        self
    }

    // ---- Watchlist pipeline ----

    /// Retrieve the first watchlist page with the default window
    /// (offset 0, [`DEFAULT_PAGE_SIZE`] items).
    pub async fn get_watchlist_default(&self) -> WatchlistPage {
        self.get_watchlist(0, DEFAULT_PAGE_SIZE).await
    }

    /// Retrieve one page of the account watchlist.
    ///
    /// Never fails: any transport, decode, or enrichment error is logged and
    /// absorbed into an empty page with the requested window echoed back. An
    /// empty watchlist and a failed retrieval are indistinguishable from the
    /// returned shape alone.
    pub async fn get_watchlist(&self, offset: u32, size: u32) -> WatchlistPage {
        match self.try_get_watchlist(offset, size).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Plex watchlist: failed to retrieve watchlist items: {}", e);
                WatchlistPage {
                    offset,
                    size,
                    total_size: 0,
                    items: Vec::new(),
                }
            }
        }
    }

    async fn try_get_watchlist(&self, offset: u32, size: u32) -> Result<WatchlistPage, Error> {
        let entry = self.fetch_listing(offset, size).await?;
        let (stubs, total_size) = match &entry {
            Some(entry) => (entry.listing.metadata.as_slice(), entry.listing.total_size),
            None => (&[][..], 0),
        };

        let details = self.enrich_stubs(stubs).await?;
        let items: Vec<WatchlistItem> = details
            .into_iter()
            .filter(|item| item.tmdb_id != 0)
            .collect();

        debug!(
            "Plex watchlist: returning {} of {} items (offset {}, size {})",
            items.len(),
            total_size,
            offset,
            size
        );
        Ok(WatchlistPage {
            offset,
            size,
            total_size,
            items,
        })
    }

    /// Fetch the listing page, revalidating the cached copy.
    ///
    /// A 2xx response replaces the cache entry wholesale (new entity tag and
    /// payload, even when the content is unchanged); 304 keeps the cached
    /// entry without touching the body; 4xx/5xx is an error.
    async fn fetch_listing(
        &self,
        offset: u32,
        size: u32,
    ) -> Result<Option<WatchlistCacheEntry>, Error> {
        let cached = self.watchlist_cache.get(&self.token).await;

        let url = format!("{}/library/sections/watchlist/all", self.discover_url);
        let mut request = self.client.get(&url).query(&[
            ("X-Plex-Container-Start", offset),
            ("X-Plex-Container-Size", size),
        ]);
        if let Some(etag) = cached.as_ref().and_then(|entry| entry.etag.as_deref()) {
            request = request.header(IF_NONE_MATCH, etag);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            let etag = response
                .headers()
                .get(ETAG)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await?;
            let listing: WatchlistContainer = quick_xml::de::from_str(&body)?;
            debug!(
                "Plex watchlist: fresh listing with {} stubs (total {})",
                listing.metadata.len(),
                listing.total_size
            );
            let entry = WatchlistCacheEntry { etag, listing };
            self.watchlist_cache.set(&self.token, entry.clone()).await;
            return Ok(Some(entry));
        }

        if status == StatusCode::NOT_MODIFIED {
            debug!("Plex watchlist: listing not modified, serving cached copy");
            return Ok(cached);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(Error::Status(status));
        }

        // Remaining sub-400 statuses carry no usable payload; the cached
        // entry, if any, stays effective.
        Ok(cached)
    }

    /// Resolve every stub to full detail, concurrently, preserving order.
    /// One failing fetch fails the whole step.
    async fn enrich_stubs(&self, stubs: &[WatchlistStub]) -> Result<Vec<WatchlistItem>, Error> {
        try_join_all(stubs.iter().map(|stub| self.fetch_detail(&stub.rating_key))).await
    }

    async fn fetch_detail(&self, rating_key: &str) -> Result<WatchlistItem, Error> {
        let url = format!("{}/library/metadata/{}", self.discover_url, rating_key);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }

        let body = response.text().await?;
        let container: MetadataContainer = quick_xml::de::from_str(&body)?;
        let detail = container
            .metadata
            .into_iter()
            .next()
            .ok_or(Error::MetadataNotFound)?;
        Ok(detail.into_item())
    }

    // ---- Peer operations ----

    /// Devices registered against the account.
    pub async fn get_devices(&self) -> Result<Vec<Device>, Error> {
        match self.try_get_devices().await {
            Ok(devices) => Ok(devices),
            Err(e) => {
                error!("Plex devices: failed to get the device list: {}", e);
                Err(Error::InvalidAuthToken)
            }
        }
    }

    async fn try_get_devices(&self) -> Result<Vec<Device>, Error> {
        let url = format!("{}/api/resources", self.plex_tv_url);
        let response = self
            .client
            .get(&url)
            .query(&[("includeHttps", "1")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }

        let body = response.text().await?;
        let container: ResourceContainer = quick_xml::de::from_str(&body)?;
        Ok(container
            .devices
            .into_iter()
            .map(|device| device.into_device())
            .collect())
    }

    /// The account identity behind the token.
    pub async fn get_user(&self) -> Result<PlexUser, Error> {
        match self.try_get_user().await {
            Ok(user) => Ok(user),
            Err(e) => {
                error!("Plex account: failed to get the account: {}", e);
                Err(Error::InvalidAuthToken)
            }
        }
    }

    async fn try_get_user(&self) -> Result<PlexUser, Error> {
        let url = format!("{}/users/account.json", self.plex_tv_url);
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }

        let body = response.text().await?;
        let account: AccountResponse = serde_json::from_str(&body)?;
        Ok(account.user)
    }

    /// The full shared-user list for the account.
    pub async fn get_users(&self) -> Result<UserContainer, Error> {
        let url = format!("{}/api/users", self.plex_tv_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }

        let body = response.text().await?;
        let container: UserContainer = quick_xml::de::from_str(&body)?;
        Ok(container)
    }

    /// Whether the given shared user has access to the configured server.
    ///
    /// Requires a configured machine identifier; every failure path (missing
    /// configuration, transport, decode, unknown user) logs and yields
    /// `false` rather than an error.
    pub async fn check_user_access(&self, user_id: u64) -> bool {
        match self.try_check_user_access(user_id).await {
            Ok(allowed) => allowed,
            Err(e) => {
                error!("Plex access check: error checking user access: {}", e);
                false
            }
        }
    }

    async fn try_check_user_access(&self, user_id: u64) -> Result<bool, Error> {
        let machine_id = self
            .machine_id
            .as_deref()
            .ok_or(Error::NotConfigured("machine_id"))?;

        let container = self.get_users().await?;
        let user = container
            .users
            .iter()
            .find(|user| user.id == user_id)
            .ok_or(Error::UserNotShared(user_id))?;

        Ok(user
            .servers
            .iter()
            .any(|server| server.machine_identifier == machine_id))
    }

    /// Keep the token alive. Sends a fresh client identifier per call and
    /// never fails; a missing pong or transport error is only logged.
    pub async fn ping_token(&self) {
        match self.try_ping_token().await {
            Ok(()) => debug!("Plex token ping: token is live"),
            Err(e) => error!("Plex token ping: failed to ping token: {}", e),
        }
    }

    async fn try_ping_token(&self) -> Result<(), Error> {
        let url = format!("{}/api/v2/ping", self.plex_tv_url);
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(
                HeaderName::from_static("x-plex-client-identifier"),
                Uuid::new_v4().to_string(),
            )
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }

        let body = response.text().await?;
        let ping: PingResponse = serde_json::from_str(&body)?;
        if !ping.pong {
            return Err(Error::NoPong);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plextv_config::{Config, PlexConfig};

    #[test]
    fn test_new_rejects_token_with_invalid_header_bytes() {
        let err = PlexTvClient::new("bad\ntoken".to_string(), None, WatchlistCache::new())
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidAuthToken));
    }

    #[test]
    fn test_from_config_carries_machine_id() {
        let config = Config {
            plex: PlexConfig {
                machine_id: Some("machine-a".to_string()),
                server_url: None,
            },
        };
        let client =
            PlexTvClient::from_config("token".to_string(), &config, WatchlistCache::new()).unwrap();
        assert_eq!(client.machine_id.as_deref(), Some("machine-a"));
    }
}
