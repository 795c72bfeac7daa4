pub mod cache;
pub mod client;
pub mod error;
pub mod wire;

pub use cache::{WatchlistCache, WatchlistCacheEntry};
pub use client::{PlexTvClient, DEFAULT_PAGE_SIZE};
pub use error::Error;
