pub mod device;
pub mod media;
pub mod user;
pub mod watchlist;

pub use device::{Connection, Device};
pub use media::MediaType;
pub use user::PlexUser;
pub use watchlist::{WatchlistItem, WatchlistPage};
