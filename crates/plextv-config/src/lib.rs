pub mod config;
pub mod paths;

pub use config::{Config, PlexConfig};
pub use paths::default_config_path;
