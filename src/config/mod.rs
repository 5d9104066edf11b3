mod resolve;
mod settings;

pub use resolve::{Layer, TOKEN_ENV};
pub use settings::{Config, ConfigFile, Settings, TrackerConfig};
