//! Application configuration.
//!
//! TOML file plus environment overrides, deserialized into [`Settings`].

mod load;
mod schema;

pub use load::{default_config_path, resolve_config_path};
pub use schema::{AudioSettings, LibrarySettings, PlaybackSettings, Settings};
