pub mod config;
pub mod db;
pub mod loader;

/// Application name for XDG paths
pub const APP_NAME: &str = "trackdex";
