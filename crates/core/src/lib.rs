pub mod config;
pub mod models;
pub mod util;

pub use config::ConfigError;
