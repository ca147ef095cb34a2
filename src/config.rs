pub mod app_config;
pub mod figment;
mod errors;

pub use errors::ConfigError;
