pub const DEFAULT_CONFIG_FILE: &str = "cloudnotes.toml";
pub const APP_CONFIG_ENV_PREFIX: &str = "CLOUDNOTES_";
