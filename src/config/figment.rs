use std::path::Path;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use crate::bin_constants::APP_CONFIG_ENV_PREFIX;
use crate::config::app_config::data::AppConfigData;
use crate::config::app_config::AppConfig;
use crate::config::ConfigError;

pub trait FigmentExt {
    fn setup_app_config(
        self,
        config_file: impl AsRef<Path>,
    ) -> Figment;

    fn extract_app_config(&self) -> Result<AppConfig, ConfigError>;
}

impl FigmentExt for Figment {
    fn setup_app_config(self, config_file: impl AsRef<Path>) -> Figment {
        // the file is optional, the environment alone is a complete setup
        self.merge(Serialized::defaults(AppConfigData::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(APP_CONFIG_ENV_PREFIX))
    }

    fn extract_app_config(&self) -> Result<AppConfig, ConfigError> {
        self.extract::<AppConfigData>()?.try_into()
    }
}
