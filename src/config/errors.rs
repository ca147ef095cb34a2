use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Figment(#[from] figment::Error),

    #[error("missing required setting \"{0}\"")]
    Missing(&'static str),

    #[error("invalid endpoint url \"{value}\": {message}")]
    InvalidEndpointUrl {
        value: String,
        message: String,
    },

    #[error("invalid notes table name \"{0}\"")]
    InvalidNotesTable(String),

    #[error("\"{0}\" must be greater than zero")]
    Zero(&'static str),
}
