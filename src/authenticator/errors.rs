use thiserror::Error;
use crate::backend::BackendError;
use crate::data::ValidationError;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
