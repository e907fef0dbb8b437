use crate::{address::PaddedError, body::DecodeError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("message {0} is not a transfer message")]
    NotTransfer(String),
    #[error("invalid message record: {0}")]
    InvalidRecord(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Padded(#[from] PaddedError),
}
