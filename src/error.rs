use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{credential::CredentialError, message::ComposeError};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can stop a message from reaching the relay
#[derive(Debug, Error)]
pub enum SendError {
    #[error("cannot read message body from {path:?}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot build message")]
    Compose(#[source] ComposeError),
    #[error("cannot load relay credential")]
    Credential(#[source] CredentialError),
    #[error("cannot open session to relay {endpoint}")]
    Connection {
        endpoint: String,
        #[source]
        source: BoxError,
    },
    #[error("relay rejected credentials for {username:?}")]
    Authentication {
        username: String,
        #[source]
        source: BoxError,
    },
    #[error("relay rejected message")]
    Delivery(#[source] BoxError),
}
