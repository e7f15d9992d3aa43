use std::time::Duration;

use escrow_core::EscrowError;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("failed to connect to node {addr}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("node I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("node did not answer within {0:?}")]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("deal {0} is neither proposed to this identity nor opened")]
    DealNotFound(i64),
    #[error("failed to fetch deals")]
    QueryFailed(#[source] Box<ClientError>),
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Escrow(EscrowError),
}

impl From<EscrowError> for ClientError {
    fn from(value: EscrowError) -> Self {
        match value {
            EscrowError::MalformedResponse { .. } | EscrowError::Decode(_) => {
                Self::MalformedResponse(value.to_string())
            }
            other => Self::Escrow(other),
        }
    }
}
