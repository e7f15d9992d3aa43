use thiserror::Error;

/// Errors raised while building requests or decoding responses
/// for the escrow contract.
#[derive(Debug, Error, PartialEq)]
pub enum EscrowError {
    #[error("identity error: {0}")]
    Identity(IdentityError),

    #[error("asset spec error: {0}")]
    Asset(AssetError),

    /// Seed text is not 55 lowercase latin letters.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// Response body length differs from the fixed layout size.
    #[error("malformed response: expected {expected} bytes, got {actual}")]
    MalformedResponse { expected: usize, actual: usize },

    /// Fee composition failed (negative QU side, overflow).
    #[error("invalid fee: {0}")]
    Fee(String),

    #[error("wire encoding error: {0}")]
    Encode(String),

    #[error("wire decoding error: {0}")]
    Decode(String),
}

/// Errors that might occur while converting identity text into a public key.
#[derive(Debug, Error, PartialEq)]
pub enum IdentityError {
    #[error("identity must be {expected} characters, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("invalid identity character {0:?}")]
    Character(char),

    #[error("identity limb does not fit into 64 bits")]
    Overflow,

    #[error("identity checksum mismatch")]
    Checksum,
}

/// Errors when parsing a deal side from its textual asset spec.
#[derive(Debug, Error, PartialEq)]
pub enum AssetError {
    #[error("parse int error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// An asset group does not carry name, issuer and amount.
    #[error("bad request: asset group {0:?} must be <name>,<issuer>,<amount>")]
    BadRequest(String),
}

impl From<IdentityError> for EscrowError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}

impl From<AssetError> for EscrowError {
    fn from(value: AssetError) -> Self {
        Self::Asset(value)
    }
}

impl From<std::num::ParseIntError> for EscrowError {
    fn from(value: std::num::ParseIntError) -> Self {
        Self::Asset(AssetError::ParseInt(value))
    }
}

impl From<bincode::error::EncodeError> for EscrowError {
    fn from(value: bincode::error::EncodeError) -> Self {
        Self::Encode(value.to_string())
    }
}

impl From<bincode::error::DecodeError> for EscrowError {
    fn from(value: bincode::error::DecodeError) -> Self {
        Self::Decode(value.to_string())
    }
}
