//! Client-side protocol library for the escrow deal contract.
//!
//! Turns textual asset specs into fixed-layout contract inputs, signs
//! state-changing transactions, decodes the bounded deal listing returned by
//! the contract and renders it as text. Nothing in this crate performs I/O.

/// Assets, deal sides and the asset spec grammar
pub mod asset;
/// Fixed-capacity container with an explicit valid length
pub mod bounded;
/// Byte-exact request/response layouts
pub mod codec;
/// Hashing, key derivation and signing
pub mod crypto;
/// Deals and deal listings
pub mod deal;
/// Public keys and their textual identities
pub mod identity;
/// Text tables for deal listings
pub mod render;
/// Signed transaction assembly and fees
pub mod transaction;

pub mod error;

pub use asset::{AssetAmount, AssetName, DealSide};
pub use bounded::Bounded;
pub use crypto::{KeyPair, TxSigner};
pub use deal::{Deal, DealEntity, DealList, DealListing};
pub use error::EscrowError;
pub use identity::PublicKey;
pub use transaction::{
    DealRequest, FeeSchedule, Operation, SignedTransaction, TransactionBuilder, TxId,
};

pub type Result<T> = std::result::Result<T, EscrowError>;
