//! Signed state-changing transactions addressed to the escrow contract.

use std::fmt;

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::asset::DealSide;
use crate::codec::{self, packet_type, TransactionHeader, WireFormat};
use crate::crypto::{ContentHasher, Sha256Hasher, TxSigner, DIGEST_LEN, SIGNATURE_LEN};
use crate::deal::Deal;
use crate::identity::{encode_identity, PublicKey};
use crate::{EscrowError, Result};

/// Default fee charged by the contract for every operation.
pub const DEFAULT_OPERATION_FEE: u64 = 1_000_000;

/// Ticks between the node's current tick and the scheduled tick.
pub const DEFAULT_TICK_OFFSET: u32 = 5;

/// State-changing contract procedures and their input type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Operation {
    CreateDeal = 1,
    AcceptDeal = 3,
    OpenDeal = 4,
    CancelDeal = 5,
}

impl Operation {
    pub fn input_type(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateDeal => "create-deal",
            Self::AcceptDeal => "accept-deal",
            Self::OpenDeal => "open-deal",
            Self::CancelDeal => "cancel-deal",
        })
    }
}

/// A deal operation together with everything its payload needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealRequest {
    Create {
        delta: i64,
        acceptor: PublicKey,
        offered: DealSide,
        requested: DealSide,
    },
    Accept {
        index: i64,
    },
    Cancel {
        index: i64,
    },
    Open {
        index: i64,
    },
}

impl DealRequest {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::CreateDeal,
            Self::Accept { .. } => Operation::AcceptDeal,
            Self::Cancel { .. } => Operation::CancelDeal,
            Self::Open { .. } => Operation::OpenDeal,
        }
    }

    /// Fixed-size contract input for this request.
    pub fn payload(&self) -> Result<Vec<u8>> {
        match self {
            Self::Create {
                delta,
                acceptor,
                offered,
                requested,
            } => codec::encode_create_deal_input(*delta, acceptor, offered, requested),
            Self::Accept { index } | Self::Cancel { index } | Self::Open { index } => {
                codec::encode_operate_deal_input(*index)
            }
        }
    }
}

/// Per-operation base fees, in QU.
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    pub create_fee: u64,
    pub accept_fee: u64,
    pub cancel_fee: u64,
    pub open_fee: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            create_fee: DEFAULT_OPERATION_FEE,
            accept_fee: DEFAULT_OPERATION_FEE,
            cancel_fee: DEFAULT_OPERATION_FEE,
            open_fee: DEFAULT_OPERATION_FEE,
        }
    }
}

impl FeeSchedule {
    /// Base fee plus the offered QU escrowed at submission.
    pub fn create_amount(&self, offered: &DealSide) -> Result<u64> {
        add_qu(self.create_fee, offered.qu())
    }

    /// Base fee plus the QU the target deal requests from its acceptor.
    pub fn accept_amount(&self, target: &Deal) -> Result<u64> {
        add_qu(self.accept_fee, target.requested.qu())
    }

    pub fn cancel_amount(&self) -> u64 {
        self.cancel_fee
    }

    pub fn open_amount(&self) -> u64 {
        self.open_fee
    }
}

fn add_qu(base: u64, qu: i64) -> Result<u64> {
    let qu = u64::try_from(qu).map_err(|_| EscrowError::Fee(format!("negative QU amount {qu}")))?;
    base.checked_add(qu)
        .ok_or_else(|| EscrowError::Fee(format!("{base} + {qu} overflows")))
}

/// Destination key of a contract: its index, little-endian, in the first
/// eight bytes.
pub fn contract_public_key(contract_index: u32) -> PublicKey {
    let mut key = [0u8; 32];
    key[..8].copy_from_slice(&u64::from(contract_index).to_le_bytes());
    PublicKey(key)
}

/// Content-addressed identifier of a signed transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId(pub [u8; DIGEST_LEN]);

impl fmt::Display for TxId {
    /// Lowercase 60-letter form used for status lookups.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_identity(&self.0, true))
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({self})")
    }
}

/// Header, payload and signature of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEnvelope {
    pub header: TransactionHeader,
    pub payload: Vec<u8>,
    pub signature: [u8; SIGNATURE_LEN],
}

impl TransactionEnvelope {
    pub fn source(&self) -> PublicKey {
        PublicKey(self.header.source)
    }

    pub fn destination(&self) -> PublicKey {
        PublicKey(self.header.destination)
    }

    pub fn amount(&self) -> u64 {
        self.header.amount
    }

    pub fn tick(&self) -> u32 {
        self.header.tick
    }

    /// Bytes covered by the signature.
    pub fn unsigned_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = self.header.to_wire()?;
        bytes.extend_from_slice(&self.payload);
        Ok(bytes)
    }

    /// Header, payload and signature.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = self.unsigned_bytes()?;
        bytes.extend_from_slice(&self.signature);
        Ok(bytes)
    }

    /// Broadcast packet; broadcasts always carry a zero dejavu.
    pub fn to_packet(&self) -> Result<Vec<u8>> {
        codec::frame(packet_type::BROADCAST_TRANSACTION, 0, &self.to_bytes()?)
    }
}

/// A transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub envelope: TransactionEnvelope,
    /// Digest the signature was computed over.
    pub digest: [u8; DIGEST_LEN],
    pub id: TxId,
}

/// Assembles and signs transactions for one contract.
#[derive(Debug, Clone)]
pub struct TransactionBuilder<H = Sha256Hasher> {
    contract_index: u32,
    hasher: H,
}

impl TransactionBuilder<Sha256Hasher> {
    pub fn new(contract_index: u32) -> Self {
        Self::with_hasher(contract_index, Sha256Hasher)
    }
}

impl<H: ContentHasher> TransactionBuilder<H> {
    pub fn with_hasher(contract_index: u32, hasher: H) -> Self {
        Self {
            contract_index,
            hasher,
        }
    }

    pub fn contract_index(&self) -> u32 {
        self.contract_index
    }

    /// Build and sign a transaction.
    ///
    /// The signature covers `header || payload`; the id is the digest of
    /// `header || payload || signature`.
    pub fn build(
        &self,
        signer: &dyn TxSigner,
        operation: Operation,
        amount: u64,
        tick: u32,
        payload: Vec<u8>,
    ) -> Result<SignedTransaction> {
        let input_size = u16::try_from(payload.len())
            .map_err(|_| EscrowError::Encode(format!("payload of {} bytes", payload.len())))?;

        let header = TransactionHeader {
            source: *signer.public_key().as_bytes(),
            destination: *contract_public_key(self.contract_index).as_bytes(),
            amount,
            tick,
            input_type: operation.input_type(),
            input_size,
        };
        let mut envelope = TransactionEnvelope {
            header,
            payload,
            signature: [0u8; SIGNATURE_LEN],
        };

        let digest = self.hasher.digest(&envelope.unsigned_bytes()?);
        envelope.signature = signer.sign_digest(&digest);
        let id = TxId(self.hasher.digest(&envelope.to_bytes()?));

        Ok(SignedTransaction {
            envelope,
            digest,
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{verify_signature, KeyPair};

    const SEED: &str = "qwertyuiopasdfghjklzxcvbnmqwertyuiopasdfghjklzxcvbnmqwe";

    #[test]
    fn contract_key_is_left_aligned_index() {
        let key = contract_public_key(3);
        assert_eq!(key.as_bytes()[0], 3);
        assert!(key.as_bytes()[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn accept_fee_adds_requested_qu() {
        let fees = FeeSchedule::default();
        let deal = Deal {
            requested: DealSide::new(42),
            offered: DealSide::new(9_999),
            ..Default::default()
        };
        assert_eq!(fees.accept_amount(&deal).unwrap(), DEFAULT_OPERATION_FEE + 42);
        assert_eq!(
            fees.create_amount(&deal.offered).unwrap(),
            DEFAULT_OPERATION_FEE + 9_999
        );
    }

    #[test]
    fn negative_qu_is_rejected() {
        let fees = FeeSchedule::default();
        assert!(matches!(
            fees.create_amount(&DealSide::new(-1)),
            Err(EscrowError::Fee(_))
        ));
        let fees = FeeSchedule {
            create_fee: u64::MAX,
            ..Default::default()
        };
        assert!(fees.create_amount(&DealSide::new(1)).is_err());
    }

    #[test]
    fn builds_signed_envelope() {
        let keys = KeyPair::from_seed(SEED).unwrap();
        let builder = TransactionBuilder::new(3);
        let request = DealRequest::Cancel { index: 12 };
        let tx = builder
            .build(&keys, request.operation(), 1_000, 500, request.payload().unwrap())
            .unwrap();

        let env = &tx.envelope;
        assert_eq!(env.source(), keys.public_key());
        assert_eq!(env.destination(), contract_public_key(3));
        assert_eq!(env.header.input_type, 5);
        assert_eq!(env.header.input_size, 8);
        assert_eq!(env.tick(), 500);

        let unsigned = env.unsigned_bytes().unwrap();
        assert_eq!(unsigned.len(), 80 + 8);
        assert_eq!(tx.digest, crate::crypto::digest(&unsigned));
        assert!(verify_signature(&keys.public_key(), &tx.digest, &env.signature));

        let signed = env.to_bytes().unwrap();
        assert_eq!(tx.id.0, crate::crypto::digest(&signed));
        assert_eq!(tx.id.to_string().len(), 60);
    }

    #[test]
    fn broadcast_packet_has_zero_dejavu() {
        let keys = KeyPair::from_seed(SEED).unwrap();
        let request = DealRequest::Open { index: 1 };
        let tx = TransactionBuilder::new(3)
            .build(&keys, request.operation(), 0, 1, request.payload().unwrap())
            .unwrap();
        let packet = tx.envelope.to_packet().unwrap();

        assert_eq!(packet.len(), 8 + 80 + 8 + 64);
        assert_eq!(&packet[..3], &(packet.len() as u32).to_le_bytes()[..3]);
        assert_eq!(packet[3], packet_type::BROADCAST_TRANSACTION);
        assert_eq!(&packet[4..8], &[0, 0, 0, 0]);
    }
}
