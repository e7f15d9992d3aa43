//! Byte-exact layouts of every packet exchanged with a node.
//!
//! All structures are fixed size: arrays are written at full capacity with
//! zero-filled unused slots, and the padding the contract's natural alignment
//! introduces is spelled out as explicit zero bytes. Integers are
//! little-endian. Counts read back from the node are untrusted and clamped.

use bincode::config::{self, Configuration, Fixint, LittleEndian, NoLimit};
use bincode::{Decode, Encode};

use crate::asset::{AssetAmount, AssetName, DealSide, MAX_ASSETS_PER_SIDE};
use crate::bounded::Bounded;
use crate::deal::{
    Deal, DealEntity, DealListing, OPENED_DEALS_CAPACITY, OWNED_DEALS_CAPACITY,
    PROPOSED_DEALS_CAPACITY,
};
use crate::identity::PublicKey;
use crate::{EscrowError, Result};

/// Packet type tags carried in [`PacketHeader`].
pub mod packet_type {
    pub const BROADCAST_TRANSACTION: u8 = 24;
    pub const REQUEST_CURRENT_TICK_INFO: u8 = 27;
    pub const RESPOND_CURRENT_TICK_INFO: u8 = 28;
    pub const REQUEST_CONTRACT_FUNCTION: u8 = 42;
    pub const RESPOND_CONTRACT_FUNCTION: u8 = 43;
}

/// Contract function returning the deal listing of an owner.
pub const GET_DEALS_FUNCTION: u16 = 2;

/// Largest packet expressible by the 24-bit size field.
pub const MAX_PACKET_SIZE: usize = 0xFF_FFFF;

fn wire_config() -> Configuration<LittleEndian, Fixint, NoLimit> {
    config::legacy()
}

/// A structure with a single, fixed wire size.
pub trait WireFormat: Encode + Decode<()> + Sized {
    const SIZE: usize;

    fn to_wire(&self) -> Result<Vec<u8>> {
        let bytes = bincode::encode_to_vec(self, wire_config())?;
        if bytes.len() != Self::SIZE {
            return Err(EscrowError::Encode(format!(
                "layout produced {} bytes, expected {}",
                bytes.len(),
                Self::SIZE
            )));
        }
        Ok(bytes)
    }

    /// Decode from exactly [`Self::SIZE`] bytes.
    fn from_wire(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(EscrowError::MalformedResponse {
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        let (value, read) = bincode::decode_from_slice(bytes, wire_config())?;
        if read != Self::SIZE {
            return Err(EscrowError::MalformedResponse {
                expected: Self::SIZE,
                actual: read,
            });
        }
        Ok(value)
    }
}

/// Framing header preceding every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct PacketHeader {
    size: [u8; 3],
    packet_type: u8,
    dejavu: u32,
}

impl PacketHeader {
    /// `total_size` includes the header itself.
    pub fn new(total_size: usize, packet_type: u8, dejavu: u32) -> Result<Self> {
        if !(Self::SIZE..=MAX_PACKET_SIZE).contains(&total_size) {
            return Err(EscrowError::Encode(format!(
                "packet size {total_size} outside {}..={MAX_PACKET_SIZE}",
                Self::SIZE
            )));
        }
        let [a, b, c, _] = (total_size as u32).to_le_bytes();
        Ok(Self {
            size: [a, b, c],
            packet_type,
            dejavu,
        })
    }

    pub fn size(&self) -> usize {
        let [a, b, c] = self.size;
        u32::from_le_bytes([a, b, c, 0]) as usize
    }

    /// Bytes following the header, `None` if the declared size is too small.
    pub fn body_size(&self) -> Option<usize> {
        self.size().checked_sub(Self::SIZE)
    }

    pub fn packet_type(&self) -> u8 {
        self.packet_type
    }

    pub fn dejavu(&self) -> u32 {
        self.dejavu
    }
}

impl WireFormat for PacketHeader {
    const SIZE: usize = 8;
}

/// Prefix `body` with a packet header.
pub fn frame(packet_type: u8, dejavu: u32, body: &[u8]) -> Result<Vec<u8>> {
    let header = PacketHeader::new(PacketHeader::SIZE + body.len(), packet_type, dejavu)?;
    let mut packet = header.to_wire()?;
    packet.extend_from_slice(body);
    Ok(packet)
}

/// Signed part of a transaction preceding its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct TransactionHeader {
    pub source: [u8; 32],
    pub destination: [u8; 32],
    pub amount: u64,
    pub tick: u32,
    pub input_type: u16,
    pub input_size: u16,
}

impl WireFormat for TransactionHeader {
    const SIZE: usize = 80;
}

/// Read-only contract function call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct ContractFunctionRequest {
    pub contract_index: u32,
    pub input_type: u16,
    pub input_size: u16,
}

impl WireFormat for ContractFunctionRequest {
    const SIZE: usize = 8;
}

/// Node answer to a current tick request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct CurrentTickInfo {
    pub tick_duration: u16,
    pub epoch: u16,
    pub tick: u32,
    pub aligned_votes: u16,
    pub misaligned_votes: u16,
    pub initial_tick: u32,
}

impl WireFormat for CurrentTickInfo {
    const SIZE: usize = 16;
}

/// Packet asking a node for its current tick.
pub fn tick_info_request(dejavu: u32) -> Result<Vec<u8>> {
    frame(packet_type::REQUEST_CURRENT_TICK_INFO, dejavu, &[])
}

/// Packet calling contract function `input_type` with `input`.
pub fn contract_function_request(
    contract_index: u32,
    input_type: u16,
    input: &[u8],
    dejavu: u32,
) -> Result<Vec<u8>> {
    let input_size = u16::try_from(input.len())
        .map_err(|_| EscrowError::Encode(format!("function input of {} bytes", input.len())))?;
    let request = ContractFunctionRequest {
        contract_index,
        input_type,
        input_size,
    };
    let mut body = request.to_wire()?;
    body.extend_from_slice(input);
    frame(packet_type::REQUEST_CONTRACT_FUNCTION, dejavu, &body)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
struct WireAsset {
    issuer: [u8; 32],
    name: [u8; 8],
    amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
struct WireDealSide {
    assets: [WireAsset; MAX_ASSETS_PER_SIDE],
    count: i8,
    padding: [u8; 7],
    qu: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
struct WireDeal {
    acceptor: [u8; 32],
    offered: WireDealSide,
    requested: WireDealSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
struct WireDealEntity {
    index: i64,
    deal: WireDeal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
struct CreateDealInput {
    delta: i64,
    acceptor: [u8; 32],
    offered: WireDealSide,
    requested: WireDealSide,
}

impl WireFormat for CreateDealInput {
    const SIZE: usize = 456;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
struct OperateDealInput {
    index: i64,
}

impl WireFormat for OperateDealInput {
    const SIZE: usize = 8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
struct GetDealsInput {
    owner: [u8; 32],
}

impl WireFormat for GetDealsInput {
    const SIZE: usize = 32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
struct GetDealsOutput {
    counter: i64,
    owned_count: i64,
    proposed_count: i64,
    opened_count: i64,
    owned: [WireDealEntity; OWNED_DEALS_CAPACITY],
    proposed: [WireDealEntity; PROPOSED_DEALS_CAPACITY],
    opened: [WireDealEntity; OPENED_DEALS_CAPACITY],
}

impl WireFormat for GetDealsOutput {
    const SIZE: usize = 21_920;
}

/// Wire size of a deal listing response body.
pub const DEAL_LISTING_RESPONSE_SIZE: usize = GetDealsOutput::SIZE;

impl From<&AssetAmount> for WireAsset {
    fn from(asset: &AssetAmount) -> Self {
        Self {
            issuer: *asset.issuer().as_bytes(),
            name: *asset.name().as_bytes(),
            amount: asset.amount(),
        }
    }
}

impl From<WireAsset> for AssetAmount {
    fn from(wire: WireAsset) -> Self {
        AssetAmount::new(
            PublicKey::from_bytes(wire.issuer),
            AssetName::from_bytes(wire.name),
            wire.amount,
        )
    }
}

impl From<&DealSide> for WireDealSide {
    fn from(side: &DealSide) -> Self {
        Self {
            assets: side
                .bounded_assets()
                .to_backing()
                .map(|asset| WireAsset::from(&asset)),
            count: side.asset_count() as i8,
            padding: [0u8; 7],
            qu: side.qu(),
        }
    }
}

impl From<WireDealSide> for DealSide {
    fn from(wire: WireDealSide) -> Self {
        let assets = Bounded::from_backing(wire.assets.map(AssetAmount::from), i64::from(wire.count));
        DealSide::from_parts(assets, wire.qu)
    }
}

impl From<&DealEntity> for WireDealEntity {
    fn from(entity: &DealEntity) -> Self {
        Self {
            index: entity.index,
            deal: WireDeal {
                acceptor: *entity.deal.acceptor.as_bytes(),
                offered: WireDealSide::from(&entity.deal.offered),
                requested: WireDealSide::from(&entity.deal.requested),
            },
        }
    }
}

impl From<WireDealEntity> for DealEntity {
    fn from(wire: WireDealEntity) -> Self {
        Self {
            index: wire.index,
            deal: Deal {
                acceptor: PublicKey::from_bytes(wire.deal.acceptor),
                offered: wire.deal.offered.into(),
                requested: wire.deal.requested.into(),
            },
        }
    }
}

fn entities_from_wire<const N: usize>(
    slots: [WireDealEntity; N],
    declared: i64,
) -> Bounded<DealEntity, N> {
    Bounded::from_backing(slots.map(DealEntity::from), declared)
}

fn entities_to_wire<const N: usize>(list: &Bounded<DealEntity, N>) -> [WireDealEntity; N] {
    list.to_backing().map(|entity| WireDealEntity::from(&entity))
}

/// Payload of a create-deal transaction.
pub fn encode_create_deal_input(
    delta: i64,
    acceptor: &PublicKey,
    offered: &DealSide,
    requested: &DealSide,
) -> Result<Vec<u8>> {
    CreateDealInput {
        delta,
        acceptor: *acceptor.as_bytes(),
        offered: offered.into(),
        requested: requested.into(),
    }
    .to_wire()
}

/// Payload shared by accept, cancel and open transactions.
pub fn encode_operate_deal_input(index: i64) -> Result<Vec<u8>> {
    OperateDealInput { index }.to_wire()
}

/// Input of the get-deals contract function.
pub fn encode_query_owner_input(owner: &PublicKey) -> Result<Vec<u8>> {
    GetDealsInput {
        owner: *owner.as_bytes(),
    }
    .to_wire()
}

/// Decode a get-deals response body.
///
/// # Errors
///
/// [`EscrowError::MalformedResponse`] unless `bytes` is exactly
/// [`DEAL_LISTING_RESPONSE_SIZE`] long.
pub fn decode_deal_listing_response(bytes: &[u8]) -> Result<DealListing> {
    let out = GetDealsOutput::from_wire(bytes)?;
    Ok(DealListing {
        counter: out.counter,
        owned: entities_from_wire(out.owned, out.owned_count),
        proposed: entities_from_wire(out.proposed, out.proposed_count),
        opened: entities_from_wire(out.opened, out.opened_count),
    })
}

/// Lay a listing out the way the contract answers a get-deals call.
pub fn encode_deal_listing_response(listing: &DealListing) -> Result<Vec<u8>> {
    GetDealsOutput {
        counter: listing.counter,
        owned_count: listing.owned.len() as i64,
        proposed_count: listing.proposed.len() as i64,
        opened_count: listing.opened.len() as i64,
        owned: entities_to_wire(&listing.owned),
        proposed: entities_to_wire(&listing.proposed),
        opened: entities_to_wire(&listing.opened),
    }
    .to_wire()
}
