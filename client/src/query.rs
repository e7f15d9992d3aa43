//! Read-only call of the contract's get-deals function.

use escrow_core::codec::{self, packet_type, GET_DEALS_FUNCTION};
use escrow_core::{DealListing, PublicKey};
use tracing::debug;

use crate::error::Result;
use crate::transport::{random_dejavu, receive_body, NodeConnection};

/// Deals owned by, proposed to, or opened to everyone, as seen by `owner`.
pub async fn query_deals(
    conn: &mut dyn NodeConnection,
    contract_index: u32,
    owner: &PublicKey,
) -> Result<DealListing> {
    let input = codec::encode_query_owner_input(owner)?;
    let request =
        codec::contract_function_request(contract_index, GET_DEALS_FUNCTION, &input, random_dejavu())?;
    conn.send(&request).await?;

    let body = receive_body(conn, packet_type::RESPOND_CONTRACT_FUNCTION).await?;
    let listing = codec::decode_deal_listing_response(&body)?;
    debug!(
        counter = listing.counter,
        owned = listing.owned.len(),
        proposed = listing.proposed.len(),
        opened = listing.opened.len(),
        "Fetched deals"
    );
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use escrow_core::codec::{ContractFunctionRequest, PacketHeader, WireFormat};
    use escrow_core::{Deal, DealEntity, DealSide};

    use super::*;
    use crate::error::ClientError;
    use crate::transport::testing::ScriptedNode;
    use crate::transport::Connector;

    #[tokio::test]
    async fn request_carries_owner_and_function() {
        let owner = PublicKey([5; 32]);
        let mut listing = DealListing {
            counter: 3,
            ..Default::default()
        };
        listing
            .opened
            .push(DealEntity {
                index: 2,
                deal: Deal {
                    offered: DealSide::new(10),
                    ..Default::default()
                },
            })
            .unwrap();

        let node = ScriptedNode::new();
        node.respond_listing(&listing);
        let mut conn = node.connect().await.unwrap();
        let fetched = query_deals(conn.as_mut(), 3, &owner).await.unwrap();
        assert_eq!(fetched, listing);

        let sent = &node.sent()[0];
        let header = PacketHeader::from_wire(&sent[..8]).unwrap();
        assert_eq!(header.packet_type(), packet_type::REQUEST_CONTRACT_FUNCTION);
        assert_ne!(header.dejavu(), 0);
        assert_eq!(header.size(), 8 + 8 + 32);

        let request = ContractFunctionRequest::from_wire(&sent[8..16]).unwrap();
        assert_eq!(request.contract_index, 3);
        assert_eq!(request.input_type, GET_DEALS_FUNCTION);
        assert_eq!(request.input_size, 32);
        assert_eq!(&sent[16..], owner.as_bytes());
    }

    #[tokio::test]
    async fn short_response_is_malformed() {
        let node = ScriptedNode::new();
        node.respond(codec::frame(packet_type::RESPOND_CONTRACT_FUNCTION, 1, &[0; 64]).unwrap());
        let mut conn = node.connect().await.unwrap();
        let res = query_deals(conn.as_mut(), 3, &PublicKey::ZERO).await;
        assert!(matches!(res, Err(ClientError::MalformedResponse(_))));
    }
}
