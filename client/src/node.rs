use escrow_core::codec::{self, packet_type, CurrentTickInfo};
use tracing::debug;

use crate::error::Result;
use crate::transport::{random_dejavu, receive_typed, NodeConnection};

/// Ask the node for its current tick.
pub async fn current_tick(conn: &mut dyn NodeConnection) -> Result<u32> {
    conn.send(&codec::tick_info_request(random_dejavu())?).await?;
    let info: CurrentTickInfo = receive_typed(conn, packet_type::RESPOND_CURRENT_TICK_INFO).await?;
    debug!(tick = info.tick, epoch = info.epoch, "Fetched current tick");
    Ok(info.tick)
}

#[cfg(test)]
mod tests {
    use escrow_core::codec::{PacketHeader, WireFormat};

    use super::*;
    use crate::transport::testing::ScriptedNode;
    use crate::transport::Connector;

    #[tokio::test]
    async fn sends_tagged_request_and_reads_tick() {
        let node = ScriptedNode::new();
        node.respond_tick(4_242);

        let mut conn = node.connect().await.unwrap();
        assert_eq!(current_tick(conn.as_mut()).await.unwrap(), 4_242);

        let sent = node.sent();
        assert_eq!(sent.len(), 1);
        let header = PacketHeader::from_wire(&sent[0]).unwrap();
        assert_eq!(header.packet_type(), packet_type::REQUEST_CURRENT_TICK_INFO);
        assert_eq!(header.size(), PacketHeader::SIZE);
        assert_ne!(header.dejavu(), 0);
    }
}
