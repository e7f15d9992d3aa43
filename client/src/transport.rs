//! Framed packet exchange with a node.

use std::future::Future;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use escrow_core::codec::{PacketHeader, WireFormat};
use rand::Rng;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::error::{ClientError, Result};

/// Packets of other types tolerated while waiting for a response.
const MAX_SKIPPED_PACKETS: usize = 16;

/// An open, bidirectional packet stream to a node.
#[async_trait]
pub trait NodeConnection: Send {
    /// Write one complete packet.
    async fn send(&mut self, packet: &[u8]) -> Result<()>;

    /// Read the next packet: its header and exactly `size - 8` body bytes.
    async fn receive_packet(&mut self) -> Result<(PacketHeader, Vec<u8>)>;
}

/// Opens connections to a node.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn NodeConnection>>;
}

/// TCP connector with one timeout for connecting, reading and writing.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpConnector {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> Result<Box<dyn NodeConnection>> {
        let addr = self.addr();
        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))?
            .map_err(|source| ClientError::Connection {
                addr: addr.clone(),
                source,
            })?;
        debug!(%addr, "Connected to node");
        Ok(Box::new(TcpConnection {
            stream,
            timeout: self.timeout,
        }))
    }
}

pub struct TcpConnection {
    stream: TcpStream,
    timeout: Duration,
}

#[async_trait]
impl NodeConnection for TcpConnection {
    async fn send(&mut self, packet: &[u8]) -> Result<()> {
        with_timeout(self.timeout, self.stream.write_all(packet)).await?;
        trace!(bytes = packet.len(), "Sent packet");
        Ok(())
    }

    async fn receive_packet(&mut self) -> Result<(PacketHeader, Vec<u8>)> {
        let mut head = [0u8; PacketHeader::SIZE];
        with_timeout(self.timeout, self.stream.read_exact(&mut head)).await?;
        let header = PacketHeader::from_wire(&head)?;

        let body_size = header.body_size().ok_or_else(|| {
            ClientError::MalformedResponse(format!("packet declares {} bytes", header.size()))
        })?;
        let mut body = vec![0u8; body_size];
        with_timeout(self.timeout, self.stream.read_exact(&mut body)).await?;
        trace!(
            packet_type = header.packet_type(),
            bytes = header.size(),
            "Received packet"
        );
        Ok((header, body))
    }
}

async fn with_timeout<F, T>(timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| ClientError::Timeout(timeout))?
        .map_err(ClientError::from)
}

/// Non-zero tag marking a request; broadcasts use zero.
pub fn random_dejavu() -> u32 {
    rand::thread_rng().gen_range(1..=u32::MAX)
}

/// Body of the next packet of `packet_type`, skipping unrelated traffic.
pub async fn receive_body(conn: &mut dyn NodeConnection, packet_type: u8) -> Result<Vec<u8>> {
    for _ in 0..=MAX_SKIPPED_PACKETS {
        let (header, body) = conn.receive_packet().await?;
        if header.packet_type() == packet_type {
            return Ok(body);
        }
        debug!(
            expected = packet_type,
            received = header.packet_type(),
            "Skipping unrelated packet"
        );
    }
    Err(ClientError::MalformedResponse(format!(
        "no packet of type {packet_type} within {MAX_SKIPPED_PACKETS} unrelated packets"
    )))
}

/// Next packet of `packet_type`, decoded as `T`.
pub async fn receive_typed<T: WireFormat>(
    conn: &mut dyn NodeConnection,
    packet_type: u8,
) -> Result<T> {
    let body = receive_body(conn, packet_type).await?;
    Ok(T::from_wire(&body)?)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use escrow_core::codec::{self, packet_type, CurrentTickInfo};
    use escrow_core::DealListing;

    use super::*;

    #[derive(Default)]
    struct Script {
        responses: VecDeque<Vec<u8>>,
        sent: Vec<Vec<u8>>,
        connections: usize,
        refuse: bool,
    }

    /// In-memory node answering with queued packets, in order.
    #[derive(Clone, Default)]
    pub struct ScriptedNode {
        script: Arc<Mutex<Script>>,
    }

    impl ScriptedNode {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn refusing() -> Self {
            let node = Self::default();
            node.script.lock().unwrap().refuse = true;
            node
        }

        pub fn respond(&self, packet: Vec<u8>) {
            self.script.lock().unwrap().responses.push_back(packet);
        }

        pub fn respond_tick(&self, tick: u32) {
            let info = CurrentTickInfo {
                tick,
                epoch: 120,
                ..Default::default()
            };
            let body = info.to_wire().unwrap();
            self.respond(codec::frame(packet_type::RESPOND_CURRENT_TICK_INFO, 1, &body).unwrap());
        }

        pub fn respond_listing(&self, listing: &DealListing) {
            let body = codec::encode_deal_listing_response(listing).unwrap();
            self.respond(codec::frame(packet_type::RESPOND_CONTRACT_FUNCTION, 1, &body).unwrap());
        }

        pub fn sent(&self) -> Vec<Vec<u8>> {
            self.script.lock().unwrap().sent.clone()
        }

        pub fn connections(&self) -> usize {
            self.script.lock().unwrap().connections
        }
    }

    #[async_trait]
    impl Connector for ScriptedNode {
        async fn connect(&self) -> Result<Box<dyn NodeConnection>> {
            let mut script = self.script.lock().unwrap();
            if script.refuse {
                return Err(ClientError::Connection {
                    addr: "scripted".to_string(),
                    source: io::ErrorKind::ConnectionRefused.into(),
                });
            }
            script.connections += 1;
            Ok(Box::new(ScriptedConnection {
                script: Arc::clone(&self.script),
            }))
        }
    }

    struct ScriptedConnection {
        script: Arc<Mutex<Script>>,
    }

    #[async_trait]
    impl NodeConnection for ScriptedConnection {
        async fn send(&mut self, packet: &[u8]) -> Result<()> {
            self.script.lock().unwrap().sent.push(packet.to_vec());
            Ok(())
        }

        async fn receive_packet(&mut self) -> Result<(PacketHeader, Vec<u8>)> {
            let packet = self
                .script
                .lock()
                .unwrap()
                .responses
                .pop_front()
                .ok_or_else(|| ClientError::Io(io::ErrorKind::UnexpectedEof.into()))?;
            let header = PacketHeader::from_wire(&packet[..PacketHeader::SIZE])?;
            Ok((header, packet[PacketHeader::SIZE..].to_vec()))
        }
    }
}
