//! Node client for the escrow deal contract.
//!
//! [`EscrowClient`] fetches deal listings and broadcasts signed deal
//! operations over any [`Connector`]; the `escrow-cli` binary wires it to
//! TCP and a JSON config file.

use escrow_core::{
    DealListing, DealRequest, DealSide, FeeSchedule, PublicKey, TransactionBuilder, TxSigner,
};
use tracing::{info, info_span, warn, Instrument};

use config::ClientConfig;
use error::{ClientError, Result};
use receipt::TxReceipt;
use transport::{Connector, TcpConnector};

pub mod config;
pub mod error;
pub mod node;
pub mod query;
pub mod receipt;
pub mod transport;

/// Builds, signs and broadcasts deal operations for one contract.
pub struct EscrowClient<C = TcpConnector> {
    connector: C,
    builder: TransactionBuilder,
    fees: FeeSchedule,
    tick_offset: u32,
}

impl EscrowClient<TcpConnector> {
    pub fn from_config(config: &ClientConfig) -> Self {
        let connector = TcpConnector::new(&config.node.host, config.node.port, config.timeout());
        Self::new(connector, config)
    }
}

impl<C: Connector> EscrowClient<C> {
    pub fn new(connector: C, config: &ClientConfig) -> Self {
        Self {
            connector,
            builder: TransactionBuilder::new(config.contract.contract_index),
            fees: config.contract.fees,
            tick_offset: config.tick_offset,
        }
    }

    pub fn contract_index(&self) -> u32 {
        self.builder.contract_index()
    }

    /// Listing of deals as seen by `owner`.
    ///
    /// # Errors
    ///
    /// Any failure to connect, exchange or decode is reported as
    /// [`ClientError::QueryFailed`], never as an empty listing.
    pub async fn deals(&self, owner: &PublicKey) -> Result<DealListing> {
        let span = info_span!("deals", owner = %owner);
        async {
            let mut conn = self.connector.connect().await?;
            query::query_deals(conn.as_mut(), self.contract_index(), owner).await
        }
        .instrument(span)
        .await
        .map_err(|e| {
            warn!(error = %e, "Deal query failed");
            ClientError::QueryFailed(Box::new(e))
        })
    }

    /// Propose a deal: escrow `offered` in exchange for `requested`.
    ///
    /// A zero `acceptor` leaves the deal open to anyone.
    pub async fn create_deal(
        &self,
        signer: &dyn TxSigner,
        delta: i64,
        acceptor: PublicKey,
        offered: DealSide,
        requested: DealSide,
    ) -> Result<TxReceipt> {
        self.submit(
            signer,
            DealRequest::Create {
                delta,
                acceptor,
                offered,
                requested,
            },
        )
        .await
    }

    /// Accept deal `index`, paying the QU it requests.
    ///
    /// The deal is looked up among those proposed to the signer and those
    /// opened to everyone, in that order.
    pub async fn accept_deal(&self, signer: &dyn TxSigner, index: i64) -> Result<TxReceipt> {
        self.submit(signer, DealRequest::Accept { index }).await
    }

    pub async fn cancel_deal(&self, signer: &dyn TxSigner, index: i64) -> Result<TxReceipt> {
        self.submit(signer, DealRequest::Cancel { index }).await
    }

    /// Open deal `index` to any acceptor.
    pub async fn open_deal(&self, signer: &dyn TxSigner, index: i64) -> Result<TxReceipt> {
        self.submit(signer, DealRequest::Open { index }).await
    }

    /// Sign `request` for the node's current tick plus the configured
    /// offset and broadcast it.
    ///
    /// Inputs are encoded and fees computed before the broadcast connection
    /// is opened. Accepting first looks the target deal up over a separate
    /// query connection.
    pub async fn submit(&self, signer: &dyn TxSigner, request: DealRequest) -> Result<TxReceipt> {
        let operation = request.operation();
        let span = info_span!(
            "deal_operation",
            %operation,
            source = %signer.public_key(),
            contract_index = self.contract_index()
        );

        async move {
            let payload = request.payload()?;
            let amount = match &request {
                DealRequest::Create { offered, .. } => self.fees.create_amount(offered)?,
                DealRequest::Cancel { .. } => self.fees.cancel_amount(),
                DealRequest::Open { .. } => self.fees.open_amount(),
                DealRequest::Accept { index } => {
                    let listing = self.deals(&signer.public_key()).await?;
                    let target = listing
                        .find_acceptable(*index)
                        .ok_or(ClientError::DealNotFound(*index))?;
                    self.fees.accept_amount(&target.deal)?
                }
            };

            let mut conn = self.connector.connect().await?;
            let current_tick = node::current_tick(conn.as_mut()).await?;
            let scheduled_tick = current_tick.saturating_add(self.tick_offset);
            let tx = self
                .builder
                .build(signer, operation, amount, scheduled_tick, payload)?;
            conn.send(&tx.envelope.to_packet()?).await?;

            info!(tx_id = %tx.id, current_tick, scheduled_tick, amount, "Transaction broadcast");
            Ok(TxReceipt::new(operation, &tx, current_tick))
        }
        .instrument(span)
        .await
    }
}
