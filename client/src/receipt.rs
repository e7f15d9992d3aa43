use std::fmt;

use escrow_core::{Operation, SignedTransaction};
use serde::Serialize;

/// What was broadcast, and where to look for it.
///
/// Broadcasting only hands the transaction to the node; inclusion is
/// confirmed by checking the scheduled tick once it has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxReceipt {
    pub operation: String,
    pub tx_id: String,
    pub source: String,
    pub destination: String,
    pub amount: u64,
    pub input_type: u16,
    pub input_size: u16,
    /// Tick the node reported before the transaction was built.
    pub current_tick: u32,
    pub scheduled_tick: u32,
}

impl TxReceipt {
    pub fn new(operation: Operation, tx: &SignedTransaction, current_tick: u32) -> Self {
        let header = &tx.envelope.header;
        Self {
            operation: operation.to_string(),
            tx_id: tx.id.to_string(),
            source: tx.envelope.source().to_identity(),
            destination: tx.envelope.destination().to_identity(),
            amount: header.amount,
            input_type: header.input_type,
            input_size: header.input_size,
            current_tick,
            scheduled_tick: header.tick,
        }
    }
}

impl fmt::Display for TxReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "~~~~~RECEIPT~~~~~")?;
        writeln!(f, "TxHash: {}", self.tx_id)?;
        writeln!(f, "From: {}", self.source)?;
        writeln!(f, "To: {}", self.destination)?;
        writeln!(f, "Input type: {} ({})", self.input_type, self.operation)?;
        writeln!(f, "Amount: {}", self.amount)?;
        writeln!(f, "Tick: {}", self.scheduled_tick)?;
        writeln!(f, "Extra data size: {}", self.input_size)?;
        writeln!(f, "~~~~~END-RECEIPT~~~~~")?;
        write!(
            f,
            "Current tick is {}. Check tick {} for transaction {} to confirm it was included.",
            self.current_tick, self.scheduled_tick, self.tx_id
        )
    }
}
