//! Node endpoint, contract fees and timing, loaded from a JSON file.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use escrow_core::transaction::{DEFAULT_TICK_OFFSET, FeeSchedule};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "./escrow_config.json";
pub const DEFAULT_NODE_HOST: &str = "127.0.0.1";
pub const DEFAULT_NODE_PORT: u16 = 21841;
pub const DEFAULT_CONTRACT_INDEX: u32 = 3;
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Everything the client needs besides the signing seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub node: NodeConfig,
    pub contract: ContractConfig,
    /// Ticks added to the node's current tick when scheduling a transaction.
    pub tick_offset: u32,
    /// Applied to connecting and to every read and write.
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    pub contract_index: u32,
    #[serde(flatten)]
    pub fees: FeeSchedule,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node: NodeConfig::default(),
            contract: ContractConfig::default(),
            tick_offset: DEFAULT_TICK_OFFSET,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_NODE_HOST.to_string(),
            port: DEFAULT_NODE_PORT,
        }
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            contract_index: DEFAULT_CONTRACT_INDEX,
            fees: FeeSchedule::default(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Reject settings no request could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.node.host.trim().is_empty() {
            return Err(ClientError::Config("node host is empty".to_string()));
        }
        if self.node.port == 0 {
            return Err(ClientError::Config("node port is 0".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::Config("timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// Reads JSON from `path` into any deserializable type.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse as `T`.
pub fn load_config<P, T>(path: P) -> anyhow::Result<T>
where
    P: AsRef<Path>,
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).with_context(|| format!("loading config: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("parsing JSON from {:?}", path))
}

/// Writes `data` as pretty-printed JSON to `path`.
pub fn save_config<P, T>(path: P, data: &T) -> anyhow::Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating file {:?}", path))?;
    serde_json::to_writer_pretty(file, data)
        .with_context(|| format!("serializing to JSON to {:?}", path))
}
