//! Anchoring configuration

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// Address of the commitment registry contract
    pub registry_address: String,
    /// ABI of the registry contract, as JSON
    pub registry_abi: String,
}

/// Minimal ABI exposing the three registry methods.
pub const DEFAULT_REGISTRY_ABI: &str = r#"[
  {"type":"function","name":"commitBlock","inputs":[{"name":"shardId","type":"uint16"},{"name":"height","type":"uint64"},{"name":"blockHash","type":"bytes32"},{"name":"contentId","type":"string"}]},
  {"type":"function","name":"commitBatch","inputs":[{"name":"batchId","type":"uint64"},{"name":"shardId","type":"uint16"},{"name":"stateRoot","type":"bytes32"},{"name":"contentId","type":"string"}]},
  {"type":"function","name":"resolveBatch","inputs":[{"name":"batchId","type":"uint64"},{"name":"verified","type":"bool"},{"name":"contentId","type":"string"}]}
]"#;

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            registry_address: format!("0x{}", "0".repeat(40)),
            registry_abi: DEFAULT_REGISTRY_ABI.to_string(),
        }
    }
}
