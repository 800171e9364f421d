//! # Stakeshard Node
//!
//! Boots a ledger node from `SS_*` environment variables and runs it until
//! interrupted.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (`SS_LOG_*`)
//! 2. Load and validate configuration
//! 3. Fall back to a development validator set if none is configured
//! 4. Create the configured shards, each with its genesis block
//! 5. Start the rollup sweeper and commitment anchor
//! 6. In development mode, propose a block on every shard each interval

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use ledger_telemetry::{init_telemetry, TelemetryConfig};
use node_runtime::{DevGenesis, LedgerNode, NodeConfig};
use ss_01_consensus::{SystemTimeSource, TimeSource};

const DEV_VALIDATORS: u8 = 4;
const DEV_STAKE: u128 = 1_000;
const DEV_BLOCK_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env()).context("Failed to initialize logging")?;

    let mut config = NodeConfig::from_env().context("Invalid node configuration")?;

    let dev_genesis = if config.sharding.seed_validators.is_empty() {
        warn!(
            validators = DEV_VALIDATORS,
            "No SS_GENESIS_VALIDATORS configured, using development validator set"
        );
        let genesis = DevGenesis::new(DEV_VALIDATORS, DEV_STAKE);
        config.sharding.seed_validators = genesis.validators.clone();
        Some(genesis)
    } else {
        None
    };
    if config.prover_keys.is_empty() {
        warn!("No SS_PROVER_KEYS configured, every batch proof will be rejected");
    }

    info!("===========================================");
    info!("  Stakeshard Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let node = LedgerNode::new(config).context("Failed to boot ledger node")?;
    let tasks = node.start();
    info!(shards = ?node.sharding().shard_ids(), "Node running");

    match dev_genesis {
        Some(genesis) => {
            tokio::select! {
                _ = produce_dev_blocks(&node, &genesis) => {}
                result = tokio::signal::ctrl_c() => result.context("Failed to listen for ctrl-c")?,
            }
        }
        None => tokio::signal::ctrl_c().await.context("Failed to listen for ctrl-c")?,
    }

    info!("Initiating graceful shutdown...");
    tasks.shutdown().await;
    info!(global_state_root = %hex::encode(node.global_state_root().root), "Shutdown complete");
    Ok(())
}

/// Propose a block on every healthy shard each interval, as whichever
/// development validator the selector picks.
async fn produce_dev_blocks(node: &LedgerNode, genesis: &DevGenesis) {
    let mut ticker = tokio::time::interval(DEV_BLOCK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        for shard_id in node.sharding().shard_ids() {
            let proposer = match node.sharding().expected_proposer(shard_id) {
                Ok(address) => address,
                Err(e) => {
                    warn!(shard_id, "No proposer available: {}", e);
                    continue;
                }
            };
            let Some(signer) = genesis.signer(&proposer) else {
                debug!(shard_id, "Selected proposer is not a development validator");
                continue;
            };
            let timestamp = match node.get_chain_head(shard_id) {
                Ok(head) => SystemTimeSource.now().max(head.timestamp + 1),
                Err(e) => {
                    warn!(shard_id, "Cannot read chain head: {}", e);
                    continue;
                }
            };
            if let Err(e) = node.produce_block(shard_id, signer, timestamp) {
                warn!(shard_id, "Block production failed: {}", e);
            }
        }
    }
}
