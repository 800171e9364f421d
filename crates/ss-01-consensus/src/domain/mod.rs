//! Domain layer for the consensus subsystem
//!
//! - validator: registry, snapshots and stake bookkeeping
//! - selection: deterministic stake-weighted proposer selection
//! - block / chain: block layout, genesis and the append-only chain
//! - slashing: equivocation detection
//! - pool: pending transactions awaiting inclusion

mod block;
mod chain;
mod config;
mod error;
mod pool;
mod selection;
mod slashing;
mod validator;

pub use block::*;
pub use chain::*;
pub use config::*;
pub use error::*;
pub use pool::*;
pub use selection::*;
pub use slashing::*;
pub use validator::*;
