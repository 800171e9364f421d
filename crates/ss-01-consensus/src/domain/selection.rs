//! Deterministic stake-weighted proposer selection
//!
//! Active validators are laid out in address order as consecutive ranges
//! whose widths equal their stakes. `seed mod total_stake` lands in exactly
//! one range; its owner is the proposer. The same snapshot and seed always
//! produce the same validator.

use super::{RegistrySnapshot, SelectionError, SnapshotEntry};
use shared_crypto::Keccak256Hasher;
use shared_types::Hash;

const SEED_DOMAIN: &[u8] = b"stakeshard/proposer-seed";

/// Selection seed for the block at `height` built on `previous_hash`.
///
/// Unknown until the parent exists, and distinct per height.
pub fn derive_seed(height: u64, previous_hash: &Hash) -> u128 {
    let mut hasher = Keccak256Hasher::new();
    hasher
        .update(SEED_DOMAIN)
        .update(height.to_le_bytes())
        .update(previous_hash);
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    u128::from_le_bytes(bytes)
}

pub struct StakeWeightedSelector;

impl StakeWeightedSelector {
    pub fn select(snapshot: &RegistrySnapshot, seed: u128) -> Result<&SnapshotEntry, SelectionError> {
        if snapshot.active().next().is_none() {
            return Err(SelectionError::NoEligibleValidators);
        }

        let total = snapshot.total_active_stake()?;
        if total == 0 {
            return Err(SelectionError::ZeroTotalStake);
        }

        let target = seed % total;
        let mut upper = 0u128;
        for entry in snapshot.active() {
            // Cannot overflow: the running sum never exceeds `total`.
            upper += entry.stake;
            if target < upper {
                return Ok(entry);
            }
        }

        Err(SelectionError::NoEligibleValidators)
    }
}
