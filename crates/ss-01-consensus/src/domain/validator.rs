//! Validator registry and point-in-time snapshots

use super::{RegistrationError, SelectionError};
use serde::{Deserialize, Serialize};
use shared_types::{Address, PublicKey};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidatorStatus {
    Active,
    Slashed,
    Exited,
}

/// Why a validator leaves the active set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalReason {
    Exited,
    Slashed,
}

impl From<RemovalReason> for ValidatorStatus {
    fn from(reason: RemovalReason) -> Self {
        match reason {
            RemovalReason::Exited => ValidatorStatus::Exited,
            RemovalReason::Slashed => ValidatorStatus::Slashed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub address: Address,
    pub stake: u128,
    pub public_key: PublicKey,
    pub status: ValidatorStatus,
}

impl Validator {
    pub fn is_active(&self) -> bool {
        self.status == ValidatorStatus::Active
    }
}

/// Validator identities, stakes and keys for one chain.
///
/// Removed validators stay in the registry with status `Exited` or
/// `Slashed` so historic block signatures can still be audited.
///
/// Delegated stake is tracked per (validator, delegator) and counts towards
/// the validator's selection weight while it is active. It never changes the
/// validator's own `stake`.
#[derive(Clone, Debug, Default)]
pub struct ValidatorRegistry {
    validators: BTreeMap<Address, Validator>,
    delegations: BTreeMap<Address, BTreeMap<Address, u128>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new active validator.
    pub fn register(
        &mut self,
        address: Address,
        stake: u128,
        public_key: PublicKey,
    ) -> Result<(), RegistrationError> {
        if self.validators.contains_key(&address) {
            return Err(RegistrationError::Duplicate(address));
        }
        if stake == 0 {
            return Err(RegistrationError::InvalidStake {
                address,
                reason: "initial stake must be positive",
            });
        }
        if public_key.is_empty() {
            return Err(RegistrationError::InvalidPublicKey(address));
        }

        self.validators.insert(
            address,
            Validator {
                address,
                stake,
                public_key,
                status: ValidatorStatus::Active,
            },
        );
        Ok(())
    }

    /// Apply a signed stake change. Returns the new stake.
    pub fn update_stake(&mut self, address: &Address, delta: i128) -> Result<u128, RegistrationError> {
        let validator = self
            .validators
            .get_mut(address)
            .ok_or(RegistrationError::UnknownValidator(*address))?;
        if !validator.is_active() {
            return Err(RegistrationError::Inactive(*address));
        }

        let updated = if delta >= 0 {
            validator
                .stake
                .checked_add(delta.unsigned_abs())
                .ok_or(RegistrationError::StakeOverflow(*address))?
        } else {
            validator
                .stake
                .checked_sub(delta.unsigned_abs())
                .ok_or(RegistrationError::InvalidStake {
                    address: *address,
                    reason: "stake would become negative",
                })?
        };

        validator.stake = updated;
        Ok(updated)
    }

    /// Bond `amount` from `delegator` to an active validator. Returns the
    /// delegator's total bonded to that validator.
    pub fn delegate_stake(
        &mut self,
        delegator: Address,
        validator: &Address,
        amount: u128,
    ) -> Result<u128, RegistrationError> {
        if amount == 0 {
            return Err(RegistrationError::InvalidStake {
                address: *validator,
                reason: "delegation must be positive",
            });
        }
        let target = self
            .validators
            .get(validator)
            .ok_or(RegistrationError::UnknownValidator(*validator))?;
        if !target.is_active() {
            return Err(RegistrationError::Inactive(*validator));
        }
        // Weight must stay representable.
        self.weight_of(target)
            .checked_add(amount)
            .ok_or(RegistrationError::StakeOverflow(*validator))?;

        let bonded = self
            .delegations
            .entry(*validator)
            .or_default()
            .entry(delegator)
            .or_default();
        *bonded += amount;
        Ok(*bonded)
    }

    /// Withdraw everything `delegator` bonded to `validator`, whatever the
    /// validator's status. Returns the amount released, zero if none.
    pub fn revoke_delegation(
        &mut self,
        delegator: &Address,
        validator: &Address,
    ) -> Result<u128, RegistrationError> {
        if !self.validators.contains_key(validator) {
            return Err(RegistrationError::UnknownValidator(*validator));
        }
        let Some(bonds) = self.delegations.get_mut(validator) else {
            return Ok(0);
        };
        let released = bonds.remove(delegator).unwrap_or(0);
        if bonds.is_empty() {
            self.delegations.remove(validator);
        }
        Ok(released)
    }

    /// Total stake delegated to `validator`.
    pub fn delegated_stake(&self, validator: &Address) -> Result<u128, RegistrationError> {
        if !self.validators.contains_key(validator) {
            return Err(RegistrationError::UnknownValidator(*validator));
        }
        Ok(self.delegated_to(validator))
    }

    /// Delegators of `validator` and their bonds, ordered by address.
    pub fn delegators(&self, validator: &Address) -> Result<Vec<(Address, u128)>, RegistrationError> {
        if !self.validators.contains_key(validator) {
            return Err(RegistrationError::UnknownValidator(*validator));
        }
        Ok(self
            .delegations
            .get(validator)
            .map(|bonds| bonds.iter().map(|(d, amount)| (*d, *amount)).collect())
            .unwrap_or_default())
    }

    fn delegated_to(&self, validator: &Address) -> u128 {
        self.delegations
            .get(validator)
            .map(|bonds| bonds.values().fold(0u128, |acc, v| acc.saturating_add(*v)))
            .unwrap_or(0)
    }

    fn weight_of(&self, validator: &Validator) -> u128 {
        validator.stake.saturating_add(self.delegated_to(&validator.address))
    }

    /// Take a validator out of selection, keeping it for audit.
    pub fn remove(
        &mut self,
        address: &Address,
        reason: RemovalReason,
    ) -> Result<Validator, RegistrationError> {
        let validator = self
            .validators
            .get_mut(address)
            .ok_or(RegistrationError::UnknownValidator(*address))?;
        if !validator.is_active() {
            return Err(RegistrationError::Inactive(*address));
        }
        validator.status = reason.into();
        Ok(validator.clone())
    }

    pub fn get(&self, address: &Address) -> Option<&Validator> {
        self.validators.get(address)
    }

    /// Registered key for `address`, whatever its status.
    pub fn public_key(&self, address: &Address) -> Option<&PublicKey> {
        self.validators.get(address).map(|v| &v.public_key)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.validators.values().filter(|v| v.is_active()).count()
    }

    /// Immutable view for selection, ordered by address. Entry stake is the
    /// selection weight: own stake plus delegations.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let entries: Vec<SnapshotEntry> = self
            .validators
            .values()
            .map(|v| SnapshotEntry {
                address: v.address,
                stake: self.weight_of(v),
                status: v.status,
            })
            .collect();
        RegistrySnapshot {
            entries: entries.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub address: Address,
    /// Own plus delegated stake.
    pub stake: u128,
    pub status: ValidatorStatus,
}

/// Point-in-time registry view, sorted by address ascending.
///
/// Cheap to clone; later registry mutations never show through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrySnapshot {
    entries: Arc<[SnapshotEntry]>,
}

impl RegistrySnapshot {
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn get(&self, address: &Address) -> Option<&SnapshotEntry> {
        self.entries
            .binary_search_by(|e| e.address.cmp(address))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    pub fn active(&self) -> impl Iterator<Item = &SnapshotEntry> {
        self.entries
            .iter()
            .filter(|e| e.status == ValidatorStatus::Active)
    }

    pub fn total_active_stake(&self) -> Result<u128, SelectionError> {
        self.active().try_fold(0u128, |acc, e| {
            acc.checked_add(e.stake).ok_or(SelectionError::StakeOverflow)
        })
    }
}
