//! Genesis validator parsing and devnet generation

use shared_crypto::Ed25519PublicKey;
use shared_types::Address;
use ss_01_consensus::{BlockSigner, Ed25519BlockSigner};
use ss_02_sharding::SeedValidator;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenesisError {
    #[error("expected hexaddr:stake:hexpubkey, got {0:?}")]
    Malformed(String),

    #[error("bad address {0:?}")]
    InvalidAddress(String),

    #[error("bad stake {0:?}")]
    InvalidStake(String),

    #[error("bad Ed25519 public key {0:?}")]
    InvalidPublicKey(String),
}

fn decode_hex(raw: &str) -> Option<Vec<u8>> {
    hex::decode(raw.trim().trim_start_matches("0x")).ok()
}

/// Parse `hexaddr:stake:hexpubkey` entries separated by `;`.
///
/// Empty entries are skipped. Stakes must be positive.
pub fn parse_genesis_validators(raw: &str) -> Result<Vec<SeedValidator>, GenesisError> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_entry)
        .collect()
}

fn parse_entry(entry: &str) -> Result<SeedValidator, GenesisError> {
    let parts: Vec<&str> = entry.split(':').collect();
    let [address, stake, key] = parts.as_slice() else {
        return Err(GenesisError::Malformed(entry.to_string()));
    };

    let address: Address = decode_hex(address)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| GenesisError::InvalidAddress(address.to_string()))?;
    let stake: u128 = stake
        .trim()
        .parse()
        .ok()
        .filter(|stake| *stake > 0)
        .ok_or_else(|| GenesisError::InvalidStake(stake.to_string()))?;
    let public_key = decode_hex(key)
        .and_then(|bytes| Ed25519PublicKey::from_slice(&bytes).ok())
        .ok_or_else(|| GenesisError::InvalidPublicKey(key.to_string()))?;

    Ok(SeedValidator {
        address,
        stake,
        public_key: public_key.to_public_key(),
    })
}

/// Validator set generated from fixed seeds, with the signers to go with it.
pub struct DevGenesis {
    pub validators: Vec<SeedValidator>,
    pub signers: Vec<Ed25519BlockSigner>,
}

impl DevGenesis {
    /// `count` validators with equal `stake`; validator `i` uses seed `[i + 1; 32]`.
    pub fn new(count: u8, stake: u128) -> Self {
        let signers: Vec<Ed25519BlockSigner> = (1..=count)
            .map(|i| Ed25519BlockSigner::from_seed([i; 32]))
            .collect();
        let validators = signers
            .iter()
            .map(|signer| SeedValidator {
                address: signer.address(),
                stake,
                public_key: signer.public_key(),
            })
            .collect();
        Self { validators, signers }
    }

    /// Signer for `address`, if it is one of ours.
    pub fn signer(&self, address: &Address) -> Option<&Ed25519BlockSigner> {
        self.signers.iter().find(|signer| &signer.address() == address)
    }
}
