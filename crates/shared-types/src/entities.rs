//! # Core Domain Entities
//!
//! Identifiers and byte newtypes shared by consensus, sharding and rollup.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha3::{Digest, Keccak256};
use std::fmt;

/// A 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

/// A 20-byte account or validator address.
pub type Address = [u8; 20];

/// Shard identifier.
pub type ShardId = u16;

/// Rollup batch identifier, unique per processor.
pub type BatchId = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// The all-zero hash. Used as the genesis parent and the empty merkle root.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Raw public key bytes.
///
/// The bytes are interpreted by whichever signature verifier is plugged into
/// consensus; nothing in block layout depends on the key length.
#[serde_as]
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicKey(#[serde_as(as = "Bytes")] pub Vec<u8>);

impl PublicKey {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", short_hex(&self.0))
    }
}

/// Raw signature bytes.
#[serde_as]
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(#[serde_as(as = "Bytes")] pub Vec<u8>);

impl Signature {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Placeholder carried by unsigned genesis blocks.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", short_hex(&self.0))
    }
}

/// Balance and replay counter of a single account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: u128,
    pub nonce: u64,
}

impl AccountState {
    /// Leaf hash used when committing an account set to a merkle root.
    pub fn leaf_hash(&self, address: &Address) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(address);
        hasher.update(self.balance.to_le_bytes());
        hasher.update(self.nonce.to_le_bytes());
        hasher.finalize().into()
    }
}

/// First four bytes of `bytes` as hex, for log lines.
pub fn short_hex(bytes: &[u8]) -> String {
    let len = bytes.len().min(4);
    if bytes.len() > len {
        format!("{}..", hex::encode(&bytes[..len]))
    } else {
        hex::encode(bytes)
    }
}
