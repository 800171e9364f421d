//! # Keccak-256 Hashing
//!
//! Every digest in the ledger (block headers, transactions, batch roots,
//! leader-election seeds) is Keccak-256.

use sha3::{Digest, Keccak256};
use shared_types::{Address, Hash};

/// Stateful Keccak-256 hasher.
pub struct Keccak256Hasher {
    inner: Keccak256,
}

impl Keccak256Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.inner.update(data.as_ref());
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

impl Default for Keccak256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with Keccak-256 (one-shot).
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Hash two nodes together.
pub fn hash_concat(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Keccak256Hasher::new();
    hasher.update(left).update(right);
    hasher.finalize()
}

/// Account address for a public key: the last 20 bytes of its Keccak-256.
pub fn derive_address(public_key: &[u8]) -> Address {
    let digest = keccak256(public_key);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..]);
    address
}
