//! # Transactions
//!
//! The ledger's transaction variant. Three kinds exist:
//!
//! - `Transfer`: moves `amount` between accounts, pays `fee`, consumes `nonce`.
//!   Signed by the sender over [`Transaction::signing_bytes`]; `from` must be
//!   the address of `sender_key`.
//! - `Mint`: credits freshly issued value to an account.
//! - `Data`: anchors an opaque content hash without touching balances.
//!
//! Hashes are computed over a fixed canonical layout (tag byte followed by
//! little-endian fields) so they never depend on the wire codec.

use crate::entities::{Address, Hash, PublicKey, Signature, ZERO_HASH};
use crate::errors::TransactionError;
use bincode::Options;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Upper bound on the wire size of a single transaction.
pub const MAX_TRANSACTION_WIRE_SIZE: usize = 512;

const TAG_TRANSFER: u8 = 0x01;
const TAG_MINT: u8 = 0x02;
const TAG_DATA: u8 = 0x03;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    Transfer {
        from: Address,
        to: Address,
        amount: u128,
        fee: u128,
        nonce: u64,
        sender_key: PublicKey,
        signature: Signature,
    },
    Mint {
        to: Address,
        amount: u128,
    },
    Data {
        from: Address,
        content_hash: Hash,
        size: u64,
    },
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_TRANSACTION_WIRE_SIZE as u64)
        .reject_trailing_bytes()
}

impl Transaction {
    /// Decode and validate a transaction received from outside the node.
    pub fn decode(bytes: &[u8]) -> Result<Self, TransactionError> {
        if bytes.len() > MAX_TRANSACTION_WIRE_SIZE {
            return Err(TransactionError::TooLarge {
                size: bytes.len(),
                limit: MAX_TRANSACTION_WIRE_SIZE,
            });
        }
        let tx: Transaction = wire_options()
            .deserialize(bytes)
            .map_err(|e| TransactionError::Malformed(e.to_string()))?;
        tx.validate()?;
        Ok(tx)
    }

    /// Wire encoding accepted by [`Transaction::decode`].
    pub fn to_wire(&self) -> Result<Vec<u8>, TransactionError> {
        wire_options()
            .serialize(self)
            .map_err(|e| TransactionError::Malformed(e.to_string()))
    }

    /// Structural checks that need no ledger state.
    pub fn validate(&self) -> Result<(), TransactionError> {
        match self {
            Transaction::Transfer {
                from,
                to,
                amount,
                sender_key,
                signature,
                ..
            } => {
                if *amount == 0 {
                    return Err(TransactionError::ZeroAmount);
                }
                if from == to {
                    return Err(TransactionError::SelfTransfer);
                }
                if sender_key.is_empty() || signature.is_empty() {
                    return Err(TransactionError::Unsigned);
                }
            }
            Transaction::Mint { amount, .. } => {
                if *amount == 0 {
                    return Err(TransactionError::ZeroAmount);
                }
            }
            Transaction::Data {
                content_hash, size, ..
            } => {
                if *size == 0 || *content_hash == ZERO_HASH {
                    return Err(TransactionError::EmptyPayload);
                }
            }
        }
        Ok(())
    }

    /// Canonical byte layout the transaction hash is computed over: the
    /// signed bytes followed by the transfer signature, if any.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = self.signing_bytes();
        if let Transaction::Transfer { signature, .. } = self {
            out.extend_from_slice(signature.as_bytes());
        }
        out
    }

    /// Bytes a transfer's sender signs. Covers every field but the signature.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128);
        match self {
            Transaction::Transfer {
                from,
                to,
                amount,
                fee,
                nonce,
                sender_key,
                ..
            } => {
                out.push(TAG_TRANSFER);
                out.extend_from_slice(from);
                out.extend_from_slice(to);
                out.extend_from_slice(&amount.to_le_bytes());
                out.extend_from_slice(&fee.to_le_bytes());
                out.extend_from_slice(&nonce.to_le_bytes());
                out.extend_from_slice(sender_key.as_bytes());
            }
            Transaction::Mint { to, amount } => {
                out.push(TAG_MINT);
                out.extend_from_slice(to);
                out.extend_from_slice(&amount.to_le_bytes());
            }
            Transaction::Data {
                from,
                content_hash,
                size,
            } => {
                out.push(TAG_DATA);
                out.extend_from_slice(from);
                out.extend_from_slice(content_hash);
                out.extend_from_slice(&size.to_le_bytes());
            }
        }
        out
    }

    pub fn hash(&self) -> Hash {
        Keccak256::digest(self.canonical_bytes()).into()
    }

    /// The account a transaction is routed by: the sender, or the recipient
    /// of a mint.
    pub fn primary_account(&self) -> Address {
        match self {
            Transaction::Transfer { from, .. } => *from,
            Transaction::Mint { to, .. } => *to,
            Transaction::Data { from, .. } => *from,
        }
    }
}
