//! # Error Types
//!
//! Errors raised while decoding or validating transactions.

use thiserror::Error;

/// Why a transaction was refused at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// Bytes could not be decoded into a transaction.
    #[error("Malformed transaction: {0}")]
    Malformed(String),

    /// Encoded form exceeds the wire limit.
    #[error("Transaction too large: {size} bytes exceeds limit {limit}")]
    TooLarge { size: usize, limit: usize },

    /// Transfer or mint of nothing.
    #[error("Transaction amount must be non-zero")]
    ZeroAmount,

    /// Sender and recipient are the same account.
    #[error("Transfer sender and recipient are identical")]
    SelfTransfer,

    /// Transfer without a sender key or signature.
    #[error("Transfer is not signed")]
    Unsigned,

    /// Transfer sender is not the address of the signing key.
    #[error("Transfer sender does not match its signing key")]
    SenderKeyMismatch,

    /// Transfer signature does not verify under the sender key.
    #[error("Transfer signature is invalid")]
    BadSignature,

    /// Data transaction with no content.
    #[error("Data transaction has an empty payload")]
    EmptyPayload,
}
