//! # Outbound Ports
//!
//! External collaborators: the settlement-ledger contract gateway and the
//! content-addressed store. Both are asynchronous; the anchor never blocks
//! the ledger core on them.

use crate::domain::AnchorError;
use async_trait::async_trait;

/// Smart-contract collaborator on an external ledger.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    /// Invoke `method` on the contract at `address` and wait for the receipt.
    ///
    /// Returns the transaction receipt identifier.
    async fn interact_with_contract(
        &self,
        address: &str,
        abi: &str,
        method: &str,
        args: &[String],
    ) -> Result<String, AnchorError>;
}

/// Content-addressed storage collaborator.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store `data`, returning its content id.
    async fn add_data(&self, data: Vec<u8>) -> Result<String, AnchorError>;

    async fn get_data(&self, content_id: &str) -> Result<Vec<u8>, AnchorError>;
}
