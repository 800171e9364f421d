//! Contract gateway recording every call

use crate::domain::AnchorError;
use crate::ports::ContractGateway;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCall {
    pub address: String,
    pub method: String,
    pub args: Vec<String>,
    pub receipt: String,
}

/// Accepts every call except for methods marked failing.
#[derive(Default)]
pub struct InMemoryContractGateway {
    calls: RwLock<Vec<ContractCall>>,
    failing: RwLock<HashSet<String>>,
}

impl InMemoryContractGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make calls to `method` fail until cleared.
    pub fn fail_method(&self, method: &str) {
        self.failing.write().insert(method.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing.write().clear();
    }

    pub fn calls(&self) -> Vec<ContractCall> {
        self.calls.read().clone()
    }
}

#[async_trait]
impl ContractGateway for InMemoryContractGateway {
    async fn interact_with_contract(
        &self,
        address: &str,
        _abi: &str,
        method: &str,
        args: &[String],
    ) -> Result<String, AnchorError> {
        if self.failing.read().contains(method) {
            return Err(AnchorError::Contract {
                method: method.to_string(),
                reason: "execution reverted".to_string(),
            });
        }
        let receipt = format!("0x{}", Uuid::new_v4().simple());
        self.calls.write().push(ContractCall {
            address: address.to_string(),
            method: method.to_string(),
            args: args.to_vec(),
            receipt: receipt.clone(),
        });
        Ok(receipt)
    }
}
