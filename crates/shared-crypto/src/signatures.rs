//! # Ed25519 Signatures
//!
//! Twisted Edwards curve signatures with deterministic nonces. Used for block
//! proposals, prover attestations and transfer authorization.

use crate::{derive_address, CryptoError};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use shared_types::{Address, PublicKey, Signature, Transaction, TransactionError};
use zeroize::Zeroize;

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Create from a variable-length slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Self::from_bytes(array)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Scheme-agnostic form stored in the validator registry.
    pub fn to_public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.0.to_vec())
    }

    /// Verify a signature.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;

        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519Signature {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Create from a variable-length slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; 64] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureFormat)?;
        Ok(Self(array))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Scheme-agnostic form carried in blocks.
    pub fn to_signature(&self) -> Signature {
        Signature::from_bytes(self.0.to_vec())
    }
}

/// Verify raw signature bytes against raw public key bytes.
pub fn verify_ed25519(
    message: &[u8],
    signature: &[u8],
    public_key: &[u8],
) -> Result<(), CryptoError> {
    let key = Ed25519PublicKey::from_slice(public_key)?;
    let sig = Ed25519Signature::from_slice(signature)?;
    key.verify(message, &sig)
}

/// Check that a transfer was authorized by its sender.
///
/// `from` must be the address of `sender_key` and the signature must verify
/// over [`Transaction::signing_bytes`]. Mints and data transactions carry no
/// signature and always pass.
pub fn verify_transaction(tx: &Transaction) -> Result<(), TransactionError> {
    let Transaction::Transfer {
        from,
        sender_key,
        signature,
        ..
    } = tx
    else {
        return Ok(());
    };
    if derive_address(sender_key.as_bytes()) != *from {
        return Err(TransactionError::SenderKeyMismatch);
    }
    verify_ed25519(&tx.signing_bytes(), signature.as_bytes(), sender_key.as_bytes())
        .map_err(|_| TransactionError::BadSignature)
}

/// Ed25519 keypair.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        Self { signing_key }
    }

    /// Get public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message (deterministic - no RNG needed).
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Account address owned by this key.
    pub fn address(&self) -> Address {
        derive_address(self.public_key().as_bytes())
    }

    /// Build a transfer from this key's account, signed.
    pub fn sign_transfer(&self, to: Address, amount: u128, fee: u128, nonce: u64) -> Transaction {
        let mut tx = Transaction::Transfer {
            from: self.address(),
            to,
            amount,
            fee,
            nonce,
            sender_key: self.public_key().to_public_key(),
            signature: Signature::empty(),
        };
        let signed = self.sign(&tx.signing_bytes()).to_signature();
        if let Transaction::Transfer { signature, .. } = &mut tx {
            *signature = signed;
        }
        tx
    }

    /// Get secret seed (for serialization).
    pub fn to_seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl Drop for Ed25519KeyPair {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}
