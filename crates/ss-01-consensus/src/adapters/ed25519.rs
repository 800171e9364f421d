//! Ed25519 signing and verification adapters

use crate::ports::{BlockSigner, SignatureVerifier};
use shared_crypto::{derive_address, verify_ed25519, Ed25519KeyPair};
use shared_types::{Address, PublicKey, Signature};

/// Verifies Ed25519 signatures. Malformed keys or signatures fail closed.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519SignatureVerifier;

impl SignatureVerifier for Ed25519SignatureVerifier {
    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        verify_ed25519(message, signature.as_bytes(), public_key.as_bytes()).is_ok()
    }
}

/// Block signer backed by an Ed25519 keypair.
pub struct Ed25519BlockSigner {
    keypair: Ed25519KeyPair,
    address: Address,
}

impl Ed25519BlockSigner {
    /// Signer whose address is derived from its public key.
    pub fn new(keypair: Ed25519KeyPair) -> Self {
        let address = derive_address(keypair.public_key().as_bytes());
        Self { keypair, address }
    }

    /// Signer proposing under an explicitly assigned address.
    pub fn with_address(keypair: Ed25519KeyPair, address: Address) -> Self {
        Self { keypair, address }
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::new(Ed25519KeyPair::from_seed(seed))
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key().to_public_key()
    }
}

impl BlockSigner for Ed25519BlockSigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign(&self, message: &[u8]) -> Signature {
        self.keypair.sign(message).to_signature()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_and_verifier_agree() {
        let signer = Ed25519BlockSigner::from_seed([4u8; 32]);
        let signature = signer.sign(b"header");
        let verifier = Ed25519SignatureVerifier;

        assert!(verifier.verify(b"header", &signature, &signer.public_key()));
        assert!(!verifier.verify(b"other", &signature, &signer.public_key()));
    }

    #[test]
    fn test_malformed_inputs_fail_closed() {
        let verifier = Ed25519SignatureVerifier;
        let signer = Ed25519BlockSigner::from_seed([4u8; 32]);
        assert!(!verifier.verify(b"m", &Signature::empty(), &signer.public_key()));
        assert!(!verifier.verify(
            b"m",
            &signer.sign(b"m"),
            &PublicKey::from_bytes(vec![1, 2, 3])
        ));
    }

    #[test]
    fn test_address_derivation() {
        let a = Ed25519BlockSigner::from_seed([1u8; 32]);
        let b = Ed25519BlockSigner::from_seed([2u8; 32]);
        assert_ne!(a.address(), b.address());

        let fixed = Ed25519BlockSigner::with_address(Ed25519KeyPair::from_seed([1u8; 32]), [9u8; 20]);
        assert_eq!(fixed.address(), [9u8; 20]);
    }
}
