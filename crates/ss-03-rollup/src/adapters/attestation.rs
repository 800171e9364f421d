//! Prover attestations
//!
//! A proof is `public_key (32 bytes) || signature (64 bytes)`, where the
//! signature is Ed25519 over the statement digest and the key belongs to
//! the configured prover set.

use crate::domain::{BatchProof, BatchStatement};
use crate::ports::ProofVerifier;
use shared_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use std::collections::BTreeSet;
use tracing::debug;

const KEY_LEN: usize = 32;

/// Encoded attestation length
pub const ATTESTATION_LEN: usize = KEY_LEN + 64;

/// Accepts attestations from a fixed set of prover keys.
#[derive(Clone, Debug, Default)]
pub struct ProverAttestationVerifier {
    provers: BTreeSet<[u8; KEY_LEN]>,
}

impl ProverAttestationVerifier {
    pub fn new(provers: impl IntoIterator<Item = Ed25519PublicKey>) -> Self {
        Self {
            provers: provers.into_iter().map(|key| *key.as_bytes()).collect(),
        }
    }

    pub fn prover_count(&self) -> usize {
        self.provers.len()
    }
}

impl ProofVerifier for ProverAttestationVerifier {
    fn verify(&self, statement: &BatchStatement, proof: &BatchProof) -> bool {
        let bytes = proof.as_bytes();
        if bytes.len() != ATTESTATION_LEN {
            debug!(len = bytes.len(), "[ss-03] Malformed attestation");
            return false;
        }
        let (key_bytes, sig_bytes) = bytes.split_at(KEY_LEN);

        let Ok(key) = Ed25519PublicKey::from_slice(key_bytes) else {
            return false;
        };
        if !self.provers.contains(key.as_bytes()) {
            debug!(batch_id = statement.batch_id, "[ss-03] Attestation from unknown prover");
            return false;
        }
        let Ok(signature) = Ed25519Signature::from_slice(sig_bytes) else {
            return false;
        };
        key.verify(&statement.digest(), &signature).is_ok()
    }
}

/// Produces attestations with one prover key.
pub struct ProverAttestor {
    keypair: Ed25519KeyPair,
}

impl ProverAttestor {
    pub fn new(keypair: Ed25519KeyPair) -> Self {
        Self { keypair }
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::new(Ed25519KeyPair::from_seed(seed))
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    pub fn attest(&self, statement: &BatchStatement) -> BatchProof {
        let signature = self.keypair.sign(&statement.digest());
        let mut bytes = Vec::with_capacity(ATTESTATION_LEN);
        bytes.extend_from_slice(self.keypair.public_key().as_bytes());
        bytes.extend_from_slice(signature.as_bytes());
        BatchProof(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement() -> BatchStatement {
        BatchStatement {
            batch_id: 3,
            shard_id: 1,
            prior_state_root: [0u8; 32],
            state_root: [7u8; 32],
            transactions_root: [8u8; 32],
            anchor_hash: [9u8; 32],
        }
    }

    #[test]
    fn test_attestation_from_known_prover_verifies() {
        let prover = ProverAttestor::from_seed([1u8; 32]);
        let verifier = ProverAttestationVerifier::new([prover.public_key()]);
        let proof = prover.attest(&statement());

        assert_eq!(proof.as_bytes().len(), ATTESTATION_LEN);
        assert!(verifier.verify(&statement(), &proof));
    }

    #[test]
    fn test_attestation_bound_to_statement() {
        let prover = ProverAttestor::from_seed([1u8; 32]);
        let verifier = ProverAttestationVerifier::new([prover.public_key()]);
        let proof = prover.attest(&statement());

        let mut other = statement();
        other.state_root = [6u8; 32];
        assert!(!verifier.verify(&other, &proof));
    }

    #[test]
    fn test_unknown_prover_and_garbage_rejected() {
        let prover = ProverAttestor::from_seed([1u8; 32]);
        let stranger = ProverAttestor::from_seed([2u8; 32]);
        let verifier = ProverAttestationVerifier::new([prover.public_key()]);

        assert!(!verifier.verify(&statement(), &stranger.attest(&statement())));
        assert!(!verifier.verify(&statement(), &BatchProof(vec![0u8; 5])));
        assert!(!verifier.verify(&statement(), &BatchProof::default()));
    }
}
