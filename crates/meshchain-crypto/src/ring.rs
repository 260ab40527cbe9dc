//! Ring-signature extension point.
//!
//! The construction below mirrors a Monero-flavored MLSAG-shaped ring
//! signature, but its "response" is a
//! plain XOR of the signer's private key against the challenge — that
//! leaks the private key the moment the same challenge is reused, so this
//! is **not** a secure linkable ring signature. It exists to give
//! MeshChain a stable, pluggable interface (the [`RingSignatureScheme`]
//! trait) rather than a silent accept-all; swap in a real scheme (e.g.
//! Monero-style MLSAG with scalar commitments, or CLSAG) behind the same
//! trait before using this in anything but a test network.

use crate::hash::sha256;
use crate::signature::PublicKey;

pub const MIN_RING_SIZE: usize = 2;
pub const MAX_RING_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingSignature {
    pub challenges: Vec<[u8; 32]>,
    pub responses: Vec<[u8; 32]>,
}

pub trait RingSignatureScheme {
    fn sign(
        &self,
        message: &[u8; 32],
        ring_members: &[PublicKey],
        signer_index: usize,
        signer_secret: &[u8; 32],
    ) -> Option<RingSignature>;

    fn verify(&self, message: &[u8; 32], ring_members: &[PublicKey], signature: &RingSignature) -> bool;
}

fn xor32(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for i in 0..32 {
        out[i] = a[i] ^ b[i];
    }
    out
}

/// The non-production stub: XOR-based "AOS-shaped" ring signature. See the
/// module docs — this is an extension point, not a security boundary.
pub struct InsecureXorRingSignature;

impl RingSignatureScheme for InsecureXorRingSignature {
    fn sign(
        &self,
        message: &[u8; 32],
        ring_members: &[PublicKey],
        signer_index: usize,
        signer_secret: &[u8; 32],
    ) -> Option<RingSignature> {
        let n = ring_members.len();
        if !(MIN_RING_SIZE..=MAX_RING_SIZE).contains(&n) || signer_index >= n {
            return None;
        }

        let mut challenges = vec![[0u8; 32]; n];
        let mut responses = vec![[0u8; 32]; n];

        for i in 0..n {
            if i != signer_index {
                let mut r = [0u8; 32];
                rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut r);
                responses[i] = r;
            }
        }

        let mut current_hash = *sha256(message).as_bytes();
        for i in 0..n {
            if i == signer_index {
                continue;
            }
            let mut input = Vec::with_capacity(32 + 32 + 32);
            input.extend_from_slice(&current_hash);
            input.extend_from_slice(&ring_members[i].to_bytes());
            input.extend_from_slice(&responses[i]);
            let challenge = *sha256(&input).as_bytes();
            challenges[i] = challenge;
            current_hash = challenge;
        }

        let mut signer_input = Vec::with_capacity(32 + 32);
        signer_input.extend_from_slice(&current_hash);
        signer_input.extend_from_slice(&ring_members[signer_index].to_bytes());
        let signer_challenge = *sha256(&signer_input).as_bytes();
        challenges[signer_index] = signer_challenge;
        responses[signer_index] = xor32(signer_secret, &signer_challenge);

        Some(RingSignature {
            challenges,
            responses,
        })
    }

    fn verify(&self, message: &[u8; 32], ring_members: &[PublicKey], signature: &RingSignature) -> bool {
        let n = ring_members.len();
        if !(MIN_RING_SIZE..=MAX_RING_SIZE).contains(&n) {
            return false;
        }
        if signature.challenges.len() != n || signature.responses.len() != n {
            return false;
        }

        // Recompute the challenge chain; a valid ring signature closes the
        // loop back to challenges[0].
        let mut current_hash = *sha256(message).as_bytes();
        for i in 0..n {
            let mut input = Vec::with_capacity(32 + 32 + 32);
            input.extend_from_slice(&current_hash);
            input.extend_from_slice(&ring_members[i].to_bytes());
            input.extend_from_slice(&signature.responses[i]);
            let recomputed = *sha256(&input).as_bytes();
            if recomputed != signature.challenges[i] {
                return false;
            }
            current_hash = recomputed;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Keypair;

    fn ring_of(n: usize) -> (Vec<Keypair>, Vec<PublicKey>) {
        let keys: Vec<Keypair> = (0..n).map(|_| Keypair::generate()).collect();
        let publics = keys.iter().map(|k| k.public).collect();
        (keys, publics)
    }

    #[test]
    fn rejects_ring_size_outside_bounds() {
        let scheme = InsecureXorRingSignature;
        let (keys, publics) = ring_of(1);
        let msg = [0u8; 32];
        assert!(scheme
            .sign(&msg, &publics, 0, &keys[0].secret.to_seed_bytes())
            .is_none());
    }

    #[test]
    fn rejects_signer_index_out_of_range() {
        let scheme = InsecureXorRingSignature;
        let (keys, publics) = ring_of(3);
        let msg = [0u8; 32];
        assert!(scheme
            .sign(&msg, &publics, 5, &keys[0].secret.to_seed_bytes())
            .is_none());
    }

    #[test]
    fn valid_signature_verifies() {
        let scheme = InsecureXorRingSignature;
        let (keys, publics) = ring_of(4);
        let msg = [7u8; 32];
        let sig = scheme
            .sign(&msg, &publics, 2, &keys[2].secret.to_seed_bytes())
            .unwrap();
        assert!(scheme.verify(&msg, &publics, &sig));
    }

    #[test]
    fn tampered_response_fails_verification() {
        let scheme = InsecureXorRingSignature;
        let (keys, publics) = ring_of(3);
        let msg = [7u8; 32];
        let mut sig = scheme
            .sign(&msg, &publics, 1, &keys[1].secret.to_seed_bytes())
            .unwrap();
        sig.responses[0][0] ^= 0xFF;
        assert!(!scheme.verify(&msg, &publics, &sig));
    }
}
