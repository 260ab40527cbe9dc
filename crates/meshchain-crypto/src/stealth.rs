//! Stealth addresses: receiver-privacy handles derived from a
//! spend/view keypair.
//!
//! Like the ring signature in [`crate::ring`], this is a simplified
//! construction (hash-based, not a true elliptic-curve Diffie-Hellman)
//! rather than a textbook-secure scheme —
//! it gives MeshChain receiver-detection without linking identity, but
//! shouldn't be mistaken for a hardened stealth-address protocol.

use crate::hash::{sha256, sha256_16, Hash16};

/// The long-lived, publishable stealth address: `H(spend_pub ‖ view_pub)[:16]`.
pub fn stealth_address(spend_public: &[u8; 32], view_public: &[u8; 32]) -> Hash16 {
    let mut combined = Vec::with_capacity(64);
    combined.extend_from_slice(spend_public);
    combined.extend_from_slice(view_public);
    sha256_16(&combined)
}

/// Sender side: derive a one-time output key for a transaction to
/// `(spend_public, view_public)`, given a fresh ephemeral secret.
pub fn generate_output_key(
    ephemeral_secret: &[u8; 32],
    spend_public: &[u8; 32],
    view_public: &[u8; 32],
) -> Hash16 {
    let mut shared_input = Vec::with_capacity(64);
    shared_input.extend_from_slice(ephemeral_secret);
    shared_input.extend_from_slice(spend_public);
    let shared = sha256(&shared_input);

    let mut one_time_input = Vec::with_capacity(64);
    one_time_input.extend_from_slice(shared.as_bytes());
    one_time_input.extend_from_slice(view_public);
    sha256_16(&one_time_input)
}

/// Receiver side: recompute the expected output key from the view secret
/// and the ephemeral public key carried in the transaction:
/// `H( H(view_secret ‖ ephemeral_pub) ‖ view_pub )`.
pub fn recompute_output_key(
    view_secret: &[u8; 32],
    ephemeral_public: &[u8; 32],
    view_public: &[u8; 32],
) -> Hash16 {
    let mut shared_input = Vec::with_capacity(64);
    shared_input.extend_from_slice(view_secret);
    shared_input.extend_from_slice(ephemeral_public);
    let shared = sha256(&shared_input);

    let mut one_time_input = Vec::with_capacity(64);
    one_time_input.extend_from_slice(shared.as_bytes());
    one_time_input.extend_from_slice(view_public);
    sha256_16(&one_time_input)
}

/// Does `candidate_output_key` belong to this receiver's view keypair?
pub fn is_owned(
    candidate_output_key: &Hash16,
    view_secret: &[u8; 32],
    ephemeral_public: &[u8; 32],
    view_public: &[u8; 32],
) -> bool {
    recompute_output_key(view_secret, ephemeral_public, view_public) == *candidate_output_key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stealth_address_is_deterministic() {
        let spend = [1u8; 32];
        let view = [2u8; 32];
        assert_eq!(stealth_address(&spend, &view), stealth_address(&spend, &view));
    }

    #[test]
    fn different_key_pairs_produce_different_addresses() {
        let spend = [1u8; 32];
        let view_a = [2u8; 32];
        let view_b = [3u8; 32];
        assert_ne!(stealth_address(&spend, &view_a), stealth_address(&spend, &view_b));
    }

    #[test]
    fn detection_matches_for_consistent_secrets() {
        let view_secret = [9u8; 32];
        let ephemeral_public = [5u8; 32];
        let view_public = [2u8; 32];
        let derived = recompute_output_key(&view_secret, &ephemeral_public, &view_public);
        assert!(is_owned(&derived, &view_secret, &ephemeral_public, &view_public));
    }

    #[test]
    fn detection_rejects_wrong_view_secret() {
        let derived = recompute_output_key(&[9u8; 32], &[5u8; 32], &[2u8; 32]);
        assert!(!is_owned(&derived, &[1u8; 32], &[5u8; 32], &[2u8; 32]));
    }
}
