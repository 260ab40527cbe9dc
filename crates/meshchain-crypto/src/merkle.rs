//! Merkle root over truncated-SHA-256-16 leaf hashes, duplicating the last
//! leaf on odd-sized levels.

use crate::hash::{hash_pair, sha256_16, Hash16};

/// Compute the merkle root of `leaves`. An empty leaf set returns
/// `sha256_16(b"")`, matching the zero-transaction boundary case.
pub fn merkle_root(leaves: &[Hash16]) -> Hash16 {
    if leaves.is_empty() {
        return sha256_16(b"");
    }

    let mut level: Vec<Hash16> = leaves.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = *level.last().unwrap();
            level.push(last);
        }
        level = level
            .chunks_exact(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_root_is_hash_of_empty_string() {
        assert_eq!(merkle_root(&[]), sha256_16(b""));
    }

    #[test]
    fn single_leaf_is_its_own_root() {
        let leaf = sha256_16(b"only-tx");
        assert_eq!(merkle_root(&[leaf]), leaf);
    }

    #[test]
    fn odd_level_duplicates_last_leaf() {
        let a = sha256_16(b"a");
        let b = sha256_16(b"b");
        let c = sha256_16(b"c");
        let three = merkle_root(&[a, b, c]);
        let four_with_dup = merkle_root(&[a, b, c, c]);
        assert_eq!(three, four_with_dup);
    }

    #[test]
    fn swapping_leaves_changes_the_root() {
        let a = sha256_16(b"tx-a");
        let b = sha256_16(b"tx-b");
        let c = sha256_16(b"tx-c");
        let d = sha256_16(b"tx-d");
        let original = merkle_root(&[a, b, c, d]);
        let swapped = merkle_root(&[b, a, c, d]);
        assert_ne!(original, swapped);
    }
}
