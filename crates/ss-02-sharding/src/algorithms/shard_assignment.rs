//! # Shard Assignment Algorithm
//!
//! Rendezvous ("highest random weight") hashing: every (address, shard)
//! pair gets a score and the highest-scoring shard wins. Adding a shard
//! moves only the addresses it now wins, about 1/N of them.

use shared_crypto::keccak256;
use shared_types::{Address, ShardId};

/// Pick the shard for `address` among `shards`. `None` when there are none.
pub fn rendezvous_assign(address: &Address, shards: &[ShardId]) -> Option<ShardId> {
    if shards.len() <= 1 {
        return shards.first().copied();
    }

    let mut input = [0u8; 22]; // 20 bytes address + 2 bytes shard ID
    input[..20].copy_from_slice(address);

    shards
        .iter()
        .map(|shard| {
            input[20..22].copy_from_slice(&shard.to_be_bytes());
            (keccak256(&input), *shard)
        })
        .max()
        .map(|(_, shard)| shard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_address(n: u8) -> Address {
        let mut addr = [0u8; 20];
        addr[0] = n;
        addr
    }

    #[test]
    fn test_rendezvous_assign_deterministic() {
        let addr = make_address(42);
        let shards = vec![0, 1, 2, 3];
        assert_eq!(
            rendezvous_assign(&addr, &shards),
            rendezvous_assign(&addr, &shards)
        );
    }

    #[test]
    fn test_rendezvous_assign_within_shards() {
        let shards = vec![3, 7, 9];
        for i in 0..50 {
            let shard = rendezvous_assign(&make_address(i), &shards).unwrap();
            assert!(shards.contains(&shard));
        }
    }

    #[test]
    fn test_rendezvous_order_independent() {
        let addr = make_address(7);
        assert_eq!(
            rendezvous_assign(&addr, &[0, 1, 2, 3]),
            rendezvous_assign(&addr, &[3, 2, 1, 0])
        );
    }

    #[test]
    fn test_rendezvous_empty_and_single() {
        assert_eq!(rendezvous_assign(&make_address(1), &[]), None);
        assert_eq!(rendezvous_assign(&make_address(1), &[5]), Some(5));
    }

    #[test]
    fn test_rendezvous_minimal_reassignment() {
        // When adding a new shard, approximately 1/n addresses should move
        let shards_4 = vec![0, 1, 2, 3];
        let shards_5 = vec![0, 1, 2, 3, 4];

        let mut moved = 0;
        for i in 0..100 {
            let addr = make_address(i);
            let old_shard = rendezvous_assign(&addr, &shards_4);
            let new_shard = rendezvous_assign(&addr, &shards_5);
            if old_shard != new_shard {
                // Only ever towards the new shard
                assert_eq!(new_shard, Some(4));
                moved += 1;
            }
        }

        // Expect roughly 20% to move (1/5), allow 5-40%
        assert!((5..=40).contains(&moved), "Moved {} addresses", moved);
    }
}
