//! Deterministic enumeration of candidate seeds.

/// Returns candidate `index` of a session: `base_seed + index`, reading the
/// seed as a little-endian 256-bit integer and wrapping at 2^256.
///
/// Distinct indices always give distinct seeds, and the mapping depends only
/// on `(base_seed, index)`.
pub fn candidate_seed(base_seed: &[u8; 32], index: u64) -> [u8; 32] {
    let mut seed = *base_seed;
    let mut carry = index;

    for chunk in seed.chunks_exact_mut(8) {
        if carry == 0 {
            break;
        }
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        let (sum, overflow) = u64::from_le_bytes(word).overflowing_add(carry);
        chunk.copy_from_slice(&sum.to_le_bytes());
        carry = overflow as u64;
    }

    seed
}

/// Returns the seeds for indices `start..start + count`.
pub fn candidate_range(base_seed: &[u8; 32], start: u64, count: u64) -> Vec<[u8; 32]> {
    (start..start + count)
        .map(|index| candidate_seed(base_seed, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_index_zero_is_base() {
        let base = [0xabu8; 32];
        assert_eq!(candidate_seed(&base, 0), base);
    }

    #[test]
    fn test_little_endian_counter() {
        let seed = candidate_seed(&[0u8; 32], 0x0102);
        assert_eq!(seed[0], 0x02);
        assert_eq!(seed[1], 0x01);
        assert!(seed[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_carry_crosses_words() {
        let mut base = [0u8; 32];
        base[..8].copy_from_slice(&u64::MAX.to_le_bytes());
        let seed = candidate_seed(&base, 1);
        assert!(seed[..8].iter().all(|&b| b == 0));
        assert_eq!(seed[8], 1);
    }

    #[test]
    fn test_wraps_at_top() {
        let seed = candidate_seed(&[0xffu8; 32], 1);
        assert_eq!(seed, [0u8; 32]);
    }

    #[test]
    fn test_range_has_no_duplicates() {
        let base = [0xfeu8; 32];
        let seeds = candidate_range(&base, 0, 2048);
        let unique: HashSet<_> = seeds.iter().collect();
        assert_eq!(unique.len(), seeds.len());
        assert_eq!(seeds[17], candidate_seed(&base, 17));
    }
}
