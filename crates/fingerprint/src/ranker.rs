//! ReliabilityRanker

use contracts::{ContractError, Fingerprint};

/// Bit positions ordered by descending reliability
///
/// Stable: equal reliabilities keep their original order, lower index first.
pub fn rank_indices(reliability: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..reliability.len()).collect();
    order.sort_by(|&a, &b| reliability[b].total_cmp(&reliability[a]));
    order
}

/// The `k` fingerprint bits backed by the highest reliabilities, most reliable
/// first
///
/// # Errors
/// `TooFewAlignedBits` when the fingerprint holds fewer than `k` bits.
pub fn select_top(fingerprint: &Fingerprint, k: usize) -> Result<Vec<u8>, ContractError> {
    if k > fingerprint.len() {
        return Err(ContractError::TooFewAlignedBits {
            aligned: fingerprint.len(),
            required: k,
        });
    }
    let bits = fingerprint.bits();
    Ok(rank_indices(fingerprint.reliability())
        .into_iter()
        .take(k)
        .map(|i| bits[i])
        .collect())
}

/// Fraction of positions where `local` and `peer` agree
///
/// # Errors
/// Fails on empty or differently sized selections.
pub fn similarity(local: &[u8], peer: &[u8]) -> Result<f64, ContractError> {
    if local.is_empty() || local.len() != peer.len() {
        return Err(ContractError::Other(format!(
            "cannot compare {} local bits with {} peer bits",
            local.len(),
            peer.len()
        )));
    }
    let matching = local.iter().zip(peer).filter(|(a, b)| a == b).count();
    Ok(matching as f64 / local.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Repeatedly take the largest remaining reliability, lowest index on ties
    fn brute_force(bits: &[u8], reliability: &[f64], k: usize) -> Vec<u8> {
        let mut taken = vec![false; bits.len()];
        let mut out = Vec::with_capacity(k);
        for _ in 0..k {
            let mut best: Option<usize> = None;
            for i in 0..bits.len() {
                if taken[i] {
                    continue;
                }
                match best {
                    Some(b) if reliability[i] <= reliability[b] => {}
                    _ => best = Some(i),
                }
            }
            let b = best.unwrap();
            taken[b] = true;
            out.push(bits[b]);
        }
        out
    }

    #[test]
    fn test_select_top_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let len = rng.random_range(1..24);
            let bits: Vec<u8> = (0..len).map(|_| rng.random_range(0..2)).collect();
            // few distinct values force plenty of ties
            let reliability: Vec<f64> = (0..len)
                .map(|_| f64::from(rng.random_range(0..4u8)) * 0.5)
                .collect();
            let fp = Fingerprint::new(bits.clone(), reliability.clone()).unwrap();
            let k = rng.random_range(0..=len);

            let top = select_top(&fp, k).unwrap();
            assert_eq!(top.len(), k);
            assert_eq!(top, brute_force(&bits, &reliability, k));
        }
    }

    #[test]
    fn test_rank_ties_keep_original_order() {
        let reliability = [1.0, 3.0, 1.0, 3.0, 2.0];
        assert_eq!(rank_indices(&reliability), vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn test_select_top_orders_by_reliability() {
        let fp = Fingerprint::new(vec![0, 1, 1, 0], vec![0.1, 0.9, 0.5, 0.7]).unwrap();
        assert_eq!(select_top(&fp, 3).unwrap(), vec![1, 0, 1]);
    }

    #[test]
    fn test_select_top_too_many() {
        let fp = Fingerprint::new(vec![1; 31], vec![1.0; 31]).unwrap();
        let err = select_top(&fp, 32).unwrap_err();
        assert!(matches!(
            err,
            ContractError::TooFewAlignedBits {
                aligned: 31,
                required: 32
            }
        ));
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity(&[1, 0, 1, 1], &[1, 0, 0, 1]).unwrap(), 0.75);
        assert_eq!(similarity(&[1, 0], &[1, 0]).unwrap(), 1.0);
        assert!(similarity(&[1, 0], &[1]).is_err());
        assert!(similarity(&[], &[]).is_err());
    }
}
