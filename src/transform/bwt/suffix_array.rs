//! Suffix array construction used by the forward Burrows-Wheeler
//! Transform.
//!
//! Prefix-doubling: O(n log^2 n) rather than the linear-time
//! DivSufSort-equivalent construction the design gestures at, traded
//! for an implementation small enough to reason about without a
//! compiler in the loop. Ranks treat the input as circular (no
//! sentinel), matching the BWT's own circular convention.

use std::cmp::Ordering;

/// Build the suffix array of a circular string: `sa[i]` is the start
/// offset of the lexicographically `i`-th rotation of `data`.
pub fn build_suffix_array(data: &[u8]) -> Vec<u32> {
    let n = data.len();
    let mut sa: Vec<u32> = (0..n as u32).collect();
    if n <= 1 {
        return sa;
    }

    let mut rank: Vec<i64> = data.iter().map(|&b| b as i64).collect();
    let mut tmp = vec![0i64; n];
    let mut k = 1usize;

    let cmp_rot = |a: u32, b: u32, rank: &[i64], k: usize, n: usize| -> Ordering {
        let a = a as usize;
        let b = b as usize;
        match rank[a].cmp(&rank[b]) {
            Ordering::Equal => {
                let ra = rank[(a + k) % n];
                let rb = rank[(b + k) % n];
                ra.cmp(&rb)
            }
            other => other,
        }
    };

    loop {
        sa.sort_by(|&a, &b| cmp_rot(a, b, &rank, k, n));
        tmp[sa[0] as usize] = 0;
        for i in 1..n {
            let bump = cmp_rot(sa[i - 1], sa[i], &rank, k, n) == Ordering::Less;
            tmp[sa[i] as usize] = tmp[sa[i - 1] as usize] + if bump { 1 } else { 0 };
        }
        rank.copy_from_slice(&tmp);
        if rank[sa[n - 1] as usize] as usize == n - 1 {
            break;
        }
        if k >= n {
            break;
        }
        k *= 2;
    }

    sa
}
