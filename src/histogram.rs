//! Order-0 and order-1 byte histograms, used by the ANS codec to build
//! the frequency tables it then normalizes via [`crate::entropy_utils`].

/// Order-0 histogram: 257 counts indexed by byte value, with index 256
/// holding the running sum.
pub struct Histogram0 {
    freqs: [u64; 257],
}

impl Histogram0 {
    /// Build an order-0 histogram over `block`.
    pub fn new(block: &[u8]) -> Histogram0 {
        let mut freqs = [0u64; 257];
        for &b in block {
            freqs[b as usize] += 1;
        }
        freqs[256] = block.len() as u64;
        Histogram0 { freqs }
    }

    /// Raw counts for symbols `0..256`.
    pub fn counts(&self) -> &[u64] {
        &self.freqs[..256]
    }

    /// Total symbol count.
    pub fn total(&self) -> u64 {
        self.freqs[256]
    }
}

/// Order-1 histogram: 256 order-0-shaped tables, one per previous byte
/// (context). `counts(ctx)` gives the 256 raw counts for symbols that
/// followed byte `ctx`.
pub struct Histogram1 {
    freqs: Vec<[u64; 257]>,
}

impl Histogram1 {
    /// Build an order-1 histogram over `block`. The first byte of the
    /// block has no preceding context; it is accounted for separately by
    /// the caller (the ANS order-1 coder treats the first emitted byte as
    /// an anchor using the order-0 table for that byte, see
    /// [`crate::ans`]).
    pub fn new(block: &[u8]) -> Histogram1 {
        let mut freqs = vec![[0u64; 257]; 256];
        for w in block.windows(2) {
            let ctx = w[0] as usize;
            let sym = w[1] as usize;
            freqs[ctx][sym] += 1;
            freqs[ctx][256] += 1;
        }
        Histogram1 { freqs }
    }

    /// Raw counts for symbols `0..256` that followed byte `ctx`.
    pub fn counts(&self, ctx: usize) -> &[u64] {
        &self.freqs[ctx][..256]
    }

    /// Total count of symbols observed in context `ctx`.
    pub fn total(&self, ctx: usize) -> u64 {
        self.freqs[ctx][256]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order0_counts_match_naive_tally() {
        let block = b"mississippi";
        let h = Histogram0::new(block);
        assert_eq!(h.counts()[b'i' as usize], 4);
        assert_eq!(h.counts()[b's' as usize], 4);
        assert_eq!(h.counts()[b'p' as usize], 2);
        assert_eq!(h.counts()[b'm' as usize], 1);
        assert_eq!(h.total(), 11);
    }

    #[test]
    fn order1_counts_follow_context() {
        let block = b"aabab";
        let h = Histogram1::new(block);
        // a -> a (pos0->1), a -> b (pos1->2), b -> a (pos2->3), a -> b (pos3->4)
        assert_eq!(h.counts(b'a' as usize)[b'a' as usize], 1);
        assert_eq!(h.counts(b'a' as usize)[b'b' as usize], 2);
        assert_eq!(h.counts(b'b' as usize)[b'a' as usize], 1);
        assert_eq!(h.total(b'a' as usize), 3);
    }
}
