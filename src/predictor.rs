//! Bitwise predictors driving the binary entropy codec.
//!
//! Every predictor here implements the same two-method interface the
//! codec expects: [`Predictor::p`] returns the cached probability that
//! the next bit is 1 (`0..4096`), and [`Predictor::update`] folds in the
//! bit once it is known and recomputes that cache for the bit after it.
//! Mirrors the teacher's own `Predictor::p`/`Predictor::update` split —
//! `p()` never does real work, it just returns what `update()` already
//! computed.
//!
//! [`TpaqPredictor`] generalizes the teacher's lpaq1-shaped `Predictor`
//! (7 fixed `ContextModelOn` structs walking a raw-pointer hash table)
//! into 7 interchangeable [`OrderContext`] streams plus the match model,
//! mixed and refined exactly as the teacher does: one [`Mixer`], one
//! [`Apm`] stage. [`FpaqPredictor`] and [`CmPredictor`] are the simpler
//! single/low-order siblings, grounded on `cm/context_model.rs`'s
//! single-`ContextModelO1` shape before that directory's raw-pointer
//! version is retired.

use crate::apm::Apm;
use crate::context_model::{hash, OrderContext};
use crate::hash_table::HashTable;
use crate::logistic::stretch;
use crate::match_model::MatchModel;
use crate::mixer::Mixer;
use crate::statemap::StateMap;

/// A bitwise probability source: `p()` reads the cached prediction for
/// the bit about to be coded, `update(bit)` trains on the bit that was
/// just coded and refreshes the cache for the next one.
pub trait Predictor {
    fn p(&mut self) -> i32;
    fn update(&mut self, bit: i32);
}

/// Context-mixing predictor combining 7 order-context streams and a
/// match model through a mixer and one APM stage.
///
/// Orders `[0, 1, 2, 3, 4, 6, 8]` each hash a different slice of the
/// last 8 bytes (`c4`/`c8`) into their own [`HashTable`] bucket; the
/// match model contributes an 8th, independently-trained input.
pub struct TpaqPredictor {
    orders: [OrderContext; 7],
    order_tags: [u32; 7],
    raw_ctx: [u32; 7],
    ht: HashTable,
    mm: MatchModel,
    mxr: Mixer,
    apm: Apm,
    c0: u32,   // partial byte, leading 1 marks the bits seen so far
    bpos: u32, // bits seen in the current byte, 0..8
    c4: u32,   // last 4 whole bytes
    c8: u32,   // the 4 bytes before those
    pr: i32,
}

/// Default size of the shared bit-history table: 2^28 bytes (256 MiB).
pub const DEFAULT_LOG_STATES: u32 = 28;

impl TpaqPredictor {
    /// Construct with the default 2^28-byte state table and the match
    /// model's default 64 MiB buffer / 16 Mi hash table.
    pub fn new() -> TpaqPredictor {
        TpaqPredictor::with_sizes(DEFAULT_LOG_STATES, MatchModel::new())
    }

    /// Construct with a caller-chosen state table size and match model
    /// (tests use small sizes to avoid allocating the spec defaults).
    pub fn with_sizes(log_states: u32, mm: MatchModel) -> TpaqPredictor {
        TpaqPredictor {
            orders: [
                OrderContext::new(),
                OrderContext::new(),
                OrderContext::new(),
                OrderContext::new(),
                OrderContext::new(),
                OrderContext::new(),
                OrderContext::new(),
            ],
            order_tags: [0, 1, 2, 3, 4, 6, 8],
            raw_ctx: [0; 7],
            ht: HashTable::new(1usize << log_states),
            mm,
            mxr: Mixer::new(8, 16384),
            apm: Apm::new(128),
            c0: 1,
            bpos: 0,
            c4: 0,
            c8: 0,
            pr: 2048,
        }
    }

    fn order_raw_ctx(tag: u32, c4: u32, c8: u32) -> u32 {
        match tag {
            0 => hash(0, 0),
            1 => hash(1, c4 & 0xFF),
            2 => hash(2, c4 & 0xFFFF),
            3 => hash(3, c4 & 0x00FF_FFFF),
            4 => hash(4, c4),
            6 => hash(6, c4 ^ ((c8 & 0xFFFF) << 8)),
            8 => hash(8, c4 ^ c8),
            _ => unreachable!("unsupported order tag"),
        }
    }

    fn begin_byte(&mut self) {
        for i in 0..7 {
            self.raw_ctx[i] = Self::order_raw_ctx(self.order_tags[i], self.c4, self.c8);
            self.orders[i].begin_byte(self.raw_ctx[i], &mut self.ht);
        }
    }
}

impl Default for TpaqPredictor {
    fn default() -> TpaqPredictor {
        TpaqPredictor::new()
    }
}

impl Predictor for TpaqPredictor {
    fn p(&mut self) -> i32 {
        debug_assert!((0..4096).contains(&self.pr));
        self.pr
    }

    fn update(&mut self, bit: i32) {
        debug_assert!(bit == 0 || bit == 1);

        self.mxr.update(bit);
        for i in 0..7 {
            self.orders[i].update(bit, self.raw_ctx[i], &mut self.ht);
        }

        self.c0 = (self.c0 << 1) | bit as u32;
        self.bpos += 1;
        if self.bpos == 8 {
            self.c8 = (self.c8 << 8) | (self.c4 >> 24);
            self.c4 = (self.c4 << 8) | (self.c0 & 0xFF);
            self.c0 = 1;
            self.bpos = 0;
            self.begin_byte();
        }

        let match_pred = self.mm.add_match_context_pred(bit);

        for i in 0..7 {
            let p = self.orders[i].p(bit, &self.ht);
            self.mxr.add(stretch(p));
        }
        self.mxr.add(match_pred);

        let mixer_cxt = ((self.c0 << 8) ^ (self.c4 & 0xFF)) & 0x3FFF;
        self.mxr.set(mixer_cxt);

        let mixed = self.mxr.p();
        let apm_cxt = self.c0 & 0x7F;
        self.pr = (mixed + 3 * self.apm.p(bit, 7, mixed, apm_cxt)) >> 2;
    }
}

/// Single state table, order-0 only: the simplest predictor, grounded
/// on the teacher's `cm::context_model::ContextModelO1` with the hash
/// table and byte history stripped out entirely.
pub struct FpaqPredictor {
    cxt: u32,
    sm: StateMap,
    states: [u8; 256],
    pr: i32,
}

impl FpaqPredictor {
    pub fn new() -> FpaqPredictor {
        FpaqPredictor {
            cxt: 1,
            sm: StateMap::new(256),
            states: [0; 256],
            pr: 2048,
        }
    }
}

impl Default for FpaqPredictor {
    fn default() -> FpaqPredictor {
        FpaqPredictor::new()
    }
}

impl Predictor for FpaqPredictor {
    fn p(&mut self) -> i32 {
        self.pr
    }

    fn update(&mut self, bit: i32) {
        let state = self.states[self.cxt as usize];
        self.states[self.cxt as usize] = crate::context_model::next_state(state, bit);

        self.cxt = (self.cxt << 1) | bit as u32;
        if self.cxt >= 256 {
            self.cxt = 1;
        }

        self.pr = self.sm.p(bit, self.states[self.cxt as usize] as i32);
    }
}

/// One order-1 context plus the partial byte: two context bits feeding
/// a single state table, per the "one or two context bits" design.
/// Grounded on the same `ContextModelO1` shape as [`FpaqPredictor`],
/// widened from order 0 to order 1.
pub struct CmPredictor {
    cxt: u32,
    prev_byte: u32,
    sm: StateMap,
    states: Vec<u8>,
    pr: i32,
}

impl CmPredictor {
    pub fn new() -> CmPredictor {
        CmPredictor {
            cxt: 1,
            prev_byte: 0,
            sm: StateMap::new(256),
            states: vec![0; 256 * 256],
            pr: 2048,
        }
    }

    fn state_idx(&self) -> usize {
        ((self.prev_byte << 8) | self.cxt) as usize & 0xFFFF
    }
}

impl Default for CmPredictor {
    fn default() -> CmPredictor {
        CmPredictor::new()
    }
}

impl Predictor for CmPredictor {
    fn p(&mut self) -> i32 {
        self.pr
    }

    fn update(&mut self, bit: i32) {
        let idx = self.state_idx();
        self.states[idx] = crate::context_model::next_state(self.states[idx], bit);

        self.cxt = (self.cxt << 1) | bit as u32;
        if self.cxt >= 256 {
            self.prev_byte = self.cxt & 0xFF;
            self.cxt = 1;
        }

        let idx = self.state_idx();
        self.pr = self.sm.p(bit, self.states[idx] as i32);
    }
}
