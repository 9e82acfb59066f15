//! Per-thread sequence state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Sequences available per millisecond per thread.
pub const SEQ_PER_MILLI: i64 = 10_000;

/// Counter wrap point, as the 16-bit counter type.
const SEQ_WRAP: i16 = 10_000;

/// Sequence state of one execution context.
///
/// Never shared: each thread owns one through [`super::GlobalIdGenerator`].
#[derive(Debug)]
pub struct IdContext {
    sequencer_id: u64,
    last_timestamp: i64,
    thread_seq: i16,
    // Only touched after the clock moved backward.
    regressed_millis: Option<i64>,
    last_random: i32,
    random: Option<StdRng>,
    seed: Option<u64>,
}

impl IdContext {
    /// Creates a context observed at `now_millis` with its counter at 0.
    pub fn new(sequencer_id: u64, now_millis: i64) -> Self {
        Self {
            sequencer_id,
            last_timestamp: now_millis,
            thread_seq: 0,
            regressed_millis: None,
            last_random: 0,
            random: None,
            seed: None,
        }
    }

    /// Creates a context whose clock-regression random source is seeded.
    pub fn with_seed(sequencer_id: u64, now_millis: i64, seed: u64) -> Self {
        let mut context = Self::new(sequencer_id, now_millis);
        context.seed = Some(seed);
        context
    }

    /// Id of the execution context owning this state.
    pub fn sequencer_id(&self) -> u64 {
        self.sequencer_id
    }

    /// Latest wall-clock millisecond adopted by this context.
    pub fn last_timestamp(&self) -> i64 {
        self.last_timestamp
    }

    /// Returns `timestamp * 10000 + counter` for a call observed at `now_millis`.
    pub fn next_seq(&mut self, now_millis: i64) -> i64 {
        let timestamp = self.timestamp(now_millis);
        timestamp * SEQ_PER_MILLI + i64::from(self.next_thread_seq())
    }

    fn timestamp(&mut self, now_millis: i64) -> i64 {
        if now_millis >= self.last_timestamp {
            self.last_timestamp = now_millis;
            return now_millis;
        }

        if self.regressed_millis != Some(now_millis) {
            let seed = self.seed;
            let random = self.random.get_or_insert_with(|| match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            });
            self.last_random = random.gen::<i32>();
            self.regressed_millis = Some(now_millis);
            tracing::debug!(
                sequencer_id = self.sequencer_id,
                now_millis,
                last_timestamp = self.last_timestamp,
                "clock moved backward, using random timestamp component"
            );
        }
        i64::from(self.last_random)
    }

    fn next_thread_seq(&mut self) -> i16 {
        if self.thread_seq == SEQ_WRAP {
            self.thread_seq = 0;
        }
        let seq = self.thread_seq;
        self.thread_seq += 1;
        seq
    }
}
