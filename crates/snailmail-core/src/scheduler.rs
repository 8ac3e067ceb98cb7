//! Randomized pacing between sends.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Lower bound of the random jitter added to the base delay, in seconds.
pub const JITTER_MIN: i64 = 1;
/// Upper bound (inclusive) of the random jitter, in seconds.
pub const JITTER_MAX: i64 = 10;

/// Chooses how long to wait after each send.
///
/// A base of zero or less disables waiting. Otherwise each delay is the
/// base plus a uniform jitter in `1..=10` seconds.
#[derive(Debug, Clone)]
pub struct SendScheduler<R = StdRng> {
    base_seconds: i64,
    rng: R,
}

impl SendScheduler<StdRng> {
    /// Creates a scheduler seeded from the operating system.
    #[must_use]
    pub fn new(base_seconds: i64) -> Self {
        Self::with_rng(base_seconds, StdRng::from_entropy())
    }
}

impl<R: Rng> SendScheduler<R> {
    /// Creates a scheduler with a caller-supplied random source.
    pub const fn with_rng(base_seconds: i64, rng: R) -> Self {
        Self { base_seconds, rng }
    }

    /// Configured base delay in seconds.
    #[must_use]
    pub const fn base_seconds(&self) -> i64 {
        self.base_seconds
    }

    /// Returns the next delay in whole seconds; `0` means do not wait.
    pub fn next_delay_seconds(&mut self) -> u64 {
        next_delay_seconds(self.base_seconds, &mut self.rng)
    }

    /// Returns the next delay as a [`Duration`].
    pub fn next_delay(&mut self) -> Duration {
        Duration::from_secs(self.next_delay_seconds())
    }
}

/// Computes one delay: `0` when `base <= 0`, else `base + rand(1..=10)`.
pub fn next_delay_seconds<R: Rng + ?Sized>(base: i64, rng: &mut R) -> u64 {
    if base <= 0 {
        return 0;
    }
    let jitter = rng.gen_range(JITTER_MIN..=JITTER_MAX);
    u64::try_from(base.saturating_add(jitter)).unwrap_or(u64::MAX)
}
