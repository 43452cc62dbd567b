//! Randomized pacing between sends.

use std::time::Duration;

use bulkline_core::dispatch::DelayRange;
use rand::Rng;

/// Draw a delay uniformly from `range`, bounds included.
pub fn draw_delay<R: Rng>(range: DelayRange, rng: &mut R) -> u64 {
    rng.random_range(range.min_secs()..=range.max_secs())
}

/// The pause inserted after a recipient whose drawn delay was `delay_secs`.
pub fn pause_for(delay_secs: u64) -> Duration {
    Duration::from_secs(delay_secs)
}
