//! Dual clock source: a monotonic counter for measuring durations and a
//! wall-clock reader for stamping trace origins. The two are never combined
//! into a single read on the hot path; see [`crate::context::TraceContext`]
//! for how a monotonic delta gets rebased onto a wall-clock origin.

use std::sync::LazyLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

static MONO_EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Nanoseconds elapsed since an arbitrary, process-local epoch. Only
/// meaningful relative to other calls to this function; never exposed
/// outside the crate.
pub(crate) fn mono_ns() -> u64 {
    Instant::now()
        .saturating_duration_since(*MONO_EPOCH)
        .as_nanos() as u64
}

/// Nanoseconds since the Unix epoch, per the system wall clock.
pub(crate) fn unix_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::new(0, 0))
        .as_nanos() as u64
}

/// Rebase a monotonic reading taken after `origin_mono` onto the wall-clock
/// time implied by `origin_unix`, avoiding a second `SystemTime::now()` call
/// per span.
pub(crate) fn rebase(origin_mono: u64, origin_unix: u64, sample_mono: u64) -> u64 {
    origin_unix + sample_mono.saturating_sub(origin_mono)
}
