//! Span identity generation. The default policy is a relaxed, process-wide
//! atomic counter starting at 1 — 0 is reserved to mean "no parent". The
//! `random-ids` feature swaps in `rand::random()` for hosts that would
//! rather avoid a shared counter at the cost of a (vanishingly unlikely)
//! collision.

#[cfg(not(feature = "random-ids"))]
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(not(feature = "random-ids"))]
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[cfg(not(feature = "random-ids"))]
pub(crate) fn next_span_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(feature = "random-ids")]
pub(crate) fn next_span_id() -> u64 {
    loop {
        let id = rand::random::<u64>();
        if id != 0 {
            return id;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ids_are_unique_and_nonzero() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1_000 {
            let id = next_span_id();
            assert_ne!(id, 0);
            assert!(seen.insert(id), "duplicate id {id}");
        }
    }
}
