//! The thread-local span buffer: the only moving part on the hot path that
//! isn't already lock-free. One [`LocalSpanBuffer`] is kept per `(thread,
//! trace)` pair in thread-local storage, so it is only ever touched by the
//! thread that owns it — no locking needed until it flushes into the shared
//! [`crate::context::TraceContext`].
//!
//! Grounded on the `TraceLocal`/`thread_local!` design in
//! `tikv-minitrace-rust`'s `trace_local.rs`, generalized from a single
//! global trace to one buffer per live trace per thread.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::clock;
use crate::context::TraceContext;
use crate::slab::{BufferList, SlotRef};
use crate::span::Span;

pub(crate) struct LocalSpanBuffer {
    trace: Arc<TraceContext>,
    buffer: Option<BufferList>,
    ref_count: usize,
}

impl LocalSpanBuffer {
    fn new(trace: Arc<TraceContext>) -> Self {
        LocalSpanBuffer {
            trace,
            buffer: None,
            ref_count: 0,
        }
    }

    /// Record a new open span and bump the ref count. Allocates a fresh
    /// `BufferList` if this is the first live span in the buffer.
    pub(crate) fn push_span(&mut self, parent_id: u64, event: String) -> (SlotRef, u64) {
        if self.buffer.is_none() {
            self.buffer = Some(BufferList::new());
        }
        let id = crate::id::next_span_id();
        let span = Span::new_open(id, parent_id, event, clock::mono_ns());
        let slot = self.buffer.as_mut().expect("just allocated").push(span);
        self.ref_count += 1;
        (slot, id)
    }

    pub(crate) fn add_property(&mut self, slot: SlotRef, key: String, value: String) {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.get_mut(slot).properties.push((key, value));
        }
    }

    /// Close the span at `slot`: stamp its duration and rebase its start
    /// time onto wall-clock. Flushes the whole buffer into the trace context
    /// once the ref count reaches zero.
    pub(crate) fn finish_span(&mut self, slot: SlotRef) {
        let end_mono = clock::mono_ns();
        if let Some(buffer) = self.buffer.as_mut() {
            let span = buffer.get_mut(slot);
            span.duration_ns = end_mono.saturating_sub(span.begin_unix_ns);
            span.begin_unix_ns = clock::rebase(
                self.trace.create_mono_ns,
                self.trace.create_unix_ns,
                span.begin_unix_ns,
            );
        }
        debug_assert!(self.ref_count > 0, "finish_span called more times than push_span");
        self.ref_count = self.ref_count.saturating_sub(1);
        if self.ref_count == 0 {
            if let Some(buffer) = self.buffer.take() {
                self.trace.push_spans(buffer.collect());
            }
        }
    }
}

thread_local! {
    static LOCAL_BUFFERS: RefCell<HashMap<usize, Rc<RefCell<LocalSpanBuffer>>>> =
        RefCell::new(HashMap::new());
}

fn trace_key(trace: &Arc<TraceContext>) -> usize {
    Arc::as_ptr(trace) as usize
}

/// Look up (or create) this thread's buffer for `trace`. Because thread
/// locals are per-thread by construction, a carrier that moved to a new
/// thread automatically lands on a fresh buffer here — the "force a new
/// LocalSpanBuffer on cross-thread transfer" invariant falls out of the
/// storage model rather than needing an explicit check.
pub(crate) fn local_buffer_for(trace: &Arc<TraceContext>) -> Rc<RefCell<LocalSpanBuffer>> {
    LOCAL_BUFFERS.with(|map| {
        map.borrow_mut()
            .entry(trace_key(trace))
            .or_insert_with(|| Rc::new(RefCell::new(LocalSpanBuffer::new(trace.clone()))))
            .clone()
    })
}

/// Drop this thread's buffer entry for `trace` once it has fully drained
/// (ref_count reached zero). Keeps the thread-local map from accumulating
/// one stale entry per trace ever opened on a long-lived thread (e.g. a
/// thread pool worker).
pub(crate) fn release_if_drained(trace: &Arc<TraceContext>) {
    LOCAL_BUFFERS.with(|map| {
        let mut map = map.borrow_mut();
        let key = trace_key(trace);
        let drained = map
            .get(&key)
            .map(|buf| buf.borrow().ref_count == 0)
            .unwrap_or(false);
        if drained {
            map.remove(&key);
        }
    });
}
