//! The open-span handle returned to callers. Thread-confined (it borrows a
//! `Rc`-backed local buffer), `Drop`-safe, and a silent no-op once the
//! owning trace has already been collected — mirrors the ref-count-then-
//! release pattern the teacher crate uses for its own span registry in
//! `layer::common::{addref_span, release_span}`.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::carrier::SpanContext;
use crate::context::TraceContext;
use crate::local::{self, LocalSpanBuffer};
use crate::slab::SlotRef;
use crate::span::Span;

/// A single open span. Call [`SpanHandle::add_property`] any number of
/// times, then either call [`SpanHandle::finish`] explicitly or let the
/// handle drop — both end the span exactly once.
pub struct SpanHandle {
    trace: Arc<TraceContext>,
    span_id: u64,
    // `None` once finished, and also for spans opened against an already
    // terminated (or detached-noop) trace: every method below becomes a
    // no-op in that state.
    open: Option<OpenSpan>,
}

struct OpenSpan {
    buffer: Rc<RefCell<LocalSpanBuffer>>,
    slot: SlotRef,
}

impl SpanHandle {
    pub(crate) fn new_noop(trace: Arc<TraceContext>, span_id: u64) -> Self {
        SpanHandle {
            trace,
            span_id,
            open: None,
        }
    }

    /// A handle for code that tried to open a span with no tracing context
    /// in scope at all. Backed by an already-terminated, unreachable trace
    /// (trace id 0, the reserved "no parent" sentinel) so every operation on
    /// it — including `context()` — behaves exactly like any other no-op
    /// handle, with nothing observable ever reaching a real collector.
    pub(crate) fn detached_noop() -> Self {
        let trace = TraceContext::new(0, None);
        trace.collect();
        SpanHandle {
            trace,
            span_id: 0,
            open: None,
        }
    }

    pub(crate) fn new_open(
        trace: Arc<TraceContext>,
        span_id: u64,
        buffer: Rc<RefCell<LocalSpanBuffer>>,
        slot: SlotRef,
    ) -> Self {
        SpanHandle {
            trace,
            span_id,
            open: Some(OpenSpan { buffer, slot }),
        }
    }

    pub fn span_id(&self) -> u64 {
        self.span_id
    }

    /// A carrier pointing at this span as the parent of anything opened from
    /// it — the handle for crossing a thread or task boundary.
    pub fn context(&self) -> SpanContext {
        SpanContext::new(self.trace.clone(), self.span_id)
    }

    /// Attach a key/value property. Dropped silently if the span (or its
    /// trace) has already finished — properties added after finish are
    /// never observable, by design of the underlying buffer.
    pub fn add_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        if let Some(open) = &self.open {
            open.buffer
                .borrow_mut()
                .add_property(open.slot, key.into(), value.into());
        }
    }

    /// Run `f` against the trace's opaque attachment while the trace is
    /// still live. Returns `None` once the trace has been collected.
    pub fn access_attachment<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(Option<&mut (dyn Any + Send + Sync)>) -> R,
    {
        self.trace.access_attachment(f)
    }

    /// End the span. Equivalent to dropping the handle, spelled out for
    /// callers who want the end time to be explicit rather than wherever the
    /// handle happens to go out of scope.
    pub fn finish(mut self) {
        self.finish_inner();
    }

    fn finish_inner(&mut self) {
        if let Some(open) = self.open.take() {
            open.buffer.borrow_mut().finish_span(open.slot);
            local::release_if_drained(&self.trace);
        }
    }

    pub(crate) fn trace_arc(&self) -> &Arc<TraceContext> {
        &self.trace
    }
}

impl Drop for SpanHandle {
    fn drop(&mut self) {
        self.finish_inner();
    }
}

/// The root span of a trace, with the added authority to terminate the whole
/// trace. Returned by [`crate::start_root`]; every span opened after the
/// root is a plain [`SpanHandle`].
pub struct TraceHandle {
    root: SpanHandle,
}

impl TraceHandle {
    pub(crate) fn new(root: SpanHandle) -> Self {
        TraceHandle { root }
    }

    pub fn span_id(&self) -> u64 {
        self.root.span_id()
    }

    /// A carrier pointing at the root span, for opening children or crossing
    /// threads.
    pub fn context(&self) -> SpanContext {
        self.root.context()
    }

    pub fn add_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.root.add_property(key, value);
    }

    pub fn access_attachment<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(Option<&mut (dyn Any + Send + Sync)>) -> R,
    {
        self.root.access_attachment(f)
    }

    /// End the root span without collecting the trace yet. Equivalent to
    /// [`SpanHandle::finish`] on the embedded root.
    pub fn finish(self) {
        self.root.finish();
    }

    /// Finish the root span and collect everything recorded for the trace in
    /// one terminal operation — the root's `ref_count` only reaches zero once
    /// this runs, so there is no need to call `finish` first.
    pub fn collect(self) -> (Vec<Span>, Option<Box<dyn Any + Send + Sync>>) {
        let trace = self.root.trace_arc().clone();
        self.root.finish();
        trace.collect()
    }
}
