//! The propagation handle: a cheap, `Clone`-able reference to a trace that
//! can cross thread and task boundaries. Modeled on the `spanContext`
//! wrapping an arbitrary parent `context.Context` in the original Go
//! implementation's `context.go` — here realized as a small
//! [`CancelContext`] trait so this crate stays agnostic to whatever
//! cancellation/deadline machinery the host already uses.

use std::any::Any;
use std::sync::Arc;
use std::thread::ThreadId;

use crate::context::TraceContext;

/// A carrier's attachment point inside a host's own context object. There is
/// only one key today; it exists as an enum (rather than a bare constant) so
/// a future revision can add keys without breaking callers matching on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
    Trace,
}

/// A minimal stand-in for whatever cancellation/deadline context a host
/// application threads through its own call graph (think `context.Context`
/// in Go, or a request-scoped struct in an async framework). `microtrace`
/// only ever reads the one key it wrote.
pub trait CancelContext {
    fn get(&self, key: ContextKey) -> Option<&(dyn Any + Send + Sync)>;
    fn insert(&mut self, key: ContextKey, value: Box<dyn Any + Send + Sync>);
}

/// A [`CancelContext`] for hosts with no cancellation machinery of their
/// own — a synchronous CLI, a test harness, a single-shot batch job.
#[derive(Default)]
pub struct NoopCancelContext {
    slot: Option<Box<dyn Any + Send + Sync>>,
}

impl CancelContext for NoopCancelContext {
    fn get(&self, key: ContextKey) -> Option<&(dyn Any + Send + Sync)> {
        match key {
            ContextKey::Trace => self.slot.as_deref(),
        }
    }

    fn insert(&mut self, key: ContextKey, value: Box<dyn Any + Send + Sync>) {
        match key {
            ContextKey::Trace => self.slot = Some(value),
        }
    }
}

/// The propagation handle for one point in a trace: which trace it belongs
/// to, and which span is the parent of anything opened from here. Cheap to
/// clone and safe to send across threads; the span data itself lives in
/// thread-local storage and is never touched by this type directly.
#[derive(Clone)]
pub struct SpanContext {
    pub(crate) trace: Arc<TraceContext>,
    pub(crate) current_span_id: u64,
    owner_thread: ThreadId,
}

impl SpanContext {
    pub(crate) fn new(trace: Arc<TraceContext>, current_span_id: u64) -> Self {
        SpanContext {
            trace,
            current_span_id,
            owner_thread: std::thread::current().id(),
        }
    }

    pub fn trace_id(&self) -> u64 {
        self.trace.trace_id()
    }

    /// Run `f` against the trace's opaque attachment while the trace is
    /// still live. Returns `None` once the trace has been collected.
    pub fn access_attachment<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(Option<&mut (dyn Any + Send + Sync)>) -> R,
    {
        self.trace.access_attachment(f)
    }

    pub(crate) fn note_thread_if_changed(&self) {
        let here = std::thread::current().id();
        if here != self.owner_thread {
            log::debug!(
                "span context for trace {:#x} crossed from thread {:?} to {:?}; opening on a fresh local buffer",
                self.trace.trace_id(),
                self.owner_thread,
                here
            );
        }
    }

    /// Stash this carrier in `ctx` under the well-known trace key, so a
    /// host's own context propagation carries it along for free.
    pub fn attach(self, ctx: &mut dyn CancelContext) {
        ctx.insert(ContextKey::Trace, Box::new(self));
    }

    /// Recover a previously attached carrier from a host context.
    pub fn from_context(ctx: &dyn CancelContext) -> Option<&SpanContext> {
        ctx.get(ContextKey::Trace)?.downcast_ref::<SpanContext>()
    }
}
