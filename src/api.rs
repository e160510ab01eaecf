//! Entry points: start a trace, open child spans from a carrier, and
//! collect everything recorded once the trace is done.
//!
//! ```
//! use microtrace::start_root;
//!
//! let (ctx, root) = start_root(1, "request").unwrap();
//! let mut child = ctx.start_child("db.query");
//! child.add_property("table", "users");
//! child.finish();
//! drop(root);
//!
//! let (spans, _) = microtrace::collect(&ctx);
//! assert_eq!(spans.len(), 2);
//! ```

use std::any::Any;

use crate::carrier::{CancelContext, SpanContext};
use crate::context::TraceContext;
use crate::error::TraceError;
use crate::handle::{SpanHandle, TraceHandle};
use crate::local;

/// Begin a new trace and its root span. `trace_id` is caller-supplied and
/// must be non-zero (callers that don't have a natural id of their own can
/// use [`crate::id`]'s policy by generating one themselves before calling
/// this). This is the crate's only other fallible entry point besides
/// exporter config construction — everything after the root span is open
/// stays infallible.
pub fn start_root(trace_id: u64, event: impl Into<String>) -> Result<(SpanContext, TraceHandle), TraceError> {
    start_root_with_attachment(trace_id, event, None)
}

/// As [`start_root`], with an opaque attachment stored alongside the
/// collected spans (e.g. a request id or a sampling decision the exporter
/// wants to see again at collect time).
pub fn start_root_with_attachment(
    trace_id: u64,
    event: impl Into<String>,
    attachment: Option<Box<dyn Any + Send + Sync>>,
) -> Result<(SpanContext, TraceHandle), TraceError> {
    if trace_id == 0 {
        return Err(TraceError::ZeroTraceId);
    }
    let trace = TraceContext::new(trace_id, attachment);
    let root_ctx = SpanContext::new(trace.clone(), 0);
    let handle = open_span(&root_ctx, event.into());
    // The carrier handed back to the caller must point at the root span's
    // real id, not the placeholder 0 used to open it — otherwise every span
    // opened directly off it would be parented at 0, i.e. a second root.
    let ctx = handle.context();
    Ok((ctx, TraceHandle::new(handle)))
}

impl SpanContext {
    /// Open a child span whose parent is this carrier's current span. Safe
    /// to call from a different thread than the one that created the
    /// carrier: the underlying buffer is always this thread's own.
    pub fn start_child(&self, event: impl Into<String>) -> SpanHandle {
        self.note_thread_if_changed();
        open_span(self, event.into())
    }
}

fn open_span(ctx: &SpanContext, event: String) -> SpanHandle {
    if ctx.trace.is_terminated() {
        log::debug!(
            "start_child called on trace {:#x} after it was collected; returning a no-op span",
            ctx.trace.trace_id()
        );
        return SpanHandle::new_noop(ctx.trace.clone(), 0);
    }
    let buffer = local::local_buffer_for(&ctx.trace);
    let (slot, span_id) = buffer.borrow_mut().push_span(ctx.current_span_id, event);
    SpanHandle::new_open(ctx.trace.clone(), span_id, buffer, slot)
}

/// Open a child span by recovering the carrier from a host's own
/// cancellation/deadline context rather than holding one directly. If the
/// host context has no carrier attached — the calling code isn't part of
/// any trace — returns a no-op handle rather than failing: tracing must
/// never become a hard dependency for code paths that don't have one.
pub fn start_span(host_ctx: &dyn CancelContext, event: impl Into<String>) -> SpanHandle {
    match SpanContext::from_context(host_ctx) {
        Some(ctx) => ctx.start_child(event),
        None => SpanHandle::detached_noop(),
    }
}

/// As [`start_span`], also returning a carrier (attached under the same
/// host context's well-known key by the caller, if desired) for passing to
/// further callees.
pub fn start_span_with_context(
    host_ctx: &dyn CancelContext,
    event: impl Into<String>,
) -> (Option<SpanContext>, SpanHandle) {
    match SpanContext::from_context(host_ctx) {
        Some(ctx) => {
            let handle = ctx.start_child(event);
            (Some(handle.context()), handle)
        }
        None => (None, SpanHandle::detached_noop()),
    }
}

/// The currently active `(span_id, trace_id)` pair, if `host_ctx` carries a
/// live tracing carrier.
pub fn current_id(host_ctx: &dyn CancelContext) -> Option<(u64, u64)> {
    let ctx = SpanContext::from_context(host_ctx)?;
    Some((ctx.current_span_id, ctx.trace_id()))
}

/// Collect everything recorded on the trace `ctx` belongs to, and terminate
/// it. Any span handle still open at this point will flush into an
/// already-collected trace and be silently dropped — finish spans before
/// collecting if you need them represented.
pub fn collect(ctx: &SpanContext) -> (Vec<crate::span::Span>, Option<Box<dyn Any + Send + Sync>>) {
    ctx.trace.collect()
}
