//! # microtrace
//!
//! A minimal, low-overhead library for recording hierarchical timing spans
//! and collecting them into a flat list for export to a tracing backend.
//!
//! ## Overview
//!
//! Application code opens a root span with [`start_root`], opens child
//! spans from the [`SpanContext`] carrier returned alongside it, and at the
//! end of the traced operation calls [`TraceHandle::collect`] (or the free
//! function [`collect`]) to get back every span recorded anywhere the
//! carrier traveled — including other threads.
//!
//! The design goal is that recording a span costs close to nothing: each
//! thread keeps its own pool of 256-slot span slabs and only takes a lock
//! when a buffer's last open span finishes and the whole slab gets flushed
//! into the trace's shared collection.
//!
//! ## Example
//!
//! ```
//! use microtrace::start_root;
//!
//! let (ctx, root) = start_root(1, "handle_request").unwrap();
//! {
//!     let mut db = ctx.start_child("db.query");
//!     db.add_property("table", "users");
//!     db.finish();
//! }
//!
//! // `TraceHandle::collect` finishes the root span and drains the trace in
//! // one call — no separate `root.finish()` needed.
//! let (spans, _attachment) = root.collect();
//! assert_eq!(spans.len(), 2);
//! ```
//!
//! ## Crossing threads
//!
//! [`SpanContext`] is `Send` and cheap to clone; spans opened on it always
//! land in the calling thread's own buffer, never the thread that created
//! the carrier:
//!
//! ```
//! use microtrace::start_root;
//! use std::thread;
//!
//! let (ctx, root) = start_root(2, "fan_out").unwrap();
//! let worker_ctx = ctx.clone();
//! let handle = thread::spawn(move || {
//!     let span = worker_ctx.start_child("worker");
//!     span.finish();
//! });
//! handle.join().unwrap();
//! root.finish();
//!
//! let (spans, _) = microtrace::collect(&ctx);
//! assert_eq!(spans.len(), 2);
//! ```

mod api;
mod carrier;
mod clock;
mod context;
mod error;
pub mod exporter;
mod handle;
mod id;
mod local;
mod slab;
mod span;

pub use api::{
    collect, current_id, start_root, start_root_with_attachment, start_span, start_span_with_context,
};
pub use carrier::{CancelContext, ContextKey, NoopCancelContext, SpanContext};
pub use context::TraceContext;
pub use error::TraceError;
pub use handle::{SpanHandle, TraceHandle};
pub use span::Span;
