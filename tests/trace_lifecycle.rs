use std::collections::HashMap;
use std::thread;

use microtrace::{current_id, start_root, start_span, NoopCancelContext, Span};

fn by_id(spans: &[Span]) -> HashMap<u64, &Span> {
    spans.iter().map(|s| (s.id, s)).collect()
}

#[test]
fn root_only_trace() {
    let (ctx, root) = start_root(1, "request").unwrap();
    root.finish();
    let (spans, _) = microtrace::collect(&ctx);
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].parent_id, 0);
}

#[test]
fn trace_handle_collect_finishes_the_root_without_a_separate_call() {
    let (_ctx, root) = start_root(10, "request").unwrap();
    let (spans, _) = root.collect();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].parent_id, 0);
}

#[test]
fn children_opened_off_the_returned_carrier_are_parented_at_the_real_root() {
    let (ctx, root) = start_root(11, "request").unwrap();
    let root_id = root.span_id();
    assert_ne!(root_id, 0);
    let child = ctx.start_child("child");
    let child_id = child.span_id();
    child.finish();
    root.finish();
    let (spans, _) = microtrace::collect(&ctx);
    let idx = by_id(&spans);
    assert_eq!(idx[&child_id].parent_id, root_id);
}

#[test]
fn linear_chain_of_four() {
    let (ctx, root) = start_root(2, "a").unwrap();
    let b = ctx.start_child("b");
    let b_ctx = b.context();
    let c = b_ctx.start_child("c");
    let c_ctx = c.context();
    let d = c_ctx.start_child("d");

    let root_id = root.span_id();
    let b_id = b.span_id();
    let c_id = c.span_id();

    d.finish();
    c.finish();
    b.finish();
    root.finish();

    let (spans, _) = microtrace::collect(&ctx);
    assert_eq!(spans.len(), 4);
    let idx = by_id(&spans);
    assert_eq!(idx[&b_id].parent_id, root_id);
    assert_eq!(idx[&c_id].parent_id, b_id);
}

#[test]
fn fan_out_across_ten_threads() {
    let (ctx, root) = start_root(3, "fan-out").unwrap();
    let handles: Vec<_> = (0..10)
        .map(|i| {
            let carrier = ctx.clone();
            thread::spawn(move || {
                let span = carrier.start_child(format!("worker-{i}"));
                thread::yield_now();
                span.finish();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    root.finish();

    let (spans, _) = microtrace::collect(&ctx);
    assert_eq!(spans.len(), 11);
    let root_count = spans.iter().filter(|s| s.parent_id == 0).count();
    assert_eq!(root_count, 1);
}

#[test]
fn nested_spans_close_inner_before_outer() {
    let (ctx, outer) = start_root(4, "outer").unwrap();
    let inner = outer.context().start_child("inner");
    let innermost = inner.context().start_child("innermost");
    innermost.finish();
    inner.finish();
    outer.finish();
    let (spans, _) = microtrace::collect(&ctx);
    assert_eq!(spans.len(), 3);
}

#[test]
fn deep_sequential_ten_thousand_spans() {
    let (ctx, root) = start_root(5, "root").unwrap();
    let mut carrier = ctx.clone();
    for i in 0..10_000u32 {
        let span = carrier.start_child(format!("step-{i}"));
        carrier = span.context();
        span.finish();
    }
    root.finish();
    let (spans, _) = microtrace::collect(&ctx);
    assert_eq!(spans.len(), 10_001);
}

#[test]
fn properties_are_observable_in_insertion_order() {
    let (ctx, mut root) = start_root(6, "op").unwrap();
    root.add_property("method", "GET");
    root.add_property("status", "200");
    root.finish();
    let (spans, _) = microtrace::collect(&ctx);
    assert_eq!(
        spans[0].properties,
        vec![
            ("method".to_string(), "GET".to_string()),
            ("status".to_string(), "200".to_string()),
        ]
    );
}

#[test]
fn spans_opened_without_an_active_trace_are_harmless() {
    let (ctx, root) = start_root(7, "op").unwrap();
    root.finish();
    microtrace::collect(&ctx);

    // The trace is gone; opening and finishing further spans on the same
    // carrier must not panic and must not resurrect the trace.
    let mut late = ctx.start_child("late");
    late.add_property("k", "v");
    late.finish();

    let (spans, _) = microtrace::collect(&ctx);
    assert!(spans.is_empty());
}

#[test]
fn start_span_with_no_active_trace_is_a_no_op() {
    let background = NoopCancelContext::default();
    assert!(current_id(&background).is_none());
    let mut handle = start_span(&background, "x");
    handle.add_property("k", "v");
    handle.finish();
}

#[test]
fn durations_are_non_negative_and_start_times_are_plausible() {
    let (ctx, root) = start_root(8, "timed").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(1));
    root.finish();
    let (spans, _) = microtrace::collect(&ctx);
    let now_unix_ns = chrono::Utc::now().timestamp_nanos_opt().unwrap() as u64;
    assert!(spans[0].duration_ns >= 1_000_000);
    assert!(spans[0].begin_unix_ns <= now_unix_ns);
}
