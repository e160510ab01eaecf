use std::thread;

use microtrace::start_root;

fn main() {
    env_logger::init();

    let (ctx, root) = start_root(1, "handle_request").unwrap();

    {
        let mut db = ctx.start_child("db.query");
        db.add_property("table", "users");
        db.add_property("rows", "42");
        db.finish();
    }

    let worker_ctx = ctx.clone();
    let worker = thread::spawn(move || {
        let span = worker_ctx.start_child("background.cache_warm");
        span.finish();
    });
    worker.join().unwrap();

    root.finish();

    let (spans, _attachment) = microtrace::collect(&ctx);
    for span in &spans {
        println!(
            "span {} parent={} event={} duration_ns={}",
            span.id, span.parent_id, span.event, span.duration_ns
        );
    }
}
