/// One recorded timing interval, as exported from a finished trace.
///
/// `parent_id` of `0` means the span is a root of the trace; `begin_unix_ns`
/// is always wall-clock, even though it is derived from a monotonic reading
/// internally (see [`crate::clock`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub id: u64,
    pub parent_id: u64,
    pub begin_unix_ns: u64,
    pub duration_ns: u64,
    pub event: String,
    pub properties: Vec<(String, String)>,
}

impl Span {
    pub(crate) fn new_open(id: u64, parent_id: u64, event: String, begin_mono_ns: u64) -> Self {
        Span {
            id,
            parent_id,
            // begin_unix_ns holds the raw monotonic reading until finish()
            // rebases it; see LocalSpanBuffer::finish_span.
            begin_unix_ns: begin_mono_ns,
            duration_ns: 0,
            event,
            properties: Vec::new(),
        }
    }
}
