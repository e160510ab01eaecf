//! Fixed-size span slabs, chained into a per-trace, per-thread buffer list,
//! and pooled process-wide so steady-state tracing allocates nothing.
//!
//! Grounded on the buffer-list/slab split in `minitrace-go`'s
//! `buffer_list.go` (256-span slabs, `sync.Pool` recycling) and on the
//! `Vec`-based, split-off flushing style of `tikv-minitrace-rust`'s
//! `trace_local.rs`.

use parking_lot::Mutex;

use crate::span::Span;

/// Spans per slab. Matches the `POW = 8` sizing (`1 << 8`) used by the
/// reference implementation this crate's buffering strategy is modeled on.
pub(crate) const SLAB_CAPACITY: usize = 256;

pub(crate) struct Slab {
    spans: Vec<Span>,
}

impl Slab {
    fn new() -> Self {
        Slab {
            spans: Vec::with_capacity(SLAB_CAPACITY),
        }
    }

    fn reset(&mut self) {
        self.spans.clear();
    }
}

static SLAB_POOL: Mutex<Vec<Box<Slab>>> = Mutex::new(Vec::new());

fn acquire_slab() -> Box<Slab> {
    if let Some(slab) = SLAB_POOL.lock().pop() {
        return slab;
    }
    log::trace!("span slab pool empty, allocating a new 256-slot slab");
    Box::new(Slab::new())
}

fn release_slab(mut slab: Box<Slab>) {
    slab.reset();
    SLAB_POOL.lock().push(slab);
}

/// Opaque reference to a slot within a [`BufferList`]. Valid only for the
/// buffer list that issued it, and only until that list is collected.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SlotRef {
    slab_index: usize,
    offset: usize,
}

/// A thread-confined, append-only chain of slabs. Never shared across
/// threads or stored behind a lock — the owning [`crate::local::LocalSpanBuffer`]
/// is itself thread-confined.
pub(crate) struct BufferList {
    slabs: Vec<Box<Slab>>,
    len: usize,
}

impl BufferList {
    pub(crate) fn new() -> Self {
        BufferList {
            slabs: Vec::new(),
            len: 0,
        }
    }

    /// Append `span`, growing the chain with a (possibly pooled) slab when
    /// the current one is full. Returns a handle usable with [`Self::get_mut`].
    pub(crate) fn push(&mut self, span: Span) -> SlotRef {
        if self.len % SLAB_CAPACITY == 0 {
            self.slabs.push(acquire_slab());
        }
        let slab = self.slabs.last_mut().expect("slab just pushed");
        slab.spans.push(span);
        let slot = SlotRef {
            slab_index: self.slabs.len() - 1,
            offset: slab.spans.len() - 1,
        };
        self.len += 1;
        slot
    }

    pub(crate) fn get_mut(&mut self, slot: SlotRef) -> &mut Span {
        &mut self.slabs[slot.slab_index].spans[slot.offset]
    }

    /// Flatten every slab into one vector in append order and return all
    /// slabs to the process pool. Order across slabs is preserved; order
    /// relative to spans flushed by other buffer lists is not.
    pub(crate) fn collect(mut self) -> Vec<Span> {
        if self.len == 0 {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.len);
        for slab in self.slabs.drain(..) {
            let mut slab = slab;
            out.append(&mut slab.spans);
            release_slab(slab);
        }
        out
    }
}

impl Default for BufferList {
    fn default() -> Self {
        Self::new()
    }
}
