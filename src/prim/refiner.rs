//! Collectors handed to primitives while they refine.

use std::sync::mpsc::Sender;

use super::PrimitiveHandle;

/// Receives the primitives produced by one refinement step.
pub trait Refiner {
    fn add_primitive(&mut self, prim: PrimitiveHandle);

    /// True if a primitive may fan its own work out across threads.
    fn allow_threading(&self) -> bool {
        false
    }
}

/// Gathers produced primitives into a vector.
#[derive(Debug, Default)]
pub struct CollectRefiner {
    prims: Vec<PrimitiveHandle>,
    threading: bool,
}

impl CollectRefiner {
    pub fn new(threading: bool) -> Self {
        Self {
            prims: Vec::new(),
            threading,
        }
    }

    pub fn len(&self) -> usize {
        self.prims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prims.is_empty()
    }

    pub fn primitives(&self) -> &[PrimitiveHandle] {
        &self.prims
    }

    pub fn into_primitives(self) -> Vec<PrimitiveHandle> {
        self.prims
    }
}

impl Refiner for CollectRefiner {
    fn add_primitive(&mut self, prim: PrimitiveHandle) {
        self.prims.push(prim);
    }

    fn allow_threading(&self) -> bool {
        self.threading
    }
}

/// Forwards produced primitives to a channel shared by parallel producers.
///
/// Each producer owns a clone; the receiving side sees primitives in
/// arrival order.
#[derive(Clone, Debug)]
pub struct ChannelRefiner {
    tx: Sender<PrimitiveHandle>,
    sent: usize,
}

impl ChannelRefiner {
    pub fn new(tx: Sender<PrimitiveHandle>) -> Self {
        Self { tx, sent: 0 }
    }

    /// Primitives sent through this clone.
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl Refiner for ChannelRefiner {
    fn add_primitive(&mut self, prim: PrimitiveHandle) {
        if self.tx.send(prim).is_ok() {
            self.sent += 1;
        } else {
            tracing::debug!("refine receiver dropped, primitive discarded");
        }
    }

    fn allow_threading(&self) -> bool {
        true
    }
}
