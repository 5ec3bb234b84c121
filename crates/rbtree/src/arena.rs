use std::sync::atomic::{AtomicU32, Ordering};

#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Id(u32);

impl Id {
    /// Slot 0 holds the sentinel; a link to it means "no child".
    pub(crate) const NIL: Self = Self(0);

    #[inline(always)]
    pub(crate) fn is_nil(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    fn idx(self) -> usize {
        self.0 as usize
    }
}

pub(crate) const LEFT: usize = 0;
pub(crate) const RIGHT: usize = 1;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Node {
    pub key: i64,
    pub red: bool,
    pub ch: [Id; 2],
    pub parent: Id,
}

/// Opaque handle to a node, as returned by `insert` and `find`.
///
/// A handle stays valid until the node it refers to is physically removed
/// by `erase`; after that every use of it reports `Error::InvalidHandle`,
/// even if the underlying slot has been reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId {
    tag: u32,
    id: Id,
    generation: u32,
}

#[derive(Clone, Copy)]
struct Slot {
    node: Node,
    generation: u32,
}

static NEXT_TAG: AtomicU32 = AtomicU32::new(0);

/// Slot store for one tree: slot 0 is the always-black sentinel, freed
/// slots are recycled through a free list. Generations detect stale
/// handles across reuse; the tag detects handles from another tree.
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free: Vec<Id>,
    tag: u32,
}

impl Arena {
    pub(crate) fn new() -> Self {
        let sentinel = Slot {
            node: Node {
                key: 0,
                red: false,
                ch: [Id::NIL, Id::NIL],
                parent: Id::NIL,
            },
            generation: 0,
        };
        Self {
            slots: vec![sentinel],
            free: Vec::new(),
            tag: NEXT_TAG.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Allocates a red leaf with both children at the sentinel.
    pub(crate) fn alloc(&mut self, key: i64) -> Id {
        let node = Node {
            key,
            red: true,
            ch: [Id::NIL, Id::NIL],
            parent: Id::NIL,
        };
        match self.free.pop() {
            Some(id) => {
                self.slots[id.idx()].node = node;
                id
            }
            None => {
                debug_assert!(self.slots.len() < u32::MAX as usize);
                let id = Id(self.slots.len() as u32);
                self.slots.push(Slot {
                    node,
                    generation: 0,
                });
                id
            }
        }
    }

    /// Returns the slot to the free list. Bumping the generation here is
    /// what invalidates every handle issued for this slot so far.
    pub(crate) fn free(&mut self, id: Id) {
        debug_assert!(!id.is_nil());
        self.slots[id.idx()].generation += 1;
        self.free.push(id);
    }

    #[inline(always)]
    pub(crate) fn node(&self, id: Id) -> &Node {
        debug_assert!(id.idx() < self.slots.len());
        &self.slots[id.idx()].node
    }

    #[inline(always)]
    pub(crate) fn node_mut(&mut self, id: Id) -> &mut Node {
        debug_assert!(id.idx() < self.slots.len());
        &mut self.slots[id.idx()].node
    }

    pub(crate) fn handle(&self, id: Id) -> NodeId {
        debug_assert!(!id.is_nil());
        NodeId {
            tag: self.tag,
            id,
            generation: self.slots[id.idx()].generation,
        }
    }

    /// Maps a handle back to its slot, or `None` when the handle belongs
    /// to another tree, points at a recycled slot, or was never issued by
    /// this arena.
    pub(crate) fn resolve(&self, handle: NodeId) -> Option<Id> {
        if handle.tag != self.tag || handle.id.is_nil() {
            return None;
        }
        let slot = self.slots.get(handle.id.idx())?;
        if slot.generation != handle.generation {
            return None;
        }
        Some(handle.id)
    }
}
