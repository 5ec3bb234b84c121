use crate::arena::{Arena, Id, LEFT, NodeId, RIGHT};
use crate::error::Error;

/// Red-black tree over `i64` keys.
///
/// - Duplicate keys are allowed; equal keys descend into the right
///   subtree, so repeated inserts of one key are stable toward the right.
/// - `insert` and `find` hand out opaque [`NodeId`] handles. A handle
///   dies with the node it refers to and is rejected afterwards; which of
///   several equal-keyed nodes a lookup matches is positional, not
///   guaranteed.
/// - Mutations keep the usual red-black invariants: black root, no
///   red-red edge, uniform black-height on every path to a leaf.
pub struct RbTree {
    arena: Arena,
    root: Id,
    len: usize,
}

impl RbTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: Id::NIL,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    fn is_red(&self, x: Id) -> bool {
        self.arena.node(x).red
    }

    /// Which child of its parent `x` is. Caller guarantees `x` is not the
    /// root.
    #[inline(always)]
    fn side_of(&self, x: Id) -> usize {
        let parent = self.arena.node(x).parent;
        if self.arena.node(parent).ch[LEFT] == x {
            LEFT
        } else {
            RIGHT
        }
    }

    fn swap_colors(&mut self, a: Id, b: Id) {
        let a_red = self.arena.node(a).red;
        let b_red = self.arena.node(b).red;
        self.arena.node_mut(a).red = b_red;
        self.arena.node_mut(b).red = a_red;
    }

    /// Promotes `x` over its parent, preserving the in-order sequence.
    /// `x`'s inner subtree (the child on the side `x` came from, possibly
    /// the sentinel) moves onto the demoted parent. Colors are untouched;
    /// callers recolor explicitly.
    fn rotate_up(&mut self, x: Id) {
        let parent = self.arena.node(x).parent;
        let grand = self.arena.node(parent).parent;
        let side = self.side_of(x);
        let inner = self.arena.node(x).ch[1 - side];

        if parent == self.root {
            self.root = x;
        } else {
            let pside = if self.arena.node(grand).ch[LEFT] == parent {
                LEFT
            } else {
                RIGHT
            };
            self.arena.node_mut(grand).ch[pside] = x;
        }
        self.arena.node_mut(x).parent = grand;
        self.arena.node_mut(parent).parent = x;
        self.arena.node_mut(x).ch[1 - side] = parent;
        // `inner` may be the sentinel; scribbling its parent is harmless.
        self.arena.node_mut(inner).parent = parent;
        self.arena.node_mut(parent).ch[side] = inner;
    }

    /// Inserts `key` and returns a handle to the new node.
    pub fn insert(&mut self, key: i64) -> NodeId {
        let node = self.arena.alloc(key);
        if self.root.is_nil() {
            self.root = node;
        } else {
            let mut current = self.root;
            loop {
                let side = if key < self.arena.node(current).key {
                    LEFT
                } else {
                    RIGHT
                };
                let child = self.arena.node(current).ch[side];
                if child.is_nil() {
                    self.arena.node_mut(current).ch[side] = node;
                    self.arena.node_mut(node).parent = current;
                    break;
                }
                current = child;
            }
        }
        self.insert_fixup(node);
        self.len += 1;
        self.arena.handle(node)
    }

    /// Restores the invariants after attaching a red leaf. Recurses
    /// toward the root only in the red-uncle case.
    fn insert_fixup(&mut self, x: Id) {
        if x == self.root {
            self.arena.node_mut(x).red = false;
            return;
        }
        let parent = self.arena.node(x).parent;
        if !self.is_red(parent) {
            return;
        }

        // Parent is red, hence not the root, hence the grandparent is real.
        let grand = self.arena.node(parent).parent;
        let pside = self.side_of(parent);
        let uncle = self.arena.node(grand).ch[1 - pside];

        if self.is_red(uncle) {
            self.arena.node_mut(parent).red = false;
            self.arena.node_mut(uncle).red = false;
            self.arena.node_mut(grand).red = true;
            self.insert_fixup(grand);
            return;
        }

        if self.side_of(x) == pside {
            // x and its parent share a side: single rotation, then swap
            // colors with the demoted grandparent.
            self.rotate_up(parent);
            let below = self.arena.node(parent).ch[1 - pside];
            self.swap_colors(parent, below);
        } else {
            // Opposite sides: double rotation brings x to the top; the
            // demoted grandparent ends up opposite the parent's old side.
            self.rotate_up(x);
            self.rotate_up(x);
            let below = self.arena.node(x).ch[1 - pside];
            self.swap_colors(x, below);
        }
    }

    /// Returns a handle to some node holding `key`, or `None`. With
    /// duplicates present, which node is matched is positional.
    pub fn find(&self, key: i64) -> Option<NodeId> {
        let mut current = self.root;
        while !current.is_nil() {
            let node = self.arena.node(current);
            if key == node.key {
                return Some(self.arena.handle(current));
            }
            current = node.ch[if key < node.key { LEFT } else { RIGHT }];
        }
        None
    }

    /// Reads the key behind a live handle.
    pub fn key(&self, handle: NodeId) -> Result<i64, Error> {
        let id = self.arena.resolve(handle).ok_or(Error::InvalidHandle)?;
        Ok(self.arena.node(id).key)
    }

    pub fn min(&self) -> Result<NodeId, Error> {
        if self.root.is_nil() {
            return Err(Error::EmptyTree);
        }
        Ok(self.arena.handle(self.extreme(self.root, LEFT)))
    }

    pub fn max(&self) -> Result<NodeId, Error> {
        if self.root.is_nil() {
            return Err(Error::EmptyTree);
        }
        Ok(self.arena.handle(self.extreme(self.root, RIGHT)))
    }

    /// Last real node reached by following `side` links from `current`.
    fn extreme(&self, mut current: Id, side: usize) -> Id {
        loop {
            let next = self.arena.node(current).ch[side];
            if next.is_nil() {
                return current;
            }
            current = next;
        }
    }

    /// Removes the node behind `handle`.
    ///
    /// When the node has two real children, its key is overwritten with
    /// the in-order successor's key and the successor node is the one
    /// physically removed: the passed handle stays live (now naming the
    /// successor's key) while any handle to the successor dies.
    pub fn erase(&mut self, handle: NodeId) -> Result<(), Error> {
        let target = self.arena.resolve(handle).ok_or(Error::InvalidHandle)?;

        let left = self.arena.node(target).ch[LEFT];
        let right = self.arena.node(target).ch[RIGHT];
        let (removed, replacement);
        if !left.is_nil() && !right.is_nil() {
            // Two children: move the successor's key into place so the
            // node physically removed has no left child.
            removed = self.extreme(right, LEFT);
            replacement = self.arena.node(removed).ch[RIGHT];
            let successor_key = self.arena.node(removed).key;
            self.arena.node_mut(target).key = successor_key;
        } else {
            removed = target;
            replacement = if !right.is_nil() { right } else { left };
        }

        if removed == self.root {
            // At most two nodes were present; no deficit can arise.
            self.root = replacement;
            self.arena.node_mut(replacement).parent = Id::NIL;
            self.arena.node_mut(replacement).red = false;
            self.arena.free(removed);
            self.len -= 1;
            return Ok(());
        }

        let parent = self.arena.node(removed).parent;
        let was_black = !self.arena.node(removed).red;
        let side = self.side_of(removed);
        self.arena.node_mut(parent).ch[side] = replacement;
        self.arena.node_mut(replacement).parent = parent;
        self.arena.free(removed);
        self.len -= 1;

        // Removing a black node leaves a black-height deficit at the
        // replacement's position.
        if was_black {
            self.erase_fixup(parent, side);
        }
        Ok(())
    }

    /// Resolves the deficit carried by `parent`'s child on `side`. Each
    /// recursion either stays at the same level after a reduction
    /// rotation or moves strictly toward the root.
    fn erase_fixup(&mut self, parent: Id, side: usize) {
        let extra = self.arena.node(parent).ch[side];
        if self.is_red(extra) {
            // Red-and-black: the extra black is absorbed by recoloring.
            self.arena.node_mut(extra).red = false;
            return;
        }

        let sibling = self.arena.node(parent).ch[1 - side];
        if self.is_red(sibling) {
            // Red sibling: rotate it up to reduce to a black-sibling case.
            self.rotate_up(sibling);
            self.swap_colors(sibling, parent);
            self.erase_fixup(parent, side);
            return;
        }

        let near = self.arena.node(sibling).ch[side];
        let distant = self.arena.node(sibling).ch[1 - side];

        if self.is_red(near) && !self.is_red(distant) {
            // Near child red, distant black: rotate the red child up to
            // reduce to the red-distant case.
            self.rotate_up(near);
            self.swap_colors(sibling, near);
            self.erase_fixup(parent, side);
            return;
        }

        if self.is_red(distant) {
            // Distant child red: one rotation resolves the deficit.
            self.rotate_up(sibling);
            self.swap_colors(sibling, parent);
            self.arena.node_mut(distant).red = false;
            return;
        }

        // Both of the black sibling's children are black: recolor the
        // sibling and push the deficit one level up.
        self.arena.node_mut(sibling).red = true;
        if parent != self.root {
            let grand = self.arena.node(parent).parent;
            let pside = self.side_of(parent);
            self.erase_fixup(grand, pside);
        }
    }

    /// In-order iterator over all keys, ascending.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter {
            tree: self,
            stack: Vec::new(),
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// Writes every key in ascending order into `out`, returning the
    /// number of keys written. Fails up front, writing nothing, when the
    /// buffer is too small.
    pub fn write_sorted(&self, out: &mut [i64]) -> Result<usize, Error> {
        if out.len() < self.len {
            return Err(Error::CapacityExceeded {
                capacity: out.len(),
                required: self.len,
            });
        }
        for (slot, key) in out.iter_mut().zip(self.iter()) {
            *slot = key;
        }
        Ok(self.len)
    }

    pub fn to_sorted_vec(&self) -> Vec<i64> {
        self.iter().collect()
    }
}

impl Default for RbTree {
    fn default() -> Self {
        Self::new()
    }
}

/// In-order key iterator, see [`RbTree::iter`].
pub struct Iter<'a> {
    tree: &'a RbTree,
    stack: Vec<Id>,
}

impl Iter<'_> {
    fn push_left_spine(&mut self, mut current: Id) {
        while !current.is_nil() {
            self.stack.push(current);
            current = self.tree.arena.node(current).ch[LEFT];
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let id = self.stack.pop()?;
        let node = self.tree.arena.node(id);
        let right = node.ch[RIGHT];
        let key = node.key;
        self.push_left_spine(right);
        Some(key)
    }
}
