use std::iter::FusedIterator;

use bytes::Bytes;
use smallvec::SmallVec;

use crate::node::{padded_starts_with, Ref};
use crate::tree::CritbitTree;

/// In-order iterator over the keys of a [`CritbitTree`] or of one prefix
/// subtree. Yields keys in ascending order.
pub struct Iter<'a> {
    stack: SmallVec<[&'a Ref; 32]>,
    /// Shorter keys can sit in a prefix subtree when the prefix ends in
    /// `0x00` bytes; they are skipped.
    min_len: usize,
}

impl<'a> Iter<'a> {
    fn new(top: Option<&'a Ref>, min_len: usize) -> Self {
        let mut stack = SmallVec::new();
        stack.extend(top);
        Self { stack, min_len }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(r) = self.stack.pop() {
            match r {
                Ref::Leaf(key) if key.len() >= self.min_len => return Some(key),
                Ref::Leaf(_) => {}
                Ref::Branch(node) => {
                    // Child 0 on top so it is drained first.
                    self.stack.push(&node.children[1]);
                    self.stack.push(&node.children[0]);
                }
            }
        }
        None
    }
}

impl FusedIterator for Iter<'_> {}

impl CritbitTree {
    /// Iterates all keys in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.root.as_ref(), 0)
    }

    /// Iterates the keys starting with `prefix`, in ascending order.
    pub fn iter_prefix(&self, prefix: impl AsRef<[u8]>) -> Iter<'_> {
        let prefix = prefix.as_ref();
        let Some(root) = self.root.as_ref() else {
            return Iter::new(None, 0);
        };
        if prefix.is_empty() {
            return Iter::new(Some(root), 0);
        }

        // Only nodes discriminating inside the prefix narrow the subtree; past
        // it, both sides still match.
        let mut top = root;
        let mut cur = root;
        let candidate = loop {
            match cur {
                Ref::Leaf(key) => break key,
                Ref::Branch(node) => {
                    cur = &node.children[node.crit.direction(prefix)];
                    if node.crit.offset() < prefix.len() {
                        top = cur;
                    }
                }
            }
        };

        // Every leaf under `top` agrees with `candidate` on the bytes the prefix
        // covers, zero-padded.
        if padded_starts_with(candidate, prefix) {
            Iter::new(Some(top), prefix.len())
        } else {
            Iter::new(None, 0)
        }
    }
}

impl<'a> IntoIterator for &'a CritbitTree {
    type Item = &'a Bytes;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
