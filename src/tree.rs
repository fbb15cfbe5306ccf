use std::fmt;

use bytes::Bytes;
use smallvec::SmallVec;

use crate::node::{CritBit, Node, Ref};

/// Inline capacity for descent paths. Deeper paths spill to the heap.
const PATH_INLINE: usize = 32;

#[derive(Clone, Copy)]
struct Step {
    crit: CritBit,
    dir: usize,
}

/// An ordered set of byte strings stored in a crit-bit tree.
///
/// Keys are kept in ascending byte-lexicographic order. Bytes past the end of
/// a key read as zero when routing, so two keys that differ only in trailing
/// `0x00` bytes cannot both be members: the second [`insert`] returns `false`.
///
/// [`insert`]: CritbitTree::insert
pub struct CritbitTree {
    pub(crate) root: Option<Ref>,
    pub(crate) len: usize,
}

impl CritbitTree {
    /// Creates an empty tree.
    pub const fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `key` is a member.
    pub fn contains(&self, key: impl AsRef<[u8]>) -> bool {
        let key = key.as_ref();
        let Some(mut cur) = self.root.as_ref() else {
            return false;
        };
        loop {
            match cur {
                Ref::Leaf(stored) => return stored == key,
                Ref::Branch(node) => cur = &node.children[node.crit.direction(key)],
            }
        }
    }

    /// Inserts `key`. Returns `false` if the tree already held it, in which case
    /// nothing changes.
    pub fn insert(&mut self, key: impl AsRef<[u8]>) -> bool {
        let key = key.as_ref();
        let Some(root) = self.root.as_mut() else {
            self.root = Some(Ref::Leaf(Bytes::copy_from_slice(key)));
            self.len += 1;
            return true;
        };

        // Walk for the best member, remembering each node passed.
        let mut path: SmallVec<[Step; PATH_INLINE]> = SmallVec::new();
        let mut cur = &*root;
        let best = loop {
            match cur {
                Ref::Leaf(stored) => break stored,
                Ref::Branch(node) => {
                    let dir = node.crit.direction(key);
                    path.push(Step {
                        crit: node.crit,
                        dir,
                    });
                    cur = &node.children[dir];
                }
            }
        };

        let Some((crit, ndir)) = CritBit::between(best, key) else {
            return false;
        };

        // Path crit bits ascend, so the new node goes above the first one that
        // sorts after it. The insertion walk follows the same directions.
        let depth = path.iter().take_while(|step| step.crit < crit).count();
        let wp = root
            .descend_mut(path[..depth].iter().map(|step| step.dir))
            .expect("insertion path follows existing branches");

        let existing = wp.take();
        let leaf = Ref::Leaf(Bytes::copy_from_slice(key));
        let children = if ndir == 0 {
            [existing, leaf]
        } else {
            [leaf, existing]
        };
        *wp = Ref::Branch(Box::new(Node { children, crit }));
        self.len += 1;
        true
    }

    /// Removes `key`. Returns `false` if it was not a member.
    pub fn delete(&mut self, key: impl AsRef<[u8]>) -> bool {
        let key = key.as_ref();
        let Some(root) = self.root.as_mut() else {
            return false;
        };

        let mut dirs: SmallVec<[usize; PATH_INLINE]> = SmallVec::new();
        let mut cur = &*root;
        let found = loop {
            match cur {
                Ref::Leaf(stored) => break stored == key,
                Ref::Branch(node) => {
                    let dir = node.crit.direction(key);
                    dirs.push(dir);
                    cur = &node.children[dir];
                }
            }
        };
        if !found {
            return false;
        }

        self.len -= 1;
        let Some((&dir, parent_dirs)) = dirs.split_last() else {
            self.root = None;
            return true;
        };

        // Collapse the parent: its other child takes the parent's slot.
        let parent = root
            .descend_mut(parent_dirs.iter().copied())
            .expect("delete path follows existing branches");
        let Ref::Branch(node) = parent.take() else {
            unreachable!("delete path ends at a branch");
        };
        let Node {
            children: [zero, one],
            ..
        } = *node;
        *parent = if dir == 0 { one } else { zero };
        true
    }

    /// Calls `visit` for every key starting with `prefix`, in ascending order.
    ///
    /// `visit` returns `false` to stop early. The result is `true` iff every
    /// matching key was visited; an empty tree or a prefix nothing starts with
    /// gives `true`.
    pub fn iterate(
        &self,
        prefix: impl AsRef<[u8]>,
        mut visit: impl FnMut(&[u8]) -> bool,
    ) -> bool {
        self.iter_prefix(prefix).all(|key| visit(key))
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> Vec<Bytes> {
        let mut out = Vec::with_capacity(self.len);
        out.extend(self.iter().cloned());
        out
    }

    /// Smallest key, if any.
    pub fn first(&self) -> Option<&Bytes> {
        self.root.as_ref().map(|root| root.extreme(0))
    }

    /// Largest key, if any.
    pub fn last(&self) -> Option<&Bytes> {
        self.root.as_ref().map(|root| root.extreme(1))
    }

    /// Structurally independent copy. Nodes are duplicated; key buffers are
    /// shared, as they are never mutated after insertion.
    pub fn copy(&self) -> Self {
        enum Task<'a> {
            Visit(&'a Ref),
            Build(CritBit),
        }

        let Some(root) = self.root.as_ref() else {
            return Self::new();
        };

        // Post-order: both children of a node are built before the node itself.
        let mut tasks: Vec<Task<'_>> = vec![Task::Visit(root)];
        let mut built: Vec<Ref> = Vec::new();
        while let Some(task) = tasks.pop() {
            match task {
                Task::Visit(Ref::Leaf(key)) => built.push(Ref::Leaf(key.clone())),
                Task::Visit(Ref::Branch(node)) => {
                    tasks.push(Task::Build(node.crit));
                    tasks.push(Task::Visit(&node.children[1]));
                    tasks.push(Task::Visit(&node.children[0]));
                }
                Task::Build(crit) => {
                    let one = built.pop().expect("child 1 built before its node");
                    let zero = built.pop().expect("child 0 built before its node");
                    built.push(Ref::Branch(Box::new(Node {
                        children: [zero, one],
                        crit,
                    })));
                }
            }
        }
        debug_assert_eq!(built.len(), 1);

        Self {
            root: built.pop(),
            len: self.len,
        }
    }
}

impl Default for CritbitTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CritbitTree {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl Drop for CritbitTree {
    fn drop(&mut self) {
        // Tear down with an explicit stack; deep trees would otherwise recurse
        // once per level.
        let mut stack: Vec<Box<Node>> = Vec::new();
        if let Some(Ref::Branch(node)) = self.root.take() {
            stack.push(node);
        }
        while let Some(node) = stack.pop() {
            let Node { children, .. } = *node;
            for child in children {
                if let Ref::Branch(node) = child {
                    stack.push(node);
                }
            }
        }
    }
}

impl PartialEq for CritbitTree {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for CritbitTree {}

impl fmt::Debug for CritbitTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: AsRef<[u8]>> Extend<K> for CritbitTree {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: AsRef<[u8]>> FromIterator<K> for CritbitTree {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}
