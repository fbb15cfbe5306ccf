//! Structural statistics and integrity checking.

use std::mem;

use crate::node::{CritBit, Node, Ref};
use crate::tree::CritbitTree;

/// Structural counters for a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Number of keys stored
    pub keys: usize,
    /// Number of internal nodes (always `keys - 1` for a non-empty tree)
    pub nodes: usize,
    /// Edges on the longest root-to-leaf path
    pub max_depth: usize,
    /// Total length of all stored keys
    pub key_bytes: usize,
    /// Bytes held by internal node allocations
    pub node_bytes: usize,
}

impl CritbitTree {
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let mut stack: Vec<(&Ref, usize)> = Vec::new();
        stack.extend(self.root.as_ref().map(|root| (root, 0)));

        while let Some((r, depth)) = stack.pop() {
            match r {
                Ref::Leaf(key) => {
                    stats.keys += 1;
                    stats.key_bytes += key.len();
                    stats.max_depth = stats.max_depth.max(depth);
                }
                Ref::Branch(node) => {
                    stats.nodes += 1;
                    stack.push((&node.children[1], depth + 1));
                    stack.push((&node.children[0], depth + 1));
                }
            }
        }
        stats.node_bytes = stats.nodes * mem::size_of::<Node>();
        stats
    }

    /// Approximate heap footprint in bytes.
    pub fn memory_usage(&self) -> usize {
        let stats = self.stats();
        mem::size_of::<Self>() + stats.node_bytes + stats.key_bytes
    }

    /// Verify tree integrity - returns list of issues found.
    ///
    /// Checks every node's discriminator against its children and every leaf
    /// against the route that reaches it, then the key order and `len`.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let Some(root) = self.root.as_ref() else {
            if self.len != 0 {
                issues.push(format!("empty tree reports len={}", self.len));
            }
            return issues;
        };

        // (slot, depth, step taken from the parent)
        let mut stack: Vec<(&Ref, usize, Option<(CritBit, usize)>)> = vec![(root, 0, None)];
        // Route to the current slot: one (crit, dir) per ancestor.
        let mut route: Vec<(CritBit, usize)> = Vec::new();
        let mut leaves = 0usize;

        while let Some((r, depth, step)) = stack.pop() {
            route.truncate(depth.saturating_sub(1));
            route.extend(step);
            debug_assert_eq!(route.len(), depth);

            match r {
                Ref::Leaf(key) => {
                    leaves += 1;
                    for &(crit, dir) in &route {
                        if crit.direction(key) != dir {
                            issues.push(format!(
                                "leaf {:?} reached through side {} of node at offset {} mask {:#04x}",
                                key,
                                dir,
                                crit.offset(),
                                crit.mask()
                            ));
                        }
                    }
                }
                Ref::Branch(node) => {
                    let crit = node.crit;
                    if crit.mask().count_ones() != 1 {
                        issues.push(format!("node mask {:#04x} is not one-hot", crit.mask()));
                    }
                    if let Some(&(parent, _)) = route.last() {
                        if crit <= parent {
                            issues.push(format!(
                                "node at offset {} mask {:#04x} sits below offset {} mask {:#04x}",
                                crit.offset(),
                                crit.mask(),
                                parent.offset(),
                                parent.mask()
                            ));
                        }
                    }
                    // Both sides must first disagree exactly at this node's bit.
                    let zero = node.children[0].extreme(0);
                    let one = node.children[1].extreme(0);
                    match CritBit::between(zero, one) {
                        Some((found, 0)) if found == crit => {}
                        found => issues.push(format!(
                            "children {:?} / {:?} split at {:?}, node says offset {} mask {:#04x}",
                            zero,
                            one,
                            found.map(|(c, _)| (c.offset(), c.mask())),
                            crit.offset(),
                            crit.mask()
                        )),
                    }
                    stack.push((&node.children[1], depth + 1, Some((crit, 1))));
                    stack.push((&node.children[0], depth + 1, Some((crit, 0))));
                }
            }
        }

        if leaves != self.len {
            issues.push(format!("{} reachable leaves but len={}", leaves, self.len));
        }

        let mut prev: Option<&[u8]> = None;
        for key in self.iter() {
            if let Some(prev) = prev {
                if prev >= &key[..] {
                    issues.push(format!("keys out of order: {:?} then {:?}", prev, key));
                }
            }
            prev = Some(key);
        }

        issues
    }
}
