//! Node representation and critical-bit arithmetic.

use std::mem;

use bytes::Bytes;

// =============================================================================
// Critical bit
// =============================================================================

/// Critical bit: byte offset plus one-hot mask, packed as `(off << 8) | !mask`.
///
/// With the mask stored inverted, the derived ordering is tree order: a node
/// nearer the root compares smaller (lower offset, or the same offset and a
/// more significant bit).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct CritBit(u64);

impl CritBit {
    #[inline]
    pub(crate) fn new(off: usize, mask: u8) -> Self {
        debug_assert_eq!(mask.count_ones(), 1, "critical bit mask must be one-hot");
        Self(((off as u64) << 8) | u64::from(!mask))
    }

    /// Byte offset the node discriminates on.
    #[inline]
    pub(crate) fn offset(self) -> usize {
        (self.0 >> 8) as usize
    }

    #[inline]
    pub(crate) fn mask(self) -> u8 {
        !(self.0 as u8)
    }

    /// Child index (`0` or `1`) that `key` belongs to. Bytes past the end of
    /// `key` read as zero, so a strict prefix always goes left.
    #[inline]
    pub(crate) fn direction(self, key: &[u8]) -> usize {
        let c = byte_at(key, self.offset());
        // `c | !mask` is 0xFF exactly when the masked bit is set in `c`.
        ((1 + u32::from(c | self.0 as u8)) >> 8) as usize
    }

    /// Critical bit between a stored key and a candidate, plus the side the
    /// stored key falls on.
    ///
    /// Both keys are compared zero-padded to the longer length. Returns `None`
    /// when they are equal under that padding (identical, or differing only in
    /// trailing `0x00` bytes).
    pub(crate) fn between(existing: &[u8], key: &[u8]) -> Option<(Self, usize)> {
        let len = existing.len().max(key.len());
        let off = (0..len).find(|&i| byte_at(existing, i) != byte_at(key, i))?;
        let c = byte_at(existing, off);
        let mask = highest_bit(c ^ byte_at(key, off));
        Some((Self::new(off, mask), usize::from(c & mask != 0)))
    }
}

#[inline]
fn byte_at(key: &[u8], off: usize) -> u8 {
    key.get(off).copied().unwrap_or(0)
}

/// Whether `key`, zero-padded, begins with `prefix`. This is the match the
/// direction function can see; it accepts keys shorter than `prefix`.
#[inline]
pub(crate) fn padded_starts_with(key: &[u8], prefix: &[u8]) -> bool {
    prefix.iter().enumerate().all(|(i, &p)| byte_at(key, i) == p)
}

/// Keeps only the most significant set bit.
#[inline]
fn highest_bit(mut bits: u8) -> u8 {
    bits |= bits >> 1;
    bits |= bits >> 2;
    bits |= bits >> 4;
    bits & !(bits >> 1)
}

// =============================================================================
// Tree references
// =============================================================================

/// A tree slot: either a stored key or an internal node.
pub(crate) enum Ref {
    Leaf(Bytes),
    Branch(Box<Node>),
}

/// Internal branch point. Holds no key of its own.
pub(crate) struct Node {
    pub(crate) children: [Ref; 2],
    pub(crate) crit: CritBit,
}

impl Ref {
    /// Moves the slot's contents out, leaving an empty leaf behind.
    #[inline]
    pub(crate) fn take(&mut self) -> Ref {
        mem::replace(self, Ref::Leaf(Bytes::new()))
    }

    #[inline]
    pub(crate) fn child_mut(&mut self, dir: usize) -> Option<&mut Ref> {
        match self {
            Ref::Branch(node) => Some(&mut node.children[dir]),
            Ref::Leaf(_) => None,
        }
    }

    /// Follows `dirs` from this slot. `None` if the path runs into a leaf.
    pub(crate) fn descend_mut(
        &mut self,
        dirs: impl IntoIterator<Item = usize>,
    ) -> Option<&mut Ref> {
        let mut slot = self;
        for dir in dirs {
            slot = slot.child_mut(dir)?;
        }
        Some(slot)
    }

    /// Leaf reached by always taking child `dir`.
    pub(crate) fn extreme(&self, dir: usize) -> &Bytes {
        let mut cur = self;
        loop {
            match cur {
                Ref::Leaf(key) => return key,
                Ref::Branch(node) => cur = &node.children[dir],
            }
        }
    }
}
