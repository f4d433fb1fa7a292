//! Append-only incremental Merkle tree.
//!
//! Only O(depth) state is kept: the empty-subtree hash per level and the last left node
//! seen per level. Each insertion costs `depth` hash evaluations.

use crate::*;
use thiserror::Error;

/// Deepest tree the fixed per-level arrays can hold.
pub const MAX_TREE_DEPTH: usize = 32;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("starvote tree: tree is full")]
    Full,

    #[error("starvote tree: depth {0} is out of range 1..={}", MAX_TREE_DEPTH)]
    UnsupportedDepth(usize),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MembershipTree {
    depth: usize,
    size: u64,
    root: Field,

    /// `zeros[l]` is the root of an all-empty subtree of height `l`
    zeros: [Field; MAX_TREE_DEPTH],

    /// `filled[l]` is the most recent left child written at level `l`
    filled: [Field; MAX_TREE_DEPTH],
}

impl MembershipTree {
    /// Create an empty tree of `depth` levels whose empty leaves are `zero_leaf`.
    pub fn new<H: HashPrimitive>(
        depth: usize,
        zero_leaf: Field,
        hasher: &H,
    ) -> Result<Self, TreeError> {
        if depth == 0 || depth > MAX_TREE_DEPTH {
            return Err(TreeError::UnsupportedDepth(depth));
        }

        let mut zeros = [Field::ZERO; MAX_TREE_DEPTH];
        let mut zero = zero_leaf;
        for level in 0..depth {
            zeros[level] = zero;
            zero = hasher.hash2(&zero, &zero);
        }

        Ok(MembershipTree {
            depth,
            size: 0,
            root: zero,
            zeros,
            filled: zeros,
        })
    }

    /// Append a leaf, returning its index and the new root.
    pub fn insert<H: HashPrimitive>(
        &mut self,
        leaf: Field,
        hasher: &H,
    ) -> Result<(u64, Field), TreeError> {
        if self.is_full() {
            return Err(TreeError::Full);
        }

        let index = self.size;
        let mut node = leaf;
        let mut path = index;

        for level in 0..self.depth {
            if path & 1 == 0 {
                // Left child: its right sibling is still empty
                self.filled[level] = node;
                node = hasher.hash2(&node, &self.zeros[level]);
            } else {
                node = hasher.hash2(&self.filled[level], &node);
            }
            path >>= 1;
        }

        self.root = node;
        self.size += 1;

        Ok((index, node))
    }

    pub fn root(&self) -> Field {
        self.root
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of leaves inserted so far
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> u64 {
        1u64 << self.depth
    }

    pub fn is_full(&self) -> bool {
        self.size >= self.capacity()
    }

    /// The empty-subtree hash at `level`, if the level exists in this tree.
    pub fn zero(&self, level: usize) -> Option<Field> {
        if level < self.depth {
            Some(self.zeros[level])
        } else {
            None
        }
    }
}
