//! In-memory sparse Merkle tree with iden3 node hashing.
//!
//! A leaf is placed at the shallowest level where its key path diverges from
//! every other key. Path bit `i` is bit `i` of the key, least significant
//! first. Hashes:
//! - empty node: 0
//! - leaf: H(key, value, 1)
//! - middle: H(left, right)

use crate::error::{CircuitInputError, Result};
use crate::hash::{FieldHasher, PoseidonHasher};
use ark_bn254::Fr;
use ark_ff::{BigInteger, One, PrimeField, Zero};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Node {
    Empty,
    Leaf { key: Fr, value: Fr, hash: Fr },
    Middle { left: Box<Node>, right: Box<Node>, hash: Fr },
}

impl Node {
    fn leaf(hasher: &dyn FieldHasher, key: Fr, value: Fr) -> Self {
        let hash = leaf_hash(hasher, key, value);
        Node::Leaf { key, value, hash }
    }

    fn middle(hasher: &dyn FieldHasher, left: Node, right: Node) -> Self {
        let hash = hasher.hash_elements(&[left.hash(), right.hash()]);
        Node::Middle { left: Box::new(left), right: Box::new(right), hash }
    }

    fn hash(&self) -> Fr {
        match self {
            Node::Empty => Fr::zero(),
            Node::Leaf { hash, .. } | Node::Middle { hash, .. } => *hash,
        }
    }
}

fn leaf_hash(hasher: &dyn FieldHasher, key: Fr, value: Fr) -> Fr {
    hasher.hash_elements(&[key, value, Fr::one()])
}

fn path_bit(key: &Fr, level: usize) -> bool {
    key.into_bigint().get_bit(level)
}

/// Result of updating one existing leaf.
#[derive(Debug, Clone)]
pub struct UpdateProof {
    pub old_root: Fr,
    pub new_root: Fr,
    pub old_value: Fr,
    /// Siblings from the root down, zero padded to `max_levels + 1` entries.
    pub siblings: Vec<Fr>,
}

#[derive(Debug, Clone)]
pub struct SparseMerkleTree {
    root: Node,
    max_levels: usize,
    hasher: Arc<dyn FieldHasher>,
}

impl SparseMerkleTree {
    /// Empty tree hashing with [`PoseidonHasher`].
    pub fn new(max_levels: usize) -> Self {
        Self::with_hasher(max_levels, Arc::new(PoseidonHasher))
    }

    pub fn with_hasher(max_levels: usize, hasher: Arc<dyn FieldHasher>) -> Self {
        Self { root: Node::Empty, max_levels, hasher }
    }

    pub fn hasher(&self) -> &dyn FieldHasher {
        self.hasher.as_ref()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn root(&self) -> Fr {
        self.root.hash()
    }

    /// Insert a new key. Fails if the key exists or cannot be placed within
    /// `max_levels`.
    pub fn add(&mut self, key: Fr, value: Fr) -> Result<()> {
        self.root = self.add_leaf(&self.root, key, value, 0)?;
        Ok(())
    }

    fn add_leaf(&self, node: &Node, key: Fr, value: Fr, level: usize) -> Result<Node> {
        if level >= self.max_levels {
            return Err(max_level_reached(&key));
        }

        match node {
            Node::Empty => Ok(Node::leaf(self.hasher(), key, value)),
            Node::Leaf { key: old_key, .. } => {
                if *old_key == key {
                    return Err(CircuitInputError::TreeInvariant(format!(
                        "key {key} is already in the tree"
                    )));
                }
                self.push_leaf(key, Node::leaf(self.hasher(), key, value), *old_key, node.clone(), level)
            }
            Node::Middle { left, right, .. } => {
                if path_bit(&key, level) {
                    let right = self.add_leaf(right, key, value, level + 1)?;
                    Ok(Node::middle(self.hasher(), (**left).clone(), right))
                } else {
                    let left = self.add_leaf(left, key, value, level + 1)?;
                    Ok(Node::middle(self.hasher(), left, (**right).clone()))
                }
            }
        }
    }

    /// Push an existing leaf down until its path diverges from the new one.
    fn push_leaf(
        &self,
        new_key: Fr,
        new_leaf: Node,
        old_key: Fr,
        old_leaf: Node,
        level: usize,
    ) -> Result<Node> {
        if level + 2 > self.max_levels {
            return Err(max_level_reached(&new_key));
        }

        let new_bit = path_bit(&new_key, level);
        let old_bit = path_bit(&old_key, level);

        if new_bit == old_bit {
            let next = self.push_leaf(new_key, new_leaf, old_key, old_leaf, level + 1)?;
            return Ok(if new_bit {
                Node::middle(self.hasher(), Node::Empty, next)
            } else {
                Node::middle(self.hasher(), next, Node::Empty)
            });
        }

        Ok(if new_bit {
            Node::middle(self.hasher(), old_leaf, new_leaf)
        } else {
            Node::middle(self.hasher(), new_leaf, old_leaf)
        })
    }

    /// Replace the value of an existing key and return the sibling path.
    pub fn update(&mut self, key: Fr, value: Fr) -> Result<UpdateProof> {
        let mut siblings = Vec::with_capacity(self.max_levels + 1);
        let mut old_value = Fr::zero();

        let new_root = self.update_at(&self.root, key, value, 0, &mut siblings, &mut old_value)?;
        let old_root = self.root.hash();
        self.root = new_root;

        siblings.resize(self.max_levels + 1, Fr::zero());

        Ok(UpdateProof { old_root, new_root: self.root.hash(), old_value, siblings })
    }

    fn update_at(
        &self,
        node: &Node,
        key: Fr,
        value: Fr,
        level: usize,
        siblings: &mut Vec<Fr>,
        old_value: &mut Fr,
    ) -> Result<Node> {
        let not_found = || CircuitInputError::TreeInvariant(format!("key {key} is not in the tree"));

        if level >= self.max_levels {
            return Err(not_found());
        }

        match node {
            Node::Empty => Err(not_found()),
            Node::Leaf { key: leaf_key, value: leaf_value, .. } => {
                if *leaf_key != key {
                    return Err(not_found());
                }
                *old_value = *leaf_value;
                Ok(Node::leaf(self.hasher(), key, value))
            }
            Node::Middle { left, right, .. } => {
                if path_bit(&key, level) {
                    siblings.push(left.hash());
                    let right = self.update_at(right, key, value, level + 1, siblings, old_value)?;
                    Ok(Node::middle(self.hasher(), (**left).clone(), right))
                } else {
                    siblings.push(right.hash());
                    let left = self.update_at(left, key, value, level + 1, siblings, old_value)?;
                    Ok(Node::middle(self.hasher(), left, (**right).clone()))
                }
            }
        }
    }
}

fn max_level_reached(key: &Fr) -> CircuitInputError {
    CircuitInputError::TreeInvariant(format!("reached maximum tree level placing key {key}"))
}

/// Recompute the root implied by a leaf and its sibling path.
///
/// Trailing zero siblings are padding; the leaf sits just below the last
/// non-zero sibling.
pub fn root_from_siblings(hasher: &dyn FieldHasher, key: Fr, value: Fr, siblings: &[Fr]) -> Fr {
    let depth = siblings
        .iter()
        .rposition(|s| !s.is_zero())
        .map_or(0, |i| i + 1);

    let mut node = leaf_hash(hasher, key, value);
    for level in (0..depth).rev() {
        node = if path_bit(&key, level) {
            hasher.hash_elements(&[siblings[level], node])
        } else {
            hasher.hash_elements(&[node, siblings[level]])
        };
    }
    node
}
