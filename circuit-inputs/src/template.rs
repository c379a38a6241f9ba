//! Template tree: a sparse Merkle tree pre-seeded with a schema's leaves.
//!
//! The tree is built once per compilation. Its root before any update is
//! the template root the circuit is parameterised with; each mutable leaf is
//! then updated once and the sibling path of every update is captured.

use crate::error::{CircuitInputError, Result};
use crate::hash::{FieldHasher, PoseidonHasher};
use crate::schema::{Attribute, SchemaVersion};
use crate::smt::SparseMerkleTree;
use ark_bn254::Fr;
use ark_ff::Zero;
use std::sync::Arc;
use tracing::debug;

/// A (key, value) pair of the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateLeaf {
    pub key: Fr,
    pub value: Fr,
}

#[derive(Debug, Clone)]
pub struct TemplateTree {
    tree: SparseMerkleTree,
    template_root: Fr,
}

impl TemplateTree {
    /// Seed a tree with `schema`'s constant leaves and zero placeholders,
    /// hashing with [`PoseidonHasher`].
    pub fn new(schema: SchemaVersion) -> Result<Self> {
        Self::with_hasher(schema, Arc::new(PoseidonHasher))
    }

    pub fn with_hasher(schema: SchemaVersion, hasher: Arc<dyn FieldHasher>) -> Result<Self> {
        let constants = schema.constant_leaves()?;
        let placeholders = schema.placeholder_leaves()?;
        let tree = Self::with_leaves(schema.depth(), &constants, &placeholders, hasher)?;

        debug!(
            schema = %schema,
            depth = schema.depth(),
            template_root = %tree.template_root,
            "built template tree"
        );

        Ok(tree)
    }

    pub fn with_leaves(
        depth: usize,
        constants: &[TemplateLeaf],
        placeholders: &[TemplateLeaf],
        hasher: Arc<dyn FieldHasher>,
    ) -> Result<Self> {
        let leaf_count = constants.len() + placeholders.len();
        let capacity = 1u128.checked_shl(depth as u32).unwrap_or(u128::MAX);
        if leaf_count as u128 > capacity {
            return Err(CircuitInputError::TreeInvariant(format!(
                "{leaf_count} leaves do not fit a tree of depth {depth}"
            )));
        }

        let mut tree = SparseMerkleTree::with_hasher(depth, hasher);
        for leaf in constants.iter().chain(placeholders) {
            tree.add(leaf.key, leaf.value)?;
        }

        let template_root = tree.root();
        Ok(Self { tree, template_root })
    }

    pub fn hasher(&self) -> &dyn FieldHasher {
        self.tree.hasher()
    }

    pub fn depth(&self) -> usize {
        self.tree.max_levels()
    }

    /// Root before any update; constant per schema.
    pub fn template_root(&self) -> Fr {
        self.template_root
    }

    /// Current root, reflecting every update so far.
    pub fn root(&self) -> Fr {
        self.tree.root()
    }

    /// Update `leaves` in order, returning one `depth`-long sibling array per
    /// leaf.
    pub fn update(&mut self, leaves: &[TemplateLeaf]) -> Result<Vec<Vec<Fr>>> {
        let depth = self.depth();
        leaves
            .iter()
            .map(|leaf| {
                let proof = self.tree.update(leaf.key, leaf.value)?;
                truncate_siblings(proof.siblings, depth)
            })
            .collect()
    }

    /// Update the schema's mutable attributes in the schema's order.
    pub fn update_attributes(&mut self, schema: SchemaVersion, values: &[(Attribute, Fr)]) -> Result<Vec<Vec<Fr>>> {
        if schema.depth() != self.depth() {
            return Err(CircuitInputError::TreeInvariant(format!(
                "{schema} needs depth {}, tree has depth {}",
                schema.depth(),
                self.depth()
            )));
        }
        let leaves = schema.ordered_leaves(values)?;
        self.update(&leaves)
    }
}

/// Drop the padding sibling the tree emits beyond `depth`.
///
/// The entry at index `depth` is always zero for a correctly sized tree; a
/// non-zero value means the schema and depth disagree.
pub fn truncate_siblings(mut siblings: Vec<Fr>, depth: usize) -> Result<Vec<Fr>> {
    match siblings.get(depth) {
        Some(last) if !last.is_zero() => {
            return Err(CircuitInputError::TreeInvariant(format!(
                "sibling at level {depth} is non-zero"
            )));
        }
        Some(_) => {}
        None => {
            return Err(CircuitInputError::TreeInvariant(format!(
                "expected {} siblings, got {}",
                depth + 1,
                siblings.len()
            )));
        }
    }

    siblings.truncate(depth);
    Ok(siblings)
}
