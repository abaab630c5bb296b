//! # ModelPart - Partition-Aware Mesh Container
//!
//! Owns the Nodes and Elements of one mesh. Nodes live in a single arena in
//! insertion order and are partitioned into local nodes and ghost nodes
//! (replicated from another partition, tagged with the owning partition's
//! index).
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Node ids unique across local + ghost | `check_new_node_id()` |
//! | Element ids unique | `create_new_element()` |
//! | Element nodes exist in this container | `resolve_node()` |
//! | Failed creation leaves the container unchanged | checks run before any push |

use crate::entities::{Element, ElementType, IdType, Node, NodeRef, PartitionIndex};
use crate::errors::{CoSimError, EntityKind, Result};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::trace;

/// Character reserved as hierarchy separator in names.
pub const NAME_SEPARATOR: char = '.';

/// Mesh container with local/ghost node partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPart {
    name: String,
    /// Node arena, insertion order, local and ghost interleaved.
    nodes: Vec<Node>,
    node_lookup: HashMap<IdType, usize>,
    local_nodes: Vec<usize>,
    ghost_nodes: Vec<(usize, PartitionIndex)>,
    /// Owning partition by node arena index.
    ghost_partitions: HashMap<usize, PartitionIndex>,
    elements: Vec<Element>,
    element_lookup: HashMap<IdType, usize>,
}

impl ModelPart {
    /// Create an empty container.
    ///
    /// # Errors
    ///
    /// `InvalidName` if `name` is empty or contains `.`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoSimError::invalid_name(
                name,
                "empty names are not allowed for a ModelPart",
            ));
        }
        if name.contains(NAME_SEPARATOR) {
            return Err(CoSimError::invalid_name(
                name,
                "names of a ModelPart must not contain \".\"",
            ));
        }
        Ok(Self {
            name,
            nodes: Vec::new(),
            node_lookup: HashMap::new(),
            local_nodes: Vec::new(),
            ghost_nodes: Vec::new(),
            ghost_partitions: HashMap::new(),
            elements: Vec::new(),
            element_lookup: HashMap::new(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    // =========================================================================
    // COUNTS
    // =========================================================================

    #[must_use]
    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn number_of_local_nodes(&self) -> usize {
        self.local_nodes.len()
    }

    #[must_use]
    pub fn number_of_ghost_nodes(&self) -> usize {
        self.ghost_nodes.len()
    }

    #[must_use]
    pub fn number_of_elements(&self) -> usize {
        self.elements.len()
    }

    // =========================================================================
    // NODE CREATION
    // =========================================================================

    fn check_new_node_id(&self, id: IdType) -> Result<()> {
        if self.node_lookup.contains_key(&id) {
            return Err(CoSimError::DuplicateId {
                kind: EntityKind::Node,
                id,
            });
        }
        Ok(())
    }

    fn push_node(&mut self, node: Node) -> usize {
        let index = self.nodes.len();
        self.node_lookup.insert(node.id(), index);
        self.nodes.push(node);
        index
    }

    /// Create a local node.
    ///
    /// # Errors
    ///
    /// - `DuplicateId` if a local or ghost node with `id` exists
    /// - `InvalidId` if `id < 1`
    pub fn create_new_node(&mut self, id: IdType, x: f64, y: f64, z: f64) -> Result<&Node> {
        self.check_new_node_id(id)?;
        let node = Node::new(id, x, y, z)?;
        let index = self.push_node(node);
        self.local_nodes.push(index);
        Ok(&self.nodes[index])
    }

    /// Create a ghost node owned by partition `partition_index`.
    ///
    /// # Errors
    ///
    /// Same as [`ModelPart::create_new_node`].
    pub fn create_new_ghost_node(
        &mut self,
        id: IdType,
        x: f64,
        y: f64,
        z: f64,
        partition_index: PartitionIndex,
    ) -> Result<&Node> {
        self.check_new_node_id(id)?;
        let node = Node::new(id, x, y, z)?;
        let index = self.push_node(node);
        self.ghost_nodes.push((index, partition_index));
        self.ghost_partitions.insert(index, partition_index);
        trace!(model_part = %self.name, id, partition_index, "Ghost node created");
        Ok(&self.nodes[index])
    }

    /// Create local nodes from parallel sequences, in input order.
    ///
    /// # Errors
    ///
    /// `LengthMismatch` if the sequences differ in length (nothing is
    /// created), otherwise the first error of the single-node call.
    pub fn create_new_nodes(
        &mut self,
        ids: &[IdType],
        xs: &[f64],
        ys: &[f64],
        zs: &[f64],
    ) -> Result<()> {
        check_len("x coordinates", ids.len(), xs.len())?;
        check_len("y coordinates", ids.len(), ys.len())?;
        check_len("z coordinates", ids.len(), zs.len())?;

        self.reserve_nodes(ids.len());
        for (i, &id) in ids.iter().enumerate() {
            self.create_new_node(id, xs[i], ys[i], zs[i])?;
        }
        Ok(())
    }

    /// Create ghost nodes from parallel sequences, in input order.
    ///
    /// # Errors
    ///
    /// As [`ModelPart::create_new_nodes`].
    pub fn create_new_ghost_nodes(
        &mut self,
        ids: &[IdType],
        xs: &[f64],
        ys: &[f64],
        zs: &[f64],
        partition_indices: &[PartitionIndex],
    ) -> Result<()> {
        check_len("x coordinates", ids.len(), xs.len())?;
        check_len("y coordinates", ids.len(), ys.len())?;
        check_len("z coordinates", ids.len(), zs.len())?;
        check_len("partition indices", ids.len(), partition_indices.len())?;

        self.reserve_nodes(ids.len());
        for (i, &id) in ids.iter().enumerate() {
            self.create_new_ghost_node(id, xs[i], ys[i], zs[i], partition_indices[i])?;
        }
        Ok(())
    }

    fn reserve_nodes(&mut self, additional: usize) {
        self.nodes.reserve(additional);
        self.node_lookup.reserve(additional);
    }

    // =========================================================================
    // ELEMENT CREATION
    // =========================================================================

    fn resolve_node(&self, id: IdType) -> Result<NodeRef> {
        self.node_lookup
            .get(&id)
            .map(|&index| NodeRef { index, id })
            .ok_or(CoSimError::NotFound {
                kind: EntityKind::Node,
                id,
            })
    }

    /// Create an element over existing nodes.
    ///
    /// The node count is not validated against `element_type`.
    ///
    /// # Errors
    ///
    /// - `DuplicateId` if an element with `id` exists
    /// - `NotFound` if any of `node_ids` is not a node of this container
    pub fn create_new_element(
        &mut self,
        id: IdType,
        element_type: ElementType,
        node_ids: &[IdType],
    ) -> Result<&Element> {
        if self.element_lookup.contains_key(&id) {
            return Err(CoSimError::DuplicateId {
                kind: EntityKind::Element,
                id,
            });
        }
        let refs = node_ids
            .iter()
            .map(|&node_id| self.resolve_node(node_id))
            .collect::<Result<Vec<_>>>()?;
        let element = Element::new(id, element_type, refs)?;

        let index = self.elements.len();
        self.element_lookup.insert(id, index);
        self.elements.push(element);
        Ok(&self.elements[index])
    }

    /// Create elements from parallel id/type/node-count sequences and a flat
    /// connectivity, consumed per element by its node count.
    ///
    /// # Errors
    ///
    /// `LengthMismatch` if the sequences are inconsistent (nothing is
    /// created), otherwise the first error of the single-element call.
    pub fn create_new_elements(
        &mut self,
        ids: &[IdType],
        types: &[ElementType],
        node_counts: &[usize],
        connectivities: &[IdType],
    ) -> Result<()> {
        check_len("element types", ids.len(), types.len())?;
        check_len("node counts", ids.len(), node_counts.len())?;
        check_len("connectivities", node_counts.iter().sum(), connectivities.len())?;

        self.elements.reserve(ids.len());
        let mut offset = 0;
        for ((&id, &element_type), &count) in ids.iter().zip(types).zip(node_counts) {
            self.create_new_element(id, element_type, &connectivities[offset..offset + count])?;
            offset += count;
        }
        Ok(())
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    #[must_use]
    pub fn has_node(&self, id: IdType) -> bool {
        self.node_lookup.contains_key(&id)
    }

    #[must_use]
    pub fn has_element(&self, id: IdType) -> bool {
        self.element_lookup.contains_key(&id)
    }

    /// # Errors
    ///
    /// `NotFound` if no node with `id` exists.
    pub fn get_node(&self, id: IdType) -> Result<&Node> {
        self.node_lookup
            .get(&id)
            .map(|&index| &self.nodes[index])
            .ok_or(CoSimError::NotFound {
                kind: EntityKind::Node,
                id,
            })
    }

    /// # Errors
    ///
    /// `NotFound` if no element with `id` exists.
    pub fn get_element(&self, id: IdType) -> Result<&Element> {
        self.element_lookup
            .get(&id)
            .map(|&index| &self.elements[index])
            .ok_or(CoSimError::NotFound {
                kind: EntityKind::Element,
                id,
            })
    }

    /// Partition owning the ghost node `id`; `None` for local or unknown ids.
    #[must_use]
    pub fn ghost_partition(&self, id: IdType) -> Option<PartitionIndex> {
        let index = self.node_lookup.get(&id)?;
        self.ghost_partitions.get(index).copied()
    }

    /// Resolve the nodes of an element of this container.
    ///
    /// References that do not resolve (element from another container) are
    /// skipped.
    pub fn element_nodes<'a>(&'a self, element: &'a Element) -> impl Iterator<Item = &'a Node> + 'a {
        element.node_refs().iter().filter_map(move |r| {
            self.nodes.get(r.index).filter(|node| node.id() == r.id)
        })
    }

    // =========================================================================
    // ITERATION
    // =========================================================================

    /// All nodes (local and ghost) in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    pub fn local_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.local_nodes.iter().map(move |&i| &self.nodes[i])
    }

    pub fn ghost_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.ghost_nodes.iter().map(move |&(i, _)| &self.nodes[i])
    }

    pub fn ghost_nodes_with_partition(
        &self,
    ) -> impl Iterator<Item = (&Node, PartitionIndex)> + '_ {
        self.ghost_nodes
            .iter()
            .map(move |&(i, partition)| (&self.nodes[i], partition))
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements.iter()
    }

    /// Partitions that own at least one ghost node, ascending.
    #[must_use]
    pub fn partition_indices(&self) -> BTreeSet<PartitionIndex> {
        self.ghost_nodes.iter().map(|&(_, p)| p).collect()
    }

    pub fn ghost_nodes_in_partition(
        &self,
        partition_index: PartitionIndex,
    ) -> impl Iterator<Item = &Node> + '_ {
        self.ghost_nodes
            .iter()
            .filter(move |&&(_, p)| p == partition_index)
            .map(move |&(i, _)| &self.nodes[i])
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Remove all nodes and elements; the name is kept.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.element_lookup.clear();
        self.local_nodes.clear();
        self.ghost_nodes.clear();
        self.ghost_partitions.clear();
        self.nodes.clear();
        self.node_lookup.clear();
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(CoSimError::LengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

impl fmt::Display for ModelPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CoSimIO-ModelPart \"{}\"", self.name)?;
        writeln!(f, "    Number of Nodes: {}", self.number_of_nodes())?;
        writeln!(f, "    Number of Local Nodes: {}", self.number_of_local_nodes())?;
        writeln!(f, "    Number of Ghost Nodes: {}", self.number_of_ghost_nodes())?;
        writeln!(f, "    Number of Elements: {}", self.number_of_elements())
    }
}
