//! # Mesh Transfer Shapes
//!
//! Two ways a mesh crosses a connection:
//!
//! | Shape | Content | Importer effect |
//! |-------|---------|-----------------|
//! | [`MeshData`] | flat coordinates, flat 0-based connectivity, per-element types and node counts | replaces the importer's arrays |
//! | [`ModelPartPayload`] | nodes and elements with their ids, ghost partitions | added to the importer's `ModelPart` |
//!
//! Neither shape is ever partially applied.

use crate::entities::{ElementType, IdType, PartitionIndex};
use crate::errors::{CoSimError, Result};
use crate::model_part::ModelPart;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// RAW ARRAYS
// =============================================================================

/// Raw mesh arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    /// `x0, y0, z0, x1, y1, z1, ...`
    pub coordinates: Vec<f64>,
    /// Node indices (0-based, into `coordinates / 3`), element after element.
    pub connectivities: Vec<usize>,
    /// One entry per element.
    pub element_types: Vec<ElementType>,
    /// Number of `connectivities` entries of each element. Not tied to the
    /// element type's nominal node count.
    pub node_counts: Vec<usize>,
}

impl MeshData {
    /// Arrays whose elements all use their type's nominal node count.
    #[must_use]
    pub fn with_nominal_counts(
        coordinates: Vec<f64>,
        connectivities: Vec<usize>,
        element_types: Vec<ElementType>,
    ) -> Self {
        let node_counts = element_types.iter().map(|t| t.number_of_nodes()).collect();
        Self {
            coordinates,
            connectivities,
            element_types,
            node_counts,
        }
    }

    #[must_use]
    pub fn number_of_nodes(&self) -> usize {
        self.coordinates.len() / 3
    }

    #[must_use]
    pub fn number_of_elements(&self) -> usize {
        self.element_types.len()
    }

    /// Check that the arrays describe a consistent mesh.
    ///
    /// # Errors
    ///
    /// `InvalidMesh` describing the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        if self.coordinates.len() % 3 != 0 {
            return Err(CoSimError::InvalidMesh(format!(
                "number of coordinates ({}) is not a multiple of 3",
                self.coordinates.len()
            )));
        }
        if self.node_counts.len() != self.element_types.len() {
            return Err(CoSimError::InvalidMesh(format!(
                "{} element types but {} node counts",
                self.element_types.len(),
                self.node_counts.len()
            )));
        }
        let expected: usize = self.node_counts.iter().sum();
        if expected != self.connectivities.len() {
            return Err(CoSimError::InvalidMesh(format!(
                "node counts require {expected} connectivity entries, got {}",
                self.connectivities.len()
            )));
        }
        let number_of_nodes = self.number_of_nodes();
        if let Some(&index) = self.connectivities.iter().find(|&&i| i >= number_of_nodes) {
            return Err(CoSimError::InvalidMesh(format!(
                "connectivity references node index {index}, but only {number_of_nodes} nodes exist"
            )));
        }
        Ok(())
    }

    /// Flatten all nodes (arena order) and elements of a `ModelPart`.
    ///
    /// Connectivity entries are the positions of the element's nodes in
    /// [`ModelPart::nodes`].
    #[must_use]
    pub fn from_model_part(model_part: &ModelPart) -> Self {
        let mut positions = HashMap::with_capacity(model_part.number_of_nodes());
        let mut coordinates = Vec::with_capacity(model_part.number_of_nodes() * 3);
        for (position, node) in model_part.nodes().enumerate() {
            positions.insert(node.id(), position);
            coordinates.extend_from_slice(&node.coordinates());
        }

        let mut connectivities = Vec::new();
        let mut element_types = Vec::with_capacity(model_part.number_of_elements());
        let mut node_counts = Vec::with_capacity(model_part.number_of_elements());
        for element in model_part.elements() {
            let before = connectivities.len();
            connectivities.extend(element.node_ids().filter_map(|id| positions.get(&id).copied()));
            element_types.push(element.element_type());
            node_counts.push(connectivities.len() - before);
        }

        Self {
            coordinates,
            connectivities,
            element_types,
            node_counts,
        }
    }

    /// Build a `ModelPart` from the arrays. Nodes and elements get the ids
    /// `1..=N` in array order.
    ///
    /// Elements are sliced by `node_counts`, so the arrays must pass
    /// [`MeshData::validate`].
    ///
    /// # Errors
    ///
    /// `InvalidName` for a bad name, `InvalidMesh` for inconsistent arrays.
    pub fn into_model_part(&self, name: &str) -> Result<ModelPart> {
        self.validate()?;
        let mut model_part = ModelPart::new(name)?;

        for (i, xyz) in self.coordinates.chunks_exact(3).enumerate() {
            model_part.create_new_node(to_id(i), xyz[0], xyz[1], xyz[2])?;
        }

        let mut offset = 0;
        let elements = self.element_types.iter().zip(&self.node_counts);
        for (i, (&element_type, &count)) in elements.enumerate() {
            let node_ids: Vec<IdType> = self.connectivities[offset..offset + count]
                .iter()
                .map(|&index| to_id(index))
                .collect();
            model_part.create_new_element(to_id(i), element_type, &node_ids)?;
            offset += count;
        }
        Ok(model_part)
    }
}

fn to_id(position: usize) -> IdType {
    IdType::try_from(position).map_or(IdType::MAX, |p| p.saturating_add(1))
}

// =============================================================================
// CONTAINER PAYLOAD
// =============================================================================

/// A node with its identity; `partition` is set for ghost nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: IdType,
    pub coordinates: [f64; 3],
    pub partition: Option<PartitionIndex>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: IdType,
    pub element_type: ElementType,
    pub node_ids: Vec<IdType>,
}

/// Full `ModelPart` state, preserving ids, coordinates, ghost partitions
/// and connectivity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPartPayload {
    pub name: String,
    /// In the exporter's insertion order.
    pub nodes: Vec<NodeRecord>,
    pub elements: Vec<ElementRecord>,
}

impl ModelPartPayload {
    #[must_use]
    pub fn from_model_part(model_part: &ModelPart) -> Self {
        let ghosts: HashMap<IdType, PartitionIndex> = model_part
            .ghost_nodes_with_partition()
            .map(|(node, partition)| (node.id(), partition))
            .collect();

        let nodes = model_part
            .nodes()
            .map(|node| NodeRecord {
                id: node.id(),
                coordinates: node.coordinates(),
                partition: ghosts.get(&node.id()).copied(),
            })
            .collect();

        let elements = model_part
            .elements()
            .map(|element| ElementRecord {
                id: element.id(),
                element_type: element.element_type(),
                node_ids: element.node_ids().collect(),
            })
            .collect();

        Self {
            name: model_part.name().to_string(),
            nodes,
            elements,
        }
    }

    #[must_use]
    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn number_of_elements(&self) -> usize {
        self.elements.len()
    }

    /// Add every node and element to `target`, keeping its existing content.
    ///
    /// The additions are staged on a copy; `target` is only replaced once
    /// all of them succeeded.
    ///
    /// # Errors
    ///
    /// The first creation error, e.g. `DuplicateId` when an id already
    /// exists in `target`. `target` is then unchanged.
    pub fn apply_to(&self, target: &mut ModelPart) -> Result<()> {
        let mut staged = target.clone();

        for node in &self.nodes {
            let [x, y, z] = node.coordinates;
            match node.partition {
                Some(partition) => {
                    staged.create_new_ghost_node(node.id, x, y, z, partition)?;
                }
                None => {
                    staged.create_new_node(node.id, x, y, z)?;
                }
            }
        }
        for element in &self.elements {
            staged.create_new_element(element.id, element.element_type, &element.node_ids)?;
        }

        *target = staged;
        Ok(())
    }
}
