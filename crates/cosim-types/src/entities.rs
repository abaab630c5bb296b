//! # Geometry Entities
//!
//! `Node` and `Element` are immutable after creation and owned exclusively
//! by the `ModelPart` that created them.
//!
//! An `Element` never owns its nodes: it stores [`NodeRef`]s (arena index
//! plus id) into the owning container, resolved through
//! `ModelPart::element_nodes`.

use crate::errors::{CoSimError, EntityKind, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a Node or Element (positive).
pub type IdType = i64;

/// Index of the partition owning a ghost node.
pub type PartitionIndex = i32;

// =============================================================================
// NODE
// =============================================================================

/// A point in 3D space with a unique id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: IdType,
    coordinates: [f64; 3],
}

impl Node {
    /// # Errors
    ///
    /// `InvalidId` if `id < 1`.
    pub fn new(id: IdType, x: f64, y: f64, z: f64) -> Result<Self> {
        if id < 1 {
            return Err(CoSimError::InvalidId {
                kind: EntityKind::Node,
                id,
            });
        }
        Ok(Self {
            id,
            coordinates: [x, y, z],
        })
    }

    #[must_use]
    pub fn id(&self) -> IdType {
        self.id
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.coordinates[0]
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.coordinates[1]
    }

    #[must_use]
    pub fn z(&self) -> f64 {
        self.coordinates[2]
    }

    #[must_use]
    pub fn coordinates(&self) -> [f64; 3] {
        self.coordinates
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CoSimIO-Node; Id: {}", self.id)?;
        writeln!(
            f,
            "    Coordinates: [ {} | {} | {} ]",
            self.x(),
            self.y(),
            self.z()
        )
    }
}

/// Weak reference from an Element to a Node of the same container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    /// Position in the owning container's node arena.
    pub index: usize,
    /// Id of the referenced node.
    pub id: IdType,
}

// =============================================================================
// ELEMENT TYPE
// =============================================================================

/// Geometric element kinds. The discriminants are the wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(i32)]
pub enum ElementType {
    Hexahedra3D20 = 0,
    Hexahedra3D27 = 1,
    Hexahedra3D8 = 2,
    Prism3D15 = 3,
    Prism3D6 = 4,
    Quadrilateral2D4 = 5,
    Quadrilateral2D8 = 6,
    Quadrilateral2D9 = 7,
    Quadrilateral3D4 = 8,
    Quadrilateral3D8 = 9,
    Quadrilateral3D9 = 10,
    Tetrahedra3D10 = 11,
    Tetrahedra3D4 = 12,
    Triangle2D3 = 13,
    Triangle2D6 = 14,
    Triangle3D3 = 15,
    Triangle3D6 = 16,
    Line2D2 = 17,
    Line2D3 = 18,
    Line3D2 = 19,
    Line3D3 = 20,
    Point2D = 21,
    Point3D = 22,
}

impl ElementType {
    /// Every element type, ordered by wire value.
    pub const ALL: [ElementType; 23] = [
        ElementType::Hexahedra3D20,
        ElementType::Hexahedra3D27,
        ElementType::Hexahedra3D8,
        ElementType::Prism3D15,
        ElementType::Prism3D6,
        ElementType::Quadrilateral2D4,
        ElementType::Quadrilateral2D8,
        ElementType::Quadrilateral2D9,
        ElementType::Quadrilateral3D4,
        ElementType::Quadrilateral3D8,
        ElementType::Quadrilateral3D9,
        ElementType::Tetrahedra3D10,
        ElementType::Tetrahedra3D4,
        ElementType::Triangle2D3,
        ElementType::Triangle2D6,
        ElementType::Triangle3D3,
        ElementType::Triangle3D6,
        ElementType::Line2D2,
        ElementType::Line2D3,
        ElementType::Line3D2,
        ElementType::Line3D3,
        ElementType::Point2D,
        ElementType::Point3D,
    ];

    /// Stable integer used on the wire.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Number of nodes the topology of this type implies.
    #[must_use]
    pub fn number_of_nodes(self) -> usize {
        match self {
            ElementType::Hexahedra3D20 => 20,
            ElementType::Hexahedra3D27 => 27,
            ElementType::Hexahedra3D8 => 8,
            ElementType::Prism3D15 => 15,
            ElementType::Prism3D6 => 6,
            ElementType::Quadrilateral2D4 | ElementType::Quadrilateral3D4 => 4,
            ElementType::Quadrilateral2D8 | ElementType::Quadrilateral3D8 => 8,
            ElementType::Quadrilateral2D9 | ElementType::Quadrilateral3D9 => 9,
            ElementType::Tetrahedra3D10 => 10,
            ElementType::Tetrahedra3D4 => 4,
            ElementType::Triangle2D3 | ElementType::Triangle3D3 => 3,
            ElementType::Triangle2D6 | ElementType::Triangle3D6 => 6,
            ElementType::Line2D2 | ElementType::Line3D2 => 2,
            ElementType::Line2D3 | ElementType::Line3D3 => 3,
            ElementType::Point2D | ElementType::Point3D => 1,
        }
    }

    /// VTK legacy cell type, `None` where VTK has no matching cell.
    #[must_use]
    pub fn vtk_cell_type(self) -> Option<u8> {
        match self {
            ElementType::Point2D | ElementType::Point3D => Some(1),
            ElementType::Line2D2 | ElementType::Line3D2 => Some(3),
            ElementType::Triangle2D3 | ElementType::Triangle3D3 => Some(5),
            ElementType::Quadrilateral2D4 | ElementType::Quadrilateral3D4 => Some(9),
            ElementType::Tetrahedra3D4 => Some(10),
            ElementType::Hexahedra3D8 => Some(12),
            ElementType::Prism3D6 => Some(13),
            ElementType::Line2D3 | ElementType::Line3D3 => Some(21),
            ElementType::Triangle2D6 | ElementType::Triangle3D6 => Some(22),
            ElementType::Quadrilateral2D8 | ElementType::Quadrilateral3D8 => Some(23),
            ElementType::Tetrahedra3D10 => Some(24),
            ElementType::Hexahedra3D20 => Some(25),
            ElementType::Hexahedra3D27
            | ElementType::Prism3D15
            | ElementType::Quadrilateral2D9
            | ElementType::Quadrilateral3D9 => None,
        }
    }
}

impl TryFrom<i32> for ElementType {
    type Error = CoSimError;

    fn try_from(value: i32) -> Result<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|i| ElementType::ALL.get(i).copied())
            .ok_or_else(|| CoSimError::UnsupportedElementType(value.to_string()))
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

// =============================================================================
// ELEMENT
// =============================================================================

/// A geometric element connecting nodes of its container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    id: IdType,
    element_type: ElementType,
    nodes: Vec<NodeRef>,
}

impl Element {
    /// The node count is deliberately not checked against the type's arity.
    ///
    /// # Errors
    ///
    /// - `InvalidId` if `id < 1`
    /// - `InvalidMesh` if `nodes` is empty
    pub fn new(id: IdType, element_type: ElementType, nodes: Vec<NodeRef>) -> Result<Self> {
        if id < 1 {
            return Err(CoSimError::InvalidId {
                kind: EntityKind::Element,
                id,
            });
        }
        if nodes.is_empty() {
            return Err(CoSimError::InvalidMesh(format!(
                "Element {id} was created without nodes"
            )));
        }
        Ok(Self {
            id,
            element_type,
            nodes,
        })
    }

    #[must_use]
    pub fn id(&self) -> IdType {
        self.id
    }

    #[must_use]
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    #[must_use]
    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// The weak node references, in connectivity order.
    #[must_use]
    pub fn node_refs(&self) -> &[NodeRef] {
        &self.nodes
    }

    pub fn node_ids(&self) -> impl Iterator<Item = IdType> + '_ {
        self.nodes.iter().map(|r| r.id)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CoSimIO-Element; Id: {}", self.id)?;
        writeln!(f, "    Number of Nodes: {}", self.number_of_nodes())?;
        let ids: Vec<String> = self.node_ids().map(|id| id.to_string()).collect();
        writeln!(f, "    Node Ids: {}", ids.join(", "))
    }
}
