//! # CoSim Types Crate
//!
//! Data model shared by the transport layer and the coupling runtime.
//!
//! ## Contents
//!
//! - **`Info`**: self-describing key/value metadata that accompanies every
//!   operation (settings, identifiers, results, control signals).
//! - **`Vector`**: resizable sequence of doubles for field data.
//! - **`Node` / `Element` / `ModelPart`**: the mesh model, split into local
//!   and ghost nodes for partitioned meshes.
//! - **`MeshData` / `ModelPartPayload`**: the two shapes a mesh travels in.
//! - **`CoSimError`**: the error taxonomy surfaced to callers.
//!
//! ## Design Principles
//!
//! - **Owned values**: nested `Info` containers are stored by value, so a
//!   clone is always a deep copy.
//! - **Arena references**: elements refer to nodes by arena index and id,
//!   never by ownership.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod entities;
pub mod errors;
pub mod info;
pub mod mesh;
pub mod model_part;
pub mod vector;
pub mod vtk;

pub use entities::{Element, ElementType, IdType, Node, NodeRef, PartitionIndex};
pub use errors::{CoSimError, EntityKind, Result};
pub use info::{Info, InfoType, InfoValue};
pub use mesh::{MeshData, ModelPartPayload};
pub use model_part::ModelPart;
pub use vector::Vector;
