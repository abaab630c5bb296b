//! Legacy ASCII VTK output for visual inspection of a `ModelPart`.

use crate::errors::{CoSimError, EntityKind, Result};
use crate::model_part::ModelPart;
use std::collections::HashMap;
use std::io::Write;

/// Write `model_part` as a VTK unstructured grid.
///
/// Points are written in node insertion order; cells reference them by
/// 0-based position.
///
/// # Errors
///
/// - `UnsupportedElementType` if an element type has no VTK cell
/// - `Io` if writing fails
pub fn write_vtk<W: Write>(model_part: &ModelPart, mut out: W) -> Result<()> {
    // check before writing anything
    let mut cell_types = Vec::with_capacity(model_part.number_of_elements());
    for element in model_part.elements() {
        let cell_type = element.element_type().vtk_cell_type().ok_or_else(|| {
            CoSimError::UnsupportedElementType(format!(
                "{} (element {}) cannot be written to VTK",
                element.element_type(),
                element.id()
            ))
        })?;
        cell_types.push(cell_type);
    }

    writeln!(out, "# vtk DataFile Version 4.0")?;
    writeln!(out, "CoSimIO ModelPart \"{}\"", model_part.name())?;
    writeln!(out, "ASCII")?;
    writeln!(out, "DATASET UNSTRUCTURED_GRID")?;

    writeln!(out, "POINTS {} float", model_part.number_of_nodes())?;
    let mut positions = HashMap::with_capacity(model_part.number_of_nodes());
    for (position, node) in model_part.nodes().enumerate() {
        positions.insert(node.id(), position);
        writeln!(out, "{} {} {}", node.x(), node.y(), node.z())?;
    }

    let cell_list_size: usize = model_part
        .elements()
        .map(|e| e.number_of_nodes() + 1)
        .sum();
    writeln!(out)?;
    writeln!(
        out,
        "CELLS {} {}",
        model_part.number_of_elements(),
        cell_list_size
    )?;
    for element in model_part.elements() {
        write!(out, "{}", element.number_of_nodes())?;
        for id in element.node_ids() {
            let position = positions.get(&id).copied().ok_or(CoSimError::NotFound {
                kind: EntityKind::Node,
                id,
            })?;
            write!(out, " {position}")?;
        }
        writeln!(out)?;
    }

    writeln!(out)?;
    writeln!(out, "CELL_TYPES {}", model_part.number_of_elements())?;
    for cell_type in cell_types {
        writeln!(out, "{cell_type}")?;
    }
    Ok(())
}
