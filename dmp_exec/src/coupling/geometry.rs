//! # Obstacle geometry helpers

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GeometryError {
    #[error("The obstacle vertex list is empty")]
    EmptyVertexList,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Size of the axis aligned bounding box of the vertices along each axis.
pub fn bounding_box_extents(vertices: &[Vector3<f64>]) -> Result<Vector3<f64>, GeometryError> {
    let first = vertices.first().ok_or(GeometryError::EmptyVertexList)?;

    let (min, max) = vertices
        .iter()
        .fold((*first, *first), |(min, max), v| (min.inf(v), max.sup(v)));

    Ok(max - min)
}

/// Arithmetic mean of the vertices.
pub fn centroid(vertices: &[Vector3<f64>]) -> Result<Vector3<f64>, GeometryError> {
    if vertices.is_empty() {
        return Err(GeometryError::EmptyVertexList);
    }

    let sum = vertices
        .iter()
        .fold(Vector3::zeros(), |acc: Vector3<f64>, v| acc + v);

    Ok(sum / vertices.len() as f64)
}

/// The vertex closest to `point`, the first one found if several are equally close.
pub fn nearest_vertex(
    vertices: &[Vector3<f64>],
    point: &Vector3<f64>,
) -> Result<Vector3<f64>, GeometryError> {
    let mut nearest = *vertices.first().ok_or(GeometryError::EmptyVertexList)?;
    let mut min_dist = (nearest - point).norm();

    for v in &vertices[1..] {
        let dist = (v - point).norm();
        if dist < min_dist {
            min_dist = dist;
            nearest = *v;
        }
    }

    Ok(nearest)
}
