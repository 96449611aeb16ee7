use crate::{
    fixed_hasher::FixedHashSet,
    hull::{HullError, InputError},
    simplex::Simplex,
    vector::Vector,
    vertex::Vertex,
};

/// Checks the input vertices for a wrong dimension, non-finite coordinates and reused ids.
///
/// # Errors
///
/// Returns the [`InputError`] of the first offending vertex.
pub fn validate_input<V: Vertex>(vertices: &[V]) -> Result<(), InputError> {
    let mut ids = FixedHashSet::default();
    ids.reserve(vertices.len());

    for (index, vertex) in vertices.iter().enumerate() {
        if vertex.dimension() != V::Vector::DIM {
            return Err(InputError::DimensionMismatch {
                index,
                expected: V::Vector::DIM,
                found: vertex.dimension(),
            });
        }
        if !vertex.position().is_finite() {
            return Err(InputError::NonFiniteCoordinate { index });
        }
        if !ids.insert(vertex.id()) {
            return Err(InputError::DuplicateId {
                index,
                id: vertex.id(),
            });
        }
    }

    Ok(())
}

/// Checks that a finished face list forms a closed manifold.
///
/// Every adjacency slot must be filled, every neighbor must link back, and
/// `adjacent[i]` must share exactly the vertices other than `vertices[i]`.
///
/// # Errors
///
/// Returns [`HullError::InternalError`] describing the first violation.
pub fn validate_manifold<V: Vertex, N: Vector>(simplices: &[Simplex<V, N>]) -> Result<(), HullError> {
    for (index, simplex) in simplices.iter().enumerate() {
        for (i, neighbor) in simplex.adjacent().iter().enumerate() {
            let Some(neighbor) = *neighbor else {
                return Err(HullError::InternalError("Face has an empty adjacency slot."));
            };
            let neighbor = simplices
                .get(neighbor)
                .ok_or(HullError::InternalError("Face links to a missing neighbor."))?;

            if !neighbor.adjacent().contains(&Some(index)) {
                return Err(HullError::InternalError(
                    "Neighbor face does not point back.",
                ));
            }

            let opposite = simplex.vertices()[i].id();
            let shares_ridge = simplex
                .vertices()
                .iter()
                .filter(|v| v.id() != opposite)
                .all(|v| neighbor.has_vertex(v.id()));
            if !shares_ridge || neighbor.has_vertex(opposite) {
                return Err(HullError::InternalError(
                    "Neighbor face does not share the expected ridge.",
                ));
            }
        }
    }

    Ok(())
}
