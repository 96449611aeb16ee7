//! The vertex capability interface and the concrete per-dimension vertex types.

use core::fmt::Debug;

use glam::{DVec2, DVec3, DVec4};

use crate::{hull::InputError, vector::Vector};

/// A point that can be fed to the hull, Delaunay and Voronoi builders.
///
/// A vertex carries its position, an identifier that must be unique within one
/// input set, and a scratch tag that algorithms are free to overwrite.
pub trait Vertex: Clone + Debug {
    /// The position type, which fixes the dimension.
    type Vector: Vector;

    /// Creates a vertex at the given position with id and tag set to zero.
    ///
    /// Used to synthesize new vertices, such as circumcenters.
    fn from_position(position: Self::Vector) -> Self;

    /// Returns the position of the vertex.
    fn position(&self) -> Self::Vector;

    /// Returns the identifier of the vertex.
    fn id(&self) -> usize;

    /// Sets the identifier of the vertex.
    fn set_id(&mut self, id: usize);

    /// Returns the scratch tag of the vertex.
    fn tag(&self) -> usize;

    /// Sets the scratch tag of the vertex.
    fn set_tag(&mut self, tag: usize);

    /// Returns the number of coordinates.
    #[inline]
    fn dimension(&self) -> usize {
        Self::Vector::DIM
    }

    /// Returns the squared distance from the origin.
    #[inline]
    fn sqr_magnitude(&self) -> f64 {
        self.position().length_squared()
    }

    /// Returns the distance from the origin.
    #[inline]
    fn magnitude(&self) -> f64 {
        self.sqr_magnitude().sqrt()
    }

    /// Returns the squared distance to `other`.
    #[inline]
    fn sqr_distance(&self, other: &Self) -> f64 {
        (self.position() - other.position()).length_squared()
    }

    /// Returns the distance to `other`.
    #[inline]
    fn distance(&self, other: &Self) -> f64 {
        self.sqr_distance(other).sqrt()
    }
}

macro_rules! impl_vertex {
    ($(#[$meta:meta])* $name:ident, $vec:ty, [$($coord:ident),+]) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq)]
        pub struct $name {
            /// The position of the vertex.
            pub position: $vec,
            /// The identifier of the vertex.
            pub id: usize,
            /// Scratch value, overwritten by the algorithms.
            pub tag: usize,
        }

        impl $name {
            /// Creates a vertex from its coordinates, with id and tag set to zero.
            #[inline]
            pub fn new($($coord: f64),+) -> Self {
                Self::from_position(<$vec>::new($($coord),+))
            }

            /// Returns the vertex with its identifier replaced by `id`.
            #[inline]
            #[must_use]
            pub fn with_id(mut self, id: usize) -> Self {
                self.id = id;
                self
            }
        }

        impl Vertex for $name {
            type Vector = $vec;

            #[inline]
            fn from_position(position: $vec) -> Self {
                Self {
                    position,
                    id: 0,
                    tag: 0,
                }
            }

            #[inline]
            fn position(&self) -> $vec {
                self.position
            }

            #[inline]
            fn id(&self) -> usize {
                self.id
            }

            #[inline]
            fn set_id(&mut self, id: usize) {
                self.id = id;
            }

            #[inline]
            fn tag(&self) -> usize {
                self.tag
            }

            #[inline]
            fn set_tag(&mut self, tag: usize) {
                self.tag = tag;
            }
        }

        impl From<$vec> for $name {
            #[inline]
            fn from(position: $vec) -> Self {
                Self::from_position(position)
            }
        }
    };
}

impl_vertex!(
    /// A vertex in 2D space.
    Vertex2,
    DVec2,
    [x, y]
);
impl_vertex!(
    /// A vertex in 3D space.
    Vertex3,
    DVec3,
    [x, y, z]
);
impl_vertex!(
    /// A vertex in 4D space.
    Vertex4,
    DVec4,
    [x, y, z, w]
);

/// Builds vertices from raw coordinate rows, as handed over by a host application.
///
/// Each vertex gets its row index as id.
///
/// # Errors
///
/// Returns [`InputError::DimensionMismatch`] for the first row whose length
/// differs from the dimension of `V`.
pub fn try_from_coordinates<V, R>(rows: &[R]) -> Result<Vec<V>, InputError>
where
    V: Vertex,
    R: AsRef<[f64]>,
{
    let dim = V::Vector::DIM;

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(InputError::DimensionMismatch {
                    index,
                    expected: dim,
                    found: row.len(),
                });
            }

            let mut position = V::Vector::ZERO;
            for (axis, value) in row.iter().enumerate() {
                position[axis] = *value;
            }

            let mut vertex = V::from_position(position);
            vertex.set_id(index);
            Ok(vertex)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn magnitudes_and_distances() {
        let a = Vertex3::new(1.0, 2.0, 2.0);
        let b = Vertex3::new(1.0, 2.0, -1.0);
        assert_relative_eq!(a.sqr_magnitude(), 9.0);
        assert_relative_eq!(a.magnitude(), 3.0);
        assert_relative_eq!(a.sqr_distance(&b), 9.0);
        assert_relative_eq!(a.distance(&b), 3.0);
        assert_eq!(a.dimension(), 3);
    }

    #[test]
    fn from_coordinates() {
        let rows = [[0.0, 1.0], [2.0, 3.0]];
        let vertices: Vec<Vertex2> = try_from_coordinates(&rows).unwrap();
        assert_eq!(vertices[1], Vertex2::new(2.0, 3.0).with_id(1));
    }

    #[test]
    fn from_coordinates_dimension_mismatch() {
        let rows: Vec<Vec<f64>> = vec![vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]];
        let result = try_from_coordinates::<Vertex4, _>(&rows);
        assert_eq!(
            result,
            Err(InputError::DimensionMismatch {
                index: 1,
                expected: 4,
                found: 3
            })
        );
    }
}
