//! Delaunay triangulations through the convex hull of lifted points.
//!
//! Every input point `p` is lifted onto the paraboloid `(p, |p|²)` one dimension
//! up. The faces of the lifted hull whose outward normals point down form the
//! lower hull, and their projections back down are the Delaunay cells.
//!
//! One extra point is lifted high above the centroid of the input. It makes
//! cospherical inputs, whose lifted points all lie on one hyperplane, full
//! dimensional. It only ever belongs to upper faces, so it never shows up in
//! the output.

pub mod circumsphere;

use tracing::debug;

use crate::{
    hull::{validate_input, HullBuilder, HullError, HullOptions, PLANE_DISTANCE_TOLERANCE},
    simplex::{vertex_centroid, Simplex},
    vector::{Lift, Vector},
    vertex::Vertex,
};

/// The lifted vector type of a vertex type.
pub type LiftedVector<V> = <<V as Vertex>::Vector as Lift>::Lifted;

/// A lifted copy of an input vertex, remembering where it came from.
#[derive(Clone, Copy, Debug)]
struct LiftedVertex<N> {
    position: N,
    id: usize,
    tag: usize,
    /// The index of the input vertex, or `usize::MAX` for the apex.
    source: usize,
}

impl<N: Vector> Vertex for LiftedVertex<N> {
    type Vector = N;

    #[inline]
    fn from_position(position: N) -> Self {
        Self {
            position,
            id: 0,
            tag: 0,
            source: usize::MAX,
        }
    }

    #[inline]
    fn position(&self) -> N {
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

/// A cell of a [`DelaunayTriangulation`]: a simplex of `DIM + 1` input vertices
/// whose circumsphere contains no other input vertex.
#[derive(Clone, Debug)]
pub struct DelaunayCell<V: Vertex>
where
    V::Vector: Lift,
{
    pub(crate) simplex: Simplex<V, LiftedVector<V>>,
    pub(crate) circumcenter: V,
    radius: f64,
}

impl<V: Vertex> DelaunayCell<V>
where
    V::Vector: Lift,
{
    /// Returns the lower hull face this cell was made from.
    ///
    /// Its vertices are the unlifted input vertices. Its normal and offset
    /// describe the lifted hyperplane, and its adjacency refers to cell indices.
    #[inline]
    pub fn simplex(&self) -> &Simplex<V, LiftedVector<V>> {
        &self.simplex
    }

    /// Returns the `DIM + 1` vertices of the cell.
    #[inline]
    pub fn vertices(&self) -> &[V] {
        self.simplex.vertices()
    }

    /// Returns the indices of the neighboring cells.
    ///
    /// `adjacent()[i]` is opposite to `vertices()[i]`, and is `None` on the
    /// boundary of the triangulation.
    #[inline]
    pub fn adjacent(&self) -> &[Option<usize>] {
        self.simplex.adjacent()
    }

    /// Returns the center of the circumsphere, whose id is the cell index.
    ///
    /// This is a vertex of the dual Voronoi diagram.
    #[inline]
    pub fn circumcenter(&self) -> &V {
        &self.circumcenter
    }

    /// Returns the radius of the circumsphere.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns `true` if `vertex` lies strictly inside the circumsphere, by more
    /// than [`PLANE_DISTANCE_TOLERANCE`].
    pub fn contains_in_circumsphere(&self, vertex: &V) -> bool {
        vertex.distance(&self.circumcenter) < self.radius - PLANE_DISTANCE_TOLERANCE
    }
}

/// A [Delaunay triangulation] of a set of 2D or 3D vertices.
///
/// [Delaunay triangulation]: https://en.wikipedia.org/wiki/Delaunay_triangulation
///
/// # Example
///
/// ```
/// use quickhull_voronoi::{DelaunayTriangulation, HullOptions, Vertex2};
///
/// let mut vertices = vec![
///     Vertex2::new(0.0, 0.0),
///     Vertex2::new(1.0, 0.0),
///     Vertex2::new(1.0, 1.0),
///     Vertex2::new(0.0, 1.0),
/// ];
///
/// let triangulation =
///     DelaunayTriangulation::try_from_vertices(&mut vertices, HullOptions::default()).unwrap();
///
/// assert_eq!(triangulation.cells().len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct DelaunayTriangulation<V: Vertex>
where
    V::Vector: Lift,
{
    pub(crate) vertices: Vec<V>,
    pub(crate) cells: Vec<DelaunayCell<V>>,
    centroid: V::Vector,
}

impl<V: Vertex> DelaunayTriangulation<V>
where
    V::Vector: Lift,
{
    /// Attempts to triangulate the given vertices.
    ///
    /// The options are applied to `vertices` as in
    /// [`ConvexHull::try_from_vertices`](crate::ConvexHull::try_from_vertices).
    /// Fewer than `DIM + 1` vertices produce an empty triangulation.
    ///
    /// # Errors
    ///
    /// Returns a [`HullError`] if the input is invalid, if all vertices lie on
    /// a common hyperplane, or if the lifted hull could not be built.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(dim = <V::Vector as Vector>::DIM, vertices = vertices.len())
    )]
    pub fn try_from_vertices(vertices: &mut [V], options: HullOptions) -> Result<Self, HullError> {
        let dim = V::Vector::DIM;

        if options.assign_ids {
            for (id, vertex) in vertices.iter_mut().enumerate() {
                vertex.set_id(id);
            }
        }
        if options.check_input {
            validate_input(vertices)?;
        }
        if vertices.len() < dim + 1 {
            debug!("too few vertices, the triangulation is empty");
            return Ok(Self::empty());
        }

        let mut lifted = Vec::with_capacity(vertices.len() + 1);
        let mut center = V::Vector::ZERO;
        let mut bottom = f64::INFINITY;
        let mut top = f64::NEG_INFINITY;

        for (source, vertex) in vertices.iter().enumerate() {
            let position = vertex.position();
            let height = position.length_squared();
            bottom = bottom.min(height);
            top = top.max(height);
            center += position;
            lifted.push(LiftedVertex {
                position: position.lift(height),
                id: source,
                tag: 0,
                source,
            });
        }

        let apex = vertices.len();
        center = center / vertices.len() as f64;
        lifted.push(LiftedVertex {
            position: center.lift(top + (top - bottom) + 1.0),
            id: apex,
            tag: 0,
            source: usize::MAX,
        });

        let hull = HullBuilder::new(HullOptions::default()).generate(&mut lifted)?;

        // Lower hull faces become cells, everything else is dropped.
        let mut cell_of = vec![None; hull.simplices().len()];
        let mut cell_count = 0;
        for (face, cell) in hull.simplices().iter().zip(cell_of.iter_mut()) {
            if face.normal()[dim] < 0.0 && !face.has_vertex(apex) {
                *cell = Some(cell_count);
                cell_count += 1;
            }
        }

        let mut used = vec![false; vertices.len()];
        let mut cells = Vec::with_capacity(cell_count);

        for (face, cell) in hull.simplices().iter().zip(&cell_of) {
            let Some(index) = *cell else {
                continue;
            };

            let cell_vertices: Vec<V> = face
                .vertices()
                .iter()
                .map(|v| vertices[v.source].clone())
                .collect();
            for v in face.vertices() {
                used[v.source] = true;
            }

            let positions: Vec<V::Vector> = cell_vertices.iter().map(Vertex::position).collect();
            let (center, radius) = <V::Vector as Lift>::circumsphere(&positions);
            let mut circumcenter = V::from_position(center);
            circumcenter.set_id(index);

            // Links to dropped faces are cut.
            let adjacent = face
                .adjacent()
                .iter()
                .map(|neighbor| neighbor.and_then(|n| cell_of[n]))
                .collect();

            cells.push(DelaunayCell {
                simplex: Simplex {
                    centroid: vertex_centroid(&cell_vertices),
                    vertices: cell_vertices,
                    adjacent,
                    normal: face.normal(),
                    offset: face.offset(),
                    normal_flipped: face.is_normal_flipped(),
                },
                circumcenter,
                radius,
            });
        }

        let used_vertices: Vec<V> = vertices
            .iter()
            .zip(&used)
            .filter(|&(_, &is_used)| is_used)
            .map(|(v, _)| v.clone())
            .collect();
        let centroid = if used_vertices.is_empty() {
            V::Vector::ZERO
        } else {
            vertex_centroid(&used_vertices)
        };

        debug!(
            cells = cells.len(),
            vertices = used_vertices.len(),
            "delaunay triangulation generated"
        );

        Ok(Self {
            vertices: used_vertices,
            cells,
            centroid,
        })
    }

    fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            cells: Vec::new(),
            centroid: V::Vector::ZERO,
        }
    }

    /// Returns the input vertices that belong to at least one cell, in input order.
    #[inline]
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    /// Returns the cells of the triangulation.
    #[inline]
    pub fn cells(&self) -> &[DelaunayCell<V>] {
        &self.cells
    }

    /// Returns the mean position of the triangulated vertices.
    #[inline]
    pub fn centroid(&self) -> V::Vector {
        self.centroid
    }

    /// Returns `true` if the triangulation has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::{
        hull::ConvexHull,
        vertex::{Vertex2, Vertex3},
    };

    fn triangulate<V: Vertex>(vertices: &mut [V]) -> DelaunayTriangulation<V>
    where
        V::Vector: Lift,
    {
        DelaunayTriangulation::try_from_vertices(vertices, HullOptions::default()).unwrap()
    }

    fn cell_content<V: Vertex>(cell: &DelaunayCell<V>) -> f64
    where
        V::Vector: Lift,
    {
        let dim = V::Vector::DIM;
        let origin = cell.vertices()[0].position();
        let columns: Vec<V::Vector> = cell.vertices()[1..]
            .iter()
            .map(|v| v.position() - origin)
            .collect();
        let factorial: f64 = (1..=dim).map(|k| k as f64).product();
        V::Vector::determinant(&columns).abs() / factorial
    }

    fn random_points<V: Vertex>(count: usize, seed: u64) -> Vec<V> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let mut position = V::Vector::ZERO;
                for axis in 0..V::Vector::DIM {
                    position[axis] = rng.random_range(-1.0..1.0);
                }
                V::from_position(position)
            })
            .collect()
    }

    fn assert_delaunay<V: Vertex>(triangulation: &DelaunayTriangulation<V>, input: &[V])
    where
        V::Vector: Lift,
    {
        assert!(!triangulation.is_empty());

        for (index, cell) in triangulation.cells().iter().enumerate() {
            assert_eq!(cell.vertices().len(), V::Vector::DIM + 1);
            assert_eq!(cell.circumcenter().id(), index);
            assert!(cell.radius().is_finite());

            for vertex in input {
                if cell.simplex().has_vertex(vertex.id()) {
                    assert_relative_eq!(
                        vertex.distance(cell.circumcenter()),
                        cell.radius(),
                        epsilon = 1e-9
                    );
                } else {
                    assert!(vertex.distance(cell.circumcenter()) >= cell.radius() - 1e-6);
                }
            }

            for (i, neighbor) in cell.adjacent().iter().enumerate() {
                let Some(neighbor) = *neighbor else {
                    continue;
                };
                let other = &triangulation.cells()[neighbor];
                assert!(other.adjacent().contains(&Some(index)));
                assert!(!other.simplex().has_vertex(cell.vertices()[i].id()));
            }
        }
    }

    #[test]
    fn unit_square() {
        let mut vertices = vec![
            Vertex2::new(0.0, 0.0),
            Vertex2::new(1.0, 0.0),
            Vertex2::new(1.0, 1.0),
            Vertex2::new(0.0, 1.0),
        ];
        let triangulation = triangulate(&mut vertices);

        assert_delaunay(&triangulation, &vertices);
        assert_eq!(triangulation.cells().len(), 2);
        assert_eq!(triangulation.vertices().len(), 4);

        let area: f64 = triangulation.cells().iter().map(cell_content).sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-12);

        for cell in triangulation.cells() {
            assert_relative_eq!(cell.circumcenter().position.x, 0.5, epsilon = 1e-12);
            assert_relative_eq!(cell.circumcenter().position.y, 0.5, epsilon = 1e-12);
            assert_relative_eq!(cell.radius(), 0.5_f64.sqrt(), epsilon = 1e-12);
            assert!(cell.simplex().normal()[2] < 0.0);
            assert!(cell.contains_in_circumsphere(&Vertex2::new(0.5, 0.7)));
            assert!(!cell.contains_in_circumsphere(&Vertex2::new(1.0, 0.0)));
        }

        let [first, second] = [&triangulation.cells()[0], &triangulation.cells()[1]];
        assert!(first.adjacent().contains(&Some(1)));
        assert!(second.adjacent().contains(&Some(0)));
        assert_eq!(first.adjacent().iter().flatten().count(), 1);
    }

    #[test]
    fn grid() {
        let mut vertices: Vec<Vertex2> = (0..9)
            .map(|i| Vertex2::new((i % 3) as f64, (i / 3) as f64))
            .collect();
        let triangulation = triangulate(&mut vertices);

        assert_delaunay(&triangulation, &vertices);
        assert_eq!(triangulation.cells().len(), 8);
        let area: f64 = triangulation.cells().iter().map(cell_content).sum();
        assert_relative_eq!(area, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn single_triangle() {
        let mut vertices = vec![
            Vertex2::new(0.0, 0.0),
            Vertex2::new(4.0, 0.0),
            Vertex2::new(0.0, 3.0),
        ];
        let triangulation = triangulate(&mut vertices);

        assert_eq!(triangulation.cells().len(), 1);
        let cell = &triangulation.cells()[0];
        assert!(cell.adjacent().iter().all(Option::is_none));
        assert_relative_eq!(cell.radius(), 2.5, epsilon = 1e-12);
        assert_relative_eq!(triangulation.centroid().x, 4.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn single_tetrahedron() {
        let mut vertices = vec![
            Vertex3::new(0.0, 0.0, 0.0),
            Vertex3::new(1.0, 0.0, 0.0),
            Vertex3::new(0.0, 1.0, 0.0),
            Vertex3::new(0.0, 0.0, 1.0),
        ];
        let triangulation = triangulate(&mut vertices);

        assert_eq!(triangulation.cells().len(), 1);
        assert_relative_eq!(triangulation.cells()[0].radius(), 0.75_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn too_few_vertices() {
        let mut vertices = vec![Vertex3::new(0.0, 0.0, 0.0); 3];
        assert!(triangulate(&mut vertices).is_empty());
    }

    #[test]
    fn collinear_is_singular() {
        let mut vertices: Vec<Vertex2> = (0..5).map(|i| Vertex2::new(i as f64, 0.0)).collect();
        let result = DelaunayTriangulation::try_from_vertices(&mut vertices, HullOptions::default());
        assert!(matches!(result, Err(HullError::SingularInput { .. })));
    }

    #[test]
    fn checked_input() {
        let mut vertices = vec![
            Vertex2::new(0.0, 0.0),
            Vertex2::new(1.0, 0.0),
            Vertex2::new(0.0, f64::NAN),
        ];
        let options = HullOptions::default().with_check_input(true);
        let result = DelaunayTriangulation::try_from_vertices(&mut vertices, options);
        assert!(matches!(result, Err(HullError::InvalidInput(_))));
    }

    #[test]
    fn random_2d_covers_hull() {
        for seed in 0..3 {
            let mut vertices: Vec<Vertex2> = random_points(150, seed);
            let triangulation = triangulate(&mut vertices);
            assert_delaunay(&triangulation, &vertices);

            let hull = ConvexHull::try_from_vertices(&mut vertices, HullOptions::default()).unwrap();
            let area: f64 = triangulation.cells().iter().map(cell_content).sum();
            assert_relative_eq!(area, hull.volume(), epsilon = 1e-9);
        }
    }

    #[test]
    fn random_3d_covers_hull() {
        let mut vertices: Vec<Vertex3> = random_points(120, 11);
        let triangulation = triangulate(&mut vertices);
        assert_delaunay(&triangulation, &vertices);

        let hull = ConvexHull::try_from_vertices(&mut vertices, HullOptions::default()).unwrap();
        let volume: f64 = triangulation.cells().iter().map(cell_content).sum();
        assert_relative_eq!(volume, hull.volume(), epsilon = 1e-9);
    }
}
