use crate::{vector::Vector, vertex::Vertex};

/// A facet of a finished hull, or the lifted facet behind a Delaunay cell.
///
/// `V` is the vertex type and `N` the vector type of the hyperplane. For hull
/// faces `N` is the vertex's own vector type. For Delaunay cells the vertices
/// are mapped back to the input dimension while `N` stays one dimension up.
#[derive(Clone, Debug)]
pub struct Simplex<V: Vertex, N> {
    pub(crate) vertices: Vec<V>,
    pub(crate) adjacent: Vec<Option<usize>>,
    pub(crate) normal: N,
    pub(crate) offset: f64,
    pub(crate) centroid: V::Vector,
    pub(crate) normal_flipped: bool,
}

impl<V: Vertex, N: Vector> Simplex<V, N> {
    /// Returns the vertices of the simplex.
    ///
    /// Hull faces list them in ascending id order, Delaunay cells in input order.
    #[inline]
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    /// Returns the indices of the neighboring simplices.
    ///
    /// `adjacent()[i]` is the neighbor sharing every vertex except `vertices()[i]`.
    /// Entries are `None` only where a neighbor was removed, such as the
    /// upper-hull faces discarded by a Delaunay triangulation.
    #[inline]
    pub fn adjacent(&self) -> &[Option<usize>] {
        &self.adjacent
    }

    /// Returns the unit outward normal of the hyperplane.
    #[inline]
    pub fn normal(&self) -> N {
        self.normal
    }

    /// Returns the hyperplane offset, so that `normal · p + offset` is the signed distance of `p`.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Returns the mean of the vertex positions.
    #[inline]
    pub fn centroid(&self) -> V::Vector {
        self.centroid
    }

    /// Returns `true` if the naturally computed normal was negated to point outward.
    #[inline]
    pub fn is_normal_flipped(&self) -> bool {
        self.normal_flipped
    }

    /// Returns the signed distance of `point` to the hyperplane.
    ///
    /// Positive values lie outside.
    #[inline]
    pub fn signed_distance(&self, point: N) -> f64 {
        self.normal.dot(point) + self.offset
    }

    /// Returns `true` if a vertex with the given id belongs to the simplex.
    #[inline]
    pub fn has_vertex(&self, id: usize) -> bool {
        self.vertices.iter().any(|v| v.id() == id)
    }

    /// Returns `true` if every adjacency slot is filled.
    #[inline]
    pub fn is_fully_connected(&self) -> bool {
        self.adjacent.iter().all(Option::is_some)
    }
}

/// Computes the mean position of a set of vertices.
pub(crate) fn vertex_centroid<V: Vertex>(vertices: &[V]) -> V::Vector {
    let mut centroid = V::Vector::ZERO;
    for vertex in vertices {
        centroid += vertex.position();
    }
    centroid / vertices.len() as f64
}
