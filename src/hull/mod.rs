//! Incremental convex hulls in 2 to 4 dimensions.
//!
//! The builder starts from a simplex of `DIM + 1` extreme points and repeatedly
//! inserts the point furthest beyond the face with the largest beyond set:
//!
//! 1. Collect the faces visible from the point by walking the adjacency graph.
//! 2. Build a cone of new faces between the point and the horizon ridges.
//! 3. Stitch the cone faces together through their shared ridges.
//! 4. Distribute the beyond sets of the replaced faces over the cone.
//!
//! A point whose cone would contain a degenerate face is marked singular. The
//! faces it sees are then accepted as final instead of being subdivided.

mod beyond;
mod connector;
mod face;
mod initial_simplex;
mod pool;
mod queue;
mod validation;

pub use validation::{validate_input, validate_manifold};

use core::mem;

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    fixed_hasher::FixedHashSet,
    hull::{
        connector::{Connector, ConnectorTable},
        face::{FaceId, FaceState, HullFace, PointId},
        pool::ObjectPool,
        queue::FaceQueue,
    },
    simplex::{vertex_centroid, Simplex},
    vector::Vector,
    vertex::Vertex,
};

/// Points at or above this signed distance from a face plane lie beyond the face.
pub const PLANE_DISTANCE_TOLERANCE: f64 = 1e-7;

/// An error in the input vertices, reported when [`HullOptions::check_input`] is set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// A vertex does not have the expected number of coordinates.
    #[error("Vertex {index} has {found} coordinates, expected {expected}.")]
    DimensionMismatch {
        /// The position of the vertex in the input.
        index: usize,
        /// The dimension of the builder.
        expected: usize,
        /// The dimension of the vertex.
        found: usize,
    },
    /// Two vertices share an id.
    #[error("Vertex {index} reuses the id {id}.")]
    DuplicateId {
        /// The position of the second vertex in the input.
        index: usize,
        /// The shared id.
        id: usize,
    },
    /// A vertex has a NaN or infinite coordinate.
    #[error("Vertex {index} has a non-finite coordinate.")]
    NonFiniteCoordinate {
        /// The position of the vertex in the input.
        index: usize,
    },
}

/// An error returned during [`ConvexHull`] construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HullError {
    /// The input failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),
    /// The input points do not span the space, so no initial simplex exists.
    #[error("Input points are degenerate: found {found} affinely independent points, {required} required.")]
    SingularInput {
        /// The number of affinely independent points that were found.
        found: usize,
        /// The number of affinely independent points needed, `DIM + 1`.
        required: usize,
    },
    /// An error in the algorithm itself. Please report it as a bug
    /// with a minimal reproducible example.
    #[error("Internal error: {0}")]
    InternalError(&'static str),
}

/// Options for hull, Delaunay and Voronoi construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HullOptions {
    /// Overwrite the vertex ids with their input positions. Defaults to `true`.
    pub assign_ids: bool,
    /// Validate the input before building. Defaults to `false`.
    pub check_input: bool,
}

impl Default for HullOptions {
    fn default() -> Self {
        Self {
            assign_ids: true,
            check_input: false,
        }
    }
}

impl HullOptions {
    /// Sets whether vertex ids are overwritten with their input positions.
    #[inline]
    pub fn with_assign_ids(mut self, assign_ids: bool) -> Self {
        self.assign_ids = assign_ids;
        self
    }

    /// Sets whether the input is validated.
    #[inline]
    pub fn with_check_input(mut self, check_input: bool) -> Self {
        self.check_input = check_input;
        self
    }
}

/// The [convex hull] of a set of vertices: the smallest convex set containing them.
///
/// [convex hull]: https://en.wikipedia.org/wiki/Convex_hull
///
/// # Example
///
/// ```
/// use quickhull_voronoi::{ConvexHull, HullOptions, Vertex2};
///
/// let mut vertices = vec![
///     Vertex2::new(-1.0, -1.0),
///     Vertex2::new(1.0, -1.0),
///     Vertex2::new(1.0, 1.0),
///     Vertex2::new(-1.0, 1.0),
///     Vertex2::new(0.0, 0.0),
/// ];
///
/// let hull = ConvexHull::try_from_vertices(&mut vertices, HullOptions::default()).unwrap();
///
/// // The center point is not part of the hull.
/// assert_eq!(hull.vertices().len(), 4);
/// assert_eq!(hull.simplices().len(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct ConvexHull<V: Vertex> {
    vertices: Vec<V>,
    simplices: Vec<Simplex<V, V::Vector>>,
    centroid: V::Vector,
}

impl<V: Vertex> ConvexHull<V> {
    /// Attempts to compute the [`ConvexHull`] of the given vertices.
    ///
    /// With [`HullOptions::assign_ids`] set, the ids of `vertices` are overwritten
    /// with their positions in the slice. Fewer than `DIM + 1` vertices produce
    /// an empty hull.
    ///
    /// # Errors
    ///
    /// Returns a [`HullError`] if the input is invalid or degenerate, or if the
    /// face graph is found to be corrupted during construction.
    pub fn try_from_vertices(vertices: &mut [V], options: HullOptions) -> Result<Self, HullError> {
        HullBuilder::new(options).generate(vertices)
    }

    fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            simplices: Vec::new(),
            centroid: V::Vector::ZERO,
        }
    }

    /// Returns the vertices of the hull, in insertion order.
    #[inline]
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    /// Returns the faces of the hull.
    #[inline]
    pub fn simplices(&self) -> &[Simplex<V, V::Vector>] {
        &self.simplices
    }

    /// Returns the mean of the points inserted during construction, an interior point.
    #[inline]
    pub fn centroid(&self) -> V::Vector {
        self.centroid
    }

    /// Returns `true` if the hull has no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.simplices.is_empty()
    }

    /// Returns `true` if `vertex` lies inside of every face plane, up to
    /// [`PLANE_DISTANCE_TOLERANCE`]. An empty hull contains nothing.
    ///
    /// This is a linear scan over the faces.
    pub fn contains(&self, vertex: &V) -> bool {
        let position = vertex.position();
        !self.simplices.is_empty()
            && self
                .simplices
                .iter()
                .all(|s| s.signed_distance(position) < PLANE_DISTANCE_TOLERANCE)
    }

    /// Computes the content of the hull: area in 2D, volume in 3D, hypervolume in 4D.
    pub fn volume(&self) -> f64 {
        let dim = V::Vector::DIM;
        let factorial: f64 = (1..=dim).map(|k| k as f64).product();
        let mut columns = [V::Vector::ZERO; face::MAX_DIM];

        let sum: f64 = self
            .simplices
            .iter()
            .map(|simplex| {
                // Content of the simplex spanned by the face and the centroid.
                for (column, vertex) in columns.iter_mut().zip(simplex.vertices()) {
                    *column = vertex.position() - self.centroid;
                }
                V::Vector::determinant(&columns[..dim]).abs()
            })
            .sum();

        sum / factorial
    }

    /// Computes the hull vertex that is furthest in the given direction.
    ///
    /// Returns `None` for an empty hull.
    pub fn support_point(&self, direction: V::Vector) -> Option<&V> {
        let mut best = None;
        let mut max = f64::NEG_INFINITY;

        for vertex in &self.vertices {
            let dot_product = vertex.position().dot(direction);
            if dot_product > max {
                max = dot_product;
                best = Some(vertex);
            }
        }

        best
    }
}

/// A cone face that is built but not yet linked into the hull.
#[derive(Clone, Copy, Debug)]
struct DeferredFace {
    face: FaceId,
    /// The horizon neighbor, which stays in the hull.
    pivot: FaceId,
    /// The slot of `pivot` that pointed at `old_face`.
    pivot_index: usize,
    /// The visible face that `face` replaces along the horizon ridge.
    old_face: FaceId,
    /// The slot of `face` opposite to the inserted point, which faces `pivot`.
    face_index: usize,
}

/// A reusable convex hull builder.
///
/// The builder owns the working memory of a construction: the face arena, the
/// free lists, the priority queue and the connector table. It is reset at the
/// start of every [`generate`](Self::generate) call, so reusing one builder
/// for many hulls of the same dimension avoids most allocations.
#[derive(Clone, Debug)]
pub struct HullBuilder<N: Vector> {
    options: HullOptions,
    positions: Vec<N>,
    ids: Vec<usize>,
    faces: Vec<HullFace<N>>,
    pool: ObjectPool,
    queue: FaceQueue,
    connectors: ConnectorTable,
    cone: Vec<DeferredFace>,
    affected: Vec<FaceId>,
    traversal_stack: Vec<FaceId>,
    /// Finalized faces with the generation they were finalized in.
    convex: Vec<(FaceId, u32)>,
    singular: FixedHashSet<PointId>,
    /// Scratch marks, one per point. All `false` between uses.
    beyond_marks: Vec<bool>,
    inserted: Vec<PointId>,
    center: N,
    center_count: usize,
    stamp: u32,
}

impl<N: Vector> Default for HullBuilder<N> {
    fn default() -> Self {
        Self::new(HullOptions::default())
    }
}

impl<N: Vector> HullBuilder<N> {
    /// Creates a builder with the given options.
    pub fn new(options: HullOptions) -> Self {
        Self {
            options,
            positions: Vec::new(),
            ids: Vec::new(),
            faces: Vec::new(),
            pool: ObjectPool::default(),
            queue: FaceQueue::default(),
            connectors: ConnectorTable::default(),
            cone: Vec::new(),
            affected: Vec::new(),
            traversal_stack: Vec::new(),
            convex: Vec::new(),
            singular: FixedHashSet::default(),
            beyond_marks: Vec::new(),
            inserted: Vec::new(),
            center: N::ZERO,
            center_count: 0,
            stamp: 0,
        }
    }

    /// Returns the options of the builder.
    #[inline]
    pub fn options(&self) -> HullOptions {
        self.options
    }

    /// Computes the convex hull of `input`.
    ///
    /// See [`ConvexHull::try_from_vertices`].
    ///
    /// # Errors
    ///
    /// Returns a [`HullError`] if the input is invalid or degenerate, or if the
    /// face graph is found to be corrupted during construction.
    #[tracing::instrument(level = "debug", skip_all, fields(dim = N::DIM, vertices = input.len()))]
    pub fn generate<V>(&mut self, input: &mut [V]) -> Result<ConvexHull<V>, HullError>
    where
        V: Vertex<Vector = N>,
    {
        if self.options.assign_ids {
            for (id, vertex) in input.iter_mut().enumerate() {
                vertex.set_id(id);
            }
        }
        if self.options.check_input {
            validate_input(input)?;
        }
        if input.len() < N::DIM + 1 {
            debug!("too few vertices, the hull is empty");
            return Ok(ConvexHull::empty());
        }

        self.reset(input);
        self.create_initial_simplex()?;
        self.process_faces()?;
        let hull = self.finalize(input);
        debug_assert_eq!(validate_manifold(&hull.simplices), Ok(()));

        debug!(
            faces = hull.simplices.len(),
            hull_vertices = hull.vertices.len(),
            singular_vertices = self.singular.len(),
            "convex hull generated"
        );

        Ok(hull)
    }

    /// Clears the working context and loads the positions and ids of `input`.
    fn reset<V: Vertex<Vector = N>>(&mut self, input: &[V]) {
        for face in self.faces.drain(..) {
            self.pool.release_beyond(face.beyond);
        }
        self.pool.clear_faces();
        self.queue.clear();
        self.connectors.clear();
        self.cone.clear();
        self.affected.clear();
        self.traversal_stack.clear();
        self.convex.clear();
        self.singular.clear();
        self.inserted.clear();
        self.center = N::ZERO;
        self.center_count = 0;
        self.stamp = 0;

        self.positions.clear();
        self.positions.extend(input.iter().map(Vertex::position));
        self.ids.clear();
        self.ids.extend(input.iter().map(Vertex::id));
        self.beyond_marks.clear();
        self.beyond_marks.resize(input.len(), false);
    }

    /// The main loop: inserts beyond points until no unprocessed face remains.
    fn process_faces(&mut self) -> Result<(), HullError> {
        loop {
            let faces = &self.faces;
            let next = self.queue.pop(|id, generation| {
                let face = &faces[id.index()];
                face.state == FaceState::Unprocessed && face.generation == generation
            });
            let Some(face_id) = next else {
                break;
            };

            let eye = self.faces[face_id.index()]
                .beyond
                .furthest()
                .ok_or(HullError::InternalError(
                    "Unprocessed face has no beyond points.",
                ))?;

            let previous_center = (self.center, self.center_count);
            self.update_center(eye);
            self.tag_affected_faces(face_id, eye)?;

            if !self.singular.contains(&eye) && self.create_cone(eye)? {
                self.commit_cone(eye)?;
                self.inserted.push(eye);
            } else {
                (self.center, self.center_count) = previous_center;
                self.handle_singular(eye);
            }
        }

        Ok(())
    }

    /// Adds `point` to the running mean of the inserted points.
    fn update_center(&mut self, point: PointId) {
        self.center_count += 1;
        let position = self.positions[point.index()];
        self.center += (position - self.center) / self.center_count as f64;
    }

    /// Collects the faces visible from `eye` into `affected`, starting from `start`.
    fn tag_affected_faces(&mut self, start: FaceId, eye: PointId) -> Result<(), HullError> {
        self.stamp = self.stamp.wrapping_add(1);
        let stamp = self.stamp;
        let eye_position = self.positions[eye.index()];

        self.affected.clear();
        self.traversal_stack.clear();
        self.faces[start.index()].tag = stamp;
        self.affected.push(start);
        self.traversal_stack.push(start);

        while let Some(id) = self.traversal_stack.pop() {
            for slot in 0..N::DIM {
                let neighbor = self.faces[id.index()].adjacent[slot];
                let face = self
                    .faces
                    .get_mut(neighbor.index())
                    .filter(|face| face.state != FaceState::Free)
                    .ok_or(HullError::InternalError(
                        "Missing adjacency during horizon traversal.",
                    ))?;

                if face.tag != stamp && face.distance(eye_position) >= PLANE_DISTANCE_TOLERANCE {
                    face.tag = stamp;
                    self.affected.push(neighbor);
                    self.traversal_stack.push(neighbor);
                }
            }
        }

        Ok(())
    }

    /// Builds one new face per horizon ridge, joining it to `eye`.
    ///
    /// Returns `false`, with every new face released again, if one of them is degenerate.
    fn create_cone(&mut self, eye: PointId) -> Result<bool, HullError> {
        self.cone.clear();

        for i in 0..self.affected.len() {
            let old_face = self.affected[i];
            for slot in 0..N::DIM {
                let pivot = self.faces[old_face.index()].adjacent[slot];
                if self.faces[pivot.index()].tag == self.stamp {
                    continue;
                }

                let Some(pivot_index) = self.faces[pivot.index()].neighbor_slot(old_face) else {
                    self.release_cone();
                    return Err(HullError::InternalError(
                        "Horizon neighbor does not link back to the visible face.",
                    ));
                };

                let face = self.pool.acquire_face(&mut self.faces);
                let vertices = self.faces[old_face.index()].vertices;
                let new_face = &mut self.faces[face.index()];
                new_face.state = FaceState::Pending;
                new_face.vertices = vertices;
                let face_index = new_face.replace_vertex(slot, eye, &self.ids);

                self.cone.push(DeferredFace {
                    face,
                    pivot,
                    pivot_index,
                    old_face,
                    face_index,
                });

                if !new_face.calculate_plane(&self.positions, self.center) {
                    self.release_cone();
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }

    /// Releases the faces of an abandoned cone.
    fn release_cone(&mut self) {
        for deferred in self.cone.drain(..) {
            self.pool.release_face(&mut self.faces, deferred.face);
        }
    }

    /// Links the cone into the hull and replaces the visible faces with it.
    fn commit_cone(&mut self, eye: PointId) -> Result<(), HullError> {
        for i in 0..self.cone.len() {
            let deferred = self.cone[i];
            let face = deferred.face;

            self.faces[face.index()].adjacent[deferred.face_index] = deferred.pivot;
            self.faces[deferred.pivot.index()].adjacent[deferred.pivot_index] = face;

            for edge in 0..N::DIM {
                if edge == deferred.face_index {
                    continue;
                }

                let key = ConnectorTable::key(self.faces[face.index()].vertices(), edge);
                if let Some(partner) = self.connectors.connect(key, Connector { face, edge }) {
                    self.faces[face.index()].adjacent[edge] = partner.face;
                    self.faces[partner.face.index()].adjacent[partner.edge] = face;
                }
            }

            self.find_beyond_points(face, deferred.old_face, deferred.pivot, eye);
            self.enqueue_or_finalize(face);
        }
        self.cone.clear();

        if !self.connectors.is_empty() {
            self.connectors.clear();
            return Err(HullError::InternalError(
                "Cone face was left without a partner.",
            ));
        }

        for i in 0..self.affected.len() {
            self.pool.release_face(&mut self.faces, self.affected[i]);
        }

        Ok(())
    }

    /// Fills the beyond set of `face` from the beyond sets of the two faces it borders.
    fn find_beyond_points(&mut self, face: FaceId, old_face: FaceId, pivot: FaceId, eye: PointId) {
        let mut beyond = self.pool.acquire_beyond();

        let (first, second) = {
            let old_len = self.faces[old_face.index()].beyond.len();
            let pivot_len = self.faces[pivot.index()].beyond.len();
            if pivot_len < old_len {
                (pivot, old_face)
            } else {
                (old_face, pivot)
            }
        };

        let new_face = &self.faces[face.index()];
        for source in [first, second] {
            for point in self.faces[source.index()].beyond.iter() {
                if point == eye || self.beyond_marks[point.index()] {
                    continue;
                }
                self.beyond_marks[point.index()] = true;

                let distance = new_face.distance(self.positions[point.index()]);
                if distance >= PLANE_DISTANCE_TOLERANCE {
                    beyond.add(point, distance);
                }
            }
        }

        for source in [first, second] {
            for point in self.faces[source.index()].beyond.iter() {
                self.beyond_marks[point.index()] = false;
            }
        }

        self.faces[face.index()].beyond = beyond;
    }

    /// Queues the face if anything lies beyond it, and finalizes it otherwise.
    fn enqueue_or_finalize(&mut self, id: FaceId) {
        let face = &mut self.faces[id.index()];

        if face.beyond.is_empty() {
            face.state = FaceState::Convex;
            let beyond = mem::take(&mut face.beyond);
            self.convex.push((id, face.generation));
            self.pool.release_beyond(beyond);
        } else {
            face.state = FaceState::Unprocessed;
            self.queue.push(id, face.generation, face.beyond.len());
        }
    }

    /// Accepts the faces visible from `eye` as final, marking `eye` and
    /// everything beyond those faces as singular.
    fn handle_singular(&mut self, eye: PointId) {
        trace!(vertex = self.ids[eye.index()], "singular vertex");
        self.singular.insert(eye);

        for i in 0..self.affected.len() {
            let id = self.affected[i];
            let face = &mut self.faces[id.index()];
            let beyond = mem::take(&mut face.beyond);
            self.singular.extend(beyond.iter());

            if face.state != FaceState::Convex {
                face.state = FaceState::Convex;
                self.convex.push((id, face.generation));
            }
            self.pool.release_beyond(beyond);
        }
    }

    /// Builds the output hull from the final faces.
    fn finalize<V: Vertex<Vector = N>>(&mut self, input: &[V]) -> ConvexHull<V> {
        let mut index_of = vec![usize::MAX; self.faces.len()];
        let mut final_faces = Vec::with_capacity(self.convex.len());

        for &(id, generation) in &self.convex {
            let face = &self.faces[id.index()];
            if face.state == FaceState::Convex
                && face.generation == generation
                && index_of[id.index()] == usize::MAX
            {
                index_of[id.index()] = final_faces.len();
                final_faces.push(id);
            }
        }

        for &id in &final_faces {
            for point in self.faces[id.index()].vertices() {
                self.beyond_marks[point.index()] = true;
            }
        }
        let vertices = self
            .inserted
            .iter()
            .filter(|p| self.beyond_marks[p.index()])
            .map(|p| input[p.index()].clone())
            .collect();
        self.beyond_marks.fill(false);

        let simplices = final_faces
            .iter()
            .map(|&id| {
                let face = &self.faces[id.index()];
                let vertices: Vec<V> = face
                    .vertices()
                    .iter()
                    .map(|p| input[p.index()].clone())
                    .collect();
                let adjacent = face
                    .adjacent()
                    .iter()
                    .map(|a| index_of.get(a.index()).copied().filter(|&i| i != usize::MAX))
                    .collect();

                Simplex {
                    centroid: vertex_centroid(&vertices),
                    vertices,
                    adjacent,
                    normal: face.normal,
                    offset: face.offset,
                    normal_flipped: face.normal_flipped,
                }
            })
            .collect();

        ConvexHull {
            vertices,
            simplices,
            centroid: self.center,
        }
    }
}
