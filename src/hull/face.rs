use crate::{hull::beyond::BeyondBuffer, vector::Vector};

/// The largest supported dimension.
pub(crate) const MAX_DIM: usize = 4;

/// The index of a point in the builder's position buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct PointId(pub u32);

impl PointId {
    /// A placeholder `PointId` that does not correspond to any valid point.
    pub const PLACEHOLDER: PointId = PointId(u32::MAX);

    /// Returns the underlying index of the point as a `usize`.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for PointId {
    #[inline]
    fn from(value: usize) -> Self {
        PointId(value as u32)
    }
}

/// The index of a [`HullFace`] in the builder's face arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FaceId(pub u32);

impl FaceId {
    /// A placeholder `FaceId` that does not correspond to any valid face.
    pub const PLACEHOLDER: FaceId = FaceId(u32::MAX);

    /// Returns the underlying index of the face as a `usize`.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a face is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FaceState {
    /// In the pool, waiting to be reused.
    Free,
    /// Created, but not yet linked into the hull.
    Pending,
    /// Part of the hull, with a non-empty beyond set.
    Unprocessed,
    /// Part of the final hull.
    Convex,
}

/// A face of the hull under construction.
///
/// Only the first `N::DIM` entries of `vertices` and `adjacent` are meaningful.
#[derive(Clone, Debug)]
pub(crate) struct HullFace<N> {
    pub(crate) state: FaceState,
    /// Bumped on every release, so that stale queue and list entries can be told apart.
    pub(crate) generation: u32,
    /// The points of the face, sorted by vertex id.
    pub(crate) vertices: [PointId; MAX_DIM],
    /// `adjacent[i]` shares every vertex of the face except `vertices[i]`.
    pub(crate) adjacent: [FaceId; MAX_DIM],
    pub(crate) normal: N,
    pub(crate) offset: f64,
    pub(crate) normal_flipped: bool,
    /// The points strictly outside of the face plane.
    pub(crate) beyond: BeyondBuffer,
    /// The traversal stamp of the last step that visited the face.
    pub(crate) tag: u32,
}

impl<N: Vector> HullFace<N> {
    /// Creates an unlinked face with placeholder vertices.
    pub fn new() -> Self {
        Self {
            state: FaceState::Free,
            generation: 0,
            vertices: [PointId::PLACEHOLDER; MAX_DIM],
            adjacent: [FaceId::PLACEHOLDER; MAX_DIM],
            normal: N::ZERO,
            offset: 0.0,
            normal_flipped: false,
            beyond: BeyondBuffer::default(),
            tag: 0,
        }
    }

    /// Returns the points of the face.
    #[inline]
    pub fn vertices(&self) -> &[PointId] {
        &self.vertices[..N::DIM]
    }

    /// Returns the neighbors of the face.
    #[inline]
    pub fn adjacent(&self) -> &[FaceId] {
        &self.adjacent[..N::DIM]
    }

    /// Returns the signed distance of `point` to the face plane.
    #[inline]
    pub fn distance(&self, point: N) -> f64 {
        self.normal.dot(point) + self.offset
    }

    /// Returns the adjacency slot that holds `face`, if any.
    #[inline]
    pub fn neighbor_slot(&self, face: FaceId) -> Option<usize> {
        self.adjacent().iter().position(|&f| f == face)
    }

    /// Computes the plane of the face, oriented so that `center` lies on the inner side.
    ///
    /// Returns `false` if the vertices are affinely dependent.
    pub fn calculate_plane(&mut self, positions: &[N], center: N) -> bool {
        let mut points = [N::ZERO; MAX_DIM];
        for (point, id) in points.iter_mut().zip(self.vertices()) {
            *point = positions[id.index()];
        }

        let Some(normal) = N::hyperplane_normal(&points[..N::DIM]) else {
            return false;
        };

        self.normal = normal;
        self.offset = -normal.dot(points[0]);
        self.normal_flipped = false;

        if self.distance(center) >= 0.0 {
            self.normal = -self.normal;
            self.offset = -self.offset;
            self.normal_flipped = true;
        }

        true
    }

    /// Replaces the vertex at `slot` with `point` and restores the id order.
    ///
    /// Returns the slot that `point` ends up in.
    pub fn replace_vertex(&mut self, slot: usize, point: PointId, ids: &[usize]) -> usize {
        let vertices = &mut self.vertices[..N::DIM];
        let id = ids[point.index()];
        vertices[slot] = point;

        let mut i = slot;
        while i > 0 && ids[vertices[i - 1].index()] > id {
            vertices.swap(i - 1, i);
            i -= 1;
        }
        while i + 1 < vertices.len() && ids[vertices[i + 1].index()] < id {
            vertices.swap(i, i + 1);
            i += 1;
        }

        i
    }

    /// Resets the face for reuse. The beyond buffer must have been taken out beforehand.
    pub fn clear(&mut self) {
        debug_assert!(self.beyond.is_empty());
        self.state = FaceState::Free;
        self.generation = self.generation.wrapping_add(1);
        self.vertices = [PointId::PLACEHOLDER; MAX_DIM];
        self.adjacent = [FaceId::PLACEHOLDER; MAX_DIM];
        self.normal = N::ZERO;
        self.offset = 0.0;
        self.normal_flipped = false;
        self.tag = 0;
    }
}
