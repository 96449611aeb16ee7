use core::mem;

use crate::{
    hull::{
        beyond::BeyondBuffer,
        face::{FaceId, FaceState, HullFace},
    },
    vector::Vector,
};

/// Free lists for faces and beyond buffers.
///
/// Faces live in the builder's arena and are recycled by id. Released faces
/// are cleared before they go back on the free list.
#[derive(Clone, Debug, Default)]
pub(crate) struct ObjectPool {
    free_faces: Vec<FaceId>,
    beyond_buffers: Vec<BeyondBuffer>,
}

impl ObjectPool {
    /// Returns an unused face id, growing the arena if the free list is empty.
    pub fn acquire_face<N: Vector>(&mut self, faces: &mut Vec<HullFace<N>>) -> FaceId {
        if let Some(id) = self.free_faces.pop() {
            debug_assert_eq!(faces[id.index()].state, FaceState::Free);
            return id;
        }

        faces.push(HullFace::new());
        FaceId(faces.len() as u32 - 1)
    }

    /// Clears the face and puts it back on the free list.
    pub fn release_face<N: Vector>(&mut self, faces: &mut [HullFace<N>], id: FaceId) {
        let face = &mut faces[id.index()];
        let beyond = mem::take(&mut face.beyond);
        face.clear();
        self.release_beyond(beyond);
        self.free_faces.push(id);
    }

    pub fn acquire_beyond(&mut self) -> BeyondBuffer {
        self.beyond_buffers.pop().unwrap_or_default()
    }

    pub fn release_beyond(&mut self, mut buffer: BeyondBuffer) {
        if buffer.capacity() > 0 {
            buffer.clear();
            self.beyond_buffers.push(buffer);
        }
    }

    /// Forgets the free faces. Called when the arena itself is cleared.
    pub fn clear_faces(&mut self) {
        self.free_faces.clear();
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::hull::face::PointId;

    #[test]
    fn released_faces_are_reused_cleared() {
        let mut pool = ObjectPool::default();
        let mut faces: Vec<HullFace<DVec2>> = Vec::new();

        let a = pool.acquire_face(&mut faces);
        let b = pool.acquire_face(&mut faces);
        assert_eq!((a, b), (FaceId(0), FaceId(1)));

        faces[a.index()].state = FaceState::Convex;
        faces[a.index()].adjacent[0] = b;
        faces[a.index()].beyond.add(PointId(4), 1.0);
        pool.release_face(&mut faces, a);

        let c = pool.acquire_face(&mut faces);
        assert_eq!(c, a);
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[c.index()].adjacent[0], FaceId::PLACEHOLDER);
        assert_eq!(faces[c.index()].generation, 1);

        let buffer = pool.acquire_beyond();
        assert!(buffer.is_empty());
        assert!(buffer.capacity() > 0);
    }
}
