use crate::hull::face::PointId;

/// The points lying outside of a face plane, along with the furthest of them.
#[derive(Clone, Debug, Default)]
pub(crate) struct BeyondBuffer {
    points: Vec<PointId>,
    /// The identifier and distance of the furthest point, if any.
    furthest: Option<(PointId, f64)>,
}

impl BeyondBuffer {
    /// Adds a point at the given distance from the face plane.
    ///
    /// Ties keep the point that was added first.
    #[inline]
    pub fn add(&mut self, point: PointId, distance: f64) {
        if self.furthest.is_none_or(|(_, d)| distance > d) {
            self.furthest = Some((point, distance));
        }

        self.points.push(point);
    }

    /// Returns the point furthest from the face plane.
    #[inline]
    pub fn furthest(&self) -> Option<PointId> {
        self.furthest.map(|(point, _)| point)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = PointId> + '_ {
        self.points.iter().copied()
    }

    /// Removes every point, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.points.clear();
        self.furthest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_furthest_point() {
        let mut buffer = BeyondBuffer::default();
        assert_eq!(buffer.furthest(), None);

        buffer.add(PointId(3), 0.5);
        buffer.add(PointId(7), 2.0);
        buffer.add(PointId(1), 2.0);
        buffer.add(PointId(4), 1.0);

        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.furthest(), Some(PointId(7)));
        assert_eq!(
            buffer.iter().collect::<Vec<_>>(),
            vec![PointId(3), PointId(7), PointId(1), PointId(4)]
        );

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.furthest(), None);
        assert!(buffer.capacity() >= 4);
    }
}
