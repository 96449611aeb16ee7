use hashbrown::hash_map::Entry;

use crate::{
    fixed_hasher::FixedHashMap,
    hull::face::{FaceId, PointId, MAX_DIM},
};

/// The sorted points of a ridge, padded with [`PointId::PLACEHOLDER`].
pub(crate) type RidgeKey = [PointId; MAX_DIM - 1];

/// A cone face waiting for the sibling that shares one of its ridges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Connector {
    pub face: FaceId,
    /// The adjacency slot of `face` opposite to the ridge.
    pub edge: usize,
}

/// Pairs up the faces of a cone through their shared ridges.
///
/// Only lives for a single vertex insertion.
#[derive(Clone, Debug, Default)]
pub(crate) struct ConnectorTable {
    pending: FixedHashMap<RidgeKey, Connector>,
}

impl ConnectorTable {
    /// Builds the key of the ridge of `vertices` that excludes `vertices[edge]`.
    pub fn key(vertices: &[PointId], edge: usize) -> RidgeKey {
        let mut key = [PointId::PLACEHOLDER; MAX_DIM - 1];
        let ridge = vertices
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != edge)
            .map(|(_, &p)| p);
        for (slot, point) in key.iter_mut().zip(ridge) {
            *slot = point;
        }
        key
    }

    /// Registers `connector` under `key`.
    ///
    /// If a connector with the same key is already waiting, it is removed and
    /// returned as the partner instead.
    pub fn connect(&mut self, key: RidgeKey, connector: Connector) -> Option<Connector> {
        match self.pending.entry(key) {
            Entry::Occupied(entry) => Some(entry.remove()),
            Entry::Vacant(entry) => {
                entry.insert(connector);
                None
            }
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ridge_keys() {
        let vertices = [PointId(2), PointId(5), PointId(9)];
        assert_eq!(
            ConnectorTable::key(&vertices, 1),
            [PointId(2), PointId(9), PointId::PLACEHOLDER]
        );
        assert_eq!(
            ConnectorTable::key(&vertices[..2], 0),
            [PointId(5), PointId::PLACEHOLDER, PointId::PLACEHOLDER]
        );
    }

    #[test]
    fn pairs_matching_ridges() {
        let mut table = ConnectorTable::default();
        let a = Connector {
            face: FaceId(0),
            edge: 2,
        };
        let b = Connector {
            face: FaceId(1),
            edge: 0,
        };
        let key = ConnectorTable::key(&[PointId(1), PointId(4), PointId(6)], 2);

        assert_eq!(table.connect(key, a), None);
        assert!(!table.is_empty());
        assert_eq!(table.connect(key, b), Some(a));
        assert!(table.is_empty());
    }
}
