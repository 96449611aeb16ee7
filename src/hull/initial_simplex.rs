use crate::{
    hull::{
        face::{FaceId, FaceState, PointId, MAX_DIM},
        HullBuilder, HullError, PLANE_DISTANCE_TOLERANCE,
    },
    vector::Vector,
};

/// The relative distance a candidate must keep from the affine hull of the
/// points already chosen for the initial simplex.
const INITIAL_SIMPLEX_MARGIN: f64 = 1e-6;

/// Finds the points with the smallest and largest coordinate along each axis.
///
/// Ties keep the first point. A point that is extreme along several axes is listed once.
pub(crate) fn compute_extremes<N: Vector>(positions: &[N]) -> Vec<PointId> {
    let mut extremes = Vec::with_capacity(2 * N::DIM);

    for axis in 0..N::DIM {
        let mut min = (f64::INFINITY, None);
        let mut max = (f64::NEG_INFINITY, None);

        for (i, position) in positions.iter().enumerate() {
            let value = position[axis];
            if value < min.0 {
                min = (value, Some(PointId::from(i)));
            }
            if value > max.0 {
                max = (value, Some(PointId::from(i)));
            }
        }

        for point in [min.1, max.1].into_iter().flatten() {
            if !extremes.contains(&point) {
                extremes.push(point);
            }
        }
    }

    extremes
}

/// Greedily picks `DIM + 1` affinely independent points.
///
/// The first two are the pair of extremes furthest apart. Every further point
/// maximizes the sum of squared distances to the points chosen so far, among
/// the extremes if one of them qualifies, and among all points otherwise.
///
/// # Errors
///
/// Returns [`HullError::SingularInput`] if the points span fewer than `DIM` dimensions.
pub(crate) fn select_initial_points<N: Vector>(
    positions: &[N],
    extremes: &[PointId],
) -> Result<Vec<PointId>, HullError> {
    let singular = |found: usize| HullError::SingularInput {
        found,
        required: N::DIM + 1,
    };

    let mut first_pair = None;
    let mut max_distance = 0.0;
    for (i, &a) in extremes.iter().enumerate() {
        for &b in &extremes[i + 1..] {
            let distance = (positions[a.index()] - positions[b.index()]).length_squared();
            if distance > max_distance {
                max_distance = distance;
                first_pair = Some((a, b));
            }
        }
    }

    let Some((a, b)) = first_pair else {
        return Err(singular(1));
    };

    let min_residual = INITIAL_SIMPLEX_MARGIN * INITIAL_SIMPLEX_MARGIN * max_distance;
    let origin = positions[a.index()];
    let mut chosen = vec![a, b];
    let mut basis: Vec<N> = Vec::with_capacity(N::DIM);
    push_orthonormal(&mut basis, positions[b.index()] - origin);

    while chosen.len() <= N::DIM {
        let candidates = extremes.iter().copied();
        let next = best_candidate(positions, candidates, &chosen, &basis, origin, min_residual)
            .or_else(|| {
                let candidates = (0..positions.len()).map(PointId::from);
                best_candidate(positions, candidates, &chosen, &basis, origin, min_residual)
            });

        let Some(next) = next else {
            return Err(singular(chosen.len()));
        };

        push_orthonormal(&mut basis, positions[next.index()] - origin);
        chosen.push(next);
    }

    Ok(chosen)
}

/// Returns the candidate with the largest sum of squared distances to `chosen`
/// that keeps a squared distance above `min_residual` from their affine hull.
fn best_candidate<N: Vector>(
    positions: &[N],
    candidates: impl Iterator<Item = PointId>,
    chosen: &[PointId],
    basis: &[N],
    origin: N,
    min_residual: f64,
) -> Option<PointId> {
    let mut best = None;
    let mut best_sum = f64::NEG_INFINITY;

    for candidate in candidates {
        if chosen.contains(&candidate) {
            continue;
        }

        let position = positions[candidate.index()];
        if residual(basis, position - origin) <= min_residual {
            continue;
        }

        let sum: f64 = chosen
            .iter()
            .map(|p| (positions[p.index()] - position).length_squared())
            .sum();
        if sum > best_sum {
            best_sum = sum;
            best = Some(candidate);
        }
    }

    best
}

/// Removes the components of `v` along the orthonormal `basis`, returning the squared remainder.
fn residual<N: Vector>(basis: &[N], mut v: N) -> f64 {
    for &axis in basis {
        v -= axis * axis.dot(v);
    }
    v.length_squared()
}

/// Extends the orthonormal `basis` with the part of `v` it does not cover yet.
fn push_orthonormal<N: Vector>(basis: &mut Vec<N>, mut v: N) {
    for &axis in basis.iter() {
        v -= axis * axis.dot(v);
    }
    let length = v.length_squared().sqrt();
    basis.push(v / length);
}

impl<N: Vector> HullBuilder<N> {
    /// Builds the `DIM + 1` faces of the initial simplex, links them, and
    /// distributes the remaining points over their beyond sets.
    pub(super) fn create_initial_simplex(&mut self) -> Result<(), HullError> {
        let dim = N::DIM;
        let extremes = compute_extremes(&self.positions);
        let points = select_initial_points(&self.positions, &extremes)?;

        self.center = N::ZERO;
        for &point in &points {
            self.center += self.positions[point.index()];
            self.inserted.push(point);
        }
        self.center_count = points.len();
        self.center = self.center / self.center_count as f64;

        // Face `k` leaves out `points[k]`.
        let mut face_ids = [FaceId::PLACEHOLDER; MAX_DIM + 1];
        for (omit, face_id) in face_ids.iter_mut().take(dim + 1).enumerate() {
            let id = self.pool.acquire_face(&mut self.faces);
            let face = &mut self.faces[id.index()];

            let others = points
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != omit)
                .map(|(_, &p)| p);
            for (slot, point) in face.vertices.iter_mut().zip(others) {
                *slot = point;
            }
            face.vertices[..dim].sort_unstable_by_key(|p| self.ids[p.index()]);

            if !face.calculate_plane(&self.positions, self.center) {
                return Err(HullError::SingularInput {
                    found: dim,
                    required: dim + 1,
                });
            }

            face.state = FaceState::Pending;
            *face_id = id;
        }

        // The neighbor opposite `points[j]` is the face that leaves it out.
        for omit in 0..=dim {
            let face = &mut self.faces[face_ids[omit].index()];
            for (j, &point) in points.iter().enumerate() {
                if j == omit {
                    continue;
                }
                let slot = face
                    .vertices()
                    .iter()
                    .position(|&p| p == point)
                    .ok_or(HullError::InternalError(
                        "Initial face is missing a simplex vertex.",
                    ))?;
                face.adjacent[slot] = face_ids[j];
            }
        }

        for &point in &points {
            self.beyond_marks[point.index()] = true;
        }

        for &id in &face_ids[..=dim] {
            let mut beyond = self.pool.acquire_beyond();
            let face = &self.faces[id.index()];

            for (i, &position) in self.positions.iter().enumerate() {
                if self.beyond_marks[i] {
                    continue;
                }
                let distance = face.distance(position);
                if distance >= PLANE_DISTANCE_TOLERANCE {
                    beyond.add(PointId::from(i), distance);
                }
            }

            self.faces[id.index()].beyond = beyond;
            self.enqueue_or_finalize(id);
        }

        for &point in &points {
            self.beyond_marks[point.index()] = false;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::{dvec2, dvec3, DVec3};

    use super::*;

    #[test]
    fn extremes_are_deduplicated() {
        let points = [
            dvec2(0.0, 0.0),
            dvec2(2.0, 0.0),
            dvec2(2.0, 3.0),
            dvec2(1.0, 1.0),
        ];
        assert_eq!(
            compute_extremes(&points),
            vec![PointId(0), PointId(1), PointId(2)]
        );
    }

    #[test]
    fn initial_points_span_space() {
        let points = [
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(2.0, 0.0, 0.0),
            dvec3(0.5, 0.1, 0.0),
            dvec3(0.5, 0.5, 3.0),
            dvec3(0.5, 2.0, 0.0),
        ];
        let extremes = compute_extremes(&points);
        let mut chosen = select_initial_points(&points, &extremes).unwrap();
        chosen.sort();
        assert_eq!(chosen, vec![PointId(0), PointId(2), PointId(4), PointId(5)]);
    }

    #[test]
    fn collinear_points_are_singular() {
        let points: Vec<DVec3> = (0..6).map(|i| DVec3::splat(i as f64)).collect();
        let extremes = compute_extremes(&points);
        assert_eq!(
            select_initial_points(&points, &extremes),
            Err(HullError::SingularInput {
                found: 2,
                required: 4
            })
        );
    }

    #[test]
    fn coincident_points_are_singular() {
        let points = vec![dvec2(1.0, 1.0); 5];
        let extremes = compute_extremes(&points);
        assert_eq!(
            select_initial_points(&points, &extremes),
            Err(HullError::SingularInput {
                found: 1,
                required: 3
            })
        );
    }
}
