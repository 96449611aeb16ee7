//! Closed-form circumcircles and circumspheres.
//!
//! For points `p_i` with squared magnitudes `s_i`, the classical determinant
//! construction gives the center as `(D_x, D_y, ..) / 2a`, where
//!
//! ```text
//!     | x_i  y_i  1 |          | s_i  y_i  1 |           | s_i  x_i  1 |
//! a = | ...         |,  D_x =  | ...         |,  D_y = - | ...         |
//! ```
//!
//! in 2D, and likewise with an extra column and alternating signs in 3D.
//! The points are translated so that the first one is at the origin before
//! the determinants are evaluated, which keeps the magnitudes small.

use glam::{DMat3, DMat4, DVec2, DVec3, DVec4};

/// Computes the center and radius of the circle through three points.
///
/// Collinear points produce a non-finite center and radius.
pub fn circumcircle(points: [DVec2; 3]) -> (DVec2, f64) {
    let origin = points[0];
    let [p0, p1, p2] = points.map(|p| p - origin);
    let [s0, s1, s2] = [p0, p1, p2].map(DVec2::length_squared);

    let a = DMat3::from_cols(
        DVec3::new(p0.x, p0.y, 1.0),
        DVec3::new(p1.x, p1.y, 1.0),
        DVec3::new(p2.x, p2.y, 1.0),
    )
    .determinant();
    let dx = DMat3::from_cols(
        DVec3::new(s0, p0.y, 1.0),
        DVec3::new(s1, p1.y, 1.0),
        DVec3::new(s2, p2.y, 1.0),
    )
    .determinant();
    let dy = -DMat3::from_cols(
        DVec3::new(s0, p0.x, 1.0),
        DVec3::new(s1, p1.x, 1.0),
        DVec3::new(s2, p2.x, 1.0),
    )
    .determinant();

    let offset = DVec2::new(dx, dy) / (2.0 * a);
    (origin + offset, offset.length())
}

/// Computes the center and radius of the sphere through four points.
///
/// Coplanar points produce a non-finite center and radius.
pub fn circumsphere(points: [DVec3; 4]) -> (DVec3, f64) {
    let origin = points[0];
    let p = points.map(|p| p - origin);
    let s = p.map(DVec3::length_squared);

    let matrix = |column: fn(DVec3, f64) -> DVec4| {
        DMat4::from_cols(
            column(p[0], s[0]),
            column(p[1], s[1]),
            column(p[2], s[2]),
            column(p[3], s[3]),
        )
        .determinant()
    };

    let a = matrix(|p, _| DVec4::new(p.x, p.y, p.z, 1.0));
    let dx = matrix(|p, s| DVec4::new(s, p.y, p.z, 1.0));
    let dy = -matrix(|p, s| DVec4::new(s, p.x, p.z, 1.0));
    let dz = matrix(|p, s| DVec4::new(s, p.x, p.y, 1.0));

    let offset = DVec3::new(dx, dy, dz) / (2.0 * a);
    (origin + offset, offset.length())
}
