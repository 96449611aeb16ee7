//! Fixed-dimension vector abstraction over glam's double precision vectors.
//!
//! The hull builder is written once against [`Vector`] and instantiated for
//! [`DVec2`], [`DVec3`] and [`DVec4`]. Only the hyperplane normal and the
//! determinant are specialized per dimension.

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub, SubAssign};

use approx::relative_eq;
use glam::{DMat2, DMat3, DMat4, DVec2, DVec3, DVec4};

use crate::delaunay::circumsphere;

/// Squared length below which a scaled hyperplane normal is treated as zero.
const DEGENERATE_NORMAL_EPSILON_SQ: f64 = (f64::EPSILON * 100.0) * (f64::EPSILON * 100.0);

/// A position or direction in 2, 3 or 4 dimensional space.
pub trait Vector:
    Copy
    + Debug
    + Default
    + PartialEq
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + SubAssign
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
    + Neg<Output = Self>
    + Index<usize, Output = f64>
    + IndexMut<usize>
    + 'static
{
    /// The number of components.
    const DIM: usize;

    /// The zero vector.
    const ZERO: Self;

    /// Computes the dot product of `self` and `rhs`.
    fn dot(self, rhs: Self) -> f64;

    /// Computes the squared length of `self`.
    #[inline]
    fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Returns `true` if every component is neither NaN nor infinite.
    fn is_finite(self) -> bool;

    /// Computes the unit normal of the hyperplane spanned by `DIM` points.
    ///
    /// The orientation follows the order of `points`. Returns `None` if the points
    /// are affinely dependent, so that the normal is undefined.
    fn hyperplane_normal(points: &[Self]) -> Option<Self>;

    /// Computes the determinant of the square matrix with the given `DIM` columns.
    fn determinant(columns: &[Self]) -> f64;
}

/// A vector that can be lifted onto the paraboloid one dimension up.
///
/// This is what makes a Delaunay triangulation computable from a convex hull.
pub trait Lift: Vector {
    /// The vector type one dimension up.
    type Lifted: Vector;

    /// Appends `height` as the last component.
    fn lift(self, height: f64) -> Self::Lifted;

    /// Drops the last component.
    fn unlift(lifted: Self::Lifted) -> Self;

    /// Computes the center and radius of the sphere through `DIM + 1` points.
    ///
    /// Affinely dependent points produce non-finite values.
    fn circumsphere(points: &[Self]) -> (Self, f64);
}

/// Normalizes a scaled normal, rejecting (nearly) zero and non-finite ones.
#[inline]
fn unit_normal<N: Vector>(scaled_normal: N) -> Option<N> {
    let length_squared = scaled_normal.length_squared();

    if !length_squared.is_finite()
        || relative_eq!(length_squared, 0.0, epsilon = DEGENERATE_NORMAL_EPSILON_SQ)
    {
        return None;
    }

    Some(scaled_normal / length_squared.sqrt())
}

impl Vector for DVec2 {
    const DIM: usize = 2;
    const ZERO: Self = DVec2::ZERO;

    #[inline]
    fn dot(self, rhs: Self) -> f64 {
        DVec2::dot(self, rhs)
    }

    #[inline]
    fn is_finite(self) -> bool {
        DVec2::is_finite(self)
    }

    #[inline]
    fn hyperplane_normal(points: &[Self]) -> Option<Self> {
        debug_assert_eq!(points.len(), 2);
        unit_normal((points[1] - points[0]).perp())
    }

    #[inline]
    fn determinant(columns: &[Self]) -> f64 {
        DMat2::from_cols(columns[0], columns[1]).determinant()
    }
}

impl Vector for DVec3 {
    const DIM: usize = 3;
    const ZERO: Self = DVec3::ZERO;

    #[inline]
    fn dot(self, rhs: Self) -> f64 {
        DVec3::dot(self, rhs)
    }

    #[inline]
    fn is_finite(self) -> bool {
        DVec3::is_finite(self)
    }

    #[inline]
    fn hyperplane_normal(points: &[Self]) -> Option<Self> {
        debug_assert_eq!(points.len(), 3);
        let x = points[1] - points[0];
        let y = points[2] - points[1];
        unit_normal(x.cross(y))
    }

    #[inline]
    fn determinant(columns: &[Self]) -> f64 {
        DMat3::from_cols(columns[0], columns[1], columns[2]).determinant()
    }
}

impl Vector for DVec4 {
    const DIM: usize = 4;
    const ZERO: Self = DVec4::ZERO;

    #[inline]
    fn dot(self, rhs: Self) -> f64 {
        DVec4::dot(self, rhs)
    }

    #[inline]
    fn is_finite(self) -> bool {
        DVec4::is_finite(self)
    }

    fn hyperplane_normal(points: &[Self]) -> Option<Self> {
        debug_assert_eq!(points.len(), 4);
        let x = points[1] - points[0];
        let y = points[2] - points[1];
        let z = points[3] - points[2];

        // Generalized cross product of the three edge vectors.
        let nx = x.w * (y.z * z.y - y.y * z.z)
            + x.z * (y.y * z.w - y.w * z.y)
            + x.y * (y.w * z.z - y.z * z.w);
        let ny = x.w * (y.x * z.z - y.z * z.x)
            + x.z * (y.w * z.x - y.x * z.w)
            + x.x * (y.z * z.w - y.w * z.z);
        let nz = x.w * (y.y * z.x - y.x * z.y)
            + x.y * (y.x * z.w - y.w * z.x)
            + x.x * (y.w * z.y - y.y * z.w);
        let nw = x.z * (y.x * z.y - y.y * z.x)
            + x.y * (y.z * z.x - y.x * z.z)
            + x.x * (y.y * z.z - y.z * z.y);

        unit_normal(DVec4::new(nx, ny, nz, nw))
    }

    #[inline]
    fn determinant(columns: &[Self]) -> f64 {
        DMat4::from_cols(columns[0], columns[1], columns[2], columns[3]).determinant()
    }
}

impl Lift for DVec2 {
    type Lifted = DVec3;

    #[inline]
    fn lift(self, height: f64) -> DVec3 {
        self.extend(height)
    }

    #[inline]
    fn unlift(lifted: DVec3) -> Self {
        lifted.truncate()
    }

    #[inline]
    fn circumsphere(points: &[Self]) -> (Self, f64) {
        circumsphere::circumcircle([points[0], points[1], points[2]])
    }
}

impl Lift for DVec3 {
    type Lifted = DVec4;

    #[inline]
    fn lift(self, height: f64) -> DVec4 {
        self.extend(height)
    }

    #[inline]
    fn unlift(lifted: DVec4) -> Self {
        lifted.truncate()
    }

    #[inline]
    fn circumsphere(points: &[Self]) -> (Self, f64) {
        circumsphere::circumsphere([points[0], points[1], points[2], points[3]])
    }
}
