//! # Quickhull Voronoi
//!
//! Incremental convex hulls in 2, 3 and 4 dimensions, and the Delaunay
//! triangulations and Voronoi diagrams derived from them.
//!
//! The hull builder inserts the furthest outside point of one face at a time,
//! replacing the faces it can see with a cone of new faces around it, while
//! keeping a closed face adjacency graph. Points that would produce degenerate
//! faces are absorbed instead of failing the build.
//!
//! A [`DelaunayTriangulation`] lifts its input onto a paraboloid one dimension
//! up and keeps the lower faces of the lifted hull. A [`VoronoiMesh`] groups the
//! circumcenters of those cells around each input site.
//!
//! ```
//! use quickhull_voronoi::{ConvexHull, HullOptions, Vertex2};
//!
//! let mut vertices = vec![
//!     Vertex2::new(-1.0, -1.0),
//!     Vertex2::new(1.0, -1.0),
//!     Vertex2::new(1.0, 1.0),
//!     Vertex2::new(-1.0, 1.0),
//!     Vertex2::new(0.0, 0.0),
//! ];
//!
//! let hull = ConvexHull::try_from_vertices(&mut vertices, HullOptions::default()).unwrap();
//!
//! assert_eq!(hull.vertices().len(), 4);
//! assert_eq!(hull.simplices().len(), 4);
//! assert!(hull.contains(&Vertex2::new(0.5, 0.5)));
//! ```
//!
//! ## References
//!
//! - C. Bradford Barber et al. 1996. [The Quickhull Algorithm for Convex Hulls](https://www.cise.ufl.edu/~ungor/courses/fall06/papers/QuickHull.pdf)
//! - Dirk Gregorius. GDC 2014. [Physics for Game Programmers: Implementing Quickhull](https://archive.org/details/GDC2014Gregorius)

#![warn(missing_docs)]

pub mod delaunay;
mod fixed_hasher;
pub mod hull;
mod simplex;
mod vector;
mod vertex;
mod voronoi;

pub use delaunay::{DelaunayCell, DelaunayTriangulation};
pub use hull::{
    validate_input, validate_manifold, ConvexHull, HullBuilder, HullError, HullOptions,
    InputError, PLANE_DISTANCE_TOLERANCE,
};
pub use simplex::Simplex;
pub use vector::{Lift, Vector};
pub use vertex::{try_from_coordinates, Vertex, Vertex2, Vertex3, Vertex4};
pub use voronoi::{VoronoiEdge, VoronoiMesh, VoronoiRegion};
