//! Voronoi diagrams as the dual of a Delaunay triangulation.
//!
//! Every Delaunay cell contributes its circumcenter as a Voronoi vertex. The
//! region of a site is made of the circumcenters of the cells incident to the
//! site, and two of them are joined by an edge when their cells share a facet.

use tracing::debug;

use crate::{
    delaunay::{DelaunayCell, DelaunayTriangulation},
    hull::{HullError, HullOptions},
    vector::Lift,
    vertex::Vertex,
};

/// A connection between the circumcenters of two adjacent Delaunay cells.
///
/// `from` and `to` are cell indices into [`VoronoiMesh::cells`], with
/// `from < to`. Two edges are equal only if both endpoints match in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoronoiEdge {
    /// The cell with the lower index.
    pub from: usize,
    /// The cell with the higher index.
    pub to: usize,
}

/// The Voronoi region of one site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoronoiRegion {
    id: usize,
    site: usize,
    cells: Vec<usize>,
    edges: Vec<VoronoiEdge>,
}

impl VoronoiRegion {
    /// Returns the sequential index of the region.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the id of the site vertex.
    #[inline]
    pub fn site(&self) -> usize {
        self.site
    }

    /// Returns the indices of the Delaunay cells incident to the site, in ascending order.
    #[inline]
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    /// Returns the edges between adjacent cells of the region.
    ///
    /// Each adjacent pair of cells appears once, as an edge from the lower to
    /// the higher cell index.
    #[inline]
    pub fn edges(&self) -> &[VoronoiEdge] {
        &self.edges
    }
}

/// A [Voronoi diagram] of a set of 2D or 3D sites.
///
/// [Voronoi diagram]: https://en.wikipedia.org/wiki/Voronoi_diagram
///
/// Regions of sites on the boundary of the convex hull are unbounded, so their
/// cells only describe the bounded part of the region.
///
/// # Example
///
/// ```
/// use quickhull_voronoi::{HullOptions, Vertex2, VoronoiMesh};
///
/// let mut sites = vec![
///     Vertex2::new(-1.0, -1.0),
///     Vertex2::new(1.0, -1.0),
///     Vertex2::new(1.0, 1.0),
///     Vertex2::new(-1.0, 1.0),
///     Vertex2::new(0.0, 0.0),
/// ];
///
/// let mesh = VoronoiMesh::try_from_vertices(&mut sites, HullOptions::default()).unwrap();
///
/// // The center site is surrounded by the circumcenters of all four triangles.
/// let center = &mesh.regions()[4];
/// assert_eq!(center.cells().len(), 4);
/// assert_eq!(center.edges().len(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct VoronoiMesh<V: Vertex>
where
    V::Vector: Lift,
{
    triangulation: DelaunayTriangulation<V>,
    regions: Vec<VoronoiRegion>,
}

impl<V: Vertex> VoronoiMesh<V>
where
    V::Vector: Lift,
{
    /// Attempts to compute the Voronoi diagram of the given sites.
    ///
    /// Sites that end up in no Delaunay cell, such as duplicates, get no region.
    ///
    /// # Errors
    ///
    /// Returns a [`HullError`] if the underlying triangulation fails.
    #[tracing::instrument(level = "debug", skip_all, fields(sites = vertices.len()))]
    pub fn try_from_vertices(vertices: &mut [V], options: HullOptions) -> Result<Self, HullError> {
        let mut triangulation = DelaunayTriangulation::try_from_vertices(vertices, options)?;

        for (tag, vertex) in triangulation.vertices.iter_mut().enumerate() {
            vertex.set_tag(tag);
        }
        for (tag, cell) in triangulation.cells.iter_mut().enumerate() {
            cell.circumcenter.set_tag(tag);
        }

        // `region_of[tag]` is the id of the last region that took the cell, plus one.
        let mut region_of = vec![0; triangulation.cells.len()];
        let mut regions = Vec::new();

        for site in vertices.iter() {
            let cells: Vec<usize> = triangulation
                .cells
                .iter()
                .filter(|cell| cell.simplex().has_vertex(site.id()))
                .map(|cell| cell.circumcenter().tag())
                .collect();
            if cells.is_empty() {
                continue;
            }

            let id = regions.len();
            for &cell in &cells {
                region_of[cell] = id + 1;
            }

            let mut edges = Vec::new();
            for &cell in &cells {
                for &neighbor in triangulation.cells[cell].adjacent().iter().flatten() {
                    if cell < neighbor && region_of[neighbor] == id + 1 {
                        edges.push(VoronoiEdge {
                            from: cell,
                            to: neighbor,
                        });
                    }
                }
            }

            regions.push(VoronoiRegion {
                id,
                site: site.id(),
                cells,
                edges,
            });
        }

        debug!(
            regions = regions.len(),
            cells = triangulation.cells.len(),
            "voronoi mesh generated"
        );

        Ok(Self {
            triangulation,
            regions,
        })
    }

    /// Returns the regions, in the order of their sites.
    #[inline]
    pub fn regions(&self) -> &[VoronoiRegion] {
        &self.regions
    }

    /// Returns the underlying Delaunay triangulation.
    ///
    /// Its vertices and cells are tagged with their indices.
    #[inline]
    pub fn triangulation(&self) -> &DelaunayTriangulation<V> {
        &self.triangulation
    }

    /// Returns the Delaunay cells, whose circumcenters are the Voronoi vertices.
    #[inline]
    pub fn cells(&self) -> &[DelaunayCell<V>] {
        self.triangulation.cells()
    }

    /// Returns the cells of a region.
    pub fn region_cells<'a>(
        &'a self,
        region: &'a VoronoiRegion,
    ) -> impl Iterator<Item = &'a DelaunayCell<V>> + 'a {
        region.cells.iter().map(|&cell| &self.triangulation.cells[cell])
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::{
        vector::Vector,
        vertex::{Vertex2, Vertex3},
    };

    fn mesh<V: Vertex>(vertices: &mut [V]) -> VoronoiMesh<V>
    where
        V::Vector: Lift,
    {
        VoronoiMesh::try_from_vertices(vertices, HullOptions::default()).unwrap()
    }

    fn random_sites<V: Vertex>(count: usize, seed: u64) -> Vec<V> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let mut position = V::Vector::ZERO;
                for axis in 0..V::Vector::DIM {
                    position[axis] = rng.random_range(-10.0..10.0);
                }
                V::from_position(position)
            })
            .collect()
    }

    fn assert_dual<V: Vertex>(mesh: &VoronoiMesh<V>, sites: &[V])
    where
        V::Vector: Lift,
    {
        assert!(mesh.regions().len() <= sites.len());

        for (index, region) in mesh.regions().iter().enumerate() {
            assert_eq!(region.id(), index);
            assert!(!region.cells().is_empty());
            for cell in mesh.region_cells(region) {
                assert!(cell.simplex().has_vertex(region.site()));
            }
            for edge in region.edges() {
                assert!(edge.from < edge.to);
                assert!(mesh.cells()[edge.from].adjacent().contains(&Some(edge.to)));
            }
        }

        // Every facet shared by two cells shows up in the region of each of its vertices.
        for (index, cell) in mesh.cells().iter().enumerate() {
            for (i, neighbor) in cell.adjacent().iter().enumerate() {
                let Some(neighbor) = *neighbor else {
                    continue;
                };
                let edge = VoronoiEdge {
                    from: index.min(neighbor),
                    to: index.max(neighbor),
                };
                for (j, vertex) in cell.vertices().iter().enumerate() {
                    if j == i {
                        continue;
                    }
                    let region = mesh
                        .regions()
                        .iter()
                        .find(|region| region.site() == vertex.id())
                        .unwrap();
                    assert!(region.edges().contains(&edge));
                }
            }
        }
    }

    #[test]
    fn square_with_center() {
        let mut sites = vec![
            Vertex2::new(-1.0, -1.0),
            Vertex2::new(1.0, -1.0),
            Vertex2::new(1.0, 1.0),
            Vertex2::new(-1.0, 1.0),
            Vertex2::new(0.0, 0.0),
        ];
        let mesh = mesh(&mut sites);
        assert_dual(&mesh, &sites);

        assert_eq!(mesh.cells().len(), 4);
        assert_eq!(mesh.regions().len(), 5);

        for corner in &mesh.regions()[..4] {
            assert_eq!(corner.cells().len(), 2);
            assert_eq!(corner.edges().len(), 1);
        }

        let center = &mesh.regions()[4];
        assert_eq!(center.site(), 4);
        assert_eq!(center.cells().len(), 4);
        assert_eq!(center.edges().len(), 4);
        for cell in mesh.region_cells(center) {
            assert_relative_eq!(cell.circumcenter().magnitude(), 1.0, epsilon = 1e-9);
            assert_relative_eq!(cell.radius(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn tags_follow_indices() {
        let mut sites: Vec<Vertex2> = random_sites(30, 3);
        let mesh = mesh(&mut sites);

        for (index, vertex) in mesh.triangulation().vertices().iter().enumerate() {
            assert_eq!(vertex.tag(), index);
        }
        for (index, cell) in mesh.cells().iter().enumerate() {
            assert_eq!(cell.circumcenter().tag(), index);
        }
    }

    #[test]
    fn duplicate_site_gets_no_region() {
        let mut sites = vec![
            Vertex2::new(-1.0, -1.0),
            Vertex2::new(1.0, -1.0),
            Vertex2::new(1.0, 1.0),
            Vertex2::new(-1.0, 1.0),
            Vertex2::new(0.0, 0.0),
            Vertex2::new(0.0, 0.0),
        ];
        let mesh = mesh(&mut sites);
        assert_dual(&mesh, &sites);
        assert_eq!(mesh.regions().len(), 5);
    }

    #[test]
    fn too_few_sites() {
        let mut sites = vec![Vertex2::new(0.0, 0.0), Vertex2::new(1.0, 0.0)];
        let mesh = mesh(&mut sites);
        assert!(mesh.regions().is_empty());
        assert!(mesh.cells().is_empty());
    }

    #[test]
    fn edges_are_ordered_pairs() {
        let edge = VoronoiEdge { from: 1, to: 2 };
        assert_eq!(edge, VoronoiEdge { from: 1, to: 2 });
        assert_ne!(edge, VoronoiEdge { from: 2, to: 1 });

        let edges: std::collections::HashSet<_> = [edge, edge, VoronoiEdge { from: 2, to: 1 }]
            .into_iter()
            .collect();
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn random_2d() {
        let mut sites: Vec<Vertex2> = random_sites(200, 17);
        let mesh = mesh(&mut sites);
        assert_dual(&mesh, &sites);
        assert_eq!(mesh.regions().len(), sites.len());
    }

    #[test]
    fn random_3d() {
        let mut sites: Vec<Vertex3> = random_sites(80, 29);
        let mesh = mesh(&mut sites);
        assert_dual(&mesh, &sites);
        assert_eq!(mesh.regions().len(), sites.len());
    }
}
