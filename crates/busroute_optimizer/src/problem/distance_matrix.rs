use tracing::instrument;

use crate::problem::{location::Location, meters::Meters, node::NodeIdx};

pub type Distance = u64;

/// Symmetric integer-meter distance matrix stored as a flat row-major vector:
/// `index = from * num_nodes + to`.
///
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    distances: Vec<Distance>,
    num_nodes: usize,
}

impl DistanceMatrix {
    /// Computes great-circle distances between every pair of locations,
    /// truncated to whole meters. The diagonal is zero.
    ///
    /// Only the upper triangle is computed, the lower one is mirrored so the
    /// matrix is symmetric bit for bit.
    #[instrument(skip_all, level = "debug", fields(num_nodes = locations.len()))]
    pub fn from_locations(locations: &[Location]) -> Self {
        let num_nodes = locations.len();
        let mut distances = vec![0; num_nodes * num_nodes];

        for (i, from) in locations.iter().enumerate() {
            for (j, to) in locations.iter().enumerate().skip(i + 1) {
                // `as` truncates toward zero
                let distance = from.haversine_distance(to) as Distance;
                distances[i * num_nodes + j] = distance;
                distances[j * num_nodes + i] = distance;
            }
        }

        DistanceMatrix {
            distances,
            num_nodes,
        }
    }

    /// Builds a matrix from explicit rows. Returns `None` when the rows do not
    /// form a square matrix.
    pub fn from_rows(rows: Vec<Vec<Distance>>) -> Option<Self> {
        let num_nodes = rows.len();
        if rows.iter().any(|row| row.len() != num_nodes) {
            return None;
        }

        Some(DistanceMatrix {
            distances: rows.into_iter().flatten().collect(),
            num_nodes,
        })
    }

    #[inline(always)]
    fn index(&self, from: NodeIdx, to: NodeIdx) -> usize {
        from.get() * self.num_nodes + to.get()
    }

    #[inline(always)]
    pub fn distance(&self, from: NodeIdx, to: NodeIdx) -> Distance {
        self.distances[self.index(from, to)]
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.num_nodes).all(|i| {
            (i + 1..self.num_nodes).all(|j| {
                self.distances[i * self.num_nodes + j] == self.distances[j * self.num_nodes + i]
            })
        })
    }

    /// Sum of consecutive lookups along `path`.
    pub fn path_distance<I>(&self, path: I) -> Meters
    where
        I: IntoIterator<Item = NodeIdx>,
    {
        let mut path = path.into_iter();
        let Some(mut previous) = path.next() else {
            return Meters::ZERO;
        };

        let mut total = 0;
        for node in path {
            total += self.distance(previous, node);
            previous = node;
        }

        Meters::new(total)
    }

    pub fn max_distance(&self) -> Distance {
        self.distances.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils;

    use super::*;

    #[test]
    fn test_from_locations_diagonal_and_symmetry() {
        let locations = test_utils::create_location_grid(3, 3);
        let matrix = DistanceMatrix::from_locations(&locations);

        assert_eq!(matrix.num_nodes(), 9);
        assert!(matrix.is_symmetric());
        for i in 0..9 {
            assert_eq!(matrix.distance(i.into(), i.into()), 0);
        }
    }

    #[test]
    fn test_distances_are_truncated() {
        let locations = vec![
            Location::from_lat_lon(0.0, 0.0),
            Location::from_lat_lon(1.0, 0.0),
        ];
        let matrix = DistanceMatrix::from_locations(&locations);

        let exact = locations[0].haversine_distance(&locations[1]);
        assert_eq!(matrix.distance(0.into(), 1.into()), exact.trunc() as u64);
        assert_eq!(matrix.distance(0.into(), 1.into()), 111_194);
    }

    #[test]
    fn test_identical_coordinates() {
        let locations = vec![Location::from_lat_lon(12.97, 77.59); 4];
        let matrix = DistanceMatrix::from_locations(&locations);

        assert_eq!(matrix.max_distance(), 0);
    }

    #[test]
    fn test_empty() {
        let matrix = DistanceMatrix::from_locations(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.path_distance([]), Meters::ZERO);
    }

    #[test]
    fn test_from_rows() {
        let matrix = DistanceMatrix::from_rows(vec![vec![0, 5], vec![5, 0]]).unwrap();
        assert_eq!(matrix.distance(0.into(), 1.into()), 5);

        assert!(DistanceMatrix::from_rows(vec![vec![0, 5], vec![5]]).is_none());
    }

    #[test]
    fn test_path_distance() {
        let matrix = DistanceMatrix::from_rows(vec![
            vec![0, 1, 2],
            vec![1, 0, 3],
            vec![2, 3, 0],
        ])
        .unwrap();

        let path = [0, 1, 2, 0].map(NodeIdx::new);
        assert_eq!(matrix.path_distance(path), Meters::new(6));
    }
}
