use crate::distance::{get_dist_func, DistanceMetric};
use crate::ClusterError;
use num_traits::Float;

const BRUTE_FORCE_N_SAMPLES_LIMIT: usize = 250;

/// The nearest neighbour algorithm options
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NnAlgorithm {
    /// Selects the nearest neighbour algorithm based on the size of the input data
    Auto,
    /// Computes a distance matrix between each point and all others
    BruteForce,
    /// K-dimensional tree algorithm.
    KdTree,
}

/// Calculates the core distance of every point: the distance to its kth nearest neighbour,
/// the point itself included.
pub(crate) struct CoreDistanceCalculator<'a, T> {
    data: &'a [Vec<T>],
    nn_algo: NnAlgorithm,
    dist_metric: DistanceMetric,
    k: usize,
}

impl<'a, T: Float> CoreDistanceCalculator<'a, T> {
    pub(crate) fn new(
        data: &'a [Vec<T>],
        nn_algo: NnAlgorithm,
        dist_metric: DistanceMetric,
        k: usize,
    ) -> Self {
        Self {
            data,
            nn_algo,
            dist_metric,
            k,
        }
    }

    pub(crate) fn calc_core_distances(&self) -> Result<Vec<T>, ClusterError> {
        if self.k == 0 || self.k > self.data.len() {
            return Err(ClusterError::PartitionFailure(format!(
                "cannot find the {}th neighbour among {} points",
                self.k,
                self.data.len()
            )));
        }
        let n_samples = self.data.len();
        match (&self.nn_algo, n_samples) {
            (NnAlgorithm::Auto, usize::MIN..=BRUTE_FORCE_N_SAMPLES_LIMIT) => {
                Ok(BruteForce::calc_core_distances(self.data, self.k, self.dist_metric))
            }
            (NnAlgorithm::Auto, _) => {
                KdTree::calc_core_distances(self.data, self.k, self.dist_metric)
            }
            (NnAlgorithm::BruteForce, _) => {
                Ok(BruteForce::calc_core_distances(self.data, self.k, self.dist_metric))
            }
            (NnAlgorithm::KdTree, _) => {
                KdTree::calc_core_distances(self.data, self.k, self.dist_metric)
            }
        }
    }
}

pub(crate) struct BruteForce;

impl BruteForce {
    fn calc_core_distances<T: Float>(
        data: &[Vec<T>],
        k: usize,
        dist_metric: DistanceMetric,
    ) -> Vec<T> {
        let dist_func = get_dist_func(&dist_metric);
        data.iter()
            .map(|point| {
                let mut distances: Vec<T> =
                    data.iter().map(|other| dist_func(point, other)).collect();
                distances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                distances[k - 1]
            })
            .collect()
    }
}

pub(crate) struct KdTree;

impl KdTree {
    fn calc_core_distances<T: Float>(
        data: &[Vec<T>],
        k: usize,
        dist_metric: DistanceMetric,
    ) -> Result<Vec<T>, ClusterError> {
        let mut tree: kdtree::KdTree<T, usize, &Vec<T>> = kdtree::KdTree::new(data[0].len());
        for (n, datapoint) in data.iter().enumerate() {
            tree.add(datapoint, n).map_err(|err| {
                ClusterError::PartitionFailure(format!("cannot index {n}th point: {err:?}"))
            })?;
        }

        let dist_func = get_dist_func(&dist_metric);
        data.iter()
            .map(|datapoint| {
                let neighbours = tree.nearest(datapoint, k, &dist_func).map_err(|err| {
                    ClusterError::PartitionFailure(format!("nearest neighbour search: {err:?}"))
                })?;
                neighbours
                    .into_iter()
                    .map(|(dist, _idx)| dist)
                    .last()
                    .ok_or_else(|| {
                        ClusterError::PartitionFailure(String::from("no neighbours found"))
                    })
            })
            .collect()
    }
}
