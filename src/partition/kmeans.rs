//! Centroid strategy: k-means with k-means++ seeding and Lloyd iterations.
//!
//! Every level of the hierarchy asks for exactly `k` groups, so the shape of the tree is set
//! by the branching factor. Each group is represented by its centroid, which the engine
//! hands to the synthesizer to render a preview.

use super::{Partition, Partitioner, Representative};
use crate::distance::squared_euclidean_distance;
use crate::ClusterError;
use num_traits::Float;
use rand::prelude::*;

const MAX_ITER_DEFAULT: usize = 300;
const TOL_DEFAULT: f64 = 1e-4;

/// K-means partitioner requesting exactly `k` groups.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidPartitioner {
    k: usize,
    max_iter: usize,
    tol: f64,
    seed: Option<u64>,
}

impl CentroidPartitioner {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: MAX_ITER_DEFAULT,
            tol: TOL_DEFAULT,
            seed: None,
        }
    }

    /// Set maximum Lloyd iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance on the squared centroid shift.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn check_separable<T: Float>(&self, data: &[Vec<T>]) -> Result<(), ClusterError> {
        if self.k < 2 {
            return Err(ClusterError::PartitionFailure(format!(
                "cannot split into {} groups",
                self.k
            )));
        }
        if data.len() < self.k {
            return Err(ClusterError::PartitionFailure(format!(
                "cannot create {} groups from {} items",
                self.k,
                data.len()
            )));
        }
        let mut distinct: Vec<&Vec<T>> = Vec::with_capacity(self.k);
        for datapoint in data {
            if !distinct.contains(&datapoint) {
                distinct.push(datapoint);
                if distinct.len() == self.k {
                    return Ok(());
                }
            }
        }
        Err(ClusterError::PartitionFailure(format!(
            "only {} distinct feature vectors for {} groups",
            distinct.len(),
            self.k
        )))
    }

    /// Spreads the initial centroids out, choosing each next one with probability
    /// proportional to its squared distance from the nearest centroid so far.
    fn init_centroids<T: Float>(&self, data: &[Vec<T>], rng: &mut impl Rng) -> Vec<Vec<T>> {
        let n = data.len();
        let mut centroids = Vec::with_capacity(self.k);
        centroids.push(data[rng.random_range(0..n)].clone());

        while centroids.len() < self.k {
            let distances: Vec<f64> = data
                .iter()
                .map(|point| {
                    centroids
                        .iter()
                        .map(|centroid| squared_euclidean_distance(point, centroid))
                        .fold(T::infinity(), T::min)
                        .to_f64()
                        .unwrap_or(0.0)
                })
                .collect();

            let total: f64 = distances.iter().sum();
            if total <= 0.0 {
                centroids.push(data[rng.random_range(0..n)].clone());
                continue;
            }

            let threshold = rng.random::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = n - 1;
            for (j, d) in distances.iter().enumerate() {
                cumsum += d;
                if cumsum >= threshold && *d > 0.0 {
                    selected = j;
                    break;
                }
            }
            centroids.push(data[selected].clone());
        }
        centroids
    }

    fn nearest_centroid<T: Float>(point: &[T], centroids: &[Vec<T>]) -> usize {
        let mut best_group = 0;
        let mut best_dist = T::infinity();
        for (group, centroid) in centroids.iter().enumerate() {
            let dist = squared_euclidean_distance(point, centroid);
            if dist < best_dist {
                best_dist = dist;
                best_group = group;
            }
        }
        best_group
    }

    fn update_centroids<T: Float>(
        &self,
        data: &[Vec<T>],
        labels: &[usize],
        previous: &[Vec<T>],
    ) -> Vec<Vec<T>> {
        let n_dims = data[0].len();
        let mut sums = vec![vec![T::zero(); n_dims]; self.k];
        let mut counts = vec![0_usize; self.k];
        for (point, &group) in data.iter().zip(labels) {
            counts[group] += 1;
            for (sum, element) in sums[group].iter_mut().zip(point) {
                *sum = *sum + *element;
            }
        }
        sums.into_iter()
            .zip(counts)
            .zip(previous)
            .map(|((sum, count), previous)| {
                // Empty groups keep their last position
                if count == 0 {
                    return previous.clone();
                }
                let count = T::from(count).unwrap_or(T::one());
                sum.into_iter().map(|element| element / count).collect()
            })
            .collect()
    }
}

impl<T: Float> Partitioner<T> for CentroidPartitioner {
    fn partition(&self, data: &[Vec<T>]) -> Result<Partition<T>, ClusterError> {
        self.check_separable(data)?;

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        let tol = T::from(self.tol).unwrap_or(T::epsilon());

        let mut centroids = self.init_centroids(data, &mut rng);
        let mut labels = vec![0_usize; data.len()];

        for _ in 0..self.max_iter {
            for (label, point) in labels.iter_mut().zip(data) {
                *label = Self::nearest_centroid(point, &centroids);
            }
            let new_centroids = self.update_centroids(data, &labels, &centroids);
            let shift = centroids
                .iter()
                .zip(&new_centroids)
                .map(|(old, new)| squared_euclidean_distance(old, new))
                .fold(T::zero(), std::ops::Add::add);
            centroids = new_centroids;
            if shift < tol {
                break;
            }
        }

        // Labels and centroids must describe the same assignment
        for (label, point) in labels.iter_mut().zip(data) {
            *label = Self::nearest_centroid(point, &centroids);
        }
        let centroids = self.update_centroids(data, &labels, &centroids);

        Ok(Partition::new(
            self.k,
            labels.into_iter().map(Some).collect(),
            Some(centroids.into_iter().map(Representative::Vector).collect()),
        ))
    }
}
