//! Exemplar strategy: affinity propagation.
//!
//! Points exchange "responsibility" and "availability" messages until a stable set of
//! exemplars emerges. The number of groups is decided by the algorithm itself (through the
//! preference, by default the median similarity) and every group is represented by one of
//! its own members rather than a synthetic vector.

use super::{Partition, Partitioner, Representative};
use crate::distance::squared_euclidean_distance;
use crate::ClusterError;
use num_traits::Float;
use rand::prelude::*;
use std::collections::VecDeque;

const DAMPING_DEFAULT: f64 = 0.5;
const MAX_ITER_DEFAULT: usize = 200;
const CONVERGENCE_ITER_DEFAULT: usize = 15;
const TIE_BREAK_SEED_DEFAULT: u64 = 0;

type Matrix<T> = Vec<Vec<T>>;

/// Affinity propagation partitioner using negative squared Euclidean similarity.
///
/// Large sets of exact duplicate feature vectors, such as copies of the same image, keep
/// the messages of the duplicates tied so the exemplar set never settles. The partition
/// then fails with a non-convergence error and the engine turns the subset into leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct ExemplarPartitioner {
    damping: f64,
    max_iter: usize,
    convergence_iter: usize,
    preference: Option<f64>,
    seed: u64,
}

impl Default for ExemplarPartitioner {
    fn default() -> Self {
        Self::new()
    }
}

impl ExemplarPartitioner {
    pub fn new() -> Self {
        Self {
            damping: DAMPING_DEFAULT,
            max_iter: MAX_ITER_DEFAULT,
            convergence_iter: CONVERGENCE_ITER_DEFAULT,
            preference: None,
            seed: TIE_BREAK_SEED_DEFAULT,
        }
    }

    /// Set the damping factor, clamped to `[0.5, 1.0)`.
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping.clamp(0.5, 0.99);
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the number of iterations the exemplar set must stay unchanged to converge.
    pub fn with_convergence_iter(mut self, convergence_iter: usize) -> Self {
        self.convergence_iter = convergence_iter.max(1);
        self
    }

    /// Set the self similarity of every point. Higher values produce more groups. Defaults
    /// to the median of the similarity matrix.
    pub fn with_preference(mut self, preference: f64) -> Self {
        self.preference = Some(preference);
        self
    }

    /// Set the seed of the tiny noise used to break ties between equal similarities.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn calc_similarities<T: Float>(&self, data: &[Vec<T>]) -> Result<Matrix<T>, ClusterError> {
        let mut similarities: Matrix<T> = data
            .iter()
            .map(|a| data.iter().map(|b| -squared_euclidean_distance(a, b)).collect())
            .collect();

        let off_diagonal = || {
            similarities
                .iter()
                .enumerate()
                .flat_map(|(i, row)| row.iter().enumerate().filter(move |(k, _)| *k != i))
                .map(|(_, s)| *s)
        };
        let max = off_diagonal().fold(T::neg_infinity(), T::max);
        let min = off_diagonal().fold(T::infinity(), T::min);
        if max == min {
            return Err(ClusterError::PartitionFailure(String::from(
                "all similarities are equal, there is nothing to propagate",
            )));
        }

        let preference = match self.preference.and_then(|p| T::from(p)) {
            Some(preference) => preference,
            None => median(similarities.iter().flatten().copied().collect()),
        };
        for (i, row) in similarities.iter_mut().enumerate() {
            row[i] = preference;
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let tiny = T::min_positive_value() * T::from(100.0).unwrap_or(T::one());
        for row in similarities.iter_mut() {
            for s in row.iter_mut() {
                let noise = T::from(rng.random::<f64>() - 0.5).unwrap_or(T::zero());
                *s = *s + (T::epsilon() * s.abs() + tiny) * noise;
            }
        }
        Ok(similarities)
    }

    fn update_responsibilities<T: Float>(
        &self,
        similarities: &Matrix<T>,
        availabilities: &Matrix<T>,
        responsibilities: &mut Matrix<T>,
    ) {
        let damping = T::from(self.damping).unwrap_or(T::zero());
        let keep = T::one() - damping;
        for (i, row) in responsibilities.iter_mut().enumerate() {
            let mut first = T::neg_infinity();
            let mut second = T::neg_infinity();
            let mut first_k = 0;
            for k in 0..row.len() {
                let value = availabilities[i][k] + similarities[i][k];
                if value > first {
                    second = first;
                    first = value;
                    first_k = k;
                } else if value > second {
                    second = value;
                }
            }
            for (k, r) in row.iter_mut().enumerate() {
                let competitor = if k == first_k { second } else { first };
                let new = similarities[i][k] - competitor;
                *r = damping * *r + keep * new;
            }
        }
    }

    fn update_availabilities<T: Float>(
        &self,
        responsibilities: &Matrix<T>,
        availabilities: &mut Matrix<T>,
    ) {
        let damping = T::from(self.damping).unwrap_or(T::zero());
        let keep = T::one() - damping;
        let n = responsibilities.len();
        for k in 0..n {
            let positive_sum = (0..n)
                .filter(|i| *i != k)
                .map(|i| responsibilities[i][k].max(T::zero()))
                .fold(T::zero(), std::ops::Add::add);
            for i in 0..n {
                let new = if i == k {
                    positive_sum
                } else {
                    let support = responsibilities[k][k] + positive_sum
                        - responsibilities[i][k].max(T::zero());
                    support.min(T::zero())
                };
                availabilities[i][k] = damping * availabilities[i][k] + keep * new;
            }
        }
    }

    fn propagate<T: Float>(&self, similarities: &Matrix<T>) -> Result<Vec<usize>, ClusterError> {
        let n = similarities.len();
        let mut responsibilities = vec![vec![T::zero(); n]; n];
        let mut availabilities = vec![vec![T::zero(); n]; n];
        let mut window: VecDeque<Vec<bool>> = VecDeque::with_capacity(self.convergence_iter);

        for _ in 0..self.max_iter {
            self.update_responsibilities(similarities, &availabilities, &mut responsibilities);
            self.update_availabilities(&responsibilities, &mut availabilities);

            let is_exemplar: Vec<bool> = (0..n)
                .map(|k| availabilities[k][k] + responsibilities[k][k] > T::zero())
                .collect();
            window.push_back(is_exemplar);
            if window.len() > self.convergence_iter {
                window.pop_front();
            }

            let latest = &window[window.len() - 1];
            let is_stable = window.len() == self.convergence_iter
                && window.iter().all(|previous| previous == latest);
            if is_stable && latest.iter().any(|e| *e) {
                return Ok((0..n).filter(|k| latest[*k]).collect());
            }
        }
        Err(ClusterError::PartitionFailure(format!(
            "affinity propagation did not converge after {} iterations",
            self.max_iter
        )))
    }

    fn assign<T: Float>(similarities: &Matrix<T>, exemplars: &[usize]) -> Vec<usize> {
        let mut labels: Vec<usize> = similarities
            .iter()
            .map(|row| {
                let mut best = 0;
                for (group, exemplar) in exemplars.iter().enumerate() {
                    if row[*exemplar] > row[exemplars[best]] {
                        best = group;
                    }
                }
                best
            })
            .collect();
        for (group, exemplar) in exemplars.iter().enumerate() {
            labels[*exemplar] = group;
        }
        labels
    }

    /// Moves each exemplar to the member that is most similar to the rest of its group.
    fn refine_exemplars<T: Float>(similarities: &Matrix<T>, exemplars: &[usize]) -> Vec<usize> {
        let labels = Self::assign(similarities, exemplars);
        let mut refined: Vec<usize> = (0..exemplars.len())
            .map(|group| {
                let members: Vec<usize> = (0..labels.len())
                    .filter(|n| labels[*n] == group)
                    .collect();
                let mut best = exemplars[group];
                let mut best_support = T::neg_infinity();
                for &candidate in &members {
                    let support = members
                        .iter()
                        .map(|&m| similarities[m][candidate])
                        .fold(T::zero(), std::ops::Add::add);
                    if support > best_support {
                        best_support = support;
                        best = candidate;
                    }
                }
                best
            })
            .collect();
        refined.sort_unstable();
        refined.dedup();
        refined
    }
}

impl<T: Float> Partitioner<T> for ExemplarPartitioner {
    fn partition(&self, data: &[Vec<T>]) -> Result<Partition<T>, ClusterError> {
        if data.len() < 2 {
            return Err(ClusterError::PartitionFailure(format!(
                "cannot propagate affinities between {} items",
                data.len()
            )));
        }
        let similarities = self.calc_similarities(data)?;
        let exemplars = self.propagate(&similarities)?;
        let exemplars = Self::refine_exemplars(&similarities, &exemplars);
        let labels = Self::assign(&similarities, &exemplars);

        Ok(Partition::new(
            exemplars.len(),
            labels.into_iter().map(Some).collect(),
            Some(exemplars.into_iter().map(Representative::Exemplar).collect()),
        ))
    }
}

fn median<T: Float>(mut values: Vec<T>) -> T {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / (T::one() + T::one())
    } else {
        values[mid]
    }
}
