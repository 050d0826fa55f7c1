//! The partitioning boundary of the hierarchy engine.
//!
//! A [`Partitioner`] splits a set of feature vectors into labelled groups, optionally with one
//! representative per group. The engine only ever sees the common [`Partition`] shape, which
//! lets the centroid, exemplar and density strategies be swapped freely.

use crate::{ClusterError, HierarchyParams};
use num_traits::Float;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub use self::affinity::ExemplarPartitioner;
pub use self::density::{DensityParamBuilder, DensityPartitioner};
pub use self::kmeans::CentroidPartitioner;

mod affinity;
mod density;
mod kmeans;

/// A capability to split feature vectors into groups.
///
/// Implementations must label every input vector either with a group index below
/// `n_groups` or, if the strategy supports outliers, with `None`. Numeric strategies that
/// sample should take a seed so that repeated calls on equal input give equal output.
pub trait Partitioner<T> {
    /// Partitions `data`, a slice of equal length feature vectors.
    fn partition(&self, data: &[Vec<T>]) -> Result<Partition<T>, ClusterError>;
}

/// The representative of one group of a partition.
#[derive(Debug, Clone, PartialEq)]
pub enum Representative<T> {
    /// A synthetic vector, such as the centroid of the group.
    Vector(Vec<T>),
    /// The index, within the partitioned data, of a real item chosen as exemplar.
    Exemplar(usize),
}

/// The result of partitioning a set of feature vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T> {
    /// The number of groups. Group indices run from zero to `n_groups - 1`.
    pub n_groups: usize,
    /// One entry per input vector: its group, or `None` for an ungrouped outlier.
    pub labels: Vec<Option<usize>>,
    /// One representative per group, when the strategy provides them.
    pub representatives: Option<Vec<Representative<T>>>,
}

impl<T> Partition<T> {
    pub fn new(
        n_groups: usize,
        labels: Vec<Option<usize>>,
        representatives: Option<Vec<Representative<T>>>,
    ) -> Self {
        Partition {
            n_groups,
            labels,
            representatives,
        }
    }

    /// Checks that the partition labels exactly `n_samples` vectors exhaustively and without
    /// overlap, and that its representatives are consistent with its groups.
    pub fn validate(&self, n_samples: usize) -> Result<(), ClusterError> {
        if self.labels.len() != n_samples {
            return Err(ClusterError::PartitionFailure(format!(
                "expected {n_samples} labels, but received {}",
                self.labels.len()
            )));
        }
        if let Some(label) = self.labels.iter().flatten().find(|&&l| l >= self.n_groups) {
            return Err(ClusterError::PartitionFailure(format!(
                "label {label} is out of range for {} groups",
                self.n_groups
            )));
        }
        let Some(representatives) = &self.representatives else {
            return Ok(());
        };
        if representatives.len() != self.n_groups {
            return Err(ClusterError::PartitionFailure(format!(
                "{} representatives for {} groups",
                representatives.len(),
                self.n_groups
            )));
        }
        for representative in representatives {
            if let Representative::Exemplar(index) = representative {
                if *index >= n_samples {
                    return Err(ClusterError::PartitionFailure(format!(
                        "exemplar {index} is out of range for {n_samples} samples"
                    )));
                }
            }
        }
        Ok(())
    }

    /// The indices of the vectors labelled with `group`, in input order.
    pub fn members(&self, group: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == Some(group))
            .map(|(n, _)| n)
            .collect()
    }

    /// The indices of the vectors left without a group, in input order.
    pub fn outliers(&self) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.is_none())
            .map(|(n, _)| n)
            .collect()
    }

    pub fn representative(&self, group: usize) -> Option<&Representative<T>> {
        self.representatives.as_ref().and_then(|reps| reps.get(group))
    }
}

/// The built-in partitioning strategies.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// K-means: exactly `branching_factor` groups, each represented by its centroid.
    Centroid,
    /// Affinity propagation: a self determined number of groups, each represented by a real
    /// item.
    Exemplar,
    /// HDBSCAN: a self determined number of groups represented by their centroids. Items in
    /// sparse regions are left ungrouped.
    Density,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Centroid, Strategy::Exemplar, Strategy::Density];

    /// Creates the partitioner implementing this strategy, configured from `hp`.
    pub fn partitioner<T: Float + 'static>(&self, hp: &HierarchyParams) -> Box<dyn Partitioner<T>> {
        match self {
            Strategy::Centroid => {
                let mut partitioner = CentroidPartitioner::new(hp.branching_factor);
                if let Some(seed) = hp.seed {
                    partitioner = partitioner.with_seed(seed);
                }
                Box::new(partitioner)
            }
            Strategy::Exemplar => {
                let mut partitioner = ExemplarPartitioner::new();
                if let Some(seed) = hp.seed {
                    partitioner = partitioner.with_seed(seed);
                }
                Box::new(partitioner)
            }
            Strategy::Density => Box::new(DensityPartitioner::default()),
        }
    }

    /// The file stem of the tree written for this strategy.
    pub fn output_stem(&self) -> &'static str {
        match self {
            Strategy::Centroid => "kmeans",
            Strategy::Exemplar => "affinity-prop",
            Strategy::Density => "density",
        }
    }

    /// The file name prefix of synthesized previews for this strategy.
    pub fn preview_prefix(&self) -> &'static str {
        match self {
            Strategy::Centroid => "kmeans-centroid",
            Strategy::Exemplar => "affinity-exemplar",
            Strategy::Density => "density-center",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Centroid => "centroid",
            Strategy::Exemplar => "exemplar",
            Strategy::Density => "density",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Strategy {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ClusterError::InvalidRecord(format!(
                    "unknown strategy `{s}`, expected one of centroid, exemplar, density"
                ))
            })
    }
}
