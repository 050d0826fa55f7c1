use crate::partition::Strategy;
use tracing::warn;

// Defaults for parameters
const BRANCHING_FACTOR_DEFAULT: usize = 7;
const SPLIT_THRESHOLD_DEFAULT: usize = 10;
const MAX_DEPTH_DEFAULT: usize = 10;
const STRATEGY_DEFAULT: Strategy = Strategy::Centroid;

// Valid minimums/left bounds of parameters
const BRANCHING_FACTOR_MINIMUM: usize = 2;
const SPLIT_THRESHOLD_MINIMUM: usize = 1;

/// The parameters of a hierarchical partition run.
/// Use `HierarchyParams::builder()` to tune them, or `HierarchyParams::default()` for the
/// defaults (branching factor 7, split threshold 10, max depth 10, centroid strategy).
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyParams {
    pub(crate) branching_factor: usize,
    pub(crate) split_threshold: usize,
    pub(crate) max_depth: usize,
    pub(crate) strategy: Strategy,
    pub(crate) seed: Option<u64>,
}

/// Builder object to set custom hierarchy parameters.
#[derive(Debug, Clone, Default)]
pub struct HyperParamBuilder {
    branching_factor: Option<usize>,
    split_threshold: Option<usize>,
    max_depth: Option<usize>,
    strategy: Option<Strategy>,
    seed: Option<u64>,
}

impl Default for HierarchyParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl HierarchyParams {
    /// Enters the builder pattern, allowing custom parameters to be set using
    /// various setter methods.
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn builder() -> HyperParamBuilder {
        HyperParamBuilder::default()
    }

    pub fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    pub fn split_threshold(&self) -> usize {
        self.split_threshold
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// A copy of these parameters with a different partitioning strategy.
    pub fn with_strategy(&self, strategy: Strategy) -> Self {
        Self {
            strategy,
            ..self.clone()
        }
    }
}

impl HyperParamBuilder {
    /// Sets the branching factor - the number of groups requested from the centroid strategy
    /// at every level of the hierarchy. The exemplar and density strategies decide their own
    /// group counts and ignore it. Defaults to 7.
    ///
    /// # Parameters
    /// * branching_factor - the number of children per split
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn branching_factor(mut self, branching_factor: usize) -> HyperParamBuilder {
        let valid_branching_factor = HyperParamBuilder::validate_input_left_bound(
            branching_factor,
            BRANCHING_FACTOR_MINIMUM,
            "branching_factor",
        );
        self.branching_factor = Some(valid_branching_factor);
        self
    }

    /// Sets the split threshold - subsets with fewer items than this are not partitioned any
    /// further and are expanded into one terminal leaf per item. Defaults to 10.
    ///
    /// # Parameters
    /// * split_threshold - the minimum number of items for a subset to be split
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn split_threshold(mut self, split_threshold: usize) -> HyperParamBuilder {
        let valid_split_threshold = HyperParamBuilder::validate_input_left_bound(
            split_threshold,
            SPLIT_THRESHOLD_MINIMUM,
            "split_threshold",
        );
        self.split_threshold = Some(valid_split_threshold);
        self
    }

    /// Sets the maximum depth - the number of times the item store may be recursively
    /// partitioned along any path. A maximum depth of zero expands the root straight into
    /// terminal leaves. Defaults to 10.
    ///
    /// # Parameters
    /// * max_depth - the depth budget of the root
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn max_depth(mut self, max_depth: usize) -> HyperParamBuilder {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sets the partitioning strategy. Defaults to `Strategy::Centroid`.
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn strategy(mut self, strategy: Strategy) -> HyperParamBuilder {
        self.strategy = Some(strategy);
        self
    }

    /// Sets the random seed handed to partitioners that sample, making their output
    /// reproducible. Unseeded by default.
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn seed(mut self, seed: u64) -> HyperParamBuilder {
        self.seed = Some(seed);
        self
    }

    /// Finishes the building of the parameter configuration.
    ///
    /// # Returns
    /// * The completed hierarchy parameter configuration.
    pub fn build(self) -> HierarchyParams {
        HierarchyParams {
            branching_factor: self.branching_factor.unwrap_or(BRANCHING_FACTOR_DEFAULT),
            split_threshold: self.split_threshold.unwrap_or(SPLIT_THRESHOLD_DEFAULT),
            max_depth: self.max_depth.unwrap_or(MAX_DEPTH_DEFAULT),
            strategy: self.strategy.unwrap_or(STRATEGY_DEFAULT),
            seed: self.seed,
        }
    }

    pub(crate) fn validate_input_left_bound(
        input_param: usize,
        left_bound: usize,
        param: &str,
    ) -> usize {
        if input_param < left_bound {
            warn!(
                "{param} ({input_param}) cannot be lower than {left_bound}. Set to {left_bound}."
            );
            left_bound
        } else {
            input_param
        }
    }
}
