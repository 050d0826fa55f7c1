//! Density strategy: Hierarchical Density-Based Spatial Clustering of Applications with Noise
//! ("HDBSCAN").
//!
//! HDBSCAN is a good fit for one level of the hierarchy because:
//!  1. It does not assume that all data points belong to a group. Points in sparse regions
//!     are returned as outliers and become singleton leaves of the tree;
//!  2. It allows groups of varying densities, unlike the plain DBSCAN algorithm which uses a
//!     static density threshold. The winning groups are those that persist the longest at
//!     all densities; and
//!  3. It makes no assumptions about the number of groups there have to be, unlike k-means.
//!
//! The pipeline is: core distances, mutual reachability minimum spanning tree, single linkage
//! tree, condensed tree, stability based cluster selection and finally labelling.
//!
//! # References
//! * [Campello, R.J.G.B.; Moulavi, D.; Sander, J. Density-based clustering based on hierarchical density estimates.](https://link.springer.com/chapter/10.1007/978-3-642-37456-2_14)
//! * [How HDBSCAN Works](https://hdbscan.readthedocs.io/en/latest/how_hdbscan_works.html)

use super::{Partition, Partitioner, Representative};
use crate::core_distances::{CoreDistanceCalculator, NnAlgorithm};
use crate::data_wrappers::{CondensedNode, MSTEdge, SLTNode};
use crate::hyper_parameters::HyperParamBuilder;
use crate::union_find::UnionFind;
use crate::{Center, ClusterError, DistanceMetric};
use num_traits::Float;
use std::collections::{HashMap, VecDeque};
use std::ops::Range;

type CondensedTree<T> = Vec<CondensedNode<T>>;

// Defaults for parameters
const MIN_CLUSTER_SIZE_DEFAULT: usize = 5;
const ALLOW_SINGLE_CLUSTER_DEFAULT: bool = false;
const EPSILON_DEFAULT: f64 = 0.0;
const DISTANCE_METRIC_DEFAULT: DistanceMetric = DistanceMetric::Euclidean;
const NN_ALGORITHM_DEFAULT: NnAlgorithm = NnAlgorithm::Auto;

// Valid minimums/left bounds of parameters
const MIN_CLUSTER_SIZE_MINIMUM: usize = 2;
const MIN_SAMPLES_MINIMUM: usize = 1;

/// HDBSCAN partitioner. Generic over floating point numeric types through the `Partitioner`
/// implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityPartitioner {
    min_cluster_size: usize,
    allow_single_cluster: bool,
    min_samples: usize,
    epsilon: f64,
    dist_metric: DistanceMetric,
    nn_algo: NnAlgorithm,
}

/// Builder object to set custom HDBSCAN hyper parameters.
#[derive(Debug, Clone, Default)]
pub struct DensityParamBuilder {
    min_cluster_size: Option<usize>,
    allow_single_cluster: Option<bool>,
    min_samples: Option<usize>,
    epsilon: Option<f64>,
    dist_metric: Option<DistanceMetric>,
    nn_algo: Option<NnAlgorithm>,
}

impl Default for DensityPartitioner {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl DensityPartitioner {
    /// Enters the builder pattern, allowing custom hyper parameters to be set using
    /// various setter methods.
    ///
    /// # Examples
    /// ```
    ///use photospheres::{DensityPartitioner, DistanceMetric, NnAlgorithm};
    ///
    ///let partitioner = DensityPartitioner::builder()
    ///    .min_cluster_size(3)
    ///    .min_samples(2)
    ///    .dist_metric(DistanceMetric::Manhattan)
    ///    .nn_algorithm(NnAlgorithm::BruteForce)
    ///    .build();
    /// ```
    pub fn builder() -> DensityParamBuilder {
        DensityParamBuilder::default()
    }
}

impl DensityParamBuilder {
    /// Sets the minimum cluster size - the minimum number of samples for a group of
    /// data points to be considered a cluster. If a grouping of data points has fewer
    /// members than this, then they will be considered noise.
    /// This should be considered the main hyper parameter for changing the results of
    /// clustering. Defaults to 5.
    pub fn min_cluster_size(mut self, min_cluster_size: usize) -> DensityParamBuilder {
        let valid_min_cluster_size = HyperParamBuilder::validate_input_left_bound(
            min_cluster_size,
            MIN_CLUSTER_SIZE_MINIMUM,
            "min_cluster_size",
        );
        self.min_cluster_size = Some(valid_min_cluster_size);
        self
    }

    /// Sets whether to allow one single cluster (i.e. the root or top cluster). Note that a
    /// single group is treated by the hierarchy engine as no split at all. Defaults to false.
    pub fn allow_single_cluster(mut self, allow_single_cluster: bool) -> DensityParamBuilder {
        self.allow_single_cluster = Some(allow_single_cluster);
        self
    }

    /// Sets min samples. The core distance of a point is the distance to its kth neighbour,
    /// where k = min_samples. Defaults to min_cluster_size.
    pub fn min_samples(mut self, min_samples: usize) -> DensityParamBuilder {
        let valid_min_samples = HyperParamBuilder::validate_input_left_bound(
            min_samples,
            MIN_SAMPLES_MINIMUM,
            "min_samples",
        );
        self.min_samples = Some(valid_min_samples);
        self
    }

    /// Sets the epsilon distance threshold. Clusters that split at a distance below epsilon
    /// are merged back into their parent. Defaults to 0.0, which disables merging.
    pub fn epsilon(mut self, epsilon: f64) -> DensityParamBuilder {
        self.epsilon = Some(epsilon.max(0.0));
        self
    }

    /// Sets the distance metric used between feature vectors. Defaults to Euclidean.
    pub fn dist_metric(mut self, dist_metric: DistanceMetric) -> DensityParamBuilder {
        self.dist_metric = Some(dist_metric);
        self
    }

    /// Sets the nearest neighbour algorithm used to find core distances. Defaults to Auto,
    /// which brute forces small subsets and uses a k-d tree for larger ones.
    pub fn nn_algorithm(mut self, nn_algorithm: NnAlgorithm) -> DensityParamBuilder {
        self.nn_algo = Some(nn_algorithm);
        self
    }

    /// Finishes the building of the partitioner.
    pub fn build(self) -> DensityPartitioner {
        let min_cluster_size = self.min_cluster_size.unwrap_or(MIN_CLUSTER_SIZE_DEFAULT);
        DensityPartitioner {
            min_cluster_size,
            allow_single_cluster: self
                .allow_single_cluster
                .unwrap_or(ALLOW_SINGLE_CLUSTER_DEFAULT),
            min_samples: self.min_samples.unwrap_or(min_cluster_size),
            epsilon: self.epsilon.unwrap_or(EPSILON_DEFAULT),
            dist_metric: self.dist_metric.unwrap_or(DISTANCE_METRIC_DEFAULT),
            nn_algo: self.nn_algo.unwrap_or(NN_ALGORITHM_DEFAULT),
        }
    }
}

impl<T: Float> Partitioner<T> for DensityPartitioner {
    fn partition(&self, data: &[Vec<T>]) -> Result<Partition<T>, ClusterError> {
        let n_samples = data.len();
        if n_samples < 2 || n_samples < self.min_cluster_size || n_samples < self.min_samples {
            return Err(ClusterError::PartitionFailure(format!(
                "{n_samples} points are too few for min_cluster_size {} and min_samples {}",
                self.min_cluster_size, self.min_samples
            )));
        }
        let (n_groups, labels) = DensityRun::new(data, self).label()?;
        let centroids = Center::Centroid.calc_centers(data, &labels, n_groups);

        Ok(Partition::new(
            n_groups,
            labels,
            Some(centroids.into_iter().map(Representative::Vector).collect()),
        ))
    }
}

/// One HDBSCAN run over one subset of the data.
struct DensityRun<'a, T> {
    data: &'a [Vec<T>],
    n_samples: usize,
    hp: &'a DensityPartitioner,
}

impl<'a, T: Float> DensityRun<'a, T> {
    fn new(data: &'a [Vec<T>], hp: &'a DensityPartitioner) -> Self {
        Self {
            data,
            n_samples: data.len(),
            hp,
        }
    }

    /// Returns the number of winning clusters and the label of every point.
    fn label(&self) -> Result<(usize, Vec<Option<usize>>), ClusterError> {
        let calculator = CoreDistanceCalculator::new(
            self.data,
            self.hp.nn_algo,
            self.hp.dist_metric,
            self.hp.min_samples,
        );
        let core_distances = calculator.calc_core_distances()?;
        let min_spanning_tree = self.prims_min_spanning_tree(&core_distances);
        let single_linkage_tree = self.make_single_linkage_tree(&min_spanning_tree);
        let condensed_tree = self.condense_tree(&single_linkage_tree);
        let winning_clusters = self.extract_winning_clusters(&condensed_tree);
        Ok((
            winning_clusters.len(),
            self.label_data(&winning_clusters, &condensed_tree),
        ))
    }

    fn prims_min_spanning_tree(&self, core_distances: &[T]) -> Vec<MSTEdge<T>> {
        let mut in_tree = vec![false; self.n_samples];
        let mut distances = vec![T::infinity(); self.n_samples];
        distances[0] = T::zero();

        let mut mst = Vec::with_capacity(self.n_samples);

        let mut left_node_id = 0;
        let mut right_node_id = 0;

        for _ in 1..self.n_samples {
            in_tree[left_node_id] = true;
            let mut current_min_dist = T::infinity();

            for i in 0..self.n_samples {
                if in_tree[i] {
                    continue;
                }
                let mrd = self.calc_mutual_reachability_dist(left_node_id, i, core_distances);
                if mrd < distances[i] {
                    distances[i] = mrd;
                }
                if distances[i] < current_min_dist {
                    right_node_id = i;
                    current_min_dist = distances[i];
                }
            }
            mst.push(MSTEdge {
                left_node_id,
                right_node_id,
                distance: current_min_dist,
            });
            left_node_id = right_node_id;
        }
        mst.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        mst
    }

    fn calc_mutual_reachability_dist(&self, a: usize, b: usize, core_distances: &[T]) -> T {
        let dist_a_b = self.hp.dist_metric.calc_dist(&self.data[a], &self.data[b]);
        core_distances[a].max(core_distances[b]).max(dist_a_b)
    }

    fn make_single_linkage_tree(&self, min_spanning_tree: &[MSTEdge<T>]) -> Vec<SLTNode<T>> {
        let mut single_linkage_tree = Vec::with_capacity(self.n_samples - 1);
        let mut union_find = UnionFind::new(self.n_samples);

        for mst_edge in min_spanning_tree.iter().take(self.n_samples - 1) {
            let left_child = union_find.find(mst_edge.left_node_id);
            let right_child = union_find.find(mst_edge.right_node_id);
            let size = union_find.size_of(left_child) + union_find.size_of(right_child);

            single_linkage_tree.push(SLTNode {
                left_child,
                right_child,
                distance: mst_edge.distance,
                size,
            });

            union_find.union(left_child, right_child);
        }

        single_linkage_tree
    }

    fn condense_tree(&self, single_linkage_tree: &[SLTNode<T>]) -> CondensedTree<T> {
        let top_node = (self.n_samples - 1) * 2;
        let node_ids = self.find_single_linkage_children(single_linkage_tree, top_node);

        let mut new_node_ids = vec![0_usize; top_node + 1];
        new_node_ids[top_node] = self.n_samples;
        let mut next_parent_id = self.n_samples + 1;

        let mut visited = vec![false; node_ids.len()];
        let mut condensed_tree = Vec::new();

        for node_id in node_ids {
            if visited[node_id] || self.is_individual_sample(&node_id) {
                continue;
            }

            let node = &single_linkage_tree[node_id - self.n_samples];
            let left_child_id = node.left_child;
            let right_child_id = node.right_child;
            let lambda_birth = self.calc_lambda(node.distance);

            let left_child_size = self.extract_cluster_size(left_child_id, single_linkage_tree);
            let right_child_size = self.extract_cluster_size(right_child_id, single_linkage_tree);

            let is_left_a_cluster = self.is_cluster_big_enough(left_child_size);
            let is_right_a_cluster = self.is_cluster_big_enough(right_child_size);

            match (is_left_a_cluster, is_right_a_cluster) {
                (true, true) => {
                    for (child_id, child_size) in [left_child_id, right_child_id]
                        .iter()
                        .zip([left_child_size, right_child_size])
                    {
                        new_node_ids[*child_id] = next_parent_id;
                        next_parent_id += 1;
                        condensed_tree.push(CondensedNode {
                            node_id: new_node_ids[*child_id],
                            parent_node_id: new_node_ids[node_id],
                            lambda_birth,
                            size: child_size,
                        });
                    }
                }
                (false, false) => {
                    let new_node_id = new_node_ids[node_id];
                    for child_id in [left_child_id, right_child_id] {
                        self.add_children_to_tree(
                            child_id,
                            new_node_id,
                            single_linkage_tree,
                            &mut condensed_tree,
                            &mut visited,
                            lambda_birth,
                        );
                    }
                }
                (left_survives, _) => {
                    // The surviving child continues its parent; the other falls out as points
                    let (survivor, shed) = if left_survives {
                        (left_child_id, right_child_id)
                    } else {
                        (right_child_id, left_child_id)
                    };
                    new_node_ids[survivor] = new_node_ids[node_id];
                    self.add_children_to_tree(
                        shed,
                        new_node_ids[node_id],
                        single_linkage_tree,
                        &mut condensed_tree,
                        &mut visited,
                        lambda_birth,
                    );
                }
            }
        }
        condensed_tree
    }

    fn find_single_linkage_children(
        &self,
        single_linkage_tree: &[SLTNode<T>],
        root: usize,
    ) -> Vec<usize> {
        let mut process_queue = VecDeque::from([root]);
        let mut child_nodes = Vec::new();

        while let Some(current_node_id) = process_queue.pop_front() {
            child_nodes.push(current_node_id);
            if self.is_individual_sample(&current_node_id) {
                continue;
            }
            let current_node = &single_linkage_tree[current_node_id - self.n_samples];
            process_queue.push_back(current_node.left_child);
            process_queue.push_back(current_node.right_child);
        }

        child_nodes
    }

    fn is_individual_sample(&self, node_id: &usize) -> bool {
        node_id < &self.n_samples
    }

    fn is_cluster(&self, node_id: &usize) -> bool {
        !self.is_individual_sample(node_id)
    }

    fn calc_lambda(&self, dist: T) -> T {
        if dist > T::zero() {
            dist.recip()
        } else {
            T::infinity()
        }
    }

    fn extract_cluster_size(&self, node_id: usize, single_linkage_tree: &[SLTNode<T>]) -> usize {
        if self.is_individual_sample(&node_id) {
            1
        } else {
            single_linkage_tree[node_id - self.n_samples].size
        }
    }

    fn is_cluster_big_enough(&self, cluster_size: usize) -> bool {
        cluster_size >= self.hp.min_cluster_size
    }

    fn add_children_to_tree(
        &self,
        node_id: usize,
        new_node_id: usize,
        single_linkage_tree: &[SLTNode<T>],
        condensed_tree: &mut CondensedTree<T>,
        visited: &mut [bool],
        lambda_birth: T,
    ) {
        let descendants = self.find_single_linkage_children(single_linkage_tree, node_id);
        for &descendant in &descendants {
            visited[descendant] = true;
        }
        condensed_tree.extend(
            descendants
                .into_iter()
                .filter(|id| self.is_individual_sample(id))
                .map(|id| CondensedNode {
                    node_id: id,
                    parent_node_id: new_node_id,
                    lambda_birth,
                    size: 1,
                }),
        );
    }

    fn extract_winning_clusters(&self, condensed_tree: &CondensedTree<T>) -> Vec<usize> {
        let (lower, upper) = self.get_cluster_id_bounds(condensed_tree);
        let n_clusters = upper - lower;

        let mut stabilities = self.calc_all_stabilities(lower..upper, condensed_tree);
        let mut clusters: HashMap<usize, bool> =
            stabilities.keys().map(|id| (*id, false)).collect();

        for cluster_id in (lower..upper).rev() {
            let stability = stabilities.get(&cluster_id).copied().unwrap_or(T::zero());
            let combined_child_stability = self
                .get_immediate_child_clusters(cluster_id, condensed_tree)
                .iter()
                .map(|node| *stabilities.get(&node.node_id).unwrap_or(&T::zero()))
                .fold(T::zero(), std::ops::Add::add);

            if stability > combined_child_stability {
                clusters.insert(cluster_id, true);

                // If child clusters were already marked as winning clusters reverse
                for node_id in self.find_child_clusters(&cluster_id, condensed_tree) {
                    if let Some(true) = clusters.get(&node_id) {
                        clusters.insert(node_id, false);
                    }
                }
            } else {
                stabilities.insert(cluster_id, combined_child_stability);
            }
        }

        let mut selected_cluster_ids: Vec<usize> = clusters
            .into_iter()
            .filter_map(|(id, selected)| selected.then_some(id))
            .collect();

        if self.hp.epsilon != 0.0 && n_clusters > 0 {
            selected_cluster_ids =
                self.check_cluster_epsilons(selected_cluster_ids, condensed_tree);
        }

        selected_cluster_ids.sort();
        selected_cluster_ids.dedup();
        selected_cluster_ids
    }

    fn get_cluster_id_bounds(&self, condensed_tree: &CondensedTree<T>) -> (usize, usize) {
        // Every sample has one row and so does every cluster below the root, so the
        // largest cluster id is the row count
        let lower = if self.hp.allow_single_cluster {
            self.n_samples
        } else {
            self.n_samples + 1
        };
        (lower, condensed_tree.len() + 1)
    }

    fn calc_all_stabilities(
        &self,
        cluster_id_range: Range<usize>,
        condensed_tree: &CondensedTree<T>,
    ) -> HashMap<usize, T> {
        cluster_id_range
            .map(|cluster_id| (cluster_id, self.calc_stability(cluster_id, condensed_tree)))
            .collect()
    }

    fn calc_stability(&self, cluster_id: usize, condensed_tree: &CondensedTree<T>) -> T {
        let lambda_birth = self.extract_lambda_birth(cluster_id, condensed_tree);
        condensed_tree
            .iter()
            .filter(|node| node.parent_node_id == cluster_id)
            .map(|node| {
                let size = T::from(node.size).unwrap_or(T::one());
                (node.lambda_birth - lambda_birth) * size
            })
            .fold(T::zero(), std::ops::Add::add)
    }

    fn extract_lambda_birth(&self, cluster_id: usize, condensed_tree: &CondensedTree<T>) -> T {
        if self.is_top_cluster(&cluster_id) {
            T::zero()
        } else {
            condensed_tree
                .iter()
                .find(|node| node.node_id == cluster_id)
                .map(|node| node.lambda_birth)
                .unwrap_or(T::zero())
        }
    }

    fn is_top_cluster(&self, cluster_id: &usize) -> bool {
        cluster_id == &self.n_samples
    }

    fn get_immediate_child_clusters<'b>(
        &'b self,
        cluster_id: usize,
        condensed_tree: &'b CondensedTree<T>,
    ) -> Vec<&'b CondensedNode<T>> {
        condensed_tree
            .iter()
            .filter(|node| node.parent_node_id == cluster_id)
            .filter(|node| self.is_cluster(&node.node_id))
            .collect()
    }

    fn get_cluster_size(&self, cluster_id: &usize, condensed_tree: &CondensedTree<T>) -> usize {
        if self.hp.allow_single_cluster && self.is_top_cluster(cluster_id) {
            condensed_tree
                .iter()
                .filter(|node| self.is_cluster(&node.node_id))
                .filter(|node| &node.parent_node_id == cluster_id)
                .map(|node| node.size)
                .sum()
        } else {
            // All other clusters are in the tree with sizes
            condensed_tree
                .iter()
                .find(|node| &node.node_id == cluster_id)
                .map(|node| node.size)
                .unwrap_or(1usize)
        }
    }

    fn find_child_clusters(
        &self,
        root_node_id: &usize,
        condensed_tree: &CondensedTree<T>,
    ) -> Vec<usize> {
        let mut pending = VecDeque::from([*root_node_id]);
        let mut descendants = Vec::new();

        while let Some(parent_id) = pending.pop_front() {
            let children = condensed_tree
                .iter()
                .filter(|node| node.parent_node_id == parent_id && self.is_cluster(&node.node_id))
                .map(|node| node.node_id);
            for child_id in children {
                descendants.push(child_id);
                pending.push_back(child_id);
            }
        }
        descendants
    }

    fn check_cluster_epsilons(
        &self,
        winning_clusters: Vec<usize>,
        condensed_tree: &CondensedTree<T>,
    ) -> Vec<usize> {
        let epsilon = T::from(self.hp.epsilon).unwrap_or(T::zero());
        let mut processed: Vec<usize> = Vec::new();
        let mut winning_epsilon_clusters = Vec::new();

        for cluster_id in winning_clusters.iter() {
            let cluster_epsilon = self.calc_cluster_epsilon(*cluster_id, condensed_tree, epsilon);

            if cluster_epsilon < epsilon {
                if processed.contains(cluster_id) {
                    continue;
                }
                let winning_cluster_id =
                    self.find_higher_node_sufficient_epsilon(*cluster_id, condensed_tree, epsilon);
                winning_epsilon_clusters.push(winning_cluster_id);

                for sub_node in self.find_child_clusters(&winning_cluster_id, condensed_tree) {
                    if sub_node != winning_cluster_id {
                        processed.push(sub_node)
                    }
                }
            } else {
                winning_epsilon_clusters.push(*cluster_id);
            }
        }
        winning_epsilon_clusters
    }

    fn find_higher_node_sufficient_epsilon(
        &self,
        starting_cluster_id: usize,
        condensed_tree: &CondensedTree<T>,
        epsilon: T,
    ) -> usize {
        let mut current_id = starting_cluster_id;
        loop {
            let parent_id = condensed_tree
                .iter()
                .find(|node| node.node_id == current_id)
                .map(|node| node.parent_node_id)
                // The root cluster isn't stored explicitly in the tree
                .unwrap_or(self.n_samples);
            if self.is_top_cluster(&parent_id) {
                return if self.hp.allow_single_cluster {
                    parent_id
                } else {
                    current_id
                };
            }

            let parent_epsilon = self.calc_cluster_epsilon(parent_id, condensed_tree, epsilon);
            if parent_epsilon > epsilon {
                return parent_id;
            }
            current_id = parent_id;
        }
    }

    fn calc_cluster_epsilon(
        &self,
        cluster_id: usize,
        condensed_tree: &CondensedTree<T>,
        epsilon: T,
    ) -> T {
        let cluster_lambda = condensed_tree
            .iter()
            .find(|node| node.node_id == cluster_id)
            .map(|node| node.lambda_birth);
        match cluster_lambda {
            Some(lambda) => T::one() / lambda,
            // Should be unreachable, but set to a value that will skip the cluster
            None => epsilon - T::one(),
        }
    }

    fn label_data(
        &self,
        winning_clusters: &[usize],
        condensed_tree: &CondensedTree<T>,
    ) -> Vec<Option<usize>> {
        // Assume all data points are outliers by default then label the ones in clusters
        let mut labels = vec![None; self.n_samples];
        let n_clusters = winning_clusters.len();

        for (group, cluster_id) in winning_clusters.iter().enumerate() {
            let node_size = self.get_cluster_size(cluster_id, condensed_tree);
            self.find_child_samples(*cluster_id, node_size, n_clusters, condensed_tree)
                .into_iter()
                .for_each(|id| labels[id] = Some(group));
        }
        labels
    }

    fn find_child_samples(
        &self,
        root_node_id: usize,
        node_size: usize,
        n_clusters: usize,
        condensed_tree: &CondensedTree<T>,
    ) -> Vec<usize> {
        let mut process_queue = VecDeque::from([root_node_id]);
        let mut child_nodes = Vec::with_capacity(node_size);

        while let Some(current_node_id) = process_queue.pop_front() {
            for node in condensed_tree {
                // Skip nodes that aren't the child of this one
                if node.parent_node_id != current_node_id {
                    continue;
                }
                // If node is a cluster, then its children need processing
                if self.is_cluster(&node.node_id) {
                    process_queue.push_back(node.node_id);
                    continue;
                }
                // Finally, handle individual data points
                if n_clusters == 1 && self.hp.allow_single_cluster {
                    let lambda_threshold = self.get_lambda_threshold(root_node_id, condensed_tree);
                    let node_lambda = self.extract_lambda_birth(node.node_id, condensed_tree);
                    if node_lambda >= lambda_threshold {
                        child_nodes.push(node.node_id)
                    }
                } else if self.hp.allow_single_cluster && self.is_top_cluster(&current_node_id) {
                    continue;
                } else {
                    child_nodes.push(node.node_id);
                }
            }
        }
        child_nodes
    }

    fn get_lambda_threshold(&self, root_node_id: usize, condensed_tree: &CondensedTree<T>) -> T {
        if self.hp.epsilon == 0.0 {
            condensed_tree
                .iter()
                .filter(|node| node.parent_node_id == root_node_id)
                .map(|node| node.lambda_birth)
                .fold(None, |max: Option<T>, lambda| match max {
                    Some(max_lambda) if max_lambda >= lambda => Some(max_lambda),
                    _ => Some(lambda),
                })
                .unwrap_or(T::zero())
        } else {
            T::from(1.0 / self.hp.epsilon).unwrap_or(T::zero())
        }
    }
}
