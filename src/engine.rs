//! The recursive hierarchical partition engine.

use crate::partition::{Partition, Partitioner, Representative};
use crate::synthesizer::Synthesizer;
use crate::validation::DataValidator;
use crate::{ClusterError, ClusterNode, HierarchyParams, Item};
use num_traits::Float;
use tracing::{debug, info, warn};

/// Issues the ids naming the synthetic nodes of one build.
///
/// Ids start at 1 and increase by one per allocation. A build creates a fresh counter and
/// threads it through the depth first recursion, so ids follow a post-order, left to right
/// traversal of the tree and never collide within the build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClusterCounter {
    issued: usize,
}

impl ClusterCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next id.
    pub fn allocate(&mut self) -> usize {
        self.issued += 1;
        self.issued
    }

    /// Number of ids allocated so far.
    pub fn issued(&self) -> usize {
        self.issued
    }
}

/// Builds a cluster tree over an item store by recursively partitioning it.
///
/// # Examples
/// ```
///use photospheres::{HierarchyBuilder, HierarchyParams, Item};
///
///let items: Vec<Item<f32>> = (0..3)
///    .map(|n| Item::new(format!("images/{n}.png"), vec![n as f32, 0.0]))
///    .collect();
///let hp = HierarchyParams::builder().split_threshold(10).build();
///let tree = HierarchyBuilder::new(&items, hp).build().unwrap();
///
///assert_eq!(3, tree.size);
///assert_eq!(3, tree.children.as_ref().unwrap().len());
/// ```
pub struct HierarchyBuilder<'a, T> {
    items: &'a [Item<T>],
    hp: HierarchyParams,
    partitioner: Box<dyn Partitioner<T> + 'a>,
    synthesizer: Option<Box<dyn Synthesizer<T> + 'a>>,
}

impl<'a, T: Float + 'static> HierarchyBuilder<'a, T> {
    /// Creates a builder partitioning with the strategy configured in `hp`, and without a
    /// synthesizer.
    pub fn new(items: &'a [Item<T>], hp: HierarchyParams) -> Self {
        let partitioner = hp.strategy().partitioner(&hp);
        HierarchyBuilder {
            items,
            hp,
            partitioner,
            synthesizer: None,
        }
    }
}

impl<'a, T: Float> HierarchyBuilder<'a, T> {
    /// Replaces the partitioner picked from the configured strategy.
    pub fn with_partitioner(mut self, partitioner: impl Partitioner<T> + 'a) -> Self {
        self.partitioner = Box::new(partitioner);
        self
    }

    /// Sets the synthesizer rendering previews of groups represented by a vector. Without
    /// one, those groups have no preview.
    pub fn with_synthesizer(mut self, synthesizer: impl Synthesizer<T> + 'a) -> Self {
        self.synthesizer = Some(Box::new(synthesizer));
        self
    }

    /// Builds the tree.
    ///
    /// # Returns
    /// * A result that, if successful, contains the unnamed root node. The build only fails on
    ///   invalid input: an empty item store, non-finite values, or mismatched feature or
    ///   location dimensions. Failing partitioners and synthesizers degrade the affected part
    ///   of the tree instead.
    pub fn build(&self) -> Result<ClusterNode, ClusterError> {
        DataValidator::new(self.items).validate_items()?;

        let mut counter = ClusterCounter::new();
        let universe: Vec<usize> = (0..self.items.len()).collect();
        let root = self.build_node(&universe, self.hp.max_depth(), &mut counter);

        info!(
            n_items = self.items.len(),
            n_clusters = counter.issued(),
            depth = root.depth(),
            "built cluster tree"
        );
        Ok(root)
    }

    fn build_node(
        &self,
        subset: &[usize],
        depth_budget: usize,
        counter: &mut ClusterCounter,
    ) -> ClusterNode {
        let members: Vec<&Item<T>> = subset.iter().map(|&n| &self.items[n]).collect();
        let mut node = ClusterNode::new(subset.len());
        node.annotate(&members);

        if subset.is_empty() {
            return node;
        }
        if subset.len() < self.hp.split_threshold() || depth_budget == 0 {
            node.children = Some(self.terminal_leaves(subset));
            return node;
        }

        let Some(partition) = self.partition(&members) else {
            node.children = Some(self.terminal_leaves(subset));
            return node;
        };
        debug!(
            size = subset.len(),
            n_groups = partition.n_groups,
            depth_budget,
            "partitioned subset"
        );

        let mut children = Vec::with_capacity(partition.n_groups);
        for group in 0..partition.n_groups {
            let group_subset: Vec<usize> = partition
                .members(group)
                .into_iter()
                .map(|n| subset[n])
                .collect();
            let mut child = self.build_node(&group_subset, depth_budget - 1, counter);
            let cluster_id = counter.allocate();
            child.name = Some(format!("cluster {cluster_id}"));
            child.preview = self.preview(cluster_id, partition.representative(group), subset);
            children.push(child);
        }
        children.extend(
            partition
                .outliers()
                .into_iter()
                .map(|n| ClusterNode::leaf(&self.items[subset[n]])),
        );

        node.children = Some(children);
        node
    }

    /// Partitions the members of a subset, or returns `None` when the subset cannot be split.
    fn partition(&self, members: &[&Item<T>]) -> Option<Partition<T>> {
        let data: Vec<Vec<T>> = members.iter().map(|item| item.features.clone()).collect();
        let result = self
            .partitioner
            .partition(&data)
            .and_then(|partition| partition.validate(data.len()).map(|_| partition));

        match result {
            Ok(partition) if partition.n_groups >= 2 => Some(partition),
            Ok(partition) => {
                debug!(
                    size = members.len(),
                    n_groups = partition.n_groups,
                    "no real split, expanding into terminal leaves"
                );
                None
            }
            Err(err) => {
                warn!(size = members.len(), "{err}, expanding into terminal leaves");
                None
            }
        }
    }

    fn terminal_leaves(&self, subset: &[usize]) -> Vec<ClusterNode> {
        subset
            .iter()
            .map(|&n| ClusterNode::leaf(&self.items[n]))
            .collect()
    }

    fn preview(
        &self,
        cluster_id: usize,
        representative: Option<&Representative<T>>,
        subset: &[usize],
    ) -> Option<String> {
        match representative? {
            Representative::Exemplar(n) => self.items[subset[*n]].payload.clone(),
            Representative::Vector(vector) => {
                let synthesizer = self.synthesizer.as_ref()?;
                match synthesizer.synthesize(cluster_id, vector) {
                    Ok(reference) => Some(reference),
                    Err(err) => {
                        warn!(cluster_id, "{err}, leaving the preview unset");
                        None
                    }
                }
            }
        }
    }
}

/// Builds the cluster tree of `items` with the strategy configured in `hp` and no synthesizer.
pub fn build<T: Float + 'static>(
    items: &[Item<T>],
    hp: HierarchyParams,
) -> Result<ClusterNode, ClusterError> {
    HierarchyBuilder::new(items, hp).build()
}
