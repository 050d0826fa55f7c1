//! Recursive hierarchical clustering of item collections, typically images, into a navigable
//! tree of clusters suitable for rendering as a zoomable visualization.
//!
//! The engine repeatedly partitions the item store into groups until subsets become smaller
//! than a split threshold or a depth budget runs out, at which point every remaining item
//! becomes a terminal leaf. Every synthetic node gets a sequential name (`"cluster <n>"`), a
//! size, and a preview: either a synthesized rendering of the group's centroid or the payload
//! of a real exemplar item. The tree serializes to deterministic, pretty printed JSON.
//!
//! Partitioning is strategy agnostic. Three strategies are built in:
//!  1. Centroid: k-means with a fixed branching factor;
//!  2. Exemplar: affinity propagation, which picks its own group count and represents each
//!     group with one of its items; and
//!  3. Density: HDBSCAN, which picks its own group count and leaves items in sparse regions
//!     ungrouped, as singleton leaves.
//!
//! Any other [`Partitioner`] can be plugged in with [`HierarchyBuilder::with_partitioner`].
//!
//! # Examples
//! ```
//!use photospheres::{to_json, HierarchyBuilder, HierarchyParams, Item, Strategy};
//!
//!let items: Vec<Item<f32>> = [
//!    [0.0, 0.0], [0.1, 0.2], [0.2, 0.1], [0.1, 0.1], [0.0, 0.2], [0.2, 0.0],
//!    [9.0, 9.0], [9.1, 9.2], [9.2, 9.1], [9.1, 9.1], [9.0, 9.2], [9.2, 9.0],
//!]
//!.iter()
//!.enumerate()
//!.map(|(n, f)| {
//!    let path = format!("images/{n}.png");
//!    Item::new(path.clone(), f.to_vec()).with_payload(path)
//!})
//!.collect();
//!
//!let hp = HierarchyParams::builder()
//!    .strategy(Strategy::Centroid)
//!    .branching_factor(2)
//!    .split_threshold(10)
//!    .seed(42)
//!    .build();
//!let tree = HierarchyBuilder::new(&items, hp).build().unwrap();
//!
//!assert_eq!(12, tree.size);
//!let children = tree.children.as_ref().unwrap();
//!assert_eq!(2, children.len());
//!assert!(children.iter().all(|child| child.size == 6));
//!assert_eq!(Some("cluster 1"), children[0].name.as_deref());
//!
//!let json = to_json(&tree).unwrap();
//!assert!(json.contains("\"name\": \"cluster 2\""));
//! ```

pub use crate::centers::Center;
pub use crate::core_distances::NnAlgorithm;
pub use crate::distance::DistanceMetric;
pub use crate::engine::{build, ClusterCounter, HierarchyBuilder};
pub use crate::error::ClusterError;
pub use crate::hyper_parameters::{HierarchyParams, HyperParamBuilder};
pub use crate::item::Item;
pub use crate::node::ClusterNode;
pub use crate::partition::{
    CentroidPartitioner, DensityParamBuilder, DensityPartitioner, ExemplarPartitioner, Partition,
    Partitioner, Representative, Strategy,
};
pub use crate::serializer::{to_json, write_json};
pub use crate::store::{attach_locations_csv, load_features_csv, load_image_dir};
pub use crate::synthesizer::{CentroidImageWriter, Synthesizer};

mod centers;
mod core_distances;
mod data_wrappers;
mod distance;
mod engine;
mod error;
mod hyper_parameters;
mod item;
mod node;
mod partition;
mod serializer;
mod store;
mod synthesizer;
mod union_find;
mod validation;
