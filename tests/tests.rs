use photospheres::{
    build, to_json, CentroidImageWriter, ClusterError, ClusterNode, HierarchyBuilder,
    HierarchyParams, Item, Partition, Partitioner, Representative, Strategy, Synthesizer,
};
use rand::prelude::*;
use std::collections::HashSet;

/// Partitioner driven by a closure, for scripting exact engine inputs.
struct Scripted<F>(F);

fn scripted<F>(f: F) -> Scripted<F>
where
    F: Fn(&[Vec<f64>]) -> Result<Partition<f64>, ClusterError>,
{
    Scripted(f)
}

impl<F> Partitioner<f64> for Scripted<F>
where
    F: Fn(&[Vec<f64>]) -> Result<Partition<f64>, ClusterError>,
{
    fn partition(&self, data: &[Vec<f64>]) -> Result<Partition<f64>, ClusterError> {
        (self.0)(data)
    }
}

/// Splits every subset into its first and second half, represented by their first items.
fn halves(data: &[Vec<f64>]) -> Result<Partition<f64>, ClusterError> {
    let mid = data.len() / 2;
    let labels = (0..data.len()).map(|n| Some(usize::from(n >= mid))).collect();
    Ok(Partition::new(
        2,
        labels,
        Some(vec![Representative::Exemplar(0), Representative::Exemplar(mid)]),
    ))
}

/// Synthesizer naming previews after the cluster id and first component, failing on id 2.
struct Naming;

impl Synthesizer<f64> for Naming {
    fn synthesize(
        &self,
        cluster_id: usize,
        representative: &[f64],
    ) -> Result<String, ClusterError> {
        if cluster_id == 2 {
            return Err(ClusterError::SynthesisFailure(String::from("disk full")));
        }
        Ok(format!("centroid-{cluster_id}-{}", representative[0]))
    }
}

fn item(n: usize, features: Vec<f64>) -> Item<f64> {
    let path = format!("images/{n}.png");
    Item::new(path.clone(), features).with_payload(path)
}

fn numbered_items(n: usize) -> Vec<Item<f64>> {
    (0..n).map(|i| item(i, vec![i as f64, 0.0])).collect()
}

/// Noisy points around five well separated centres.
fn scattered_items(n: usize, seed: u64) -> Vec<Item<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centres = [[0.0, 0.0], [10.0, 0.0], [0.0, 10.0], [10.0, 10.0], [5.0, 20.0]];
    (0..n)
        .map(|i| {
            let [cx, cy] = centres[i % centres.len()];
            let features = vec![
                cx + rng.random_range(-1.5..1.5),
                cy + rng.random_range(-1.5..1.5),
            ];
            item(i, features)
        })
        .collect()
}

fn two_identical_blobs() -> Vec<Item<f64>> {
    (0..12)
        .map(|i| {
            let v = if i < 6 { 0.0 } else { 10.0 };
            item(i, vec![v, v])
        })
        .collect()
}

fn all_nodes(root: &ClusterNode) -> Vec<&ClusterNode> {
    let mut nodes = vec![root];
    let mut n = 0;
    while n < nodes.len() {
        let node: &ClusterNode = nodes[n];
        if let Some(children) = &node.children {
            nodes.extend(children.iter());
        }
        n += 1;
    }
    nodes
}

fn leaf_names(root: &ClusterNode) -> Vec<String> {
    all_nodes(root)
        .into_iter()
        .filter(|node| node.is_leaf() && node.size == 1)
        .filter_map(|node| node.name.clone())
        .collect()
}

fn children(node: &ClusterNode) -> &[ClusterNode] {
    node.children.as_deref().unwrap_or_default()
}

fn is_partitioned(node: &ClusterNode) -> bool {
    children(node)
        .iter()
        .any(|child| !child.is_leaf() || child.size != 1)
}

#[test]
fn tree_properties_hold_for_every_strategy() {
    let items = scattered_items(120, 3);
    for strategy in Strategy::ALL {
        let hp = HierarchyParams::builder()
            .strategy(strategy)
            .branching_factor(3)
            .split_threshold(8)
            .max_depth(3)
            .seed(11)
            .build();
        let tree = build(&items, hp).unwrap();

        // Exhaustiveness: every item lands in exactly one leaf
        assert_eq!(items.len(), tree.size, "{strategy}");
        assert_eq!(items.len(), tree.leaf_count(), "{strategy}");
        let names = leaf_names(&tree);
        assert_eq!(items.len(), names.len(), "{strategy}");
        assert_eq!(items.len(), names.iter().collect::<HashSet<_>>().len(), "{strategy}");

        // Size consistency
        assert!(tree.check_sizes().is_ok(), "{strategy}");

        // Depth bound
        assert!(tree.depth() <= 3 + 1, "{strategy}");

        // Threshold bound
        for node in all_nodes(&tree).into_iter().filter(|n| is_partitioned(n)) {
            assert!(node.size >= 8, "{strategy}: partitioned node of size {}", node.size);
        }
    }
}

#[test]
fn seeded_builds_are_byte_identical() {
    let items = scattered_items(60, 5);
    for strategy in Strategy::ALL {
        let hp = HierarchyParams::builder()
            .strategy(strategy)
            .branching_factor(4)
            .split_threshold(6)
            .seed(99)
            .build();
        let first = to_json(&build(&items, hp.clone()).unwrap()).unwrap();
        let second = to_json(&build(&items, hp).unwrap()).unwrap();
        assert_eq!(first, second, "{strategy}");
    }
}

#[test]
fn two_blobs_split_into_two_clusters_of_leaves() {
    let items = two_identical_blobs();
    let hp = HierarchyParams::builder()
        .strategy(Strategy::Centroid)
        .branching_factor(2)
        .split_threshold(5)
        .max_depth(3)
        .seed(7)
        .build();
    let tree = build(&items, hp).unwrap();

    assert_eq!(12, tree.size);
    assert_eq!(None, tree.name);
    let clusters = children(&tree);
    assert_eq!(2, clusters.len());
    for (n, cluster) in clusters.iter().enumerate() {
        assert_eq!(6, cluster.size);
        assert_eq!(Some(format!("cluster {}", n + 1)), cluster.name);
        let leaves = children(cluster);
        assert_eq!(6, leaves.len());
        assert!(leaves.iter().all(|leaf| leaf.is_leaf() && leaf.size == 1));
    }
}

#[test]
fn small_store_expands_root_into_leaves() {
    let items = numbered_items(3);
    let hp = HierarchyParams::builder().split_threshold(10).build();
    let tree = build(&items, hp).unwrap();

    assert_eq!(3, tree.size);
    assert_eq!(None, tree.name);
    assert_eq!(None, tree.preview);
    let leaves = children(&tree);
    assert_eq!(3, leaves.len());
    for (n, leaf) in leaves.iter().enumerate() {
        assert!(leaf.is_leaf());
        assert_eq!(1, leaf.size);
        assert_eq!(Some(format!("{n}.png")), leaf.name);
        assert_eq!(Some(format!("images/{n}.png")), leaf.preview);
    }
}

#[test]
fn single_group_partition_falls_back_to_leaves() {
    let items = numbered_items(50);
    let one_group = scripted(|data: &[Vec<f64>]| {
        Ok(Partition::new(1, vec![Some(0); data.len()], None))
    });
    let tree = HierarchyBuilder::new(&items, HierarchyParams::default())
        .with_partitioner(one_group)
        .build()
        .unwrap();

    assert_eq!(50, tree.size);
    assert_eq!(50, children(&tree).len());
    assert!(children(&tree).iter().all(ClusterNode::is_leaf));
    assert_eq!(1, tree.depth());
}

#[test]
fn failing_or_malformed_partitions_fall_back_to_leaves() {
    let items = numbered_items(20);
    let failing = scripted(|_: &[Vec<f64>]| {
        Err(ClusterError::PartitionFailure(String::from("did not converge")))
    });
    let tree = HierarchyBuilder::new(&items, HierarchyParams::default())
        .with_partitioner(failing)
        .build()
        .unwrap();
    assert_eq!(20, children(&tree).len());

    let short_labels =
        scripted(|_: &[Vec<f64>]| Ok(Partition::new(2, vec![Some(0), Some(1)], None)));
    let tree = HierarchyBuilder::new(&items, HierarchyParams::default())
        .with_partitioner(short_labels)
        .build()
        .unwrap();
    assert_eq!(20, children(&tree).len());
    assert!(children(&tree).iter().all(ClusterNode::is_leaf));
}

#[test]
fn outliers_follow_groups_as_leaves() {
    let items = numbered_items(6);
    let with_outliers = scripted(|data: &[Vec<f64>]| {
        assert_eq!(6, data.len());
        Ok(Partition::new(
            2,
            vec![Some(1), Some(0), None, Some(0), Some(1), None],
            None,
        ))
    });
    let hp = HierarchyParams::builder().split_threshold(4).build();
    let tree = HierarchyBuilder::new(&items, hp)
        .with_partitioner(with_outliers)
        .build()
        .unwrap();

    let nodes = children(&tree);
    let names: Vec<Option<&str>> = nodes.iter().map(|node| node.name.as_deref()).collect();
    assert_eq!(
        vec![Some("cluster 1"), Some("cluster 2"), Some("2.png"), Some("5.png")],
        names
    );
    assert_eq!(vec!["1.png", "3.png"], leaf_names(&nodes[0]));
    assert_eq!(vec!["0.png", "4.png"], leaf_names(&nodes[1]));
    assert!(tree.check_sizes().is_ok());
}

#[test]
fn empty_group_becomes_an_empty_node() {
    let items = numbered_items(10);
    let sparse = scripted(|data: &[Vec<f64>]| {
        let labels = (0..data.len()).map(|n| Some(n % 2)).collect();
        Ok(Partition::new(3, labels, None))
    });
    let hp = HierarchyParams::builder().split_threshold(6).build();
    let tree = HierarchyBuilder::new(&items, hp)
        .with_partitioner(sparse)
        .build()
        .unwrap();

    let nodes = children(&tree);
    assert_eq!(3, nodes.len());
    assert_eq!((5, 5, 0), (nodes[0].size, nodes[1].size, nodes[2].size));
    assert_eq!(Some("cluster 3".to_string()), nodes[2].name);
    assert!(nodes[2].children.is_none());

    let json = to_json(&tree).unwrap();
    assert!(json.contains("\"name\": \"cluster 3\",\n      \"size\": 0\n"));
}

#[test]
fn cluster_ids_follow_post_order() {
    let items = numbered_items(8);
    let hp = HierarchyParams::builder().split_threshold(4).max_depth(3).build();
    let tree = HierarchyBuilder::new(&items, hp)
        .with_partitioner(scripted(halves))
        .build()
        .unwrap();

    let names = |node: &ClusterNode| -> Vec<String> {
        children(node).iter().filter_map(|c| c.name.clone()).collect()
    };
    assert_eq!(vec!["cluster 3", "cluster 6"], names(&tree));
    assert_eq!(vec!["cluster 1", "cluster 2"], names(&children(&tree)[0]));
    assert_eq!(vec!["cluster 4", "cluster 5"], names(&children(&tree)[1]));
}

#[test]
fn exemplar_previews_pass_item_payloads_through() {
    let items = numbered_items(8);
    let hp = HierarchyParams::builder().split_threshold(4).max_depth(3).build();
    let tree = HierarchyBuilder::new(&items, hp)
        .with_partitioner(scripted(halves))
        .build()
        .unwrap();

    let nodes = children(&tree);
    assert_eq!(Some("images/0.png"), nodes[0].preview.as_deref());
    assert_eq!(Some("images/4.png"), nodes[1].preview.as_deref());
    let grandchildren = children(&nodes[1]);
    assert_eq!(Some("images/4.png"), grandchildren[0].preview.as_deref());
    assert_eq!(Some("images/6.png"), grandchildren[1].preview.as_deref());
}

#[test]
fn depth_budget_turns_remaining_subsets_into_leaves() {
    let items = numbered_items(16);
    let hp = HierarchyParams::builder().split_threshold(1).max_depth(2).build();
    let tree = HierarchyBuilder::new(&items, hp)
        .with_partitioner(scripted(halves))
        .build()
        .unwrap();

    assert_eq!(3, tree.depth());
    assert_eq!(16, tree.leaf_count());
    let deepest: Vec<&ClusterNode> = children(&tree).iter().flat_map(children).collect();
    assert_eq!(4, deepest.len());
    for node in deepest {
        assert_eq!(4, node.size);
        assert!(node.name.is_some());
        let leaves = children(node);
        assert_eq!(4, leaves.len());
        assert!(leaves.iter().all(|leaf| leaf.is_leaf() && leaf.size == 1));
    }
}

#[test]
fn duplicate_images_fall_back_to_leaves_under_exemplar() {
    let items: Vec<Item<f64>> = (0..20)
        .map(|i| {
            let v = if i < 10 { 1.0 } else { 50.0 };
            item(i, vec![v, v])
        })
        .collect();
    let hp = HierarchyParams::builder()
        .strategy(Strategy::Exemplar)
        .split_threshold(5)
        .build();
    let tree = build(&items, hp).unwrap();

    assert_eq!(20, tree.size);
    let leaves = children(&tree);
    assert_eq!(20, leaves.len());
    assert!(leaves.iter().all(|leaf| leaf.is_leaf() && leaf.size == 1));
}

#[test]
fn vector_previews_come_from_the_synthesizer() {
    let items = numbered_items(12);
    let with_centroids = scripted(|data: &[Vec<f64>]| {
        let labels = (0..data.len()).map(|n| Some(n % 3)).collect();
        let centroids = (0..3)
            .map(|group| Representative::Vector(vec![group as f64 * 10.0]))
            .collect();
        Ok(Partition::new(3, labels, Some(centroids)))
    });
    let hp = HierarchyParams::builder().split_threshold(10).build();

    let tree = HierarchyBuilder::new(&items, hp.clone())
        .with_partitioner(with_centroids)
        .with_synthesizer(Naming)
        .build()
        .unwrap();
    let previews: Vec<Option<&str>> = children(&tree)
        .iter()
        .map(|node| node.preview.as_deref())
        .collect();
    // The failing synthesis only leaves its own preview unset
    assert_eq!(vec![Some("centroid-1-0"), None, Some("centroid-3-20")], previews);

    let with_centroids = scripted(|data: &[Vec<f64>]| {
        let labels = (0..data.len()).map(|n| Some(n % 2)).collect();
        let centroids = vec![
            Representative::Vector(vec![0.0]),
            Representative::Vector(vec![1.0]),
        ];
        Ok(Partition::new(2, labels, Some(centroids)))
    });
    let tree = HierarchyBuilder::new(&items, hp)
        .with_partitioner(with_centroids)
        .build()
        .unwrap();
    assert!(children(&tree).iter().all(|node| node.preview.is_none()));
}

#[test]
fn density_outliers_become_singleton_leaves() {
    let data = [
        [1.5, 2.2],
        [1.0, 1.1],
        [1.2, 1.4],
        [0.8, 1.0],
        [1.1, 1.0],
        [3.7, 4.0],
        [3.9, 3.9],
        [3.6, 4.1],
        [3.8, 3.9],
        [4.0, 4.1],
        [10.0, 10.0],
    ];
    let items: Vec<Item<f64>> = data
        .iter()
        .enumerate()
        .map(|(n, features)| item(n, features.to_vec()))
        .collect();
    let hp = HierarchyParams::builder()
        .strategy(Strategy::Density)
        .split_threshold(5)
        .build();
    let tree = build(&items, hp).unwrap();

    let nodes = children(&tree);
    assert_eq!(3, nodes.len());
    assert_eq!((5, 5, 1), (nodes[0].size, nodes[1].size, nodes[2].size));
    assert_eq!(Some("10.png"), nodes[2].name.as_deref());
    assert!(nodes[2].is_leaf());
    assert!(nodes[..2].iter().all(|node| children(node).len() == 5));
}

#[test]
fn exemplar_strategy_previews_a_member_of_each_group() {
    let data = [
        [1.0, 1.0],
        [1.2, 0.9],
        [0.8, 1.1],
        [1.1, 1.3],
        [0.9, 0.8],
        [8.0, 8.0],
        [8.3, 7.9],
        [7.8, 8.2],
        [8.1, 8.4],
        [7.9, 7.7],
    ];
    let items: Vec<Item<f64>> = data
        .iter()
        .enumerate()
        .map(|(n, features)| item(n, features.to_vec()))
        .collect();
    let hp = HierarchyParams::builder()
        .strategy(Strategy::Exemplar)
        .split_threshold(6)
        .build();
    let tree = build(&items, hp).unwrap();

    let nodes = children(&tree);
    assert_eq!(2, nodes.len());
    for node in nodes {
        assert_eq!(5, node.size);
        let preview = node.preview.as_deref().unwrap();
        let basename = preview.trim_start_matches("images/");
        assert!(leaf_names(node).iter().any(|name| name == basename));
    }
}

#[test]
fn centroid_previews_are_written_as_images() {
    let dir = tempfile::tempdir().unwrap();
    let dark = vec![10.0_f32; 6];
    let bright = vec![200.0_f32; 6];
    let items: Vec<Item<f32>> = (0..6)
        .map(|n| {
            let features = if n < 3 { dark.clone() } else { bright.clone() };
            Item::new(format!("{n}.png"), features)
        })
        .collect();
    let hp = HierarchyParams::builder()
        .branching_factor(2)
        .split_threshold(3)
        .seed(1)
        .build();
    let writer = CentroidImageWriter::new(dir.path(), "kmeans-centroid", 2, 1);
    let tree = HierarchyBuilder::new(&items, hp)
        .with_synthesizer(writer)
        .build()
        .unwrap();

    let mut first_pixels = HashSet::new();
    for (n, node) in children(&tree).iter().enumerate() {
        let preview = node.preview.as_deref().unwrap();
        assert!(preview.ends_with(&format!("kmeans-centroid-{}.png", n + 1)));
        let raster = image::open(preview).unwrap().to_rgb8();
        first_pixels.insert(raster.get_pixel(0, 0).0);
    }
    let expected: HashSet<[u8; 3]> = [[10, 10, 10], [200, 200, 200]].into_iter().collect();
    assert_eq!(expected, first_pixels);
}

#[test]
fn locations_annotate_every_node() {
    let items: Vec<Item<f64>> = [[0.0, 0.0], [6.0, 0.0], [0.0, 8.0], [6.0, 8.0]]
        .iter()
        .enumerate()
        .map(|(n, [x, y])| item(n, vec![n as f64]).with_location(*x, *y))
        .collect();
    let tree = build(&items, HierarchyParams::default()).unwrap();

    assert_eq!((Some(3.0), Some(4.0)), (tree.x, tree.y));
    assert_eq!(Some(5.0), tree.radius);
    let leaf = &children(&tree)[3];
    assert_eq!((Some(6.0), Some(8.0), Some(0.0)), (leaf.x, leaf.y, leaf.radius));

    let json = to_json(&tree).unwrap();
    let expected_head = "{\n  \"size\": 4,\n  \"x\": 3.0,\n  \"y\": 4.0,\n  \"radius\": 5.0,";
    assert!(json.starts_with(expected_head));
}

#[test]
fn input_errors_abort_the_build() {
    let empty: Vec<Item<f64>> = Vec::new();
    assert!(matches!(
        build(&empty, HierarchyParams::default()),
        Err(ClusterError::EmptyItemStore)
    ));

    let mismatched = vec![item(0, vec![1.0, 2.0]), item(1, vec![1.0])];
    assert!(matches!(
        build(&mismatched, HierarchyParams::default()),
        Err(ClusterError::WrongDimension(..))
    ));

    let non_finite = vec![item(0, vec![1.0]), item(1, vec![f64::NAN])];
    assert!(matches!(
        build(&non_finite, HierarchyParams::default()),
        Err(ClusterError::NonFiniteCoordinate(..))
    ));

    let partly_located = vec![item(0, vec![1.0]).with_location(0.0, 0.0), item(1, vec![2.0])];
    let result = build(&partly_located, HierarchyParams::default());
    assert!(result.as_ref().is_err_and(ClusterError::is_input_error));
}
