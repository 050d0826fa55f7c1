use crate::{ClusterError, Item};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// One node of the cluster tree.
///
/// Internal nodes carry the items of their subtree through `children`, in group order
/// followed by outliers. A node without `children` is terminal: a leaf for exactly one item,
/// or an empty node (`size` 0) produced when a partitioner hands back an empty group.
///
/// Field order is the key order of the serialized tree. Unset optional fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    pub size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ClusterNode>>,
}

impl ClusterNode {
    /// Creates an unnamed node of `size` items with no children.
    pub fn new(size: usize) -> Self {
        ClusterNode {
            name: None,
            preview: None,
            size,
            x: None,
            y: None,
            radius: None,
            children: None,
        }
    }

    /// Creates the terminal leaf of `item`, named after the basename of its identifier and
    /// previewed by its own payload.
    pub fn leaf<T: Float>(item: &Item<T>) -> Self {
        let mut leaf = ClusterNode::new(1);
        leaf.name = Some(item.label());
        leaf.preview = item.payload.clone();
        leaf.annotate(&[item]);
        leaf
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Number of edges on the longest path from this node down to a terminal node.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .flatten()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Sum of the sizes of all terminal nodes below (or at) this node.
    pub fn leaf_count(&self) -> usize {
        match &self.children {
            Some(children) => children.iter().map(ClusterNode::leaf_count).sum(),
            None => self.size,
        }
    }

    /// Sets `x`, `y` and `radius` from the locations of `items`. Nothing is set unless every
    /// item has a location.
    pub(crate) fn annotate<T: Float>(&mut self, items: &[&Item<T>]) {
        if let Some((x, y, radius)) = spatial_extent(items) {
            self.x = Some(x);
            self.y = Some(y);
            self.radius = Some(radius);
        }
    }

    /// Checks the tree invariants the serialized form relies on: every internal node has
    /// children whose sizes sum to its own, every terminal node holds at most one item, and
    /// all spatial attributes are finite.
    pub fn check_sizes(&self) -> Result<(), ClusterError> {
        for (attribute, value) in [("x", self.x), ("y", self.y), ("radius", self.radius)] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(ClusterError::Serialization(format!(
                    "{} has a non finite {attribute}",
                    self.describe()
                )));
            }
        }
        match &self.children {
            Some(children) if children.is_empty() => Err(ClusterError::Serialization(format!(
                "{} has an empty children list",
                self.describe()
            ))),
            Some(children) => {
                let total: usize = children.iter().map(|child| child.size).sum();
                if total != self.size {
                    return Err(ClusterError::Serialization(format!(
                        "{} has size {} but its children sum to {total}",
                        self.describe(),
                        self.size
                    )));
                }
                children.iter().try_for_each(ClusterNode::check_sizes)
            }
            None if self.size > 1 => Err(ClusterError::Serialization(format!(
                "terminal {} holds {} items",
                self.describe(),
                self.size
            ))),
            None => Ok(()),
        }
    }

    fn describe(&self) -> String {
        match &self.name {
            Some(name) => format!("node `{name}`"),
            None => String::from("unnamed node"),
        }
    }
}

/// Mean location of `items` and the largest Euclidean distance from it to any of them.
fn spatial_extent<T: Float>(items: &[&Item<T>]) -> Option<(f64, f64, f64)> {
    if items.is_empty() {
        return None;
    }
    let locations = items
        .iter()
        .map(|item| {
            let [x, y] = item.location?;
            Some((x.to_f64()?, y.to_f64()?))
        })
        .collect::<Option<Vec<(f64, f64)>>>()?;

    let n = locations.len() as f64;
    let x = locations.iter().map(|(x, _)| x).sum::<f64>() / n;
    let y = locations.iter().map(|(_, y)| y).sum::<f64>() / n;
    let radius = locations
        .iter()
        .map(|(lx, ly)| ((lx - x).powi(2) + (ly - y).powi(2)).sqrt())
        .fold(0.0, f64::max);
    Some((x, y, radius))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn internal(children: Vec<ClusterNode>) -> ClusterNode {
        let mut node = ClusterNode::new(children.iter().map(|c| c.size).sum());
        node.children = Some(children);
        node
    }

    #[test]
    fn leaf_takes_label_payload_and_location() {
        let item = Item::new("photos/dog.jpg", vec![0.0_f32])
            .with_payload("photos/dog.jpg")
            .with_location(2.0, -1.0);
        let leaf = ClusterNode::leaf(&item);

        assert_eq!(Some("dog.jpg".to_string()), leaf.name);
        assert_eq!(Some("photos/dog.jpg".to_string()), leaf.preview);
        assert_eq!(1, leaf.size);
        assert_eq!((Some(2.0), Some(-1.0), Some(0.0)), (leaf.x, leaf.y, leaf.radius));
        assert!(leaf.is_leaf());
    }

    #[test]
    fn spatial_extent_is_mean_and_max_distance() {
        let items = [
            Item::new("a", vec![0.0_f64]).with_location(0.0, 0.0),
            Item::new("b", vec![0.0_f64]).with_location(4.0, 0.0),
            Item::new("c", vec![0.0_f64]).with_location(2.0, 3.0),
            Item::new("d", vec![0.0_f64]).with_location(2.0, -3.0),
        ];
        let refs: Vec<&Item<f64>> = items.iter().collect();
        let (x, y, radius) = spatial_extent(&refs).unwrap();
        assert_eq!((2.0, 0.0), (x, y));
        assert!((radius - 3.0).abs() < 1e-12);
    }

    #[test]
    fn partial_locations_leave_node_unannotated() {
        let items = [
            Item::new("a", vec![0.0_f32]).with_location(1.0, 1.0),
            Item::new("b", vec![0.0_f32]),
        ];
        let mut node = ClusterNode::new(2);
        node.annotate(&items.iter().collect::<Vec<_>>());
        assert_eq!((None, None, None), (node.x, node.y, node.radius));
    }

    #[test]
    fn depth_and_leaf_count() {
        let leaf = || ClusterNode::leaf(&Item::new("x", vec![1.0_f32]));
        let tree = internal(vec![internal(vec![leaf(), leaf()]), leaf()]);
        assert_eq!(2, tree.depth());
        assert_eq!(3, tree.leaf_count());
        assert!(tree.check_sizes().is_ok());
    }

    #[test]
    fn check_sizes_rejects_broken_trees() {
        let leaf = || ClusterNode::leaf(&Item::new("x", vec![1.0_f32]));

        let mut wrong_sum = internal(vec![leaf(), leaf()]);
        wrong_sum.size = 3;
        assert!(matches!(
            wrong_sum.check_sizes(),
            Err(ClusterError::Serialization(..))
        ));

        let fat_leaf = ClusterNode::new(2);
        assert!(fat_leaf.check_sizes().is_err());

        let mut non_finite = leaf();
        non_finite.radius = Some(f64::NAN);
        assert!(internal(vec![non_finite]).check_sizes().is_err());

        let mut hollow = ClusterNode::new(0);
        hollow.children = Some(Vec::new());
        assert!(hollow.check_sizes().is_err());

        assert!(ClusterNode::new(0).check_sizes().is_ok());
    }
}
