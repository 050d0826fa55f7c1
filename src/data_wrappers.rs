/// An edge of the mutual reachability minimum spanning tree.
#[derive(Clone, Debug)]
pub(crate) struct MSTEdge<T> {
    pub(crate) left_node_id: usize,
    pub(crate) right_node_id: usize,
    pub(crate) distance: T,
}

/// A merge of two components in the single linkage tree.
#[derive(Clone, Debug)]
pub(crate) struct SLTNode<T> {
    pub(crate) left_child: usize,
    pub(crate) right_child: usize,
    pub(crate) distance: T,
    pub(crate) size: usize,
}

/// A point or cluster of the condensed tree, born at density `lambda_birth`.
#[derive(Clone, Debug)]
pub(crate) struct CondensedNode<T> {
    pub(crate) node_id: usize,
    pub(crate) parent_node_id: usize,
    pub(crate) lambda_birth: T,
    pub(crate) size: usize,
}
