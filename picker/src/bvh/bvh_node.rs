use crate::geometry::Aabb;

/// One node of the arena tree. Children are indices into [`Bvh::nodes`],
/// never pointers, so the tree is trivially relocatable.
///
/// [`Bvh::nodes`]: super::Bvh::nodes
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// References one box in the leaf box array.
    Leaf { box_idx: usize },
    /// `bounds` is the union of both subtrees' boxes.
    Internal {
        left: usize,
        right: usize,
        bounds: Aabb,
    },
}

impl BvhNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhNode::Leaf { .. })
    }
}
