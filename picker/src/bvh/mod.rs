use ordered_float::OrderedFloat;
use tracing::info;

use crate::geometry::{Aabb, Ray};

pub mod bvh_node;
pub use bvh_node::BvhNode;

/// A binary bounding volume hierarchy over a set of leaf boxes, one per
/// mesh face (leaf box `i` corresponds to face `i`). Built once at mesh
/// load and immutable afterwards; rebuilding means constructing a new one.
pub struct Bvh {
    leaf_boxes: Vec<Aabb>,
    nodes: Vec<BvhNode>,
}

impl Bvh {
    /// Builds the tree by recursively median-splitting the leaf indices on
    /// the longest axis of their union box. Zero boxes produce an empty
    /// tree. The index buffer is partitioned in place; ordering among boxes
    /// with equal centers on the split axis is unspecified.
    pub fn new(leaf_boxes: Vec<Aabb>) -> Self {
        let mut nodes = Vec::new();
        if !leaf_boxes.is_empty() {
            nodes.reserve(leaf_boxes.len() * 2 - 1);
            let mut indices = (0..leaf_boxes.len()).collect::<Vec<_>>();
            build_node(&mut nodes, &leaf_boxes, &mut indices);
            info!("Built BVH {{ node_count: {} }}", nodes.len());
        }

        Self { leaf_boxes, nodes }
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_boxes.len()
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Depth-first query. At each leaf whose box the ray hits, `callback`
    /// decides whether to stop with that leaf (`true`) or keep searching
    /// (`false`). Subtrees whose bounds the ray misses are pruned. The left
    /// child is always visited first and the first accepted leaf
    /// short-circuits the walk, so callers needing a strict nearest match
    /// must always return `false` and track the minimum themselves.
    pub fn intersect(&self, ray: &Ray, mut callback: impl FnMut(usize) -> bool) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }

        // The root is always the last node appended.
        self.intersect_node(self.nodes.len() - 1, ray, &mut callback)
    }

    fn intersect_node<F: FnMut(usize) -> bool>(
        &self,
        node_idx: usize,
        ray: &Ray,
        callback: &mut F,
    ) -> Option<usize> {
        match &self.nodes[node_idx] {
            BvhNode::Leaf { box_idx } => {
                let hit = self.leaf_boxes[*box_idx].intersect(ray).is_some() && callback(*box_idx);
                hit.then_some(*box_idx)
            }
            BvhNode::Internal {
                left,
                right,
                bounds,
            } => {
                if bounds.intersect(ray).is_none() {
                    return None;
                }

                if let Some(leaf) = self.intersect_node(*left, ray, callback) {
                    return Some(leaf);
                }
                self.intersect_node(*right, ray, callback)
            }
        }
    }

    /// Bounds of every internal node, for debug visualization only.
    pub fn internal_boxes(&self) -> Vec<Aabb> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                BvhNode::Internal { bounds, .. } => Some(*bounds),
                BvhNode::Leaf { .. } => None,
            })
            .collect()
    }
}

/// Appends the subtree covering `indices` and returns its root's arena
/// index, so the overall root ends up last in the arena.
fn build_node(nodes: &mut Vec<BvhNode>, leaf_boxes: &[Aabb], indices: &mut [usize]) -> usize {
    if let [index] = indices {
        nodes.push(BvhNode::Leaf { box_idx: *index });
        return nodes.len() - 1;
    }

    let bounds = Aabb::union_all(indices.iter().map(|&i| leaf_boxes[i]));
    let split_axis = bounds.max_axis();
    let mid = indices.len() / 2;
    indices.select_nth_unstable_by_key(mid, |&i| OrderedFloat(leaf_boxes[i].center()[split_axis]));

    let (left_indices, right_indices) = indices.split_at_mut(mid);
    let left = build_node(nodes, leaf_boxes, left_indices);
    let right = build_node(nodes, leaf_boxes, right_indices);

    nodes.push(BvhNode::Internal {
        left,
        right,
        bounds,
    });
    nodes.len() - 1
}
