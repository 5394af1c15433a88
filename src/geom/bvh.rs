//! Bounding volume hierarchy used for two kinds of lookups in the network
//! builder: k-nearest intersection points while stitching chains, and
//! parameter-space box overlap while looking for chain crossings.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::{BBox, Point3};

#[derive(Debug, Clone, Copy)]
struct BvhNode {
    bbox: BBox,
    left: u32,
    right: u32,
    start: u32,
    count: u32,
}

impl BvhNode {
    const fn leaf(bbox: BBox, start: u32, count: u32) -> Self {
        Self {
            bbox,
            left: u32::MAX,
            right: u32::MAX,
            start,
            count,
        }
    }

    const fn inner(bbox: BBox, left: u32, right: u32) -> Self {
        Self {
            bbox,
            left,
            right,
            start: 0,
            count: 0,
        }
    }

    const fn is_leaf(self) -> bool {
        self.count != 0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Bvh {
    nodes: Vec<BvhNode>,
    prim_indices: Vec<u32>,
}

impl Bvh {
    const DEFAULT_LEAF_SIZE: usize = 8;

    #[must_use]
    pub(crate) fn build(bboxes: &[BBox]) -> Option<Self> {
        Self::build_with_leaf_size(bboxes, Self::DEFAULT_LEAF_SIZE)
    }

    #[must_use]
    pub(crate) fn build_with_leaf_size(bboxes: &[BBox], leaf_size: usize) -> Option<Self> {
        if bboxes.is_empty() {
            return None;
        }

        let leaf_size = leaf_size.clamp(1, 256);
        let prim_indices: Vec<u32> = (0..(bboxes.len() as u32)).collect();
        let nodes = Vec::with_capacity(bboxes.len().saturating_mul(2));

        let mut bvh = Self { nodes, prim_indices };
        bvh.build_node(bboxes, 0, bboxes.len(), leaf_size);
        Some(bvh)
    }

    fn build_node(&mut self, bboxes: &[BBox], start: usize, end: usize, leaf_size: usize) -> u32 {
        let node_index = self.nodes.len() as u32;
        let seed_bbox = bboxes[self.prim_indices[start] as usize];
        self.nodes.push(BvhNode::leaf(seed_bbox, 0, 0));

        let bbox = self.range_bbox(bboxes, start, end);
        let count = end - start;

        if count <= leaf_size {
            self.nodes[node_index as usize] = BvhNode::leaf(bbox, start as u32, count as u32);
            return node_index;
        }

        let axis = self.choose_split_axis(bboxes, start, end);
        let mid = start + count / 2;
        self.prim_indices[start..end].select_nth_unstable_by(mid - start, |a, b| {
            let ca = centroid_component(bboxes[*a as usize], axis);
            let cb = centroid_component(bboxes[*b as usize], axis);
            ca.total_cmp(&cb)
        });

        let left = self.build_node(bboxes, start, mid, leaf_size);
        let right = self.build_node(bboxes, mid, end, leaf_size);
        self.nodes[node_index as usize] = BvhNode::inner(bbox, left, right);
        node_index
    }

    fn range_bbox(&self, bboxes: &[BBox], start: usize, end: usize) -> BBox {
        self.prim_indices[(start + 1)..end]
            .iter()
            .fold(bboxes[self.prim_indices[start] as usize], |acc, &idx| {
                acc.union(bboxes[idx as usize])
            })
    }

    fn choose_split_axis(&self, bboxes: &[BBox], start: usize, end: usize) -> u8 {
        let centers = self.prim_indices[start..end]
            .iter()
            .map(|&idx| bboxes[idx as usize].center());
        let mut extent = BBox::from_point(bboxes[self.prim_indices[start] as usize].center());
        for c in centers {
            extent = extent.expand_point(c);
        }

        let ex = extent.max.x - extent.min.x;
        let ey = extent.max.y - extent.min.y;
        let ez = extent.max.z - extent.min.z;

        if ex >= ey && ex >= ez {
            0
        } else if ey >= ez {
            1
        } else {
            2
        }
    }

    /// Builds a hierarchy over bare points (one degenerate box each).
    #[must_use]
    pub(crate) fn build_points(points: &[Point3]) -> Option<Self> {
        let boxes: Vec<BBox> = points.iter().copied().map(BBox::from_point).collect();
        Self::build(&boxes)
    }

    pub(crate) fn query_bbox<F>(&self, query: BBox, mut visit: F)
    where
        F: FnMut(usize) -> bool,
    {
        if self.nodes.is_empty() {
            return;
        }

        let mut stack = Vec::new();
        stack.push(0u32);

        while let Some(node_idx) = stack.pop() {
            let node = self.nodes[node_idx as usize];
            if !node.bbox.intersects(query) {
                continue;
            }

            if node.is_leaf() {
                let start = node.start as usize;
                let end = start + node.count as usize;
                for &prim in &self.prim_indices[start..end] {
                    if !visit(prim as usize) {
                        return;
                    }
                }
                continue;
            }

            stack.push(node.left);
            stack.push(node.right);
        }
    }

    /// The `k` primitives closest to `point`, nearest first.
    ///
    /// `distance_to_prim` returns the squared distance to a primitive, or `None`
    /// to exclude it. Primitives farther than `max_dist2` are never reported.
    /// Ties keep traversal order so repeated queries are deterministic.
    pub(crate) fn nearest_k<F>(
        &self,
        point: Point3,
        k: usize,
        max_dist2: f64,
        mut distance_to_prim: F,
    ) -> Vec<(usize, f64)>
    where
        F: FnMut(usize) -> Option<f64>,
    {
        let mut best: Vec<(usize, f64)> = Vec::with_capacity(k.saturating_add(1));
        if k == 0 || self.nodes.is_empty() {
            return best;
        }

        let bound = |best: &[(usize, f64)]| {
            if best.len() == k {
                best[k - 1].1
            } else {
                max_dist2
            }
        };

        let mut heap = BinaryHeap::new();
        heap.push(HeapEntry {
            dist2: self.nodes[0].bbox.distance_squared_to_point(point),
            node: 0u32,
        });

        while let Some(entry) = heap.pop() {
            if entry.dist2 > bound(&best) {
                break;
            }

            let node = self.nodes[entry.node as usize];
            if node.is_leaf() {
                let start = node.start as usize;
                let end = start + node.count as usize;
                for &prim in &self.prim_indices[start..end] {
                    let prim_idx = prim as usize;
                    let Some(d2) = distance_to_prim(prim_idx) else {
                        continue;
                    };
                    if !d2.is_finite() || d2 > bound(&best) {
                        continue;
                    }
                    let at = best.partition_point(|&(_, d)| d <= d2);
                    best.insert(at, (prim_idx, d2));
                    best.truncate(k);
                }
                continue;
            }

            for child in [node.left, node.right] {
                let child_dist2 = self.nodes[child as usize]
                    .bbox
                    .distance_squared_to_point(point);
                if child_dist2 <= bound(&best) {
                    heap.push(HeapEntry {
                        dist2: child_dist2,
                        node: child,
                    });
                }
            }
        }

        best
    }
}

fn centroid_component(bbox: BBox, axis: u8) -> f64 {
    let c = bbox.center();
    match axis {
        0 => c.x,
        1 => c.y,
        _ => c.z,
    }
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    dist2: f64,
    node: u32,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.dist2 == other.dist2 && self.node == other.node
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap acts as a min-heap on dist2.
        other
            .dist2
            .total_cmp(&self.dist2)
            .then_with(|| self.node.cmp(&other.node))
    }
}
