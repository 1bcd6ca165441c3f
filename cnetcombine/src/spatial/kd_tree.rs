use glam::DVec2;

/// Default maximum number of points held by a leaf.
pub const DEFAULT_LEAF_SIZE: usize = 10;

/// A 2D k-d tree over pixel positions with bucketed leaves.
///
/// - Built once, never modified
/// - Splits alternate between sample (x) and line (y) at the median
/// - Leaves hold up to `leaf_size` points and are scanned linearly
#[derive(Debug)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    points: Vec<DVec2>,
    /// Point indices permuted so every leaf owns a contiguous range.
    order: Vec<usize>,
    leaf_size: usize,
}

#[derive(Debug, Clone)]
enum KdNode {
    Leaf {
        start: usize,
        end: usize,
    },
    Split {
        /// 0 = x (sample), 1 = y (line)
        dim: usize,
        value: f64,
        left: usize,
        right: usize,
    },
}

impl KdTree {
    /// Build a tree from `points`. Returns `None` for an empty slice.
    ///
    /// `leaf_size` is clamped to at least 1.
    pub fn build(points: &[DVec2], leaf_size: usize) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let leaf_size = leaf_size.max(1);
        let points = points.to_vec();
        let mut order: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(2 * points.len() / leaf_size + 1);

        Self::build_recursive(&points, &mut order, 0, 0, leaf_size, &mut nodes);

        Some(Self {
            nodes,
            points,
            order,
            leaf_size,
        })
    }

    fn build_recursive(
        points: &[DVec2],
        order: &mut [usize],
        offset: usize,
        depth: usize,
        leaf_size: usize,
        nodes: &mut Vec<KdNode>,
    ) -> usize {
        let node_idx = nodes.len();
        nodes.push(KdNode::Leaf {
            start: offset,
            end: offset + order.len(),
        });

        if order.len() <= leaf_size {
            return node_idx;
        }

        let dim = depth % 2;
        let median = order.len() / 2;
        order.select_nth_unstable_by(median, |&a, &b| {
            coord(points[a], dim).total_cmp(&coord(points[b], dim))
        });
        let value = coord(points[order[median]], dim);

        let (left_order, right_order) = order.split_at_mut(median);
        let left = Self::build_recursive(points, left_order, offset, depth + 1, leaf_size, nodes);
        let right = Self::build_recursive(
            points,
            right_order,
            offset + median,
            depth + 1,
            leaf_size,
            nodes,
        );

        nodes[node_idx] = KdNode::Split {
            dim,
            value,
            left,
            right,
        };
        node_idx
    }

    /// Append the index of every point within `radius` of `query` to `out`.
    ///
    /// Distances are compared squared; the radius is squared once here.
    /// Output order is unspecified.
    pub fn radius_indices_into(&self, query: DVec2, radius: f64, out: &mut Vec<usize>) {
        if radius < 0.0 {
            return;
        }
        let radius_sq = radius * radius;
        self.radius_recursive(0, query, radius_sq, out);
    }

    fn radius_recursive(&self, node_idx: usize, query: DVec2, radius_sq: f64, out: &mut Vec<usize>) {
        match self.nodes[node_idx] {
            KdNode::Leaf { start, end } => {
                for &point_idx in &self.order[start..end] {
                    if self.points[point_idx].distance_squared(query) <= radius_sq {
                        out.push(point_idx);
                    }
                }
            }
            KdNode::Split {
                dim,
                value,
                left,
                right,
            } => {
                let diff = coord(query, dim) - value;
                let diff_sq = diff * diff;

                if diff <= 0.0 || diff_sq <= radius_sq {
                    self.radius_recursive(left, query, radius_sq, out);
                }
                if diff >= 0.0 || diff_sq <= radius_sq {
                    self.radius_recursive(right, query, radius_sq, out);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    pub fn get_point(&self, idx: usize) -> DVec2 {
        self.points[idx]
    }
}

#[inline]
fn coord(p: DVec2, dim: usize) -> f64 {
    if dim == 0 { p.x } else { p.y }
}
