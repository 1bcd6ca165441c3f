use glam::DVec2;

use super::kd_tree::KdTree;
use crate::aggregate::PointId;

/// One measure as seen by the spatial index.
///
/// `measure` is the position of the measure inside its point at build time.
/// It stays meaningful only while `point` is still worthy: an absorbed point
/// loses its measures, so callers must check the point before using it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedMeasure {
    pub point: PointId,
    pub measure: usize,
    pub position: DVec2,
}

/// All indexed measures of a single image, searchable by pixel position.
#[derive(Debug)]
pub struct MeasureCloud {
    entries: Vec<IndexedMeasure>,
    tree: Option<KdTree>,
}

impl MeasureCloud {
    pub fn build(entries: Vec<IndexedMeasure>, leaf_size: usize) -> Self {
        let positions: Vec<DVec2> = entries.iter().map(|e| e.position).collect();
        let tree = KdTree::build(&positions, leaf_size);
        Self { entries, tree }
    }

    /// Append every entry within `radius` pixels of `center` to `out`.
    pub fn radius_query_into(&self, center: DVec2, radius: f64, out: &mut Vec<IndexedMeasure>) {
        let Some(tree) = &self.tree else {
            return;
        };

        let mut hits = Vec::new();
        tree.radius_indices_into(center, radius, &mut hits);
        out.extend(hits.into_iter().map(|idx| self.entries[idx]));
    }

    pub fn radius_query(&self, center: DVec2, radius: f64) -> Vec<IndexedMeasure> {
        let mut out = Vec::new();
        self.radius_query_into(center, radius, &mut out);
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexedMeasure] {
        &self.entries
    }
}
