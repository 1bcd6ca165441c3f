//! Per-image spatial index over control measures.
//!
//! Every image (cube serial) gets its own [`MeasureCloud`], a k-d tree keyed
//! by the (sample, line) position of each valid measure on that image. The
//! index is built once, after loading, and only read afterwards. Merging
//! moves measures between points but never changes their image or pixel
//! position, so entries are filtered for staleness by the caller instead of
//! being updated.

mod kd_tree;
mod measure_cloud;


use glam::DVec2;
use hashbrown::HashMap;

pub use kd_tree::{DEFAULT_LEAF_SIZE, KdTree};
pub use measure_cloud::{IndexedMeasure, MeasureCloud};

#[derive(Debug)]
pub struct ImageIndex {
    clouds: HashMap<String, MeasureCloud>,
    leaf_size: usize,
}

impl Default for ImageIndex {
    fn default() -> Self {
        Self::new(DEFAULT_LEAF_SIZE)
    }
}

impl ImageIndex {
    pub fn new(leaf_size: usize) -> Self {
        Self {
            clouds: HashMap::new(),
            leaf_size,
        }
    }

    /// Index `entries` as the complete measure set of `serial`, replacing any
    /// previous cloud for that image.
    pub fn build(&mut self, serial: impl Into<String>, entries: Vec<IndexedMeasure>) {
        let cloud = MeasureCloud::build(entries, self.leaf_size);
        self.clouds.insert(serial.into(), cloud);
    }

    /// Append every entry on `serial` within `radius` pixels of `center`.
    ///
    /// Unknown images yield nothing. Results may include the querying
    /// point's own measure.
    pub fn radius_query_into(
        &self,
        serial: &str,
        center: DVec2,
        radius: f64,
        out: &mut Vec<IndexedMeasure>,
    ) {
        if let Some(cloud) = self.clouds.get(serial) {
            cloud.radius_query_into(center, radius, out);
        }
    }

    pub fn radius_query(&self, serial: &str, center: DVec2, radius: f64) -> Vec<IndexedMeasure> {
        let mut out = Vec::new();
        self.radius_query_into(serial, center, radius, &mut out);
        out
    }

    pub fn size_for(&self, serial: &str) -> usize {
        self.clouds.get(serial).map_or(0, MeasureCloud::len)
    }

    pub fn num_images(&self) -> usize {
        self.clouds.len()
    }

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }
}
