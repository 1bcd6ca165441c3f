//! Phase 1: pulls every input network into one arena of points.

use std::collections::{BTreeMap, BTreeSet};

use crate::control::{ControlNet, ControlPoint};
use crate::spatial::{ImageIndex, IndexedMeasure};

/// Index of a point in the aggregate arena. Stable for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(pub usize);

/// Header values carried into the output network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkHeader {
    pub network_id: String,
    pub target_name: String,
    pub description: String,
}

/// All points of all input networks, in file order then in-file order, plus
/// the valid measures of worthy points grouped by image.
#[derive(Debug, Default)]
pub struct Aggregate {
    pub points: Vec<ControlPoint>,
    pub header: NetworkHeader,
    /// Worthy points at load time.
    pub valid_points: usize,
    pub total_measures: usize,
    pub num_networks: usize,
    serials: BTreeSet<String>,
    images: BTreeMap<String, Vec<IndexedMeasure>>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_networks(networks: impl IntoIterator<Item = ControlNet>) -> Self {
        let mut aggregate = Self::new();
        for net in networks {
            aggregate.add_network(net);
        }
        aggregate
    }

    /// Takes ownership of the network's points.
    pub fn add_network(&mut self, net: ControlNet) {
        self.capture_header(&net);
        self.num_networks += 1;

        tracing::debug!(
            network_id = %net.network_id,
            points = net.points.len(),
            "Aggregating control network"
        );

        for point in net.points {
            let id = PointId(self.points.len());
            self.total_measures += point.num_measures();
            self.serials
                .extend(point.measures().iter().map(|m| m.cube_serial().to_string()));

            if point.is_worthy() {
                self.valid_points += 1;
                for (measure_idx, measure) in point.measures().iter().enumerate() {
                    if !measure.is_valid() {
                        continue;
                    }
                    self.images
                        .entry(measure.cube_serial().to_string())
                        .or_default()
                        .push(IndexedMeasure {
                            point: id,
                            measure: measure_idx,
                            position: measure.position(),
                        });
                }
            }

            self.points.push(point);
        }
    }

    fn capture_header(&mut self, net: &ControlNet) {
        let header = &mut self.header;
        if header.network_id.is_empty() {
            header.network_id = net.network_id.clone();
        }
        if header.description.is_empty() {
            header.description = net.description.clone();
        }
        if header.target_name.is_empty() {
            header.target_name = net.target_name.clone();
        } else if !net.target_name.is_empty()
            && !net.target_name.eq_ignore_ascii_case(&header.target_name)
        {
            tracing::warn!(
                network_id = %net.network_id,
                target = %net.target_name,
                expected = %header.target_name,
                "Input network targets a different body"
            );
        }
    }

    /// Phase 2: one measure cloud per image that has at least one valid
    /// measure on a worthy point.
    pub fn build_index(&self, leaf_size: usize) -> ImageIndex {
        let mut index = ImageIndex::new(leaf_size);
        for (serial, entries) in &self.images {
            index.build(serial.clone(), entries.clone());
        }
        index
    }

    /// Every distinct cube serial seen on any measure, sorted.
    pub fn cube_serials(&self) -> impl Iterator<Item = &str> {
        self.serials.iter().map(String::as_str)
    }

    pub fn num_images(&self) -> usize {
        self.serials.len()
    }

    /// Images carrying at least one valid measure of a worthy point.
    pub fn num_indexed_images(&self) -> usize {
        self.images.len()
    }

    pub fn point(&self, id: PointId) -> &ControlPoint {
        &self.points[id.0]
    }

    pub fn point_mut(&mut self, id: PointId) -> &mut ControlPoint {
        &mut self.points[id.0]
    }

    /// Mutable access to two distinct points at once.
    pub fn pair_mut(&mut self, a: PointId, b: PointId) -> (&mut ControlPoint, &mut ControlPoint) {
        assert_ne!(a, b, "pair_mut requires two distinct points");
        if a.0 < b.0 {
            let (head, tail) = self.points.split_at_mut(b.0);
            (&mut head[a.0], &mut tail[0])
        } else {
            let (head, tail) = self.points.split_at_mut(a.0);
            (&mut tail[0], &mut head[b.0])
        }
    }

    pub fn into_points(self) -> Vec<ControlPoint> {
        self.points
    }
}
