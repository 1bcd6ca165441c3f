//! Control network model: networks, points and their image measures.

mod error;
mod measure;
mod point;
mod surface_point;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use error::{Error, Result};
pub use measure::{ControlMeasure, LogData, LogDataType, MeasureType};
pub use point::{ControlPoint, PointType};
pub use surface_point::SurfacePoint;

/// A labelled collection of control points on one target body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlNet {
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub target_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub modified: String,
    #[serde(default)]
    pub points: Vec<ControlPoint>,
}

impl ControlNet {
    pub fn new(network_id: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self {
            network_id: network_id.into(),
            target_name: target_name.into(),
            ..Default::default()
        }
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_measures(&self) -> usize {
        self.points.iter().map(ControlPoint::num_measures).sum()
    }

    /// Distinct cube serials observed by any measure, sorted.
    pub fn cube_serials(&self) -> BTreeSet<&str> {
        self.points
            .iter()
            .flat_map(|p| p.measures().iter().map(|m| m.cube_serial()))
            .collect()
    }

    pub fn point_by_id(&self, id: &str) -> Option<&ControlPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn validate(&self) -> Result<()> {
        self.points.iter().try_for_each(ControlPoint::validate)
    }
}
