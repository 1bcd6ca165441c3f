use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::measure::ControlMeasure;
use super::surface_point::SurfacePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointType {
    /// Ground position is well established and held fixed.
    Fixed,
    /// Ground position is known within its apriori sigmas.
    Constrained,
    /// Ground position is solved for; only the image measures tie it down.
    #[default]
    Free,
}

/// A ground feature together with its observations on individual images.
///
/// Measures keep insertion order and carry at most one measure per cube
/// serial. The reference measure, when present, is one of the point's own
/// measures and is tracked by its cube serial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub id: String,
    #[serde(default)]
    pub point_type: PointType,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default)]
    pub rejected: bool,
    #[serde(default)]
    pub edit_lock: bool,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chooser_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apriori: Option<SurfacePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted: Option<SurfacePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference_serial: Option<String>,
    #[serde(default)]
    measures: Vec<ControlMeasure>,
}

impl ControlPoint {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            point_type: PointType::default(),
            ignored: false,
            rejected: false,
            edit_lock: false,
            invalid: false,
            chooser_name: String::new(),
            apriori: None,
            adjusted: None,
            reference_serial: None,
            measures: Vec::new(),
        }
    }

    /// Not ignored, rejected, edit-locked or invalid.
    #[inline]
    pub fn is_worthy(&self) -> bool {
        !(self.ignored || self.rejected || self.edit_lock || self.invalid)
    }

    pub fn measures(&self) -> &[ControlMeasure] {
        &self.measures
    }

    /// Measures in insertion order, optionally only the valid ones.
    pub fn iter_measures(&self, valid_only: bool) -> impl Iterator<Item = &ControlMeasure> {
        self.measures
            .iter()
            .filter(move |m| !valid_only || m.is_valid())
    }

    pub fn valid_measures(&self) -> impl Iterator<Item = &ControlMeasure> {
        self.iter_measures(true)
    }

    pub fn num_measures(&self) -> usize {
        self.measures.len()
    }

    pub fn num_valid_measures(&self) -> usize {
        self.valid_measures().count()
    }

    pub fn has_cube_serial(&self, serial: &str) -> bool {
        self.measures.iter().any(|m| m.cube_serial() == serial)
    }

    pub fn measure_by_serial(&self, serial: &str) -> Option<&ControlMeasure> {
        self.measures.iter().find(|m| m.cube_serial() == serial)
    }

    pub fn measure_by_serial_mut(&mut self, serial: &str) -> Option<&mut ControlMeasure> {
        self.measures.iter_mut().find(|m| m.cube_serial() == serial)
    }

    /// Appends `measure`. Fails if the point already observes the same cube.
    pub fn add_measure(&mut self, measure: ControlMeasure) -> Result<()> {
        if self.has_cube_serial(measure.cube_serial()) {
            return Err(Error::DuplicateSerial {
                point_id: self.id.clone(),
                serial: measure.cube_serial().to_string(),
            });
        }
        self.measures.push(measure);
        Ok(())
    }

    /// Removes and returns the measure on `serial`, clearing the reference
    /// if it pointed there.
    pub fn remove_measure_by_serial(&mut self, serial: &str) -> Option<ControlMeasure> {
        let idx = self.measures.iter().position(|m| m.cube_serial() == serial)?;
        if self.reference_serial.as_deref() == Some(serial) {
            self.reference_serial = None;
        }
        Some(self.measures.remove(idx))
    }

    /// Empties the point, returning its measures in order.
    pub fn take_measures(&mut self) -> Vec<ControlMeasure> {
        self.reference_serial = None;
        std::mem::take(&mut self.measures)
    }

    /// Drops ignored and rejected measures. Returns how many were removed.
    pub fn retain_valid_measures(&mut self) -> usize {
        let before = self.measures.len();
        self.measures.retain(ControlMeasure::is_valid);
        if let Some(serial) = &self.reference_serial
            && !self.measures.iter().any(|m| m.cube_serial() == serial)
        {
            self.reference_serial = None;
        }
        before - self.measures.len()
    }

    pub fn reference_serial(&self) -> Option<&str> {
        self.reference_serial.as_deref()
    }

    pub fn reference_measure(&self) -> Option<&ControlMeasure> {
        self.reference_serial
            .as_deref()
            .and_then(|serial| self.measure_by_serial(serial))
    }

    /// Designates the measure on `serial` as the reference. The measure must
    /// already belong to this point.
    pub fn set_reference_measure(&mut self, serial: &str) -> Result<()> {
        if !self.has_cube_serial(serial) {
            return Err(Error::ReferenceNotOwned {
                point_id: self.id.clone(),
                serial: serial.to_string(),
            });
        }
        self.reference_serial = Some(serial.to_string());
        Ok(())
    }

    pub fn clear_reference_measure(&mut self) {
        self.reference_serial = None;
    }

    /// Adjusted position when one exists, otherwise the apriori one.
    pub fn best_surface_point(&self) -> Option<SurfacePoint> {
        self.adjusted.or(self.apriori)
    }

    /// Overwrites the apriori position with the best available one.
    pub fn set_apriori_to_best(&mut self) {
        if let Some(best) = self.best_surface_point() {
            self.apriori = Some(best);
        }
    }

    /// Checks the structural invariants. Used on freshly deserialized points,
    /// which bypass `add_measure` and `set_reference_measure`.
    pub fn validate(&self) -> Result<()> {
        for (idx, measure) in self.measures.iter().enumerate() {
            let serial = measure.cube_serial();
            if self.measures[..idx]
                .iter()
                .any(|other| other.cube_serial() == serial)
            {
                return Err(Error::DuplicateSerial {
                    point_id: self.id.clone(),
                    serial: serial.to_string(),
                });
            }
        }

        if let Some(serial) = &self.reference_serial
            && !self.has_cube_serial(serial)
        {
            return Err(Error::ReferenceNotOwned {
                point_id: self.id.clone(),
                serial: serial.clone(),
            });
        }

        Ok(())
    }
}
