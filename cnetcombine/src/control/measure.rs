use glam::DVec2;
use serde::{Deserialize, Serialize};

/// How the pixel location of a measure was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeasureType {
    /// Not yet refined; the default for seeded and merged measures.
    #[default]
    Candidate,
    /// Picked by a human.
    Manual,
    /// Registered to whole pixel.
    RegisteredPixel,
    /// Registered to sub-pixel.
    RegisteredSubPixel,
}

/// Kinds of auxiliary registration statistics attached to a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogDataType {
    GoodnessOfFit,
    MinimumPixelZScore,
    MaximumPixelZScore,
    PixelShift,
    WholePixelCorrelation,
    SubPixelCorrelation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogData {
    pub kind: LogDataType,
    pub value: f64,
}

impl LogData {
    pub fn new(kind: LogDataType, value: f64) -> Self {
        Self { kind, value }
    }
}

/// A single observation of a control point on one image.
///
/// `sample` and `line` are fractional pixel coordinates. The cube serial is
/// fixed at construction; a point relies on it for its one-measure-per-image
/// rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMeasure {
    cube_serial: String,
    pub sample: f64,
    pub line: f64,
    #[serde(default)]
    pub measure_type: MeasureType,
    #[serde(default)]
    pub sample_residual: f64,
    #[serde(default)]
    pub line_residual: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub log_data: Vec<LogData>,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default)]
    pub rejected: bool,
    #[serde(default)]
    pub edit_lock: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chooser_name: String,
}

impl ControlMeasure {
    pub fn new(cube_serial: impl Into<String>, sample: f64, line: f64) -> Self {
        Self {
            cube_serial: cube_serial.into(),
            sample,
            line,
            measure_type: MeasureType::default(),
            sample_residual: 0.0,
            line_residual: 0.0,
            log_data: Vec::new(),
            ignored: false,
            rejected: false,
            edit_lock: false,
            chooser_name: String::new(),
        }
    }

    pub fn cube_serial(&self) -> &str {
        &self.cube_serial
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.sample, self.line)
    }

    /// Neither ignored nor rejected.
    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.ignored && !self.rejected
    }

    pub fn set_residual(&mut self, sample: f64, line: f64) {
        self.sample_residual = sample;
        self.line_residual = line;
    }

    pub fn log_value(&self, kind: LogDataType) -> Option<f64> {
        self.log_data
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.value)
    }

    /// Stores `entry`, replacing any existing entry of the same kind.
    pub fn set_log_data(&mut self, entry: LogData) {
        match self.log_data.iter_mut().find(|e| e.kind == entry.kind) {
            Some(existing) => existing.value = entry.value,
            None => self.log_data.push(entry),
        }
    }

    pub fn goodness_of_fit(&self) -> Option<f64> {
        self.log_value(LogDataType::GoodnessOfFit)
    }
}
