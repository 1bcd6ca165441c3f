//! Decides whether a candidate point denotes the same ground feature as a
//! source point, and folds it in when it does.
//!
//! Two points match when, over the images on which both have a valid
//! measure, the mean pixel distance between their measures is within the
//! image tolerance. Folding moves the candidate's measures on images the
//! source does not observe yet into the source and leaves the candidate
//! empty and ignored.

#[cfg(test)]
mod tests;

use crate::control::{self, ControlPoint, LogData, LogDataType, MeasureType};

/// Per-image pixel distances between two points over their common images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; 0 with fewer than two common images.
    pub std_dev: f64,
}

impl DistanceStats {
    /// `None` for an empty slice.
    pub fn from_distances(distances: &[f64]) -> Option<Self> {
        if distances.is_empty() {
            return None;
        }

        let count = distances.len();
        let mean = distances.iter().sum::<f64>() / count as f64;
        let std_dev = if count < 2 {
            0.0
        } else {
            let var = distances.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>()
                / (count - 1) as f64;
            var.sqrt()
        };

        Some(Self {
            count,
            mean,
            std_dev,
        })
    }

    /// Standard deviation clamped to [0, 1], stored as goodness of fit.
    pub fn goodness_of_fit(&self) -> f64 {
        self.std_dev.clamp(0.0, 1.0)
    }
}

/// Outcome of evaluating one candidate against a source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    SamePoint,
    /// Candidate is ignored, rejected, edit-locked, invalid or has no valid
    /// measures.
    Unworthy,
    NoCommonImages,
    BeyondTolerance(DistanceStats),
    Accept(DistanceStats),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Measures appended to the source.
    pub transferred: usize,
    /// Candidate measures discarded: same image as a source measure, or
    /// ignored/rejected.
    pub dropped: usize,
}

#[derive(Debug, Clone)]
pub struct PointMerger {
    image_tolerance: f64,
}

impl PointMerger {
    pub fn new(image_tolerance: f64) -> Self {
        Self { image_tolerance }
    }

    pub fn image_tolerance(&self) -> f64 {
        self.image_tolerance
    }

    pub fn evaluate(&self, source: &ControlPoint, candidate: &ControlPoint) -> Verdict {
        if std::ptr::eq(source, candidate) {
            return Verdict::SamePoint;
        }
        if !candidate.is_worthy() || candidate.num_valid_measures() == 0 {
            return Verdict::Unworthy;
        }

        let distances: Vec<f64> = source
            .valid_measures()
            .filter_map(|sm| {
                candidate
                    .measure_by_serial(sm.cube_serial())
                    .filter(|cm| cm.is_valid())
                    .map(|cm| sm.position().distance(cm.position()))
            })
            .collect();

        match DistanceStats::from_distances(&distances) {
            None => Verdict::NoCommonImages,
            Some(stats) if stats.mean <= self.image_tolerance => Verdict::Accept(stats),
            Some(stats) => Verdict::BeyondTolerance(stats),
        }
    }

    /// Fold `candidate` into `source`.
    ///
    /// Valid candidate measures on images the source lacks are appended to
    /// the source in order. Unless both points reference the same image,
    /// moved measures are retagged as candidates and the candidate's
    /// reference measure takes the mean distance as residual and the clamped
    /// standard deviation as goodness of fit. The candidate is left empty and
    /// ignored.
    pub fn merge(
        &self,
        source: &mut ControlPoint,
        candidate: &mut ControlPoint,
        stats: &DistanceStats,
    ) -> control::Result<MergeOutcome> {
        let shared_reference = match (source.reference_serial(), candidate.reference_serial()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        let candidate_reference = candidate.reference_serial().map(str::to_owned);

        let mut outcome = MergeOutcome::default();
        for mut measure in candidate.take_measures() {
            if !measure.is_valid() || source.has_cube_serial(measure.cube_serial()) {
                outcome.dropped += 1;
                continue;
            }

            if !shared_reference {
                if candidate_reference.as_deref() == Some(measure.cube_serial()) {
                    measure.set_residual(stats.mean, stats.mean);
                    measure.set_log_data(LogData::new(
                        LogDataType::GoodnessOfFit,
                        stats.goodness_of_fit(),
                    ));
                }
                measure.measure_type = MeasureType::Candidate;
            }

            source.add_measure(measure)?;
            outcome.transferred += 1;
        }

        candidate.ignored = true;
        Ok(outcome)
    }
}
