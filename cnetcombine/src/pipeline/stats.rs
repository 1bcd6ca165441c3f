use std::fmt;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombineStats {
    /// Distinct cube serials over all input measures.
    pub total_images: usize,
    pub input_points: usize,
    /// Worthy points at load time.
    pub valid_points: usize,
    pub output_points: usize,
    /// Candidates absorbed into a source.
    pub points_merged: usize,
    /// Source/candidate pairs handed to the merger.
    pub points_evaluated: usize,
    /// Measures over all input points.
    pub total_measures: usize,
    /// Measures moved from a candidate into its source.
    pub measures_merged: usize,
    /// Measures discarded by merges and by measure cleaning.
    pub measures_deleted: usize,
    /// Points newly ignored by the minimum-measure rule.
    pub points_dropped_min_measures: usize,
}

impl fmt::Display for CombineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TotalImages           = {}", self.total_images)?;
        writeln!(f, "TotalInputPoints      = {}", self.input_points)?;
        writeln!(f, "ValidInputPoints      = {}", self.valid_points)?;
        writeln!(f, "TotalOutputPoints     = {}", self.output_points)?;
        writeln!(f, "PointsMerged          = {}", self.points_merged)?;
        writeln!(f, "PointsEvaluated       = {}", self.points_evaluated)?;
        writeln!(f, "TotalMeasures         = {}", self.total_measures)?;
        writeln!(f, "MeasuresMerged        = {}", self.measures_merged)?;
        writeln!(f, "MeasuresDeleted       = {}", self.measures_deleted)?;
        write!(f, "MinimumMeasureDropped = {}", self.points_dropped_min_measures)
    }
}
