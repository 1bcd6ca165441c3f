//! cnetcombine - merges redundant control points across control networks.
//!
//! Control points triangulated independently on overlapping images often
//! denote the same ground feature. This crate finds such points through their
//! image measures and fuses them into one point that carries the union of
//! their measures:
//!
//! - Per-image k-d trees over measure pixel positions
//! - Greedy, single-pass merging under a mean pixel-distance tolerance
//! - A merge log that maps every surviving point to all IDs it absorbed
//! - Post-filtering: duplicate-ID renaming, measure cleaning, minimum
//!   measure count, apriori reset
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cnetcombine::{CombineConfig, PointCombiner, io};
//!
//! let base = io::load_network("base.json".as_ref())?;
//! let other = io::load_network("other.json".as_ref())?;
//!
//! let config = CombineConfig {
//!     image_tolerance: 1.5,
//!     ..Default::default()
//! };
//! let result = PointCombiner::new(config)?.combine(vec![base, other])?;
//!
//! println!("{}", result.stats);
//! ```

pub mod aggregate;
pub mod config;
pub mod control;
pub mod emit;
pub mod error;
pub mod io;
pub mod merge_log;
pub mod merger;
pub mod pipeline;
pub mod spatial;

pub use aggregate::{Aggregate, NetworkHeader, PointId};
pub use config::{CombineConfig, RunConfig};
pub use control::{
    ControlMeasure, ControlNet, ControlPoint, LogData, LogDataType, MeasureType, PointType,
    SurfacePoint,
};
pub use error::{Error, Result};
pub use merge_log::{MergeLog, MergeRecord};
pub use merger::{DistanceStats, MergeOutcome, PointMerger, Verdict};
pub use pipeline::{CombineResult, CombineStats, PointCombiner, run};
pub use spatial::{ImageIndex, IndexedMeasure, KdTree, MeasureCloud};
