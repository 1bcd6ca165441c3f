//! Parameters of a combine run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::spatial::DEFAULT_LEAF_SIZE;

/// Algorithm parameters.
///
/// Can be loaded from a YAML or JSON parameter file; absent keys take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineConfig {
    /// Pixel radius for neighbor queries and the mean-distance threshold for
    /// accepting a merge.
    pub image_tolerance: f64,
    /// Maximum points per k-d tree leaf. Affects speed only.
    pub kd_leaf_size: usize,
    /// Points (not edit-locked) with fewer valid measures are ignored.
    pub min_measures: usize,
    /// Remove ignored and rejected measures from the output points.
    pub clean_measures: bool,
    /// Omit ignored points from the output network.
    pub clean_net: bool,
    /// Overwrite apriori positions with the best available position.
    pub set_apriori_best: bool,
    /// Output network ID; defaults to the first non-empty input ID.
    pub network_id: Option<String>,
    /// Output description; defaults to the first non-empty input description.
    pub description: Option<String>,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            image_tolerance: 1.0,
            kd_leaf_size: DEFAULT_LEAF_SIZE,
            min_measures: 2,
            clean_measures: false,
            clean_net: false,
            set_apriori_best: false,
            network_id: None,
            description: None,
        }
    }
}

impl CombineConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.image_tolerance.is_finite() || self.image_tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "image_tolerance must be a non-negative number of pixels, got {}",
                self.image_tolerance
            )));
        }
        if self.kd_leaf_size == 0 {
            return Err(Error::InvalidConfig(
                "kd_leaf_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where inputs come from and outputs go.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfig {
    pub cnet_base: Option<PathBuf>,
    pub cnet_from: Option<PathBuf>,
    /// File listing further network paths, one per line.
    pub cnet_list: Option<PathBuf>,
    pub onet: Option<PathBuf>,
    /// Output list of distinct cube serials.
    pub tosn: Option<PathBuf>,
    /// Output merge log (CSV).
    pub log_file: Option<PathBuf>,
    pub combine: CombineConfig,
}

impl RunConfig {
    pub fn has_inputs(&self) -> bool {
        self.cnet_base.is_some() || self.cnet_from.is_some() || self.cnet_list.is_some()
    }
}
