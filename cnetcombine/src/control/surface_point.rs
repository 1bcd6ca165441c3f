use serde::{Deserialize, Serialize};

/// Ground position of a control point in latitudinal coordinates.
///
/// Latitude and longitude are in degrees, radius in meters. Sigmas are
/// optional; a missing sigma means the coordinate is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfacePoint {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude_sigma: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude_sigma: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_sigma: Option<f64>,
}

impl SurfacePoint {
    pub fn new(latitude: f64, longitude: f64, radius: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius,
            ..Default::default()
        }
    }

    pub fn with_sigmas(mut self, latitude: f64, longitude: f64, radius: f64) -> Self {
        self.latitude_sigma = Some(latitude);
        self.longitude_sigma = Some(longitude);
        self.radius_sigma = Some(radius);
        self
    }
}
