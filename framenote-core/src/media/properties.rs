//! Video stream properties reported by ffprobe.

use serde::Serialize;

/// Basic properties of the primary video stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    /// Container duration in seconds, when the format reports one
    pub duration_secs: Option<f64>,
}

impl VideoProperties {
    /// Returns "WIDTHxHEIGHT".
    #[must_use]
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}
