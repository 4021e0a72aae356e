use serde::{Deserialize, Serialize};

use super::document::DocumentId;

/// Angle in radians, in [0, π], between the main document and a cited document.
///
/// The main document lies on the reference axis (1, 0) of the plane.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AngleResult {
    pub id: DocumentId,
    pub angle: f64,
}

impl AngleResult {
    pub fn cosine_similarity(&self) -> f64 {
        self.angle.cos()
    }

    /// Position of the cited document on the unit circle
    pub fn plane_point(&self) -> (f64, f64) {
        (self.angle.cos(), self.angle.sin())
    }

    pub fn degrees(&self) -> f64 {
        self.angle.to_degrees()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DistanceResult {
    pub id: DocumentId,
    pub distance: f64,
}
