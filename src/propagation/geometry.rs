//! Positions and distances in the propagation model.
//!
//! Coordinates are meters in a right-handed Cartesian frame. The host
//! simulator owns mobility; this module only turns two positions into the
//! Euclidean separation the loss model consumes.

use serde::Deserialize;

/// A point in 3D space (meters). `z` defaults to 0 when deserialized.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &Position) -> f64 {
        distance2(self, other).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Squared Euclidean distance (avoids a sqrt when only comparing distances).
pub fn distance2(a: &Position, b: &Position) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    dx * dx + dy * dy + dz * dz
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean_in_three_dimensions() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(2.0, 3.0, 6.0);
        assert_eq!(a.distance_to(&b), 7.0);
        assert_eq!(b.distance_to(&a), 7.0);
        assert_eq!(distance2(&a, &b), 49.0);
    }

    #[test]
    fn coincident_points_have_zero_distance() {
        let p = Position::new(4.5, -1.0, 2.0);
        assert_eq!(p.distance_to(&p), 0.0);
    }

    #[test]
    fn z_defaults_to_zero() {
        let p: Position = serde_json::from_str(r#"{"x": 1.0, "y": 2.0}"#).unwrap();
        assert_eq!(p, Position::new(1.0, 2.0, 0.0));
    }
}
