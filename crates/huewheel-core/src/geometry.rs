//! Wheel geometry: pointer positions to hue/saturation and back.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::hue::{artistic_to_scientific, scientific_to_artistic, wrap_degrees};

/// Maps between the wheel's 2D frame and hue/saturation space.
///
/// The frame has its origin at the top-left of the wheel's bounding square
/// with y growing downward, as a pointer-tracking host reports positions.
/// Angles are measured counter-clockwise from the positive x-axis after
/// recentering on the wheel's center and flipping y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelGeometry {
    radius: f64,
}

impl WheelGeometry {
    /// Geometry for a wheel disk of the given radius, in frame units.
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    /// The wheel's radius in frame units.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Recenter a frame position on the wheel center, y up.
    pub fn to_cartesian(&self, p: Point) -> Point {
        Point::new(p.x - self.radius, self.radius - p.y)
    }

    /// Inverse of [`to_cartesian`](Self::to_cartesian).
    pub fn to_frame(&self, p: Point) -> Point {
        Point::new(p.x + self.radius, self.radius - p.y)
    }

    /// The closest point to `p` still inside the wheel's disk.
    pub fn point_on_circle(&self, p: Point) -> Point {
        let c = self.to_cartesian(p);
        if c.to_vec2().hypot() <= self.radius {
            return p;
        }
        let theta = c.y.atan2(c.x);
        self.to_frame(Point::new(
            self.radius * theta.cos(),
            self.radius * theta.sin(),
        ))
    }

    /// Artistic-space angle of a frame position around the wheel center,
    /// in degrees [0, 360).
    pub fn angle_at(&self, p: Point) -> f64 {
        let c = self.to_cartesian(p);
        wrap_degrees(c.y.atan2(c.x).to_degrees())
    }

    /// Scientific hue and saturation at a frame position.
    pub fn hue_sat_at(&self, p: Point) -> (f64, f64) {
        let c = self.to_cartesian(p);
        let hue = artistic_to_scientific(self.angle_at(p));
        let saturation = (c.to_vec2().hypot() / self.radius).min(1.0);
        (hue, saturation)
    }

    /// Frame position for a scientific hue and saturation. Inverse of
    /// [`hue_sat_at`](Self::hue_sat_at) on the disk.
    pub fn position_for(&self, hue: f64, saturation: f64) -> Point {
        let theta = scientific_to_artistic(hue).to_radians();
        self.to_frame(Point::new(
            theta.cos() * self.radius * saturation,
            theta.sin() * self.radius * saturation,
        ))
    }
}
