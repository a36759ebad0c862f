//! Scientific/artistic hue-space transforms.
//!
//! The pigment-based layout of a painted color wheel ("artistic" hue) is
//! perceptually nonuniform relative to uniform hue math ("scientific" hue).
//! All internal color storage and angular math use scientific hue; artistic
//! hue appears only at the wheel-geometry boundary. The two maps below are
//! monotonic, continuous, piecewise-linear, and mutually inverse over
//! [0, 360).

/// Linearly map `value` from the range [`from_lo`, `from_hi`] onto
/// [`to_lo`, `to_hi`].
pub fn map_range(value: f64, from_lo: f64, from_hi: f64, to_lo: f64, to_hi: f64) -> f64 {
    to_lo + (value - from_lo) * ((to_hi - to_lo) / (from_hi - from_lo))
}

/// Wrap an angle in degrees into [0, 360). Total over all finite inputs,
/// never negative.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Convert an artistic (wheel-image) hue to scientific hue.
pub fn artistic_to_scientific(hue: f64) -> f64 {
    if hue < 60.0 {
        hue * (35.0 / 60.0)
    } else if hue < 122.0 {
        map_range(hue, 60.0, 122.0, 35.0, 60.0)
    } else if hue < 165.0 {
        map_range(hue, 122.0, 165.0, 60.0, 120.0)
    } else if hue < 218.0 {
        map_range(hue, 165.0, 218.0, 120.0, 180.0)
    } else if hue < 275.0 {
        map_range(hue, 218.0, 275.0, 180.0, 240.0)
    } else if hue < 330.0 {
        map_range(hue, 275.0, 330.0, 240.0, 300.0)
    } else {
        map_range(hue, 330.0, 360.0, 300.0, 360.0)
    }
}

/// Convert a scientific hue to artistic (wheel-image) hue.
pub fn scientific_to_artistic(hue: f64) -> f64 {
    if hue < 35.0 {
        hue * (60.0 / 35.0)
    } else if hue < 60.0 {
        map_range(hue, 35.0, 60.0, 60.0, 122.0)
    } else if hue < 120.0 {
        map_range(hue, 60.0, 120.0, 122.0, 165.0)
    } else if hue < 180.0 {
        map_range(hue, 120.0, 180.0, 165.0, 218.0)
    } else if hue < 240.0 {
        map_range(hue, 180.0, 240.0, 218.0, 275.0)
    } else if hue < 300.0 {
        map_range(hue, 240.0, 300.0, 275.0, 330.0)
    } else {
        map_range(hue, 300.0, 360.0, 330.0, 360.0)
    }
}
