//! Huewheel Core Library
//!
//! Platform-agnostic color-harmony engine for an interactive hue wheel.
//! The engine owns an ordered set of markers on the wheel, keeps their
//! harmony relationship consistent while a host binds data, switches modes,
//! and drags markers, and notifies the host through "markers changed" and
//! "commit" events. Rendering is left entirely to consumers.

pub mod color;
pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod hue;
pub mod marker;
pub mod mode;

pub use color::{ColorEncoding, ColorParseError, Hsv, hex_from_hue_sat};
pub use engine::{EngineOptions, HarmonyEngine, MarkerSpec};
pub use error::HarmonyError;
pub use events::{EventDispatcher, ListenerId};
pub use geometry::WheelGeometry;
pub use hue::{artistic_to_scientific, scientific_to_artistic, wrap_degrees};
pub use marker::{HarmonySet, Marker, MarkerId, marker_distance};
pub use mode::Mode;
