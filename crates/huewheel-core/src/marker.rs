//! Markers and the ordered harmony set.

use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::{ColorEncoding, Hsv};
use crate::hue::wrap_degrees;
use crate::mode::Mode;

/// Unique identifier for markers.
pub type MarkerId = Uuid;

/// Ring index for the zero-based position `i` among visible markers.
///
/// Position 0 is the root; later positions alternate to the right and left
/// of it, so a five-marker wheel reads as (-2, -1, 0, +1, +2) around the
/// root instead of clustering on one side.
///
/// Domain: 0, 1, 2, 3, 4, ...
/// Range:  0, 1, -1, 2, -2, ...
pub fn marker_distance(i: usize) -> i64 {
    let magnitude = i.div_ceil(2) as i64;
    if i % 2 == 1 { magnitude } else { -magnitude }
}

/// One colored point on the wheel.
///
/// Hue is stored in scientific degrees [0, 360); saturation and value in
/// [0, 1]. Fields are mutated only by the engine, which keeps them
/// normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    id: MarkerId,
    /// Bind-time sequence index; stable across visibility toggles.
    index: usize,
    hue: f64,
    saturation: f64,
    value: f64,
    label: Option<String>,
    visible: bool,
}

impl Marker {
    pub(crate) fn new(index: usize, color: Hsv, label: Option<String>, visible: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            index,
            hue: color.hue,
            saturation: color.saturation,
            value: color.value,
            label,
            visible,
        }
    }

    /// Unique identifier.
    pub fn id(&self) -> MarkerId {
        self.id
    }

    /// Bind-time sequence index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Hue in scientific degrees, [0, 360).
    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Saturation in [0, 1].
    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    /// Value (brightness) in [0, 1].
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Optional display name; opaque to the engine.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Hidden markers keep their sequence slot but are excluded from all
    /// harmony computation and distance counting.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The marker's color as HSV.
    pub fn hsv(&self) -> Hsv {
        Hsv::new(self.hue, self.saturation, self.value)
    }

    /// The marker's color for a renderer.
    pub fn color(&self) -> Color {
        self.hsv().into()
    }

    pub(crate) fn set_hue(&mut self, hue: f64) {
        self.hue = wrap_degrees(hue);
    }

    pub(crate) fn set_saturation(&mut self, saturation: f64) {
        self.saturation = saturation.clamp(0.0, 1.0);
    }

    pub(crate) fn set_value(&mut self, value: f64) {
        self.value = value.clamp(0.0, 1.0);
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// An ordered sequence of markers.
///
/// Insertion order defines angular distance from the root (the first
/// visible marker); ascending-hue order is used only for read-back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarmonySet {
    markers: Vec<Marker>,
}

impl HarmonySet {
    pub(crate) fn from_markers(markers: Vec<Marker>) -> Self {
        Self { markers }
    }

    /// Number of markers, hidden ones included.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether the set has no markers at all.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// All markers in sequence order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Visible markers in sequence order.
    pub fn visible(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(|m| m.is_visible())
    }

    /// Look up a marker by id.
    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id() == id)
    }

    /// Sequence index of a marker.
    pub fn index_of(&self, id: MarkerId) -> Option<usize> {
        self.markers.iter().position(|m| m.id() == id)
    }

    /// The root marker: the first visible marker in sequence order, the
    /// anchor all non-Custom harmonies derive from.
    pub fn root(&self) -> Option<&Marker> {
        self.visible().next()
    }

    /// Whether `id` is the current root.
    pub fn is_root(&self, id: MarkerId) -> bool {
        self.root().is_some_and(|root| root.id() == id)
    }

    /// Position of a marker counted among visible markers only, root at 0.
    pub fn visible_position(&self, id: MarkerId) -> Option<usize> {
        self.visible().position(|m| m.id() == id)
    }

    /// Signed ring index of a marker relative to the root; `None` for
    /// hidden or unknown markers.
    pub fn ring_index(&self, id: MarkerId) -> Option<i64> {
        self.visible_position(id).map(marker_distance)
    }

    /// Sequence indices of the visible markers, in order.
    pub(crate) fn visible_indices(&self) -> Vec<usize> {
        self.markers
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_visible())
            .map(|(i, _)| i)
            .collect()
    }

    pub(crate) fn marker_at_mut(&mut self, index: usize) -> &mut Marker {
        &mut self.markers[index]
    }

    /// Visible markers sorted ascending by hue; ties keep sequence order.
    pub fn sorted_by_hue(&self) -> Vec<&Marker> {
        let mut sorted: Vec<&Marker> = self.visible().collect();
        sorted.sort_by(|a, b| a.hue().total_cmp(&b.hue()));
        sorted
    }

    /// Visible colors sorted ascending by hue, in the requested encoding.
    pub fn colors_as(&self, encoding: ColorEncoding) -> Vec<String> {
        self.sorted_by_hue()
            .into_iter()
            .map(|m| m.hsv().encode(encoding))
            .collect()
    }

    /// Display order for a swatch row: each visible marker paired with its
    /// slot, ring order for most modes, cycle position for Triad.
    pub fn swatch_order(&self, mode: Mode) -> Vec<(MarkerId, i64)> {
        self.visible()
            .enumerate()
            .map(|(i, m)| {
                let order = match mode {
                    Mode::Triad => (i % 3) as i64,
                    _ => marker_distance(i),
                };
                (m.id(), order)
            })
            .collect()
    }
}
