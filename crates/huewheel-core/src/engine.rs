//! The harmony engine: mode generation, drag re-harmonization, read-back.

use kurbo::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::color::{ColorEncoding, Hsv};
use crate::error::HarmonyError;
use crate::events::{EventDispatcher, ListenerId};
use crate::geometry::WheelGeometry;
use crate::hue::{artistic_to_scientific, scientific_to_artistic, wrap_degrees};
use crate::marker::{HarmonySet, Marker, MarkerId, marker_distance};
use crate::mode::Mode;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Color used for generated markers when no explicit data is bound.
    pub initial_root: String,
    /// Mode applied when binding generated data.
    pub initial_mode: Mode,
    /// Initial Analogous spacing, in artistic degrees.
    pub default_slice: f64,
    /// Marker count for [`HarmonyEngine::bind_default`].
    pub marker_count: usize,
    /// Radius of the wheel's disk, in frame units.
    pub wheel_radius: f64,
    /// Seed for the Monochromatic/Shades generator; entropy when unset.
    pub rng_seed: Option<u64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            initial_root: "red".to_string(),
            initial_mode: Mode::Analogous,
            default_slice: 15.0,
            marker_count: 5,
            wheel_radius: 175.0,
            rng_seed: None,
        }
    }
}

/// Input for one marker in an explicit bind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerSpec {
    /// Color specification: a named color, `#rgb`/`#rrggbb`, or
    /// `rgb(r, g, b)`.
    pub color: String,
    /// Optional display name; opaque to the engine.
    pub label: Option<String>,
    pub visible: bool,
}

impl MarkerSpec {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            label: None,
            visible: true,
        }
    }

    /// A labeled spec. Labeled swatches sit on the wheel's rim, so their
    /// saturation is pinned to 1 at bind time.
    pub fn named(color: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            label: Some(label.into()),
            visible: true,
        }
    }
}

impl From<&str> for MarkerSpec {
    fn from(color: &str) -> Self {
        Self::new(color)
    }
}

/// Ephemeral drag-gesture state: each marker's artistic-space hue at
/// gesture start, indexed by sequence position.
#[derive(Debug, Clone)]
struct DragState {
    starting_hues: Vec<f64>,
}

/// The color-harmony engine.
///
/// Owns an ordered set of wheel markers, the active harmony [`Mode`], and
/// the Analogous slice angle; keeps the harmony consistent as a host binds
/// data, switches modes, and drags markers. Hosts subscribe to
/// [`on_markers_changed`](Self::on_markers_changed) and
/// [`on_commit`](Self::on_commit) and re-read state when notified; the
/// marker set is never mutated from outside.
#[derive(Debug)]
pub struct HarmonyEngine {
    harmony: HarmonySet,
    mode: Mode,
    slice: f64,
    options: EngineOptions,
    geometry: WheelGeometry,
    drag: Option<DragState>,
    rng: StdRng,
    events: EventDispatcher,
}

impl Default for HarmonyEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl HarmonyEngine {
    /// Create an engine with no markers bound.
    pub fn new(options: EngineOptions) -> Self {
        let rng = match options.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            harmony: HarmonySet::default(),
            mode: options.initial_mode,
            slice: options.default_slice,
            geometry: WheelGeometry::new(options.wheel_radius),
            drag: None,
            rng,
            events: EventDispatcher::new(),
            options,
        }
    }

    /// The bound marker set.
    pub fn harmony(&self) -> &HarmonySet {
        &self.harmony
    }

    /// The active harmony mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The Analogous spacing, in artistic degrees.
    pub fn slice(&self) -> f64 {
        self.slice
    }

    /// The wheel geometry collaborator.
    pub fn geometry(&self) -> &WheelGeometry {
        &self.geometry
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The root marker, if any marker is visible.
    pub fn root(&self) -> Option<&Marker> {
        self.harmony.root()
    }

    /// Bind an explicit marker set, replacing any previous set. The engine
    /// switches to [`Mode::Custom`]: the supplied hues are held verbatim.
    ///
    /// Fails fast on an unparseable color, leaving the previous set bound.
    pub fn bind_colors(&mut self, specs: &[MarkerSpec]) -> Result<(), HarmonyError> {
        let mut markers = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let mut hsv = Hsv::parse(&spec.color)?;
            if spec.label.is_some() {
                hsv.saturation = 1.0;
            }
            markers.push(Marker::new(index, hsv, spec.label.clone(), spec.visible));
        }
        log::debug!("binding {} explicit markers", markers.len());
        self.harmony = HarmonySet::from_markers(markers);
        self.mode = Mode::Custom;
        self.drag = None;
        self.notify_markers_changed();
        self.notify_commit();
        Ok(())
    }

    /// Bind `count` generated markers seeded from the configured root color
    /// and regenerated under the configured initial mode.
    pub fn bind_generated(&mut self, count: usize) -> Result<(), HarmonyError> {
        let root = Hsv::parse(&self.options.initial_root)?;
        let markers = (0..count)
            .map(|index| Marker::new(index, root, None, true))
            .collect();
        log::debug!("binding {count} generated markers");
        self.harmony = HarmonySet::from_markers(markers);
        self.mode = self.options.initial_mode;
        self.drag = None;
        self.generate();
        self.notify_markers_changed();
        self.notify_commit();
        Ok(())
    }

    /// Bind with the configured default marker count.
    pub fn bind_default(&mut self) -> Result<(), HarmonyError> {
        let count = self.options.marker_count;
        self.bind_generated(count)
    }

    /// Switch harmony mode. Non-Custom modes regenerate all non-root
    /// markers immediately. Fires "markers changed" then "commit".
    pub fn set_mode(&mut self, mode: Mode) {
        log::debug!("mode set to {mode}");
        self.mode = mode;
        self.generate();
        self.notify_markers_changed();
        self.notify_commit();
    }

    /// Switch mode by display name, validating at the string boundary.
    /// Invalid names fail fast and leave mode and markers unchanged.
    pub fn set_mode_by_name(&mut self, name: &str) -> Result<(), HarmonyError> {
        let mode = name.parse::<Mode>()?;
        self.set_mode(mode);
        Ok(())
    }

    /// Re-run the active mode's generation rule from the current root.
    /// A set with no visible root is left untouched, silently.
    pub fn regenerate(&mut self) {
        if self.harmony.root().is_none() {
            log::debug!("regenerate skipped: no visible root");
            return;
        }
        self.generate();
        self.notify_markers_changed();
        self.notify_commit();
    }

    /// Begin a drag gesture: snapshot every marker's artistic-space hue.
    /// Starting a new gesture discards any state stranded by a drag that
    /// never ended.
    pub fn drag_start(&mut self) {
        let starting_hues = self
            .harmony
            .markers()
            .iter()
            .map(|m| scientific_to_artistic(m.hue()))
            .collect();
        self.drag = Some(DragState { starting_hues });
    }

    /// Process a drag movement of `target` to the frame position
    /// `position`.
    ///
    /// The dragged marker's hue and saturation are read from the wheel
    /// geometry (the pointer is clamped to the disk); every other visible
    /// marker is re-harmonized around it according to the active mode.
    /// A move without a preceding [`drag_start`](Self::drag_start) starts
    /// the gesture implicitly. Fires "markers changed".
    pub fn drag_move(&mut self, target: MarkerId, position: Point) -> Result<(), HarmonyError> {
        let target_index = self
            .harmony
            .index_of(target)
            .ok_or(HarmonyError::UnknownMarker(target))?;
        if !self.harmony.markers()[target_index].is_visible() {
            log::warn!("ignoring drag of hidden marker {target}");
            return Ok(());
        }
        if self.drag.is_none() {
            self.drag_start();
        }

        let clamped = self.geometry.point_on_circle(position);
        let (hue, saturation) = self.geometry.hue_sat_at(clamped);
        {
            let marker = self.harmony.marker_at_mut(target_index);
            marker.set_hue(hue);
            marker.set_saturation(saturation);
        }

        let Some(state) = &self.drag else {
            return Ok(());
        };
        let starting = state.starting_hues[target_index];
        let new_artistic = scientific_to_artistic(hue);
        // Rotate along the shorter path around the wheel.
        let theta1 = wrap_degrees(starting - new_artistic);
        let theta2 = wrap_degrees(new_artistic - starting);
        let theta = if theta1 < theta2 { -theta1 } else { theta2 };

        self.apply_rotation(target_index, theta);
        self.notify_markers_changed();
        Ok(())
    }

    /// Finish a drag gesture: clear the ephemeral state and, in Analogous
    /// mode, recalibrate the slice to the spacing the user settled on.
    /// Fires "commit".
    pub fn drag_end(&mut self) {
        if self.drag.take().is_none() {
            log::debug!("drag_end without an active gesture");
        }
        if self.mode == Mode::Analogous {
            self.recalibrate_slice();
        }
        self.notify_commit();
    }

    /// Slider-style direct value edit, bypassing hue math. Fires "markers
    /// changed"; call [`commit`](Self::commit) once the slider is released.
    pub fn set_marker_value(&mut self, target: MarkerId, value: f64) -> Result<(), HarmonyError> {
        let index = self
            .harmony
            .index_of(target)
            .ok_or(HarmonyError::UnknownMarker(target))?;
        self.harmony.marker_at_mut(index).set_value(value);
        self.notify_markers_changed();
        Ok(())
    }

    /// Show or hide a marker. Hidden markers keep their sequence slot but
    /// are excluded from harmony computation and distance counting. If the
    /// toggle re-establishes the root, non-Custom modes regenerate from the
    /// new root. Fires "markers changed" then "commit".
    pub fn set_marker_visible(
        &mut self,
        target: MarkerId,
        visible: bool,
    ) -> Result<(), HarmonyError> {
        let index = self
            .harmony
            .index_of(target)
            .ok_or(HarmonyError::UnknownMarker(target))?;
        let old_root = self.harmony.root().map(Marker::id);
        self.harmony.marker_at_mut(index).set_visible(visible);
        let new_root = self.harmony.root().map(Marker::id);
        if old_root != new_root && self.mode != Mode::Custom {
            self.generate();
        }
        self.notify_markers_changed();
        self.notify_commit();
        Ok(())
    }

    /// Signal that an interaction settled. Fires "commit".
    pub fn commit(&mut self) {
        self.notify_commit();
    }

    /// Visible colors sorted ascending by hue, in the requested encoding.
    pub fn read_colors(&self, encoding: ColorEncoding) -> Vec<String> {
        self.harmony.colors_as(encoding)
    }

    /// Wheel-frame position of a marker, for placement by a renderer.
    pub fn marker_position(&self, target: MarkerId) -> Option<Point> {
        self.harmony
            .get(target)
            .map(|m| self.geometry.position_for(m.hue(), m.saturation()))
    }

    /// Subscribe to "markers changed", fired after every hue, saturation,
    /// or value mutation.
    pub fn on_markers_changed(
        &mut self,
        listener: impl FnMut(&HarmonySet) + 'static,
    ) -> ListenerId {
        self.events.on_markers_changed(listener)
    }

    /// Subscribe to "commit", fired once per settled interaction.
    pub fn on_commit(&mut self, listener: impl FnMut(&HarmonySet) + 'static) -> ListenerId {
        self.events.on_commit(listener)
    }

    /// Remove a previously subscribed listener.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Rewrite every non-root visible marker from the root under the
    /// active mode's rule. The root itself is never touched.
    fn generate(&mut self) {
        if self.mode == Mode::Custom {
            return;
        }
        let visible = self.harmony.visible_indices();
        let Some(&root_index) = visible.first() else {
            return;
        };
        let root_hue = self.harmony.markers()[root_index].hue();
        let root_artistic = scientific_to_artistic(root_hue);
        let step = self.mode.saturation_step();

        for (i, &index) in visible.iter().enumerate().skip(1) {
            match self.mode {
                Mode::Analogous => {
                    let offset = marker_distance(i) as f64 * self.slice;
                    let hue = wrap_degrees(root_artistic + offset);
                    let marker = self.harmony.marker_at_mut(index);
                    marker.set_hue(artistic_to_scientific(hue));
                    marker.set_saturation(1.0);
                    marker.set_value(1.0);
                }
                Mode::Monochromatic => {
                    let saturation = 1.0 - (0.15 * i as f64 + self.rng.random::<f64>() * 0.1);
                    let value = 0.75 + self.rng.random::<f64>() * 0.25;
                    let marker = self.harmony.marker_at_mut(index);
                    marker.set_hue(root_hue);
                    marker.set_saturation(saturation);
                    marker.set_value(value);
                }
                Mode::Shades => {
                    let value = 0.25 + self.rng.random::<f64>() * 0.75;
                    let marker = self.harmony.marker_at_mut(index);
                    marker.set_hue(root_hue);
                    marker.set_saturation(1.0);
                    marker.set_value(value);
                }
                Mode::Complementary | Mode::Triad | Mode::Tetrad => {
                    let period = self
                        .mode
                        .hue_period()
                        .unwrap_or(1);
                    let angle = 360.0 / period as f64;
                    let hue = wrap_degrees(root_artistic + (i % period) as f64 * angle);
                    let marker = self.harmony.marker_at_mut(index);
                    marker.set_hue(artistic_to_scientific(hue));
                    marker.set_saturation(1.0 - step * (i / period) as f64);
                    marker.set_value(1.0);
                }
                Mode::Custom => {}
            }
        }
    }

    /// Rotate the non-dragged visible markers around the wheel by `theta`
    /// artistic degrees, scaled per mode.
    fn apply_rotation(&mut self, target_index: usize, theta: f64) {
        let Some(state) = &self.drag else {
            return;
        };
        let visible = self.harmony.visible_indices();
        let Some(target_position) = visible.iter().position(|&ix| ix == target_index) else {
            return;
        };

        match self.mode {
            Mode::Custom => {}
            Mode::Analogous => {
                let target_distance = marker_distance(target_position);
                for (position, &index) in visible.iter().enumerate() {
                    if index == target_index {
                        continue;
                    }
                    // Dragging the root rotates the whole harmony uniformly.
                    let ratio = if target_distance == 0 {
                        1.0
                    } else {
                        marker_distance(position) as f64 / target_distance as f64
                    };
                    let hue = wrap_degrees(state.starting_hues[index] + ratio * theta);
                    self.harmony
                        .marker_at_mut(index)
                        .set_hue(artistic_to_scientific(hue));
                }
            }
            _ => {
                for &index in &visible {
                    if index != target_index {
                        let hue = wrap_degrees(state.starting_hues[index] + theta);
                        self.harmony
                            .marker_at_mut(index)
                            .set_hue(artistic_to_scientific(hue));
                    }
                    if self.mode == Mode::Shades {
                        self.harmony.marker_at_mut(index).set_saturation(1.0);
                    }
                }
            }
        }
    }

    /// Store the observed artistic-space gap between the root and its
    /// nearest analog neighbor so regeneration reproduces the spacing the
    /// user settled on.
    fn recalibrate_slice(&mut self) {
        let visible = self.harmony.visible_indices();
        let Some((&root_index, rest)) = visible.split_first() else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        let root_artistic = scientific_to_artistic(self.harmony.markers()[root_index].hue());
        let mut gap = f64::INFINITY;
        for &index in rest {
            let artistic = scientific_to_artistic(self.harmony.markers()[index].hue());
            let clockwise = wrap_degrees(root_artistic - artistic);
            let counter_clockwise = wrap_degrees(artistic - root_artistic);
            gap = gap.min(clockwise.min(counter_clockwise));
        }
        if gap.is_finite() {
            log::debug!("slice recalibrated to {gap:.3} degrees");
            self.slice = gap;
        }
    }

    fn notify_markers_changed(&mut self) {
        self.events.emit_markers_changed(&self.harmony);
    }

    fn notify_commit(&mut self) {
        self.events.emit_commit(&self.harmony);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const TOLERANCE: f64 = 1e-6;

    fn seeded_options() -> EngineOptions {
        EngineOptions {
            rng_seed: Some(7),
            ..EngineOptions::default()
        }
    }

    fn artistic_hues(engine: &HarmonyEngine) -> Vec<f64> {
        engine
            .harmony()
            .markers()
            .iter()
            .map(|m| scientific_to_artistic(m.hue()))
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < TOLERANCE,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_analogous_symmetry() {
        let mut engine = HarmonyEngine::new(EngineOptions {
            default_slice: 20.0,
            ..seeded_options()
        });
        engine.bind_generated(5).unwrap();

        let hues = artistic_hues(&engine);
        for (actual, expected) in hues.into_iter().zip([0.0, 20.0, 340.0, 40.0, 320.0]) {
            assert_close(actual, expected);
        }
        for marker in engine.harmony().markers() {
            assert_close(marker.saturation(), 1.0);
            assert_close(marker.value(), 1.0);
        }
    }

    #[test]
    fn test_bind_colors_holds_hues_verbatim() {
        let mut engine = HarmonyEngine::new(seeded_options());
        let specs: Vec<MarkerSpec> = ["blue", "red", "green"].map(MarkerSpec::from).to_vec();
        engine.bind_colors(&specs).unwrap();

        assert_eq!(engine.mode(), Mode::Custom);
        assert_close(engine.harmony().markers()[0].hue(), 240.0);
        assert_close(engine.harmony().markers()[1].hue(), 0.0);
        assert_close(engine.harmony().markers()[2].hue(), 120.0);
    }

    #[test]
    fn test_bind_colors_invalid_leaves_state() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine.bind_generated(3).unwrap();
        let before: Vec<f64> = engine.harmony().markers().iter().map(Marker::hue).collect();

        let specs = [MarkerSpec::new("red"), MarkerSpec::new("no-such-color")];
        assert!(engine.bind_colors(&specs).is_err());

        let after: Vec<f64> = engine.harmony().markers().iter().map(Marker::hue).collect();
        assert_eq!(before, after);
        assert_eq!(engine.mode(), Mode::Analogous);
    }

    #[test]
    fn test_labeled_specs_pin_saturation() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine
            .bind_colors(&[MarkerSpec::named("#400000", "dark red")])
            .unwrap();
        let marker = &engine.harmony().markers()[0];
        assert_close(marker.saturation(), 1.0);
        assert_eq!(marker.label(), Some("dark red"));
    }

    #[test]
    fn test_complementary_rule() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine.bind_generated(5).unwrap();
        engine.set_mode(Mode::Complementary);

        let hues = artistic_hues(&engine);
        for (actual, expected) in hues.into_iter().zip([0.0, 180.0, 0.0, 180.0, 0.0]) {
            assert_close(actual, expected);
        }
        let saturations: Vec<f64> = engine
            .harmony()
            .markers()
            .iter()
            .map(Marker::saturation)
            .collect();
        for (actual, expected) in saturations.into_iter().zip([1.0, 1.0, 0.8, 0.8, 0.6]) {
            assert_close(actual, expected);
        }
    }

    #[test]
    fn test_triad_and_tetrad_rules() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine.bind_generated(4).unwrap();

        engine.set_mode(Mode::Triad);
        let hues = artistic_hues(&engine);
        for (actual, expected) in hues.into_iter().zip([0.0, 120.0, 240.0, 0.0]) {
            assert_close(actual, expected);
        }
        assert_close(engine.harmony().markers()[3].saturation(), 0.7);

        engine.set_mode(Mode::Tetrad);
        let hues = artistic_hues(&engine);
        for (actual, expected) in hues.into_iter().zip([0.0, 90.0, 180.0, 270.0]) {
            assert_close(actual, expected);
        }
    }

    #[test]
    fn test_mode_switch_idempotent() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine.bind_generated(5).unwrap();
        engine.set_mode(Mode::Tetrad);
        let first: Vec<f64> = engine.harmony().markers().iter().map(Marker::hue).collect();

        engine.set_mode(Mode::Tetrad);
        let second: Vec<f64> = engine.harmony().markers().iter().map(Marker::hue).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_monochromatic_bounds() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine.bind_generated(5).unwrap();
        engine.set_mode(Mode::Monochromatic);

        let root_hue = engine.root().unwrap().hue();
        for (i, marker) in engine.harmony().markers().iter().enumerate().skip(1) {
            assert_close(marker.hue(), root_hue);
            let upper = 1.0 - 0.15 * i as f64;
            assert!(marker.saturation() <= upper + TOLERANCE);
            assert!(marker.saturation() >= upper - 0.1 - TOLERANCE);
            assert!(marker.value() >= 0.75 && marker.value() <= 1.0);
        }
    }

    #[test]
    fn test_shades_bounds() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine.bind_generated(6).unwrap();
        engine.set_mode(Mode::Shades);

        for marker in engine.harmony().markers().iter().skip(1) {
            assert_close(marker.saturation(), 1.0);
            assert!(marker.value() >= 0.25 && marker.value() <= 1.0);
        }
    }

    #[test]
    fn test_regeneration_leaves_root_untouched() {
        let mut engine = HarmonyEngine::new(seeded_options());
        let specs: Vec<MarkerSpec> = ["#804020", "red", "blue"].map(MarkerSpec::from).to_vec();
        engine.bind_colors(&specs).unwrap();
        let root = engine.root().unwrap();
        let (hue, saturation, value) = (root.hue(), root.saturation(), root.value());

        engine.set_mode(Mode::Shades);
        let root = engine.root().unwrap();
        assert_close(root.hue(), hue);
        assert_close(root.saturation(), saturation);
        assert_close(root.value(), value);
    }

    #[test]
    fn test_wrap_invariant_after_regeneration() {
        let mut engine = HarmonyEngine::new(EngineOptions {
            initial_root: "magenta".to_string(),
            default_slice: 20.0,
            ..seeded_options()
        });
        engine.bind_generated(7).unwrap();

        for marker in engine.harmony().markers() {
            assert!(marker.hue() >= 0.0 && marker.hue() < 360.0);
            assert!(marker.saturation() >= 0.0 && marker.saturation() <= 1.0);
            assert!(marker.value() >= 0.0 && marker.value() <= 1.0);
        }
        // Magenta sits at artistic 330; ring +2 wraps past zero.
        let hues = artistic_hues(&engine);
        assert_close(hues[3], 10.0);
    }

    #[test]
    fn test_invalid_mode_name_fails_fast() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine.bind_generated(3).unwrap();
        let before: Vec<f64> = engine.harmony().markers().iter().map(Marker::hue).collect();

        let result = engine.set_mode_by_name("Squares");
        assert!(matches!(result, Err(HarmonyError::InvalidMode(_))));
        assert_eq!(engine.mode(), Mode::Analogous);
        let after: Vec<f64> = engine.harmony().markers().iter().map(Marker::hue).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_empty_set_operations_are_noops() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine.bind_colors(&[]).unwrap();

        engine.set_mode(Mode::Analogous);
        engine.regenerate();
        engine.drag_start();
        engine.drag_end();
        assert!(engine.read_colors(ColorEncoding::Hex).is_empty());
    }

    #[test]
    fn test_drag_ratio_scales_by_ring_index() {
        let mut engine = HarmonyEngine::new(EngineOptions {
            default_slice: 20.0,
            ..seeded_options()
        });
        engine.bind_generated(5).unwrap();
        // Artistic layout: [0, 20, 340, 40, 320]; sequence index 3 is ring +2.
        let target = engine.harmony().markers()[3].id();

        engine.drag_start();
        let destination = engine
            .geometry()
            .position_for(artistic_to_scientific(50.0), 1.0);
        engine.drag_move(target, destination).unwrap();

        let hues = artistic_hues(&engine);
        assert_close(hues[0], 0.0); // root, ring 0: ratio 0
        assert_close(hues[1], 25.0); // ring +1: ratio 1/2
        assert_close(hues[2], 335.0); // ring -1: ratio -1/2
        assert_close(hues[3], 50.0); // dragged
        assert_close(hues[4], 310.0); // ring -2: ratio -1
    }

    #[test]
    fn test_dragging_root_rotates_uniformly() {
        let mut engine = HarmonyEngine::new(EngineOptions {
            default_slice: 20.0,
            ..seeded_options()
        });
        engine.bind_generated(3).unwrap();
        let root = engine.harmony().markers()[0].id();

        engine.drag_start();
        let destination = engine
            .geometry()
            .position_for(artistic_to_scientific(30.0), 1.0);
        engine.drag_move(root, destination).unwrap();

        let hues = artistic_hues(&engine);
        assert_close(hues[0], 30.0);
        assert_close(hues[1], 50.0);
        assert_close(hues[2], 10.0);
    }

    #[test]
    fn test_drag_other_modes_rotates_uniformly() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine.bind_generated(3).unwrap();
        engine.set_mode(Mode::Complementary);
        // Artistic layout: [0, 180, 0].
        let target = engine.harmony().markers()[1].id();

        engine.drag_start();
        let destination = engine
            .geometry()
            .position_for(artistic_to_scientific(190.0), 1.0);
        engine.drag_move(target, destination).unwrap();

        let hues = artistic_hues(&engine);
        assert_close(hues[0], 10.0);
        assert_close(hues[1], 190.0);
        assert_close(hues[2], 10.0);
    }

    #[test]
    fn test_drag_custom_moves_only_target() {
        let mut engine = HarmonyEngine::new(seeded_options());
        let specs: Vec<MarkerSpec> = ["red", "green", "blue"].map(MarkerSpec::from).to_vec();
        engine.bind_colors(&specs).unwrap();
        let target = engine.harmony().markers()[1].id();

        engine.drag_start();
        let destination = engine
            .geometry()
            .position_for(artistic_to_scientific(200.0), 0.5);
        engine.drag_move(target, destination).unwrap();

        assert_close(engine.harmony().markers()[0].hue(), 0.0);
        assert_close(
            scientific_to_artistic(engine.harmony().markers()[1].hue()),
            200.0,
        );
        assert_close(engine.harmony().markers()[1].saturation(), 0.5);
        assert_close(engine.harmony().markers()[2].hue(), 240.0);
    }

    #[test]
    fn test_drag_takes_shorter_path() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine.bind_generated(2).unwrap();
        engine.set_mode(Mode::Complementary);
        let root = engine.harmony().markers()[0].id();

        engine.drag_start();
        // From artistic 0 to 350: ten degrees clockwise, not 350 counter.
        let destination = engine
            .geometry()
            .position_for(artistic_to_scientific(350.0), 1.0);
        engine.drag_move(root, destination).unwrap();

        let hues = artistic_hues(&engine);
        assert_close(hues[1], 170.0);
    }

    #[test]
    fn test_drag_move_implicitly_starts() {
        let mut engine = HarmonyEngine::new(EngineOptions {
            default_slice: 20.0,
            ..seeded_options()
        });
        engine.bind_generated(3).unwrap();
        let root = engine.harmony().markers()[0].id();

        let destination = engine
            .geometry()
            .position_for(artistic_to_scientific(15.0), 1.0);
        engine.drag_move(root, destination).unwrap();

        let hues = artistic_hues(&engine);
        assert_close(hues[1], 35.0);
        assert_close(hues[2], 355.0);
    }

    #[test]
    fn test_drag_end_recalibrates_slice() {
        let mut engine = HarmonyEngine::new(EngineOptions {
            default_slice: 20.0,
            ..seeded_options()
        });
        engine.bind_generated(5).unwrap();
        let target = engine.harmony().markers()[3].id();

        engine.drag_start();
        let destination = engine
            .geometry()
            .position_for(artistic_to_scientific(50.0), 1.0);
        engine.drag_move(target, destination).unwrap();
        engine.drag_end();

        // Nearest analog neighbor settled 25 degrees from the root.
        assert_close(engine.slice(), 25.0);

        // Regeneration now reproduces the dragged layout.
        engine.set_mode(Mode::Analogous);
        let hues = artistic_hues(&engine);
        for (actual, expected) in hues.into_iter().zip([0.0, 25.0, 335.0, 50.0, 310.0]) {
            assert_close(actual, expected);
        }
    }

    #[test]
    fn test_drag_unknown_marker() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine.bind_generated(3).unwrap();
        let result = engine.drag_move(MarkerId::new_v4(), Point::new(0.0, 0.0));
        assert!(matches!(result, Err(HarmonyError::UnknownMarker(_))));
    }

    #[test]
    fn test_shades_drag_pins_saturation() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine.bind_generated(3).unwrap();
        engine.set_mode(Mode::Shades);
        let target = engine.harmony().markers()[1].id();

        engine.drag_start();
        // Drop the pointer halfway into the disk: saturation 0.5 from
        // geometry, pinned back to 1 by the mode.
        let destination = engine
            .geometry()
            .position_for(artistic_to_scientific(90.0), 0.5);
        engine.drag_move(target, destination).unwrap();

        for marker in engine.harmony().markers() {
            assert_close(marker.saturation(), 1.0);
        }
    }

    #[test]
    fn test_set_marker_value_clamps() {
        let mut engine = HarmonyEngine::new(seeded_options());
        engine.bind_generated(2).unwrap();
        let target = engine.harmony().markers()[1].id();

        engine.set_marker_value(target, 1.5).unwrap();
        assert_close(engine.harmony().markers()[1].value(), 1.0);
        engine.set_marker_value(target, 0.3).unwrap();
        assert_close(engine.harmony().markers()[1].value(), 0.3);
    }

    #[test]
    fn test_hiding_root_reestablishes_and_regenerates() {
        let mut engine = HarmonyEngine::new(EngineOptions {
            default_slice: 20.0,
            ..seeded_options()
        });
        engine.bind_generated(3).unwrap();
        let old_root = engine.harmony().markers()[0].id();
        let new_root = engine.harmony().markers()[1].id();

        engine.set_marker_visible(old_root, false).unwrap();
        assert!(engine.harmony().is_root(new_root));

        // The surviving markers regenerate around the new root at
        // artistic 20.
        let hues = artistic_hues(&engine);
        assert_close(hues[1], 20.0);
        assert_close(hues[2], 40.0);
    }

    #[test]
    fn test_events_fire_per_contract() {
        let mut engine = HarmonyEngine::new(seeded_options());
        let updates = Rc::new(RefCell::new(0));
        let commits = Rc::new(RefCell::new(0));

        let u = Rc::clone(&updates);
        engine.on_markers_changed(move |_| *u.borrow_mut() += 1);
        let c = Rc::clone(&commits);
        engine.on_commit(move |_| *c.borrow_mut() += 1);

        engine.bind_generated(3).unwrap();
        assert_eq!((*updates.borrow(), *commits.borrow()), (1, 1));

        let root = engine.harmony().markers()[0].id();
        engine.drag_start();
        let destination = engine
            .geometry()
            .position_for(artistic_to_scientific(30.0), 1.0);
        engine.drag_move(root, destination).unwrap();
        engine.drag_move(root, destination).unwrap();
        assert_eq!((*updates.borrow(), *commits.borrow()), (3, 1));

        engine.drag_end();
        assert_eq!((*updates.borrow(), *commits.borrow()), (3, 2));

        engine.set_marker_value(root, 0.5).unwrap();
        engine.commit();
        assert_eq!((*updates.borrow(), *commits.borrow()), (4, 3));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut engine = HarmonyEngine::new(seeded_options());
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let id = engine.on_commit(move |_| *c.borrow_mut() += 1);

        engine.bind_generated(2).unwrap();
        assert!(engine.unsubscribe(id));
        engine.commit();
        assert_eq!(*count.borrow(), 1);
    }
}
