//! Interaction session: the one owner of mutable view state.
//!
//! A session holds the active [`Layout`] (shared, read-only) and the pan/zoom
//! transform, plus everything that reacts to transform changes: zoom bounds,
//! the LOD state machine, the debounced visible subset, camera transitions,
//! and pulse animations. The canvas component drives it with input events
//! and one [`tick`](InteractionSession::tick) per animation frame.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::debug;

use super::bounds::ZoomBounds;
use super::config::RiverConfig;
use super::geometry::{Point, Viewport};
use super::layout::{Layout, PositionedLink, PositionedNode};
use super::navigation::{
	PulseAction, PulseTarget, TransformTransition, find_path_indices, focus_transform,
	node_pulse_steps, path_pulse_steps,
};
use super::renderer::{RenderDetail, select_detail};
use super::scene::Scene;
use super::schedule::{Debouncer, SequenceId, Timeline};
use super::theme::Theme;
use super::types::NodeId;
use super::viewport::{ViewTransform, ViewportManager, VisibleSubset};
use super::zoom_level::{ZoomLevel, ZoomLevelManager};

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	/// Largest distance from the start point, to tell clicks from drags.
	pub travel: f64,
}

/// Per-element pulse intensities with smooth transitions.
///
/// Each pulsing node or link has an intensity (0.0 to 1.0) that eases toward
/// 1.0 while its pulse is active and decays back to 0.0 once released.
/// Uses exponential smoothing: `value += (target - value) * (1 - e^(-speed * dt))`.
#[derive(Clone, Debug, Default)]
pub struct PulseState {
	active: HashSet<PulseTarget>,
	intensity: HashMap<PulseTarget, f64>,
}

impl PulseState {
	pub fn apply(&mut self, action: PulseAction) {
		match action {
			PulseAction::Start(target) => {
				self.active.insert(target);
			}
			PulseAction::Stop(target) => {
				self.active.remove(&target);
			}
		}
	}

	/// Release every active pulse matching `predicate`; intensities decay.
	pub fn release_where(&mut self, predicate: impl Fn(&PulseTarget) -> bool) {
		self.active.retain(|target| !predicate(target));
	}

	/// Advance by `dt_ms` milliseconds.
	pub fn tick(&mut self, dt_ms: f64) {
		// ~120ms to 95% on the way up, ~750ms on the way down
		const RISE_SPEED: f64 = 25.0;
		const DECAY_SPEED: f64 = 4.0;

		let dt = dt_ms / 1000.0;
		let rise = 1.0 - (-RISE_SPEED * dt).exp();
		let decay = (-DECAY_SPEED * dt).exp();

		for &target in &self.active {
			let value = self.intensity.entry(target).or_insert(0.0);
			*value += (1.0 - *value) * rise;
		}
		let active = &self.active;
		self.intensity.retain(|target, value| {
			if active.contains(target) {
				return true;
			}
			*value *= decay;
			*value > 0.005
		});
	}

	pub fn intensity(&self, target: PulseTarget) -> f64 {
		self.intensity.get(&target).copied().unwrap_or(0.0)
	}

	pub fn is_active(&self, target: PulseTarget) -> bool {
		self.active.contains(&target)
	}

	pub fn is_animating(&self) -> bool {
		!self.active.is_empty() || !self.intensity.is_empty()
	}

	pub fn clear(&mut self) {
		self.active.clear();
		self.intensity.clear();
	}
}

/// What changed during one [`InteractionSession::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameUpdate {
	pub transform_changed: bool,
	pub visibility_changed: bool,
	/// More frames are needed (transition, pulses, or a pending re-cull).
	pub animating: bool,
}

/// Owned view state for one mounted river.
pub struct InteractionSession {
	config: RiverConfig,
	layout: Rc<Layout>,
	transform: ViewTransform,
	bounds: ZoomBounds,
	culler: ViewportManager,
	visible: VisibleSubset,
	zoom_levels: ZoomLevelManager,
	recull: Debouncer,
	timeline: Timeline<PulseAction>,
	pulses: PulseState,
	transition: Option<TransformTransition>,
	focus_sequence: Option<SequenceId>,
	path_sequence: Option<SequenceId>,
	last_tick: Option<f64>,
	/// Drag state, owned by the mouse handlers.
	pub pan: PanState,
}

impl InteractionSession {
	/// Start at the constrained identity transform with everything culled once.
	pub fn new(layout: Rc<Layout>, viewport: Viewport, config: RiverConfig) -> Self {
		let bounds = ZoomBounds::for_layout(&layout, viewport, &config.zoom);
		let transform = bounds.constrain(ViewTransform::IDENTITY, viewport);
		let culler = ViewportManager::new(viewport, config.viewport.cull_padding);
		let visible = culler.cull(&layout, &transform);
		let mut zoom_levels = ZoomLevelManager::new(config.zoom.detail_threshold);
		zoom_levels.update_scale(transform.k);

		Self {
			recull: Debouncer::new(config.viewport.debounce_ms),
			config,
			layout,
			transform,
			bounds,
			culler,
			visible,
			zoom_levels,
			timeline: Timeline::new(),
			pulses: PulseState::default(),
			transition: None,
			focus_sequence: None,
			path_sequence: None,
			last_tick: None,
			pan: PanState::default(),
		}
	}

	/// Layout being shown.
	pub fn layout(&self) -> &Rc<Layout> {
		&self.layout
	}

	/// Current world to screen transform.
	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	/// Canvas size.
	pub fn viewport(&self) -> Viewport {
		self.culler.viewport()
	}

	/// Current scale limits and content extent.
	pub fn bounds(&self) -> &ZoomBounds {
		&self.bounds
	}

	/// Configuration the session was built with.
	pub fn config(&self) -> &RiverConfig {
		&self.config
	}

	/// Detail level for the current scale.
	pub fn zoom_level(&self) -> ZoomLevel {
		self.zoom_levels.level()
	}

	/// Pulse intensities for the current frame.
	pub fn pulses(&self) -> &PulseState {
		&self.pulses
	}

	/// Indices that survived the last cull.
	pub fn visible(&self) -> &VisibleSubset {
		&self.visible
	}

	/// Register the LOD transition callback.
	pub fn on_level_change(&mut self, callback: impl FnMut(ZoomLevel, f64) + 'static) {
		self.zoom_levels.on_level_change(callback);
	}

	/// Swap in a freshly computed layout. Animations tied to the old
	/// layout's indices are dropped; bounds and culling are redone at once.
	pub fn set_layout(&mut self, layout: Rc<Layout>) {
		self.cancel_animations();
		self.pulses.clear();
		self.layout = layout;
		self.refresh_bounds();
	}

	/// Adopt a new canvas size; bounds are recomputed and the view re-constrained.
	pub fn resize(&mut self, viewport: Viewport) {
		self.culler.resize(viewport);
		self.transition = None;
		self.refresh_bounds();
	}

	fn refresh_bounds(&mut self) {
		let viewport = self.viewport();
		self.bounds = ZoomBounds::for_layout(&self.layout, viewport, &self.config.zoom);
		self.transform = self.bounds.constrain(self.transform, viewport);
		self.zoom_levels.update_scale(self.transform.k);
		self.recull.cancel();
		self.recull_now();
	}

	fn recull_now(&mut self) {
		self.visible = self.culler.cull(&self.layout, &self.transform);
	}

	/// Constrain and store a transform. Returns whether it changed.
	fn apply_transform(&mut self, transform: ViewTransform, now: f64) -> bool {
		let transform = self.bounds.constrain(transform, self.viewport());
		if transform == self.transform {
			return false;
		}
		self.transform = transform;
		self.zoom_levels.update_scale(transform.k);
		self.recull.schedule(now);
		true
	}

	/// Replace the transform directly (user gesture); interrupts any camera
	/// transition.
	pub fn set_transform(&mut self, transform: ViewTransform, now: f64) -> bool {
		self.transition = None;
		self.apply_transform(transform, now)
	}

	/// Wheel zoom around a screen point.
	pub fn zoom_at(&mut self, factor: f64, anchor: Point, now: f64) -> bool {
		let next = self
			.bounds
			.zoom_at(self.transform, factor, anchor, self.viewport());
		self.set_transform(next, now)
	}

	/// Start a drag at `screen`.
	pub fn begin_pan(&mut self, screen: Point) {
		self.transition = None;
		self.pan = PanState {
			active: true,
			start_x: screen.x,
			start_y: screen.y,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
			travel: 0.0,
		};
	}

	/// Continue a drag; the pan stops at the content edge.
	pub fn drag_pan(&mut self, screen: Point, now: f64) -> bool {
		if !self.pan.active {
			return false;
		}
		let (dx, dy) = (screen.x - self.pan.start_x, screen.y - self.pan.start_y);
		self.pan.travel = self.pan.travel.max((dx * dx + dy * dy).sqrt());
		let start = ViewTransform::new(
			self.pan.transform_start_x,
			self.pan.transform_start_y,
			self.transform.k,
		);
		let next = self.bounds.pan_by(start, dx, dy, self.viewport());
		self.set_transform(next, now)
	}

	/// Ends the pan; returns the distance travelled.
	pub fn end_pan(&mut self) -> f64 {
		let travel = self.pan.travel;
		self.pan = PanState::default();
		travel
	}

	/// Screen point to world coordinates under the current transform.
	pub fn screen_to_world(&self, screen: Point) -> Point {
		self.transform.invert(screen)
	}

	/// Topmost visible node under a screen point.
	pub fn node_at_screen(&self, screen: Point) -> Option<&PositionedNode> {
		self.layout.node_at(self.screen_to_world(screen))
	}

	/// Start an animated camera move to `target` (constrained to bounds).
	pub fn animate_to(&mut self, target: ViewTransform, duration_ms: f64, now: f64) {
		let viewport = self.viewport();
		let target = self.bounds.constrain(target, viewport);
		self.transition = Some(TransformTransition::new(
			self.transform,
			target,
			viewport,
			now,
			duration_ms,
		));
	}

	/// Animate back to the initial view.
	pub fn reset_zoom(&mut self, now: f64) {
		self.animate_to(ViewTransform::IDENTITY, self.config.zoom.reset_duration_ms, now);
	}

	/// Center `id` at the focus scale over `duration_ms`, pulsing the node
	/// for the same window. Returns `false` for unknown ids.
	pub fn focus_on_node(&mut self, id: &NodeId, duration_ms: f64, now: f64) -> bool {
		let Some(index) = self.layout.node_index(id) else {
			return false;
		};
		let target = focus_transform(
			self.layout.nodes[index].rect(),
			self.viewport(),
			self.config.zoom.focus_scale,
		);
		self.animate_to(target, duration_ms, now);

		if let Some(previous) = self.focus_sequence.take() {
			self.timeline.cancel(previous);
			self.pulses
				.release_where(|target| matches!(target, PulseTarget::Node(_)));
		}
		self.focus_sequence = Some(
			self.timeline
				.schedule_sequence(now, node_pulse_steps(index, duration_ms)),
		);
		debug!("lineage-river: focus on {id}");
		true
	}

	/// Pulse the links of the shortest path from `source` to `target` in
	/// order. Returns the hop count, or `None` when unreachable.
	pub fn highlight_path(&mut self, source: &NodeId, target: &NodeId, now: f64) -> Option<usize> {
		let path = find_path_indices(source, target, &self.layout.links)?;
		self.cancel_path_highlight();
		let navigation = &self.config.navigation;
		let steps = path_pulse_steps(&path, navigation.stagger_ms, navigation.pulse_ms);
		self.path_sequence = Some(self.timeline.schedule_sequence(now, steps));
		Some(path.len())
	}

	/// Stop the path highlight sequence; lit links fade out.
	pub fn cancel_path_highlight(&mut self) {
		if let Some(sequence) = self.path_sequence.take() {
			self.timeline.cancel(sequence);
			self.pulses
				.release_where(|target| matches!(target, PulseTarget::Link(_)));
		}
	}

	/// Stop camera moves and pending pulse events; lit elements fade out.
	pub fn cancel_animations(&mut self) {
		self.transition = None;
		self.timeline.cancel_all();
		self.focus_sequence = None;
		self.path_sequence = None;
		self.pulses.release_where(|_| true);
	}

	/// Tear down for unmount: animations stop and the LOD state resets.
	pub fn teardown(&mut self) {
		self.cancel_animations();
		self.pulses.clear();
		self.zoom_levels.reset();
	}

	/// Advance transitions, timed pulse events, and the debounced re-cull.
	pub fn tick(&mut self, now: f64) -> FrameUpdate {
		let dt = self.last_tick.map_or(0.0, |last| (now - last).max(0.0));
		self.last_tick = Some(now);
		let mut update = FrameUpdate::default();

		if let Some(transition) = self.transition {
			update.transform_changed = self.apply_transform(transition.sample(now), now);
			if transition.is_finished(now) {
				self.transition = None;
			}
		}

		for action in self.timeline.poll(now) {
			self.pulses.apply(action);
		}
		self.pulses.tick(dt);

		if self.recull.poll(now) {
			let before = self.visible.clone();
			self.recull_now();
			update.visibility_changed = before != self.visible;
		}

		update.animating = self.transition.is_some()
			|| !self.timeline.is_idle()
			|| self.pulses.is_animating()
			|| self.recull.is_pending();
		update
	}

	/// Culled nodes, in layout order.
	pub fn visible_nodes(&self) -> impl Iterator<Item = &PositionedNode> {
		self.visible
			.nodes
			.iter()
			.map(|&index| &self.layout.nodes[index])
	}

	/// Culled links, in layout order.
	pub fn visible_links(&self) -> impl Iterator<Item = &PositionedLink> {
		self.visible
			.links
			.iter()
			.map(|&index| &self.layout.links[index])
	}

	/// Level of detail for the visible subset at the current scale.
	pub fn render_detail(&self) -> RenderDetail {
		select_detail(self.visible.nodes.len(), self.transform.k, &self.config.lod)
	}

	/// Declarative description of the current frame.
	pub fn scene(&self, theme: &Theme) -> Scene {
		Scene::build(
			&self.layout,
			&self.visible,
			&self.pulses,
			self.render_detail(),
			theme,
		)
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use super::*;
	use crate::components::river::geometry::YearRange;
	use crate::components::river::layout::LayoutCalculator;
	use crate::components::river::types::GraphData;

	const GRAPH: &str = r#"{
		"nodes": [
			{ "id": "1", "founding_year": 1950, "dissolution_year": 1970, "eras": [{ "year": 1950, "name": "One", "tier": 1 }] },
			{ "id": "2", "founding_year": 1970, "dissolution_year": 1990, "eras": [{ "year": 1970, "name": "Two", "tier": 1 }] },
			{ "id": "3", "founding_year": 1960, "dissolution_year": 1985, "eras": [{ "year": 1960, "name": "Three", "tier": 2 }] },
			{ "id": "4", "founding_year": 1990, "eras": [{ "year": 1990, "name": "Four", "tier": 1 }] }
		],
		"links": [
			{ "source": "1", "target": "2", "type": "LEGAL_TRANSFER", "year": 1970 },
			{ "source": "2", "target": "4", "type": "MERGE", "year": 1990 },
			{ "source": "1", "target": "3", "type": "SPLIT", "year": 1960 },
			{ "source": "3", "target": "4", "type": "MERGE", "year": 1990 }
		]
	}"#;

	fn close(a: ViewTransform, b: ViewTransform) -> bool {
		(a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6 && (a.k - b.k).abs() < 1e-9
	}

	fn session() -> InteractionSession {
		let graph = GraphData::from_json(GRAPH).unwrap().validate().unwrap();
		let config = RiverConfig::default();
		let layout = LayoutCalculator::new(config.layout.clone(), 2024)
			.calculate(&graph, Viewport::new(800.0, 600.0), Some(YearRange::new(1950, 2000)))
			.unwrap();
		InteractionSession::new(Rc::new(layout), Viewport::new(800.0, 600.0), config)
	}

	#[test]
	fn starts_inside_bounds_with_everything_visible() {
		let s = session();
		assert!(close(s.transform(), s.bounds().constrain(s.transform(), s.viewport())));
		assert_eq!(s.visible_nodes().count(), 4);
		assert_eq!(s.visible_links().count(), 4);
	}

	#[test]
	fn recull_waits_for_debounce() {
		let mut s = session();
		assert!(s.zoom_at(8.0, Point::new(60.0, 60.0), 0.0));
		assert_eq!(s.visible().nodes.len(), 4);

		let update = s.tick(50.0);
		assert!(!update.visibility_changed);
		assert!(update.animating);

		assert!(s.zoom_at(1.1, Point::new(60.0, 60.0), 60.0));
		assert!(!s.tick(120.0).visibility_changed);
		let update = s.tick(160.0);
		assert!(update.visibility_changed);
		assert!(s.visible().nodes.len() < 4);
	}

	#[test]
	fn zoom_crossings_reach_the_callback() {
		let mut s = session();
		let levels = Rc::new(RefCell::new(Vec::new()));
		let sink = levels.clone();
		s.on_level_change(move |level, _| sink.borrow_mut().push(level));
		s.zoom_at(3.0, Point::new(400.0, 300.0), 0.0);
		s.zoom_at(1.05, Point::new(400.0, 300.0), 1.0);
		s.zoom_at(0.1, Point::new(400.0, 300.0), 2.0);
		assert_eq!(*levels.borrow(), vec![ZoomLevel::Detail, ZoomLevel::Overview]);
	}

	#[test]
	fn small_content_reports_its_starting_detail_level() {
		let graph = GraphData::from_json(GRAPH).unwrap().validate().unwrap();
		let config = RiverConfig::default();
		let layout = LayoutCalculator::new(config.layout.clone(), 2024)
			.calculate(&graph, Viewport::new(400.0, 600.0), Some(YearRange::new(1950, 2000)))
			.unwrap();
		let mut s = InteractionSession::new(Rc::new(layout), Viewport::new(800.0, 600.0), config);
		assert_eq!(s.zoom_level(), ZoomLevel::Detail);

		let levels = Rc::new(RefCell::new(Vec::new()));
		let sink = levels.clone();
		s.on_level_change(move |level, _| sink.borrow_mut().push(level));
		assert_eq!(*levels.borrow(), vec![ZoomLevel::Detail]);
	}

	#[test]
	fn focus_animates_and_pulses_node() {
		let mut s = session();
		assert!(s.focus_on_node(&NodeId::from("3"), 500.0, 0.0));
		s.tick(0.0);
		assert!(s.pulses().is_active(PulseTarget::Node(2)));

		let mid = s.tick(250.0);
		assert!(mid.transform_changed && mid.animating);

		s.tick(500.0);
		assert!((s.transform().k - 2.0).abs() < 1e-9);
		// The river is shorter than the view, so only X lands on center.
		let node = s.layout().nodes[2].rect().center();
		assert!((s.transform().apply(node).x - 400.0).abs() < 1e-6);
		assert!(!s.pulses().is_active(PulseTarget::Node(2)));

		assert!(!s.focus_on_node(&NodeId::from("nope"), 500.0, 600.0));
	}

	#[test]
	fn path_highlight_is_staggered_and_cancellable() {
		let mut s = session();
		assert_eq!(s.highlight_path(&"1".into(), &"4".into(), 0.0), Some(2));
		s.tick(0.0);
		assert!(s.pulses().is_active(PulseTarget::Link(0)));
		assert!(!s.pulses().is_active(PulseTarget::Link(1)));
		s.tick(200.0);
		assert!(s.pulses().is_active(PulseTarget::Link(1)));

		s.cancel_path_highlight();
		assert!(!s.pulses().is_active(PulseTarget::Link(0)));
		s.tick(5_000.0);
		assert!(!s.pulses().is_animating());

		assert_eq!(s.highlight_path(&"4".into(), &"1".into(), 0.0), None);
	}

	#[test]
	fn pulse_intensity_rises_and_decays() {
		let mut pulses = PulseState::default();
		let target = PulseTarget::Node(0);
		pulses.apply(PulseAction::Start(target));
		pulses.tick(200.0);
		assert!(pulses.intensity(target) > 0.9);
		pulses.apply(PulseAction::Stop(target));
		pulses.tick(100.0);
		let fading = pulses.intensity(target);
		assert!(fading > 0.0 && fading < 0.9);
		pulses.tick(5_000.0);
		assert_eq!(pulses.intensity(target), 0.0);
		assert!(!pulses.is_animating());
	}

	#[test]
	fn pan_clicks_and_drags_are_told_apart() {
		let mut s = session();
		s.begin_pan(Point::new(100.0, 100.0));
		s.drag_pan(Point::new(101.0, 100.0), 0.0);
		assert!(s.end_pan() < 3.0);
		assert!(!s.drag_pan(Point::new(300.0, 300.0), 1.0));
	}

	#[test]
	fn drags_stop_at_the_content_edge() {
		let mut s = session();
		s.zoom_at(4.0, Point::new(400.0, 300.0), 0.0);
		s.begin_pan(Point::new(100.0, 100.0));
		assert!(s.drag_pan(Point::new(5_000.0, 5_000.0), 1.0));
		assert!(close(s.transform(), s.bounds().constrain(s.transform(), s.viewport())));
		let left = s.screen_to_world(Point::new(0.0, 0.0)).x;
		assert!((left - s.bounds().extent.x).abs() < 1e-6);
		assert!(s.end_pan() > 4_000.0);
	}

	#[test]
	fn new_layout_recomputes_bounds() {
		let mut s = session();
		s.zoom_at(4.0, Point::new(400.0, 300.0), 0.0);
		let graph = GraphData::from_json(
			r#"{ "nodes": [{ "id": "solo", "founding_year": 1990, "eras": [{ "year": 1990, "name": "Solo" }] }], "links": [] }"#,
		)
		.unwrap()
		.validate()
		.unwrap();
		let layout = LayoutCalculator::new(s.config().layout.clone(), 2024)
			.calculate(&graph, s.viewport(), Some(YearRange::new(1950, 2000)))
			.unwrap();
		s.set_layout(Rc::new(layout));
		assert_eq!(s.visible().nodes, vec![0]);
		assert!(close(s.transform(), s.bounds().constrain(s.transform(), s.viewport())));
	}
}
