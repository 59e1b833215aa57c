//! Pan/zoom transform and viewport culling.

use std::collections::HashSet;

use super::geometry::{Point, Rect, Viewport};
use super::layout::{Layout, PositionedLink, PositionedNode};
use super::types::NodeId;

/// Pan and zoom transform applied to the whole river.
///
/// `screen = world * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal offset in screen pixels.
	pub x: f64,
	/// Vertical offset in screen pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewTransform {
	/// No pan, no zoom.
	pub const IDENTITY: ViewTransform = ViewTransform {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	/// Transform that maps world to `world * k + (x, y)`.
	pub fn new(x: f64, y: f64, k: f64) -> Self {
		Self { x, y, k }
	}

	/// World to screen.
	pub fn apply(&self, world: Point) -> Point {
		Point::new(world.x * self.k + self.x, world.y * self.k + self.y)
	}

	/// Screen to world.
	pub fn invert(&self, screen: Point) -> Point {
		Point::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
	}

	/// Shift by a world-space offset.
	pub fn translated(&self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + self.k * dx, self.y + self.k * dy, self.k)
	}

	/// Rescale to `k` keeping the world point under `anchor` (screen) fixed.
	pub fn scaled_about(&self, k: f64, anchor: Point) -> Self {
		let ratio = k / self.k;
		Self::new(
			anchor.x - (anchor.x - self.x) * ratio,
			anchor.y - (anchor.y - self.y) * ratio,
			k,
		)
	}

	/// World-space rectangle visible through `viewport`.
	pub fn visible_world(&self, viewport: Viewport) -> Rect {
		Rect::from_corners(
			self.invert(Point::new(0.0, 0.0)),
			self.invert(Point::new(viewport.width, viewport.height)),
		)
	}
}

/// Indices into a [`Layout`] that survive culling.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisibleSubset {
	pub nodes: Vec<usize>,
	pub links: Vec<usize>,
	pub markers: Vec<usize>,
}

/// Culls layout elements against the viewport.
#[derive(Clone, Debug)]
pub struct ViewportManager {
	viewport: Viewport,
	/// Screen pixels of slack around the viewport.
	padding: f64,
}

impl ViewportManager {
	/// Cull against `viewport` with `padding` screen pixels of slack.
	pub fn new(viewport: Viewport, padding: f64) -> Self {
		Self { viewport, padding }
	}

	/// Viewport being culled against.
	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	/// Cull against a new canvas size from now on.
	pub fn resize(&mut self, viewport: Viewport) {
		self.viewport = viewport;
	}

	/// Inverse-transformed viewport box, padded by the screen-space margin.
	pub fn world_bounds(&self, transform: &ViewTransform) -> Rect {
		let pad = self.padding / transform.k;
		transform.visible_world(self.viewport).expand(pad, pad)
	}

	/// Nodes whose rectangle intersects the padded viewport.
	pub fn visible_nodes<'a>(
		&self,
		nodes: &'a [PositionedNode],
		transform: &ViewTransform,
	) -> Vec<&'a PositionedNode> {
		let bounds = self.world_bounds(transform);
		nodes
			.iter()
			.filter(|node| node.rect().intersects(&bounds))
			.collect()
	}

	/// Links with at least one visible endpoint.
	pub fn visible_links<'a>(
		links: &'a [PositionedLink],
		visible: &HashSet<&NodeId>,
	) -> Vec<&'a PositionedLink> {
		links
			.iter()
			.filter(|link| visible.contains(&link.source) || visible.contains(&link.target))
			.collect()
	}

	/// Index-based culling of a whole layout; markers follow their link.
	pub fn cull(&self, layout: &Layout, transform: &ViewTransform) -> VisibleSubset {
		let bounds = self.world_bounds(transform);
		let shown: Vec<bool> = layout
			.nodes
			.iter()
			.map(|node| node.rect().intersects(&bounds))
			.collect();
		let nodes = (0..shown.len()).filter(|&index| shown[index]).collect();
		let link_shown: Vec<bool> = layout
			.links
			.iter()
			.map(|link| shown[link.source_index] || shown[link.target_index])
			.collect();
		let links = (0..link_shown.len())
			.filter(|&index| link_shown[index])
			.collect();
		let markers = layout
			.markers
			.iter()
			.enumerate()
			.filter(|(_, marker)| link_shown[marker.link])
			.map(|(index, _)| index)
			.collect();

		VisibleSubset {
			nodes,
			links,
			markers,
		}
	}
}
