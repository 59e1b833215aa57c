//! Zoom and pan limits derived from the layout's content box.
//!
//! Zooming out stops once the whole content fits the viewport, and panning
//! stops at the content edges, so the view never shows blank space beyond
//! the first or last year or outside the outermost tiers.

use super::config::ZoomConfig;
use super::geometry::{Point, Rect, Viewport};
use super::layout::Layout;
use super::viewport::ViewTransform;

/// Scale range plus world-space translate extent for one layout/viewport pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomBounds {
	pub min_scale: f64,
	pub max_scale: f64,
	pub extent: Rect,
}

impl ZoomBounds {
	/// Recompute for a layout. Call again on every resize or layout change.
	pub fn for_layout(layout: &Layout, viewport: Viewport, config: &ZoomConfig) -> Self {
		let extent = layout
			.content_bounds()
			.map(|rect| rect.expand(0.0, config.content_padding))
			.unwrap_or(Rect::new(0.0, 0.0, viewport.width, viewport.height));
		Self::for_extent(extent, viewport, config)
	}

	pub fn for_extent(extent: Rect, viewport: Viewport, config: &ZoomConfig) -> Self {
		let fit_x = viewport.width / extent.width.max(f64::EPSILON);
		let fit_y = viewport.height / extent.height.max(f64::EPSILON);
		let min_scale = fit_x.min(fit_y).max(config.min_scale_floor);
		Self {
			min_scale,
			max_scale: config.max_scale.max(min_scale),
			extent,
		}
	}

	pub fn clamp_scale(&self, k: f64) -> f64 {
		k.clamp(self.min_scale, self.max_scale)
	}

	/// Clamp scale, then shift so the viewport stays inside the extent.
	/// Along an axis where the viewport is larger than the extent, the
	/// content is centered instead.
	pub fn constrain(&self, transform: ViewTransform, viewport: Viewport) -> ViewTransform {
		let k = self.clamp_scale(transform.k);
		let t = if k == transform.k {
			transform
		} else {
			transform.scaled_about(k, Point::new(viewport.width / 2.0, viewport.height / 2.0))
		};

		let top_left = t.invert(Point::new(0.0, 0.0));
		let bottom_right = t.invert(Point::new(viewport.width, viewport.height));
		let dx = axis_shift(
			top_left.x - self.extent.x,
			bottom_right.x - self.extent.right(),
		);
		let dy = axis_shift(
			top_left.y - self.extent.y,
			bottom_right.y - self.extent.bottom(),
		);
		t.translated(dx, dy)
	}

	/// Zoom by `factor` around a screen point, within bounds.
	pub fn zoom_at(
		&self,
		transform: ViewTransform,
		factor: f64,
		anchor: Point,
		viewport: Viewport,
	) -> ViewTransform {
		let k = self.clamp_scale(transform.k * factor);
		self.constrain(transform.scaled_about(k, anchor), viewport)
	}

	/// Pan by a screen-space delta, within bounds.
	pub fn pan_by(&self, transform: ViewTransform, dx: f64, dy: f64, viewport: Viewport) -> ViewTransform {
		self.constrain(
			ViewTransform::new(transform.x + dx, transform.y + dy, transform.k),
			viewport,
		)
	}
}

/// World-space shift for one axis. `low` is how far the viewport's low edge
/// sits past the extent's low edge, `high` likewise for the high edges.
fn axis_shift(low: f64, high: f64) -> f64 {
	if high > low {
		(low + high) / 2.0
	} else if low < 0.0 {
		low
	} else if high > 0.0 {
		high
	} else {
		0.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bounds() -> ZoomBounds {
		ZoomBounds::for_extent(
			Rect::new(0.0, 0.0, 1600.0, 600.0),
			Viewport::new(800.0, 600.0),
			&ZoomConfig::default(),
		)
	}

	#[test]
	fn min_scale_fits_content() {
		let b = bounds();
		assert_eq!(b.min_scale, 0.5);
		assert_eq!(b.max_scale, 10.0);
	}

	#[test]
	fn min_scale_is_floored() {
		let b = ZoomBounds::for_extent(
			Rect::new(0.0, 0.0, 1.0e7, 600.0),
			Viewport::new(800.0, 600.0),
			&ZoomConfig::default(),
		);
		assert_eq!(b.min_scale, 0.05);
	}

	#[test]
	fn pan_stops_at_content_edges() {
		let b = bounds();
		let viewport = Viewport::new(800.0, 600.0);
		let t = b.pan_by(ViewTransform::IDENTITY, 300.0, 0.0, viewport);
		assert_eq!(t, ViewTransform::IDENTITY);
		let t = b.pan_by(ViewTransform::IDENTITY, -5000.0, 0.0, viewport);
		assert_eq!(t.x, -800.0);
	}

	#[test]
	fn zoomed_out_content_is_centered() {
		let b = bounds();
		let viewport = Viewport::new(800.0, 600.0);
		let t = b.constrain(ViewTransform::new(0.0, 0.0, 0.5), viewport);
		assert_eq!(t, ViewTransform::new(0.0, 150.0, 0.5));
		let visible = t.visible_world(viewport);
		assert_eq!(visible.x, 0.0);
		assert_eq!(visible.right(), 1600.0);
	}

	#[test]
	fn zoom_is_clamped_and_stays_inside() {
		let b = bounds();
		let viewport = Viewport::new(800.0, 600.0);
		let t = b.zoom_at(ViewTransform::IDENTITY, 0.01, Point::new(400.0, 300.0), viewport);
		assert_eq!(t.k, 0.5);
		let visible = t.visible_world(viewport);
		assert!(visible.x >= -1e-9 && visible.right() <= 1600.0 + 1e-9);

		let t = b.zoom_at(ViewTransform::IDENTITY, 100.0, Point::new(400.0, 300.0), viewport);
		assert_eq!(t.k, 10.0);
	}
}
