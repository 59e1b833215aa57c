//! Zoom-dependent sizing for river visuals.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: layout coordinates. Values scale with zoom.
//! - **Screen-space**: canvas pixels. Values stay constant at any zoom.
//!
//! Drawing happens after the canvas transform is applied, so every value in
//! [`ScaledValues`] is world-space, ready to use directly.

/// How a visual size reacts to the zoom level `k`.
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels).
	Screen,
	/// World-space size clamped to min/max screen-space bounds.
	Clamped {
		/// Smallest on-screen size, pixels.
		min_screen: f64,
		/// Largest on-screen size, pixels.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// How an opacity reacts to the zoom level.
#[derive(Clone, Debug, PartialEq)]
pub enum AlphaBehavior {
	/// Always fully opaque.
	Constant,
	/// Invisible at `zero_alpha_k`, fully visible at `full_alpha_k`.
	Fade {
		/// Zoom where the alpha reaches 0.
		zero_alpha_k: f64,
		/// Zoom where the alpha reaches 1.
		full_alpha_k: f64,
	},
}

impl AlphaBehavior {
	/// Opacity at zoom `k`.
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Constant => 1.0,
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if zero_alpha_k == full_alpha_k {
					return 1.0;
				}
				((k - zero_alpha_k) / (full_alpha_k - zero_alpha_k)).clamp(0.0, 1.0)
			}
		}
	}
}

/// Base sizes and their zoom behavior.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Link stroke, world units.
	pub link_width: f64,
	/// How the link stroke scales.
	pub link_behavior: ScaleBehavior,
	/// Same-lane marker radius, world units.
	pub marker_radius: f64,
	/// How the marker radius scales.
	pub marker_behavior: ScaleBehavior,
	/// Node corner radius, world units.
	pub corner_radius: f64,
	/// How the corner radius scales.
	pub corner_behavior: ScaleBehavior,
	/// Node label font size in screen pixels.
	pub label_size: f64,
	/// Labels stop growing in world-space below this zoom.
	pub label_min_k: f64,
	/// Label fade with zoom.
	pub label_alpha: AlphaBehavior,
	/// Year grid stroke and label size, screen pixels.
	pub grid_width: f64,
	/// Year label size, screen pixels.
	pub grid_label_size: f64,
	/// Grid fade with zoom.
	pub grid_alpha: AlphaBehavior,
	/// Pulse outline width, screen pixels.
	pub pulse_width: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			link_width: 2.0,
			link_behavior: ScaleBehavior::Clamped {
				min_screen: 0.75,
				max_screen: 4.0,
			},
			marker_radius: 4.0,
			marker_behavior: ScaleBehavior::Clamped {
				min_screen: 3.0,
				max_screen: 10.0,
			},
			corner_radius: 3.0,
			corner_behavior: ScaleBehavior::World,
			label_size: 11.0,
			label_min_k: 0.8,
			label_alpha: AlphaBehavior::Fade {
				zero_alpha_k: 0.8,
				full_alpha_k: 1.0,
			},
			grid_width: 1.0,
			grid_label_size: 10.0,
			grid_alpha: AlphaBehavior::Constant,
			pulse_width: 3.0,
		}
	}
}

/// Pre-computed world-space values for one zoom level. Create once per frame.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Zoom these values were computed for.
	pub k: f64,
	/// Link stroke.
	pub link_width: f64,
	/// Marker radius.
	pub marker_radius: f64,
	/// Node corner radius.
	pub corner_radius: f64,
	/// Canvas font string, e.g. `"11px sans-serif"`.
	pub label_font: String,
	/// Label opacity.
	pub label_alpha: f64,
	/// Grid stroke.
	pub grid_width: f64,
	/// Canvas font for year labels.
	pub grid_font: String,
	/// Grid opacity.
	pub grid_alpha: f64,
	/// Pulse outline width.
	pub pulse_width: f64,
}

impl ScaledValues {
	/// Resolve `config` at zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let label_size = config.label_size / k.max(config.label_min_k);
		Self {
			k,
			link_width: config.link_behavior.apply(config.link_width, k),
			marker_radius: config.marker_behavior.apply(config.marker_radius, k),
			corner_radius: config.corner_behavior.apply(config.corner_radius, k),
			label_font: format!("{label_size}px sans-serif"),
			label_alpha: config.label_alpha.apply(k),
			grid_width: ScaleBehavior::Screen.apply(config.grid_width, k),
			grid_font: format!("{}px sans-serif", config.grid_label_size / k),
			grid_alpha: config.grid_alpha.apply(k),
			pulse_width: ScaleBehavior::Screen.apply(config.pulse_width, k),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clamped_keeps_screen_size_in_bounds() {
		let behavior = ScaleBehavior::Clamped {
			min_screen: 1.0,
			max_screen: 4.0,
		};
		// 2 world units at k=0.1 would be 0.2px; clamped up to 1px.
		assert_eq!(behavior.apply(2.0, 0.1), 10.0);
		assert_eq!(behavior.apply(2.0, 1.0), 2.0);
		// At k=4 it would be 8px; clamped down to 4px.
		assert_eq!(behavior.apply(2.0, 4.0), 1.0);
	}

	#[test]
	fn fade_ramps_between_thresholds() {
		let fade = AlphaBehavior::Fade {
			zero_alpha_k: 0.8,
			full_alpha_k: 1.0,
		};
		assert_eq!(fade.apply(0.5), 0.0);
		assert!((fade.apply(0.9) - 0.5).abs() < 1e-9);
		assert_eq!(fade.apply(3.0), 1.0);
	}

	#[test]
	fn grid_stays_one_pixel() {
		let values = ScaledValues::new(&ScaleConfig::default(), 4.0);
		assert_eq!(values.grid_width, 0.25);
		assert_eq!(values.label_font, "2.75px sans-serif");
	}
}
