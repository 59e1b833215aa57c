//! Tunable constants for layout, culling, zoom bounds, and navigation.
//!
//! Every section deserializes with `#[serde(default)]`, so a config document
//! only needs to name the values it overrides:
//!
//! ```json
//! { "layout": { "node_height": 18 }, "zoom": { "detail_threshold": 1.5 } }
//! ```

use serde::Deserialize;

use super::error::Result;

/// Complete engine configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RiverConfig {
	/// Row packing and spacing.
	pub layout: LayoutConfig,
	/// Culling.
	pub viewport: ViewportConfig,
	/// Scale limits and transitions.
	pub zoom: ZoomConfig,
	/// Level-of-detail thresholds.
	pub lod: LodConfig,
	/// Path highlight timing.
	pub navigation: NavigationConfig,
}

impl RiverConfig {
	/// Parse a (possibly partial) JSON config document.
	pub fn from_json(text: &str) -> Result<Self> {
		Ok(serde_json::from_str(text)?)
	}
}

/// Geometry of the year-based layout.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Bar height of every node, in world units.
	pub node_height: f64,
	/// Floor applied to node widths so short-lived nodes stay clickable.
	pub min_node_width: f64,
	/// Vertical gap between rows inside a tier.
	pub row_gap: f64,
	/// Vertical gap between consecutive tiers.
	pub tier_gap: f64,
	/// Horizontal padding on both sides of the year axis, and the top margin.
	pub padding: f64,
	/// Earliest year a derived range may start at.
	pub year_floor: i32,
	/// Latest year a derived range may end at.
	pub year_ceiling: i32,
	/// Control-point offset of link curves as a fraction of horizontal distance.
	pub curve_factor: f64,
	/// Stretch X so a wide viewport has no horizontal gutters at minimum zoom.
	pub stretch_to_viewport: bool,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			node_height: 24.0,
			min_node_width: 30.0,
			row_gap: 8.0,
			tier_gap: 40.0,
			padding: 50.0,
			year_floor: 1900,
			year_ceiling: 2040,
			curve_factor: 0.3,
			stretch_to_viewport: false,
		}
	}
}

impl LayoutConfig {
	/// Distance between the tops of two adjacent rows.
	pub fn row_height(&self) -> f64 {
		self.node_height + self.row_gap
	}
}

/// Viewport culling parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
	/// Screen-pixel margin around the viewport that still counts as visible.
	pub cull_padding: f64,
	/// Quiet period after the last transform change before re-culling.
	pub debounce_ms: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			cull_padding: 100.0,
			debounce_ms: 100.0,
		}
	}
}

/// Zoom limits and camera moves.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
	/// Scale at or above which the view is in DETAIL mode.
	pub detail_threshold: f64,
	pub max_scale: f64,
	/// Lower bound for the computed minimum scale.
	pub min_scale_floor: f64,
	/// Vertical padding added above and below the content box.
	pub content_padding: f64,
	/// Scale used when focusing a node.
	pub focus_scale: f64,
	pub focus_duration_ms: f64,
	pub reset_duration_ms: f64,
}

impl Default for ZoomConfig {
	fn default() -> Self {
		Self {
			detail_threshold: 1.2,
			max_scale: 10.0,
			min_scale_floor: 0.05,
			content_padding: 50.0,
			focus_scale: 2.0,
			focus_duration_ms: 750.0,
			reset_duration_ms: 500.0,
		}
	}
}

/// Level-of-detail thresholds. Either condition alone selects low detail.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LodConfig {
	/// More visible nodes than this switches to low detail.
	pub max_detailed_nodes: usize,
	/// Scales below this switch to low detail.
	pub min_detailed_scale: f64,
}

impl Default for LodConfig {
	fn default() -> Self {
		Self {
			max_detailed_nodes: 100,
			min_detailed_scale: 0.8,
		}
	}
}

/// Timing of path highlights.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
	/// Delay between consecutive link pulses along a path.
	pub stagger_ms: f64,
	/// How long each link stays pulsed.
	pub pulse_ms: f64,
}

impl Default for NavigationConfig {
	fn default() -> Self {
		Self {
			stagger_ms: 200.0,
			pulse_ms: 600.0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_document_keeps_defaults() {
		let config =
			RiverConfig::from_json(r#"{ "layout": { "node_height": 18 }, "lod": { "max_detailed_nodes": 50 } }"#)
				.unwrap();
		assert_eq!(config.layout.node_height, 18.0);
		assert_eq!(config.layout.min_node_width, 30.0);
		assert_eq!(config.lod.max_detailed_nodes, 50);
		assert_eq!(config.zoom.detail_threshold, 1.2);
		assert_eq!(config.viewport.debounce_ms, 100.0);
	}

	#[test]
	fn malformed_document_is_an_error() {
		assert!(RiverConfig::from_json("{ layout: ").is_err());
	}
}
