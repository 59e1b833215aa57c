//! Discrete level of detail derived from the continuous zoom scale.

use std::fmt;

use log::debug;

/// Rendering fidelity selected from zoom scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoomLevel {
	/// Zoomed out below the detail threshold.
	Overview,
	/// At or above the detail threshold.
	Detail,
}

impl fmt::Display for ZoomLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			ZoomLevel::Overview => "OVERVIEW",
			ZoomLevel::Detail => "DETAIL",
		})
	}
}

type LevelCallback = Box<dyn FnMut(ZoomLevel, f64)>;

/// Two-state machine: OVERVIEW below the detail threshold, DETAIL at or
/// above it. The callback fires once per boundary crossing and never for
/// scale changes inside a band.
pub struct ZoomLevelManager {
	detail_threshold: f64,
	level: ZoomLevel,
	scale: f64,
	on_change: Option<LevelCallback>,
}

impl fmt::Debug for ZoomLevelManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ZoomLevelManager")
			.field("detail_threshold", &self.detail_threshold)
			.field("level", &self.level)
			.field("scale", &self.scale)
			.finish_non_exhaustive()
	}
}

impl ZoomLevelManager {
	/// Starts in [`ZoomLevel::Overview`].
	pub fn new(detail_threshold: f64) -> Self {
		Self {
			detail_threshold,
			level: ZoomLevel::Overview,
			scale: 1.0,
			on_change: None,
		}
	}

	/// Register the transition callback, replacing any previous one.
	///
	/// A manager that already left OVERVIEW reports its level right away, so
	/// a late listener never misses the initial transition.
	pub fn on_level_change(&mut self, callback: impl FnMut(ZoomLevel, f64) + 'static) {
		let mut callback: LevelCallback = Box::new(callback);
		if self.level != ZoomLevel::Overview {
			callback(self.level, self.scale);
		}
		self.on_change = Some(callback);
	}

	/// Current level.
	pub fn level(&self) -> ZoomLevel {
		self.level
	}

	/// Level a given scale falls into, without changing state.
	pub fn level_for(&self, scale: f64) -> ZoomLevel {
		if scale >= self.detail_threshold {
			ZoomLevel::Detail
		} else {
			ZoomLevel::Overview
		}
	}

	/// Feed a new scale. Returns the new level when it changed.
	pub fn update_scale(&mut self, scale: f64) -> Option<ZoomLevel> {
		self.scale = scale;
		let next = self.level_for(scale);
		if next == self.level {
			return None;
		}
		self.level = next;
		debug!("lineage-river: zoom level {next} at k={scale:.2}");
		if let Some(callback) = self.on_change.as_mut() {
			callback(next, scale);
		}
		Some(next)
	}

	/// Back to OVERVIEW without firing the callback, for view teardown.
	pub fn reset(&mut self) {
		self.level = ZoomLevel::Overview;
	}
}
