//! Rolling timing samples for layout, frame update, and paint passes.
//!
//! Advisory only: nothing reads these numbers to make decisions. Slow passes
//! are logged at debug level.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use log::debug;

/// Kind of timed work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pass {
	Layout,
	/// Session tick: transitions, pulses, and the debounced re-cull.
	Tick,
	Paint,
}

impl fmt::Display for Pass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Pass::Layout => "layout",
			Pass::Tick => "tick",
			Pass::Paint => "paint",
		})
	}
}

/// Summary over the retained samples of one pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassStats {
	pub count: usize,
	pub last_ms: f64,
	pub mean_ms: f64,
	pub max_ms: f64,
}

#[derive(Clone, Debug)]
pub struct PerformanceMonitor {
	window: usize,
	/// Passes at or above this many milliseconds are logged.
	slow_ms: f64,
	samples: HashMap<Pass, VecDeque<f64>>,
}

impl Default for PerformanceMonitor {
	fn default() -> Self {
		// 60 samples ≈ one second of frames; 16ms is one frame at 60Hz
		Self::new(60, 16.0)
	}
}

impl PerformanceMonitor {
	pub fn new(window: usize, slow_ms: f64) -> Self {
		Self {
			window: window.max(1),
			slow_ms,
			samples: HashMap::new(),
		}
	}

	pub fn record(&mut self, pass: Pass, elapsed_ms: f64) {
		let samples = self.samples.entry(pass).or_default();
		if samples.len() == self.window {
			samples.pop_front();
		}
		samples.push_back(elapsed_ms);
		if elapsed_ms >= self.slow_ms {
			debug!("lineage-river: slow {pass} pass: {elapsed_ms:.1}ms");
		}
	}

	/// Run `work`, recording the time between two reads of `clock` (ms).
	pub fn measure<T>(&mut self, pass: Pass, clock: impl Fn() -> f64, work: impl FnOnce() -> T) -> T {
		let started = clock();
		let result = work();
		self.record(pass, clock() - started);
		result
	}

	pub fn stats(&self, pass: Pass) -> Option<PassStats> {
		let samples = self.samples.get(&pass).filter(|s| !s.is_empty())?;
		let total: f64 = samples.iter().sum();
		Some(PassStats {
			count: samples.len(),
			last_ms: *samples.back()?,
			mean_ms: total / samples.len() as f64,
			max_ms: samples.iter().copied().fold(f64::MIN, f64::max),
		})
	}

	pub fn reset(&mut self) {
		self.samples.clear();
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;

	#[test]
	fn keeps_a_rolling_window() {
		let mut monitor = PerformanceMonitor::new(3, 100.0);
		for ms in [1.0, 2.0, 3.0, 10.0] {
			monitor.record(Pass::Paint, ms);
		}
		let stats = monitor.stats(Pass::Paint).unwrap();
		assert_eq!(stats.count, 3);
		assert_eq!(stats.last_ms, 10.0);
		assert_eq!(stats.mean_ms, 5.0);
		assert_eq!(stats.max_ms, 10.0);
		assert!(monitor.stats(Pass::Layout).is_none());
	}

	#[test]
	fn reset_starts_a_fresh_window() {
		let mut monitor = PerformanceMonitor::default();
		monitor.record(Pass::Tick, 2.0);
		monitor.record(Pass::Paint, 40.0);
		monitor.reset();
		assert!(monitor.stats(Pass::Tick).is_none());
		assert!(monitor.stats(Pass::Paint).is_none());
		monitor.record(Pass::Paint, 3.0);
		assert_eq!(monitor.stats(Pass::Paint).unwrap().count, 1);
	}

	#[test]
	fn measure_uses_the_given_clock() {
		let mut monitor = PerformanceMonitor::default();
		let now = Cell::new(100.0);
		let value = monitor.measure(Pass::Layout, || now.get(), || {
			now.set(104.5);
			7
		});
		assert_eq!(value, 7);
		assert_eq!(monitor.stats(Pass::Layout).unwrap().last_ms, 4.5);
	}
}
