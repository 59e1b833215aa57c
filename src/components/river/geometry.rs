//! Year axis, rectangles, and link curves.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: the layout's own coordinates. X is derived from years
//!   through [`YearScale`], Y from tier and row.
//! - **Screen-space**: canvas pixels, obtained by applying the view transform.

use serde::Deserialize;

/// Inclusive range of calendar years. Always `min <= max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "(i32, i32)")]
pub struct YearRange {
	/// First year.
	pub min: i32,
	/// Last year.
	pub max: i32,
}

impl From<(i32, i32)> for YearRange {
	fn from((a, b): (i32, i32)) -> Self {
		Self::new(a, b)
	}
}

impl YearRange {
	/// Build a range from two bounds in either order.
	pub fn new(a: i32, b: i32) -> Self {
		Self {
			min: a.min(b),
			max: a.max(b),
		}
	}

	/// Whether `year` falls inside the range.
	pub fn contains(&self, year: i32) -> bool {
		(self.min..=self.max).contains(&year)
	}

	/// Clamp both ends into `[floor, ceiling]`.
	pub fn clamped(self, floor: i32, ceiling: i32) -> Self {
		Self::new(self.min.clamp(floor, ceiling), self.max.clamp(floor, ceiling))
	}
}

/// Canvas size in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Width in pixels.
	pub width: f64,
	/// Height in pixels.
	pub height: f64,
}

impl Viewport {
	/// Viewport of `width` by `height` pixels.
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}
}

/// 2D point in world or screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Linear interpolation towards `other`; `t = 0` is `self`.
	pub fn lerp(self, other: Point, t: f64) -> Self {
		Self::new(
			self.x + (other.x - self.x) * t,
			self.y + (other.y - self.y) * t,
		)
	}
}

/// Axis-aligned rectangle; `width` and `height` are non-negative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	/// Rectangle spanning two corners.
	pub fn from_corners(a: Point, b: Point) -> Self {
		Self::new(
			a.x.min(b.x),
			a.y.min(b.y),
			(a.x - b.x).abs(),
			(a.y - b.y).abs(),
		)
	}

	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	pub fn bottom(&self) -> f64 {
		self.y + self.height
	}

	pub fn center(&self) -> Point {
		Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	/// Closed-interval intersection test: touching edges count.
	pub fn intersects(&self, other: &Rect) -> bool {
		self.x <= other.right()
			&& other.x <= self.right()
			&& self.y <= other.bottom()
			&& other.y <= self.bottom()
	}

	pub fn contains(&self, point: Point) -> bool {
		(self.x..=self.right()).contains(&point.x) && (self.y..=self.bottom()).contains(&point.y)
	}

	pub fn union(&self, other: &Rect) -> Rect {
		let x = self.x.min(other.x);
		let y = self.y.min(other.y);
		Rect::new(
			x,
			y,
			self.right().max(other.right()) - x,
			self.bottom().max(other.bottom()) - y,
		)
	}

	/// Grow by `dx` on the left and right, `dy` on the top and bottom.
	pub fn expand(&self, dx: f64, dy: f64) -> Rect {
		Rect::new(
			self.x - dx,
			self.y - dy,
			self.width + 2.0 * dx,
			self.height + 2.0 * dy,
		)
	}
}

/// Linear map from calendar years to world-space X.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YearScale {
	min_year: f64,
	max_year: f64,
	start: f64,
	end: f64,
}

impl YearScale {
	/// Map `range` onto `[start, end]`. A zero-width range is widened to one
	/// year so the map stays invertible.
	pub fn new(range: YearRange, start: f64, end: f64) -> Self {
		let min_year = f64::from(range.min);
		let max_year = f64::from(range.max).max(min_year + 1.0);
		Self {
			min_year,
			max_year,
			start,
			end: end.max(start + 1.0),
		}
	}

	/// Same domain, pixel span multiplied by `factor` from the left edge.
	pub fn stretched(self, factor: f64) -> Self {
		Self {
			end: self.start + (self.end - self.start) * factor,
			..self
		}
	}

	/// X for a fractional year.
	pub fn apply(&self, year: f64) -> f64 {
		let t = (year - self.min_year) / (self.max_year - self.min_year);
		self.start + t * (self.end - self.start)
	}

	/// X for the start of `year`.
	pub fn year(&self, year: i32) -> f64 {
		self.apply(f64::from(year))
	}

	/// Fractional year at `x`.
	pub fn invert(&self, x: f64) -> f64 {
		let t = (x - self.start) / (self.end - self.start);
		self.min_year + t * (self.max_year - self.min_year)
	}

	/// Pixel range the year domain maps onto.
	pub fn range(&self) -> (f64, f64) {
		(self.start, self.end)
	}

	/// Years divisible by `step` inside the domain, with their X.
	pub fn ticks(&self, step: i32) -> Vec<(i32, f64)> {
		let step = step.max(1);
		let first = (self.min_year as i32).div_euclid(step) * step;
		let first = if f64::from(first) < self.min_year {
			first + step
		} else {
			first
		};
		(first..=self.max_year as i32)
			.step_by(step as usize)
			.map(|year| (year, self.year(year)))
			.collect()
	}
}

/// A cubic Bézier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicPath {
	pub start: Point,
	pub control1: Point,
	pub control2: Point,
	pub end: Point,
}

impl CubicPath {
	/// Horizontal S-curve between two points. Control points sit `factor`
	/// of the horizontal distance inward from each end, at the end's height.
	///
	/// The offset keeps its sign, so when `end` lies left of `start` the
	/// controls still point at each other and x stays monotonic along the
	/// curve.
	pub fn s_curve(start: Point, end: Point, factor: f64) -> Self {
		let offset = (end.x - start.x) * factor;
		Self {
			start,
			control1: Point::new(start.x + offset, start.y),
			control2: Point::new(end.x - offset, end.y),
			end,
		}
	}

	pub fn point_at(&self, t: f64) -> Point {
		let u = 1.0 - t;
		let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
		Point::new(
			a * self.start.x + b * self.control1.x + c * self.control2.x + d * self.end.x,
			a * self.start.y + b * self.control1.y + c * self.control2.y + d * self.end.y,
		)
	}

	/// Bounding box of the control polygon (contains the curve).
	pub fn bounds(&self) -> Rect {
		Rect::from_corners(self.start, self.end)
			.union(&Rect::from_corners(self.control1, self.control2))
	}
}
