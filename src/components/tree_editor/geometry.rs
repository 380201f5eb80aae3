//! Canvas-local geometry: points, box rectangles, anchors and pixel strings.

use std::ops::{Add, Sub};

/// A position in canvas-local pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Size {
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}
}

/// Axis-aligned box anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
	pub origin: Point,
	pub size: Size,
}

impl Rect {
	pub fn new(origin: Point, size: Size) -> Self {
		Self { origin, size }
	}

	/// Center of the box; connection lines and labels hang off this point.
	pub fn anchor(&self) -> Point {
		Point::new(
			self.origin.x + self.size.width / 2.0,
			self.origin.y + self.size.height / 2.0,
		)
	}

	/// Edges are inclusive on the top/left side and exclusive on the bottom/right.
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.origin.x
			&& p.y >= self.origin.y
			&& p.x < self.origin.x + self.size.width
			&& p.y < self.origin.y + self.size.height
	}
}

/// Formats a coordinate the way CSS `left`/`top` values are written.
pub fn format_px(value: f64) -> String {
	format!("{value}px")
}

/// Parses `"120px"`, `"120"` or `"-3.5px"`. Empty or malformed input yields `None`.
pub fn parse_px(raw: &str) -> Option<f64> {
	let trimmed = raw.trim();
	let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim_end();
	if number.is_empty() {
		return None;
	}
	number.parse::<f64>().ok().filter(|v| v.is_finite())
}
