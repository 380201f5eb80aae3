use std::fmt;
use std::str::FromStr;

use super::geometry::{Point, Size};

/// Identity of a node, e.g. `node_3`. Imported documents may carry any string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn from_serial(serial: u64) -> Self {
		Self(format!("node_{serial}"))
	}

	/// The `n` of a `node_<n>` id, if it has that shape.
	pub fn serial(&self) -> Option<u64> {
		self.0.strip_prefix("node_")?.parse().ok()
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Opaque RGB fill color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Color {
	pub const RED: Color = Color::rgb(0xff, 0x00, 0x00);

	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	pub fn to_hex(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "unrecognised color {:?}", self.0)
	}
}

impl std::error::Error for ParseColorError {}

impl FromStr for Color {
	type Err = ParseColorError;

	/// Accepts `#rrggbb`, `#rgb` and `rgb(r, g, b)`.
	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let s = raw.trim();
		let err = || ParseColorError(raw.to_string());

		if let Some(hex) = s.strip_prefix('#') {
			if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
				return Err(err());
			}
			let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
			return match hex.len() {
				6 => Ok(Color::rgb(
					channel(&hex[0..2])?,
					channel(&hex[2..4])?,
					channel(&hex[4..6])?,
				)),
				3 => {
					let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 0x11);
					Ok(Color::rgb(short(0)?, short(1)?, short(2)?))
				}
				_ => Err(err()),
			};
		}

		let inner = s
			.strip_prefix("rgb(")
			.and_then(|rest| rest.strip_suffix(')'))
			.ok_or_else(err)?;
		let channels: Vec<u8> = inner
			.split(',')
			.map(|part| part.trim().parse::<u8>().map_err(|_| err()))
			.collect::<Result<_, _>>()?;
		match channels.as_slice() {
			[r, g, b] => Ok(Color::rgb(*r, *g, *b)),
			_ => Err(err()),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	pub label: String,
	/// Top-left corner of the node's box.
	pub position: Point,
	pub color: Color,
}

/// Unordered endpoint pair; the identity of a connection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionKey(NodeId, NodeId);

impl ConnectionKey {
	pub fn new(a: &NodeId, b: &NodeId) -> Self {
		if a <= b {
			Self(a.clone(), b.clone())
		} else {
			Self(b.clone(), a.clone())
		}
	}

	pub fn touches(&self, id: &NodeId) -> bool {
		&self.0 == id || &self.1 == id
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
	pub start: NodeId,
	pub end: NodeId,
	pub description: Option<String>,
}

impl Connection {
	pub fn key(&self) -> ConnectionKey {
		ConnectionKey::new(&self.start, &self.end)
	}

	pub fn touches(&self, id: &NodeId) -> bool {
		&self.start == id || &self.end == id
	}

	/// The endpoint opposite `id`, if `id` is one of the endpoints.
	pub fn other(&self, id: &NodeId) -> Option<&NodeId> {
		if &self.start == id {
			Some(&self.end)
		} else if &self.end == id {
			Some(&self.start)
		} else {
			None
		}
	}
}

/// Editor-wide settings, handed to the editor component as a prop.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
	/// Box size used for drawing, hit-testing and anchors.
	pub node_size: Size,
	/// Color the form resets to, and the fallback for unreadable imported colors.
	pub default_color: Color,
	pub export_file_name: String,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			node_size: Size::new(120.0, 40.0),
			default_color: Color::RED,
			export_file_name: "decision_tree.json".into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hex_and_rgb_colors() {
		assert_eq!("#00ff00".parse::<Color>(), Ok(Color::rgb(0, 255, 0)));
		assert_eq!("#0F0".parse::<Color>(), Ok(Color::rgb(0, 255, 0)));
		assert_eq!("rgb(255, 0, 0)".parse::<Color>(), Ok(Color::RED));
		assert_eq!(
			"rgb(18,52,86)".parse::<Color>().map(Color::to_hex),
			Ok("#123456".to_string())
		);
		assert!("".parse::<Color>().is_err());
		assert!("#12345".parse::<Color>().is_err());
		assert!("rgb(1, 2)".parse::<Color>().is_err());
		assert!("rgb(300, 0, 0)".parse::<Color>().is_err());
		assert!("blue".parse::<Color>().is_err());
		assert!("#+f+f+f".parse::<Color>().is_err());
		assert!("#+ff".parse::<Color>().is_err());
	}

	#[test]
	fn connection_key_ignores_order() {
		let (a, b) = (NodeId::new("node_0"), NodeId::new("node_1"));
		assert_eq!(ConnectionKey::new(&a, &b), ConnectionKey::new(&b, &a));
		assert!(ConnectionKey::new(&a, &a).touches(&a));
		assert!(!ConnectionKey::new(&a, &a).touches(&b));
	}

	#[test]
	fn node_serials() {
		assert_eq!(NodeId::from_serial(7).as_str(), "node_7");
		assert_eq!(NodeId::new("node_12").serial(), Some(12));
		assert_eq!(NodeId::new("custom").serial(), None);
	}
}
