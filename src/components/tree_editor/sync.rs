//! Presentation primitives mirrored from the graph store.
//!
//! The scene never holds authoritative data: every box, line and label is
//! recomputed from the store, keyed by the id of the entity it mirrors.

use indexmap::IndexMap;

use super::geometry::{Point, Rect, Size};
use super::store::GraphStore;
use super::types::{Color, Connection, ConnectionKey, NodeId};

#[derive(Clone, Debug, PartialEq)]
pub struct NodeBox {
	pub label: String,
	pub fill: Color,
	pub rect: Rect,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinePrimitive {
	pub from: Point,
	pub to: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelPrimitive {
	pub text: String,
	pub at: Point,
}

/// The line and label drawn for one connection.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionPrimitives {
	pub line: LinePrimitive,
	pub label: LabelPrimitive,
}

#[derive(Clone, Debug)]
pub struct Scene {
	node_size: Size,
	boxes: IndexMap<NodeId, NodeBox>,
	links: IndexMap<ConnectionKey, ConnectionPrimitives>,
}

impl Scene {
	pub fn new(node_size: Size) -> Self {
		Self {
			node_size,
			boxes: IndexMap::new(),
			links: IndexMap::new(),
		}
	}

	pub fn boxes(&self) -> impl Iterator<Item = (&NodeId, &NodeBox)> {
		self.boxes.iter()
	}

	pub fn node_box(&self, id: &NodeId) -> Option<&NodeBox> {
		self.boxes.get(id)
	}

	pub fn links(&self) -> impl Iterator<Item = (&ConnectionKey, &ConnectionPrimitives)> {
		self.links.iter()
	}

	pub fn link(&self, key: &ConnectionKey) -> Option<&ConnectionPrimitives> {
		self.links.get(key)
	}

	/// Top-most box under `p`. Later boxes are drawn over earlier ones.
	pub fn node_at(&self, p: Point) -> Option<&NodeId> {
		self.boxes
			.iter()
			.rev()
			.find(|(_, b)| b.rect.contains(p))
			.map(|(id, _)| id)
	}

	/// Full recompute: creates primitives for new entities, refreshes the rest
	/// and drops those whose entity left the store.
	pub fn rebuild(&mut self, store: &GraphStore) {
		self.boxes = store
			.nodes()
			.map(|n| {
				(
					n.id.clone(),
					NodeBox {
						label: n.label.clone(),
						fill: n.color,
						rect: Rect::new(n.position, self.node_size),
					},
				)
			})
			.collect();
		self.links = store
			.connections()
			.iter()
			.filter_map(|c| Some((c.key(), self.primitives_for(c)?)))
			.collect();
	}

	/// Position-only refresh of one node's box and every connection touching it.
	pub fn sync_node(&mut self, store: &GraphStore, id: &NodeId) {
		let Some(node) = store.node(id) else {
			return;
		};
		if let Some(node_box) = self.boxes.get_mut(id) {
			node_box.rect.origin = node.position;
		}
		for conn in store.connections_of(id) {
			let Some(primitives) = self.primitives_for(conn) else {
				continue;
			};
			if let Some(existing) = self.links.get_mut(&conn.key()) {
				existing.line = primitives.line;
				existing.label.at = primitives.label.at;
			}
		}
	}

	fn primitives_for(&self, conn: &Connection) -> Option<ConnectionPrimitives> {
		let from = self.boxes.get(&conn.start)?.rect.anchor();
		let to = self.boxes.get(&conn.end)?.rect.anchor();
		Some(ConnectionPrimitives {
			line: LinePrimitive { from, to },
			label: LabelPrimitive {
				text: conn.description.clone().unwrap_or_default(),
				at: from.midpoint(to),
			},
		})
	}
}
