//! Canonical node and connection storage.
//!
//! Nodes live in an id-keyed arena that preserves creation order; connections
//! are kept unique per unordered endpoint pair. Every operation is infallible
//! and missing ids turn mutations into no-ops.

use indexmap::IndexMap;

use super::geometry::Point;
use super::types::{Color, Connection, ConnectionKey, Node, NodeId};

/// What `GraphStore::upsert_connection` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
	Created,
	Updated,
}

#[derive(Clone, Debug, Default)]
pub struct GraphStore {
	nodes: IndexMap<NodeId, Node>,
	connections: Vec<Connection>,
	next_serial: u64,
}

impl GraphStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values()
	}

	pub fn node(&self, id: &NodeId) -> Option<&Node> {
		self.nodes.get(id)
	}

	pub fn contains(&self, id: &NodeId) -> bool {
		self.nodes.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn connections(&self) -> &[Connection] {
		&self.connections
	}

	/// Creates a node at the origin. Labels are not validated.
	pub fn create_node(&mut self, label: impl Into<String>, color: Color) -> NodeId {
		let id = self.allocate_id();
		self.insert_node(Node {
			id: id.clone(),
			label: label.into(),
			position: Point::ORIGIN,
			color,
		});
		id
	}

	/// Inserts a node under its own id, keeping the id counter ahead of any
	/// `node_<n>` id seen. Returns `false` if the id is already taken.
	pub(crate) fn insert_node(&mut self, node: Node) -> bool {
		if self.nodes.contains_key(&node.id) {
			return false;
		}
		if let Some(next) = node.id.serial().and_then(|s| s.checked_add(1)) {
			self.next_serial = self.next_serial.max(next);
		}
		self.nodes.insert(node.id.clone(), node);
		true
	}

	fn allocate_id(&mut self) -> NodeId {
		loop {
			let id = NodeId::from_serial(self.next_serial);
			// Wraps back to `node_0`; the liveness check keeps ids unique.
			self.next_serial = self.next_serial.wrapping_add(1);
			if !self.nodes.contains_key(&id) {
				return id;
			}
		}
	}

	pub fn update_node(&mut self, id: &NodeId, label: impl Into<String>, color: Color) {
		if let Some(node) = self.nodes.get_mut(id) {
			node.label = label.into();
			node.color = color;
		}
	}

	pub fn move_node(&mut self, id: &NodeId, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(id) {
			node.position = Point::new(x, y);
		}
	}

	/// Removes the node together with every connection touching it.
	pub fn delete_node(&mut self, id: &NodeId) -> Option<Node> {
		let node = self.nodes.shift_remove(id)?;
		self.connections.retain(|c| !c.touches(id));
		Some(node)
	}

	/// First node, in creation order, whose label equals `label`.
	pub fn find_node_by_label(&self, label: &str) -> Option<NodeId> {
		self.nodes
			.values()
			.find(|n| n.label == label)
			.map(|n| n.id.clone())
	}

	/// Sets the description of the `start`-`end` connection, creating it if the
	/// pair is not yet connected in either direction. Self-loops are allowed.
	/// Returns `None` without touching the store if an endpoint does not exist.
	pub fn upsert_connection(
		&mut self,
		start: &NodeId,
		end: &NodeId,
		description: Option<String>,
	) -> Option<Upsert> {
		if !self.contains(start) || !self.contains(end) {
			return None;
		}
		let key = ConnectionKey::new(start, end);
		if let Some(existing) = self.connections.iter_mut().find(|c| c.key() == key) {
			existing.description = description;
			return Some(Upsert::Updated);
		}
		self.connections.push(Connection {
			start: start.clone(),
			end: end.clone(),
			description,
		});
		Some(Upsert::Created)
	}

	pub fn delete_connection(&mut self, key: &ConnectionKey) -> Option<Connection> {
		let idx = self.connections.iter().position(|c| &c.key() == key)?;
		Some(self.connections.remove(idx))
	}

	pub fn connection(&self, a: &NodeId, b: &NodeId) -> Option<&Connection> {
		let key = ConnectionKey::new(a, b);
		self.connections.iter().find(|c| c.key() == key)
	}

	pub fn is_connected(&self, a: &NodeId, b: &NodeId) -> bool {
		self.connection(a, b).is_some()
	}

	pub fn connections_of<'a>(
		&'a self,
		id: &'a NodeId,
	) -> impl Iterator<Item = &'a Connection> + 'a {
		self.connections.iter().filter(move |c| c.touches(id))
	}

	/// Drops every node and connection. The id counter keeps counting.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.connections.clear();
	}
}
