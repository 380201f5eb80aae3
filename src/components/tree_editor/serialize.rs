//! JSON export/import of the graph store.
//!
//! The document is a flat structural dump: node records with CSS-style
//! `backgroundColor`/`left`/`top` strings, and connection records naming their
//! endpoints by id.

use log::warn;
use serde::{Deserialize, Serialize};

use super::error::{EditorError, Result};
use super::geometry::{Point, format_px, parse_px};
use super::store::GraphStore;
use super::types::{Color, Node, NodeId};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeDocument {
	#[serde(default)]
	pub nodes: Vec<NodeRecord>,
	#[serde(default)]
	pub connections: Vec<ConnectionRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
	pub id: String,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub style: NodeStyle,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
	#[serde(default)]
	pub background_color: String,
	#[serde(default)]
	pub left: String,
	#[serde(default)]
	pub top: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
	pub start_node_id: String,
	pub end_node_id: String,
	#[serde(default)]
	pub description: Option<String>,
}

/// Outcome of an import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
	pub nodes: usize,
	pub connections: usize,
	/// Node records whose id was already used earlier in the document.
	pub skipped_nodes: usize,
	/// Connection records naming an endpoint that is not in the document.
	pub dropped_connections: usize,
}

pub fn export(store: &GraphStore) -> TreeDocument {
	TreeDocument {
		nodes: store
			.nodes()
			.map(|n| NodeRecord {
				id: n.id.to_string(),
				name: n.label.clone(),
				style: NodeStyle {
					background_color: n.color.to_hex(),
					left: format_px(n.position.x),
					top: format_px(n.position.y),
				},
			})
			.collect(),
		connections: store
			.connections()
			.iter()
			.map(|c| ConnectionRecord {
				start_node_id: c.start.to_string(),
				end_node_id: c.end.to_string(),
				description: c.description.clone(),
			})
			.collect(),
	}
}

pub fn to_json(store: &GraphStore) -> Result<String> {
	serde_json::to_string(&export(store)).map_err(EditorError::Serialize)
}

pub fn from_json(json: &str) -> Result<TreeDocument> {
	serde_json::from_str(json).map_err(EditorError::Parse)
}

/// Replaces the store's contents with `document`: nodes first, keeping their
/// ids, then connections resolved by id. Unresolvable records are skipped.
pub fn import(store: &mut GraphStore, document: &TreeDocument, fallback: Color) -> ImportReport {
	let mut report = ImportReport::default();
	store.clear();

	for record in &document.nodes {
		let color = record.style.background_color.parse::<Color>().unwrap_or_else(|e| {
			warn!("node {}: {e}, using {fallback}", record.id);
			fallback
		});
		let node = Node {
			id: NodeId::new(record.id.as_str()),
			label: record.name.clone(),
			position: Point::new(
				parse_px(&record.style.left).unwrap_or(0.0),
				parse_px(&record.style.top).unwrap_or(0.0),
			),
			color,
		};
		if store.insert_node(node) {
			report.nodes += 1;
		} else {
			warn!("skipping duplicate node id {}", record.id);
			report.skipped_nodes += 1;
		}
	}

	for record in &document.connections {
		let (start, end) = (
			NodeId::new(record.start_node_id.as_str()),
			NodeId::new(record.end_node_id.as_str()),
		);
		if store
			.upsert_connection(&start, &end, record.description.clone())
			.is_none()
		{
			warn!("dropping connection {start} -> {end}: endpoint not found");
			report.dropped_connections += 1;
		}
	}

	report.connections = store.connections().len();
	report
}
