use std::collections::BTreeSet;

use log::{debug, info, warn};

use super::error::Result;
use super::geometry::Point;
use super::serialize::{self, ImportReport};
use super::store::{GraphStore, Upsert};
use super::sync::Scene;
use super::types::{Color, ConnectionKey, EditorConfig, NodeId};

/// Pointer interaction state of the editor.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
	#[default]
	Idle,
	Selected(NodeId),
	/// `offset` is pointer minus node top-left at the moment the drag began.
	Dragging { node: NodeId, offset: Point },
}

impl Interaction {
	pub fn selected(&self) -> Option<&NodeId> {
		match self {
			Interaction::Idle => None,
			Interaction::Selected(id) | Interaction::Dragging { node: id, .. } => Some(id),
		}
	}

	pub fn is_dragging(&self) -> bool {
		matches!(self, Interaction::Dragging { .. })
	}
}

/// Contents of the properties form.
#[derive(Clone, Debug, PartialEq)]
pub struct EditForm {
	pub label: String,
	pub color: Color,
	pub targets: BTreeSet<NodeId>,
	pub description: String,
	/// Connection whose description is shown and which the delete button removes.
	pub inspected: Option<ConnectionKey>,
}

impl EditForm {
	fn blank(color: Color) -> Self {
		Self {
			label: String::new(),
			color,
			targets: BTreeSet::new(),
			description: String::new(),
			inspected: None,
		}
	}
}

/// A row of the connection target list.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetOption {
	pub id: NodeId,
	pub label: String,
	pub connected: bool,
	pub chosen: bool,
}

/// One user action. Canvas coordinates are canvas-local pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	PointerDown(Point),
	PointerMove(Point),
	PointerUp,
	Click(Point),
	SetLabel(String),
	SetColor(Color),
	ToggleTarget(NodeId),
	SetDescription(String),
	InspectConnection(NodeId),
	Submit,
	DeleteSelectedNode,
	DeleteInspectedConnection,
}

/// The editor: store, interaction state, form and scene, driven by `dispatch`.
#[derive(Clone, Debug)]
pub struct TreeEditor {
	config: EditorConfig,
	store: GraphStore,
	interaction: Interaction,
	form: EditForm,
	scene: Scene,
}

impl TreeEditor {
	pub fn new(config: EditorConfig) -> Self {
		Self {
			form: EditForm::blank(config.default_color),
			scene: Scene::new(config.node_size),
			store: GraphStore::new(),
			interaction: Interaction::Idle,
			config,
		}
	}

	pub fn config(&self) -> &EditorConfig {
		&self.config
	}

	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	pub fn interaction(&self) -> &Interaction {
		&self.interaction
	}

	pub fn form(&self) -> &EditForm {
		&self.form
	}

	pub fn can_delete_node(&self) -> bool {
		self.interaction.selected().is_some()
	}

	pub fn can_delete_connection(&self) -> bool {
		self.form.inspected.is_some()
	}

	/// Every node other than the selected one, flagged if already connected to it.
	pub fn target_options(&self) -> Vec<TargetOption> {
		let Some(selected) = self.interaction.selected() else {
			return Vec::new();
		};
		let neighbours: BTreeSet<&NodeId> = self
			.store
			.connections_of(selected)
			.filter_map(|c| c.other(selected))
			.collect();
		self.store
			.nodes()
			.filter(|n| &n.id != selected)
			.map(|n| TargetOption {
				id: n.id.clone(),
				label: n.label.clone(),
				connected: neighbours.contains(&n.id),
				chosen: self.form.targets.contains(&n.id),
			})
			.collect()
	}

	/// Applies one command, then runs one scene sync pass.
	pub fn dispatch(&mut self, command: Command) {
		match command {
			Command::PointerMove(p) => {
				if let Some(id) = self.drag_to(p) {
					self.scene.sync_node(&self.store, &id);
				}
				return;
			}
			Command::PointerDown(p) => self.pointer_down(p),
			Command::PointerUp => {
				if let Interaction::Dragging { node, .. } = &self.interaction {
					self.interaction = Interaction::Selected(node.clone());
				}
			}
			Command::Click(p) => self.click(p),
			Command::SetLabel(label) => self.form.label = label,
			Command::SetColor(color) => self.form.color = color,
			Command::ToggleTarget(id) => {
				if !self.form.targets.remove(&id) {
					self.form.targets.insert(id);
				}
			}
			Command::SetDescription(text) => self.form.description = text,
			Command::InspectConnection(target) => self.inspect(&target),
			Command::Submit => self.submit(),
			Command::DeleteSelectedNode => self.delete_selected(),
			Command::DeleteInspectedConnection => self.delete_inspected(),
		}
		self.scene.rebuild(&self.store);
	}

	fn pointer_down(&mut self, p: Point) {
		let Some(id) = self.scene.node_at(p).cloned() else {
			return;
		};
		let Some(position) = self.store.node(&id).map(|n| n.position) else {
			return;
		};
		// Pressing on another node selects it, so the form must follow.
		if self.interaction.selected() != Some(&id) {
			self.load_form(&id);
		}
		self.interaction = Interaction::Dragging {
			node: id,
			offset: p - position,
		};
	}

	fn drag_to(&mut self, p: Point) -> Option<NodeId> {
		let Interaction::Dragging { node, offset } = &self.interaction else {
			return None;
		};
		let target = p - *offset;
		self.store.move_node(node, target.x, target.y);
		Some(node.clone())
	}

	fn click(&mut self, p: Point) {
		match self.scene.node_at(p).cloned() {
			Some(id) => self.select(id),
			None => {
				self.interaction = Interaction::Idle;
				self.reset_form();
			}
		}
	}

	fn select(&mut self, id: NodeId) {
		if self.load_form(&id) {
			self.interaction = Interaction::Selected(id);
		}
	}

	/// Fills the form with `id`'s label and color and clears everything else.
	fn load_form(&mut self, id: &NodeId) -> bool {
		let Some(node) = self.store.node(id) else {
			return false;
		};
		self.form = EditForm {
			label: node.label.clone(),
			color: node.color,
			..EditForm::blank(self.config.default_color)
		};
		true
	}

	fn inspect(&mut self, target: &NodeId) {
		let Some(selected) = self.interaction.selected() else {
			return;
		};
		match self.store.connection(selected, target) {
			Some(conn) => {
				self.form.description = conn.description.clone().unwrap_or_default();
				self.form.inspected = Some(conn.key());
			}
			None => self.form.inspected = None,
		}
	}

	fn submit(&mut self) {
		let label = std::mem::take(&mut self.form.label);
		let color = self.form.color;
		match self.interaction.selected().cloned() {
			Some(selected) => {
				self.store.update_node(&selected, label, color);
				let targets = std::mem::take(&mut self.form.targets);
				for target in &targets {
					let description = Some(self.form.description.clone());
					match self.store.upsert_connection(&selected, target, description) {
						Some(Upsert::Created) => debug!("connected {selected} to {target}"),
						Some(Upsert::Updated) => debug!("updated {selected}-{target}"),
						None => warn!("connection target {target} no longer exists"),
					}
				}
				self.interaction = Interaction::Idle;
			}
			None => {
				let id = self.store.create_node(label, color);
				debug!("created {id}");
			}
		}
		self.reset_form();
	}

	fn delete_selected(&mut self) {
		let Some(selected) = self.interaction.selected().cloned() else {
			return;
		};
		if self.store.delete_node(&selected).is_some() {
			debug!("deleted {selected}");
		}
		self.interaction = Interaction::Idle;
		self.reset_form();
	}

	fn delete_inspected(&mut self) {
		let Some(key) = self.form.inspected.take() else {
			return;
		};
		if let Some(conn) = self.store.delete_connection(&key) {
			debug!("disconnected {} from {}", conn.start, conn.end);
		}
		self.form.description.clear();
	}

	fn reset_form(&mut self) {
		self.form = EditForm::blank(self.config.default_color);
	}

	/// Serialises the current graph.
	pub fn export_json(&self) -> Result<String> {
		let json = serialize::to_json(&self.store)?;
		info!(
			"exported {} nodes and {} connections",
			self.store.len(),
			self.store.connections().len()
		);
		Ok(json)
	}

	/// Replaces the whole graph with the document in `json`. On a parse error
	/// the current graph is left as it was.
	pub fn import_json(&mut self, json: &str) -> Result<ImportReport> {
		let document = serialize::from_json(json)?;
		let report = serialize::import(&mut self.store, &document, self.config.default_color);
		self.interaction = Interaction::Idle;
		self.reset_form();
		self.scene.rebuild(&self.store);
		info!(
			"imported {} nodes and {} connections",
			report.nodes, report.connections
		);
		Ok(report)
	}
}

impl Default for TreeEditor {
	fn default() -> Self {
		Self::new(EditorConfig::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Creates a node through the form, then places it at `at`.
	fn add_node(editor: &mut TreeEditor, label: &str, color: Color, at: Point) -> NodeId {
		editor.dispatch(Command::SetLabel(label.into()));
		editor.dispatch(Command::SetColor(color));
		editor.dispatch(Command::Submit);
		let id = editor.store().nodes().last().unwrap().id.clone();
		editor.store.move_node(&id, at.x, at.y);
		editor.scene.rebuild(&editor.store);
		id
	}

	fn connect(editor: &mut TreeEditor, from: &NodeId, to: &NodeId, description: &str) {
		let anchor = editor.scene().node_box(from).unwrap().rect.anchor();
		editor.dispatch(Command::Click(anchor));
		editor.dispatch(Command::ToggleTarget(to.clone()));
		editor.dispatch(Command::SetDescription(description.into()));
		editor.dispatch(Command::Submit);
	}

	#[test]
	fn submit_without_selection_creates_node() {
		let mut editor = TreeEditor::default();
		editor.dispatch(Command::SetLabel("Start".into()));
		editor.dispatch(Command::Submit);
		assert_eq!(editor.store().len(), 1);
		assert_eq!(editor.form().label, "");
		assert_eq!(editor.form().color, Color::RED);
		assert_eq!(editor.scene().boxes().count(), 1);
	}

	#[test]
	fn click_selects_and_populates_form() {
		let mut editor = TreeEditor::default();
		let a = add_node(&mut editor, "Start", Color::rgb(1, 2, 3), Point::new(50.0, 50.0));
		let b = add_node(&mut editor, "End", Color::RED, Point::new(300.0, 50.0));
		connect(&mut editor, &a, &b, "yes");

		editor.dispatch(Command::Click(Point::new(60.0, 60.0)));
		assert_eq!(editor.interaction(), &Interaction::Selected(a.clone()));
		assert_eq!(editor.form().label, "Start");
		assert_eq!(editor.form().color, Color::rgb(1, 2, 3));
		assert!(editor.can_delete_node());

		let options = editor.target_options();
		assert_eq!(options.len(), 1);
		assert_eq!(options[0].id, b);
		assert!(options[0].connected);

		editor.dispatch(Command::Click(Point::new(900.0, 900.0)));
		assert_eq!(editor.interaction(), &Interaction::Idle);
		assert_eq!(editor.form().label, "");
		assert!(!editor.can_delete_node());
		assert!(editor.target_options().is_empty());
	}

	#[test]
	fn drag_keeps_pointer_offset_and_selection() {
		let mut editor = TreeEditor::default();
		let a = add_node(&mut editor, "A", Color::RED, Point::new(100.0, 100.0));
		let b = add_node(&mut editor, "B", Color::RED, Point::new(400.0, 100.0));
		let c = add_node(&mut editor, "C", Color::RED, Point::new(100.0, 400.0));
		let d = add_node(&mut editor, "D", Color::RED, Point::new(400.0, 400.0));
		connect(&mut editor, &a, &b, "ab");
		connect(&mut editor, &c, &d, "cd");
		let cd_before = editor.scene().link(&ConnectionKey::new(&c, &d)).cloned();

		editor.dispatch(Command::PointerDown(Point::new(110.0, 105.0)));
		assert_eq!(
			editor.interaction(),
			&Interaction::Dragging {
				node: a.clone(),
				offset: Point::new(10.0, 5.0)
			}
		);
		assert_eq!(editor.form().label, "A");
		assert!(editor.can_delete_node());
		editor.dispatch(Command::PointerMove(Point::new(210.0, 305.0)));
		assert_eq!(
			editor.store().node(&a).map(|n| n.position),
			Some(Point::new(200.0, 300.0))
		);

		let ab = editor.scene().link(&ConnectionKey::new(&a, &b)).unwrap();
		assert_eq!(ab.line.from, Point::new(260.0, 320.0));
		assert_eq!(ab.label.at, Point::new(360.0, 220.0));
		assert_eq!(editor.scene().link(&ConnectionKey::new(&c, &d)).cloned(), cd_before);

		editor.dispatch(Command::PointerUp);
		assert_eq!(editor.interaction(), &Interaction::Selected(a.clone()));
		editor.dispatch(Command::PointerMove(Point::new(0.0, 0.0)));
		assert_eq!(
			editor.store().node(&a).map(|n| n.position),
			Some(Point::new(200.0, 300.0))
		);
	}

	#[test]
	fn drag_without_click_loads_dragged_node_into_form() {
		let mut editor = TreeEditor::default();
		let a = add_node(&mut editor, "A", Color::rgb(1, 1, 1), Point::new(0.0, 0.0));
		let b = add_node(&mut editor, "B", Color::rgb(2, 2, 2), Point::new(200.0, 0.0));
		let c = add_node(&mut editor, "C", Color::RED, Point::new(400.0, 0.0));

		editor.dispatch(Command::Click(Point::new(10.0, 10.0)));
		editor.dispatch(Command::ToggleTarget(c.clone()));
		editor.dispatch(Command::SetLabel("A edited".into()));

		// Drag B off the canvas: pointer-up arrives with no click after it.
		editor.dispatch(Command::PointerDown(Point::new(210.0, 10.0)));
		editor.dispatch(Command::PointerMove(Point::new(260.0, 60.0)));
		editor.dispatch(Command::PointerUp);

		assert_eq!(editor.interaction(), &Interaction::Selected(b.clone()));
		assert_eq!(editor.form().label, "B");
		assert_eq!(editor.form().color, Color::rgb(2, 2, 2));
		assert!(editor.form().targets.is_empty());

		editor.dispatch(Command::Submit);
		let labels: Vec<_> = editor.store().nodes().map(|n| n.label.as_str()).collect();
		assert_eq!(labels, vec!["A", "B", "C"]);
		assert!(!editor.store().is_connected(&b, &c));
		assert!(!editor.store().is_connected(&a, &c));
	}

	#[test]
	fn pointer_down_on_selected_node_keeps_form_edits() {
		let mut editor = TreeEditor::default();
		add_node(&mut editor, "A", Color::RED, Point::new(0.0, 0.0));
		editor.dispatch(Command::Click(Point::new(10.0, 10.0)));
		editor.dispatch(Command::SetLabel("edited".into()));
		editor.dispatch(Command::PointerDown(Point::new(10.0, 10.0)));
		assert_eq!(editor.form().label, "edited");
	}

	#[test]
	fn pointer_down_on_empty_canvas_does_nothing() {
		let mut editor = TreeEditor::default();
		add_node(&mut editor, "A", Color::RED, Point::new(100.0, 100.0));
		editor.dispatch(Command::PointerDown(Point::new(5.0, 5.0)));
		assert_eq!(editor.interaction(), &Interaction::Idle);
	}

	#[test]
	fn submit_with_selection_updates_and_connects() {
		let mut editor = TreeEditor::default();
		let a = add_node(&mut editor, "A", Color::RED, Point::new(0.0, 0.0));
		let b = add_node(&mut editor, "B", Color::RED, Point::new(200.0, 0.0));
		let c = add_node(&mut editor, "B", Color::RED, Point::new(400.0, 0.0));

		editor.dispatch(Command::Click(Point::new(10.0, 10.0)));
		editor.dispatch(Command::SetLabel("Root".into()));
		editor.dispatch(Command::SetColor(Color::rgb(0, 0, 255)));
		editor.dispatch(Command::ToggleTarget(b.clone()));
		editor.dispatch(Command::ToggleTarget(c.clone()));
		editor.dispatch(Command::SetDescription("maybe".into()));
		editor.dispatch(Command::Submit);

		let root = editor.store().node(&a).unwrap();
		assert_eq!(root.label, "Root");
		assert_eq!(root.color, Color::rgb(0, 0, 255));
		// Both same-labelled targets are connected: lookup is by id.
		assert!(editor.store().is_connected(&a, &b));
		assert!(editor.store().is_connected(&a, &c));
		assert_eq!(editor.interaction(), &Interaction::Idle);
		assert!(editor.form().targets.is_empty());
		assert_eq!(editor.scene().links().count(), 2);
	}

	#[test]
	fn reverse_connection_overwrites_description() {
		let mut editor = TreeEditor::default();
		let a = add_node(&mut editor, "A", Color::RED, Point::new(0.0, 0.0));
		let b = add_node(&mut editor, "B", Color::RED, Point::new(200.0, 0.0));
		connect(&mut editor, &a, &b, "go");
		connect(&mut editor, &b, &a, "go2");

		assert_eq!(editor.store().connections().len(), 1);
		assert_eq!(
			editor.store().connection(&a, &b).and_then(|c| c.description.as_deref()),
			Some("go2")
		);
	}

	#[test]
	fn inspect_then_delete_connection() {
		let mut editor = TreeEditor::default();
		let a = add_node(&mut editor, "A", Color::RED, Point::new(0.0, 0.0));
		let b = add_node(&mut editor, "B", Color::RED, Point::new(200.0, 0.0));
		let c = add_node(&mut editor, "C", Color::RED, Point::new(400.0, 0.0));
		connect(&mut editor, &a, &b, "ab");
		connect(&mut editor, &a, &c, "ac");

		// Inspect from the end side of the a-b connection.
		editor.dispatch(Command::Click(Point::new(210.0, 10.0)));
		editor.dispatch(Command::InspectConnection(a.clone()));
		assert_eq!(editor.form().description, "ab");
		assert!(editor.can_delete_connection());

		editor.dispatch(Command::DeleteInspectedConnection);
		assert!(!editor.store().is_connected(&a, &b));
		assert!(editor.store().is_connected(&a, &c));
		assert!(!editor.can_delete_connection());
		assert_eq!(editor.form().description, "");
		assert_eq!(editor.interaction(), &Interaction::Selected(b.clone()));
		assert_eq!(editor.scene().links().count(), 1);

		editor.dispatch(Command::InspectConnection(c.clone()));
		assert!(!editor.can_delete_connection());
	}

	#[test]
	fn delete_selected_node_cascades() {
		let mut editor = TreeEditor::default();
		let a = add_node(&mut editor, "A", Color::RED, Point::new(0.0, 0.0));
		let b = add_node(&mut editor, "B", Color::RED, Point::new(200.0, 0.0));
		connect(&mut editor, &a, &b, "go");

		editor.dispatch(Command::DeleteSelectedNode);
		assert_eq!(editor.store().len(), 2);

		editor.dispatch(Command::Click(Point::new(10.0, 10.0)));
		editor.dispatch(Command::DeleteSelectedNode);
		assert!(editor.store().node(&a).is_none());
		assert!(editor.store().node(&b).is_some());
		assert!(editor.store().connections().is_empty());
		assert_eq!(editor.scene().links().count(), 0);
		assert_eq!(editor.interaction(), &Interaction::Idle);
	}

	#[test]
	fn export_clear_import_scenario() {
		let mut editor = TreeEditor::default();
		let a = add_node(&mut editor, "Start", Color::rgb(0xff, 0, 0), Point::new(0.0, 0.0));
		let b = add_node(&mut editor, "End", Color::rgb(0, 0xff, 0), Point::new(100.0, 100.0));
		connect(&mut editor, &a, &b, "yes");
		let json = editor.export_json().unwrap();

		let mut fresh = TreeEditor::default();
		let report = fresh.import_json(&json).unwrap();
		assert_eq!(report.nodes, 2);
		assert_eq!(report.connections, 1);
		assert_eq!(fresh.store().len(), 2);
		let start = fresh.store().node(&a).unwrap();
		assert_eq!((start.label.as_str(), start.color), ("Start", Color::RED));
		let end = fresh.store().node(&b).unwrap();
		assert_eq!((end.label.as_str(), end.color), ("End", Color::rgb(0, 255, 0)));
		assert_eq!(end.position, Point::new(100.0, 100.0));
		assert_eq!(fresh.store().connections().len(), 1);
		assert_eq!(
			fresh.store().connections()[0].description.as_deref(),
			Some("yes")
		);
		assert_eq!(fresh.scene().links().count(), 1);
	}

	#[test]
	fn malformed_import_leaves_graph_alone() {
		let mut editor = TreeEditor::default();
		add_node(&mut editor, "A", Color::RED, Point::new(0.0, 0.0));
		assert!(editor.import_json("{ not json").is_err());
		assert_eq!(editor.store().len(), 1);
	}
}
