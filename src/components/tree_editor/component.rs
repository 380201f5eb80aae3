use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
	Blob, BlobPropertyBag, CanvasRenderingContext2d, FileReader, HtmlAnchorElement,
	HtmlCanvasElement, HtmlInputElement, MouseEvent, Url,
};

use super::error::{EditorError, Result};
use super::geometry::Point;
use super::render;
use super::serialize::ImportReport;
use super::state::{Command, TargetOption, TreeEditor};
use super::types::{Color, EditorConfig};

#[component]
pub fn DecisionTreeEditor(
	#[prop(optional)] config: EditorConfig,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let editor = RwSignal::new(TreeEditor::new(config));
	let status = RwSignal::new(None::<String>);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (w, h) = (
			width.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			height.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		);
		if canvas.width() != w as u32 {
			canvas.set_width(w as u32);
		}
		if canvas.height() != h as u32 {
			canvas.set_height(h as u32);
		}
		match context_2d(&canvas) {
			Ok(ctx) => editor.with(|e| render::render(e, &ctx, w, h)),
			Err(err) => error!("{err}"),
		}
	});

	let dispatch = move |command: Command| editor.update(|e| e.dispatch(command));

	let on_mousedown = move |ev: MouseEvent| {
		if let Some(p) = canvas_point(canvas_ref, &ev) {
			dispatch(Command::PointerDown(p));
		}
	};

	let on_mousemove = move |ev: MouseEvent| {
		if !editor.with_untracked(|e| e.interaction().is_dragging()) {
			return;
		}
		if let Some(p) = canvas_point(canvas_ref, &ev) {
			dispatch(Command::PointerMove(p));
		}
	};

	let on_mouseup = move |_: MouseEvent| {
		if editor.with_untracked(|e| e.interaction().is_dragging()) {
			dispatch(Command::PointerUp);
		}
	};

	let on_click = move |ev: MouseEvent| {
		if let Some(p) = canvas_point(canvas_ref, &ev) {
			dispatch(Command::Click(p));
		}
	};

	let on_export = move |_: MouseEvent| {
		status.set(match download_json(editor) {
			Ok(()) => None,
			Err(err) => {
				error!("{err}");
				Some(err.to_string())
			}
		});
	};

	let on_import = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		let Some(file) = input.files().and_then(|files| files.get(0)) else {
			return;
		};
		if let Err(err) = read_import(&file, editor, status) {
			error!("{err}");
			status.set(Some(err.to_string()));
		}
		input.set_value("");
	};

	let target_rows = move || {
		editor
			.with(|e| e.target_options())
			.into_iter()
			.map(|TargetOption { id, label, connected, chosen }| {
				let inspect_id = id.clone();
				let weight = if connected { "bold" } else { "normal" };
				view! {
					<li>
						<label style:font-weight=weight>
							<input
								type="checkbox"
								prop:checked=chosen
								on:change=move |_| dispatch(Command::ToggleTarget(id.clone()))
							/>
							{label}
						</label>
						{connected
							.then(move || {
								view! {
									<button
										type="button"
										on:click=move |_| {
											dispatch(Command::InspectConnection(inspect_id.clone()))
										}
									>
										"Inspect"
									</button>
								}
							})}
					</li>
				}
			})
			.collect_view()
	};

	view! {
		<div class="tree-editor">
			<div class="properties-panel">
				<form on:submit=move |ev: leptos::ev::SubmitEvent| {
					ev.prevent_default();
					dispatch(Command::Submit);
				}>
					<label for="node-name">"Node name:"</label>
					<input
						type="text"
						id="node-name"
						prop:value=move || editor.with(|e| e.form().label.clone())
						on:input=move |ev| dispatch(Command::SetLabel(event_target_value(&ev)))
					/>
					<label for="node-color">"Color:"</label>
					<input
						type="color"
						id="node-color"
						prop:value=move || editor.with(|e| e.form().color.to_hex())
						on:input=move |ev| {
							if let Ok(color) = event_target_value(&ev).parse::<Color>() {
								dispatch(Command::SetColor(color));
							}
						}
					/>
					<span>"Connected to:"</span>
					<ul class="targets">{target_rows}</ul>
					<label for="connection-description">"Connection description:"</label>
					<input
						type="text"
						id="connection-description"
						prop:value=move || editor.with(|e| e.form().description.clone())
						on:input=move |ev| dispatch(Command::SetDescription(event_target_value(&ev)))
					/>
					<Show when=move || editor.with(|e| e.can_delete_node())>
						<button type="button" on:click=move |_| dispatch(Command::DeleteSelectedNode)>
							"Delete Node"
						</button>
					</Show>
					<Show when=move || editor.with(|e| e.can_delete_connection())>
						<button
							type="button"
							on:click=move |_| dispatch(Command::DeleteInspectedConnection)
						>
							"Delete Connection"
						</button>
					</Show>
					<input type="submit" value="Submit" />
				</form>
				<button type="button" on:click=on_export>
					"Export Decision Tree"
				</button>
				<label for="import-tree">"Import Decision Tree"</label>
				<input type="file" id="import-tree" accept="application/json" on:change=on_import />
				<p class="status">{move || status.get()}</p>
			</div>
			<div class="canvas-area">
				<canvas
					node_ref=canvas_ref
					class="tree-canvas"
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_mouseup
					on:mouseleave=on_mouseup
					on:click=on_click
					style="display: block; cursor: grab;"
				/>
			</div>
		</div>
	}
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
	canvas
		.get_context("2d")?
		.ok_or_else(|| EditorError::Browser("canvas has no 2d context".into()))?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|obj| EditorError::from(JsValue::from(obj)))
}

/// Serialises the graph and hands it to the browser as a file download.
fn download_json(editor: RwSignal<TreeEditor>) -> Result<()> {
	let (json, file_name) = editor.with_untracked(|e| {
		e.export_json()
			.map(|json| (json, e.config().export_file_name.clone()))
	})?;

	let parts = js_sys::Array::of1(&JsValue::from_str(&json));
	let options = BlobPropertyBag::new();
	options.set_type("application/json");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| EditorError::Browser("no document".into()))?;
	let anchor: HtmlAnchorElement = document
		.create_element("a")?
		.dyn_into()
		.map_err(|el: web_sys::Element| EditorError::from(JsValue::from(el)))?;
	anchor.set_href(&url);
	anchor.set_download(&file_name);
	anchor.click();
	Url::revoke_object_url(&url)?;
	Ok(())
}

/// Reads `file` as text; the graph is replaced only once the whole file has
/// been read and parsed.
fn read_import(
	file: &web_sys::File,
	editor: RwSignal<TreeEditor>,
	status: RwSignal<Option<String>>,
) -> Result<()> {
	let reader = FileReader::new()?;
	let on_load = {
		let reader = reader.clone();
		Closure::once_into_js(move || {
			let outcome = reader
				.result()
				.map_err(EditorError::from)
				.and_then(|value| value.as_string().ok_or(EditorError::EmptyFile))
				.and_then(|text| {
					editor
						.try_update(|e| e.import_json(&text))
						.unwrap_or_else(|| Err(EditorError::Browser("editor was disposed".into())))
				});
			status.set(Some(match outcome {
				Ok(report) => import_summary(&report),
				Err(err) => {
					error!("{err}");
					err.to_string()
				}
			}));
		})
	};
	reader.set_onload(Some(on_load.unchecked_ref()));
	reader.read_as_text(file)?;
	info!("reading {}", file.name());
	Ok(())
}

fn import_summary(report: &ImportReport) -> String {
	let mut summary = format!(
		"Imported {} nodes and {} connections",
		report.nodes, report.connections
	);
	if report.dropped_connections > 0 {
		summary.push_str(&format!(
			", dropped {} connections with missing endpoints",
			report.dropped_connections
		));
	}
	if report.skipped_nodes > 0 {
		summary.push_str(&format!(", skipped {} duplicate nodes", report.skipped_nodes));
	}
	summary
}
