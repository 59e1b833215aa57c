//! lineage-river: interactive river diagram of organizational lineage.
//!
//! This crate provides a WASM-based canvas component that lays out teams
//! (or any long-lived organizations) on a year axis, packs them into
//! collision-free rows per tier, and supports pan/zoom, culling, and
//! shortest-path navigation between lineage nodes.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::river::{
	Error, GraphData, GraphFilter, Result, RiverCanvas, RiverConfig, ZoomLevel,
};

/// Id of the `<script>` element carrying the graph payload.
const GRAPH_DATA_ID: &str = "graph-data";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("lineage-river: logging initialized");
}

/// Text content of `<script id="{id}">`, if present.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Parse the text of the payload element `id`, if one was found.
fn parse_payload(id: &str, text: Option<String>) -> Result<GraphData> {
	let text = text.ok_or_else(|| Error::PayloadNotFound { id: id.to_owned() })?;
	GraphData::from_json(&text)
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...] }
fn load_graph_data() -> Result<GraphData> {
	let data = parse_payload(GRAPH_DATA_ID, script_text(GRAPH_DATA_ID))?;
	info!(
		"lineage-river: loaded {} nodes, {} links",
		data.nodes.as_ref().map_or(0, Vec::len),
		data.links.as_ref().map_or(0, Vec::len)
	);
	Ok(data)
}

/// Optional overrides from a script element with id="river-config".
fn load_config() -> RiverConfig {
	let Some(json_text) = script_text("river-config") else {
		return RiverConfig::default();
	};
	RiverConfig::from_json(&json_text).unwrap_or_else(|e| {
		warn!("lineage-river: ignoring invalid config: {}", e);
		RiverConfig::default()
	})
}

/// Main application component.
/// Loads graph data and configuration from the DOM and renders the river.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let (level, set_level) = signal(ZoomLevel::Overview);
	let river = match load_graph_data() {
		Ok(graph_data) => {
			let graph_signal = Signal::derive(move || graph_data.clone());
			view! {
				<RiverCanvas
					data=graph_signal
					config=load_config()
					on_level_change=move |(next, _): (ZoomLevel, f64)| set_level.set(next)
					fullscreen=true
				/>
			}
			.into_any()
		}
		Err(err) => {
			warn!("lineage-river: {err}");
			view! { <div class="lineage-river-error" role="alert">{err.to_string()}</div> }
				.into_any()
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Lineage River" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			{river}
			<div class="graph-overlay">
				<h1>"Lineage River"</h1>
				<p class="subtitle">
					"Scroll to zoom. Drag to pan. Click a team to focus it, then another to trace the path. Double-click to reset."
				</p>
				<p class="zoom-level">{move || level.get().to_string()}</p>
			</div>
		</div>
	}
}
