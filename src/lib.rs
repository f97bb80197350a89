//! concept-graph: Interactive force-directed visualization for concept graphs.
//!
//! This crate provides a WASM-based graph engine and canvas component that
//! lays out a multi-rooted concept graph with a continuous force simulation,
//! colors nodes by depth and island, and animates entrance, hover, selection
//! and in-progress expansion.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::{
	EngineConfig, ForceGraphCanvas, GraphData, GraphEdge, GraphEngine, GraphEvent, GraphNode,
	HoverInfo, NodeType, Theme,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("concept-graph: logging initialized");
}

/// Parses JSON embedded in a `<script>` element, logging on failure.
fn load_json<T: DeserializeOwned>(element_id: &str) -> Option<T> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(element_id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<T>(&json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("concept-graph: failed to parse #{}: {}", element_id, e);
			None
		}
	}
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], edges: [...] }
fn load_graph_data() -> Option<GraphData> {
	let data = load_json::<GraphData>("graph-data")?;
	info!(
		"concept-graph: loaded {} nodes, {} edges",
		data.nodes.len(),
		data.edges.len()
	);
	Some(data)
}

/// Load engine configuration from a script element with id="graph-config".
/// Any omitted field keeps its default.
fn load_config() -> Option<EngineConfig> {
	load_json::<EngineConfig>("graph-config")
}

/// Main application component.
/// Loads graph data from DOM and renders the concept graph with a hover
/// tooltip. Clicking a node marks it as expanding until it is clicked again.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_default();
	let config = load_config().unwrap_or_default();
	let graph_signal = Signal::derive(move || graph_data.clone());

	let (hover, set_hover) = signal(None::<HoverInfo>);
	let (expanding, set_expanding) = signal(None::<String>);

	let on_node_click = Callback::new(move |node: GraphNode| {
		info!("concept-graph: node clicked: {}", node.id);
		set_expanding.update(|current| {
			*current = if current.as_deref() == Some(node.id.as_str()) {
				None
			} else {
				Some(node.id.clone())
			};
		});
	});
	let on_hover = Callback::new(move |info: Option<HoverInfo>| set_hover.set(info));

	let tooltip = move || {
		hover.get().map(|info| {
			let style = format!("left: {}px; top: {}px;", info.x + 16.0, info.y + 16.0);
			view! {
				<div class="graph-tooltip" style=style>
					<strong>{info.node.label.clone()}</strong>
					{info.node.reason.clone().map(|reason| view! { <p>{reason}</p> })}
				</div>
			}
		})
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Concept Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas
				data=graph_signal
				expanding_node_id=expanding
				on_node_click=on_node_click
				on_hover=on_hover
				config=config
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Concept Graph"</h1>
				<p class="subtitle">"Click a concept to expand it. Scroll to zoom. Drag background to pan."</p>
			</div>
			{tooltip}
		</div>
	}
}
