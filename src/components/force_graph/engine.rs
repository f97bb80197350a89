//! The per-frame scheduler tying topology, layout, animation, viewport,
//! picking and rendering together.
//!
//! The host calls [`GraphEngine::tick`] once per animation frame. Within a
//! tick the phases always run in the same order: physics step, animation
//! advance, then render. Graph updates, pointer input and resizes arrive
//! between ticks and only mutate state plus the dirty flag; nothing is drawn
//! outside `tick`.

use log::{debug, info};

use super::animation::{AnimationStateMachine, InteractionState, NodeAnimation};
use super::config::EngineConfig;
use super::layout::{LayoutEngine, MergeReport, SimLink, SimNode};
use super::picking::pick;
use super::render::{FrameInputs, FrameTriggers, RenderPipeline};
use super::surface::{Surface, SurfaceError};
use super::theme::{DepthPalette, Theme};
use super::topology::analyze;
use super::types::{GraphData, GraphNode};
use super::viewport::{ViewTransform, ViewportController};

/// The node under the pointer, for tooltip rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverInfo {
	pub node: GraphNode,
	/// Last known pointer position in surface coordinates.
	pub x: f64,
	pub y: f64,
}

/// Notifications for the host.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
	/// A node was clicked. Carries the node as last supplied by the host.
	NodeClick(GraphNode),
	/// The hovered node changed, or the pointer moved over it.
	Hover(Option<HoverInfo>),
}

/// Owns all mutable visualization state for one mounted graph.
pub struct GraphEngine {
	layout: LayoutEngine,
	animation: AnimationStateMachine,
	viewport: ViewportController,
	pipeline: RenderPipeline,
	hit_radius: f64,
	interaction: InteractionState,
	interactions_disabled: bool,
	pointer: Option<(f64, f64)>,
	width: f64,
	height: f64,
	dirty: bool,
	last_report: MergeReport,
}

impl GraphEngine {
	/// Creates an engine for the initial graph. Nodes present now appear
	/// without an entrance animation.
	pub fn new(data: &GraphData, width: f64, height: f64, config: EngineConfig, theme: Theme) -> Self {
		let EngineConfig {
			layout,
			animation,
			viewport,
			node,
			palette,
		} = config;
		let hit_radius = node.hit_radius;
		let mut engine = Self {
			layout: LayoutEngine::new(layout, (width / 2.0, height / 2.0)),
			animation: AnimationStateMachine::new(animation),
			viewport: ViewportController::new(viewport),
			pipeline: RenderPipeline::new(theme, DepthPalette::new(palette), node),
			hit_radius,
			interaction: InteractionState::default(),
			interactions_disabled: false,
			pointer: None,
			width,
			height,
			dirty: true,
			last_report: MergeReport::default(),
		};
		engine.merge(data, NodeAnimation::settled());
		engine
	}

	/// Replaces the graph. Known ids keep their layout and animation state;
	/// new ids play the entrance animation.
	pub fn set_graph(&mut self, data: &GraphData) -> &MergeReport {
		self.merge(data, NodeAnimation::entering());
		&self.last_report
	}

	fn merge(&mut self, data: &GraphData, new_anim: NodeAnimation) {
		let topology = analyze(&data.nodes, &data.edges);
		let report = self.layout.merge(data, &topology, new_anim);
		debug!(
			"concept-graph: merged {} nodes (+{} -{}), {} links, {} dropped edges, {} islands",
			self.layout.nodes().len(),
			report.added,
			report.removed,
			report.links,
			report.dropped_edges.len(),
			topology.island_count()
		);

		for slot in [&mut self.interaction.hovered, &mut self.interaction.selected] {
			if slot.as_deref().is_some_and(|id| self.layout.node(id).is_none()) {
				*slot = None;
			}
		}

		self.last_report = report;
		self.dirty = true;
	}

	/// Report of the most recent merge.
	pub fn last_report(&self) -> &MergeReport {
		&self.last_report
	}

	/// Highlights one node as the target of an in-flight operation. While
	/// set, frames are redrawn continuously.
	pub fn set_expanding(&mut self, id: Option<String>) {
		if self.interaction.expanding != id {
			self.interaction.expanding = id;
			self.dirty = true;
		}
	}

	/// While disabled, pointer-downs on nodes are ignored.
	pub fn set_interactions_disabled(&mut self, disabled: bool) {
		self.interactions_disabled = disabled;
	}

	/// Updates the surface size and recentres the layout.
	pub fn resize(&mut self, width: f64, height: f64) {
		if (width, height) == (self.width, self.height) {
			return;
		}
		info!("concept-graph: resized to {}x{}", width, height);
		self.width = width;
		self.height = height;
		if width > 0.0 && height > 0.0 {
			self.layout.set_center(width / 2.0, height / 2.0);
		}
		self.dirty = true;
	}

	/// Forces the next tick to redraw, e.g. after the host reset the surface.
	pub fn invalidate(&mut self) {
		self.dirty = true;
	}

	/// Runs one frame at time `now` (milliseconds). Returns whether anything
	/// was drawn.
	pub fn tick<S: Surface + ?Sized>(&mut self, now: f64, surface: &mut S) -> Result<bool, SurfaceError> {
		if self.width <= 0.0 || self.height <= 0.0 {
			return Ok(false);
		}

		let layout_active = self.layout.is_active();
		if layout_active {
			self.layout.step();
		}

		// The frame that completes an entrance must still be drawn.
		let was_entering = self
			.layout
			.nodes()
			.iter()
			.any(|n| n.anim.entrance_progress < 1.0);
		let status = self
			.animation
			.advance(self.layout.nodes_mut(), &self.interaction, now);

		let triggers = FrameTriggers {
			dirty: self.dirty,
			layout_active,
			entering: was_entering || status.entering,
			expanding: self.interaction.expanding.is_some(),
			settling: status.settling,
		};
		if !triggers.needs_redraw() {
			return Ok(false);
		}

		let frame = FrameInputs {
			nodes: self.layout.nodes(),
			links: self.layout.links(),
			transform: self.viewport.transform(),
			width: self.width,
			height: self.height,
			interaction: &self.interaction,
		};
		self.pipeline.render(surface, &frame)?;
		self.dirty = false;
		Ok(true)
	}

	fn pick_at(&self, sx: f64, sy: f64) -> Option<&SimNode> {
		let transform = self.viewport.transform();
		pick(self.layout.nodes(), &transform, sx, sy, self.hit_radius).map(|i| &self.layout.nodes()[i])
	}

	/// Pointer pressed at a surface position. Clicks the node under the
	/// pointer, or starts panning when there is none.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) -> Option<GraphEvent> {
		self.pointer = Some((sx, sy));
		match self.pick_at(sx, sy).map(|n| n.node.clone()) {
			Some(_) if self.interactions_disabled => None,
			Some(node) => {
				debug!("concept-graph: clicked {:?}", node.id);
				self.interaction.selected = Some(node.id.clone());
				self.dirty = true;
				Some(GraphEvent::NodeClick(node))
			}
			None => {
				if self.interaction.selected.take().is_some() {
					self.dirty = true;
				}
				self.viewport.begin_pan(sx, sy);
				None
			}
		}
	}

	/// Pointer moved. Pans while a pan is in progress, otherwise updates the
	/// hovered node.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> Option<GraphEvent> {
		self.pointer = Some((sx, sy));
		if self.viewport.is_panning() {
			if self.viewport.pan_to(sx, sy) {
				self.dirty = true;
			}
			return None;
		}

		let hovered = self.pick_at(sx, sy).map(|n| n.node.clone());
		let hovered_id = hovered.as_ref().map(|n| n.id.clone());
		let changed = hovered_id != self.interaction.hovered;
		if changed {
			self.interaction.hovered = hovered_id;
			self.dirty = true;
		}
		match hovered {
			Some(node) => Some(GraphEvent::Hover(Some(HoverInfo { node, x: sx, y: sy }))),
			None if changed => Some(GraphEvent::Hover(None)),
			None => None,
		}
	}

	/// Pointer released: ends any pan.
	pub fn pointer_up(&mut self) {
		self.viewport.end_pan();
	}

	/// Pointer left the surface: ends gestures and clears hover.
	pub fn pointer_leave(&mut self) -> Option<GraphEvent> {
		self.viewport.end_pan();
		self.viewport.end_pinch();
		self.pointer = None;
		if self.interaction.hovered.take().is_some() {
			self.dirty = true;
			Some(GraphEvent::Hover(None))
		} else {
			None
		}
	}

	/// Zooms about the pointer by one wheel notch in the direction of `delta_y`.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if self.viewport.wheel(sx, sy, delta_y) {
			self.dirty = true;
		}
	}

	/// Touch contact changed. One finger acts like a pointer-down, two start
	/// a pinch.
	pub fn touch_start(&mut self, touches: &[(f64, f64)]) -> Option<GraphEvent> {
		match touches {
			[(x, y)] => self.pointer_down(*x, *y),
			[a, b, ..] => {
				self.viewport.begin_pinch(*a, *b);
				None
			}
			[] => None,
		}
	}

	/// Contacts moved: pinches with two fingers, pans with one.
	pub fn touch_move(&mut self, touches: &[(f64, f64)]) {
		let changed = match touches {
			[a, b, ..] if self.viewport.is_pinching() => self.viewport.pinch_to(*a, *b),
			[(x, y)] => self.viewport.pan_to(*x, *y),
			_ => false,
		};
		if changed {
			self.dirty = true;
		}
	}

	/// Fingers lifted; `remaining` are the contacts still down.
	pub fn touch_end(&mut self, remaining: &[(f64, f64)]) {
		self.viewport.end_pinch();
		match remaining {
			[(x, y)] => self.viewport.begin_pan(*x, *y),
			_ => self.viewport.end_pan(),
		}
	}

	/// Currently hovered node with the last pointer position.
	pub fn hovered(&self) -> Option<HoverInfo> {
		let id = self.interaction.hovered.as_deref()?;
		let (x, y) = self.pointer?;
		let node = self.layout.node(id)?.node.clone();
		Some(HoverInfo { node, x, y })
	}

	/// Current view transform.
	pub fn transform(&self) -> ViewTransform {
		self.viewport.transform()
	}

	/// Replaces the view transform, clamping the zoom.
	pub fn set_transform(&mut self, transform: ViewTransform) {
		if self.viewport.set_transform(transform) {
			self.dirty = true;
		}
	}

	/// All simulated nodes in input order.
	pub fn nodes(&self) -> &[SimNode] {
		self.layout.nodes()
	}

	/// Links resolved from the last merge.
	pub fn links(&self) -> &[SimLink] {
		self.layout.links()
	}

	/// Looks up a simulated node by id.
	pub fn node(&self, id: &str) -> Option<&SimNode> {
		self.layout.node(id)
	}

	pub fn interaction(&self) -> &InteractionState {
		&self.interaction
	}

	/// Whether the next tick must redraw.
	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	pub fn is_layout_active(&self) -> bool {
		self.layout.is_active()
	}

	/// Surface size as `(width, height)`.
	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}
}

#[cfg(test)]
mod tests {
	use super::super::config::LayoutConfig;
	use super::super::types::GraphEdge;
	use super::*;

	fn config() -> EngineConfig {
		EngineConfig {
			layout: LayoutConfig {
				seed: Some(1),
				..LayoutConfig::default()
			},
			..EngineConfig::default()
		}
	}

	fn graph() -> GraphData {
		GraphData {
			nodes: vec![GraphNode::root("A", "Alpha"), GraphNode::generated("B", "Beta")],
			edges: vec![GraphEdge::new("A", "B")],
		}
	}

	#[test]
	fn initial_nodes_skip_entrance_and_new_ones_play_it() {
		let mut engine = GraphEngine::new(&graph(), 800.0, 600.0, config(), Theme::default());
		assert!(engine.nodes().iter().all(|n| n.anim.entrance_progress == 1.0));

		let mut next = graph();
		next.nodes.push(GraphNode::generated("C", "Gamma"));
		next.edges.push(GraphEdge::new("B", "C"));
		let report = engine.set_graph(&next).clone();
		assert_eq!(report.added, 1);
		assert_eq!(engine.node("C").unwrap().anim.entrance_progress, 0.0);
		assert_eq!(engine.node("A").unwrap().anim.entrance_progress, 1.0);
		assert_eq!(engine.node("C").unwrap().depth, Some(2));
	}

	#[test]
	fn click_selects_and_reports_payload() {
		let mut engine = GraphEngine::new(&graph(), 800.0, 600.0, config(), Theme::default());
		let (x, y) = {
			let b = engine.node("B").unwrap();
			(b.x, b.y)
		};
		// Keep A well away from B so only B is within the hit radius.
		engine.layout.nodes_mut()[0].x = x + 500.0;
		let event = engine.pointer_down(x, y);
		assert_eq!(event, Some(GraphEvent::NodeClick(GraphNode::generated("B", "Beta"))));
		assert_eq!(engine.interaction().selected.as_deref(), Some("B"));

		engine.pointer_down(x + 250.0, y);
		assert_eq!(engine.interaction().selected, None);
	}

	#[test]
	fn removed_nodes_drop_hover_and_selection() {
		let mut engine = GraphEngine::new(&graph(), 800.0, 600.0, config(), Theme::default());
		engine.interaction.hovered = Some("B".into());
		engine.interaction.selected = Some("B".into());
		engine.set_graph(&GraphData {
			nodes: vec![GraphNode::root("A", "Alpha")],
			edges: vec![],
		});
		assert_eq!(engine.interaction().hovered, None);
		assert_eq!(engine.interaction().selected, None);
	}

	#[test]
	fn hover_events_follow_pointer() {
		let mut engine = GraphEngine::new(&graph(), 800.0, 600.0, config(), Theme::default());
		engine.layout.nodes_mut()[0].x = -1000.0;
		let (x, y) = {
			let b = engine.node("B").unwrap();
			(b.x, b.y)
		};
		let Some(GraphEvent::Hover(Some(info))) = engine.pointer_move(x + 5.0, y) else {
			panic!("expected hover");
		};
		assert_eq!(info.node.id, "B");
		assert_eq!((info.x, info.y), (x + 5.0, y));
		assert_eq!(engine.hovered().map(|h| h.node.id), Some("B".to_string()));

		assert_eq!(engine.pointer_move(x + 900.0, y), Some(GraphEvent::Hover(None)));
		assert_eq!(engine.pointer_move(x + 901.0, y), None);
		engine.pointer_move(x, y);
		assert_eq!(engine.pointer_leave(), Some(GraphEvent::Hover(None)));
		assert_eq!(engine.hovered(), None);
	}
}
