//! Frame rendering for the concept graph.
//!
//! Rendering order:
//! 1. Background gradient (surface space)
//! 2. Edges as gradient lines between endpoint colors (simulation space)
//! 3. Per node: glow halo, pulse rings, disc, label (simulation space)
//! 4. Vignette (surface space)

use std::f64::consts::TAU;

use super::animation::InteractionState;
use super::config::NodeStyleConfig;
use super::layout::{SimLink, SimNode};
use super::surface::{LinearGradient, Paint, RadialGradient, Surface, SurfaceError};
use super::theme::{Color, DepthPalette, Theme};
use super::viewport::ViewTransform;

/// Number of rings drawn around an expanding node.
const PULSE_RINGS: usize = 3;

/// Attempt to smooth values that would otherwise cause abrupt visual changes.
fn smooth_step(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	t * t * (3.0 - 2.0 * t)
}

/// Conditions that require drawing this frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameTriggers {
	pub dirty: bool,
	pub layout_active: bool,
	pub entering: bool,
	pub expanding: bool,
	pub settling: bool,
}

impl FrameTriggers {
	pub fn needs_redraw(&self) -> bool {
		self.dirty || self.layout_active || self.entering || self.expanding || self.settling
	}
}

/// Everything a frame reads. Borrowed from the engine for the duration of
/// one draw.
pub struct FrameInputs<'a> {
	pub nodes: &'a [SimNode],
	pub links: &'a [SimLink],
	pub transform: ViewTransform,
	pub width: f64,
	pub height: f64,
	pub interaction: &'a InteractionState,
}

/// Draws simulated nodes and links onto a [`Surface`].
#[derive(Clone, Debug)]
pub struct RenderPipeline {
	pub theme: Theme,
	pub palette: DepthPalette,
	pub style: NodeStyleConfig,
}

impl RenderPipeline {
	pub fn new(theme: Theme, palette: DepthPalette, style: NodeStyleConfig) -> Self {
		Self {
			theme,
			palette,
			style,
		}
	}

	pub fn node_color(&self, node: &SimNode) -> Color {
		self.palette.color(node.depth, node.island)
	}

	/// Renders one complete frame. A zero-size surface draws nothing.
	pub fn render<S: Surface + ?Sized>(
		&self,
		surface: &mut S,
		frame: &FrameInputs<'_>,
	) -> Result<(), SurfaceError> {
		if frame.width <= 0.0 || frame.height <= 0.0 {
			return Ok(());
		}

		self.draw_background(surface, frame)?;

		surface.save();
		let drawn = surface
			.apply_transform(&frame.transform)
			.and_then(|_| self.draw_links(surface, frame))
			.and_then(|_| self.draw_nodes(surface, frame));
		surface.restore();
		drawn?;

		if self.theme.background.vignette > 0.0 {
			self.draw_vignette(surface, frame)?;
		}
		Ok(())
	}

	fn draw_background<S: Surface + ?Sized>(
		&self,
		surface: &mut S,
		frame: &FrameInputs<'_>,
	) -> Result<(), SurfaceError> {
		let bg = &self.theme.background;
		let (cx, cy) = (frame.width / 2.0, frame.height / 2.0);
		let paint = if bg.use_gradient {
			Paint::Radial(RadialGradient {
				inner: (cx, cy, 0.0),
				outer: (cx, cy, frame.width.max(frame.height) * 0.8),
				stops: vec![(0.0, bg.color_secondary), (1.0, bg.color)],
			})
		} else {
			Paint::Solid(bg.color)
		};
		surface.fill_rect(0.0, 0.0, frame.width, frame.height, &paint)
	}

	fn draw_vignette<S: Surface + ?Sized>(
		&self,
		surface: &mut S,
		frame: &FrameInputs<'_>,
	) -> Result<(), SurfaceError> {
		let (cx, cy) = (frame.width / 2.0, frame.height / 2.0);
		let paint = Paint::Radial(RadialGradient {
			inner: (cx, cy, frame.width.min(frame.height) * 0.3),
			outer: (cx, cy, frame.width.max(frame.height) * 0.7),
			stops: vec![
				(0.0, Color::TRANSPARENT),
				(1.0, Color::rgba(0, 0, 0, self.theme.background.vignette)),
			],
		});
		surface.fill_rect(0.0, 0.0, frame.width, frame.height, &paint)
	}

	fn draw_links<S: Surface + ?Sized>(
		&self,
		surface: &mut S,
		frame: &FrameInputs<'_>,
	) -> Result<(), SurfaceError> {
		let width = self.style.edge_width / frame.transform.k;
		for link in frame.links {
			let (Some(s), Some(t)) = (frame.nodes.get(link.source), frame.nodes.get(link.target))
			else {
				continue;
			};
			let (dx, dy) = (t.x - s.x, t.y - s.y);
			if (dx * dx + dy * dy).sqrt() < 0.001 {
				continue;
			}

			let entrance = smooth_step(s.anim.entrance_progress.min(t.anim.entrance_progress));
			let alpha = self.style.edge_alpha * entrance;
			if alpha < 0.01 {
				continue;
			}

			let paint = Paint::Linear(LinearGradient {
				from: (s.x, s.y),
				to: (t.x, t.y),
				stops: vec![
					(0.0, self.node_color(s).with_alpha(alpha)),
					(1.0, self.node_color(t).with_alpha(alpha)),
				],
			});
			surface.stroke_line((s.x, s.y), (t.x, t.y), width, &paint)?;
		}
		Ok(())
	}

	fn draw_nodes<S: Surface + ?Sized>(
		&self,
		surface: &mut S,
		frame: &FrameInputs<'_>,
	) -> Result<(), SurfaceError> {
		let k = frame.transform.k;
		let label_size = self.style.label_size / k.max(self.style.label_min_k);
		let font = format!("{}px {}", label_size, self.theme.label.font_family);

		for node in frame.nodes {
			let entrance = smooth_step(node.anim.entrance_progress);
			let radius = self.style.radius * node.anim.scale * entrance;
			if radius <= 0.0 {
				continue;
			}
			let (x, y) = (node.x, node.y);
			let color = self.node_color(node);

			self.draw_glow(surface, node, color, radius, entrance)?;

			if frame.interaction.is_expanding(node.id()) {
				self.draw_pulse_rings(surface, node, radius, entrance, k)?;
			} else if frame.interaction.is_selected(node.id()) {
				self.draw_selection_ring(surface, node, color, radius, entrance, k)?;
			}

			let disc = Paint::Radial(RadialGradient {
				inner: (x - radius * 0.3, y - radius * 0.3, 0.0),
				outer: (x, y, radius),
				stops: vec![
					(0.0, Color::WHITE.with_alpha(entrance)),
					(0.35, color.lighten(0.3).with_alpha(entrance)),
					(1.0, color.with_alpha(entrance)),
				],
			});
			surface.fill_circle(x, y, radius, &disc)?;

			if entrance > 0.05 {
				let label = &self.theme.label;
				let paint = Paint::Solid(label.color.with_alpha(label.color.a * entrance));
				surface.fill_text(
					&node.node.label,
					x + radius + label.offset / k.max(self.style.label_min_k),
					y + label_size * 0.35,
					&font,
					&paint,
				)?;
			}
		}
		Ok(())
	}

	fn draw_glow<S: Surface + ?Sized>(
		&self,
		surface: &mut S,
		node: &SimNode,
		color: Color,
		radius: f64,
		entrance: f64,
	) -> Result<(), SurfaceError> {
		let glow = node.anim.glow_intensity;
		let alpha = glow * 0.5 * entrance;
		if alpha < 0.01 {
			return Ok(());
		}
		let glow_radius = radius * (1.5 + 2.0 * glow);
		let paint = Paint::Radial(RadialGradient {
			inner: (node.x, node.y, radius * 0.5),
			outer: (node.x, node.y, glow_radius),
			stops: vec![
				(0.0, color.lighten(0.2).with_alpha(alpha)),
				(0.5, color.with_alpha(alpha * 0.4)),
				(1.0, Color::TRANSPARENT),
			],
		});
		surface.fill_circle(node.x, node.y, glow_radius, &paint)
	}

	/// Three rings spaced a third of a cycle apart, each growing outward and
	/// fading as its phase runs from 0 to 1.
	fn draw_pulse_rings<S: Surface + ?Sized>(
		&self,
		surface: &mut S,
		node: &SimNode,
		radius: f64,
		entrance: f64,
		k: f64,
	) -> Result<(), SurfaceError> {
		let cycle = node.anim.pulse_phase / TAU;
		for i in 0..PULSE_RINGS {
			let t = (cycle + i as f64 / PULSE_RINGS as f64).rem_euclid(1.0);
			let alpha = (1.0 - t) * 0.6 * entrance;
			if alpha < 0.01 {
				continue;
			}
			let paint = Paint::Solid(self.theme.pulse_color.with_alpha(alpha));
			surface.stroke_circle(node.x, node.y, radius * (1.0 + 1.5 * t), 2.0 / k, &paint)?;
		}
		Ok(())
	}

	fn draw_selection_ring<S: Surface + ?Sized>(
		&self,
		surface: &mut S,
		node: &SimNode,
		color: Color,
		radius: f64,
		entrance: f64,
		k: f64,
	) -> Result<(), SurfaceError> {
		let breathe = 0.5 + 0.5 * node.anim.pulse_phase.sin();
		let paint = Paint::Solid(color.lighten(0.4).with_alpha((0.5 + 0.3 * breathe) * entrance));
		surface.stroke_circle(node.x, node.y, radius + (4.0 + 2.0 * breathe) / k, 1.5 / k, &paint)
	}
}

#[cfg(test)]
mod tests {
	use super::super::animation::NodeAnimation;
	use super::super::config::PaletteConfig;
	use super::super::types::GraphNode;
	use super::*;

	#[derive(Debug, PartialEq)]
	enum Op {
		Save,
		Restore,
		Transform(ViewTransform),
		Rect(Paint),
		Circle { r: f64, paint: Paint },
		Ring { r: f64 },
		Line { paint: Paint },
		Text { text: String, x: f64 },
	}

	#[derive(Default)]
	struct Recorder {
		ops: Vec<Op>,
	}

	impl Surface for Recorder {
		fn save(&mut self) {
			self.ops.push(Op::Save);
		}
		fn restore(&mut self) {
			self.ops.push(Op::Restore);
		}
		fn apply_transform(&mut self, t: &ViewTransform) -> Result<(), SurfaceError> {
			self.ops.push(Op::Transform(*t));
			Ok(())
		}
		fn fill_rect(&mut self, _: f64, _: f64, _: f64, _: f64, paint: &Paint) -> Result<(), SurfaceError> {
			self.ops.push(Op::Rect(paint.clone()));
			Ok(())
		}
		fn fill_circle(&mut self, _: f64, _: f64, r: f64, paint: &Paint) -> Result<(), SurfaceError> {
			self.ops.push(Op::Circle { r, paint: paint.clone() });
			Ok(())
		}
		fn stroke_circle(&mut self, _: f64, _: f64, r: f64, _: f64, _: &Paint) -> Result<(), SurfaceError> {
			self.ops.push(Op::Ring { r });
			Ok(())
		}
		fn stroke_line(&mut self, _: (f64, f64), _: (f64, f64), _: f64, paint: &Paint) -> Result<(), SurfaceError> {
			self.ops.push(Op::Line { paint: paint.clone() });
			Ok(())
		}
		fn fill_text(&mut self, text: &str, x: f64, _: f64, _: &str, _: &Paint) -> Result<(), SurfaceError> {
			self.ops.push(Op::Text { text: text.to_string(), x });
			Ok(())
		}
	}

	fn pipeline() -> RenderPipeline {
		RenderPipeline::new(
			Theme::minimal(),
			DepthPalette::new(PaletteConfig::default()),
			NodeStyleConfig::default(),
		)
	}

	fn node(id: &str, x: f64, depth: usize, progress: f64) -> SimNode {
		SimNode {
			node: GraphNode::generated(id, id.to_uppercase()),
			depth: Some(depth),
			island: Some(0),
			x,
			y: 0.0,
			vx: 0.0,
			vy: 0.0,
			anim: NodeAnimation {
				entrance_progress: progress,
				..NodeAnimation::settled()
			},
		}
	}

	fn frame<'a>(
		nodes: &'a [SimNode],
		links: &'a [SimLink],
		interaction: &'a InteractionState,
	) -> FrameInputs<'a> {
		FrameInputs {
			nodes,
			links,
			transform: ViewTransform::new(10.0, 20.0, 2.0),
			width: 800.0,
			height: 600.0,
			interaction,
		}
	}

	#[test]
	fn zero_size_surface_draws_nothing() {
		let nodes = [node("a", 0.0, 0, 1.0)];
		let idle = InteractionState::default();
		let mut inputs = frame(&nodes, &[], &idle);
		inputs.width = 0.0;
		let mut rec = Recorder::default();
		pipeline().render(&mut rec, &inputs).unwrap();
		assert!(rec.ops.is_empty());
	}

	#[test]
	fn draws_in_layer_order() {
		let nodes = [node("a", 0.0, 0, 1.0), node("b", 100.0, 1, 1.0)];
		let links = [SimLink {
			source: 0,
			target: 1,
			label: None,
		}];
		let idle = InteractionState::default();
		let mut rec = Recorder::default();
		pipeline().render(&mut rec, &frame(&nodes, &links, &idle)).unwrap();

		assert!(matches!(rec.ops[0], Op::Rect(Paint::Solid(_))));
		assert_eq!(rec.ops[1], Op::Save);
		assert_eq!(rec.ops[2], Op::Transform(ViewTransform::new(10.0, 20.0, 2.0)));
		assert!(matches!(rec.ops[3], Op::Line { .. }));
		assert_eq!(rec.ops.last(), Some(&Op::Restore));
		let texts: Vec<_> = rec
			.ops
			.iter()
			.filter_map(|op| match op {
				Op::Text { text, .. } => Some(text.as_str()),
				_ => None,
			})
			.collect();
		assert_eq!(texts, vec!["A", "B"]);
	}

	#[test]
	fn edge_gradient_blends_endpoint_colors() {
		let p = pipeline();
		let nodes = [node("a", 0.0, 0, 1.0), node("b", 100.0, 3, 1.0)];
		let links = [SimLink {
			source: 0,
			target: 1,
			label: None,
		}];
		let idle = InteractionState::default();
		let mut rec = Recorder::default();
		p.render(&mut rec, &frame(&nodes, &links, &idle)).unwrap();
		let Some(Op::Line {
			paint: Paint::Linear(g),
		}) = rec.ops.iter().find(|op| matches!(op, Op::Line { .. }))
		else {
			panic!("no edge drawn");
		};
		assert_eq!(g.stops[0].1, p.node_color(&nodes[0]).with_alpha(0.6));
		assert_eq!(g.stops[1].1, p.node_color(&nodes[1]).with_alpha(0.6));
	}

	#[test]
	fn edges_to_entering_nodes_are_attenuated() {
		let nodes = [node("a", 0.0, 0, 1.0), node("b", 100.0, 1, 0.0)];
		let links = [SimLink {
			source: 0,
			target: 1,
			label: None,
		}];
		let idle = InteractionState::default();
		let mut rec = Recorder::default();
		pipeline().render(&mut rec, &frame(&nodes, &links, &idle)).unwrap();
		assert!(!rec.ops.iter().any(|op| matches!(op, Op::Line { .. })));
		// The entering node itself is not drawn yet either.
		let texts = rec.ops.iter().filter(|op| matches!(op, Op::Text { .. })).count();
		assert_eq!(texts, 1);
	}

	#[test]
	fn expanding_node_gets_three_rings() {
		let mut nodes = [node("a", 0.0, 0, 1.0)];
		nodes[0].anim.pulse_phase = 0.3;
		let expanding = InteractionState {
			expanding: Some("a".into()),
			..Default::default()
		};
		let mut rec = Recorder::default();
		pipeline().render(&mut rec, &frame(&nodes, &[], &expanding)).unwrap();
		let rings: Vec<f64> = rec
			.ops
			.iter()
			.filter_map(|op| match op {
				Op::Ring { r } => Some(*r),
				_ => None,
			})
			.collect();
		assert_eq!(rings.len(), 3);
		assert!(rings.iter().all(|&r| r >= 12.0 && r <= 12.0 * 2.5));
	}

	#[test]
	fn label_sits_right_of_disc() {
		let nodes = [node("a", 50.0, 0, 1.0)];
		let idle = InteractionState::default();
		let mut rec = Recorder::default();
		pipeline().render(&mut rec, &frame(&nodes, &[], &idle)).unwrap();
		let x = rec
			.ops
			.iter()
			.find_map(|op| match op {
				Op::Text { x, .. } => Some(*x),
				_ => None,
			})
			.unwrap();
		assert!(x > 50.0 + 12.0);
	}

	#[test]
	fn redraw_triggers() {
		assert!(!FrameTriggers::default().needs_redraw());
		assert!(FrameTriggers {
			dirty: true,
			..Default::default()
		}
		.needs_redraw());
		assert!(FrameTriggers {
			expanding: true,
			..Default::default()
		}
		.needs_redraw());
		assert!(FrameTriggers {
			entering: true,
			..Default::default()
		}
		.needs_redraw());
	}
}
