//! Continuous force simulation over the current node set.
//!
//! Nodes are stored in input order and indexed by id, so a graph update can
//! reuse the simulated state of every id it has seen before. An update reheats
//! the simulation instead of restarting it; positions relax from wherever they
//! currently are.
//!
//! Forces, applied in this order each tick:
//! 1. many-body repulsion with inverse-distance falloff, cut off beyond
//!    `charge_distance_max`
//! 2. link springs toward `link_distance`
//! 3. centering: shifts the mean position onto the viewport centre
//! 4. collision: separates nodes closer than twice `collide_radius`
//! 5. weak x/y springs toward the viewport centre
//!
//! followed by velocity decay and position integration.

use std::collections::HashMap;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::animation::NodeAnimation;
use super::config::LayoutConfig;
use super::topology::Topology;
use super::types::{GraphData, GraphNode};

/// Engine-owned state for one node of the graph.
#[derive(Clone, Debug)]
pub struct SimNode {
	/// The node as last supplied by the host.
	pub node: GraphNode,
	/// Distance from the island's root. `None` when unreachable from any root.
	pub depth: Option<usize>,
	/// Root rank of the owning island. `None` when unreachable.
	pub island: Option<usize>,
	/// Simulation-space position.
	pub x: f64,
	pub y: f64,
	/// Velocity carried between ticks.
	pub vx: f64,
	pub vy: f64,
	pub anim: NodeAnimation,
}

impl SimNode {
	pub fn id(&self) -> &str {
		&self.node.id
	}
}

/// An edge resolved to indices into the current node list.
#[derive(Clone, Debug, PartialEq)]
pub struct SimLink {
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	pub label: Option<String>,
}

/// Summary of a graph merge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeReport {
	/// New ids introduced by this merge.
	pub added: usize,
	/// Ids that were present before and are now gone.
	pub removed: usize,
	/// Links kept after dropping unusable edges.
	pub links: usize,
	/// Edges whose endpoints were not both present, as `(source, target)`.
	pub dropped_edges: Vec<(String, String)>,
}

/// Force-directed layout with incremental updates.
pub struct LayoutEngine {
	config: LayoutConfig,
	nodes: Vec<SimNode>,
	index: HashMap<String, usize>,
	links: Vec<SimLink>,
	alpha: f64,
	center: (f64, f64),
	rng: StdRng,
}

impl LayoutEngine {
	/// Creates an empty, cold simulation pulling toward `center`.
	pub fn new(config: LayoutConfig, center: (f64, f64)) -> Self {
		let seed = config.seed.unwrap_or_else(entropy_seed);
		Self {
			config,
			nodes: Vec::new(),
			index: HashMap::new(),
			links: Vec::new(),
			alpha: 0.0,
			center,
			rng: StdRng::seed_from_u64(seed),
		}
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn nodes_mut(&mut self) -> &mut [SimNode] {
		&mut self.nodes
	}

	pub fn links(&self) -> &[SimLink] {
		&self.links
	}

	/// Looks up a node by id.
	pub fn node(&self, id: &str) -> Option<&SimNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Current simulation energy.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	/// True while the simulation still has energy to spend.
	pub fn is_active(&self) -> bool {
		!self.nodes.is_empty() && self.alpha > self.config.alpha_min
	}

	/// Raises the simulation energy to at least `alpha`.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha);
	}

	/// Moves the point the centering forces pull toward.
	pub fn set_center(&mut self, cx: f64, cy: f64) {
		if self.center == (cx, cy) {
			return;
		}
		self.center = (cx, cy);
		self.reheat(self.config.reheat_alpha);
	}

	/// Replaces the node/edge set while keeping state for known ids.
	///
	/// Known ids keep position, velocity and animation; their payload, depth
	/// and island are refreshed. New ids start at the centre plus jitter with
	/// the given animation state. Ids missing from `data` are discarded.
	/// The first merge into an empty engine starts at full energy, later
	/// merges reheat.
	pub fn merge(
		&mut self,
		data: &GraphData,
		topology: &Topology,
		new_anim: NodeAnimation,
	) -> MergeReport {
		let was_empty = self.nodes.is_empty();
		let mut previous: HashMap<String, SimNode> = self
			.nodes
			.drain(..)
			.map(|n| (n.node.id.clone(), n))
			.collect();
		self.index.clear();

		let mut report = MergeReport::default();
		for node in &data.nodes {
			if self.index.contains_key(&node.id) {
				debug!("concept-graph: duplicate node id {:?} ignored", node.id);
				continue;
			}
			let sim = match previous.remove(&node.id) {
				Some(mut existing) => {
					existing.node = node.clone();
					existing
				}
				None => {
					report.added += 1;
					let (jx, jy) = (self.jitter(), self.jitter());
					SimNode {
						node: node.clone(),
						depth: None,
						island: None,
						x: self.center.0 + jx,
						y: self.center.1 + jy,
						vx: 0.0,
						vy: 0.0,
						anim: new_anim.clone(),
					}
				}
			};
			self.index.insert(node.id.clone(), self.nodes.len());
			self.nodes.push(sim);
		}
		report.removed = previous.len();

		for sim in &mut self.nodes {
			sim.depth = topology.depth_of(&sim.node.id);
			sim.island = topology.island_of(&sim.node.id);
		}

		self.links.clear();
		for edge in &data.edges {
			match (self.index.get(&edge.source), self.index.get(&edge.target)) {
				(Some(&source), Some(&target)) if source != target => {
					self.links.push(SimLink {
						source,
						target,
						label: edge.label.clone(),
					});
				}
				(Some(_), Some(_)) => {}
				_ => {
					debug!(
						"concept-graph: dropping edge {:?} -> {:?}, endpoint missing",
						edge.source, edge.target
					);
					report
						.dropped_edges
						.push((edge.source.clone(), edge.target.clone()));
				}
			}
		}
		report.links = self.links.len();

		if self.nodes.is_empty() {
			self.alpha = 0.0;
		} else if was_empty {
			self.alpha = 1.0;
		} else {
			self.reheat(self.config.reheat_alpha);
		}

		report
	}

	/// Advances the simulation by one tick.
	pub fn step(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		self.alpha += (0.0 - self.alpha) * self.config.alpha_decay;
		let alpha = self.alpha;
		let cfg = &self.config;

		apply_charge(&mut self.nodes, &mut self.rng, cfg, alpha);
		apply_links(&mut self.nodes, &self.links, &mut self.rng, cfg, alpha);
		apply_center(&mut self.nodes, self.center, cfg.center_strength);
		apply_collide(&mut self.nodes, &mut self.rng, cfg);
		apply_position(&mut self.nodes, self.center, cfg.position_strength, alpha);

		let keep = 1.0 - cfg.velocity_decay;
		for n in &mut self.nodes {
			n.vx *= keep;
			n.vy *= keep;
			n.x += n.vx;
			n.y += n.vy;
		}
	}

	fn jitter(&mut self) -> f64 {
		let j = self.config.jitter;
		if j > 0.0 {
			self.rng.gen_range(-j..j)
		} else {
			0.0
		}
	}
}

/// Tiny random offset used to separate exactly coincident nodes.
fn jiggle(rng: &mut StdRng) -> f64 {
	(rng.r#gen::<f64>() - 0.5) * 1e-6
}

/// Mutable references to two distinct nodes, `i < j`.
fn pair_mut(nodes: &mut [SimNode], i: usize, j: usize) -> (&mut SimNode, &mut SimNode) {
	let (head, tail) = nodes.split_at_mut(j);
	(&mut head[i], &mut tail[0])
}

fn apply_charge(nodes: &mut [SimNode], rng: &mut StdRng, cfg: &LayoutConfig, alpha: f64) {
	let max2 = cfg.charge_distance_max * cfg.charge_distance_max;
	let min2 = cfg.charge_distance_min * cfg.charge_distance_min;
	for j in 1..nodes.len() {
		for i in 0..j {
			let (a, b) = pair_mut(nodes, i, j);
			let mut dx = b.x - a.x;
			let mut dy = b.y - a.y;
			let mut l = dx * dx + dy * dy;
			if l >= max2 {
				continue;
			}
			if dx == 0.0 {
				dx = jiggle(rng);
				l += dx * dx;
			}
			if dy == 0.0 {
				dy = jiggle(rng);
				l += dy * dy;
			}
			if l < min2 {
				l = (min2 * l).sqrt();
			}
			let w = cfg.charge_strength * alpha / l;
			a.vx += dx * w;
			a.vy += dy * w;
			b.vx -= dx * w;
			b.vy -= dy * w;
		}
	}
}

fn apply_links(
	nodes: &mut [SimNode],
	links: &[SimLink],
	rng: &mut StdRng,
	cfg: &LayoutConfig,
	alpha: f64,
) {
	let mut degree = vec![0usize; nodes.len()];
	for link in links {
		degree[link.source] += 1;
		degree[link.target] += 1;
	}

	for link in links {
		let (ds, dt) = (degree[link.source] as f64, degree[link.target] as f64);
		let strength = 1.0 / ds.min(dt);
		let bias = ds / (ds + dt);

		let (s, t) = (&nodes[link.source], &nodes[link.target]);
		let mut x = t.x + t.vx - s.x - s.vx;
		let mut y = t.y + t.vy - s.y - s.vy;
		if x == 0.0 {
			x = jiggle(rng);
		}
		if y == 0.0 {
			y = jiggle(rng);
		}
		let len = (x * x + y * y).sqrt();
		let l = (len - cfg.link_distance) / len * alpha * strength;
		x *= l;
		y *= l;

		let t = &mut nodes[link.target];
		t.vx -= x * bias;
		t.vy -= y * bias;
		let s = &mut nodes[link.source];
		s.vx += x * (1.0 - bias);
		s.vy += y * (1.0 - bias);
	}
}

fn apply_center(nodes: &mut [SimNode], center: (f64, f64), strength: f64) {
	let n = nodes.len() as f64;
	let (sx, sy) = nodes
		.iter()
		.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
	let (shift_x, shift_y) = ((sx / n - center.0) * strength, (sy / n - center.1) * strength);
	for node in nodes {
		node.x -= shift_x;
		node.y -= shift_y;
	}
}

fn apply_collide(nodes: &mut [SimNode], rng: &mut StdRng, cfg: &LayoutConfig) {
	let r = cfg.collide_radius * 2.0;
	let r2 = r * r;
	for j in 1..nodes.len() {
		for i in 0..j {
			let (a, b) = pair_mut(nodes, i, j);
			let mut dx = (a.x + a.vx) - (b.x + b.vx);
			let mut dy = (a.y + a.vy) - (b.y + b.vy);
			let mut l = dx * dx + dy * dy;
			if l >= r2 {
				continue;
			}
			if dx == 0.0 {
				dx = jiggle(rng);
				l += dx * dx;
			}
			if dy == 0.0 {
				dy = jiggle(rng);
				l += dy * dy;
			}
			let len = l.sqrt();
			let push = (r - len) / len * cfg.collide_strength * 0.5;
			a.vx += dx * push;
			a.vy += dy * push;
			b.vx -= dx * push;
			b.vy -= dy * push;
		}
	}
}

fn apply_position(nodes: &mut [SimNode], center: (f64, f64), strength: f64, alpha: f64) {
	for node in nodes {
		node.vx += (center.0 - node.x) * strength * alpha;
		node.vy += (center.1 - node.y) * strength * alpha;
	}
}

#[cfg(target_arch = "wasm32")]
fn entropy_seed() -> u64 {
	(js_sys::Math::random() * u64::MAX as f64) as u64 ^ js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn entropy_seed() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_nanos() as u64)
		.unwrap_or(0x5eed)
}
