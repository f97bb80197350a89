//! Depth and island classification over the raw node/edge list.
//!
//! Each root node seeds one island at depth 0. A breadth-first walk from every
//! root, in input order, claims each unvisited non-root node it reaches and
//! records its distance from that root. Edges are walked in both directions, so a parent/child
//! relationship is found no matter which way the edge was recorded.

use std::collections::{HashMap, HashSet, VecDeque};

use super::types::{GraphEdge, GraphNode};

/// Result of topology analysis. Nodes unreachable from every root are absent
/// from both maps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Topology {
	/// BFS distance from the owning root.
	pub depth: HashMap<String, usize>,
	/// Rank of the owning root among all roots.
	pub island: HashMap<String, usize>,
}

impl Topology {
	/// Depth of `id`, or `None` when no root reaches it.
	pub fn depth_of(&self, id: &str) -> Option<usize> {
		self.depth.get(id).copied()
	}

	/// Island of `id`, or `None` when no root reaches it.
	pub fn island_of(&self, id: &str) -> Option<usize> {
		self.island.get(id).copied()
	}

	/// Number of distinct islands that were assigned.
	pub fn island_count(&self) -> usize {
		self.island.values().collect::<HashSet<_>>().len()
	}
}

/// Computes depth and island membership for every node reachable from a root.
///
/// Roots always sit at depth 0 on their own island, numbered by root rank.
/// First claim wins for everything else: a node reached by an earlier root
/// keeps that root's island even if a later root is closer. Walks never pass
/// through another root. Self-loops and duplicate edges are harmless since
/// only unvisited neighbours are enqueued.
pub fn analyze(nodes: &[GraphNode], edges: &[GraphEdge]) -> Topology {
	let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

	let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
	for edge in edges {
		let (src, tgt) = (edge.source.as_str(), edge.target.as_str());
		if src == tgt || !known.contains(src) || !known.contains(tgt) {
			continue;
		}
		adjacency.entry(src).or_default().push(tgt);
		adjacency.entry(tgt).or_default().push(src);
	}

	let mut topology = Topology::default();
	let mut roots = Vec::new();
	for root in nodes.iter().filter(|n| n.is_root()) {
		if topology.depth.contains_key(&root.id) {
			continue;
		}
		topology.depth.insert(root.id.clone(), 0);
		topology.island.insert(root.id.clone(), roots.len());
		roots.push(root.id.as_str());
	}

	// Roots are seeded above, so the walks below only claim non-roots.
	let mut queue = VecDeque::new();
	for (island, &root) in roots.iter().enumerate() {
		queue.push_back((root, 0usize));
		while let Some((id, depth)) = queue.pop_front() {
			let Some(neighbours) = adjacency.get(id) else {
				continue;
			};
			for &next in neighbours {
				if topology.depth.contains_key(next) {
					continue;
				}
				topology.depth.insert(next.to_string(), depth + 1);
				topology.island.insert(next.to_string(), island);
				queue.push_back((next, depth + 1));
			}
		}
	}

	topology
}

#[cfg(test)]
mod tests {
	use super::*;

	fn depth_map(t: &Topology) -> Vec<(&str, usize)> {
		let mut v: Vec<_> = t.depth.iter().map(|(k, v)| (k.as_str(), *v)).collect();
		v.sort();
		v
	}

	#[test]
	fn single_root() {
		let t = analyze(&[GraphNode::root("A", "A")], &[]);
		assert_eq!(t.depth_of("A"), Some(0));
		assert_eq!(t.island_of("A"), Some(0));
	}

	#[test]
	fn children_are_one_deeper() {
		let nodes = [
			GraphNode::root("A", "A"),
			GraphNode::generated("B", "B"),
			GraphNode::generated("C", "C"),
		];
		let edges = [GraphEdge::new("A", "B"), GraphEdge::new("A", "C")];
		let t = analyze(&nodes, &edges);
		assert_eq!(depth_map(&t), vec![("A", 0), ("B", 1), ("C", 1)]);
		assert!(t.island.values().all(|&i| i == 0));
	}

	#[test]
	fn two_roots_two_islands() {
		let t = analyze(&[GraphNode::root("A", "A"), GraphNode::root("X", "X")], &[]);
		assert_eq!(t.island_of("A"), Some(0));
		assert_eq!(t.island_of("X"), Some(1));
		assert_eq!(t.depth_of("X"), Some(0));
		assert_eq!(t.island_count(), 2);
	}

	#[test]
	fn reversed_edges_still_link_children() {
		let nodes = [
			GraphNode::root("A", "A"),
			GraphNode::generated("B", "B"),
			GraphNode::generated("C", "C"),
		];
		let edges = [GraphEdge::new("B", "A"), GraphEdge::new("C", "B")];
		let t = analyze(&nodes, &edges);
		assert_eq!(depth_map(&t), vec![("A", 0), ("B", 1), ("C", 2)]);
	}

	#[test]
	fn first_claim_wins() {
		// X is adjacent to both roots; A appears first so it owns X.
		let nodes = [
			GraphNode::root("A", "A"),
			GraphNode::generated("M", "M"),
			GraphNode::root("R", "R"),
			GraphNode::generated("X", "X"),
		];
		let edges = [
			GraphEdge::new("A", "M"),
			GraphEdge::new("M", "X"),
			GraphEdge::new("R", "X"),
		];
		let t = analyze(&nodes, &edges);
		assert_eq!(t.island_of("X"), Some(0));
		assert_eq!(t.depth_of("X"), Some(2));
		// R keeps its own island even though A's walk reaches it.
		assert_eq!(t.island_of("R"), Some(1));
		assert_eq!(t.depth_of("R"), Some(0));
		assert_eq!(t.island_count(), 2);
	}

	#[test]
	fn linked_roots_keep_their_own_islands() {
		let nodes = [
			GraphNode::root("A", "A"),
			GraphNode::root("R", "R"),
			GraphNode::generated("C", "C"),
		];
		let edges = [GraphEdge::new("A", "R"), GraphEdge::new("R", "C")];
		let t = analyze(&nodes, &edges);
		assert_eq!((t.depth_of("A"), t.island_of("A")), (Some(0), Some(0)));
		assert_eq!((t.depth_of("R"), t.island_of("R")), (Some(0), Some(1)));
		// Walks stop at other roots, so only R reaches C.
		assert_eq!((t.depth_of("C"), t.island_of("C")), (Some(1), Some(1)));
		assert_eq!(t.island_count(), 2);
	}

	#[test]
	fn unreachable_and_rootless() {
		let nodes = [GraphNode::generated("B", "B"), GraphNode::generated("C", "C")];
		let t = analyze(&nodes, &[GraphEdge::new("B", "C")]);
		assert!(t.depth.is_empty());
		assert!(t.island.is_empty());

		let nodes = [GraphNode::root("A", "A"), GraphNode::generated("Lost", "Lost")];
		let t = analyze(&nodes, &[]);
		assert_eq!(t.depth_of("Lost"), None);
		assert_eq!(t.island_of("Lost"), None);
	}

	#[test]
	fn self_loops_duplicates_and_dangling_edges() {
		let nodes = [GraphNode::root("A", "A"), GraphNode::generated("B", "B")];
		let edges = [
			GraphEdge::new("A", "A"),
			GraphEdge::new("A", "B"),
			GraphEdge::new("A", "B"),
			GraphEdge::new("B", "Z"),
		];
		let t = analyze(&nodes, &edges);
		assert_eq!(depth_map(&t), vec![("A", 0), ("B", 1)]);
		assert_eq!(t.depth_of("Z"), None);
	}

	#[test]
	fn analysis_is_pure() {
		let nodes = [
			GraphNode::root("A", "A"),
			GraphNode::generated("B", "B"),
			GraphNode::root("C", "C"),
			GraphNode::generated("D", "D"),
		];
		let edges = [GraphEdge::new("A", "B"), GraphEdge::new("D", "C")];
		assert_eq!(analyze(&nodes, &edges), analyze(&nodes, &edges));
	}

	#[test]
	fn every_child_has_a_parent_one_level_up() {
		let nodes: Vec<_> = std::iter::once(GraphNode::root("r", "r"))
			.chain((0..12).map(|i| GraphNode::generated(format!("n{i}"), "n")))
			.collect();
		let edges: Vec<_> = (0..12)
			.map(|i| {
				let parent = if i < 3 { "r".to_string() } else { format!("n{}", i / 3 - 1) };
				GraphEdge::new(parent, format!("n{i}"))
			})
			.collect();
		let t = analyze(&nodes, &edges);
		for (id, &d) in &t.depth {
			if d == 0 {
				continue;
			}
			let has_parent = edges.iter().any(|e| {
				(e.target == *id && t.depth_of(&e.source) == Some(d - 1))
					|| (e.source == *id && t.depth_of(&e.target) == Some(d - 1))
			});
			assert!(has_parent, "{id} at depth {d} has no parent");
		}
	}
}
