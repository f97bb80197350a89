//! Graph data structures supplied to the engine by the host application.

use serde::{Deserialize, Serialize};

/// Whether a node seeds its own island or was generated from another concept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
	/// Seeds an island at depth 0.
	Root,
	/// Produced by expanding another concept.
	#[default]
	Generated,
}

/// A concept in the graph.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in edges.
	pub id: String,
	/// Display label drawn next to the node.
	pub label: String,
	/// Root or generated.
	#[serde(rename = "type", default)]
	pub node_type: NodeType,
	/// Optional explanation of why this concept relates to its parent.
	#[serde(default)]
	pub reason: Option<String>,
}

impl GraphNode {
	/// Shorthand for a root node.
	pub fn root(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			node_type: NodeType::Root,
			reason: None,
		}
	}

	/// Shorthand for a generated node.
	pub fn generated(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			node_type: NodeType::Generated,
			reason: None,
		}
	}

	pub fn is_root(&self) -> bool {
		self.node_type == NodeType::Root
	}
}

/// A relationship between two nodes. Direction is recorded but not required
/// for topology analysis.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GraphEdge {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Optional relationship label.
	#[serde(default)]
	pub label: Option<String>,
}

impl GraphEdge {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			label: None,
		}
	}
}

/// Complete graph data: nodes and edges.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default, alias = "links")]
	pub edges: Vec<GraphEdge>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_service_payload() {
		let json = r#"{
			"nodes": [
				{"id": "rust", "label": "Rust", "type": "root", "reason": "User-provided seed topic"},
				{"id": "ownership", "label": "Ownership", "type": "generated"}
			],
			"links": [{"source": "rust", "target": "ownership", "label": "core concept"}]
		}"#;
		let data: GraphData = serde_json::from_str(json).unwrap();
		assert_eq!(data.nodes.len(), 2);
		assert!(data.nodes[0].is_root());
		assert_eq!(data.nodes[1].node_type, NodeType::Generated);
		assert_eq!(data.nodes[1].reason, None);
		assert_eq!(data.edges[0].label.as_deref(), Some("core concept"));
	}

	#[test]
	fn rejects_unknown_node_type() {
		let json = r#"{"nodes": [{"id": "a", "label": "A", "type": "branch"}]}"#;
		assert!(serde_json::from_str::<GraphData>(json).is_err());
	}
}
