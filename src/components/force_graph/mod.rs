//! Force-directed concept graph visualization.
//!
//! Renders a multi-rooted concept graph on an HTML canvas with:
//! - Depth/island classification from the node and edge list
//! - Incremental force-directed layout that keeps positions across updates
//! - Entrance, hover, selection and pulse animations per node
//! - Pan, zoom and pinch with pointer hit-testing through the view transform
//!
//! [`GraphEngine`] holds all of this and is driven one frame at a time;
//! [`ForceGraphCanvas`] mounts it on a canvas and feeds it browser events.
//!
//! # Example
//!
//! ```ignore
//! use concept_graph::{ForceGraphCanvas, GraphData, GraphEdge, GraphNode};
//!
//! let data = GraphData {
//!     nodes: vec![
//!         GraphNode::root("rust", "Rust"),
//!         GraphNode::generated("ownership", "Ownership"),
//!     ],
//!     edges: vec![GraphEdge::new("rust", "ownership")],
//! };
//!
//! view! { <ForceGraphCanvas data=data fullscreen=true /> }
//! ```

pub mod animation;
mod component;
pub mod config;
pub mod engine;
pub mod layout;
pub mod picking;
pub mod render;
pub mod surface;
pub mod theme;
pub mod topology;
mod types;
pub mod viewport;

pub use component::ForceGraphCanvas;
pub use config::EngineConfig;
pub use engine::{GraphEngine, GraphEvent, HoverInfo};
pub use theme::Theme;
pub use types::{GraphData, GraphEdge, GraphNode, NodeType};
