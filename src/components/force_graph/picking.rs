//! Pointer hit-testing against simulated nodes.

use super::layout::SimNode;
use super::viewport::ViewTransform;

/// Returns the index of the first node, in list order, within `hit_radius`
/// (simulation units) of the surface point `(sx, sy)`.
///
/// Overlapping candidates resolve by list order, not by proximity. Points
/// outside the surface are not clamped; they simply miss.
pub fn pick(
	nodes: &[SimNode],
	transform: &ViewTransform,
	sx: f64,
	sy: f64,
	hit_radius: f64,
) -> Option<usize> {
	let (gx, gy) = transform.to_simulation(sx, sy);
	let r2 = hit_radius * hit_radius;
	nodes.iter().position(|node| {
		let (dx, dy) = (node.x - gx, node.y - gy);
		dx * dx + dy * dy < r2
	})
}

#[cfg(test)]
mod tests {
	use super::super::animation::NodeAnimation;
	use super::super::types::GraphNode;
	use super::*;

	fn at(id: &str, x: f64, y: f64) -> SimNode {
		SimNode {
			node: GraphNode::generated(id, id),
			depth: None,
			island: None,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			anim: NodeAnimation::settled(),
		}
	}

	#[test]
	fn hits_node_under_pointer() {
		let nodes = [at("far", 500.0, 500.0), at("n", 10.0, 10.0)];
		let t = ViewTransform::default();
		assert_eq!(pick(&nodes, &t, 10.0, 10.0, 40.0), Some(1));
		assert_eq!(pick(&nodes, &t, 45.0, 10.0, 40.0), Some(1));
		assert_eq!(pick(&nodes, &t, 51.0, 10.0, 40.0), None);
	}

	#[test]
	fn accounts_for_view_transform() {
		let nodes = [at("n", 10.0, 10.0)];
		let t = ViewTransform::new(100.0, 50.0, 2.0);
		assert_eq!(pick(&nodes, &t, 120.0, 70.0, 40.0), Some(0));
		assert_eq!(pick(&nodes, &t, 10.0, 10.0, 40.0), None);
	}

	#[test]
	fn overlapping_nodes_resolve_by_list_order() {
		let nodes = [at("first", 30.0, 0.0), at("closer", 1.0, 0.0)];
		let t = ViewTransform::default();
		assert_eq!(pick(&nodes, &t, 0.0, 0.0, 40.0), Some(0));
	}

	#[test]
	fn off_surface_points_just_miss() {
		let nodes = [at("n", 0.0, 0.0)];
		let t = ViewTransform::default();
		assert_eq!(pick(&nodes, &t, -1e6, 1e6, 40.0), None);
		assert_eq!(pick(&[], &t, 0.0, 0.0, 40.0), None);
	}
}
