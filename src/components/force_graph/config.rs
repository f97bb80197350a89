//! Tunable parameters for layout, animation, viewport and node styling.
//!
//! Every struct deserializes with `#[serde(default)]`, so a host page may
//! supply a partial JSON document and inherit the rest from the defaults.

use serde::Deserialize;

/// Force simulation parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Many-body strength. Negative values repel.
	pub charge_strength: f64,
	/// Pairs further apart than this exert no charge on each other.
	pub charge_distance_max: f64,
	/// Distances below this are softened to avoid singular forces.
	pub charge_distance_min: f64,
	/// Rest length of a link.
	pub link_distance: f64,
	/// Collision radius around each node centre.
	pub collide_radius: f64,
	/// Fraction of an overlap resolved per tick (0..=1).
	pub collide_strength: f64,
	/// Strength of the mean-position centering correction (0..=1).
	pub center_strength: f64,
	/// Strength of the weak springs toward the horizontal and vertical centre.
	pub position_strength: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Simulation stops being active below this energy.
	pub alpha_min: f64,
	/// Per-tick decay of energy toward zero.
	pub alpha_decay: f64,
	/// Energy restored when the graph changes.
	pub reheat_alpha: f64,
	/// Half-width of the random offset given to newly seen nodes.
	pub jitter: f64,
	/// Seed for the jitter source. `None` derives one from the host clock.
	pub seed: Option<u64>,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			charge_strength: -300.0,
			charge_distance_max: 400.0,
			charge_distance_min: 1.0,
			link_distance: 100.0,
			collide_radius: 30.0,
			collide_strength: 0.7,
			center_strength: 1.0,
			position_strength: 0.05,
			velocity_decay: 0.4,
			alpha_min,
			// Reaches alpha_min in ~300 ticks from alpha = 1.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			reheat_alpha: 0.3,
			jitter: 50.0,
			seed: None,
		}
	}
}

/// Timing and target levels for per-node visual transitions.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
	/// Duration of the entrance fade/scale-in, in milliseconds.
	pub entrance_duration_ms: f64,
	/// Exponential smoothing speed for scale (per second).
	pub scale_speed: f64,
	/// Exponential smoothing speed for glow (per second).
	pub glow_speed: f64,
	pub scale_hover: f64,
	pub scale_selected: f64,
	pub scale_expanding: f64,
	pub glow_idle: f64,
	pub glow_hover: f64,
	pub glow_selected: f64,
	pub glow_expanding: f64,
	/// Pulse phase advance while selected (radians per second).
	pub pulse_rate_selected: f64,
	/// Pulse phase advance while expanding (radians per second).
	pub pulse_rate_expanding: f64,
	/// Largest frame delta fed into the animation, in milliseconds.
	pub max_frame_ms: f64,
}

impl Default for AnimationConfig {
	fn default() -> Self {
		Self {
			entrance_duration_ms: 600.0,
			scale_speed: 12.0,
			glow_speed: 8.0,
			scale_hover: 1.25,
			scale_selected: 1.15,
			scale_expanding: 1.4,
			glow_idle: 0.3,
			glow_hover: 0.7,
			glow_selected: 0.85,
			glow_expanding: 1.0,
			pulse_rate_selected: std::f64::consts::PI,
			pulse_rate_expanding: 2.0 * std::f64::consts::PI,
			max_frame_ms: 100.0,
		}
	}
}

/// Pan and zoom limits.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
	/// Smallest allowed zoom factor.
	pub min_zoom: f64,
	/// Largest allowed zoom factor.
	pub max_zoom: f64,
	/// Zoom multiplier applied per wheel notch.
	pub wheel_factor: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.2,
			max_zoom: 5.0,
			wheel_factor: 1.1,
		}
	}
}

/// Sizes of drawn elements in simulation units.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NodeStyleConfig {
	/// Drawn node radius.
	pub radius: f64,
	/// Pointer distance that still counts as a hit. Larger than `radius`.
	pub hit_radius: f64,
	/// Label font size in screen pixels at zoom 1.
	pub label_size: f64,
	/// Zoom below which label size stops compensating.
	pub label_min_k: f64,
	pub edge_width: f64,
	/// Edge opacity before entrance attenuation.
	pub edge_alpha: f64,
}

impl Default for NodeStyleConfig {
	fn default() -> Self {
		Self {
			radius: 12.0,
			hit_radius: 40.0,
			label_size: 12.0,
			label_min_k: 0.5,
			edge_width: 1.5,
			edge_alpha: 0.6,
		}
	}
}

/// Depth and island color assignment.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
	/// Hue of depth 0 (degrees). Warm.
	pub hue_start: f64,
	/// Hue of `max_depth` (degrees). Cool.
	pub hue_end: f64,
	/// Depths beyond this reuse its hue with reduced saturation.
	pub max_depth: usize,
	pub saturation: f64,
	pub lightness: f64,
	/// Saturation removed from depths beyond `max_depth`.
	pub overflow_desaturation: f64,
	/// Hue offsets (degrees) applied per island, indexed modulo length.
	pub island_hue_offsets: Vec<f64>,
}

impl Default for PaletteConfig {
	fn default() -> Self {
		Self {
			hue_start: 15.0,
			hue_end: 215.0,
			max_depth: 5,
			saturation: 0.75,
			lightness: 0.58,
			overflow_desaturation: 0.15,
			// Golden-angle rotation keeps neighbouring islands far apart.
			island_hue_offsets: vec![0.0, 137.5, 275.0, 52.5, 190.0, 327.5, 105.0, 242.5],
		}
	}
}

/// Complete engine configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Force simulation tuning.
	pub layout: LayoutConfig,
	/// Per-node animation timing and targets.
	pub animation: AnimationConfig,
	/// Zoom limits and wheel step.
	pub viewport: ViewportConfig,
	/// Node and edge sizing.
	pub node: NodeStyleConfig,
	/// Depth and island coloring.
	pub palette: PaletteConfig,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let cfg: EngineConfig =
			serde_json::from_str(r#"{"viewport": {"max_zoom": 8.0}, "layout": {"seed": 7}}"#)
				.unwrap();
		assert_eq!(cfg.viewport.max_zoom, 8.0);
		assert_eq!(cfg.viewport.min_zoom, 0.2);
		assert_eq!(cfg.layout.seed, Some(7));
		assert_eq!(cfg.node.hit_radius, 40.0);
		assert!(cfg.node.hit_radius > cfg.node.radius);
	}

	#[test]
	fn alpha_schedule_reaches_minimum() {
		let cfg = LayoutConfig::default();
		let mut alpha = 1.0;
		let mut ticks = 0;
		while alpha >= cfg.alpha_min {
			alpha += (0.0 - alpha) * cfg.alpha_decay;
			ticks += 1;
		}
		assert!((295..=305).contains(&ticks), "took {ticks} ticks");
	}
}
