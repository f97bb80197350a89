//! Per-node transient visuals: entrance fade-in, scale, glow and pulse phase.
//!
//! Runs after the layout step each frame and never touches positions. Scale
//! and glow use exponential smoothing,
//! `value += (target - value) * (1 - e^(-speed * dt))`,
//! so the approach rate is the same at any frame rate.

use super::config::AnimationConfig;
use super::layout::SimNode;

/// Animation fields carried by every simulated node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeAnimation {
	/// 0.0 when first seen, 1.0 once the entrance has finished.
	pub entrance_progress: f64,
	/// Frame time (ms) the entrance began. Stamped on the first advance.
	pub entrance_start: Option<f64>,
	pub scale: f64,
	pub glow_intensity: f64,
	/// Unbounded phase (radians) driving the pulse rings.
	pub pulse_phase: f64,
}

impl NodeAnimation {
	/// State for a node introduced after the engine was created.
	pub fn entering() -> Self {
		Self {
			entrance_progress: 0.0,
			..Self::settled()
		}
	}

	/// State for a node present from the start: no entrance animation.
	pub fn settled() -> Self {
		Self {
			entrance_progress: 1.0,
			entrance_start: None,
			scale: 1.0,
			glow_intensity: 0.0,
			pulse_phase: 0.0,
		}
	}
}

/// Which nodes the user is interacting with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
	pub hovered: Option<String>,
	pub selected: Option<String>,
	pub expanding: Option<String>,
}

impl InteractionState {
	pub fn is_hovered(&self, id: &str) -> bool {
		self.hovered.as_deref() == Some(id)
	}

	pub fn is_selected(&self, id: &str) -> bool {
		self.selected.as_deref() == Some(id)
	}

	pub fn is_expanding(&self, id: &str) -> bool {
		self.expanding.as_deref() == Some(id)
	}
}

/// What the last advance left unfinished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationStatus {
	/// Some node is still playing its entrance.
	pub entering: bool,
	/// Some node's scale or glow has not reached its target.
	pub settling: bool,
}

/// Values below this distance from the target snap onto it.
const SNAP: f64 = 1e-3;

/// Advances node animation fields from wall-clock frame times.
#[derive(Clone, Debug)]
pub struct AnimationStateMachine {
	config: AnimationConfig,
	last_frame: Option<f64>,
}

impl AnimationStateMachine {
	pub fn new(config: AnimationConfig) -> Self {
		Self {
			config,
			last_frame: None,
		}
	}

	/// Target `(scale, glow)` for a node given the interaction state.
	/// When several states apply the strongest target wins.
	pub fn targets(&self, id: &str, interaction: &InteractionState) -> (f64, f64) {
		let c = &self.config;
		let mut scale: f64 = 1.0;
		let mut glow: f64 = c.glow_idle;
		if interaction.is_hovered(id) {
			scale = scale.max(c.scale_hover);
			glow = glow.max(c.glow_hover);
		}
		if interaction.is_selected(id) {
			scale = scale.max(c.scale_selected);
			glow = glow.max(c.glow_selected);
		}
		if interaction.is_expanding(id) {
			scale = scale.max(c.scale_expanding);
			glow = glow.max(c.glow_expanding);
		}
		(scale, glow)
	}

	fn pulse_rate(&self, id: &str, interaction: &InteractionState) -> f64 {
		if interaction.is_expanding(id) {
			self.config.pulse_rate_expanding
		} else if interaction.is_selected(id) {
			self.config.pulse_rate_selected
		} else {
			0.0
		}
	}

	/// Advances every node to frame time `now` (milliseconds).
	pub fn advance(
		&mut self,
		nodes: &mut [SimNode],
		interaction: &InteractionState,
		now: f64,
	) -> AnimationStatus {
		let dt_ms = self
			.last_frame
			.map(|last| (now - last).clamp(0.0, self.config.max_frame_ms))
			.unwrap_or(0.0);
		self.last_frame = Some(now);
		let dt = dt_ms / 1000.0;

		let scale_factor = 1.0 - (-self.config.scale_speed * dt).exp();
		let glow_factor = 1.0 - (-self.config.glow_speed * dt).exp();

		let mut status = AnimationStatus::default();
		for sim in nodes.iter_mut() {
			let (target_scale, target_glow) = self.targets(&sim.node.id, interaction);
			let pulse_rate = self.pulse_rate(&sim.node.id, interaction);
			let anim = &mut sim.anim;

			if anim.entrance_progress < 1.0 {
				let start = *anim.entrance_start.get_or_insert(now);
				anim.entrance_progress = if self.config.entrance_duration_ms > 0.0 {
					((now - start) / self.config.entrance_duration_ms).clamp(0.0, 1.0)
				} else {
					1.0
				};
				status.entering |= anim.entrance_progress < 1.0;
			}

			anim.scale = approach(anim.scale, target_scale, scale_factor);
			anim.glow_intensity = approach(anim.glow_intensity, target_glow, glow_factor);
			status.settling |= anim.scale != target_scale || anim.glow_intensity != target_glow;

			anim.pulse_phase += pulse_rate * dt;
		}
		status
	}
}

fn approach(value: f64, target: f64, factor: f64) -> f64 {
	let next = value + (target - value) * factor;
	if (target - next).abs() < SNAP {
		target
	} else {
		next
	}
}
