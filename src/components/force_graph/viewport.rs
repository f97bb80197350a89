//! Pan and zoom transform between simulation space and surface space.
//!
//! `surface = simulation * k + (x, y)` and its inverse
//! `simulation = (surface - (x, y)) / k`. The zoom factor `k` is always kept
//! inside the configured range, so it is never zero.

use super::config::ViewportConfig;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in surface pixels.
	pub x: f64,
	/// Vertical translation in surface pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn new(x: f64, y: f64, k: f64) -> Self {
		Self { x, y, k }
	}

	/// Maps a simulation point to surface coordinates.
	pub fn to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	/// Maps a surface point back to simulation coordinates.
	pub fn to_simulation(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
struct PanState {
	active: bool,
	start_x: f64,
	start_y: f64,
	transform_start_x: f64,
	transform_start_y: f64,
}

/// Tracks an in-progress two-finger pinch.
#[derive(Clone, Debug, Default)]
struct PinchState {
	active: bool,
	start_distance: f64,
	start_k: f64,
	/// Simulation-space point under the initial pinch midpoint.
	anchor: (f64, f64),
}

/// Owns the view transform and turns pointer gestures into transform updates.
///
/// Mutating methods return `true` when the transform changed, so the caller
/// can mark the frame dirty.
#[derive(Clone, Debug)]
pub struct ViewportController {
	config: ViewportConfig,
	transform: ViewTransform,
	pan: PanState,
	pinch: PinchState,
}

impl ViewportController {
	pub fn new(config: ViewportConfig) -> Self {
		Self {
			config,
			transform: ViewTransform::default(),
			pan: PanState::default(),
			pinch: PinchState::default(),
		}
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	/// Replaces the transform, clamping its zoom into range.
	pub fn set_transform(&mut self, transform: ViewTransform) -> bool {
		let next = ViewTransform {
			k: self.clamp_zoom(transform.k),
			..transform
		};
		let changed = next != self.transform;
		self.transform = next;
		changed
	}

	pub fn to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		self.transform.to_screen(gx, gy)
	}

	pub fn to_simulation(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.transform.to_simulation(sx, sy)
	}

	fn clamp_zoom(&self, k: f64) -> f64 {
		if k.is_finite() {
			k.clamp(self.config.min_zoom, self.config.max_zoom)
		} else {
			self.transform.k
		}
	}

	pub fn is_panning(&self) -> bool {
		self.pan.active
	}

	/// Starts panning from a surface point.
	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) -> bool {
		if !self.pan.active {
			return false;
		}
		let (x, y) = (
			self.pan.transform_start_x + (sx - self.pan.start_x),
			self.pan.transform_start_y + (sy - self.pan.start_y),
		);
		let changed = (x, y) != (self.transform.x, self.transform.y);
		self.transform.x = x;
		self.transform.y = y;
		changed
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Multiplies the zoom by `factor`, keeping the surface point `(sx, sy)`
	/// fixed over the same simulation point.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) -> bool {
		let new_k = self.clamp_zoom(self.transform.k * factor);
		if new_k == self.transform.k {
			return false;
		}
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
		true
	}

	/// One wheel notch: scrolling down zooms out, up zooms in.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) -> bool {
		if delta_y == 0.0 {
			return false;
		}
		let factor = if delta_y > 0.0 {
			1.0 / self.config.wheel_factor
		} else {
			self.config.wheel_factor
		};
		self.zoom_at(sx, sy, factor)
	}

	pub fn is_pinching(&self) -> bool {
		self.pinch.active
	}

	/// Starts a pinch between two contacts. Ends any pan.
	pub fn begin_pinch(&mut self, a: (f64, f64), b: (f64, f64)) {
		self.end_pan();
		let (mx, my) = midpoint(a, b);
		self.pinch = PinchState {
			active: true,
			start_distance: distance(a, b),
			start_k: self.transform.k,
			anchor: self.to_simulation(mx, my),
		};
	}

	/// Zooms by the change in finger distance and keeps the anchor under the
	/// current midpoint, so two fingers can pan and zoom together.
	pub fn pinch_to(&mut self, a: (f64, f64), b: (f64, f64)) -> bool {
		if !self.pinch.active || self.pinch.start_distance <= f64::EPSILON {
			return false;
		}
		let k = self.clamp_zoom(self.pinch.start_k * distance(a, b) / self.pinch.start_distance);
		let (mx, my) = midpoint(a, b);
		let (ax, ay) = self.pinch.anchor;
		self.set_transform(ViewTransform::new(mx - ax * k, my - ay * k, k))
	}

	pub fn end_pinch(&mut self) {
		self.pinch.active = false;
	}
}

fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
	((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
	((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
	use approx::assert_abs_diff_eq;

	use super::*;

	fn controller() -> ViewportController {
		ViewportController::new(ViewportConfig::default())
	}

	#[test]
	fn maps_simulation_to_surface() {
		let t = ViewTransform::new(100.0, 50.0, 2.0);
		assert_eq!(t.to_screen(10.0, 10.0), (120.0, 70.0));
		assert_eq!(t.to_simulation(120.0, 70.0), (10.0, 10.0));
	}

	#[test]
	fn inverse_roundtrips_for_many_transforms() {
		for &(x, y, k) in &[(0.0, 0.0, 1.0), (-330.5, 12.25, 0.2), (1e4, -7.0, 4.75), (3.3, 3.3, 1.7)] {
			let t = ViewTransform::new(x, y, k);
			for &(px, py) in &[(0.0, 0.0), (123.4, -56.7), (-1e3, 999.0)] {
				let (gx, gy) = t.to_simulation(px, py);
				let (sx, sy) = t.to_screen(gx, gy);
				assert_abs_diff_eq!(sx, px, epsilon = 1e-9);
				assert_abs_diff_eq!(sy, py, epsilon = 1e-9);
			}
		}
	}

	#[test]
	fn zoom_is_clamped() {
		let mut vp = controller();
		for _ in 0..100 {
			vp.wheel(0.0, 0.0, -1.0);
		}
		assert_eq!(vp.transform().k, 5.0);
		assert!(!vp.zoom_at(0.0, 0.0, 2.0));
		for _ in 0..100 {
			vp.wheel(0.0, 0.0, 1.0);
		}
		assert_eq!(vp.transform().k, 0.2);

		vp.set_transform(ViewTransform::new(1.0, 2.0, 50.0));
		assert_eq!(vp.transform().k, 5.0);
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let mut vp = controller();
		vp.set_transform(ViewTransform::new(40.0, -20.0, 1.3));
		let before = vp.to_simulation(300.0, 200.0);
		assert!(vp.zoom_at(300.0, 200.0, 1.5));
		let after = vp.to_simulation(300.0, 200.0);
		assert_abs_diff_eq!(before.0, after.0, epsilon = 1e-9);
		assert_abs_diff_eq!(before.1, after.1, epsilon = 1e-9);
	}

	#[test]
	fn pan_follows_pointer() {
		let mut vp = controller();
		assert!(!vp.pan_to(10.0, 10.0));
		vp.begin_pan(100.0, 100.0);
		assert!(vp.pan_to(130.0, 80.0));
		assert_eq!((vp.transform().x, vp.transform().y), (30.0, -20.0));
		vp.end_pan();
		assert!(!vp.pan_to(500.0, 500.0));
		assert_eq!((vp.transform().x, vp.transform().y), (30.0, -20.0));
	}

	#[test]
	fn pinch_zooms_about_midpoint() {
		let mut vp = controller();
		vp.begin_pinch((90.0, 100.0), (110.0, 100.0));
		let anchor = vp.to_simulation(100.0, 100.0);
		assert!(vp.pinch_to((80.0, 100.0), (120.0, 100.0)));
		assert_abs_diff_eq!(vp.transform().k, 2.0);
		let (sx, sy) = vp.to_screen(anchor.0, anchor.1);
		assert_abs_diff_eq!(sx, 100.0, epsilon = 1e-9);
		assert_abs_diff_eq!(sy, 100.0, epsilon = 1e-9);

		vp.pinch_to((0.0, 100.0), (1000.0, 100.0));
		assert_eq!(vp.transform().k, 5.0);
		vp.end_pinch();
		assert!(!vp.pinch_to((0.0, 0.0), (1.0, 1.0)));
	}
}
