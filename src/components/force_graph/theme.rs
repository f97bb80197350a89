//! Visual theming for the concept graph.
//!
//! Node colors come from topology rather than a fixed palette: depth rotates
//! the hue from warm (roots) toward cool, and each island shifts the whole
//! ramp by an offset from a rotation table.

use super::config::PaletteConfig;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub const WHITE: Color = Color::rgb(255, 255, 255);
	pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

	/// Builds an opaque color from hue (degrees), saturation and lightness
	/// (both 0..=1).
	pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
		let h = h.rem_euclid(360.0) / 60.0;
		let (s, l) = (s.clamp(0.0, 1.0), l.clamp(0.0, 1.0));
		let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
		let x = c * (1.0 - (h % 2.0 - 1.0).abs());
		let (r, g, b) = match h as u32 {
			0 => (c, x, 0.0),
			1 => (x, c, 0.0),
			2 => (0.0, c, x),
			3 => (0.0, x, c),
			4 => (x, 0.0, c),
			_ => (c, 0.0, x),
		};
		let m = l - c / 2.0;
		let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
		Self::rgb(to_u8(r), to_u8(g), to_u8(b))
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Maps `(depth, island)` to node colors.
#[derive(Clone, Debug)]
pub struct DepthPalette {
	config: PaletteConfig,
	/// Used for nodes no root can reach.
	pub unassigned: Color,
}

impl DepthPalette {
	pub fn new(config: PaletteConfig) -> Self {
		Self {
			config,
			unassigned: Color::rgb(120, 128, 140),
		}
	}

	/// Hue (degrees) for a depth within island 0.
	fn depth_hue(&self, depth: usize) -> f64 {
		let c = &self.config;
		if c.max_depth == 0 {
			return c.hue_start;
		}
		let t = depth.min(c.max_depth) as f64 / c.max_depth as f64;
		c.hue_start + (c.hue_end - c.hue_start) * t
	}

	fn island_offset(&self, island: usize) -> f64 {
		let offsets = &self.config.island_hue_offsets;
		if offsets.is_empty() {
			0.0
		} else {
			offsets[island % offsets.len()]
		}
	}

	pub fn color(&self, depth: Option<usize>, island: Option<usize>) -> Color {
		let Some(depth) = depth else {
			return self.unassigned;
		};
		let c = &self.config;
		let hue = self.depth_hue(depth) + self.island_offset(island.unwrap_or(0));
		let saturation = if depth > c.max_depth {
			c.saturation - c.overflow_desaturation
		} else {
			c.saturation
		};
		Color::from_hsl(hue, saturation, c.lightness)
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
}

/// Label text style.
#[derive(Clone, Debug)]
pub struct LabelStyle {
	pub color: Color,
	pub font_family: &'static str,
	/// Gap between the node disc and the label, in simulation units.
	pub offset: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub label: LabelStyle,
	/// Color of the pulse rings around an expanding node.
	pub pulse_color: Color,
}

impl Theme {
	/// Dark theme with a soft radial backdrop (default)
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(13, 17, 23),
				color_secondary: Color::rgb(24, 30, 40),
				use_gradient: true,
				vignette: 0.2,
			},
			label: LabelStyle {
				color: Color::rgba(230, 237, 243, 0.9),
				font_family: "sans-serif",
				offset: 6.0,
			},
			pulse_color: Color::rgb(255, 255, 255),
		}
	}

	/// Flat background, no vignette
	pub fn minimal() -> Self {
		Self {
			name: "minimal",
			background: BackgroundStyle {
				color: Color::rgb(25, 28, 35),
				color_secondary: Color::rgb(25, 28, 35),
				use_gradient: false,
				vignette: 0.0,
			},
			..Self::default_theme()
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
