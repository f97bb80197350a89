//! Drawing surface abstraction used by the render pipeline.
//!
//! The pipeline only speaks in circles, lines, rects and text filled or
//! stroked with a [`Paint`]. The browser canvas implements [`Surface`] below;
//! tests implement it with a recorder.

use thiserror::Error;
use wasm_bindgen::JsValue;
use web_sys::{CanvasGradient, CanvasRenderingContext2d};

use super::theme::Color;
use super::viewport::ViewTransform;

/// A failed drawing call.
#[derive(Debug, Error)]
pub enum SurfaceError {
	#[error("gradient creation failed: {0}")]
	Gradient(String),
	#[error("canvas call failed: {0}")]
	Canvas(String),
}

impl SurfaceError {
	fn canvas(err: JsValue) -> Self {
		Self::Canvas(format!("{err:?}"))
	}

	fn gradient(err: JsValue) -> Self {
		Self::Gradient(format!("{err:?}"))
	}
}

/// Linear gradient between two points.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
	pub from: (f64, f64),
	pub to: (f64, f64),
	pub stops: Vec<(f64, Color)>,
}

/// Radial gradient between two circles.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
	pub inner: (f64, f64, f64),
	pub outer: (f64, f64, f64),
	pub stops: Vec<(f64, Color)>,
}

/// How a shape is filled or stroked.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
	Solid(Color),
	Linear(LinearGradient),
	Radial(RadialGradient),
}

/// Something the render pipeline can draw onto.
pub trait Surface {
	/// Pushes the current drawing state.
	fn save(&mut self);
	/// Pops the last saved drawing state.
	fn restore(&mut self);
	/// Applies translate then uniform scale.
	fn apply_transform(&mut self, transform: &ViewTransform) -> Result<(), SurfaceError>;
	fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: &Paint) -> Result<(), SurfaceError>;
	/// Fills a circle centred on `(x, y)`.
	fn fill_circle(&mut self, x: f64, y: f64, r: f64, paint: &Paint) -> Result<(), SurfaceError>;
	/// Strokes a circle outline of the given line width.
	fn stroke_circle(
		&mut self,
		x: f64,
		y: f64,
		r: f64,
		width: f64,
		paint: &Paint,
	) -> Result<(), SurfaceError>;
	/// Strokes a straight segment.
	fn stroke_line(
		&mut self,
		from: (f64, f64),
		to: (f64, f64),
		width: f64,
		paint: &Paint,
	) -> Result<(), SurfaceError>;
	/// Draws left-aligned text with its baseline at `y`.
	fn fill_text(
		&mut self,
		text: &str,
		x: f64,
		y: f64,
		font: &str,
		paint: &Paint,
	) -> Result<(), SurfaceError>;
}

fn build_gradient(
	ctx: &CanvasRenderingContext2d,
	paint: &Paint,
) -> Result<Option<CanvasGradient>, SurfaceError> {
	let (gradient, stops) = match paint {
		Paint::Solid(_) => return Ok(None),
		Paint::Linear(g) => (
			ctx.create_linear_gradient(g.from.0, g.from.1, g.to.0, g.to.1),
			&g.stops,
		),
		Paint::Radial(g) => (
			ctx.create_radial_gradient(
				g.inner.0, g.inner.1, g.inner.2, g.outer.0, g.outer.1, g.outer.2,
			)
			.map_err(SurfaceError::gradient)?,
			&g.stops,
		),
	};
	for (offset, color) in stops {
		gradient
			.add_color_stop(offset.clamp(0.0, 1.0) as f32, &color.to_css())
			.map_err(SurfaceError::gradient)?;
	}
	Ok(Some(gradient))
}

fn set_fill(ctx: &CanvasRenderingContext2d, paint: &Paint) -> Result<(), SurfaceError> {
	match (paint, build_gradient(ctx, paint)?) {
		(Paint::Solid(color), _) => ctx.set_fill_style_str(&color.to_css()),
		(_, Some(gradient)) => {
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		_ => {}
	}
	Ok(())
}

fn set_stroke(ctx: &CanvasRenderingContext2d, paint: &Paint) -> Result<(), SurfaceError> {
	match (paint, build_gradient(ctx, paint)?) {
		(Paint::Solid(color), _) => ctx.set_stroke_style_str(&color.to_css()),
		(_, Some(gradient)) => {
			#[allow(deprecated)]
			ctx.set_stroke_style(&gradient);
		}
		_ => {}
	}
	Ok(())
}

impl Surface for CanvasRenderingContext2d {
	fn save(&mut self) {
		CanvasRenderingContext2d::save(self);
	}

	fn restore(&mut self) {
		CanvasRenderingContext2d::restore(self);
	}

	fn apply_transform(&mut self, transform: &ViewTransform) -> Result<(), SurfaceError> {
		self.translate(transform.x, transform.y)
			.map_err(SurfaceError::canvas)?;
		self.scale(transform.k, transform.k)
			.map_err(SurfaceError::canvas)
	}

	fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: &Paint) -> Result<(), SurfaceError> {
		set_fill(self, paint)?;
		CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
		Ok(())
	}

	fn fill_circle(&mut self, x: f64, y: f64, r: f64, paint: &Paint) -> Result<(), SurfaceError> {
		set_fill(self, paint)?;
		self.begin_path();
		self.arc(x, y, r, 0.0, std::f64::consts::TAU)
			.map_err(SurfaceError::canvas)?;
		self.fill();
		Ok(())
	}

	fn stroke_circle(
		&mut self,
		x: f64,
		y: f64,
		r: f64,
		width: f64,
		paint: &Paint,
	) -> Result<(), SurfaceError> {
		set_stroke(self, paint)?;
		self.set_line_width(width);
		self.begin_path();
		self.arc(x, y, r, 0.0, std::f64::consts::TAU)
			.map_err(SurfaceError::canvas)?;
		self.stroke();
		Ok(())
	}

	fn stroke_line(
		&mut self,
		from: (f64, f64),
		to: (f64, f64),
		width: f64,
		paint: &Paint,
	) -> Result<(), SurfaceError> {
		set_stroke(self, paint)?;
		self.set_line_width(width);
		self.begin_path();
		self.move_to(from.0, from.1);
		self.line_to(to.0, to.1);
		self.stroke();
		Ok(())
	}

	fn fill_text(
		&mut self,
		text: &str,
		x: f64,
		y: f64,
		font: &str,
		paint: &Paint,
	) -> Result<(), SurfaceError> {
		set_fill(self, paint)?;
		self.set_font(font);
		CanvasRenderingContext2d::fill_text(self, text, x, y).map_err(SurfaceError::canvas)
	}
}
