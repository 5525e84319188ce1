//! Drawing surface port

use crate::domain::visualizer::Rgb;

/// A 2D surface the visualizer paints on
pub trait Canvas: Send {
    fn width(&self) -> f32;

    fn height(&self) -> f32;

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb);

    fn stroke_polyline(&mut self, points: &[(f32, f32)], line_width: f32, color: Rgb);

    /// Fill the whole surface with the background colour
    fn clear(&mut self);
}
