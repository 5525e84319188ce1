//! One-line terminal canvas drawn with block glyphs

use colored::Colorize;

use crate::application::ports::Canvas;
use crate::domain::visualizer::Rgb;

/// Glyphs from lowest to full level
const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Virtual pixel height of the line
const HEIGHT: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    level: f32,
    color: Rgb,
}

/// A canvas one character high and `columns` characters wide.
///
/// Each column keeps the tallest thing drawn into it since the last clear.
#[derive(Debug, Clone)]
pub struct TextCanvas {
    cells: Vec<Option<Cell>>,
}

impl TextCanvas {
    pub fn new(columns: usize) -> Self {
        Self {
            cells: vec![None; columns.max(1)],
        }
    }

    pub fn columns(&self) -> usize {
        self.cells.len()
    }

    fn ink(&mut self, column: usize, level: f32, color: Rgb) {
        let Some(slot) = self.cells.get_mut(column) else {
            return;
        };
        let level = level.clamp(0.0, 1.0);
        match slot {
            Some(cell) if cell.level >= level => {}
            _ => *slot = Some(Cell { level, color }),
        }
    }

    fn glyph(level: f32) -> char {
        let index = (level * LEVELS.len() as f32).ceil() as usize;
        LEVELS[index.clamp(1, LEVELS.len()) - 1]
    }

    /// Plain glyphs without colour
    pub fn render_plain(&self) -> String {
        self.cells
            .iter()
            .map(|cell| cell.map_or(' ', |c| Self::glyph(c.level)))
            .collect()
    }

    /// Glyphs coloured with each column's ink
    pub fn render(&self) -> String {
        self.cells
            .iter()
            .map(|cell| match cell {
                Some(c) => {
                    let Rgb(r, g, b) = c.color;
                    Self::glyph(c.level).to_string().truecolor(r, g, b).to_string()
                }
                None => " ".to_string(),
            })
            .collect()
    }
}

impl Canvas for TextCanvas {
    fn width(&self) -> f32 {
        self.cells.len() as f32
    }

    fn height(&self) -> f32 {
        HEIGHT
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        // bars grow up from the bottom edge
        let level = (HEIGHT - y.max(0.0)) / HEIGHT;
        let first = x.max(0.0).floor() as usize;
        let last = (x + width).ceil().max(0.0) as usize;
        for column in first..last {
            self.ink(column, level, color);
        }
    }

    fn stroke_polyline(&mut self, points: &[(f32, f32)], _line_width: f32, color: Rgb) {
        let middle = HEIGHT / 2.0;
        for &(x, y) in points {
            if x < 0.0 {
                continue;
            }
            let level = (y - middle).abs() / middle;
            // silence still shows as the baseline glyph
            self.ink(x.floor() as usize, level.max(0.01), color);
        }
    }

    fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render_frame;
    use crate::domain::visualizer::VisualizerMode;

    #[test]
    fn blank_after_clear() {
        let mut canvas = TextCanvas::new(4);
        canvas.fill_rect(0.0, 0.0, 4.0, 16.0, Rgb(1, 2, 3));
        assert_eq!(canvas.render_plain(), "████");
        canvas.clear();
        assert_eq!(canvas.render_plain(), "    ");
    }

    #[test]
    fn bars_map_to_levels() {
        let mut canvas = TextCanvas::new(3);
        canvas.fill_rect(0.0, 8.0, 1.0, 8.0, Rgb(0, 0, 0));
        canvas.fill_rect(2.0, 14.0, 1.0, 2.0, Rgb(0, 0, 0));
        assert_eq!(canvas.render_plain(), "▄ ▁");
    }

    #[test]
    fn flat_waveform_draws_baseline() {
        let mut canvas = TextCanvas::new(2);
        canvas.stroke_polyline(&[(0.0, 8.0), (1.5, 8.0), (2.0, 8.0)], 2.0, Rgb(0, 0, 0));
        assert_eq!(canvas.render_plain(), "▁▁");
    }

    #[test]
    fn out_of_range_drawing_is_ignored() {
        let mut canvas = TextCanvas::new(2);
        canvas.fill_rect(10.0, 0.0, 3.0, 16.0, Rgb(0, 0, 0));
        canvas.stroke_polyline(&[(-1.0, 0.0), (9.0, 0.0)], 2.0, Rgb(0, 0, 0));
        assert_eq!(canvas.render_plain(), "  ");
    }

    struct Loud;

    impl crate::application::ports::AnalysisTap for Loud {
        fn fft_size(&self) -> usize {
            2048
        }

        fn time_domain_bytes(&self, out: &mut [u8]) {
            for (i, b) in out.iter_mut().enumerate() {
                *b = if i % 2 == 0 { 255 } else { 0 };
            }
        }

        fn frequency_bytes(&self, out: &mut [u8]) {
            out.fill(255);
        }
    }

    #[test]
    fn renders_frames_from_the_visualizer() {
        let mut canvas = TextCanvas::new(8);
        render_frame(&mut canvas, Some(&Loud), VisualizerMode::Waveform);
        assert_eq!(canvas.render_plain(), "████████");

        render_frame(&mut canvas, Some(&Loud), VisualizerMode::Spectrum);
        assert!(canvas.render_plain().starts_with('▇'));
    }
}
