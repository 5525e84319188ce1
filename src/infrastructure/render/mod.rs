//! Terminal rendering adapters

mod text_canvas;

pub use text_canvas::TextCanvas;
