//! Freehand sketching on a monochrome raster with a skeleton-graph overlay.
//!
//! `canvas` owns the pixels, `extract` turns them into a graph, `overlay`
//! draws both into a `FrameBuffer` that the window in `draw` shows.

pub mod canvas;
pub mod config;
pub mod draw;
pub mod error;
pub mod extract;
pub mod graph;
pub mod overlay;
pub mod simplify;
pub mod types;
