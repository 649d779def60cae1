// Command-line configuration.
use clap::Parser;

use crate::canvas::DEFAULT_PEN_WIDTH;
use crate::overlay::OverlayConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "skeleton-sketch")]
#[command(about = "Sketch a binary image and overlay its skeleton graph", long_about = None)]
pub struct Cli {
    /// Canvas width in pixels
    #[arg(long, default_value_t = 512)]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 512)]
    pub height: u32,

    /// Initial pen width (clamped to 1..=30)
    #[arg(long, default_value_t = DEFAULT_PEN_WIDTH as i64, allow_negative_numbers = true)]
    pub pen_width: i64,

    /// Initial edge simplification tolerance in pixels (clamped to 0..=30)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub simplify: f32,

    /// Draw edges at a fixed width instead of their thickness
    #[arg(long = "thin-lines", default_value = "false")]
    pub thin_lines: bool,

    /// Run skeleton extraction on the UI thread (blocks while computing)
    #[arg(long = "sync-extract", default_value = "false")]
    pub sync_extract: bool,
}

impl Cli {
    pub fn overlay(&self) -> OverlayConfig {
        OverlayConfig::new(self.simplify, !self.thin_lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{MAX_PEN_WIDTH, RasterCanvas};

    fn canvas_pen(cli: &Cli) -> u32 {
        let mut canvas = RasterCanvas::new(1, 1);
        canvas.set_pen_width(cli.pen_width);
        canvas.pen_width()
    }

    #[test]
    fn defaults_match_the_canvas() {
        let cli = Cli::parse_from(["skeleton-sketch"]);
        assert_eq!((cli.width, cli.height), (512, 512));
        assert_eq!(canvas_pen(&cli), DEFAULT_PEN_WIDTH);
        assert_eq!(cli.overlay(), OverlayConfig::default());
        assert!(!cli.sync_extract);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cli = Cli::parse_from([
            "skeleton-sketch",
            "--pen-width",
            "99",
            "--simplify",
            "-2",
            "--thin-lines",
        ]);
        assert_eq!(canvas_pen(&cli), MAX_PEN_WIDTH);
        assert_eq!(cli.overlay().simplify_tolerance(), 0.0);
        assert!(!cli.overlay().thick_lines);
    }
}
