// What you SEE:
// • A white canvas. Hold Left Mouse to draw black strokes.
// • Enter (or S) computes the skeleton; it appears as sky-blue edges with
//   red node circles on top of your drawing.
// • [ / ] pen width, - / = simplify tolerance, T thick lines on/off.
// • C clears, I inverts. Any edit removes the skeleton. ESC quits.

use clap::Parser;
use log::{error, info, warn};
use minifb::Key;

use skeleton_sketch::canvas::{Pointer, RasterCanvas};
use skeleton_sketch::config::Cli;
use skeleton_sketch::draw::{Drawer, draw_text_5x7, fill_rows};
use skeleton_sketch::error::Error;
use skeleton_sketch::extract::{
    Applied, ExtractionOutcome, ExtractionWorker, ThinningExtractor, TimedExtractor, apply_outcome,
};
use skeleton_sketch::overlay::{self, OverlayConfig};
use skeleton_sketch::types::{FrameBuffer, HUD_COLOR, Mask};

const HUD_HEIGHT: usize = 12;
const HUD_BACKGROUND: u32 = 0x00_E0_E0_E0;

/// Where "compute" requests go.
enum Extraction {
    Sync(TimedExtractor<ThinningExtractor>),
    Worker(ExtractionWorker),
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let cli = Cli::parse();

    /* --- Canvas + settings ---
       Visual: a blank white sheet; nothing drawn yet. */
    let mut canvas = RasterCanvas::new(cli.width, cli.height);
    canvas.set_pen_width(cli.pen_width);
    let mut overlay_cfg = cli.overlay();

    let mut extraction = if cli.sync_extract {
        Extraction::Sync(TimedExtractor::new(ThinningExtractor))
    } else {
        Extraction::Worker(ExtractionWorker::spawn(ThinningExtractor)?)
    };

    /* --- Window + screen buffer ---
       Visual: canvas on top, a thin status strip underneath. */
    let (w, h) = (cli.width as usize, cli.height as usize);
    let mut drawer = Drawer::new("Skeleton Sketch", w, h + HUD_HEIGHT)?;
    let mut screen = FrameBuffer::new(w, h + HUD_HEIGHT);

    info!(
        "canvas {}x{}, pen {}, simplify {}, thick lines {}",
        w,
        h,
        canvas.pen_width(),
        overlay_cfg.simplify_tolerance(),
        overlay_cfg.thick_lines
    );

    let mut status = String::new();
    let mut last_hud = String::new();
    let mut pointer = Pointer::new();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Pointer: down → begin, drag → extend, up → end. The HUD strip
              below the canvas is ignored. */
        pointer.update(&mut canvas, drawer.left_mouse_down(), drawer.mouse_pos());

        /* 2) Keys */
        if drawer.pressed_once(Key::C) {
            canvas.clear();
        }
        if drawer.pressed_once(Key::I) {
            canvas.invert();
        }
        if drawer.pressed_repeat(Key::LeftBracket) {
            canvas.set_pen_width(canvas.pen_width() as i64 - 1);
        }
        if drawer.pressed_repeat(Key::RightBracket) {
            canvas.set_pen_width(canvas.pen_width() as i64 + 1);
        }
        if drawer.pressed_repeat(Key::Minus) {
            step_tolerance(&mut overlay_cfg, &mut canvas, -1.0);
        }
        if drawer.pressed_repeat(Key::Equal) {
            step_tolerance(&mut overlay_cfg, &mut canvas, 1.0);
        }
        if drawer.pressed_once(Key::T) {
            overlay_cfg.thick_lines = !overlay_cfg.thick_lines;
            canvas.invalidate();
        }

        /* 3) Compute: snapshot → mask → extractor (inline or on the worker). */
        if drawer.pressed_once(Key::Enter) || drawer.pressed_once(Key::S) {
            let mask = Mask::from_grayscale(&canvas.export_grayscale());
            let revision = canvas.revision();
            match &mut extraction {
                Extraction::Sync(timed) => {
                    let outcome = timed.run(revision, &mask);
                    status = handle_outcome(&mut canvas, outcome);
                }
                Extraction::Worker(worker) => match worker.submit(revision, mask) {
                    Ok(()) => status.clear(),
                    Err(e) => {
                        error!("{e}");
                        status = e.to_string();
                    }
                },
            }
        }

        /* 4) Late results from the worker. */
        if let Extraction::Worker(worker) = &mut extraction {
            match worker.poll() {
                Ok(Some(outcome)) => status = handle_outcome(&mut canvas, outcome),
                Ok(None) => {}
                Err(e) => {
                    error!("{e}");
                    status = e.to_string();
                }
            }
        }

        /* 5) Redraw only when something changed. */
        let busy = matches!(&extraction, Extraction::Worker(w) if w.is_busy());
        let hud = format!(
            "PEN {} | SIMPLIFY {} | {} | {}",
            canvas.pen_width(),
            overlay_cfg.simplify_tolerance(),
            if overlay_cfg.thick_lines { "THICK" } else { "THIN" },
            if busy { "computing..." } else { status.as_str() }
        );
        if canvas.take_dirty() || hud != last_hud {
            overlay::render(&mut screen, canvas.raster(), canvas.graph(), overlay_cfg);
            fill_rows(&mut screen, h, h + HUD_HEIGHT, HUD_BACKGROUND);
            draw_text_5x7(&mut screen, 4, h as i32 + 3, &hud, HUD_COLOR);
            drawer.present(&screen)?;
            last_hud = hud;
        } else {
            drawer.idle();
        }
    }

    Ok(())
}

fn step_tolerance(cfg: &mut OverlayConfig, canvas: &mut RasterCanvas, delta: f32) {
    cfg.set_simplify_tolerance(cfg.simplify_tolerance() + delta);
    canvas.invalidate();
}

/// Offer a finished extraction to the canvas and return the status line.
fn handle_outcome(canvas: &mut RasterCanvas, outcome: ExtractionOutcome) -> String {
    let ms = outcome.elapsed.as_millis();
    let warm_up = outcome.warm_up;
    match apply_outcome(canvas, outcome) {
        // The first run includes one-time setup; its timing is misleading.
        Applied::Attached if warm_up => String::new(),
        Applied::Attached => format!("computation took {ms} ms."),
        Applied::Stale => {
            warn!("skeleton finished after the drawing changed; discarded");
            "drawing changed - recompute".into()
        }
        Applied::Failed(e) => {
            error!("{e}");
            e.to_string()
        }
    }
}
