//! Skeleton extraction: the collaborator seam, a built-in thinning
//! extractor, and a worker thread so the window keeps drawing while a
//! skeleton is computed.
//!
//! Requests carry the canvas revision they were taken at. A result is only
//! attached if the canvas is still at that revision; anything older is
//! dropped.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::canvas::RasterCanvas;
use crate::error::Error;
use crate::graph::{Edge, Node, SkeletonGraph};
use crate::types::{Mask, Point};

/// Reduces a foreground mask to a centerline graph with thickness values.
pub trait SkeletonExtractor: Send {
    fn extract(&mut self, mask: &Mask) -> Result<SkeletonGraph, Error>;
}

impl<F> SkeletonExtractor for F
where
    F: FnMut(&Mask) -> Result<SkeletonGraph, Error> + Send,
{
    fn extract(&mut self, mask: &Mask) -> Result<SkeletonGraph, Error> {
        self(mask)
    }
}

/// One finished extraction.
#[derive(Debug)]
pub struct ExtractionOutcome {
    pub revision: u64,
    pub elapsed: Duration,
    /// First run of this extractor; its timing includes one-time setup
    /// and isn't worth reporting.
    pub warm_up: bool,
    pub result: Result<SkeletonGraph, Error>,
}

/// Wraps an extractor with timing and first-run bookkeeping.
pub struct TimedExtractor<E> {
    inner: E,
    runs: u64,
}

impl<E: SkeletonExtractor> TimedExtractor<E> {
    pub fn new(inner: E) -> Self {
        Self { inner, runs: 0 }
    }

    pub fn run(&mut self, revision: u64, mask: &Mask) -> ExtractionOutcome {
        let t0 = Instant::now();
        let result = self.inner.extract(mask);
        let elapsed = t0.elapsed();
        let warm_up = self.runs == 0;
        self.runs += 1;

        match &result {
            Ok(g) if warm_up => debug!(
                "warm-up extraction: {} nodes, {} edges in {:?} (not reported)",
                g.nodes().len(),
                g.edges().len(),
                elapsed
            ),
            Ok(g) => info!(
                "extraction: {} nodes, {} edges in {} ms",
                g.nodes().len(),
                g.edges().len(),
                elapsed.as_millis()
            ),
            Err(e) => warn!("extraction failed after {:?}: {e}", elapsed),
        }

        ExtractionOutcome { revision, elapsed, warm_up, result }
    }
}

struct Request {
    revision: u64,
    mask: Mask,
}

/// An outcome plus the number of queued requests it superseded.
struct Finished {
    outcome: ExtractionOutcome,
    collapsed: usize,
}

/// Runs an extractor on its own thread.
pub struct ExtractionWorker {
    tx: Option<Sender<Request>>,
    rx: Receiver<Finished>,
    handle: Option<JoinHandle<()>>,
    /// Submitted requests not yet answered or superseded.
    pending: usize,
}

impl ExtractionWorker {
    pub fn spawn<E: SkeletonExtractor + 'static>(extractor: E) -> Result<Self, Error> {
        let (req_tx, req_rx) = mpsc::channel::<Request>();
        let (out_tx, out_rx) = mpsc::channel::<Finished>();

        let handle = thread::Builder::new()
            .name("skeleton-extract".into())
            .spawn(move || {
                let mut timed = TimedExtractor::new(extractor);
                while let Ok(mut req) = req_rx.recv() {
                    // Only the newest queued request matters.
                    let mut collapsed = 0;
                    while let Ok(newer) = req_rx.try_recv() {
                        debug!("skipping queued request for rev {}", req.revision);
                        req = newer;
                        collapsed += 1;
                    }
                    let outcome = timed.run(req.revision, &req.mask);
                    if out_tx.send(Finished { outcome, collapsed }).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| Error::Extraction(format!("spawn worker: {e}")))?;

        Ok(Self { tx: Some(req_tx), rx: out_rx, handle: Some(handle), pending: 0 })
    }

    /// Queue a mask taken at canvas `revision`.
    pub fn submit(&mut self, revision: u64, mask: Mask) -> Result<(), Error> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| Error::Extraction("worker shut down".into()))?;
        tx.send(Request { revision, mask })
            .map_err(|_| Error::Extraction("worker stopped".into()))?;
        self.pending += 1;
        Ok(())
    }

    /// Non-blocking; `Ok(None)` while nothing has finished.
    pub fn poll(&mut self) -> Result<Option<ExtractionOutcome>, Error> {
        match self.rx.try_recv() {
            Ok(Finished { outcome, collapsed }) => {
                self.pending = self.pending.saturating_sub(1 + collapsed);
                Ok(Some(outcome))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.pending = 0;
                Err(Error::Extraction("worker stopped".into()))
            }
        }
    }

    /// True while a submitted mask has neither been answered nor
    /// superseded by a newer one.
    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }
}

impl Drop for ExtractionWorker {
    fn drop(&mut self) {
        self.tx = None; // closes the request channel, ending the thread loop
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// What happened when an outcome was offered to the canvas.
#[derive(Debug, PartialEq)]
pub enum Applied {
    Attached,
    /// The raster changed after the request; result dropped.
    Stale,
    /// Extractor error; raster and any previous graph left as they were.
    Failed(Error),
}

pub fn apply_outcome(canvas: &mut RasterCanvas, outcome: ExtractionOutcome) -> Applied {
    match outcome.result {
        Err(e) => Applied::Failed(e),
        Ok(graph) => {
            if canvas.attach_graph_if_current(outcome.revision, graph) {
                Applied::Attached
            } else {
                Applied::Stale
            }
        }
    }
}

/* ---------------------------- built-in extractor ---------------------------- */

/// Zhang–Suen thinning plus a chamfer distance transform. Skeleton pixels
/// whose degree isn't 2 become nodes; chains between them become edges.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThinningExtractor;

impl SkeletonExtractor for ThinningExtractor {
    fn extract(&mut self, mask: &Mask) -> Result<SkeletonGraph, Error> {
        if mask.fg.len() != mask.width * mask.height {
            return Err(Error::Extraction(format!(
                "mask has {} samples for {}x{}",
                mask.fg.len(),
                mask.width,
                mask.height
            )));
        }
        let dist = chamfer_distance(mask);
        let skel = zhang_suen(mask);
        trace_graph(&skel, &dist)
    }
}

// Neighbour order: N, NE, E, SE, S, SW, W, NW.
const DX: [i32; 8] = [0, 1, 1, 1, 0, -1, -1, -1];
const DY: [i32; 8] = [-1, -1, 0, 1, 1, 1, 0, -1];

/// Distance (in pixels, chamfer 3-4) from each foreground pixel to the
/// nearest background pixel. Outside the image counts as background.
fn chamfer_distance(mask: &Mask) -> Vec<f32> {
    let (w, h) = (mask.width, mask.height);
    let far = u32::MAX / 2;
    let mut d: Vec<u32> = mask.fg.iter().map(|&f| if f { far } else { 0 }).collect();
    let at = |d: &[u32], x: i32, y: i32| -> u32 {
        if x < 0 || y < 0 || x as usize >= w || y as usize >= h {
            0
        } else {
            d[y as usize * w + x as usize]
        }
    };

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let i = y as usize * w + x as usize;
            if d[i] == 0 {
                continue;
            }
            let best = (at(&d, x - 1, y) + 3)
                .min(at(&d, x, y - 1) + 3)
                .min(at(&d, x - 1, y - 1) + 4)
                .min(at(&d, x + 1, y - 1) + 4);
            d[i] = d[i].min(best);
        }
    }
    for y in (0..h as i32).rev() {
        for x in (0..w as i32).rev() {
            let i = y as usize * w + x as usize;
            if d[i] == 0 {
                continue;
            }
            let best = (at(&d, x + 1, y) + 3)
                .min(at(&d, x, y + 1) + 3)
                .min(at(&d, x + 1, y + 1) + 4)
                .min(at(&d, x - 1, y + 1) + 4);
            d[i] = d[i].min(best);
        }
    }

    d.into_iter().map(|v| v as f32 / 3.0).collect()
}

struct Grid {
    w: usize,
    h: usize,
    on: Vec<bool>,
}

impl Grid {
    #[inline]
    fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return false;
        }
        self.on[y as usize * self.w + x as usize]
    }

    #[inline]
    fn idx(&self, p: Point) -> usize {
        p.y as usize * self.w + p.x as usize
    }

    /// 8-neighbours, except that a diagonal counts only when neither of the
    /// two pixels it cuts past is set. Keeps staircases from forming
    /// triangles of junctions.
    fn neighbours(&self, p: Point) -> Vec<Point> {
        let mut out = Vec::with_capacity(4);
        for k in 0..8 {
            let (nx, ny) = (p.x + DX[k], p.y + DY[k]);
            if !self.get(nx, ny) {
                continue;
            }
            let diagonal = DX[k] != 0 && DY[k] != 0;
            if diagonal && (self.get(p.x + DX[k], p.y) || self.get(p.x, p.y + DY[k])) {
                continue;
            }
            out.push(Point::new(nx, ny));
        }
        out
    }
}

fn zhang_suen(mask: &Mask) -> Grid {
    let mut g = Grid { w: mask.width, h: mask.height, on: mask.fg.clone() };
    let mut to_clear = Vec::new();

    loop {
        let mut changed = false;
        for step in 0..2 {
            to_clear.clear();
            for y in 0..g.h as i32 {
                for x in 0..g.w as i32 {
                    if !g.get(x, y) {
                        continue;
                    }
                    let p: [bool; 8] = std::array::from_fn(|k| g.get(x + DX[k], y + DY[k]));
                    let b = p.iter().filter(|&&v| v).count();
                    if !(2..=6).contains(&b) {
                        continue;
                    }
                    let a = (0..8).filter(|&k| !p[k] && p[(k + 1) % 8]).count();
                    if a != 1 {
                        continue;
                    }
                    // p[0]=N p[2]=E p[4]=S p[6]=W
                    let remove = if step == 0 {
                        !(p[0] && p[2] && p[4]) && !(p[2] && p[4] && p[6])
                    } else {
                        !(p[0] && p[2] && p[6]) && !(p[0] && p[4] && p[6])
                    };
                    if remove {
                        to_clear.push(y as usize * g.w + x as usize);
                    }
                }
            }
            changed |= !to_clear.is_empty();
            for &i in &to_clear {
                g.on[i] = false;
            }
        }
        if !changed {
            break;
        }
    }
    g
}

fn trace_graph(skel: &Grid, dist: &[f32]) -> Result<SkeletonGraph, Error> {
    let mut t = Tracer {
        skel,
        is_node: vec![false; skel.on.len()],
        visited: vec![false; skel.on.len()],
        used: HashSet::new(),
        order: Vec::new(),
        edges: Vec::new(),
    };

    for y in 0..skel.h as i32 {
        for x in 0..skel.w as i32 {
            let p = Point::new(x, y);
            if skel.get(x, y) && skel.neighbours(p).len() != 2 {
                t.add_node(p);
            }
        }
    }

    // `order` can grow while tracing (unexpected dead ends).
    let mut i = 0;
    while i < t.order.len() {
        t.trace_from(t.order[i], dist);
        i += 1;
    }

    // Closed loops without any junction: anchor each at its first pixel.
    for y in 0..skel.h as i32 {
        for x in 0..skel.w as i32 {
            let p = Point::new(x, y);
            let pi = skel.idx(p);
            if skel.get(x, y) && !t.is_node[pi] && !t.visited[pi] {
                t.add_node(p);
                t.trace_from(p, dist);
            }
        }
    }

    let nodes = t
        .order
        .iter()
        .map(|&p| Node { pos: p, time: dist[skel.idx(p)] })
        .collect();
    SkeletonGraph::new(nodes, t.edges)
}

struct Tracer<'a> {
    skel: &'a Grid,
    is_node: Vec<bool>,
    visited: Vec<bool>,
    used: HashSet<(usize, usize)>, // pixel links already walked, both directions
    order: Vec<Point>,
    edges: Vec<Edge>,
}

impl Tracer<'_> {
    fn add_node(&mut self, p: Point) {
        self.is_node[self.skel.idx(p)] = true;
        self.order.push(p);
    }

    fn link(&mut self, a: Point, b: Point) {
        let (ai, bi) = (self.skel.idx(a), self.skel.idx(b));
        self.used.insert((ai, bi));
        self.used.insert((bi, ai));
    }

    fn is_used(&self, a: Point, b: Point) -> bool {
        self.used.contains(&(self.skel.idx(a), self.skel.idx(b)))
    }

    /// Walk every unused link out of `start` until another node is hit.
    fn trace_from(&mut self, start: Point, dist: &[f32]) {
        let skel = self.skel;
        for first in skel.neighbours(start) {
            if self.is_used(start, first) {
                continue;
            }
            self.link(start, first);

            let mut path = vec![start, first];
            let (mut prev, mut cur) = (start, first);
            while !self.is_node[skel.idx(cur)] {
                self.visited[skel.idx(cur)] = true;
                let next = skel
                    .neighbours(cur)
                    .into_iter()
                    .find(|&n| n != prev && !self.is_used(cur, n));
                let Some(next) = next else {
                    // Dead end the degree count didn't predict; close it off.
                    self.add_node(cur);
                    break;
                };
                self.link(cur, next);
                path.push(next);
                prev = cur;
                cur = next;
            }

            let time = path.iter().map(|&p| dist[skel.idx(p)]).collect();
            self.edges.push(Edge { a: start, b: cur, path, time });
        }
    }
}
