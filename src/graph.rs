//! Typed skeleton graph, validated once where the extractor hands it over.
//!
//! After `SkeletonGraph::new` succeeds every edge endpoint is a known node
//! and every node carries a usable `time`, so rendering never has to look
//! anything up by coordinate.

use std::collections::HashSet;

use crate::error::Error;
use crate::types::Point;

/// A skeleton node. `time` is the distance-transform thickness at `pos`
/// and doubles as the marker radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub pos: Point,
    pub time: f32,
}

/// A skeleton edge between nodes `a` and `b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub a: Point,
    pub b: Point,
    /// Ordered centerline, at least two vertices.
    pub path: Vec<Point>,
    /// Thickness values, consumed positionally per drawn segment.
    pub time: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkeletonGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl SkeletonGraph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, Error> {
        let mut seen = HashSet::with_capacity(nodes.len());
        for n in &nodes {
            if !seen.insert(n.pos) {
                return Err(Error::DuplicateNode { x: n.pos.x, y: n.pos.y });
            }
            if !n.time.is_finite() || n.time < 0.0 {
                return Err(Error::InvalidNodeTime { x: n.pos.x, y: n.pos.y });
            }
        }

        for e in &edges {
            if e.path.len() < 2 {
                return Err(Error::DegeneratePath { len: e.path.len() });
            }
            for p in [e.a, e.b] {
                if !seen.contains(&p) {
                    return Err(Error::MissingNodeTime { x: p.x, y: p.y });
                }
            }
        }

        Ok(Self { nodes, edges })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
