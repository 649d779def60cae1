// One error type for the whole crate.
// Every variant states *where* things went wrong.
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    WindowInit(String),   // Creating the window failed
    WindowUpdate(String), // Pushing the frame to the window failed
    /// An edge endpoint has no node (and therefore no `time`) in the graph.
    MissingNodeTime { x: i32, y: i32 },
    /// The same node coordinate was reported twice by the extractor.
    DuplicateNode { x: i32, y: i32 },
    /// A node `time` that is negative or not finite.
    InvalidNodeTime { x: i32, y: i32 },
    /// An edge path with fewer than two vertices.
    DegeneratePath { len: usize },
    Extraction(String), // The skeleton extractor failed or went away
}

impl Display for Error {
    // This decides how the error is printed to your console.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WindowInit(s) => write!(f, "Window init error: {s}"),
            Error::WindowUpdate(s) => write!(f, "Window update error: {s}"),
            Error::MissingNodeTime { x, y } => {
                write!(f, "Graph error: edge endpoint ({x}, {y}) has no node time")
            }
            Error::DuplicateNode { x, y } => write!(f, "Graph error: duplicate node ({x}, {y})"),
            Error::InvalidNodeTime { x, y } => {
                write!(f, "Graph error: node ({x}, {y}) has a negative or non-finite time")
            }
            Error::DegeneratePath { len } => {
                write!(f, "Graph error: edge path needs at least 2 points, got {len}")
            }
            Error::Extraction(s) => write!(f, "Skeleton extraction error: {s}"),
        }
    }
}

impl std::error::Error for Error {}
