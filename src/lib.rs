//! Parametric raster renderer for three fixed drawing categories: a house
//! floor-plan blueprint, an investment projection bar chart and a robot
//! schematic.
//!
//! Every pipeline has the same shape: validate parameters, compute layout,
//! draw onto a locally owned [`canvas::Canvas`], rasterize to PNG and hand the
//! bytes to an [`sink::OutputSink`] under a fixed per-category name.

pub mod canvas;
pub mod config;
pub mod engine;
pub mod error;
pub mod floorplan;
pub mod fonts;
pub mod projection;
pub mod raster;
pub mod request;
pub mod robot;
pub mod sink;
pub mod text;

pub use engine::Engine;
pub use error::RenderError;
pub use sink::{Artifact, ArtifactKind, FsSink, MemorySink, OutputSink};
