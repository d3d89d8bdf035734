use std::path::Path;

use tracing::debug;

use crate::canvas::Canvas;
use crate::config::Settings;
use crate::error::RenderError;
use crate::floorplan::{FloorPlanRequest, draw_floor_plan, layout_floor_plan};
use crate::fonts::{CosmicTextMeasure, TextMeasure};
use crate::projection::{ProjectionRequest, ProjectionSeries, draw_chart, layout_chart};
use crate::raster::Rasterizer;
use crate::robot::{RobotRequest, draw_robot, layout_robot};
use crate::sink::{Artifact, ArtifactKind, OutputSink};

/// Entry point for all three render pipelines.
///
/// Holds only read-only resources (fonts and a text measurer), so one engine
/// can serve concurrent calls. Every call builds its own canvas.
pub struct Engine<M = CosmicTextMeasure> {
    rasterizer: Rasterizer,
    measure: M,
}

impl Engine<CosmicTextMeasure> {
    pub fn new(fonts_dir: Option<&Path>, system_fonts: bool) -> Self {
        let rasterizer = Rasterizer::new(fonts_dir, system_fonts);
        debug!(faces = rasterizer.font_count(), "font database loaded");

        Self {
            rasterizer,
            measure: CosmicTextMeasure::with_fonts(fonts_dir, system_fonts),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.fonts_dir.as_deref(), settings.system_fonts)
    }
}

impl<M: TextMeasure> Engine<M> {
    pub fn with_measure(rasterizer: Rasterizer, measure: M) -> Self {
        Self {
            rasterizer,
            measure,
        }
    }

    pub fn render_floor_plan<S: OutputSink + ?Sized>(
        &self,
        floors: i64,
        rooms: i64,
        sqft: i64,
        sink: &S,
    ) -> Result<Artifact, RenderError> {
        let request = FloorPlanRequest::new(floors, rooms, sqft)?;
        let layout = layout_floor_plan(&request)?;
        self.commit(ArtifactKind::HouseBlueprint, draw_floor_plan(&layout), sink)
    }

    pub fn render_projection<S: OutputSink + ?Sized>(
        &self,
        asset_type: &str,
        budget: f64,
        sink: &S,
    ) -> Result<Artifact, RenderError> {
        let request = ProjectionRequest::new(asset_type, budget)?;
        let series = ProjectionSeries::compute(request.budget);
        let layout = layout_chart(&request, &series, &self.measure);
        self.commit(
            ArtifactKind::CryptoPlan,
            draw_chart(&request, &series, &layout),
            sink,
        )
    }

    pub fn render_robot_schematic<S: OutputSink + ?Sized>(
        &self,
        robot_type: &str,
        sink: &S,
    ) -> Result<Artifact, RenderError> {
        let request = RobotRequest::new(robot_type);
        let schematic = layout_robot(&request);
        self.commit(ArtifactKind::RobotModel, draw_robot(&schematic), sink)
    }

    fn commit<S: OutputSink + ?Sized>(
        &self,
        kind: ArtifactKind,
        canvas: Canvas,
        sink: &S,
    ) -> Result<Artifact, RenderError> {
        let png = self.rasterizer.rasterize(&canvas)?;
        drop(canvas);

        debug!(artifact = kind.stem(), bytes = png.len(), "canvas rasterized");
        sink.persist(kind, &png)
    }
}
