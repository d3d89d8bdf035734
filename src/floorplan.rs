//! House blueprint: a grid of room cells, one row per floor and one column
//! per room, on a fixed 600x500 sheet.

use tracing::debug;

use crate::canvas::{Canvas, PixelBox, TextStyle};
use crate::error::RenderError;

pub const CANVAS_WIDTH: i64 = 600;
pub const CANVAS_HEIGHT: i64 = 500;

const BORDER_INSET: i64 = 10;
const BORDER_WIDTH: f32 = 4.0;
const MARGIN: i64 = 40;
const CELL_GAP: i64 = 5;
const CELL_STROKE: f32 = 2.0;
const LABEL_OFFSET: i64 = 5;
const SUMMARY_X: i64 = 20;
const SUMMARY_FROM_BOTTOM: i64 = 30;
const LABEL_FONT_SIZE: f32 = 11.0;

const SHEET_COLOR: &str = "#0000ff";
const INK_COLOR: &str = "#ffffff";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorPlanRequest {
    pub floors: u32,
    pub rooms: u32,
    pub sqft: u64,
}

impl FloorPlanRequest {
    pub const DEFAULT_FLOORS: i64 = 1;
    pub const DEFAULT_ROOMS: i64 = 1;
    pub const DEFAULT_SQFT: i64 = 100;

    /// Validates raw counts. Zero counts would divide by zero while sizing
    /// the grid, so they are rejected here.
    pub fn new(floors: i64, rooms: i64, sqft: i64) -> Result<Self, RenderError> {
        Ok(Self {
            floors: positive_count("floors", floors)?,
            rooms: positive_count("rooms", rooms)?,
            sqft: u64::try_from(sqft).map_err(|_| {
                RenderError::invalid("sqft", format!("must not be negative, got {}", sqft))
            })?,
        })
    }
}

fn positive_count(field: &'static str, value: i64) -> Result<u32, RenderError> {
    if value < 1 {
        return Err(RenderError::invalid(
            field,
            format!("must be at least 1, got {}", value),
        ));
    }
    u32::try_from(value)
        .map_err(|_| RenderError::invalid(field, format!("{} does not fit in 32 bits", value)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomCell {
    pub floor_index: u32,
    pub room_index: u32,
    pub bounds: PixelBox,
}

impl RoomCell {
    pub fn label(&self) -> String {
        format!("R{}F{}", self.room_index + 1, self.floor_index + 1)
    }

    /// Top-left corner of the label stamp.
    pub fn label_origin(&self) -> (i64, i64) {
        (self.bounds.x1 + LABEL_OFFSET, self.bounds.y1 + LABEL_OFFSET)
    }
}

#[derive(Debug, Clone)]
pub struct FloorPlanLayout {
    pub border: PixelBox,
    /// Canvas minus the margin; every non-degenerate cell lies inside it.
    pub interior: PixelBox,
    pub cell_width: i64,
    pub cell_height: i64,
    pub cells: Vec<RoomCell>,
    pub summary: String,
    pub summary_origin: (i64, i64),
}

/// Lays out one cell per (floor, room). Counts are not clamped, so a grid
/// too large to hold in memory fails with `RenderFailure` instead of aborting.
pub fn layout_floor_plan(request: &FloorPlanRequest) -> Result<FloorPlanLayout, RenderError> {
    let floors = i64::from(request.floors);
    let rooms = i64::from(request.rooms);

    let cell_width = (CANVAS_WIDTH - 2 * MARGIN) / rooms;
    let cell_height = (CANVAS_HEIGHT - 2 * MARGIN) / floors;

    debug!(floors, rooms, cell_width, cell_height, "floor plan grid computed");

    let cell_count = u64::from(request.floors) * u64::from(request.rooms);
    let mut cells = Vec::new();
    usize::try_from(cell_count)
        .ok()
        .and_then(|count| cells.try_reserve_exact(count).ok())
        .ok_or_else(|| {
            RenderError::RenderFailure(format!(
                "Failed to allocate a grid of {} room cells",
                cell_count
            ))
        })?;

    for floor_index in 0..request.floors {
        for room_index in 0..request.rooms {
            let x1 = MARGIN + i64::from(room_index) * cell_width;
            let y1 = MARGIN + i64::from(floor_index) * cell_height;
            cells.push(RoomCell {
                floor_index,
                room_index,
                bounds: PixelBox::new(
                    x1,
                    y1,
                    x1 + cell_width - CELL_GAP,
                    y1 + cell_height - CELL_GAP,
                ),
            });
        }
    }

    Ok(FloorPlanLayout {
        border: PixelBox::new(
            BORDER_INSET,
            BORDER_INSET,
            CANVAS_WIDTH - BORDER_INSET,
            CANVAS_HEIGHT - BORDER_INSET,
        ),
        interior: PixelBox::new(
            MARGIN,
            MARGIN,
            CANVAS_WIDTH - MARGIN - 1,
            CANVAS_HEIGHT - MARGIN - 1,
        ),
        cell_width,
        cell_height,
        cells,
        summary: format!(
            "Floors: {}, Rooms/Floor: {}, Size: {} sqft",
            request.floors, request.rooms, request.sqft
        ),
        summary_origin: (SUMMARY_X, CANVAS_HEIGHT - SUMMARY_FROM_BOTTOM),
    })
}

pub fn draw_floor_plan(layout: &FloorPlanLayout) -> Canvas {
    let mut canvas = Canvas::new(CANVAS_WIDTH as u32, CANVAS_HEIGHT as u32, SHEET_COLOR);
    let label_style = TextStyle::new(INK_COLOR, LABEL_FONT_SIZE);

    canvas.stroke_box(layout.border, INK_COLOR, BORDER_WIDTH);

    for cell in &layout.cells {
        canvas.stroke_box(cell.bounds, INK_COLOR, CELL_STROKE);
        let (x, y) = cell.label_origin();
        canvas.text(x as f32, y as f32, &cell.label(), &label_style);
    }

    let (x, y) = layout.summary_origin;
    canvas.text(x as f32, y as f32, &layout.summary, &label_style);

    canvas
}
