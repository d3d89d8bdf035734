use crate::canvas::{Canvas, PixelBox, TextStyle};
use crate::text::capitalize;

pub const CANVAS_SIZE: u32 = 500;

const BODY: PixelBox = PixelBox {
    x1: 100,
    y1: 100,
    x2: 400,
    y2: 400,
};
const BODY_STROKE: f32 = 3.0;
const CENTERLINE_STROKE: f32 = 2.0;
const NAME_ORIGIN: (f32, f32) = (180.0, 420.0);
const TITLE_ORIGIN: (f32, f32) = (10.0, 10.0);
const TITLE: &str = "Robot Blueprint";
const LABEL_FONT_SIZE: f32 = 11.0;

const SHEET_COLOR: &str = "#0000ff";
const INK_COLOR: &str = "#ffffff";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotRequest {
    pub robot_type: String,
}

impl RobotRequest {
    pub const DEFAULT_ROBOT_TYPE: &'static str = "fighting";

    pub fn new(robot_type: impl Into<String>) -> Self {
        Self {
            robot_type: robot_type.into(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} Bot", capitalize(&self.robot_type))
    }
}

/// The schematic is the same square body split into quadrants every time;
/// only the name under it changes.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotSchematic {
    pub body: PixelBox,
    pub vertical_centerline: ((f32, f32), (f32, f32)),
    pub horizontal_centerline: ((f32, f32), (f32, f32)),
    pub label: String,
}

pub fn layout_robot(request: &RobotRequest) -> RobotSchematic {
    let center_x = ((BODY.x1 + BODY.x2) / 2) as f32;
    let center_y = ((BODY.y1 + BODY.y2) / 2) as f32;

    RobotSchematic {
        body: BODY,
        vertical_centerline: ((center_x, BODY.y1 as f32), (center_x, BODY.y2 as f32)),
        horizontal_centerline: ((BODY.x1 as f32, center_y), (BODY.x2 as f32, center_y)),
        label: request.label(),
    }
}

pub fn draw_robot(schematic: &RobotSchematic) -> Canvas {
    let mut canvas = Canvas::new(CANVAS_SIZE, CANVAS_SIZE, SHEET_COLOR);
    let label_style = TextStyle::new(INK_COLOR, LABEL_FONT_SIZE);

    canvas.stroke_box(schematic.body, INK_COLOR, BODY_STROKE);

    let (from, to) = schematic.vertical_centerline;
    canvas.line(from, to, INK_COLOR, CENTERLINE_STROKE);
    let (from, to) = schematic.horizontal_centerline;
    canvas.line(from, to, INK_COLOR, CENTERLINE_STROKE);

    canvas.text(NAME_ORIGIN.0, NAME_ORIGIN.1, &schematic.label, &label_style);
    canvas.text(TITLE_ORIGIN.0, TITLE_ORIGIN.1, TITLE, &label_style);

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_capitalizes_robot_type() {
        assert_eq!(RobotRequest::new("fighting").label(), "Fighting Bot");
        assert_eq!(RobotRequest::new("CLEANING").label(), "Cleaning Bot");
        assert_eq!(RobotRequest::new("").label(), " Bot");
    }

    #[test]
    fn centerlines_bisect_the_body() {
        let schematic = layout_robot(&RobotRequest::new("fighting"));
        assert_eq!(schematic.body, PixelBox::new(100, 100, 400, 400));
        assert_eq!(
            schematic.vertical_centerline,
            ((250.0, 100.0), (250.0, 400.0))
        );
        assert_eq!(
            schematic.horizontal_centerline,
            ((100.0, 250.0), (400.0, 250.0))
        );
    }

    #[test]
    fn drawing_stamps_name_and_title() {
        let svg = draw_robot(&layout_robot(&RobotRequest::new("medical <v2>"))).to_svg();
        assert!(svg.contains("Medical &lt;v2&gt; Bot"));
        assert!(svg.contains(">Robot Blueprint<"));
        assert_eq!(svg.matches("<line ").count(), 2);
    }
}
