use crate::text::escape_label;

/// Fraction of the font size between the top of a text line and its baseline.
const ASCENT_RATIO: f32 = 0.8;
const FONT_FAMILY: &str = "sans-serif";

/// Inclusive pixel box, `(x1, y1)` top-left and `(x2, y2)` bottom-right.
///
/// A box whose far corner lies before its near corner is degenerate; it is
/// still a valid layout value but covers no pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelBox {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl PixelBox {
    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i64 {
        self.x2 - self.x1 + 1
    }

    pub fn height(&self) -> i64 {
        self.y2 - self.y1 + 1
    }

    pub fn is_degenerate(&self) -> bool {
        self.x2 < self.x1 || self.y2 < self.y1
    }

    pub fn intersects(&self, other: &PixelBox) -> bool {
        !self.is_degenerate()
            && !other.is_degenerate()
            && self.x1 <= other.x2
            && other.x1 <= self.x2
            && self.y1 <= other.y2
            && other.y1 <= self.y2
    }

    pub fn contains(&self, other: &PixelBox) -> bool {
        other.x1 >= self.x1 && other.y1 >= self.y1 && other.x2 <= self.x2 && other.y2 <= self.y2
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.x1 as f32,
            self.y1 as f32,
            self.width() as f32,
            self.height() as f32,
        )
    }
}

/// Continuous rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            self.width - amount * 2.0,
            self.height - amount * 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn svg_value(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle<'a> {
    pub fill: &'a str,
    pub font_size: f32,
    pub anchor: Anchor,
    pub bold: bool,
    /// Degrees, clockwise, around the anchor point.
    pub rotation: f32,
}

impl<'a> TextStyle<'a> {
    pub fn new(fill: &'a str, font_size: f32) -> Self {
        Self {
            fill,
            font_size,
            anchor: Anchor::Start,
            bold: false,
            rotation: 0.0,
        }
    }

    pub fn anchored(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }
}

/// Fixed-size drawing surface.
///
/// Primitives are recorded as SVG elements and rasterized in one go by
/// [`crate::raster::Rasterizer`]. A canvas is owned by exactly one render
/// call and dropped once the artifact is written.
pub struct Canvas {
    width: u32,
    height: u32,
    background: String,
    svg_content: String,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: &str) -> Self {
        Self {
            width,
            height,
            background: background.to_string(),
            svg_content: String::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fill_rect(&mut self, rect: Rect, fill: &str) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }

        self.svg_content.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" />"#,
            rect.x, rect.y, rect.width, rect.height, fill,
        ));
    }

    /// Outlines a pixel box with the stroke kept entirely inside it.
    ///
    /// Degenerate boxes are skipped. Boxes thinner than twice the stroke are
    /// filled solid, since the outline would cover them anyway.
    pub fn stroke_box(&mut self, bounds: PixelBox, stroke: &str, stroke_width: f32) {
        if bounds.is_degenerate() {
            return;
        }

        let outer = bounds.to_rect();
        let inner = outer.inset(stroke_width / 2.0);
        if inner.width <= 0.0 || inner.height <= 0.0 {
            self.fill_rect(outer, stroke);
            return;
        }

        self.svg_content.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{}" stroke-width="{:.2}" />"#,
            inner.x, inner.y, inner.width, inner.height, stroke, stroke_width,
        ));
    }

    /// Outlines a continuous rectangle with the stroke centered on its edge.
    pub fn stroke_rect(&mut self, rect: Rect, stroke: &str, stroke_width: f32) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }

        self.svg_content.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{}" stroke-width="{:.2}" />"#,
            rect.x, rect.y, rect.width, rect.height, stroke, stroke_width,
        ));
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), stroke: &str, stroke_width: f32) {
        self.svg_content.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}" />"#,
            from.0, from.1, to.0, to.1, stroke, stroke_width,
        ));
    }

    /// Anti-aliased bar; the same as a filled rectangle but without any
    /// edge snapping, so fractional data coordinates stay visible.
    pub fn bar(&mut self, rect: Rect, fill: &str) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }

        self.svg_content.push_str(&format!(
            r#"<rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}" fill="{}" shape-rendering="geometricPrecision" />"#,
            rect.x, rect.y, rect.width, rect.height, fill,
        ));
    }

    /// Stamps `text` with the top of its line box at `(x, y)`.
    ///
    /// The anchor decides whether `x` is the start, middle or end of the line.
    /// Rotation turns the whole line around `(x, y)`.
    pub fn text(&mut self, x: f32, y: f32, text: &str, style: &TextStyle) {
        let baseline = y + style.font_size * ASCENT_RATIO;
        let anchor_attr = match style.anchor {
            Anchor::Start => String::new(),
            anchor => format!(r#" text-anchor="{}""#, anchor.svg_value()),
        };
        let weight_attr = if style.bold { r#" font-weight="700""# } else { "" };
        let transform_attr = if style.rotation != 0.0 {
            format!(
                r#" transform="rotate({:.2} {:.2} {:.2})""#,
                style.rotation, x, y
            )
        } else {
            String::new()
        };

        self.svg_content.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.2}" fill="{}"{}{}{}>{}</text>"#,
            x,
            baseline,
            FONT_FAMILY,
            style.font_size,
            style.fill,
            anchor_attr,
            weight_attr,
            transform_attr,
            escape_label(text),
        ));
    }

    pub fn to_svg(&self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}" height="{}"><rect width="100%" height="100%" fill="{}" />{}</svg>"#,
            self.width, self.height, self.width, self.height, self.background, self.svg_content,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_box_dimensions_are_inclusive() {
        let b = PixelBox::new(40, 40, 208, 245);
        assert_eq!(b.width(), 169);
        assert_eq!(b.height(), 206);
        assert!(!b.is_degenerate());
        assert!(PixelBox::new(10, 10, 5, 20).is_degenerate());
    }

    #[test]
    fn adjacent_boxes_do_not_intersect() {
        let left = PixelBox::new(40, 40, 208, 245);
        let right = PixelBox::new(213, 40, 381, 245);
        assert!(!left.intersects(&right));
        assert!(left.intersects(&PixelBox::new(208, 245, 300, 300)));
    }

    #[test]
    fn stroke_box_keeps_outline_inside_bounds() {
        let mut canvas = Canvas::new(100, 100, "#0000ff");
        canvas.stroke_box(PixelBox::new(10, 10, 89, 89), "white", 4.0);
        let svg = canvas.to_svg();
        assert!(svg.contains(r#"<rect x="12.00" y="12.00" width="76.00" height="76.00""#));
    }

    #[test]
    fn degenerate_boxes_draw_nothing() {
        let mut canvas = Canvas::new(100, 100, "#0000ff");
        canvas.stroke_box(PixelBox::new(40, 40, 35, 35), "white", 2.0);
        assert!(!canvas.to_svg().contains("stroke="));
    }

    #[test]
    fn text_is_escaped_and_placed_on_baseline() {
        let mut canvas = Canvas::new(100, 100, "white");
        canvas.text(10.0, 10.0, "<R1F1>", &TextStyle::new("white", 10.0));
        let svg = canvas.to_svg();
        assert!(svg.contains(r#"x="10.00" y="18.00""#));
        assert!(svg.contains("&lt;R1F1&gt;"));
    }

    #[test]
    fn rotated_text_turns_around_its_anchor() {
        let mut canvas = Canvas::new(100, 100, "white");
        let style = TextStyle::new("black", 12.0)
            .anchored(Anchor::Middle)
            .rotated(-90.0);
        canvas.text(5.0, 50.0, "Growth", &style);
        let svg = canvas.to_svg();
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r#"transform="rotate(-90.00 5.00 50.00)""#));
    }
}
