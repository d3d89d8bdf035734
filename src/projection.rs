//! Investment projection: a bar chart of a fixed logarithmic growth curve
//! over ten budget tranches (₹1 lakh to ₹10 lakh).

use tracing::debug;

use crate::canvas::{Anchor, Canvas, Rect, TextStyle};
use crate::error::RenderError;
use crate::fonts::TextMeasure;
use crate::text::capitalize;

pub const TRANCHE_COUNT: u32 = 10;
const GROWTH_DIVISOR: f64 = 100_000.0;

pub const CANVAS_WIDTH: u32 = 600;
pub const CANVAS_HEIGHT: u32 = 400;

const TITLE_FONT_SIZE: f32 = 16.0;
const AXIS_LABEL_FONT_SIZE: f32 = 13.0;
const TICK_FONT_SIZE: f32 = 12.0;
const PAD: f32 = 8.0;
const TICK_LEN: f32 = 4.0;
const BAR_WIDTH: f64 = 0.8;
const AXIS_MARGIN: f64 = 0.05;
const TARGET_Y_TICKS: f64 = 6.0;
const UNIT_AXIS_STEP: f64 = 0.2;
const MAX_TICK_DECIMALS: usize = 6;
const LARGE_TICK_STEP: f64 = 1e9;

const BACKGROUND: &str = "#ffffff";
const AXIS_COLOR: &str = "#000000";
const TEXT_COLOR: &str = "#000000";

const X_AXIS_LABEL: &str = "Budget (₹ Lakhs)";
const Y_AXIS_LABEL: &str = "Projected Growth";

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRequest {
    pub asset_type: String,
    pub budget: f64,
}

impl ProjectionRequest {
    pub const DEFAULT_ASSET_TYPE: &'static str = "ethereum";
    pub const DEFAULT_BUDGET: f64 = 100_000.0;

    pub fn new(asset_type: impl Into<String>, budget: f64) -> Result<Self, RenderError> {
        if !budget.is_finite() {
            return Err(RenderError::invalid(
                "budget",
                format!("must be a finite number, got {}", budget),
            ));
        }
        if budget <= 0.0 {
            return Err(RenderError::invalid(
                "budget",
                format!("must be positive, got {}", budget),
            ));
        }
        if !ProjectionSeries::compute(budget).is_strictly_increasing() {
            return Err(RenderError::invalid(
                "budget",
                format!("is outside the representable projection range, got {}", budget),
            ));
        }

        Ok(Self {
            asset_type: asset_type.into(),
            budget,
        })
    }

    pub fn style(&self) -> ProjectionStyle {
        ProjectionStyle::for_asset(&self.asset_type)
    }

    pub fn title(&self) -> String {
        format!("{} Investment Projection", capitalize(&self.asset_type))
    }
}

/// Bar styling. Ethereum gets its own color; every other asset shares one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionStyle {
    Ethereum,
    Other,
}

impl ProjectionStyle {
    pub fn for_asset(asset_type: &str) -> Self {
        if asset_type.to_lowercase() == "ethereum" {
            ProjectionStyle::Ethereum
        } else {
            ProjectionStyle::Other
        }
    }

    pub fn bar_color(self) -> &'static str {
        match self {
            ProjectionStyle::Ethereum => "#800080",
            ProjectionStyle::Other => "#008000",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tranche {
    /// 1-based, in lakhs.
    pub index: u32,
    pub value: f64,
}

impl Tranche {
    pub fn label(&self) -> String {
        format!("₹{}L", self.index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSeries {
    pub tranches: Vec<Tranche>,
}

impl ProjectionSeries {
    /// `value(i) = ln(i + 1) * budget / 100000` for `i` in `1..=10`.
    pub fn compute(budget: f64) -> Self {
        let tranches = (1..=TRANCHE_COUNT)
            .map(|index| Tranche {
                index,
                value: (f64::from(index) + 1.0).ln() * budget / GROWTH_DIVISOR,
            })
            .collect();

        Self { tranches }
    }

    pub fn values(&self) -> Vec<f64> {
        self.tranches.iter().map(|t| t.value).collect()
    }

    /// Every value finite and each tranche above the previous one. Fails for
    /// budgets so large the series overflows or so small it underflows.
    pub fn is_strictly_increasing(&self) -> bool {
        self.tranches.iter().all(|t| t.value.is_finite())
            && self.tranches.windows(2).all(|w| w[1].value > w[0].value)
    }

    pub fn max_value(&self) -> f64 {
        self.tranches
            .iter()
            .map(|t| t.value)
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone)]
pub struct YTick {
    pub value: f64,
    pub label: String,
}

/// Placement of every chart element in canvas coordinates.
#[derive(Debug, Clone)]
pub struct ChartLayout {
    pub plot: Rect,
    pub x_range: (f64, f64),
    pub y_top: f64,
    pub y_ticks: Vec<YTick>,
    pub bars: Vec<Rect>,
    pub x_label_height: f32,
}

impl ChartLayout {
    pub fn map_x(&self, value: f64) -> f32 {
        let (lo, hi) = self.x_range;
        self.plot.x + ((value - lo) / (hi - lo)) as f32 * self.plot.width
    }

    pub fn map_y(&self, value: f64) -> f32 {
        let clamped = value.clamp(0.0, self.y_top);
        self.plot.bottom() - (clamped / self.y_top) as f32 * self.plot.height
    }
}

/// Picks a 1, 2 or 5 times power-of-ten step giving roughly `target` intervals.
/// `None` when the span is too small or too large to subdivide.
fn nice_step(span: f64, target: f64) -> Option<f64> {
    let raw = span / target;
    let magnitude = 10f64.powf(raw.log10().floor());
    if !(magnitude.is_finite() && magnitude > 0.0) {
        return None;
    }
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    let step = nice * magnitude;
    (step.is_finite() && step > 0.0).then_some(step)
}

fn tick_decimals(step: f64) -> usize {
    (-step.log10() - 1e-9).ceil().max(0.0) as usize
}

/// Axis top and tick step for a series maximum. Series that cannot be
/// subdivided get a unit axis.
fn value_axis(max_value: f64) -> (f64, f64) {
    let y_top = max_value * (1.0 + AXIS_MARGIN);
    if y_top.is_finite() && y_top > 0.0 {
        if let Some(step) = nice_step(y_top, TARGET_Y_TICKS) {
            return (y_top, step);
        }
    }
    (1.0, UNIT_AXIS_STEP)
}

fn y_ticks(y_top: f64, step: f64) -> Vec<YTick> {
    let decimals = tick_decimals(step);
    let scientific = decimals > MAX_TICK_DECIMALS || step >= LARGE_TICK_STEP;

    let mut ticks = Vec::new();
    let mut k = 0u32;
    loop {
        let value = f64::from(k) * step;
        if value > y_top * (1.0 + 1e-9) {
            break;
        }
        ticks.push(YTick {
            value,
            label: if scientific {
                format!("{:.1e}", value)
            } else {
                format!("{:.*}", decimals, value)
            },
        });
        k += 1;
    }
    ticks
}

fn line_height<T: TextMeasure>(measure: &T, text: &str, font_size: f32, bold: bool) -> f32 {
    measure.measure_text(text, font_size, bold).1.max(font_size)
}

/// Lays out the chart, sizing margins from measured label extents so that no
/// label is clipped.
pub fn layout_chart<T: TextMeasure>(
    request: &ProjectionRequest,
    series: &ProjectionSeries,
    measure: &T,
) -> ChartLayout {
    let width = CANVAS_WIDTH as f32;
    let height = CANVAS_HEIGHT as f32;

    let (y_top, step) = value_axis(series.max_value());
    let y_ticks = y_ticks(y_top, step);

    let title_height = line_height(measure, &request.title(), TITLE_FONT_SIZE, true);
    let x_label_height = line_height(measure, X_AXIS_LABEL, AXIS_LABEL_FONT_SIZE, false);
    let y_label_height = line_height(measure, Y_AXIS_LABEL, AXIS_LABEL_FONT_SIZE, false);
    let x_tick_height = series
        .tranches
        .iter()
        .map(|t| line_height(measure, &t.label(), TICK_FONT_SIZE, false))
        .fold(0.0, f32::max);
    let y_tick_width = y_ticks
        .iter()
        .map(|t| measure.measure_text(&t.label, TICK_FONT_SIZE, false).0)
        .fold(0.0, f32::max);
    let last_x_tick_width = series
        .tranches
        .last()
        .map(|t| measure.measure_text(&t.label(), TICK_FONT_SIZE, false).0)
        .unwrap_or(0.0);

    let top = PAD + title_height + PAD;
    let bottom =
        height - (PAD + x_label_height + PAD / 2.0 + x_tick_height + TICK_LEN + PAD / 2.0);
    let left = PAD + y_label_height + PAD / 2.0 + y_tick_width + TICK_LEN + PAD / 2.0;
    let right = width - PAD.max(last_x_tick_width / 2.0 + 2.0);

    let plot = Rect::new(left, top, (right - left).max(1.0), (bottom - top).max(1.0));

    let first = 1.0 - BAR_WIDTH / 2.0;
    let last = f64::from(TRANCHE_COUNT) + BAR_WIDTH / 2.0;
    let x_pad = (last - first) * AXIS_MARGIN;

    let mut layout = ChartLayout {
        plot,
        x_range: (first - x_pad, last + x_pad),
        y_top,
        y_ticks,
        bars: Vec::new(),
        x_label_height,
    };

    let bars = series
        .tranches
        .iter()
        .map(|t| {
            let center = f64::from(t.index);
            let x0 = layout.map_x(center - BAR_WIDTH / 2.0);
            let x1 = layout.map_x(center + BAR_WIDTH / 2.0);
            let top = if t.value.is_finite() {
                layout.map_y(t.value)
            } else {
                plot.bottom()
            };
            Rect::new(x0, top, x1 - x0, plot.bottom() - top)
        })
        .collect();
    layout.bars = bars;

    debug!(
        style = ?request.style(),
        y_top,
        ticks = layout.y_ticks.len(),
        "projection chart laid out"
    );

    layout
}

pub fn draw_chart(
    request: &ProjectionRequest,
    series: &ProjectionSeries,
    layout: &ChartLayout,
) -> Canvas {
    let mut canvas = Canvas::new(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND);
    let plot = layout.plot;
    let bar_color = request.style().bar_color();

    for bar in &layout.bars {
        canvas.bar(*bar, bar_color);
    }

    canvas.stroke_rect(plot, AXIS_COLOR, 1.0);

    let tick_style = TextStyle::new(TEXT_COLOR, TICK_FONT_SIZE);

    let x_label_style = tick_style.anchored(Anchor::Middle);
    for tranche in &series.tranches {
        let x = layout.map_x(f64::from(tranche.index));
        canvas.line(
            (x, plot.bottom()),
            (x, plot.bottom() + TICK_LEN),
            AXIS_COLOR,
            1.0,
        );
        canvas.text(
            x,
            plot.bottom() + TICK_LEN + PAD / 2.0,
            &tranche.label(),
            &x_label_style,
        );
    }

    let y_label_style = tick_style.anchored(Anchor::End);
    for tick in &layout.y_ticks {
        let y = layout.map_y(tick.value);
        canvas.line((plot.x - TICK_LEN, y), (plot.x, y), AXIS_COLOR, 1.0);
        canvas.text(
            plot.x - TICK_LEN - PAD / 2.0,
            y - TICK_FONT_SIZE / 2.0,
            &tick.label,
            &y_label_style,
        );
    }

    canvas.text(
        plot.center_x(),
        PAD,
        &request.title(),
        &TextStyle::new(TEXT_COLOR, TITLE_FONT_SIZE)
            .anchored(Anchor::Middle)
            .bold(),
    );

    let axis_style = TextStyle::new(TEXT_COLOR, AXIS_LABEL_FONT_SIZE).anchored(Anchor::Middle);
    canvas.text(
        plot.center_x(),
        CANVAS_HEIGHT as f32 - PAD - layout.x_label_height,
        X_AXIS_LABEL,
        &axis_style,
    );
    canvas.text(PAD, plot.center_y(), Y_AXIS_LABEL, &axis_style.rotated(-90.0));

    canvas
}
