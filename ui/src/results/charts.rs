//! SVG charts. Geometry is computed up front in plain Rust so the components
//! only stamp out elements.

use std::collections::HashMap;

use api::SweepPoint;
use dioxus::prelude::*;

use super::view::ChartBackend;
use crate::core::downsample::DisplayPoint;
use crate::core::format::format_number;
use crate::core::trace::TracePoint;
use crate::t;

const WIDTH: f64 = 640.0;
const PLOT_HEIGHT: f64 = 260.0;
const PAD_LEFT: f64 = 56.0;
const PAD_RIGHT: f64 = 16.0;
const PAD_TOP: f64 = 16.0;
const PAD_BOTTOM: f64 = 32.0;

const BAR_ROW: f64 = 24.0;
const BAR_LABEL_WIDTH: f64 = 120.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    /// Weight scaled to percent.
    pub percent: f64,
}

/// Horizontal bar chart. `bars[0]` sits on the baseline and later bars stack
/// upwards, so the last bar is drawn at the top.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarChart {
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn from_ranked<'a>(ranked: impl Iterator<Item = (&'a str, f64)>) -> Self {
        Self {
            bars: ranked
                .map(|(label, weight)| Bar {
                    label: label.to_string(),
                    percent: weight * 100.0,
                })
                .collect(),
        }
    }

    pub fn max_percent(&self) -> f64 {
        self.bars
            .iter()
            .map(|bar| bar.percent)
            .filter(|p| p.is_finite())
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartId(u64);

/// Chart backend for the SVG renderer. A chart lives here from allocation
/// until release; looking up a released id yields nothing.
#[derive(Debug, Default)]
pub struct SvgCharts {
    next_id: u64,
    live: HashMap<ChartId, BarChart>,
}

impl SvgCharts {
    pub fn live(&self) -> usize {
        self.live.len()
    }
}

impl ChartBackend for SvgCharts {
    type Handle = ChartId;

    fn allocate(&mut self, chart: BarChart) -> ChartId {
        self.next_id += 1;
        let id = ChartId(self.next_id);
        self.live.insert(id, chart);
        id
    }

    fn release(&mut self, handle: ChartId) {
        self.live.remove(&handle);
    }

    fn chart(&self, handle: &ChartId) -> Option<&BarChart> {
        self.live.get(handle)
    }
}

/// Finite min/max of `values`, widened when degenerate so scaling never
/// divides by zero.
pub(crate) fn value_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        return (min - pad, max + pad);
    }
    (min, max)
}

fn scale(value: f64, (lo, hi): (f64, f64), (out_lo, out_hi): (f64, f64)) -> f64 {
    out_lo + (value - lo) / (hi - lo) * (out_hi - out_lo)
}

fn plot_x(value: f64, range: (f64, f64)) -> f64 {
    scale(value, range, (PAD_LEFT, WIDTH - PAD_RIGHT))
}

fn plot_y(value: f64, range: (f64, f64)) -> f64 {
    scale(value, range, (PAD_TOP + PLOT_HEIGHT, PAD_TOP))
}

/// `x,y` pairs for an SVG `polyline`.
pub(crate) fn polyline(points: &[(f64, f64)], x_range: (f64, f64), y_range: (f64, f64)) -> String {
    points
        .iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|&(x, y)| format!("{:.2},{:.2}", plot_x(x, x_range), plot_y(y, y_range)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BarGeometry {
    pub label: String,
    pub value_text: String,
    pub y: f64,
    pub width: f64,
    pub text_y: f64,
    pub value_x: f64,
}

pub(crate) fn bar_layout(chart: &BarChart) -> Vec<BarGeometry> {
    let max = chart.max_percent().max(f64::EPSILON);
    let track = WIDTH - BAR_LABEL_WIDTH - 72.0;
    let rows = chart.bars.len();
    chart
        .bars
        .iter()
        .enumerate()
        .map(|(row, bar)| {
            let y = PAD_TOP + (rows - 1 - row) as f64 * BAR_ROW;
            let width = (bar.percent.max(0.0) / max * track).max(1.0);
            BarGeometry {
                label: bar.label.clone(),
                value_text: format!("{}%", format_number(bar.percent, 2)),
                y: y + 3.0,
                width,
                text_y: y + BAR_ROW * 0.62,
                value_x: BAR_LABEL_WIDTH + width + 6.0,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Column {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

pub(crate) fn column_layout(centers: &[f64], heights: &[f64]) -> Vec<Column> {
    let n = centers.len().min(heights.len());
    if n == 0 {
        return Vec::new();
    }
    let y_range = (0.0, value_range(heights[..n].iter().copied()).1.max(f64::EPSILON));
    let slot = (WIDTH - PAD_LEFT - PAD_RIGHT) / n as f64;
    heights[..n]
        .iter()
        .enumerate()
        .map(|(i, &h)| {
            let top = plot_y(h.max(0.0), y_range);
            Column {
                x: PAD_LEFT + i as f64 * slot,
                y: top,
                width: slot.max(1.0),
                height: (PAD_TOP + PLOT_HEIGHT - top).max(0.0),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Cell {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
}

/// Grid cells for a surface matrix; rows follow y, drawn bottom-up.
pub(crate) fn cell_layout(z: &[Vec<f64>]) -> Vec<Cell> {
    let rows = z.len();
    let cols = z.iter().map(Vec::len).max().unwrap_or(0);
    if rows == 0 || cols == 0 {
        return Vec::new();
    }
    let peak = z
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
        .max(f64::EPSILON);
    let width = (WIDTH - PAD_LEFT - PAD_RIGHT) / cols as f64;
    let height = PLOT_HEIGHT / rows as f64;

    z.iter()
        .enumerate()
        .flat_map(|(r, row)| {
            row.iter().enumerate().map(move |(c, &v)| Cell {
                x: PAD_LEFT + c as f64 * width,
                y: PAD_TOP + PLOT_HEIGHT - (r as f64 + 1.0) * height,
                width,
                height,
                opacity: if v.is_finite() { (v / peak).clamp(0.0, 1.0) } else { 0.0 },
            })
        })
        .collect()
}

fn view_box(height: f64) -> String {
    format!("0 0 {WIDTH} {height}")
}

#[component]
pub fn BarChartView(chart: BarChart) -> Element {
    let bars = bar_layout(&chart);
    let height = PAD_TOP * 2.0 + bars.len() as f64 * BAR_ROW;
    let bar_height = BAR_ROW - 6.0;
    let label_x = BAR_LABEL_WIDTH - 8.0;

    rsx! {
        svg { class: "chart chart--bars", view_box: view_box(height), role: "img",
            for (i, bar) in bars.into_iter().enumerate() {
                g { key: "{i}",
                    text {
                        class: "chart__label",
                        x: "{label_x}",
                        y: "{bar.text_y}",
                        text_anchor: "end",
                        "{bar.label}"
                    }
                    rect {
                        class: "chart__bar",
                        x: "{BAR_LABEL_WIDTH}",
                        y: "{bar.y}",
                        width: "{bar.width}",
                        height: "{bar_height}",
                        rx: "3",
                    }
                    text {
                        class: "chart__value",
                        x: "{bar.value_x}",
                        y: "{bar.text_y}",
                        "{bar.value_text}"
                    }
                }
            }
        }
    }
}

#[component]
pub fn LineChartView(title: String, points: Vec<DisplayPoint>, y_label: String) -> Element {
    let pairs: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (p.position as f64, p.value))
        .collect();
    let x_range = value_range(pairs.iter().map(|p| p.0));
    let y_range = value_range(pairs.iter().map(|p| p.1));
    let line = polyline(&pairs, x_range, y_range);
    let height = PAD_TOP + PLOT_HEIGHT + PAD_BOTTOM;

    rsx! {
        figure { class: "results-chart",
            figcaption { class: "results-chart__title", "{title}" }
            svg { class: "chart chart--line", view_box: view_box(height), role: "img",
                {axes(x_range, y_range, y_label)}
                polyline { class: "chart__series", points: "{line}" }
            }
        }
    }
}

#[component]
pub fn SweepChartView(points: Vec<SweepPoint>, best: Option<u32>) -> Element {
    let x_range = value_range(points.iter().map(|p| p.parameter as f64));
    let y_range = value_range(
        points
            .iter()
            .flat_map(|p| [p.mean_score - p.std_dev, p.mean_score + p.std_dev]),
    );
    let pairs: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (p.parameter as f64, p.mean_score))
        .collect();
    let line = polyline(&pairs, x_range, y_range);
    let markers: Vec<(f64, f64, f64, f64, bool)> = points
        .iter()
        .map(|p| {
            let x = plot_x(p.parameter as f64, x_range);
            (
                x,
                plot_y(p.mean_score, y_range),
                plot_y(p.mean_score - p.std_dev, y_range),
                plot_y(p.mean_score + p.std_dev, y_range),
                best == Some(p.parameter),
            )
        })
        .collect();
    let height = PAD_TOP + PLOT_HEIGHT + PAD_BOTTOM;
    let title = t!("chart-sweep-title");

    rsx! {
        figure { class: "results-chart",
            figcaption { class: "results-chart__title", "{title}" }
            svg { class: "chart chart--sweep", view_box: view_box(height), role: "img",
                {axes(x_range, y_range, t!("chart-axis-score"))}
                polyline { class: "chart__series", points: "{line}" }
                for (i, (x, y, low, high, selected)) in markers.into_iter().enumerate() {
                    g { key: "{i}",
                        line { class: "chart__error", x1: "{x}", x2: "{x}", y1: "{low}", y2: "{high}" }
                        circle {
                            class: if selected { "chart__marker chart__marker--best" } else { "chart__marker" },
                            cx: "{x}",
                            cy: "{y}",
                            r: if selected { "6" } else { "3.5" },
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn TraceChartView(points: Vec<TracePoint>) -> Element {
    let x_range = value_range(points.iter().map(|p| p.iteration as f64));
    let y_range = value_range(points.iter().filter_map(|p| p.warmup.or(p.stationary)));
    let warmup: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|p| p.warmup.map(|v| (p.iteration as f64, v)))
        .collect();
    let stationary: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|p| p.stationary.map(|v| (p.iteration as f64, v)))
        .collect();
    let warmup_line = polyline(&warmup, x_range, y_range);
    let stationary_line = polyline(&stationary, x_range, y_range);
    let height = PAD_TOP + PLOT_HEIGHT + PAD_BOTTOM;
    let title = t!("chart-trace-title");
    let burn_in = t!("chart-legend-burn-in");
    let sampling = t!("chart-legend-sampling");

    rsx! {
        figure { class: "results-chart",
            figcaption { class: "results-chart__title", "{title}" }
            svg { class: "chart chart--trace", view_box: view_box(height), role: "img",
                {axes(x_range, y_range, "x".to_string())}
                polyline { class: "chart__series chart__series--warmup", points: "{warmup_line}" }
                polyline { class: "chart__series chart__series--stationary", points: "{stationary_line}" }
            }
            div { class: "results-chart__legend",
                span { class: "results-chart__legend-swatch results-chart__legend-swatch--warmup" }
                span { "{burn_in}" }
                span { class: "results-chart__legend-swatch results-chart__legend-swatch--stationary" }
                span { "{sampling}" }
            }
        }
    }
}

#[component]
pub fn HistogramView(centers: Vec<f64>, densities: Vec<f64>) -> Element {
    let columns = column_layout(&centers, &densities);
    let x_range = value_range(centers.iter().copied());
    let y_range = (0.0, value_range(densities.iter().copied()).1);
    let height = PAD_TOP + PLOT_HEIGHT + PAD_BOTTOM;
    let title = t!("chart-histogram-title");

    rsx! {
        figure { class: "results-chart",
            figcaption { class: "results-chart__title", "{title}" }
            svg { class: "chart chart--histogram", view_box: view_box(height), role: "img",
                {axes(x_range, y_range, t!("chart-axis-density"))}
                for (i, col) in columns.into_iter().enumerate() {
                    rect {
                        key: "{i}",
                        class: "chart__column",
                        x: "{col.x}",
                        y: "{col.y}",
                        width: "{col.width}",
                        height: "{col.height}",
                    }
                }
            }
        }
    }
}

#[component]
pub fn HeatmapView(xs: Vec<f64>, ys: Vec<f64>, z: Vec<Vec<f64>>) -> Element {
    let cells = cell_layout(&z);
    let x_range = value_range(xs.iter().copied());
    let y_range = value_range(ys.iter().copied());
    let height = PAD_TOP + PLOT_HEIGHT + PAD_BOTTOM;
    let title = t!("chart-heatmap-title");

    rsx! {
        figure { class: "results-chart",
            figcaption { class: "results-chart__title", "{title}" }
            svg { class: "chart chart--heatmap", view_box: view_box(height), role: "img",
                {axes(x_range, y_range, "y".to_string())}
                for (i, cell) in cells.into_iter().enumerate() {
                    rect {
                        key: "{i}",
                        class: "chart__cell",
                        x: "{cell.x}",
                        y: "{cell.y}",
                        width: "{cell.width}",
                        height: "{cell.height}",
                        fill_opacity: "{cell.opacity}",
                    }
                }
            }
        }
    }
}

fn axes(x_range: (f64, f64), y_range: (f64, f64), y_label: String) -> Element {
    let bottom = PAD_TOP + PLOT_HEIGHT;
    let right = WIDTH - PAD_RIGHT;
    let x_lo = format_number(x_range.0, 0);
    let x_hi = format_number(x_range.1, 0);
    let y_lo = format_number(y_range.0, 2);
    let y_hi = format_number(y_range.1, 2);
    let tick_y = bottom + 18.0;
    let tick_x = PAD_LEFT - 6.0;
    let top_tick_y = PAD_TOP + 10.0;
    let middle_y = PAD_TOP + PLOT_HEIGHT / 2.0;

    rsx! {
        g { class: "chart__axes",
            line { x1: "{PAD_LEFT}", x2: "{PAD_LEFT}", y1: "{PAD_TOP}", y2: "{bottom}" }
            line { x1: "{PAD_LEFT}", x2: "{right}", y1: "{bottom}", y2: "{bottom}" }
            text { class: "chart__tick", x: "{PAD_LEFT}", y: "{tick_y}", "{x_lo}" }
            text { class: "chart__tick", x: "{right}", y: "{tick_y}", text_anchor: "end", "{x_hi}" }
            text { class: "chart__tick", x: "{tick_x}", y: "{bottom}", text_anchor: "end", "{y_lo}" }
            text { class: "chart__tick", x: "{tick_x}", y: "{top_tick_y}", text_anchor: "end", "{y_hi}" }
            text { class: "chart__axis-label", x: "{tick_x}", y: "{middle_y}", text_anchor: "end", "{y_label}" }
        }
    }
}
