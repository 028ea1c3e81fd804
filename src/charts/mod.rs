//! Chart rendering with plotters (PNG through the bitmap backend, or SVG)
//!
//! Text is laid out and rasterized with DejaVu Sans, compiled into the
//! binary and registered as the `sans-serif` family on first use.

pub mod series;

pub use series::{analysis_panels, thread_time_panel, AnalysisPanels, Annotation, Marker, Panel, ReferenceLine, Series};

use crate::{
    error::{AppError, Result},
    models::Config,
    types::ChartFormat,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::path::Path;
use std::sync::OnceLock;

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Font sizes for one rendered chart
#[derive(Debug, Clone, Copy)]
struct ChartStyle {
    caption: u32,
    axis_desc: u32,
    annotation: u32,
    margin: u32,
}

const GRID_STYLE: ChartStyle = ChartStyle {
    caption: 24,
    axis_desc: 16,
    annotation: 12,
    margin: 15,
};

const SINGLE_STYLE: ChartStyle = ChartStyle {
    caption: 28,
    axis_desc: 18,
    annotation: 14,
    margin: 20,
};

/// Renders prepared panels to image files
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    format: ChartFormat,
    grid_size: (u32, u32),
    single_size: (u32, u32),
}

impl ChartRenderer {
    pub fn new(format: ChartFormat, grid_size: (u32, u32), single_size: (u32, u32)) -> Self {
        Self {
            format,
            grid_size,
            single_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.chart_format, config.grid_size, config.single_size)
    }

    pub fn format(&self) -> ChartFormat {
        self.format
    }

    /// Render the 2x2 analysis grid; panels fill the cells row by row
    pub fn render_analysis(&self, panels: &[Panel], path: &Path) -> Result<()> {
        ensure_font()?;
        ensure_parent(path)?;
        match self.format {
            ChartFormat::Png => {
                let root = BitMapBackend::new(path, self.grid_size).into_drawing_area();
                draw_grid(&root, panels)
            }
            ChartFormat::Svg => {
                let root = SVGBackend::new(path, self.grid_size).into_drawing_area();
                draw_grid(&root, panels)
            }
        }
    }

    /// Render a single full-size panel
    pub fn render_single(&self, panel: &Panel, path: &Path) -> Result<()> {
        ensure_font()?;
        ensure_parent(path)?;
        match self.format {
            ChartFormat::Png => {
                let root = BitMapBackend::new(path, self.single_size).into_drawing_area();
                draw_single(&root, panel)
            }
            ChartFormat::Svg => {
                let root = SVGBackend::new(path, self.single_size).into_drawing_area();
                draw_single(&root, panel)
            }
        }
    }
}

/// Register the embedded font; other styles fall back to the normal face
fn ensure_font() -> Result<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();

    let registered = *REGISTERED.get_or_init(|| {
        register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok()
    });

    if registered {
        Ok(())
    } else {
        Err(AppError::chart("Embedded chart font could not be loaded"))
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::io(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
    }
    Ok(())
}

fn chart_error<E: std::fmt::Display>(error: E) -> AppError {
    AppError::chart(error.to_string())
}

fn draw_grid<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, panels: &[Panel]) -> Result<()> {
    root.fill(&WHITE).map_err(chart_error)?;

    for (area, panel) in root.split_evenly((2, 2)).iter().zip(panels) {
        draw_panel(area, panel, GRID_STYLE)?;
    }

    root.present().map_err(chart_error)
}

fn draw_single<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, panel: &Panel) -> Result<()> {
    root.fill(&WHITE).map_err(chart_error)?;
    draw_panel(root, panel, SINGLE_STYLE)?;
    root.present().map_err(chart_error)
}

fn draw_panel<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, panel: &Panel, style: ChartStyle) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, (FONT_FAMILY, style.caption))
        .margin(style.margin)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..panel.x_max(), 0f64..panel.y_max())
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc(panel.x_desc.as_str())
        .y_desc(panel.y_desc.as_str())
        .axis_desc_style((FONT_FAMILY, style.axis_desc))
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .draw()
        .map_err(chart_error)?;

    let mut has_legend = false;

    for series in &panel.series {
        if series.points.is_empty() {
            continue;
        }
        let color = series.color;
        let stroke = series.stroke_width;

        chart
            .draw_series(LineSeries::new(series.points.iter().copied(), color.stroke_width(stroke)))
            .map_err(chart_error)?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(stroke)));
        has_legend = true;

        match series.marker {
            Marker::Circle => {
                chart
                    .draw_series(PointSeries::of_element(
                        series.points.iter().copied(),
                        series.marker_size,
                        color.filled(),
                        &|coord, size, shape| EmptyElement::at(coord) + Circle::new((0, 0), size, shape),
                    ))
                    .map_err(chart_error)?;
            }
            Marker::Square => {
                chart
                    .draw_series(PointSeries::of_element(
                        series.points.iter().copied(),
                        series.marker_size,
                        color.filled(),
                        &|coord, size, shape| {
                            EmptyElement::at(coord) + Rectangle::new([(-size, -size), (size, size)], shape)
                        },
                    ))
                    .map_err(chart_error)?;
            }
        }
    }

    if let Some(reference) = &panel.reference {
        let grey = BLACK.mix(0.5);
        chart
            .draw_series(LineSeries::new(reference.points.iter().copied(), grey.stroke_width(1)))
            .map_err(chart_error)?
            .label(reference.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], grey.stroke_width(1)));
        has_legend = true;
    }

    if !panel.annotations.is_empty() {
        let font_size = style.annotation;
        chart
            .draw_series(panel.annotations.iter().map(|a| {
                EmptyElement::at((a.x, a.y))
                    + Text::new(a.text.clone(), (-10, -20), (FONT_FAMILY, font_size).into_font())
            }))
            .map_err(chart_error)?;
    }

    if has_legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_error)?;
    }

    Ok(())
}
