//! Chart data preparation, independent of any drawing backend

use crate::{
    data::Dataset,
    models::BenchmarkRecord,
    stats::{order_by_workers, speedup_series},
    types::TestType,
};
use plotters::style::RGBColor;

/// Matplotlib's default cycle, so the charts look like the ones users know
pub const PROCESS_COLOR: RGBColor = RGBColor(31, 119, 180);
pub const THREAD_COLOR: RGBColor = RGBColor(255, 127, 14);
pub const PROCESS_ALT_COLOR: RGBColor = RGBColor(0, 0, 255);
pub const THREAD_ALT_COLOR: RGBColor = RGBColor(255, 0, 0);

pub const WORKERS_AXIS: &str = "Número de Trabajadores";
pub const TIME_AXIS: &str = "Tiempo de Ejecución (ms)";

/// Point marker drawn on top of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// matplotlib `o-`
    Circle,
    /// matplotlib `s-`
    Square,
}

impl Marker {
    pub fn for_type(test_type: &TestType) -> Self {
        match test_type {
            TestType::Threads => Marker::Square,
            _ => Marker::Circle,
        }
    }
}

/// One labelled line with markers
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: RGBColor,
    pub marker: Marker,
    pub stroke_width: u32,
    pub marker_size: i32,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    /// Series of one metric over rows, ordered by worker count
    pub fn from_rows<F>(test_type: &TestType, color: RGBColor, rows: &[&BenchmarkRecord], metric: F) -> Self
    where
        F: Fn(&BenchmarkRecord) -> f64,
    {
        let points = order_by_workers(rows)
            .into_iter()
            .map(|r| (f64::from(r.num_threads), metric(r)))
            .collect();

        Self {
            label: test_type.label().to_string(),
            color,
            marker: Marker::for_type(test_type),
            stroke_width: 2,
            marker_size: 4,
            points,
        }
    }
}

/// Dashed-style helper line drawn in grey/black without markers
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Text placed above a data point
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// One chart: axes, series and extras
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub series: Vec<Series>,
    pub reference: Option<ReferenceLine>,
    pub annotations: Vec<Annotation>,
    /// Lower bound for the x range upper limit
    pub min_x_max: f64,
}

impl Panel {
    fn new(title: &str, x_desc: &str, y_desc: &str) -> Self {
        Self {
            title: title.to_string(),
            x_desc: x_desc.to_string(),
            y_desc: y_desc.to_string(),
            series: Vec::new(),
            reference: None,
            annotations: Vec::new(),
            min_x_max: 1.0,
        }
    }

    fn all_points(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter())
            .chain(self.reference.iter().flat_map(|r| r.points.iter()))
    }

    /// Upper end of the x axis: largest worker count plus one
    pub fn x_max(&self) -> f64 {
        let max = self
            .all_points()
            .map(|&(x, _)| x)
            .filter(|x| x.is_finite())
            .fold(self.min_x_max, f64::max);
        max + 1.0
    }

    /// Upper end of the y axis with 10% headroom
    pub fn y_max(&self) -> f64 {
        let max = self
            .all_points()
            .map(|&(_, y)| y)
            .filter(|y| y.is_finite())
            .fold(0.0, f64::max);
        if max > 0.0 {
            max * 1.1
        } else {
            1.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }
}

/// The four panels of the analysis grid
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPanels {
    pub panels: Vec<Panel>,
    /// Kinds whose speedup could not be drawn for lack of a single-worker row
    pub missing_baselines: Vec<TestType>,
}

/// Build the time, throughput, CPU and speedup panels
pub fn analysis_panels(dataset: &Dataset) -> AnalysisPanels {
    let processes = dataset.synchronized(&TestType::Processes);
    let threads = dataset.synchronized(&TestType::Threads);
    let max_workers = dataset.max_workers().map(f64::from).unwrap_or(1.0);

    let metric_panel = |title: &str, y_desc: &str, colors: (RGBColor, RGBColor), metric: fn(&BenchmarkRecord) -> f64| {
        let mut panel = Panel::new(title, WORKERS_AXIS, y_desc);
        panel.min_x_max = max_workers;
        panel.series.push(Series::from_rows(&TestType::Processes, colors.0, &processes, metric));
        panel.series.push(Series::from_rows(&TestType::Threads, colors.1, &threads, metric));
        panel
    };

    let time = metric_panel(
        "Tiempo de Ejecución vs Número de Trabajadores",
        TIME_AXIS,
        (PROCESS_COLOR, THREAD_COLOR),
        |r| r.execution_time_ms,
    );
    let throughput = metric_panel(
        "Throughput vs Número de Trabajadores",
        "Throughput (ops/ms)",
        (PROCESS_ALT_COLOR, THREAD_ALT_COLOR),
        |r| r.throughput_ops_ms,
    );
    let mut cpu = metric_panel(
        "Utilización CPU vs Número de Trabajadores",
        "Utilización CPU (%)",
        (PROCESS_COLOR, THREAD_COLOR),
        |r| r.cpu_utilization_percent,
    );
    cpu.reference = Some(ReferenceLine {
        label: "100% (1 CPU)".to_string(),
        points: vec![(0.0, 100.0), (max_workers + 1.0, 100.0)],
    });

    let mut speedup = Panel::new(
        "Speedup vs Número de Trabajadores",
        WORKERS_AXIS,
        "Speedup (factor de aceleración)",
    );
    speedup.min_x_max = max_workers;
    let mut missing_baselines = Vec::new();

    if !processes.is_empty() && !threads.is_empty() {
        for (test_type, rows) in [(TestType::Processes, &processes), (TestType::Threads, &threads)] {
            let ordered = order_by_workers(rows);
            match speedup_series(&ordered) {
                Some(points) => speedup.series.push(Series {
                    label: test_type.label().to_string(),
                    color: if test_type == TestType::Threads { THREAD_COLOR } else { PROCESS_COLOR },
                    marker: Marker::for_type(&test_type),
                    stroke_width: 2,
                    marker_size: 4,
                    points: points.iter().map(|p| (f64::from(p.workers), p.speedup)).collect(),
                }),
                None => missing_baselines.push(test_type),
            }
        }

        speedup.reference = Some(ReferenceLine {
            label: "Speedup Ideal".to_string(),
            points: vec![(1.0, 1.0), (max_workers, max_workers)],
        });
    }

    AnalysisPanels {
        panels: vec![time, throughput, cpu, speedup],
        missing_baselines,
    }
}

/// Thread execution time chart with every n-th point annotated
pub fn thread_time_panel(dataset: &Dataset, annotate_every: usize) -> Panel {
    let threads = dataset.synchronized(&TestType::Threads);

    let mut series = Series::from_rows(&TestType::Threads, THREAD_ALT_COLOR, &threads, |r| r.execution_time_ms);
    series.label = "Hilos con Sincronización".to_string();
    series.stroke_width = 3;
    series.marker_size = 5;

    let stride = annotate_every.max(1);
    let annotations = series
        .points
        .iter()
        .step_by(stride)
        .map(|&(x, y)| Annotation {
            x,
            y,
            text: format!("{:.0}ms", y),
        })
        .collect();

    let mut panel = Panel::new("Tiempo de Ejecución vs Número de Hilos", "Número de Hilos", TIME_AXIS);
    panel.series.push(series);
    panel.annotations = annotations;
    panel
}
