//! Time-series charts of the monitoring view.
//!
//! Chart options are plain JSON in the declarative `title`/`tooltip`/`xAxis`/`yAxis`/`series`
//! shape understood by common charting libraries. Drawing them is the host's business: the
//! renderer only talks to a [`ChartSurface`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::api::models::monitoring::{TimePoint, TimeSeries};
use crate::status::SeverityThresholds;

/// Success rate (percent) drawn as the SLA reference line.
pub const SLA_SUCCESS_RATE: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    CallVolume,
    SuccessRate,
    Latency,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::CallVolume,
        ChartKind::SuccessRate,
        ChartKind::Latency,
    ];

    /// Name of the mount point the chart is drawn into.
    pub fn mount(&self) -> &'static str {
        match self {
            ChartKind::CallVolume => "call-volume-chart",
            ChartKind::SuccessRate => "success-rate-chart",
            ChartKind::Latency => "latency-chart",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::CallVolume => "Call volume",
            ChartKind::SuccessRate => "Success rate",
            ChartKind::Latency => "Average latency",
        }
    }
}

/// Identifier of a chart instance created on a surface.
pub type ChartId = u64;

/// Where charts live.
pub trait ChartSurface: Send + Sync {
    /// Create a chart bound to `mount`. `None` when the mount point does not exist.
    fn init(&self, mount: &str) -> Option<ChartId>;
    /// Dispose the chart bound to `mount`, if any.
    fn dispose(&self, mount: &str);
    fn set_option(&self, chart: ChartId, option: Value);
}

fn times(points: &[TimePoint]) -> Vec<&str> {
    points.iter().map(|point| point.time.as_str()).collect()
}

fn values(points: &[TimePoint]) -> Vec<f64> {
    points.iter().map(|point| point.value).collect()
}

pub fn call_volume_option(points: &[TimePoint]) -> Value {
    json!({
        "title": { "text": ChartKind::CallVolume.title() },
        "tooltip": { "trigger": "axis" },
        "xAxis": { "type": "category", "boundaryGap": false, "data": times(points) },
        "yAxis": { "type": "value", "name": "Calls" },
        "series": [{
            "name": "Calls",
            "type": "line",
            "smooth": true,
            "areaStyle": {},
            "data": values(points)
        }]
    })
}

pub fn success_rate_option(points: &[TimePoint]) -> Value {
    json!({
        "title": { "text": ChartKind::SuccessRate.title() },
        "tooltip": { "trigger": "axis" },
        "xAxis": { "type": "category", "boundaryGap": false, "data": times(points) },
        "yAxis": {
            "type": "value",
            "name": "%",
            "min": 0,
            "max": 100,
            "axisLabel": { "formatter": "{value}%" }
        },
        "series": [{
            "name": "Success rate",
            "type": "line",
            "smooth": true,
            "data": values(points),
            "markLine": {
                "silent": true,
                "symbol": "none",
                "lineStyle": { "type": "dashed", "color": "#f56c6c" },
                "data": [{ "yAxis": SLA_SUCCESS_RATE, "name": "SLA" }]
            }
        }]
    })
}

pub fn latency_option(points: &[TimePoint], thresholds: &SeverityThresholds) -> Value {
    let bars: Vec<Value> = points
        .iter()
        .map(|point| {
            json!({
                "value": point.value,
                "itemStyle": { "color": thresholds.classify_latency(point.value).color() }
            })
        })
        .collect();

    json!({
        "title": { "text": ChartKind::Latency.title() },
        "tooltip": { "trigger": "axis" },
        "xAxis": { "type": "category", "data": times(points) },
        "yAxis": { "type": "value", "name": "ms" },
        "series": [{ "name": "Latency", "type": "bar", "data": bars }]
    })
}

/// Disposes and recreates the monitoring charts on a surface.
pub struct ChartRenderer<S: ChartSurface> {
    surface: Arc<S>,
    thresholds: SeverityThresholds,
}

impl<S: ChartSurface> ChartRenderer<S> {
    pub fn new(surface: Arc<S>, thresholds: SeverityThresholds) -> Self {
        Self { surface, thresholds }
    }

    pub fn surface(&self) -> &Arc<S> {
        &self.surface
    }

    pub fn option_for(&self, kind: ChartKind, series: &TimeSeries) -> Value {
        match kind {
            ChartKind::CallVolume => call_volume_option(&series.call_volume),
            ChartKind::SuccessRate => success_rate_option(&series.success_rate),
            ChartKind::Latency => latency_option(&series.latency, &self.thresholds),
        }
    }

    /// Draw one chart from scratch. Returns whether the mount point existed.
    pub fn render(&self, kind: ChartKind, series: &TimeSeries) -> bool {
        let mount = kind.mount();
        self.surface.dispose(mount);

        match self.surface.init(mount) {
            Some(chart) => {
                self.surface.set_option(chart, self.option_for(kind, series));
                true
            }
            None => {
                tracing::debug!(mount, "Chart mount point missing, skipping render");
                false
            }
        }
    }

    /// Draw all three charts. Returns how many were drawn.
    pub fn render_all(&self, series: &TimeSeries) -> usize {
        ChartKind::ALL
            .iter()
            .filter(|kind| self.render(**kind, series))
            .count()
    }

    pub fn dispose_all(&self) {
        for kind in ChartKind::ALL {
            self.surface.dispose(kind.mount());
        }
    }
}

/// Chart surface that keeps the latest option of each chart in memory.
#[derive(Debug, Default)]
pub struct MemorySurface {
    state: Mutex<SurfaceState>,
}

#[derive(Debug, Default)]
struct SurfaceState {
    mounts: HashSet<String>,
    charts: HashMap<String, (ChartId, Option<Value>)>,
    next_id: ChartId,
    disposed: usize,
}

impl MemorySurface {
    /// A surface with no mount points: every render is a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface with the three monitoring mount points.
    pub fn with_monitoring_mounts() -> Self {
        let surface = Self::new();
        for kind in ChartKind::ALL {
            surface.add_mount(kind.mount());
        }
        surface
    }

    pub fn add_mount(&self, mount: &str) {
        self.state.lock().mounts.insert(mount.to_string());
    }

    pub fn remove_mount(&self, mount: &str) {
        let mut state = self.state.lock();
        state.mounts.remove(mount);
        if state.charts.remove(mount).is_some() {
            state.disposed += 1;
        }
    }

    pub fn chart_id(&self, mount: &str) -> Option<ChartId> {
        self.state.lock().charts.get(mount).map(|(id, _)| *id)
    }

    pub fn option(&self, mount: &str) -> Option<Value> {
        self.state.lock().charts.get(mount).and_then(|(_, option)| option.clone())
    }

    pub fn chart_count(&self) -> usize {
        self.state.lock().charts.len()
    }

    pub fn disposed_count(&self) -> usize {
        self.state.lock().disposed
    }
}

impl ChartSurface for MemorySurface {
    fn init(&self, mount: &str) -> Option<ChartId> {
        let mut state = self.state.lock();
        if !state.mounts.contains(mount) {
            return None;
        }
        state.next_id += 1;
        let id = state.next_id;
        state.charts.insert(mount.to_string(), (id, None));
        Some(id)
    }

    fn dispose(&self, mount: &str) {
        let mut state = self.state.lock();
        if state.charts.remove(mount).is_some() {
            state.disposed += 1;
        }
    }

    fn set_option(&self, chart: ChartId, option: Value) {
        let mut state = self.state.lock();
        if let Some((_, slot)) = state.charts.values_mut().find(|(id, _)| *id == chart) {
            *slot = Some(option);
        }
    }
}
