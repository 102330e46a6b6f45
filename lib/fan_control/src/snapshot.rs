use serde::Serialize;
use transport::FanState;

use crate::{ActivityLogEntry, ChartSeries, HistoryPoint, Zone};

/// Everything the dashboard renders, taken after an event has been applied.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct Snapshot {
    pub temperature: Option<f64>,
    pub zone: Option<Zone>,
    pub fan: FanState,
    pub fan_label: Option<String>,
    pub history: Vec<HistoryPoint>,
    pub log: Vec<ActivityLogEntry>,
    pub chart: ChartSeries,
}
