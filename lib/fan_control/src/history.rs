use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use str_derive::Str;

use crate::time_format;

pub const HISTORY_CAPACITY: usize = 10;

/// The event a history point was sampled on.
#[derive(Copy, Clone, Debug, Deserialize, Serialize, Str, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Temperature,
    Fan,
    Manual,
    Auto,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HistoryPoint {
    #[serde(with = "time_format")]
    pub timestamp: DateTime<Local>,
    pub temperature: Option<f64>,
    pub fan_speed: u8,
    pub source: Source,
}

/// Rolling window of the most recent samples, oldest first.
#[derive(Debug, Default)]
pub struct HistoryBuffer {
    points: VecDeque<HistoryPoint>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub fn append(&mut self, point: HistoryPoint) {
        if self.points.len() == HISTORY_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn points(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }

    #[cfg(test)]
    pub(crate) fn last(&self) -> Option<&HistoryPoint> {
        self.points.back()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn series(&self) -> ChartSeries {
        let mut series = ChartSeries::default();

        for point in &self.points {
            series
                .labels
                .push(point.timestamp.format(time_format::DISPLAY).to_string());
            series.temperature.push(point.temperature);
            series.fan_speed.push(point.fan_speed);
        }

        series
    }
}

/// Two aligned series for the trend chart, both plotted on a 0–100 axis.
/// A temperature of `None` is a gap.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub temperature: Vec<Option<f64>>,
    pub fan_speed: Vec<u8>,
}
