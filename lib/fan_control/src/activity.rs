use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::time_format;
use crate::Color;

pub const ACTIVITY_LOG_CAPACITY: usize = 3;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ActivityLogEntry {
    #[serde(with = "time_format")]
    pub timestamp: DateTime<Local>,
    pub temperature: Option<f64>,
    pub label: String,
    pub color: Color,
    pub message: String,
}

impl ActivityLogEntry {
    pub fn temperature_changed(
        timestamp: DateTime<Local>,
        temperature: f64,
        label: &str,
        color: Color,
    ) -> Self {
        Self {
            timestamp,
            temperature: Some(temperature),
            label: label.to_string(),
            color,
            message: format!("Temperature changed to {temperature}°C"),
        }
    }

    pub fn fan_set_manually(
        timestamp: DateTime<Local>,
        temperature: Option<f64>,
        speed: u8,
        label: &str,
        color: Color,
    ) -> Self {
        Self {
            timestamp,
            temperature,
            label: label.to_string(),
            color,
            message: format!("Fan set to {speed}% (manual)"),
        }
    }
}

/// The most recent entries, newest first.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityLogEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(ACTIVITY_LOG_CAPACITY + 1),
        }
    }

    pub fn record(&mut self, entry: ActivityLogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(ACTIVITY_LOG_CAPACITY);
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityLogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&ActivityLogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
