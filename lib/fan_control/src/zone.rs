use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use str_derive::Str;

use crate::{Error, Result};

#[derive(Copy, Clone, Debug, Deserialize, Serialize, Str, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
}

/// How a temperature equal to a zone's upper bound is treated.
#[derive(Copy, Clone, Debug, Default, Deserialize, Serialize, Str, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// `temperature <= upper` belongs to the zone.
    #[default]
    Inclusive,
    /// `temperature < upper` belongs to the zone.
    Exclusive,
}

impl Boundary {
    fn contains(self, temperature: f64, upper: f64) -> bool {
        match self {
            Boundary::Inclusive => temperature <= upper,
            Boundary::Exclusive => temperature < upper,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Zone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    pub label: String,
    pub color: Color,
    pub speed: u8,
}

impl Zone {
    fn new(upper: Option<f64>, label: &str, color: Color, speed: u8) -> Zone {
        Zone {
            upper,
            label: label.to_string(),
            color,
            speed,
        }
    }
}

/// Ordered temperature zones. The first zone whose upper bound matches wins,
/// the last zone has no bound and catches everything above.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(try_from = "RawZoneTable")]
pub struct ZoneTable {
    boundary: Boundary,
    zones: Vec<Zone>,
}

#[derive(Deserialize)]
struct RawZoneTable {
    #[serde(default)]
    boundary: Boundary,
    zones: Vec<Zone>,
}

impl TryFrom<RawZoneTable> for ZoneTable {
    type Error = Error;

    fn try_from(raw: RawZoneTable) -> Result<ZoneTable> {
        ZoneTable::new(raw.zones, raw.boundary)
    }
}

impl ZoneTable {
    pub fn new(zones: Vec<Zone>, boundary: Boundary) -> Result<ZoneTable> {
        let last = zones.len().checked_sub(1).ok_or(Error::EmptyZoneTable)?;

        if zones[last].upper.is_some() {
            return Err(Error::MissingCatchAll);
        }

        let mut previous: Option<f64> = None;
        for (index, zone) in zones[..last].iter().enumerate() {
            let upper = zone.upper.ok_or(Error::CatchAllNotLast(index))?;
            if upper.is_nan() {
                return Err(Error::NanBound(index));
            }

            if let Some(previous) = previous {
                if previous.partial_cmp(&upper) != Some(Ordering::Less) {
                    return Err(Error::UnorderedBounds(previous, upper));
                }
            }
            previous = Some(upper);
        }

        Ok(ZoneTable { boundary, zones })
    }

    pub fn classify(&self, temperature: f64) -> &Zone {
        let (catch_all, bounded) = self.split();

        bounded
            .iter()
            .find(|zone| {
                zone.upper
                    .is_some_and(|upper| self.boundary.contains(temperature, upper))
            })
            .unwrap_or(catch_all)
    }

    /// Distinct fan speeds the table can produce, ascending.
    pub fn levels(&self) -> Vec<u8> {
        let mut levels: Vec<u8> = self.zones.iter().map(|zone| zone.speed).collect();
        levels.sort_unstable();
        levels.dedup();
        levels
    }

    pub fn supports_speed(&self, speed: u8) -> bool {
        self.zones.iter().any(|zone| zone.speed == speed)
    }

    pub fn zone_for_speed(&self, speed: u8) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.speed == speed)
    }

    pub fn label_for_speed(&self, speed: u8) -> Option<&str> {
        self.zone_for_speed(speed).map(|zone| zone.label.as_str())
    }

    #[cfg(test)]
    fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    fn split(&self) -> (&Zone, &[Zone]) {
        match self.zones.split_last() {
            Some(split) => split,
            None => unreachable!("zone tables are never empty"),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Deserialize, Serialize, Str, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ZoneScheme {
    /// OFF up to 35°C, MEDIUM up to 39°C, MAX above.
    #[default]
    ThreeZone,
    /// OFF below 20°C, then LOW, MEDIUM, HIGH in 5°C steps, MAX from 35°C.
    FiveZone,
}

impl ZoneScheme {
    pub fn table(self) -> ZoneTable {
        match self {
            ZoneScheme::ThreeZone => ZoneTable {
                boundary: Boundary::Inclusive,
                zones: vec![
                    Zone::new(Some(35.0), "OFF", Color::Blue, 0),
                    Zone::new(Some(39.0), "MEDIUM", Color::Yellow, 50),
                    Zone::new(None, "MAX", Color::Red, 100),
                ],
            },
            ZoneScheme::FiveZone => ZoneTable {
                boundary: Boundary::Exclusive,
                zones: vec![
                    Zone::new(Some(20.0), "OFF", Color::Blue, 0),
                    Zone::new(Some(25.0), "LOW", Color::Green, 25),
                    Zone::new(Some(30.0), "MEDIUM", Color::Yellow, 50),
                    Zone::new(Some(35.0), "HIGH", Color::Orange, 75),
                    Zone::new(None, "MAX", Color::Red, 100),
                ],
            },
        }
    }
}

impl From<ZoneScheme> for ZoneTable {
    fn from(scheme: ZoneScheme) -> Self {
        scheme.table()
    }
}
