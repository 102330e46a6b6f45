mod activity;
mod coordinator;
mod error;
mod history;
mod snapshot;
mod store;
mod zone;

pub use activity::{ActivityLog, ActivityLogEntry, ACTIVITY_LOG_CAPACITY};
pub use coordinator::{Clock, Coordinator, Event, Publish};
pub use error::Error;
pub use history::{ChartSeries, HistoryBuffer, HistoryPoint, Source, HISTORY_CAPACITY};
pub use snapshot::Snapshot;
pub use store::{Applied, FanStateStore};
pub use zone::{Boundary, Color, Zone, ZoneScheme, ZoneTable};

pub use transport::{FanMode, FanState};

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) mod time_format {
    use chrono::{DateTime, Local};
    use serde::Serializer;

    pub const DISPLAY: &str = "%-I:%M:%S %p";

    pub fn serialize<S: Serializer>(time: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(DISPLAY))
    }
}
