use chrono::{DateTime, Local};
use log::{debug, info, trace, warn};
use transport::{FanMode, FanState, Update};

use crate::{
    ActivityLog, ActivityLogEntry, Applied, Error, FanStateStore, HistoryBuffer, HistoryPoint,
    Result, Snapshot, Source, ZoneTable,
};

pub type Clock = fn() -> DateTime<Local>;

/// Outbound side of the fan node. Every call is a full replace.
pub trait Publish {
    fn publish(&mut self, state: FanState);
}

impl Publish for Vec<FanState> {
    fn publish(&mut self, state: FanState) {
        self.push(state);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Temperature(Option<f64>),
    Fan(Option<FanState>),
    Manual(u8),
    Auto,
}

impl From<Update> for Event {
    fn from(update: Update) -> Self {
        match update {
            Update::Temperature(reading) => Event::Temperature(reading),
            Update::Fan(state) => Event::Fan(state),
        }
    }
}

pub struct Coordinator<P> {
    zones: ZoneTable,
    store: FanStateStore,
    temperature: Option<f64>,
    history: HistoryBuffer,
    log: ActivityLog,
    publisher: P,
    clock: Clock,
}

impl<P: Publish> Coordinator<P> {
    pub fn new(zones: ZoneTable, publisher: P) -> Self {
        Self {
            zones,
            store: FanStateStore::default(),
            temperature: None,
            history: HistoryBuffer::new(),
            log: ActivityLog::new(),
            publisher,
            clock: Local::now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn handle(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Temperature(reading) => self.on_temperature(reading),
            Event::Fan(state) => self.on_fan(state),
            Event::Manual(speed) => self.manual(speed)?,
            Event::Auto => self.auto(),
        }

        Ok(())
    }

    pub fn on_temperature(&mut self, reading: Option<f64>) {
        let Some(temperature) = reading else {
            trace!("temperature has no value yet");
            return;
        };

        let now = (self.clock)();
        let zone = self.zones.classify(temperature).clone();
        self.temperature = Some(temperature);

        info!(
            "temperature {temperature}°C is {label}",
            label = zone.label
        );

        self.drive(zone.speed);

        self.history.append(HistoryPoint {
            timestamp: now,
            temperature: Some(temperature),
            fan_speed: self.store.speed(),
            source: Source::Temperature,
        });

        self.log.record(ActivityLogEntry::temperature_changed(
            now,
            temperature,
            &zone.label,
            zone.color,
        ));
    }

    pub fn on_fan(&mut self, state: Option<FanState>) {
        let Some(state) = state else {
            trace!("fan has no value yet");
            return;
        };

        if !self.zones.supports_speed(state.speed) {
            warn!(
                "fan reports speed {}% outside of {:?}",
                state.speed,
                self.zones.levels()
            );
        }

        let first = !self.store.is_known();

        match self.store.apply_external(state) {
            Applied::Confirmed => debug!("fan {state:?} confirmed"),
            Applied::Updated => {
                info!("fan is at {}% ({})", state.speed, state.mode);
                self.sample(Source::Fan);
            }
        }

        // a reading that arrived before the fan state is applied now
        if first {
            if let Some(temperature) = self.temperature {
                let speed = self.zones.classify(temperature).speed;
                if speed != state.speed {
                    self.drive(speed);
                }
            }
        }
    }

    pub fn manual(&mut self, speed: u8) -> Result<()> {
        let zone = self
            .zones
            .zone_for_speed(speed)
            .ok_or_else(|| Error::UnsupportedSpeed(speed, self.zones.levels()))?;

        let state = self.store.apply_manual(speed);
        self.publisher.publish(state);

        info!("fan set to {speed}% manually");

        let now = (self.clock)();

        self.history.append(HistoryPoint {
            timestamp: now,
            temperature: self.temperature,
            fan_speed: speed,
            source: Source::Manual,
        });

        self.log.record(ActivityLogEntry::fan_set_manually(
            now,
            self.temperature,
            speed,
            &zone.label,
            zone.color,
        ));

        Ok(())
    }

    pub fn auto(&mut self) {
        let state = self.store.set_auto();
        self.publisher.publish(state);

        info!("fan back to automatic mode at {}%", state.speed);

        self.sample(Source::Auto);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            temperature: self.temperature,
            zone: self
                .temperature
                .map(|temperature| self.zones.classify(temperature).clone()),
            fan: self.store.current(),
            fan_label: self
                .zones
                .label_for_speed(self.store.speed())
                .map(str::to_string),
            history: self.history.points().cloned().collect(),
            log: self.log.entries().cloned().collect(),
            chart: self.history.series(),
        }
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn fan(&self) -> FanState {
        self.store.current()
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn activity_log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Publishes the automatic speed, leaving the store to the broker echo.
    /// Nothing is published while the fan state is unknown or manual.
    fn drive(&mut self, speed: u8) {
        if !self.store.is_known() {
            debug!("fan state unknown, not driving it to {speed}%");
            return;
        }

        if self.store.mode() == FanMode::Auto {
            let state = FanState::auto(speed);
            self.store.track_published(state);
            self.publisher.publish(state);
        }
    }

    fn sample(&mut self, source: Source) {
        self.history.append(HistoryPoint {
            timestamp: (self.clock)(),
            temperature: self.temperature,
            fan_speed: self.store.speed(),
            source,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ZoneScheme, ACTIVITY_LOG_CAPACITY, HISTORY_CAPACITY};
    use chrono::TimeZone;

    fn clock() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 16, 29, 3).unwrap()
    }

    fn fresh() -> Coordinator<Vec<FanState>> {
        Coordinator::new(ZoneScheme::ThreeZone.table(), vec![]).with_clock(clock)
    }

    // fan state already known to be {0, auto}
    fn coordinator() -> Coordinator<Vec<FanState>> {
        let mut coordinator = fresh();
        coordinator.store = FanStateStore::new(FanState::auto(0));
        coordinator
    }

    /// Applies `events` to a fresh coordinator, then echoes back everything
    /// it published the way the broker would.
    fn settle(events: &[Event]) -> (FanState, Vec<FanState>) {
        let mut coordinator = fresh();

        for event in events {
            coordinator.handle(event.clone()).unwrap();
        }

        let mut echoed = 0;
        while echoed < coordinator.publisher().len() {
            let state = coordinator.publisher()[echoed];
            coordinator.on_fan(Some(state));
            echoed += 1;
        }

        (coordinator.fan(), coordinator.publisher().clone())
    }

    fn sources(coordinator: &Coordinator<Vec<FanState>>) -> Vec<Source> {
        coordinator.history().points().map(|p| p.source).collect()
    }

    #[test]
    fn test_auto_mode_sequence() {
        let mut coordinator = coordinator();

        for t in [18.0, 22.0, 37.0, 41.0] {
            coordinator.handle(Event::Temperature(Some(t))).unwrap();
        }

        let speeds: Vec<u8> = coordinator.publisher().iter().map(|s| s.speed).collect();
        assert_eq!(speeds, vec![0, 0, 50, 100]);
        assert!(coordinator
            .publisher()
            .iter()
            .all(|s| s.mode == FanMode::Auto));

        let temperatures: Vec<Option<f64>> = coordinator
            .history()
            .points()
            .map(|p| p.temperature)
            .collect();
        assert_eq!(
            temperatures,
            vec![Some(18.0), Some(22.0), Some(37.0), Some(41.0)]
        );

        let labels: Vec<&str> = coordinator
            .activity_log()
            .entries()
            .map(|e| e.label.as_str())
            .collect();
        assert_eq!(labels, vec!["MAX", "MEDIUM", "OFF"]);
    }

    #[test]
    fn test_unknown_fan_is_not_driven() {
        let mut coordinator = fresh();

        coordinator.on_temperature(Some(41.0));

        assert!(coordinator.publisher().is_empty());
        assert_eq!(coordinator.history().len(), 1);
        assert_eq!(coordinator.activity_log().len(), 1);
    }

    #[test]
    fn test_retained_manual_survives_any_order() {
        let fan = Event::Fan(Some(FanState::manual(100)));
        let temperature = Event::Temperature(Some(18.0));

        let fan_first = settle(&[fan.clone(), temperature.clone()]);
        let temperature_first = settle(&[temperature, fan]);

        assert_eq!(fan_first, (FanState::manual(100), vec![]));
        assert_eq!(temperature_first, fan_first);
    }

    #[test]
    fn test_retained_auto_follows_temperature_in_any_order() {
        let fan = Event::Fan(Some(FanState::auto(0)));
        let temperature = Event::Temperature(Some(41.0));

        let fan_first = settle(&[fan.clone(), temperature.clone()]);
        let temperature_first = settle(&[temperature, fan]);

        assert_eq!(fan_first, (FanState::auto(100), vec![FanState::auto(100)]));
        assert_eq!(temperature_first, fan_first);
    }

    #[test]
    fn test_temperature_uses_last_known_speed() {
        let mut coordinator = coordinator();

        coordinator.on_temperature(Some(41.0));
        assert_eq!(coordinator.fan(), FanState::auto(0));
        assert_eq!(coordinator.history().last().map(|p| p.fan_speed), Some(0));

        coordinator.on_fan(Some(FanState::auto(100)));
        assert_eq!(coordinator.fan(), FanState::auto(100));

        let last = coordinator.history().last().unwrap();
        assert_eq!(last.temperature, Some(41.0));
        assert_eq!(last.fan_speed, 100);
        assert_eq!(last.source, Source::Fan);
        assert_eq!(coordinator.history().len(), 2);
    }

    #[test]
    fn test_null_temperature_is_ignored() {
        let mut coordinator = coordinator();
        coordinator.on_temperature(Some(22.0));

        coordinator.handle(Event::Temperature(None)).unwrap();

        assert_eq!(coordinator.temperature(), Some(22.0));
        assert_eq!(coordinator.history().len(), 1);
        assert_eq!(coordinator.activity_log().len(), 1);
        assert_eq!(coordinator.publisher().len(), 1);
    }

    #[test]
    fn test_null_fan_is_ignored() {
        let mut coordinator = coordinator();
        coordinator.manual(50).unwrap();

        coordinator.handle(Event::Fan(None)).unwrap();

        assert_eq!(coordinator.fan(), FanState::manual(50));
        assert_eq!(coordinator.history().len(), 1);
    }

    #[test]
    fn test_manual_survives_temperature_updates() {
        let mut coordinator = coordinator();
        coordinator.on_temperature(Some(18.0));

        coordinator.handle(Event::Manual(100)).unwrap();
        assert_eq!(coordinator.fan(), FanState::manual(100));

        coordinator.on_temperature(Some(20.0));

        assert_eq!(coordinator.fan(), FanState::manual(100));
        assert_eq!(
            coordinator.publisher().as_slice(),
            &[FanState::auto(0), FanState::manual(100)]
        );
        assert_eq!(coordinator.history().last().map(|p| p.fan_speed), Some(100));
    }

    #[test]
    fn test_manual_echo_is_not_duplicated() {
        let mut coordinator = coordinator();
        coordinator.on_temperature(Some(30.0));

        coordinator.manual(50).unwrap();
        coordinator.on_fan(Some(FanState::auto(0)));
        assert_eq!(coordinator.fan(), FanState::manual(50));
        coordinator.on_fan(Some(FanState::manual(50)));

        assert_eq!(
            sources(&coordinator),
            vec![Source::Temperature, Source::Manual]
        );
        assert_eq!(coordinator.activity_log().len(), 2);

        let entry = coordinator.activity_log().latest().unwrap();
        assert_eq!(entry.message, "Fan set to 50% (manual)");
        assert_eq!(entry.temperature, Some(30.0));
        assert_eq!(entry.label, "MEDIUM");
    }

    #[test]
    fn test_auto_echo_is_not_duplicated() {
        let mut coordinator = coordinator();
        coordinator.manual(100).unwrap();
        coordinator.on_fan(Some(FanState::manual(100)));

        coordinator.handle(Event::Auto).unwrap();
        coordinator.on_fan(Some(FanState::auto(100)));

        assert_eq!(sources(&coordinator), vec![Source::Manual, Source::Auto]);
        assert_eq!(coordinator.fan(), FanState::auto(100));
    }

    #[test]
    fn test_auto_does_not_recompute() {
        let mut coordinator = coordinator();
        coordinator.on_temperature(Some(41.0));
        coordinator.manual(0).unwrap();

        coordinator.auto();

        assert_eq!(coordinator.fan(), FanState::auto(0));
        assert_eq!(coordinator.publisher().last(), Some(&FanState::auto(0)));

        coordinator.on_temperature(Some(41.0));
        assert_eq!(coordinator.publisher().last(), Some(&FanState::auto(100)));
    }

    #[test]
    fn test_fan_changes_are_not_logged() {
        let mut coordinator = coordinator();

        coordinator.on_fan(Some(FanState::auto(50)));
        coordinator.on_fan(Some(FanState::manual(100)));

        assert!(coordinator.activity_log().is_empty());
        assert_eq!(coordinator.history().len(), 2);
    }

    #[test]
    fn test_fan_before_temperature() {
        let mut coordinator = coordinator();

        coordinator.on_fan(Some(FanState::auto(50)));

        let point = coordinator.history().last().unwrap();
        assert_eq!(point.temperature, None);
        assert_eq!(point.fan_speed, 50);
    }

    #[test]
    fn test_unsupported_manual_speed() {
        let mut coordinator = coordinator();

        assert_eq!(
            coordinator.handle(Event::Manual(25)),
            Err(Error::UnsupportedSpeed(25, vec![0, 50, 100]))
        );

        assert!(coordinator.publisher().is_empty());
        assert!(coordinator.history().is_empty());
        assert_eq!(coordinator.fan(), FanState::auto(0));
    }

    #[test]
    fn test_external_speed_outside_levels_is_accepted() {
        let mut coordinator = coordinator();

        coordinator.on_fan(Some(FanState::manual(25)));

        assert_eq!(coordinator.fan(), FanState::manual(25));
    }

    #[test]
    fn test_bounded_windows() {
        let mut coordinator = coordinator();

        for i in 0..20 {
            coordinator.on_temperature(Some(f64::from(i)));
        }

        assert_eq!(coordinator.history().len(), HISTORY_CAPACITY);
        assert_eq!(coordinator.activity_log().len(), ACTIVITY_LOG_CAPACITY);
        assert_eq!(
            coordinator.history().points().next().unwrap().temperature,
            Some(10.0)
        );
    }

    #[test]
    fn test_snapshot() {
        let mut coordinator = coordinator();
        assert_eq!(
            coordinator.snapshot(),
            Snapshot {
                fan_label: Some("OFF".to_string()),
                ..Snapshot::default()
            }
        );

        coordinator.on_temperature(Some(37.0));
        coordinator.on_fan(Some(FanState::auto(50)));

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.temperature, Some(37.0));
        assert_eq!(snapshot.zone.map(|z| z.label), Some("MEDIUM".to_string()));
        assert_eq!(snapshot.fan, FanState::auto(50));
        assert_eq!(snapshot.fan_label.as_deref(), Some("MEDIUM"));
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.log.len(), 1);
        assert_eq!(snapshot.chart.fan_speed, vec![0, 50]);
        assert_eq!(snapshot.chart.labels[0], "4:29:03 PM");
    }

    #[test]
    fn test_event_from_update() {
        assert_eq!(
            Event::from(Update::Temperature(Some(21.0))),
            Event::Temperature(Some(21.0))
        );
        assert_eq!(Event::from(Update::Fan(None)), Event::Fan(None));
    }
}
