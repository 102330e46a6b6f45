use std::future::Future;

use fan_control::{Coordinator, Event, Publish, Snapshot};
use log::{debug, error, info};
use tokio::sync::{mpsc, watch};

use crate::{Error, Result};

/// Cheap to clone entry point into a running session.
#[derive(Clone, Debug)]
pub struct Handle {
    events: mpsc::UnboundedSender<Event>,
    snapshots: watch::Receiver<Snapshot>,
}

impl Handle {
    pub fn send(&self, event: Event) -> Result<()> {
        self.events.send(event).map_err(|_| Error::SessionEnded)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }
}

/// Owns the coordinator and applies queued events one at a time.
pub struct Session<P> {
    coordinator: Coordinator<P>,
    events: mpsc::UnboundedReceiver<Event>,
    snapshots: watch::Sender<Snapshot>,
}

impl<P: Publish> Session<P> {
    pub fn new(coordinator: Coordinator<P>) -> (Session<P>, Handle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(coordinator.snapshot());

        let session = Session {
            coordinator,
            events: events_rx,
            snapshots: snapshots_tx,
        };
        let handle = Handle {
            events: events_tx,
            snapshots: snapshots_rx,
        };

        (session, handle)
    }

    /// Runs until `shutdown` completes or every handle is dropped. Events
    /// sent afterwards are refused.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Coordinator<P> {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => break,
                event = self.events.recv() => match event {
                    Some(event) => self.apply(event),
                    None => break,
                },
            }
        }

        self.events.close();
        info!("session ended");

        self.coordinator
    }

    fn apply(&mut self, event: Event) {
        debug!("applying {event:?}");

        if let Err(err) = self.coordinator.handle(event) {
            error!("unable to apply event: {err}");
            return;
        }

        self.snapshots.send_replace(self.coordinator.snapshot());
    }
}
