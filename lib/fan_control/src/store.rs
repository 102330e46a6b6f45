use std::collections::VecDeque;

use log::debug;
use transport::{FanMode, FanState};

/// Published states not yet echoed back by the broker are forgotten past this.
const MAX_PENDING: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    /// The payload is the echo of a state this store already reflects or
    /// that a later local change superseded.
    Confirmed,
    /// The payload changed the store.
    Updated,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Outbound {
    state: FanState,
    applied_locally: bool,
}

/// Single owner of the current fan speed and mode.
///
/// The state is unknown until the broker delivers the fan node or a local
/// command sets it.
///
/// Every state published to the broker is remembered until the broker
/// delivers it back. Local commands are applied right away, so their echo
/// only confirms them; an echo that arrives after a newer local command was
/// issued is stale and leaves the store alone.
#[derive(Debug, Default)]
pub struct FanStateStore {
    current: FanState,
    known: bool,
    pending: VecDeque<Outbound>,
}

impl FanStateStore {
    pub fn new(initial: FanState) -> Self {
        Self {
            current: initial,
            known: true,
            pending: VecDeque::new(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.known
    }

    pub fn current(&self) -> FanState {
        self.current
    }

    pub fn speed(&self) -> u8 {
        self.current.speed
    }

    pub fn mode(&self) -> FanMode {
        self.current.mode
    }

    #[cfg(test)]
    fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn apply_external(&mut self, state: FanState) -> Applied {
        self.known = true;

        if let Some(position) = self.pending.iter().position(|o| o.state == state) {
            let echoed = self.pending[position];

            // everything published before the echoed state has been superseded
            self.pending.drain(..=position);

            let superseded = self.pending.iter().any(|o| o.applied_locally);
            if echoed.applied_locally || superseded {
                debug!("confirmed {state:?}, {} still pending", self.pending.len());
                return Applied::Confirmed;
            }

            self.current = state;
            return Applied::Updated;
        }

        if !self.pending.is_empty() {
            debug!("{state:?} overrides {} pending states", self.pending.len());
            self.pending.clear();
        }

        self.current = state;
        Applied::Updated
    }

    /// Remembers a state published without changing the store, so that its
    /// echo can be told apart from a foreign update.
    pub fn track_published(&mut self, state: FanState) {
        self.push_pending(Outbound {
            state,
            applied_locally: false,
        });
    }

    /// Switches to manual mode at `speed` and returns the state to publish.
    pub fn apply_manual(&mut self, speed: u8) -> FanState {
        self.apply_local(FanState::manual(speed))
    }

    /// Switches back to automatic mode keeping the current speed. The speed is
    /// recomputed only by the next temperature reading.
    pub fn set_auto(&mut self) -> FanState {
        self.apply_local(FanState::auto(self.current.speed))
    }

    fn apply_local(&mut self, state: FanState) -> FanState {
        self.push_pending(Outbound {
            state,
            applied_locally: true,
        });
        self.current = state;
        self.known = true;
        state
    }

    fn push_pending(&mut self, outbound: Outbound) {
        if self.pending.len() == MAX_PENDING {
            self.pending.pop_front();
        }
        self.pending.push_back(outbound);
    }
}
