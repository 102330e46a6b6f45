use serde::de::DeserializeOwned;

use crate::{FanState, Topic};

/// A value received on one of the subscribed nodes. `None` means the node
/// holds no value yet.
#[derive(Clone, Debug, PartialEq)]
pub enum Update {
    Temperature(Option<f64>),
    Fan(Option<FanState>),
}

impl Update {
    pub fn decode(topic: Topic, payload: &[u8]) -> serde_json::Result<Update> {
        match topic {
            Topic::Temperature => decode_node(payload).map(Update::Temperature),
            Topic::Fan => decode_node(payload).map(Update::Fan),
        }
    }
}

// An empty retained message is how a node gets cleared on the broker.
fn decode_node<T: DeserializeOwned>(payload: &[u8]) -> serde_json::Result<Option<T>> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(payload)
}
