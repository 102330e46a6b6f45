use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use fan_control::{Event, FanState, Publish};
use futures_util::StreamExt;
use log::{debug, error, info, trace};
use paho_mqtt::{self as mqtt, AsyncClient, MessageBuilder};
use tokio::sync::mpsc;
use tokio::time;
use transport::{Topic, Update};

use crate::{Error, Handle, Result};

/// Subscribed to every node for as long as it is alive.
pub struct Subscription {
    client: AsyncClient,
    topics: Vec<String>,
}

impl Subscription {
    pub async fn new(client: &AsyncClient) -> Result<Subscription> {
        let subscription = Subscription {
            client: client.clone(),
            topics: Topic::all().iter().map(Topic::to_string).collect(),
        };

        subscription.subscribe().await?;

        Ok(subscription)
    }

    async fn subscribe(&self) -> Result<()> {
        let qos = vec![mqtt::QOS_1; self.topics.len()];
        self.client.subscribe_many(&self.topics, &qos).await?;

        info!("Subscribed to topics: {:?}", self.topics);

        Ok(())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // the token is not awaited, the request is already on its way
        let _ = self.client.unsubscribe_many(&self.topics);

        info!("Unsubscribed from topics: {:?}", self.topics);
    }
}

/// Feeds broker updates into the session until the session ends.
pub async fn listen(mut mqtt: AsyncClient, handle: Handle) -> Result<()> {
    let mut stream = mqtt.get_stream(None);
    let subscription = Subscription::new(&mqtt).await?;
    let mut replays = Replays::default();

    while let Some(msg_opt) = stream.next().await {
        if let Some(msg) = msg_opt {
            trace!("got message {:?}", msg);

            if replays.is_replay(msg.topic(), msg.payload(), msg.retained()) {
                debug!("skipping retained replay on {}", msg.topic());
                continue;
            }

            let event = match decode(msg.topic(), msg.payload()) {
                Ok(event) => event,
                Err(err) => {
                    error!("unable to parse message on {}: {}", msg.topic(), err);
                    continue;
                }
            };

            if handle.send(event).is_err() {
                break;
            }
        } else {
            error!("Lost MQTT connection. Attempting reconnect.");
            let response = loop {
                match mqtt.reconnect().await {
                    Ok(response) => break response,
                    Err(err) => {
                        error!("Error MQTT reconnecting: {}", err);
                        time::sleep(Duration::from_secs(1)).await;
                    }
                }
            };

            // the broker keeps subscriptions of a persistent session
            let session_present = response
                .connect_response()
                .is_some_and(|connect| connect.session_present);

            if !session_present {
                if let Err(err) = subscription.subscribe().await {
                    error!("Error MQTT resubscribing: {}", err);
                }
            }
        }
    }

    debug!("listener stopped");

    Ok(())
}

/// Remembers the last payload seen per topic. Retained messages the broker
/// sends again on resubscription carry a value that was already applied.
#[derive(Debug, Default)]
struct Replays {
    last: HashMap<String, Vec<u8>>,
}

impl Replays {
    fn is_replay(&mut self, topic: &str, payload: &[u8], retained: bool) -> bool {
        let replay = retained
            && self
                .last
                .get(topic)
                .is_some_and(|last| last.as_slice() == payload);

        self.last.insert(topic.to_string(), payload.to_vec());

        replay
    }
}

fn decode(topic: &str, payload: &[u8]) -> Result<Event> {
    let topic = Topic::from_str(topic).map_err(|_| Error::UnknownTopic(topic.to_string()))?;
    let update = Update::decode(topic, payload)?;

    Ok(update.into())
}

/// Hands fan states over to [`publish_fan`].
pub struct Publisher {
    sender: mpsc::UnboundedSender<FanState>,
}

impl Publish for Publisher {
    fn publish(&mut self, state: FanState) {
        if self.sender.send(state).is_err() {
            error!("fan publisher has stopped, dropping {state:?}");
        }
    }
}

pub fn publisher() -> (Publisher, mpsc::UnboundedReceiver<FanState>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Publisher { sender }, receiver)
}

/// Writes every state as the retained value of the fan node. Failures are
/// logged and the state is dropped.
pub async fn publish_fan(mqtt: AsyncClient, mut states: mpsc::UnboundedReceiver<FanState>) {
    while let Some(state) = states.recv().await {
        let payload = match state.to_payload() {
            Ok(payload) => payload,
            Err(err) => {
                error!("Error serializing fan state: {err}");
                continue;
            }
        };

        let message = MessageBuilder::new()
            .topic(Topic::Fan.to_string())
            .payload(payload)
            .qos(mqtt::QOS_1)
            .retained(true)
            .finalize();

        match mqtt.publish(message).await {
            Ok(()) => debug!("published {state:?}"),
            Err(err) => error!("Error publishing {state:?}: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        assert_eq!(
            decode("presk/temperature", b"41").unwrap(),
            Event::Temperature(Some(41.0))
        );
        assert_eq!(
            decode("presk/fan", br#"{"speed":100,"mode":"auto"}"#).unwrap(),
            Event::Fan(Some(FanState::auto(100)))
        );
        assert_eq!(decode("presk/fan", b"").unwrap(), Event::Fan(None));
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            decode("presk/humidity", b"41"),
            Err(Error::UnknownTopic(topic)) if topic == "presk/humidity"
        ));
        assert!(matches!(
            decode("presk/fan", br#"{"speed":"fast"}"#),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_retained_replay_is_skipped() {
        let mut replays = Replays::default();

        assert!(!replays.is_replay("presk/temperature", b"23", true));
        assert!(replays.is_replay("presk/temperature", b"23", true));
        assert!(!replays.is_replay("presk/fan", b"23", true));

        // live messages always pass
        assert!(!replays.is_replay("presk/temperature", b"23", false));

        assert!(!replays.is_replay("presk/temperature", b"24", true));
        assert!(replays.is_replay("presk/temperature", b"24", true));
    }

    #[test]
    fn test_publisher() {
        let (mut publisher, mut states) = publisher();

        publisher.publish(FanState::manual(50));
        publisher.publish(FanState::auto(50));

        assert_eq!(states.try_recv().unwrap(), FanState::manual(50));
        assert_eq!(states.try_recv().unwrap(), FanState::auto(50));
        assert!(states.try_recv().is_err());
    }

    #[test]
    fn test_publisher_outlives_receiver() {
        let (mut publisher, states) = publisher();
        drop(states);

        publisher.publish(FanState::auto(0));
    }
}
