//! MQTT feed transport.
//!
//! The feed delivers opaque payloads: raw AIVDM sentences from receiver
//! gateways, or JSON objects from sources that pre-parse them. Nothing is
//! decoded here; payloads are handed to the pipeline as-is.

use tokio::sync::mpsc;
use tracing::{error, info};

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};

use crate::{config::MqttConfig, errors::AisDecoderError};

/// One payload received from the feed.
#[derive(Debug, Clone)]
pub struct FeedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// MQTT client for receiving AIS data
pub struct MqttClientBuilder {
    client: AsyncClient,
    event_loop: EventLoop,
    tx: mpsc::Sender<FeedMessage>,
    rx: mpsc::Receiver<FeedMessage>,
}

pub struct MqttClient {
    _client: AsyncClient,
    rx: mpsc::Receiver<FeedMessage>,
    _topics: Vec<String>,
    _handle: tokio::task::JoinHandle<Result<(), AisDecoderError>>,
}

impl MqttClientBuilder {
    /// Create a new MQTT client
    pub fn new(config: &MqttConfig) -> Result<Self, AisDecoderError> {
        config.validate()?;

        let mut mqtt_options =
            MqttOptions::new(config.client_id.as_str(), config.host.as_str(), config.port);
        mqtt_options.set_keep_alive(config.keep_alive);

        let (client, event_loop) = AsyncClient::new(mqtt_options, 100);

        // Create a channel for message passing
        let (tx, rx) = mpsc::channel(100);

        Ok(Self {
            client,
            event_loop,
            tx,
            rx,
        })
    }

    /// Connect to MQTT broker and subscribe to topics
    ///
    /// Note: Initial subscription needs not be done here, as it is done
    /// in the event loop.
    pub async fn connect(self, topics: &[String]) -> Result<MqttClient, AisDecoderError> {
        let topics = topics.to_vec();

        let _handle = tokio::spawn(Self::process_events(
            self.tx,
            self.event_loop,
            self.client.clone(), // Clone client for event loop
            topics.clone(),
        ));

        Ok(MqttClient {
            _client: self.client,
            rx: self.rx,
            _topics: topics,
            _handle,
        })
    }

    async fn subscribe(client: AsyncClient, topics: &[String]) -> Result<(), AisDecoderError> {
        for topic in topics.iter() {
            info!("Subscribing to topic: {}", topic);
            client.subscribe(topic, QoS::AtLeastOnce).await?;
        }
        Ok(())
    }

    /// Process MQTT events
    ///
    /// This function is responsible for handling incoming messages. The library
    /// `rumqttc` will automatically reconnect if connection is lost, but topic
    /// subscriptions need to be re-established. Therefore, also topic subscription
    /// is handled here.
    ///
    /// NOTE: If topic subscription fails, the loop will break and return an error.
    async fn process_events(
        tx: mpsc::Sender<FeedMessage>,
        mut event_loop: EventLoop,
        client: AsyncClient,
        topics: Vec<String>,
    ) -> Result<(), AisDecoderError> {
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("Connected to MQTT broker, subscribing to topics");
                    if let Err(e) = Self::subscribe(client.clone(), &topics).await {
                        error!("Failed to subscribe: {}", e);
                        break Err(e);
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let message = FeedMessage {
                        payload: publish.payload.to_vec(),
                        topic: publish.topic,
                    };
                    if let Err(e) = tx.send(message).await {
                        error!("Failed to forward feed payload: {}", e);
                    }
                }
                Err(e) => {
                    error!("MQTT Error: {}", e);
                    continue;
                }
                _ => continue,
            }
        }
    }
}

impl MqttClient {
    /// Receive next feed payload
    pub async fn recv(&mut self) -> Option<FeedMessage> {
        self.rx.recv().await
    }
}
