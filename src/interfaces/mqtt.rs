use std::time::{Duration, Instant};

use rumqttc::{
    Client, ConnectReturnCode, Connection, ConnectionError, Event, MqttOptions, Packet, QoS,
    RecvTimeoutError,
};

use crate::constants::defaults;
use crate::session::{
    ConnectOptions, DisconnectReason, InboundMessage, Transport, TransportError, TransportEvent,
};

fn refusal_reason(code: ConnectReturnCode) -> DisconnectReason {
    match code {
        ConnectReturnCode::Success => DisconnectReason::ConnectFailed,
        ConnectReturnCode::RefusedProtocolVersion => DisconnectReason::BadProtocol,
        ConnectReturnCode::BadClientId => DisconnectReason::BadClientId,
        ConnectReturnCode::ServiceUnavailable => DisconnectReason::Unavailable,
        ConnectReturnCode::BadUserNamePassword => DisconnectReason::BadCredentials,
        ConnectReturnCode::NotAuthorized => DisconnectReason::Unauthorized,
    }
}

fn error_reason(err: &ConnectionError, connected: bool) -> DisconnectReason {
    match err {
        ConnectionError::NetworkTimeout | ConnectionError::FlushTimeout => DisconnectReason::Timeout,
        ConnectionError::ConnectionRefused(code) => refusal_reason(*code),
        ConnectionError::NotConnAck(_) => DisconnectReason::BadProtocol,
        ConnectionError::MqttState(_) if connected => DisconnectReason::ConnectionLost,
        ConnectionError::Io(_) if connected => DisconnectReason::ConnectionLost,
        _ => DisconnectReason::ConnectFailed,
    }
}

/// Encoded size of a QoS 0 PUBLISH: fixed header, remaining-length varint,
/// topic length prefix, topic and payload
fn publish_packet_size(topic: &str, payload: &[u8]) -> usize {
    let remaining = 2 + topic.len() + payload.len();
    let len_len = match remaining {
        0..=127 => 1,
        128..=16_383 => 2,
        16_384..=2_097_151 => 3,
        _ => 4,
    };
    1 + len_len + remaining
}

/// Blocking rumqttc client driven a bounded slice at a time
pub struct RumqttTransport {
    keep_alive: Duration,
    connect_timeout: Duration,
    max_packet_size: usize,
    link: Option<(Client, Connection)>,
}

impl RumqttTransport {
    pub fn new(keep_alive: Duration, connect_timeout: Duration) -> Self {
        RumqttTransport {
            keep_alive,
            connect_timeout,
            max_packet_size: defaults::MQTT_MAX_PACKET_SIZE,
            link: None,
        }
    }

    pub fn with_max_packet_size(mut self, max_packet_size: usize) -> Self {
        self.max_packet_size = max_packet_size;
        self
    }

    fn client(&mut self) -> Result<&mut Client, TransportError> {
        self.link
            .as_mut()
            .map(|(client, _)| client)
            .ok_or(TransportError::NotConnected)
    }
}

impl Default for RumqttTransport {
    fn default() -> Self {
        RumqttTransport::new(defaults::MQTT_KEEP_ALIVE, defaults::MQTT_CONNECT_TIMEOUT)
    }
}

impl Transport for RumqttTransport {
    fn connect(&mut self, options: &ConnectOptions) -> Result<(), DisconnectReason> {
        self.disconnect();

        let mut mqttoptions =
            MqttOptions::new(options.client_id.clone(), options.broker.clone(), options.port);
        mqttoptions.set_keep_alive(self.keep_alive);
        mqttoptions.set_clean_session(true);
        mqttoptions.set_max_packet_size(self.max_packet_size, self.max_packet_size);
        if let Some((username, password)) = &options.credentials {
            mqttoptions.set_credentials(username.clone(), password.clone());
        }
        if let Some(will) = &options.last_will {
            mqttoptions.set_last_will(rumqttc::LastWill::new(
                will.topic.clone(),
                will.payload.clone(),
                QoS::AtMostOnce,
                will.retain,
            ));
        }

        let (client, mut connection) = Client::new(mqttoptions, defaults::MQTT_CHANNEL_CAPACITY);
        let deadline = Instant::now() + self.connect_timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(DisconnectReason::Timeout);
            }
            match connection.recv_timeout(remaining) {
                Ok(Ok(Event::Incoming(Packet::ConnAck(ack)))) => {
                    if ack.code != ConnectReturnCode::Success {
                        return Err(refusal_reason(ack.code));
                    }
                    log::debug!("MQTT ConnAck received, session present: {}", ack.session_present);
                    self.link = Some((client, connection));
                    return Ok(());
                }
                Ok(Ok(event)) => log::trace!("Notification before ConnAck = {:?}", event),
                Ok(Err(e)) => {
                    log::debug!("MQTT connect error: {e}");
                    return Err(error_reason(&e, false));
                }
                Err(RecvTimeoutError::Timeout) => return Err(DisconnectReason::Timeout),
                Err(RecvTimeoutError::Disconnected) => return Err(DisconnectReason::ConnectFailed),
            }
        }
    }

    fn disconnect(&mut self) {
        if let Some((client, _)) = self.link.take() {
            if let Err(e) = client.try_disconnect() {
                log::trace!("MQTT disconnect request not queued: {e}");
            }
        }
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        log::info!("Subscribing to {}", topic);
        self.client()?
            .try_subscribe(topic, QoS::AtMostOnce)
            .map_err(|e| TransportError::Rejected(e.to_string()))
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), TransportError> {
        // The event loop drops the whole connection on an oversized packet
        let size = publish_packet_size(topic, payload);
        if size > self.max_packet_size {
            return Err(TransportError::PacketTooLarge {
                size,
                max: self.max_packet_size,
            });
        }
        log::debug!("Publishing to {}: {}", topic, String::from_utf8_lossy(payload));
        self.client()?
            .try_publish(topic, QoS::AtMostOnce, retain, payload.to_vec())
            .map_err(|e| TransportError::Rejected(e.to_string()))
    }

    fn poll(&mut self) -> Option<TransportEvent> {
        let (_, connection) = self.link.as_mut()?;
        loop {
            match connection.recv_timeout(defaults::MQTT_POLL_TIMEOUT) {
                Ok(Ok(Event::Incoming(Packet::Publish(p)))) => {
                    return Some(TransportEvent::Message(InboundMessage {
                        topic: p.topic,
                        payload: p.payload.to_vec(),
                    }))
                }
                Ok(Ok(Event::Incoming(Packet::Disconnect))) => {
                    return Some(TransportEvent::Lost(DisconnectReason::Disconnected))
                }
                Ok(Ok(event)) => log::trace!("Notification = {:?}", event),
                Ok(Err(e)) => {
                    log::debug!("MQTT connection error: {e}");
                    return Some(TransportEvent::Lost(error_reason(&e, true)));
                }
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => {
                    return Some(TransportEvent::Lost(DisconnectReason::ConnectionLost))
                }
            }
        }
    }
}
