//! The single broker session of the device
//!
//! `Session` owns the connection state machine and the topic namespace. It is
//! pumped once per maintenance cycle and reports what happened as a list of
//! [`SessionEvent`]s; reacting to them (logging, adoption publish, dispatch)
//! is the caller's business.

mod reason;
mod settings;
mod topics;
mod transport;

use serde_json::{json, Value};

use crate::constants::defaults;
use crate::dispatch::Dispatcher;

pub use reason::{DisconnectReason, ReceiveStatus};
pub use settings::{MqttSettings, PersistedSettings};
pub use topics::{MessageKind, Topics};
pub use transport::{
    ConnectOptions, InboundMessage, LastWill, Transport, TransportError, TransportEvent,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected,
    Disconnected(DisconnectReason),
    Message(InboundMessage),
}

pub struct Session {
    settings: MqttSettings,
    state: SessionState,
    transport: Box<dyn Transport>,
    warned_no_broker: bool,
}

impl Session {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Session {
            settings: MqttSettings::default(),
            state: SessionState::Disconnected,
            transport,
            warned_no_broker: false,
        }
    }

    pub fn settings(&self) -> &MqttSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut MqttSettings {
        &mut self.settings
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn topics(&self) -> Topics {
        Topics::from_settings(&self.settings)
    }

    fn connect_options(&self, broker: &str, topics: &Topics) -> ConnectOptions {
        ConnectOptions {
            broker: broker.to_string(),
            port: self.settings.port(),
            client_id: self.settings.client_id().to_string(),
            credentials: self
                .settings
                .credentials()
                .map(|(user, pass)| (user.to_string(), pass.to_string())),
            last_will: Some(LastWill {
                topic: topics.lwt(),
                payload: json!({"online": false}).to_string().into_bytes(),
                retain: true,
            }),
        }
    }

    /// One maintenance step: connect when down, drain pending traffic when up.
    /// Only call while the network link is up.
    pub fn pump(&mut self) -> Vec<SessionEvent> {
        match self.state {
            SessionState::Connected => self.drain(),
            SessionState::Disconnected | SessionState::Connecting => self.try_connect(),
        }
    }

    fn try_connect(&mut self) -> Vec<SessionEvent> {
        let Some(broker) = self.settings.broker().map(str::to_string) else {
            if !self.warned_no_broker {
                log::warn!("[core] no mqtt broker configured, not connecting");
                self.warned_no_broker = true;
            }
            return Vec::new();
        };

        let topics = self.topics();
        let options = self.connect_options(&broker, &topics);
        log::info!(
            "[core] connecting to mqtt broker {}:{} as {}",
            options.broker,
            options.port,
            options.client_id
        );

        self.state = SessionState::Connecting;
        if let Err(reason) = self.transport.connect(&options) {
            self.state = SessionState::Disconnected;
            return vec![SessionEvent::Disconnected(reason)];
        }

        for topic in [topics.config(), topics.command()] {
            if let Err(e) = self.transport.subscribe(&topic) {
                log::warn!("[core] could not subscribe to {topic}: {e}");
                self.transport.disconnect();
                self.state = SessionState::Disconnected;
                return vec![SessionEvent::Disconnected(DisconnectReason::ConnectionLost)];
            }
        }
        self.state = SessionState::Connected;

        let online = json!({"online": true}).to_string();
        if let Err(e) = self.transport.publish(&topics.lwt(), online.as_bytes(), true) {
            log::warn!("[core] could not publish online status: {e}");
        }
        vec![SessionEvent::Connected]
    }

    fn drain(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for _ in 0..defaults::MQTT_MAX_EVENTS_PER_CYCLE {
            match self.transport.poll() {
                None => break,
                Some(TransportEvent::Message(msg)) => events.push(SessionEvent::Message(msg)),
                Some(TransportEvent::Lost(reason)) => {
                    self.transport.disconnect();
                    self.state = SessionState::Disconnected;
                    events.push(SessionEvent::Disconnected(reason));
                    break;
                }
            }
        }
        events
    }

    /// Classifies and routes one inbound message.
    ///
    /// The topic decides the kind before the payload is looked at; an empty
    /// payload is rejected before any parse is attempted.
    pub fn receive(&self, topic: &str, payload: &[u8], dispatcher: &mut Dispatcher) -> ReceiveStatus {
        let kind = self.topics().classify(topic);

        if payload.is_empty() {
            return ReceiveStatus::EmptyPayload;
        }
        if kind == MessageKind::Other {
            log::debug!("[core] ignoring message on unroutable topic {topic}");
            return ReceiveStatus::Ok;
        }

        let json: Value = match serde_json::from_slice(payload) {
            Ok(json) => json,
            Err(e) => {
                log::debug!("[core] payload on {topic} is not json: {e}");
                return ReceiveStatus::JsonError;
            }
        };

        match kind {
            MessageKind::Config if !dispatcher.has_config_handler() => ReceiveStatus::NoConfigHandler,
            MessageKind::Config => {
                dispatcher.dispatch_config(&json);
                ReceiveStatus::Ok
            }
            MessageKind::Command if !dispatcher.has_command_handler() => {
                // Built-in commands still apply
                dispatcher.dispatch_command(&json);
                ReceiveStatus::NoCommandHandler
            }
            MessageKind::Command => {
                dispatcher.dispatch_command(&json);
                ReceiveStatus::Ok
            }
            MessageKind::Other => ReceiveStatus::Ok,
        }
    }

    fn publish_json(&mut self, topic: &str, json: &Value, retain: bool) -> bool {
        if !self.is_connected() {
            return false;
        }
        match self.transport.publish(topic, json.to_string().as_bytes(), retain) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("[core] publish to {topic} failed: {e}");
                false
            }
        }
    }

    pub fn publish_status(&mut self, json: &Value) -> bool {
        let topic = self.topics().status();
        self.publish_json(&topic, json, false)
    }

    pub fn publish_telemetry(&mut self, json: &Value) -> bool {
        let topic = self.topics().telemetry();
        self.publish_json(&topic, json, false)
    }

    pub fn publish_adopt(&mut self, json: &Value) -> bool {
        let topic = self.topics().adopt();
        self.publish_json(&topic, json, true)
    }

    /// Publishes a raw log line; used by the log sink
    pub fn publish_log(&mut self, topic: &str, line: &str) -> bool {
        self.is_connected() && self.transport.publish(topic, line.as_bytes(), false).is_ok()
    }
}
