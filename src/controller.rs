//! Top-level orchestration
//!
//! `Controller` owns every piece of runtime state. Startup order matters:
//! identity is resolved first, then the session gets its identity-derived
//! defaults, and only then does the management surface start and apply the
//! persisted settings that take precedence over both. No connection attempt
//! happens before the first [`Controller::cycle`].

use std::time::Duration;

use kvstore::KVDb;
use log::Level;
use serde_json::Value;
use thiserror::Error;

use crate::api::{ManagementSurface, Method, RequestListener, RouteHandler};
use crate::constants::defaults;
use crate::dispatch::{Dispatcher, JsonHandler};
use crate::interfaces::network::{NetworkError, NetworkLink};
use crate::interfaces::system::{RuntimeInfo, SystemControl};
use crate::logsink::LogSink;
use crate::node_mgmt::adoption::{self, AdoptionDocument};
use crate::node_mgmt::{FirmwareInfo, Identity, SchemaStore};
use crate::provision::{ProvisionState, Provisioner};
use crate::session::{Session, SessionEvent, SessionState, Transport};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("could not resolve device identity: {0}")]
    Identity(#[from] NetworkError),
    #[error("begin has already been called")]
    AlreadyStarted,
}

/// Platform services the controller runs on
pub struct Platform {
    pub link: Box<dyn NetworkLink>,
    pub transport: Box<dyn Transport>,
    pub listener: Box<dyn RequestListener>,
    pub runtime: Box<dyn RuntimeInfo>,
    pub system: Box<dyn SystemControl>,
    pub store: Option<KVDb>,
}

pub struct Controller {
    firmware: FirmwareInfo,
    link: Box<dyn NetworkLink>,
    runtime: Box<dyn RuntimeInfo>,
    identity: Option<Identity>,
    schemas: SchemaStore,
    session: Session,
    surface: ManagementSurface,
    dispatcher: Dispatcher,
    log_sink: LogSink,
    provisioner: Provisioner,
    started: bool,
}

fn adoption_document(
    firmware: &FirmwareInfo,
    runtime: &dyn RuntimeInfo,
    link: &dyn NetworkLink,
    identity: Option<&Identity>,
    schemas: &SchemaStore,
) -> AdoptionDocument {
    adoption::build(
        firmware,
        runtime.counters(),
        adoption::network_info(link.mode(), link.local_ip(), identity),
        schemas,
    )
}

impl Controller {
    pub fn new(firmware: FirmwareInfo, platform: Platform) -> Self {
        Controller {
            firmware,
            link: platform.link,
            runtime: platform.runtime,
            identity: None,
            schemas: SchemaStore::new(),
            session: Session::new(platform.transport),
            surface: ManagementSurface::new(platform.listener, platform.store),
            dispatcher: Dispatcher::new(platform.system),
            log_sink: LogSink::new(),
            provisioner: Provisioner::new(None),
            started: false,
        }
    }

    pub fn set_provision_timeout(&mut self, timeout: Option<Duration>) {
        self.provisioner.set_timeout(timeout);
    }

    /// Starts the device. Fails only when no identity can be formed.
    pub fn begin(
        &mut self,
        on_config: Option<JsonHandler>,
        on_command: Option<JsonHandler>,
    ) -> Result<(), CoreError> {
        if self.started {
            return Err(CoreError::AlreadyStarted);
        }
        self.dispatcher.set_handlers(on_config, on_command);

        let firmware = serde_json::to_string(&self.firmware).unwrap_or_default();
        log::info!("[core] firmware {firmware}");

        let identity = Identity::resolve(self.link.as_ref())?;
        log::info!("[core] mac address {identity}");
        self.identity = Some(identity);

        if self.provisioner.run(self.link.as_mut(), defaults::PROVISION_POLL_INTERVAL)
            == ProvisionState::Failed
        {
            log::warn!("[core] network provisioning failed, waiting for link");
        }
        let ip = adoption::network_info(self.link.mode(), self.link.local_ip(), None).ip;
        log::info!("[core] ip address {ip}");

        self.session
            .settings_mut()
            .set_default_client_id(&identity.default_client_id());
        self.surface.begin(self.session.settings_mut());

        self.started = true;
        Ok(())
    }

    /// One maintenance step. Does nothing before `begin` or while the link
    /// is down.
    pub fn cycle(&mut self) {
        if !self.started || !self.link.is_connected() {
            return;
        }

        for event in self.session.pump() {
            self.handle(event);
        }

        let firmware = &self.firmware;
        let runtime = self.runtime.as_ref();
        let link = self.link.as_ref();
        let identity = self.identity.as_ref();
        let schemas = &self.schemas;
        let served = self.surface.serve_one(|| {
            adoption_document(firmware, runtime, link, identity, schemas).to_value()
        });
        if let Err(e) = served {
            log::warn!("[core] management request failed: {e}");
        }
    }

    fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connected => {
                self.log_sink.rebind(self.session.topics().log());
                self.log_sink
                    .emit(Level::Info, "[core] mqtt connected", &mut self.session);
                let doc = self.adoption_document().to_value();
                if !self.session.publish_adopt(&doc) {
                    log::warn!("[core] could not publish adoption info");
                }
            }
            SessionEvent::Disconnected(reason) => {
                self.log_sink
                    .emit(Level::Warn, &format!("[core] {reason}"), &mut self.session);
            }
            SessionEvent::Message(msg) => {
                let status = self
                    .session
                    .receive(&msg.topic, &msg.payload, &mut self.dispatcher);
                if let Some(diagnostic) = status.diagnostic() {
                    self.log_sink
                        .emit(Level::Warn, &format!("[core] {diagnostic}"), &mut self.session);
                }
            }
        }
    }

    pub fn adoption_document(&self) -> AdoptionDocument {
        adoption_document(
            &self.firmware,
            self.runtime.as_ref(),
            self.link.as_ref(),
            self.identity.as_ref(),
            &self.schemas,
        )
    }

    pub fn set_config_schema(&mut self, fragment: &Value) {
        self.schemas.set_config_schema(fragment);
    }

    pub fn set_command_schema(&mut self, fragment: &Value) {
        self.schemas.set_command_schema(fragment);
    }

    pub fn set_mqtt_broker(&mut self, broker: &str, port: u16) {
        self.session.settings_mut().set_broker(broker, port);
    }

    /// An explicit id outranks the MAC-derived default set by `begin`, even
    /// when given before it. Persisted settings still override both.
    pub fn set_mqtt_client_id(&mut self, client_id: &str) {
        self.session.settings_mut().set_client_id(client_id);
    }

    pub fn set_mqtt_auth(&mut self, username: &str, password: &str) {
        self.session.settings_mut().set_auth(username, password);
    }

    pub fn set_mqtt_topic_prefix(&mut self, prefix: &str) {
        self.session.settings_mut().set_topic_prefix(prefix);
    }

    pub fn set_mqtt_topic_suffix(&mut self, suffix: &str) {
        self.session.settings_mut().set_topic_suffix(suffix);
    }

    /// Returns false, without touching the session, while the link is down
    pub fn publish_status(&mut self, json: &Value) -> bool {
        self.link.is_connected() && self.session.publish_status(json)
    }

    pub fn publish_telemetry(&mut self, json: &Value) -> bool {
        self.link.is_connected() && self.session.publish_telemetry(json)
    }

    pub fn api_get(&mut self, path: &str, handler: RouteHandler) {
        self.surface.register(Method::Get, path, handler);
    }

    pub fn api_post(&mut self, path: &str, handler: RouteHandler) {
        self.surface.register(Method::Post, path, handler);
    }

    /// Writes a firmware log line through the same sink as the core diagnostics
    pub fn log(&mut self, level: Level, line: &str) {
        self.log_sink.emit(level, line, &mut self.session);
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn client_id(&self) -> &str {
        self.session.settings().client_id()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}
