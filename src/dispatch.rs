use serde_json::Value;

use crate::interfaces::system::SystemControl;

pub type JsonHandler = Box<dyn FnMut(&Value)>;

const RESTART_KEY: &str = "restart";

/// Hands inbound configuration and command payloads to the firmware,
/// intercepting built-in commands on the way.
pub struct Dispatcher {
    on_config: Option<JsonHandler>,
    on_command: Option<JsonHandler>,
    system: Box<dyn SystemControl>,
}

impl Dispatcher {
    pub fn new(system: Box<dyn SystemControl>) -> Self {
        Dispatcher {
            on_config: None,
            on_command: None,
            system,
        }
    }

    pub fn set_handlers(&mut self, on_config: Option<JsonHandler>, on_command: Option<JsonHandler>) {
        self.on_config = on_config;
        self.on_command = on_command;
    }

    pub fn has_config_handler(&self) -> bool {
        self.on_config.is_some()
    }

    pub fn has_command_handler(&self) -> bool {
        self.on_command.is_some()
    }

    pub fn dispatch_config(&mut self, json: &Value) {
        if let Some(handler) = self.on_config.as_mut() {
            handler(json);
        }
    }

    /// Built-in commands run first. The firmware handler always gets the
    /// full payload, reserved keys included, if the built-in returns.
    pub fn dispatch_command(&mut self, json: &Value) {
        if json.get(RESTART_KEY).and_then(Value::as_bool) == Some(true) {
            log::warn!("[core] restart requested");
            self.system.restart();
        }

        if let Some(handler) = self.on_command.as_mut() {
            handler(json);
        }
    }
}
