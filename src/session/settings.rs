use serde::{Deserialize, Serialize};

use crate::constants::defaults;

/// Broker address, credentials and topic namespace of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttSettings {
    broker: Option<String>,
    port: u16,
    client_id: Option<String>,
    default_client_id: String,
    username: Option<String>,
    password: Option<String>,
    topic_prefix: Option<String>,
    topic_suffix: Option<String>,
}

/// Session settings as stored in the persisted configuration.
/// Every field present overrides the running value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_suffix: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl Default for MqttSettings {
    fn default() -> Self {
        MqttSettings {
            broker: None,
            port: defaults::MQTT_BROKER_PORT,
            client_id: None,
            default_client_id: String::new(),
            username: None,
            password: None,
            topic_prefix: None,
            topic_suffix: None,
        }
    }
}

impl MqttSettings {
    pub fn set_broker(&mut self, broker: &str, port: u16) {
        self.broker = non_empty(broker);
        self.port = port;
    }

    /// An empty id clears the explicit value, falling back to the default
    pub fn set_client_id(&mut self, client_id: &str) {
        self.client_id = non_empty(client_id);
    }

    pub fn set_default_client_id(&mut self, client_id: &str) {
        self.default_client_id = client_id.to_string();
    }

    pub fn set_auth(&mut self, username: &str, password: &str) {
        self.username = non_empty(username);
        self.password = (!password.is_empty()).then(|| password.to_string());
    }

    pub fn set_topic_prefix(&mut self, prefix: &str) {
        self.topic_prefix = non_empty(prefix.trim_matches('/'));
    }

    pub fn set_topic_suffix(&mut self, suffix: &str) {
        self.topic_suffix = non_empty(suffix.trim_matches('/'));
    }

    pub fn apply(&mut self, persisted: &PersistedSettings) {
        if let Some(broker) = &persisted.broker {
            self.broker = non_empty(broker);
        }
        if let Some(port) = persisted.port {
            self.port = port;
        }
        if let Some(client_id) = &persisted.client_id {
            self.set_client_id(client_id);
        }
        if let Some(username) = &persisted.username {
            self.username = non_empty(username);
        }
        if let Some(password) = &persisted.password {
            self.password = (!password.is_empty()).then(|| password.clone());
        }
        if let Some(prefix) = &persisted.topic_prefix {
            self.set_topic_prefix(prefix);
        }
        if let Some(suffix) = &persisted.topic_suffix {
            self.set_topic_suffix(suffix);
        }
    }

    pub fn broker(&self) -> Option<&str> {
        self.broker.as_deref()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Explicit client id if set, otherwise the identity-derived default
    pub fn client_id(&self) -> &str {
        self.client_id.as_deref().unwrap_or(&self.default_client_id)
    }

    /// Username and password; a username without password sends an empty one
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.username
            .as_deref()
            .map(|user| (user, self.password.as_deref().unwrap_or("")))
    }

    pub fn topic_prefix(&self) -> Option<&str> {
        self.topic_prefix.as_deref()
    }

    pub fn topic_suffix(&self) -> Option<&str> {
        self.topic_suffix.as_deref()
    }
}
