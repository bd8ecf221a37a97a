use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{defaults, envvars};
use crate::controller::Controller;

/// Settings taken from the environment by the `run` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub broker: Option<String>,
    pub broker_port: u16,
    pub client_id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub topic_prefix: Option<String>,
    pub topic_suffix: Option<String>,
    pub api_port: u16,
    pub provision_timeout: Option<Duration>,
    pub cycle_interval: Duration,
}

fn env_string(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(var: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env_string(var)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring invalid {var}={raw}: {e}");
            None
        }
    }
}

impl RunConfig {
    pub fn from_env() -> Self {
        RunConfig {
            broker: env_string(envvars::MQTT_BROKER_HOST),
            broker_port: env_parse(envvars::MQTT_BROKER_PORT).unwrap_or(defaults::MQTT_BROKER_PORT),
            client_id: env_string(envvars::MQTT_CLIENT_ID),
            username: env_string(envvars::MQTT_USERNAME),
            password: env::var(envvars::MQTT_PASSWORD).ok(),
            topic_prefix: env_string(envvars::MQTT_TOPIC_PREFIX),
            topic_suffix: env_string(envvars::MQTT_TOPIC_SUFFIX),
            api_port: env_parse(envvars::API_PORT).unwrap_or(defaults::API_PORT),
            provision_timeout: env_parse::<u64>(envvars::PROVISION_TIMEOUT_SECS)
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            cycle_interval: env_parse::<u64>(envvars::CYCLE_INTERVAL_MS)
                .map(Duration::from_millis)
                .unwrap_or(defaults::CYCLE_INTERVAL),
        }
    }

    /// Pushes the settings through the firmware-facing setters. Must run
    /// before `begin` so persisted settings still win.
    pub fn apply(&self, controller: &mut Controller) {
        if let Some(broker) = &self.broker {
            controller.set_mqtt_broker(broker, self.broker_port);
        }
        if let Some(client_id) = &self.client_id {
            controller.set_mqtt_client_id(client_id);
        }
        if let Some(username) = &self.username {
            controller.set_mqtt_auth(username, self.password.as_deref().unwrap_or(""));
        }
        if let Some(prefix) = &self.topic_prefix {
            controller.set_mqtt_topic_prefix(prefix);
        }
        if let Some(suffix) = &self.topic_suffix {
            controller.set_mqtt_topic_suffix(suffix);
        }
        controller.set_provision_timeout(self.provision_timeout);
    }
}
