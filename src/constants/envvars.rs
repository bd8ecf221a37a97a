pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const DATA_DIR: &str = "NODE_DATA_DIR";

pub const MQTT_BROKER_HOST: &str = "MQTT_BROKER_HOST";
pub const MQTT_BROKER_PORT: &str = "MQTT_BROKER_PORT";
pub const MQTT_CLIENT_ID: &str = "MQTT_CLIENT_ID";
pub const MQTT_USERNAME: &str = "MQTT_USERNAME";
pub const MQTT_PASSWORD: &str = "MQTT_PASSWORD";
pub const MQTT_TOPIC_PREFIX: &str = "MQTT_TOPIC_PREFIX";
pub const MQTT_TOPIC_SUFFIX: &str = "MQTT_TOPIC_SUFFIX";

pub const API_PORT: &str = "API_PORT";
pub const PROVISION_TIMEOUT_SECS: &str = "PROVISION_TIMEOUT_SECS";
pub const CYCLE_INTERVAL_MS: &str = "CYCLE_INTERVAL_MS";
