use std::time::Duration;

pub const LOG_LEVEL: &str = "info";

pub const MQTT_BROKER_PORT: u16 = 1883;
pub const MQTT_KEEP_ALIVE: Duration = Duration::from_secs(15);
pub const MQTT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const MQTT_POLL_TIMEOUT: Duration = Duration::from_millis(10);
pub const MQTT_CHANNEL_CAPACITY: usize = 32;
pub const MQTT_MAX_EVENTS_PER_CYCLE: usize = 16;
// Applies to whole packets, both directions
pub const MQTT_MAX_PACKET_SIZE: usize = 64 * 1024;

pub const API_PORT: u16 = 8080;
pub const CYCLE_INTERVAL: Duration = Duration::from_millis(50);
pub const PROVISION_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub const JSON_SCHEMA_VERSION: &str = "http://json-schema.org/draft-07/schema#";

// Exit status that tells the supervising service to start us again
pub const RESTART_EXIT_CODE: i32 = 75;
