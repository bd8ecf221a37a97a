// Persisted session settings, see `session::PersistedSettings`
pub const MQTT: &str = "mqtt";
