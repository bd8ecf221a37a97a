use crate::constants::topics;

use super::settings::MqttSettings;

/// Topic namespace of one session: `[prefix/]<kind>/<clientId>[/suffix]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    prefix: Option<String>,
    client_id: String,
    suffix: Option<String>,
}

/// What an inbound topic addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Config,
    Command,
    Other,
}

impl Topics {
    pub fn from_settings(settings: &MqttSettings) -> Self {
        Topics {
            prefix: settings.topic_prefix().map(str::to_string),
            client_id: settings.client_id().to_string(),
            suffix: settings.topic_suffix().map(str::to_string),
        }
    }

    fn topic(&self, kind: &str) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(4);
        if let Some(prefix) = &self.prefix {
            parts.push(prefix);
        }
        parts.push(kind);
        parts.push(&self.client_id);
        if let Some(suffix) = &self.suffix {
            parts.push(suffix);
        }
        parts.join("/")
    }

    pub fn config(&self) -> String {
        self.topic(topics::CONFIG)
    }

    pub fn command(&self) -> String {
        self.topic(topics::COMMAND)
    }

    pub fn status(&self) -> String {
        self.topic(topics::STATUS)
    }

    pub fn telemetry(&self) -> String {
        self.topic(topics::TELEMETRY)
    }

    pub fn log(&self) -> String {
        self.topic(topics::LOG)
    }

    pub fn adopt(&self) -> String {
        format!("{}/{}", self.status(), topics::ADOPT_LEAF)
    }

    pub fn lwt(&self) -> String {
        format!("{}/{}", self.status(), topics::LWT_LEAF)
    }

    pub fn classify(&self, topic: &str) -> MessageKind {
        if topic == self.config() {
            MessageKind::Config
        } else if topic == self.command() {
            MessageKind::Command
        } else {
            MessageKind::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(prefix: &str, suffix: &str) -> MqttSettings {
        let mut settings = MqttSettings::default();
        settings.set_default_client_id("0b3d7e");
        settings.set_topic_prefix(prefix);
        settings.set_topic_suffix(suffix);
        settings
    }

    #[test]
    fn plain_topics() {
        let topics = Topics::from_settings(&settings("", ""));
        assert_eq!(topics.config(), "conf/0b3d7e");
        assert_eq!(topics.command(), "cmnd/0b3d7e");
        assert_eq!(topics.status(), "stat/0b3d7e");
        assert_eq!(topics.telemetry(), "tele/0b3d7e");
        assert_eq!(topics.log(), "log/0b3d7e");
        assert_eq!(topics.adopt(), "stat/0b3d7e/adopt");
        assert_eq!(topics.lwt(), "stat/0b3d7e/lwt");
    }

    #[test]
    fn prefixed_and_suffixed_topics() {
        let topics = Topics::from_settings(&settings("home", "lights"));
        assert_eq!(topics.config(), "home/conf/0b3d7e/lights");
        assert_eq!(topics.adopt(), "home/stat/0b3d7e/lights/adopt");
    }

    #[test]
    fn classification() {
        let topics = Topics::from_settings(&settings("home", ""));
        assert_eq!(topics.classify("home/conf/0b3d7e"), MessageKind::Config);
        assert_eq!(topics.classify("home/cmnd/0b3d7e"), MessageKind::Command);
        assert_eq!(topics.classify("conf/0b3d7e"), MessageKind::Other);
        assert_eq!(topics.classify("home/cmnd/0b3d7e/extra"), MessageKind::Other);
    }
}
