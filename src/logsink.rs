use log::Level;

use crate::session::Session;

/// Writes diagnostics to the local log and, once bound, to the session log topic
#[derive(Debug, Default)]
pub struct LogSink {
    topic: Option<String>,
}

impl LogSink {
    pub fn new() -> Self {
        LogSink::default()
    }

    /// Called on every connect, the client id or affixes may have changed
    pub fn rebind(&mut self, topic: String) {
        self.topic = Some(topic);
    }

    pub fn emit(&self, level: Level, line: &str, session: &mut Session) {
        log::log!(level, "{line}");
        if let Some(topic) = &self.topic {
            session.publish_log(topic, line);
        }
    }
}
