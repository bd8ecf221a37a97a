use thiserror::Error;

use super::reason::DisconnectReason;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("not connected to a broker")]
    NotConnected,
    #[error("request rejected by mqtt client: {0}")]
    Rejected(String),
    #[error("packet of {size} bytes exceeds the {max} byte limit")]
    PacketTooLarge { size: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastWill {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub broker: String,
    pub port: u16,
    pub client_id: String,
    pub credentials: Option<(String, String)>,
    pub last_will: Option<LastWill>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Message(InboundMessage),
    Lost(DisconnectReason),
}

/// Broker client the session drives. Calls must not block longer than the
/// client's own connect timeout.
pub trait Transport {
    fn connect(&mut self, options: &ConnectOptions) -> Result<(), DisconnectReason>;
    fn disconnect(&mut self);
    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), TransportError>;
    /// Next pending event, `None` when nothing is waiting
    fn poll(&mut self) -> Option<TransportEvent>;
}
