use thiserror::Error;

/// Why a session ended or never came up
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    #[error("mqtt connection timeout")]
    Timeout,
    #[error("mqtt connection lost")]
    ConnectionLost,
    #[error("mqtt connect failed")]
    ConnectFailed,
    #[error("mqtt disconnected")]
    Disconnected,
    #[error("mqtt bad protocol")]
    BadProtocol,
    #[error("mqtt bad client id")]
    BadClientId,
    #[error("mqtt unavailable")]
    Unavailable,
    #[error("mqtt bad credentials")]
    BadCredentials,
    #[error("mqtt unauthorised")]
    Unauthorized,
}

/// Outcome of routing one inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveStatus {
    Ok,
    EmptyPayload,
    JsonError,
    NoConfigHandler,
    NoCommandHandler,
}

impl ReceiveStatus {
    pub fn diagnostic(&self) -> Option<&'static str> {
        match self {
            ReceiveStatus::Ok => None,
            ReceiveStatus::EmptyPayload => Some("empty mqtt payload received"),
            ReceiveStatus::JsonError => Some("failed to deserialise mqtt json payload"),
            ReceiveStatus::NoConfigHandler => Some("no mqtt config handler"),
            ReceiveStatus::NoCommandHandler => Some("no mqtt command handler"),
        }
    }
}
