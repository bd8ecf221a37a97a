pub mod api_server;
pub mod kvpath;
pub mod mqtt;
pub mod network;
pub mod system;
