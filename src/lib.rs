pub mod api;
pub mod config;
pub mod constants;
pub mod controller;
pub mod dispatch;
pub mod helpers;
pub mod interfaces;
pub mod logsink;
pub mod node_mgmt;
pub mod provision;
pub mod session;

pub use controller::{Controller, CoreError, Platform};
