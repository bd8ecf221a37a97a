use std::thread;
use std::time::Duration;

use anyhow::Result;
use fieldnode::config::RunConfig;
use fieldnode::dispatch::JsonHandler;
use fieldnode::interfaces::api_server::HttpListener;
use fieldnode::interfaces::kvpath;
use fieldnode::interfaces::mqtt::RumqttTransport;
use fieldnode::interfaces::network::HostNetwork;
use fieldnode::interfaces::system::{HostRuntime, ProcessRestart};
use fieldnode::node_mgmt::FirmwareInfo;
use fieldnode::{Controller, Platform};
use kvstore::KVDb;
use serde_json::{json, Value};

use crate::argsets::RunArgs;

fn open_store() -> Option<KVDb> {
    match KVDb::new(kvpath::SQLITE_STORE.as_path()) {
        Ok(store) => Some(store),
        Err(e) => {
            log::warn!("Settings store unavailable, running without it: {e}");
            None
        }
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = RunConfig::from_env();
    let cycle = args
        .cycle_ms
        .map(Duration::from_millis)
        .unwrap_or(config.cycle_interval);

    let listener = HttpListener::bind(("0.0.0.0", config.api_port))?;
    if let Some(addr) = listener.local_addr() {
        log::info!("Management API listening on {addr}");
    }

    let platform = Platform {
        link: Box::new(HostNetwork),
        transport: Box::new(RumqttTransport::default()),
        listener: Box::new(listener),
        runtime: Box::new(HostRuntime::new(Some(kvpath::SQLITE_STORE.clone()))),
        system: Box::new(ProcessRestart),
        store: open_store(),
    };
    let mut controller = Controller::new(FirmwareInfo::from_package(), platform);
    config.apply(&mut controller);

    controller.set_config_schema(&json!({
        "pollInterval": {"title": "Poll Interval (ms)", "type": "integer", "minimum": 10}
    }));
    controller.set_command_schema(&json!({
        "identify": {"title": "Identify", "type": "boolean"}
    }));

    let on_config: JsonHandler =
        Box::new(|json: &Value| log::info!("Config received: {json}"));
    let on_command: JsonHandler =
        Box::new(|json: &Value| log::info!("Command received: {json}"));
    controller.begin(Some(on_config), Some(on_command))?;
    log::info!("Running as {}", controller.client_id());

    loop {
        controller.cycle();
        thread::sleep(cycle);
    }
}
