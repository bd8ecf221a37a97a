use std::path::PathBuf;

use serde::Serialize;
use sysinfo::System;

use crate::constants::defaults;

/// Live resource counters reported in the adoption document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemCounters {
    pub memory_total_bytes: u64,
    pub memory_used_bytes: u64,
    pub memory_free_bytes: u64,
    pub memory_available_bytes: u64,
    pub uptime_seconds: u64,
    pub store_used_bytes: u64,
}

pub trait RuntimeInfo {
    fn counters(&self) -> SystemCounters;
}

pub trait SystemControl {
    /// Resets the device. Implementations are not expected to return.
    fn restart(&mut self);
}

/// Reads counters through `sysinfo`
pub struct HostRuntime {
    store_path: Option<PathBuf>,
}

impl HostRuntime {
    pub fn new(store_path: Option<PathBuf>) -> Self {
        HostRuntime { store_path }
    }
}

impl RuntimeInfo for HostRuntime {
    fn counters(&self) -> SystemCounters {
        let mut sys = System::new();
        sys.refresh_memory();

        let store_used_bytes = self
            .store_path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map_or(0, |m| m.len());

        SystemCounters {
            memory_total_bytes: sys.total_memory(),
            memory_used_bytes: sys.used_memory(),
            memory_free_bytes: sys.free_memory(),
            memory_available_bytes: sys.available_memory(),
            uptime_seconds: System::uptime(),
            store_used_bytes,
        }
    }
}

/// Exits the process so the service supervisor starts it again
pub struct ProcessRestart;

impl SystemControl for ProcessRestart {
    fn restart(&mut self) {
        log::warn!("Restarting on request");
        log::logger().flush();
        std::process::exit(defaults::RESTART_EXIT_CODE);
    }
}
