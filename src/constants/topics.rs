pub const CONFIG: &str = "conf";
pub const COMMAND: &str = "cmnd";
pub const STATUS: &str = "stat";
pub const TELEMETRY: &str = "tele";
pub const LOG: &str = "log";

// Appended to the status topic
pub const ADOPT_LEAF: &str = "adopt";
pub const LWT_LEAF: &str = "lwt";

pub const ADOPT_ROUTE: &str = "/adopt";
