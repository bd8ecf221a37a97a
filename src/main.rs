mod argsets;
mod command;

use anyhow::{anyhow, Result};
use env_logger::Env;
use fieldnode::constants::{defaults, envvars};
use fieldnode::helpers::load_dotenv;

const CMD_RUN: &str = "run";
const CMD_KVS_GET: &str = "kvs-get";
const CMD_KVS_SET: &str = "kvs-set";

fn main() -> Result<()> {
    load_dotenv();
    env_logger::Builder::from_env(Env::default().filter_or(envvars::LOG_LEVEL, defaults::LOG_LEVEL))
        .init();

    let mut args = pico_args::Arguments::from_env();
    match args.subcommand()?.as_deref() {
        Some(CMD_RUN) => command::run(argsets::RunArgs {
            cycle_ms: args.opt_value_from_str("--cycle-ms")?,
        }),
        Some(CMD_KVS_GET) => command::kvs_get(argsets::KvsGetArgs {
            key: args.free_from_str()?,
        }),
        Some(CMD_KVS_SET) => command::kvs_set(argsets::KvsSetArgs {
            key: args.free_from_str()?,
            value: args.free_from_str()?,
        }),
        _ => Err(anyhow!(
            "Subcommand must be one of 'run', 'kvs-get', 'kvs-set'"
        )),
    }
}
