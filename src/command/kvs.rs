use anyhow::{anyhow, Result};
use fieldnode::interfaces::kvpath;
use kvstore::KVDb;
use serde_json::{json, Value};

use crate::argsets::{KvsGetArgs, KvsSetArgs};

pub fn kvs_set(args: KvsSetArgs) -> Result<()> {
    let kvs = KVDb::new(kvpath::SQLITE_STORE.as_path())?;
    // Valid JSON is stored as is, anything else as a JSON string
    let value: Value = serde_json::from_str(&args.value).unwrap_or_else(|_| json!(args.value));
    kvs.set(&args.key, value)?;
    Ok(())
}

pub fn kvs_get(args: KvsGetArgs) -> Result<()> {
    let kvs = KVDb::new(kvpath::SQLITE_STORE.as_path())?;
    let value: Value = kvs
        .get(&args.key)?
        .ok_or_else(|| anyhow!("No value set for key '{}'", &args.key))?;
    match value.as_str() {
        Some(text) => print!("{text}"),
        None => print!("{value}"),
    }
    Ok(())
}
