mod kvs;
mod run;

pub use kvs::{kvs_get, kvs_set};
pub use run::run;
