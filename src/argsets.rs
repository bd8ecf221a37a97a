pub struct RunArgs {
    pub cycle_ms: Option<u64>,
}

pub struct KvsGetArgs {
    pub key: String,
}

pub struct KvsSetArgs {
    pub key: String,
    pub value: String,
}
