pub fn default_port() -> u16 {
    8080
}

pub fn default_debounce_ms() -> u64 {
    100
}

pub fn default_sse_path() -> String {
    "/sse".to_string()
}

pub fn default_shutdown_timeout_secs() -> u64 {
    10
}
