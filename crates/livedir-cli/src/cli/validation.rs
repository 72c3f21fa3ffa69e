/// Parse a TCP port.
///
/// Port 0 is accepted and lets the OS pick a free port.
pub fn parse_port(s: &str) -> Result<u16, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("Port must be a number between 0 and 65535: '{}'", s));
    }

    s.parse::<u16>()
        .map_err(|_| format!("Port out of range (0-65535): '{}'", s))
}

/// Parse a directory name for the ignore set.
///
/// Names match one path component, so separators are rejected.
///
/// # Examples
///
/// Valid: `dist`, `.cache`, `target`
/// Invalid: `""`, `build/out`, `..`
pub fn parse_dir_name(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Directory name cannot be empty".to_string());
    }

    if s.contains('/') || s.contains('\\') {
        return Err(format!(
            "Ignore entries are single directory names, not paths: '{}'",
            s
        ));
    }

    if s == "." || s == ".." {
        return Err(format!("'{}' cannot be ignored", s));
    }

    Ok(s.to_string())
}

/// Parse a debounce interval in milliseconds. Zero is rejected.
pub fn parse_debounce_ms(s: &str) -> Result<u64, String> {
    match s.parse::<u64>() {
        Ok(0) => Err("Debounce interval must be at least 1 ms".to_string()),
        Ok(ms) => Ok(ms),
        Err(_) => Err(format!("Debounce interval must be a whole number of milliseconds: '{}'", s)),
    }
}
