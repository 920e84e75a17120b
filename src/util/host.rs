use tracing::warn;

/// Local host name, or `localhost` when it cannot be read.
pub fn hostname() -> String {
    match nix::unistd::gethostname() {
        Ok(name) => name.to_string_lossy().to_string(),
        Err(err) => {
            warn!(error = %err, "gethostname failed");
            "localhost".to_string()
        }
    }
}

/// Expands the `$(hostname)` placeholder used in repository locators.
pub fn expand_hostname(value: &str, hostname: &str) -> String {
    value.replace("$(hostname)", hostname)
}
