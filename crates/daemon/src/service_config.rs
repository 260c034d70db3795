use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the HTTP service to listen on (all interfaces)
    pub port: u16,

    // noun store configuration
    /// Directory holding the noun database,
    ///  if not set then an in-memory namespace is used
    pub db_path: Option<PathBuf>,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            db_path: None,
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}
