//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and the `WR_*`
//! environment variables, and merging them with proper precedence rules.

use crate::error::WhoisError;
use crate::types::LookupConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Address the HTTP frontend listens on when nothing else is configured.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Highest accepted concurrency value.
pub const MAX_CONCURRENCY: usize = 50;

/// Configuration loaded from TOML files.
///
/// ```toml
/// [lookup]
/// timeout = "5s"
/// root_server = "whois.iana.org"
/// concurrency = 8
///
/// [server]
/// bind = "127.0.0.1:8080"
///
/// [output]
/// json = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Lookup settings shared by every frontend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<LookupSection>,

    /// HTTP frontend settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// CLI output preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// `[lookup]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LookupSection {
    /// Per-operation deadline (as string, e.g., "3s", "500ms", "1m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_server: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Listen address, e.g. "127.0.0.1:8080"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Print JSON objects instead of raw responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    /// Pretty-print JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_pretty: Option<bool>,

    /// Print the parsed record after the raw response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<bool>,
}

impl FileConfig {
    /// Overlay the `[lookup]` values of this file onto `config`.
    ///
    /// Values were checked when the file was loaded, so an unparsable timeout
    /// can only come from a hand-built `FileConfig` and is skipped.
    pub fn apply_to(&self, mut config: LookupConfig) -> LookupConfig {
        if let Some(lookup) = &self.lookup {
            if let Some(timeout) = lookup.timeout.as_deref().and_then(parse_timeout_string) {
                config = config.with_timeout(timeout);
            }
            if let Some(root_server) = &lookup.root_server {
                config = config.with_root_server(root_server.clone());
            }
            if let Some(port) = lookup.port {
                config = config.with_port(port);
            }
            if let Some(concurrency) = lookup.concurrency {
                config = config.with_concurrency(concurrency);
            }
        }
        config
    }

    /// Configured bind address, if any.
    pub fn bind(&self) -> Option<&str> {
        self.server.as_ref().and_then(|s| s.bind.as_deref())
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to report which config files were used
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error if reading, parsing or
    /// validation fails.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, WhoisError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(WhoisError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            WhoisError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config < home config < local config. Files that are missing or
    /// fail to load are skipped.
    pub fn discover_and_load(&self) -> Result<FileConfig, WhoisError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => {
                    if self.verbose {
                        eprintln!("⚠️  Skipping {}: {}", path.display(), e);
                    }
                }
            }
        }

        if self.verbose && !loaded_files.is_empty() {
            eprintln!("🔧 Config files (later entries win):");
            for path in &loaded_files {
                eprintln!("   {}", path.display());
            }
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./whois-refer.toml", "./.whois-refer.toml"];

        candidates
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Get the home directory configuration file path.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let path = Path::new(&home).join(".whois-refer.toml");
        path.exists().then_some(path)
    }

    /// Get the XDG configuration file path.
    ///
    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("whois-refer").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`, field
    /// by field.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            lookup: match (lower.lookup, higher.lookup) {
                (Some(lower_lookup), Some(higher_lookup)) => Some(LookupSection {
                    timeout: higher_lookup.timeout.or(lower_lookup.timeout),
                    root_server: higher_lookup.root_server.or(lower_lookup.root_server),
                    port: higher_lookup.port.or(lower_lookup.port),
                    concurrency: higher_lookup.concurrency.or(lower_lookup.concurrency),
                }),
                (lower_lookup, higher_lookup) => higher_lookup.or(lower_lookup),
            },
            server: match (lower.server, higher.server) {
                (Some(lower_server), Some(higher_server)) => Some(ServerConfig {
                    bind: higher_server.bind.or(lower_server.bind),
                }),
                (lower_server, higher_server) => higher_server.or(lower_server),
            },
            output: match (lower.output, higher.output) {
                (Some(lower_output), Some(higher_output)) => Some(OutputConfig {
                    json: higher_output.json.or(lower_output.json),
                    json_pretty: higher_output.json_pretty.or(lower_output.json_pretty),
                    records: higher_output.records.or(lower_output.records),
                }),
                (lower_output, higher_output) => higher_output.or(lower_output),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), WhoisError> {
        if let Some(lookup) = &config.lookup {
            if let Some(timeout_str) = &lookup.timeout {
                match parse_timeout_string(timeout_str) {
                    None => {
                        return Err(WhoisError::config(format!(
                            "Invalid timeout format '{}'. Use format like '3s', '500ms', '1m'",
                            timeout_str
                        )));
                    }
                    Some(timeout) if timeout.is_zero() => {
                        return Err(WhoisError::config("Timeout must be greater than zero"));
                    }
                    Some(_) => {}
                }
            }

            if let Some(concurrency) = lookup.concurrency {
                if concurrency == 0 || concurrency > MAX_CONCURRENCY {
                    return Err(WhoisError::config(format!(
                        "Concurrency must be between 1 and {}",
                        MAX_CONCURRENCY
                    )));
                }
            }

            if lookup.port == Some(0) {
                return Err(WhoisError::config("Port must be greater than zero"));
            }

            if let Some(root_server) = &lookup.root_server {
                if root_server.trim().is_empty() {
                    return Err(WhoisError::config("Root server cannot be empty"));
                }
            }
        }

        if let Some(bind) = config.bind() {
            if bind.trim().is_empty() {
                return Err(WhoisError::config("Server bind address cannot be empty"));
            }
        }

        Ok(())
    }
}

/// Environment variable configuration.
///
/// This represents configuration values that can be set via `WR_*`
/// environment variables. They override config files and are overridden by
/// command-line flags.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub timeout: Option<Duration>,
    pub root_server: Option<String>,
    pub port: Option<u16>,
    pub concurrency: Option<usize>,
    pub bind: Option<String>,
    pub json: Option<bool>,
    pub config: Option<String>,
}

impl EnvConfig {
    /// Overlay the lookup-related variables onto `config`.
    pub fn apply_to(&self, mut config: LookupConfig) -> LookupConfig {
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        if let Some(root_server) = &self.root_server {
            config = config.with_root_server(root_server.clone());
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        config
    }
}

/// Load configuration from environment variables.
///
/// Parses all `WR_*` environment variables. Invalid values are ignored and,
/// when `verbose` is set, reported on stderr.
pub fn load_env_config(verbose: bool) -> EnvConfig {
    let mut env_config = EnvConfig::default();

    // WR_TIMEOUT - per-operation deadline
    if let Ok(timeout_str) = env::var("WR_TIMEOUT") {
        match parse_timeout_string(&timeout_str) {
            Some(timeout) if !timeout.is_zero() => {
                env_config.timeout = Some(timeout);
                report_used(verbose, "WR_TIMEOUT", &timeout_str);
            }
            _ => report_invalid(verbose, "WR_TIMEOUT", &timeout_str, "use format like '3s', '500ms', '1m'"),
        }
    }

    // WR_ROOT_SERVER - root authority host
    if let Ok(root_server) = env::var("WR_ROOT_SERVER") {
        if !root_server.trim().is_empty() {
            report_used(verbose, "WR_ROOT_SERVER", &root_server);
            env_config.root_server = Some(root_server.trim().to_string());
        }
    }

    // WR_PORT - port for both hops
    if let Ok(val) = env::var("WR_PORT") {
        match val.trim().parse::<u16>() {
            Ok(port) if port > 0 => {
                env_config.port = Some(port);
                report_used(verbose, "WR_PORT", &val);
            }
            _ => report_invalid(verbose, "WR_PORT", &val, "must be 1-65535"),
        }
    }

    // WR_CONCURRENCY - lookups in flight
    if let Ok(val) = env::var("WR_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(concurrency) if concurrency > 0 && concurrency <= MAX_CONCURRENCY => {
                env_config.concurrency = Some(concurrency);
                report_used(verbose, "WR_CONCURRENCY", &val);
            }
            _ => report_invalid(verbose, "WR_CONCURRENCY", &val, "must be 1-50"),
        }
    }

    // WR_BIND - HTTP listen address
    if let Ok(bind) = env::var("WR_BIND") {
        if !bind.trim().is_empty() {
            report_used(verbose, "WR_BIND", &bind);
            env_config.bind = Some(bind.trim().to_string());
        }
    }

    // WR_JSON - JSON output
    if let Ok(val) = env::var("WR_JSON") {
        match parse_bool(&val) {
            Some(json) => {
                env_config.json = Some(json);
                report_used(verbose, "WR_JSON", &val);
            }
            None => report_invalid(verbose, "WR_JSON", &val, "use true/false"),
        }
    }

    // WR_CONFIG - explicit config file
    if let Ok(config_path) = env::var("WR_CONFIG") {
        if !config_path.trim().is_empty() {
            report_used(verbose, "WR_CONFIG", &config_path);
            env_config.config = Some(config_path);
        }
    }

    env_config
}

fn report_used(verbose: bool, name: &str, value: &str) {
    if verbose {
        eprintln!("🔧 Using {}={}", name, value);
    }
}

fn report_invalid(verbose: bool, name: &str, value: &str, hint: &str) {
    if verbose {
        eprintln!("⚠️ Invalid {}='{}', {}", name, value, hint);
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a timeout string like "500ms", "3s", "2m" into a duration.
///
/// A bare number is taken as seconds. Returns `None` if parsing fails.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    if let Some(ms) = timeout_str.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        timeout_str.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout_string("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_timeout_string(" 3 "), Some(Duration::from_secs(3)));
        assert_eq!(parse_timeout_string("invalid"), None);
        assert_eq!(parse_timeout_string("-1s"), None);
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[lookup]
timeout = "5s"
root_server = "whois.example.net"
concurrency = 8

[server]
bind = "127.0.0.1:9000"

[output]
json = true
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();

        let lookup = config.lookup.as_ref().unwrap();
        assert_eq!(lookup.timeout.as_deref(), Some("5s"));
        assert_eq!(lookup.port, None);
        assert_eq!(config.bind(), Some("127.0.0.1:9000"));
        assert_eq!(config.output.as_ref().unwrap().json, Some(true));

        let applied = config.apply_to(LookupConfig::default());
        assert_eq!(applied.timeout, Duration::from_secs(5));
        assert_eq!(applied.root_server, "whois.example.net");
        assert_eq!(applied.port, 43);
        assert_eq!(applied.concurrency, 8);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let manager = ConfigManager::new(false);

        for content in [
            "[lookup]\nconcurrency = 0\n",
            "[lookup]\nconcurrency = 51\n",
            "[lookup]\nport = 0\n",
            "[lookup]\ntimeout = \"0s\"\n",
            "[lookup]\ntimeout = \"soon\"\n",
            "[lookup]\nroot_server = \"  \"\n",
        ] {
            let temp_file = write_config(content);
            let result = manager.load_file(temp_file.path());
            assert!(
                matches!(result, Err(WhoisError::Config { .. })),
                "{:?} should be rejected",
                content
            );
        }
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let temp_file = write_config("[lookup\n");
        let result = ConfigManager::new(false).load_file(temp_file.path());
        assert!(matches!(result, Err(WhoisError::Config { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigManager::new(false).load_file("/nonexistent/whois-refer.toml");
        assert!(matches!(result, Err(WhoisError::File { .. })));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            lookup: Some(LookupSection {
                timeout: Some("10s".to_string()),
                root_server: Some("whois.lower.example".to_string()),
                ..Default::default()
            }),
            server: Some(ServerConfig {
                bind: Some("0.0.0.0:80".to_string()),
            }),
            output: None,
        };

        let higher = FileConfig {
            lookup: Some(LookupSection {
                root_server: Some("whois.higher.example".to_string()),
                concurrency: Some(2),
                ..Default::default()
            }),
            server: None,
            output: Some(OutputConfig {
                records: Some(true),
                ..Default::default()
            }),
        };

        let merged = manager.merge_configs(lower, higher);
        let lookup = merged.lookup.as_ref().unwrap();

        assert_eq!(lookup.timeout.as_deref(), Some("10s"));
        assert_eq!(lookup.root_server.as_deref(), Some("whois.higher.example"));
        assert_eq!(lookup.concurrency, Some(2));
        assert_eq!(merged.bind(), Some("0.0.0.0:80"));
        assert_eq!(merged.output.unwrap().records, Some(true));
    }

    #[test]
    fn test_env_config() {
        env::set_var("WR_TIMEOUT", "750ms");
        env::set_var("WR_PORT", "4343");
        env::set_var("WR_CONCURRENCY", "500");
        env::set_var("WR_JSON", "yes");

        let env_config = load_env_config(false);

        env::remove_var("WR_TIMEOUT");
        env::remove_var("WR_PORT");
        env::remove_var("WR_CONCURRENCY");
        env::remove_var("WR_JSON");

        assert_eq!(env_config.timeout, Some(Duration::from_millis(750)));
        assert_eq!(env_config.port, Some(4343));
        assert_eq!(env_config.concurrency, None);
        assert_eq!(env_config.json, Some(true));

        let applied = env_config.apply_to(LookupConfig::default());
        assert_eq!(applied.port, 4343);
        assert_eq!(applied.concurrency, 4);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
