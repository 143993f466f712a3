use clap::Parser;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Searched in this order when no file is given on the command line
const CONFIG_PATHS: [&str; 2] = ["config/envoy2prom.yaml", "envoy2prom.yaml"];

fn httpd_listen_default() -> String { return "127.0.0.1".to_string() }
fn httpd_port_default() -> u16 { return 2112 }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct HttpdConfig {
    #[serde(default="httpd_listen_default")]
    pub listen: String,
    #[serde(default="httpd_port_default")]
    pub port: u16,
}

fn envoy_target_default() -> String { return "envoy.local".to_string() }
fn envoy_timeout_default() -> u64 { return 10 }

#[derive(Deserialize, Serialize, Clone, PartialEq)]
pub struct EnvoyConfig {
    #[serde(default="envoy_target_default")]
    pub target: String,
    /// Either the token itself or the path of a file holding it
    #[serde(default)]
    pub token: String,
    /// Seconds a single request to the device may take
    #[serde(default="envoy_timeout_default")]
    pub timeout: u64,
}

impl EnvoyConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(1))
    }
}

// The token reference may be the token itself, keep it out of debug output
impl std::fmt::Debug for EnvoyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvoyConfig")
            .field("target", &self.target)
            .field("token", &if self.token.is_empty() { "<unset>" } else { "<set>" })
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn httpd_default() -> HttpdConfig { return HttpdConfig { listen: httpd_listen_default(), port: httpd_port_default() } }
fn envoy_default() -> EnvoyConfig { return EnvoyConfig { target: envoy_target_default(), token: String::new(), timeout: envoy_timeout_default() } }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default="httpd_default")]
    pub httpd: HttpdConfig,
    #[serde(default="envoy_default")]
    pub envoy: EnvoyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config { httpd: httpd_default(), envoy: envoy_default() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
}

/// Command line flags, each one overrides the matching config file entry
#[derive(Parser, Debug, Default)]
#[command(version, about = "Prometheus exporter for Enphase Envoy gateways")]
pub struct Cli {
    /// Config file, defaults to config/envoy2prom.yaml or envoy2prom.yaml if present
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// The address to listen on
    #[arg(long)]
    pub listen: Option<String>,
    /// The port to listen on
    #[arg(long)]
    pub port: Option<u16>,
    /// Host name or address of the Envoy
    #[arg(long)]
    pub target: Option<String>,
    /// A JWT from entrez.enphaseenergy.com, or the path of a file containing it
    #[arg(long)]
    pub token: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl Config {
    /// Reads `explicit` if given, otherwise the first existing file of
    /// [`CONFIG_PATHS`]. Without any file the defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match CONFIG_PATHS.iter().map(Path::new).find(|p| p.is_file()) {
                Some(p) => p.to_path_buf(),
                None => {
                    debug!("No config file found, using defaults");
                    return Ok(Config::default());
                }
            },
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Config::from_yaml(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        info!("Config loaded from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yml::Error> {
        // An empty document is a valid, if boring, config
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(listen) = &cli.listen {
            self.httpd.listen = listen.clone();
        }
        if let Some(port) = cli.port {
            self.httpd.port = port;
        }
        if let Some(target) = &cli.target {
            self.envoy.target = target.clone();
        }
        if let Some(token) = &cli.token {
            self.envoy.token = token.clone();
        }
        if let Some(timeout) = cli.timeout {
            self.envoy.timeout = timeout;
        }
    }
}
