//! Runtime configuration: built-in defaults, then an optional TOML file, then
//! `SETU_*` environment variables.

use crate::config::{LABELS, MAX_UPLOAD_BYTES};
use crate::torch::DeviceChoice;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Config file read from the working directory when none is given
pub const CONFIG_FILE: &str = "setu.toml";

/// Prefix of the environment variables that override the file
pub const ENV_PREFIX: &str = "SETU";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// TorchScript checkpoint. Has no default and must be configured.
    pub model_path: PathBuf,
    /// Class labels, in model output order
    pub labels: Vec<String>,
    pub device: DeviceChoice,
    pub max_upload_bytes: usize,
}

impl Settings {
    /// Load the settings. An explicitly named `file` must exist; the default
    /// `setu.toml` is optional.
    pub fn load(file: Option<&str>) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "localhost")?
            .set_default("port", 8000)?
            .set_default("labels", LABELS.to_vec())?
            .set_default("device", "auto")?
            .set_default("max_upload_bytes", MAX_UPLOAD_BYTES as i64)?
            .add_source(File::with_name(file.unwrap_or(CONFIG_FILE)).required(file.is_some()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("labels"),
            )
            .build()?
            .try_deserialize()
    }
}
