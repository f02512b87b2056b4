use std::{env, path::PathBuf};

use chrono::NaiveDate;
use color_eyre::{Result, eyre::Context};
use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::Deserialize;

use crate::{
    component::{calendar::CalendarBounds, date_input::DEFAULT_PLACEHOLDER},
    libs::temporal::CanonicalFormat,
};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

/// Defaults for every date field the app builds.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FieldConfig {
    /// Quiet period after the last keystroke before the text is resolved
    pub debounce_ms: u64,
    pub placeholder: String,
    pub canonical: CanonicalFormat,
    pub show_time: bool,
    pub disabled_after: NaiveDate,
    pub start_month: NaiveDate,
    pub end_month: NaiveDate,
}

impl Default for FieldConfig {
    fn default() -> Self {
        let bounds = CalendarBounds::default();
        Self {
            debounce_ms: 200,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            canonical: CanonicalFormat::default(),
            show_time: false,
            disabled_after: bounds.disabled_after,
            start_month: bounds.start_month,
            end_month: bounds.end_month,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub field: FieldConfig,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
}

const CONFIG_FILES: [(&str, config::FileFormat); 3] = [
    ("config.json5", config::FileFormat::Json5),
    ("config.yaml", config::FileFormat::Yaml),
    ("config.toml", config::FileFormat::Toml),
];

impl Config {
    /// Layered config: built-in defaults, then config files in the config
    /// directory, then `<CRATE>_*` environment variables, then the command
    /// line.
    pub fn new(cli_source: Option<crate::cli::ClapSource>) -> Result<Self> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let field = FieldConfig::default();

        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .set_default("field.debounce_ms", field.debounce_ms as i64)?
            .set_default("field.placeholder", field.placeholder)?
            .set_default("field.canonical", field.canonical.to_string())?
            .set_default("field.show_time", field.show_time)?
            .set_default("field.disabled_after", field.disabled_after.to_string())?
            .set_default("field.start_month", field.start_month.to_string())?
            .set_default("field.end_month", field.end_month.to_string())?;

        for (file, format) in CONFIG_FILES {
            builder = builder.add_source(
                config::File::from(config_dir.join(file))
                    .format(format)
                    .required(false),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(PROJECT_NAME.as_str())
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Add CLI source last (highest priority)
        if let Some(cli_source) = cli_source {
            builder = builder.add_source(cli_source);
        }

        let cfg: Self = builder
            .build()
            .context("Error building config")?
            .try_deserialize()
            .context("Error deserialize config")?;

        Ok(cfg)
    }
}

pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = env::var(format!("{}_DATA", PROJECT_NAME.clone()))
        .ok()
        .map(PathBuf::from)
    {
        dir
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(dir) = env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
        .ok()
        .map(PathBuf::from)
    {
        dir
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "yyang", env!("CARGO_PKG_NAME"))
}
