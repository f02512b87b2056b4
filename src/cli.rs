use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use color_eyre::Result;
use config::Source;

use crate::{
    config::{FieldConfig, get_config_dir, get_data_dir},
    libs::temporal::{CanonicalFormat, TemporalInputState, TemporalSettings, ValueChange},
};

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Tick rate, i.e. number of ticks per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 4.0)]
    pub tick_rate: f64,

    /// Frame rate, i.e. number of frames per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 60.0)]
    pub frame_rate: f64,

    /// Path to the data directory
    #[arg(short, long, value_name = "PATH")]
    pub data_dir: Option<String>,

    /// Quiet period after the last keystroke before typed text is resolved
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// How resolved values are reported to forms
    #[arg(long, value_enum)]
    pub canonical: Option<CanonicalFormat>,

    /// Show and edit the time of day in date fields
    #[arg(long)]
    pub show_time: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve text the way the date field does, print the canonical value
    /// and its display form
    Parse {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

const VERSION_MESSAGE: &str = concat!(env!("CARGO_PKG_VERSION"));

pub fn version() -> String {
    let author = clap::crate_authors!();

    let data_dir_path = get_data_dir().display().to_string();
    let config_dir_path = get_config_dir().display().to_string();

    format!(
        "\
{VERSION_MESSAGE}

Authors: {author}

Data directory: {data_dir_path}
Config directory: {config_dir_path}"
    )
}

/// One-shot resolution for `parse`: the canonical value and the display
/// text on two lines, or `unresolved`.
pub fn parse_report(
    text: &str,
    field: &FieldConfig,
    reference: Option<DateTime<FixedOffset>>,
) -> String {
    let settings = TemporalSettings {
        show_time: field.show_time,
        canonical: field.canonical,
        ..Default::default()
    };
    let mut state = TemporalInputState::new(settings);
    if let Some(reference) = reference {
        state = state.with_reference(reference);
    }
    state.edit_text(text);

    match state.resolve_pending() {
        Some(ValueChange(Some(canonical))) => {
            format!("{canonical}\n{}", state.display_text().unwrap_or_default())
        }
        _ => "unresolved".to_string(),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ClapSource {
    pub data_dir: Option<String>,
    pub debounce_ms: Option<u64>,
    pub canonical: Option<CanonicalFormat>,
    pub show_time: bool,
}

impl ClapSource {
    pub fn new(cli: &Cli) -> Self {
        Self {
            data_dir: cli.data_dir.clone(),
            debounce_ms: cli.debounce_ms,
            canonical: cli.canonical,
            show_time: cli.show_time,
        }
    }
}

impl Source for ClapSource {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut map = config::Map::new();
        if self.data_dir.is_some() {
            map.insert(
                "data_dir".to_string(),
                config::Value::new(None, self.data_dir.clone()),
            );
        }
        if let Some(ms) = self.debounce_ms {
            map.insert(
                "field.debounce_ms".to_string(),
                config::Value::new(None, ms as i64),
            );
        }
        if let Some(canonical) = self.canonical {
            map.insert(
                "field.canonical".to_string(),
                config::Value::new(None, canonical.to_string()),
            );
        }
        // a bare flag can only switch it on
        if self.show_time {
            map.insert(
                "field.show_time".to_string(),
                config::Value::new(None, true),
            );
        }
        Ok(map)
    }
}
