//! State behind the natural-language date field.
//!
//! One temporal value is kept in three shapes: the raw text the user types,
//! the resolved wall-clock date-time, and the canonical ISO-8601 string the
//! owning form receives. [`TemporalInputState`] holds the reconciliation
//! rules between them and knows nothing about terminals or timers; the
//! debounce and rendering live in [`crate::component::date_input`].

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    SecondsFormat, TimeDelta, Timelike, Utc,
};
use serde::Deserialize;
use tracing::debug;

use super::natural_date::{self, DateParser, NaturalDateParser};

/// Time shown in the time editor when nothing is resolved yet.
pub const DEFAULT_TIME_TEXT: &str = "12:30:00";

/// How the canonical value handed to the owner is rendered.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, strum::Display, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CanonicalFormat {
    /// `2024-01-11T00:00:00.000Z`
    #[default]
    Utc,
    /// `2024-01-11T00:00:00.000`, wall clock without offset
    Local,
}

/// The value an owning form hands in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExternalValue {
    /// ISO-8601 (or anything the parser understands)
    Text(String),
    /// Milliseconds since the Unix epoch
    Timestamp(i64),
}

impl From<String> for ExternalValue {
    fn from(value: String) -> Self {
        ExternalValue::Text(value)
    }
}
impl From<&str> for ExternalValue {
    fn from(value: &str) -> Self {
        ExternalValue::Text(value.to_string())
    }
}
impl From<i64> for ExternalValue {
    fn from(value: i64) -> Self {
        ExternalValue::Timestamp(value)
    }
}

/// Who caused the latest value change.
///
/// `Internal` carries the canonical value the field just reported. When the
/// owner echoes exactly that value back, the tag is consumed and the raw
/// text is left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Origin {
    #[default]
    External,
    Internal(Option<String>),
}

/// A committed change the owner must be told about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueChange(pub Option<String>);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Same external value as before, nothing to do
    Unchanged,
    /// The owner echoed our own change back
    SelfEcho,
    /// A new value from outside replaced the field state
    Applied,
}

#[derive(Clone, Copy, Debug)]
pub struct TemporalSettings {
    pub show_time: bool,
    pub canonical: CanonicalFormat,
    /// Zone the wall-clock values live in
    pub zone: FixedOffset,
}

impl Default for TemporalSettings {
    fn default() -> Self {
        Self {
            show_time: false,
            canonical: CanonicalFormat::default(),
            zone: Local::now().offset().fix(),
        }
    }
}

#[derive(Debug)]
pub struct TemporalInputState {
    raw_text: String,
    resolved: Option<NaiveDateTime>,
    display_month: Option<NaiveDate>,
    external: Option<ExternalValue>,
    origin: Origin,

    settings: TemporalSettings,
    parser: Box<dyn DateParser>,
    /// Fixed "now", used by tests and the one-shot CLI
    reference: Option<DateTime<FixedOffset>>,
}

impl TemporalInputState {
    pub fn new(settings: TemporalSettings) -> Self {
        Self {
            raw_text: String::new(),
            resolved: None,
            display_month: None,
            external: None,
            origin: Origin::External,
            settings,
            parser: Box::new(NaturalDateParser),
            reference: None,
        }
    }

    #[cfg(test)]
    pub fn with_parser(mut self, parser: impl DateParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Pin "now". Wall-clock values then live in the reference's offset.
    pub fn with_reference(mut self, reference: DateTime<FixedOffset>) -> Self {
        self.settings.zone = *reference.offset();
        self.reference = Some(reference);
        self
    }

    /// Seed the state from the owner's value. This is the source of truth on
    /// (re)initialisation.
    pub fn with_external(mut self, value: Option<ExternalValue>) -> Self {
        self.apply_external(value);
        self
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn resolved(&self) -> Option<NaiveDateTime> {
        self.resolved
    }

    pub fn display_month(&self) -> Option<NaiveDate> {
        self.display_month
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn settings(&self) -> &TemporalSettings {
        &self.settings
    }

    /// The formatted resolved value, shown as the "Selected date" caption.
    pub fn display_text(&self) -> Option<String> {
        self.resolved.map(|dt| self.format_display(dt))
    }

    pub fn canonical(&self) -> Option<String> {
        self.resolved.and_then(|dt| self.canonical_of(dt))
    }

    /// `HH:MM:SS` of the resolved value, for the time editor.
    pub fn time_text(&self) -> String {
        self.resolved
            .map(|dt| dt.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| DEFAULT_TIME_TEXT.to_string())
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.reference
            .unwrap_or_else(|| Utc::now().with_timezone(&self.settings.zone))
    }

    /// Store what the user typed. Resolution happens later, in
    /// [`Self::resolve_pending`].
    pub fn edit_text<T: Into<String>>(&mut self, text: T) {
        self.raw_text = text.into();
    }

    /// Try to turn the raw text into a value.
    ///
    /// Empty text clears the value. Text the parser cannot read yet leaves
    /// everything untouched and reports nothing.
    pub fn resolve_pending(&mut self) -> Option<ValueChange> {
        if self.raw_text.trim().is_empty() {
            self.resolved = None;
            self.display_month = None;
            return Some(self.emit(None));
        }

        let Some(parsed) = self.parser.parse(&self.raw_text, self.now()) else {
            debug!(text = %self.raw_text, "text not resolvable yet");
            return None;
        };
        let parsed = if self.settings.show_time {
            parsed
        } else {
            parsed.date().and_time(NaiveTime::MIN)
        };
        let Some(canonical) = self.canonical_of(parsed) else {
            debug!(text = %self.raw_text, "resolved date out of range");
            return None;
        };
        debug!(text = %self.raw_text, resolved = %parsed, "resolved typed date");

        self.resolved = Some(parsed);
        self.display_month = Some(first_of_month(parsed.date()));
        Some(self.emit(Some(canonical)))
    }

    /// A day picked in the calendar, or `None` for "no date". A day with no
    /// UTC counterpart is ignored.
    pub fn select_date(&mut self, date: Option<NaiveDate>) -> Option<ValueChange> {
        let Some(date) = date else {
            self.resolved = None;
            self.display_month = None;
            self.raw_text.clear();
            return Some(self.emit(None));
        };

        let time = match (self.settings.show_time, self.resolved) {
            (true, Some(previous)) => previous.time(),
            _ => NaiveTime::MIN,
        };
        let dt = date.and_time(time);
        let canonical = self.canonical_of(dt)?;
        self.resolved = Some(dt);
        self.display_month = Some(first_of_month(date));
        self.raw_text = self.format_display(dt);
        Some(self.emit(Some(canonical)))
    }

    /// Apply an `HH:MM` or `HH:MM:SS` time to the resolved date.
    pub fn set_time_of_day(&mut self, text: &str) -> Option<ValueChange> {
        if !self.settings.show_time {
            return None;
        }
        let previous = self.resolved?;
        let time = parse_time_field(text.trim())?;
        let time = time.with_nanosecond(previous.nanosecond()).unwrap_or(time);

        let dt = previous.date().and_time(time);
        let canonical = self.canonical_of(dt)?;
        self.resolved = Some(dt);
        self.raw_text = self.format_display(dt);
        Some(self.emit(Some(canonical)))
    }

    /// Move the calendar. Never touches the resolved value.
    pub fn set_display_month(&mut self, month: NaiveDate) {
        self.display_month = Some(first_of_month(month));
    }

    /// The owner pushed a value in.
    pub fn sync_external(&mut self, value: Option<ExternalValue>) -> SyncOutcome {
        let origin = std::mem::take(&mut self.origin);
        if let Origin::Internal(emitted) = &origin {
            if matches_emitted(&value, emitted) {
                self.external = value;
                self.display_month = self.resolved.map(|dt| first_of_month(dt.date()));
                return SyncOutcome::SelfEcho;
            }
        }
        if value == self.external {
            return SyncOutcome::Unchanged;
        }
        self.apply_external(value);
        SyncOutcome::Applied
    }

    /// Forget everything, as when the owning form resets.
    pub fn reset(&mut self) {
        self.raw_text.clear();
        self.resolved = None;
        self.display_month = None;
        self.external = None;
        self.origin = Origin::External;
    }

    fn emit(&mut self, value: Option<String>) -> ValueChange {
        self.origin = Origin::Internal(value.clone());
        ValueChange(value)
    }

    fn apply_external(&mut self, value: Option<ExternalValue>) {
        let resolved = value
            .as_ref()
            .and_then(|v| self.value_to_date(v))
            .filter(|dt| self.canonical_of(*dt).is_some());
        self.resolved = resolved;
        self.display_month = resolved.map(|dt| first_of_month(dt.date()));
        self.raw_text = resolved
            .map(|dt| self.format_display(dt))
            .unwrap_or_default();
        self.external = value;
    }

    /// Malformed values degrade to `None`.
    fn value_to_date(&self, value: &ExternalValue) -> Option<NaiveDateTime> {
        match value {
            ExternalValue::Timestamp(0) => None,
            ExternalValue::Timestamp(ms) => DateTime::from_timestamp_millis(*ms)
                .and_then(|dt| natural_date::wall_clock(dt.naive_utc(), &self.settings.zone)),
            ExternalValue::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                natural_date::parse_iso(text, &self.settings.zone)
                    .or_else(|| self.parser.parse(text, self.now()))
            }
        }
    }

    fn format_display(&self, dt: NaiveDateTime) -> String {
        format_display(dt, self.settings.show_time)
    }

    /// `None` when the wall-clock value has no UTC counterpart.
    fn canonical_of(&self, dt: NaiveDateTime) -> Option<String> {
        match self.settings.canonical {
            CanonicalFormat::Utc => {
                let offset = TimeDelta::seconds(i64::from(self.settings.zone.local_minus_utc()));
                let utc = dt.checked_sub_signed(offset)?;
                Some(utc.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            CanonicalFormat::Local => Some(dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()),
        }
    }
}

/// `January 11, 2024`, or `January 11, 2024 at 02:30 PM` with time.
pub fn format_display(dt: NaiveDateTime, show_time: bool) -> String {
    if show_time {
        dt.format("%B %-d, %Y at %I:%M %p").to_string()
    } else {
        dt.format("%B %-d, %Y").to_string()
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn parse_time_field(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

fn matches_emitted(value: &Option<ExternalValue>, emitted: &Option<String>) -> bool {
    match (value, emitted) {
        (None, None) => true,
        (Some(ExternalValue::Text(text)), None) => text.is_empty(),
        (Some(ExternalValue::Text(text)), Some(emitted)) => text == emitted,
        _ => false,
    }
}
