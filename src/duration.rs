// src/duration.rs
//
// Canonical duration handling for the "HH.MM" display format. Every place a
// duration is shown or edited goes through this codec, so display strings and
// decimal-hours values always agree.
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::fmt;
use thiserror::Error;

/// Grammar: 1-2 hour digits, a dot, 1-2 minute digits. One-digit minutes are
/// permitted, so "8.5" reads as 8 hours 5 minutes.
static DISPLAY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}\.\d{1,2}$").expect("static pattern must compile"));

pub const MAX_HOURS: u32 = 24;
pub const MAX_MINUTES: u32 = 59;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("duration {input:?} does not match the HH.MM pattern")]
    InvalidFormat { input: String },
    #[error("{hours:02}.{minutes:02} is out of range: hours must be at most 24 (24 only with 00 minutes) and minutes at most 59")]
    InvalidTimeRange { hours: u32, minutes: u32 },
    #[error("decimal hours {value} is outside the 0..=24 range")]
    ValueOutOfRange { value: Decimal },
}

/// A duration as canonical decimal hours: always within 0..=24 and rounded to
/// two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DurationValue(Decimal);

impl DurationValue {
    /// Parses a display string against the HH.MM grammar.
    ///
    /// The input is first normalized to digits-and-dot only, then validated
    /// in order: hours above 24, hours equal to 24 with nonzero minutes, and
    /// minutes above 59 are all rejected as out of range.
    pub fn parse(display: &str) -> Result<Self, DurationError> {
        let normalized = normalize(display);
        if !DISPLAY_PATTERN.is_match(&normalized) {
            return Err(DurationError::InvalidFormat {
                input: display.to_string(),
            });
        }
        let (hours_part, minutes_part) =
            normalized
                .split_once('.')
                .ok_or_else(|| DurationError::InvalidFormat {
                    input: display.to_string(),
                })?;
        let hours: u32 = hours_part
            .parse()
            .map_err(|_| DurationError::InvalidFormat {
                input: display.to_string(),
            })?;
        let minutes: u32 = minutes_part
            .parse()
            .map_err(|_| DurationError::InvalidFormat {
                input: display.to_string(),
            })?;

        if hours > MAX_HOURS {
            return Err(DurationError::InvalidTimeRange { hours, minutes });
        }
        if hours == MAX_HOURS && minutes > 0 {
            return Err(DurationError::InvalidTimeRange { hours, minutes });
        }
        if minutes > MAX_MINUTES {
            return Err(DurationError::InvalidTimeRange { hours, minutes });
        }

        let value = (Decimal::from(hours) + Decimal::from(minutes) / dec!(60)).round_dp(2);
        Ok(Self(value))
    }

    /// Wraps a raw decimal-hours value, rounding to two decimal places and
    /// enforcing the 0..=24 invariant.
    pub fn from_decimal(value: Decimal) -> Result<Self, DurationError> {
        let rounded = value.round_dp(2);
        if rounded < Decimal::ZERO || rounded > Decimal::from(MAX_HOURS) {
            return Err(DurationError::ValueOutOfRange { value });
        }
        Ok(Self(rounded))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for DurationValue {
    /// Renders the canonical display form: hours is the integer part, minutes
    /// is the fractional part scaled to 60, both zero-padded to two digits.
    /// A minutes value that rounds up to 60 carries into the hour.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0.trunc();
        let mut hours = whole.to_u32().unwrap_or(0);
        let mut minutes = ((self.0 - whole) * dec!(60)).round().to_u32().unwrap_or(0);
        if minutes == 60 {
            hours += 1;
            minutes = 0;
        }
        write!(f, "{:02}.{:02}", hours, minutes)
    }
}

/// Parses a display string and returns its decimal-hours value, rounded to
/// two decimal places.
pub fn to_decimal(display: &str) -> Result<Decimal, DurationError> {
    DurationValue::parse(display).map(|v| v.as_decimal())
}

fn normalize(display: &str) -> String {
    display
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

// --- Interactive Editing Buffer ---

/// Keys as reported by the input control feeding a duration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// '0'..='9', from either the main row or the numpad.
    Digit(char),
    Dot,
    Backspace,
    Delete,
    Tab,
    Escape,
    Enter,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    /// A modifier combination such as Ctrl+A / Ctrl+C / Ctrl+V / Ctrl+X.
    Ctrl(char),
    /// Any other printable key.
    Other(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Accepted,
    Suppressed,
}

/// The live editing buffer behind a duration input.
///
/// While the user is typing only digits and a single dot are retained, with
/// no length or value constraint yet. `commit` applies the reformat-on-exit
/// policy and leaves the buffer in canonical HH.MM shape (validation of the
/// resulting value is the caller's, via [`DurationValue::parse`]).
#[derive(Debug, Clone, Default)]
pub struct DurationField {
    buffer: String,
}

impl DurationField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: DurationValue) -> Self {
        Self {
            buffer: value.to_string(),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Filters a keystroke. Digits and the dot mutate the buffer; navigation
    /// and clipboard keys pass through untouched; everything else is
    /// suppressed at input time.
    pub fn press(&mut self, key: Key) -> KeyDisposition {
        match key {
            Key::Digit(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                KeyDisposition::Accepted
            }
            Key::Dot => {
                // A second dot is a permitted key, but only one dot is retained.
                if !self.buffer.contains('.') {
                    self.buffer.push('.');
                }
                KeyDisposition::Accepted
            }
            Key::Backspace => {
                self.buffer.pop();
                KeyDisposition::Accepted
            }
            Key::Delete
            | Key::Tab
            | Key::Escape
            | Key::Enter
            | Key::ArrowLeft
            | Key::ArrowRight
            | Key::ArrowUp
            | Key::ArrowDown => KeyDisposition::Accepted,
            Key::Ctrl(c) if matches!(c.to_ascii_lowercase(), 'a' | 'c' | 'v' | 'x') => {
                KeyDisposition::Accepted
            }
            Key::Digit(_) | Key::Ctrl(_) | Key::Other(_) => KeyDisposition::Suppressed,
        }
    }

    /// Reformat-on-exit. Hours and minutes segments are handled
    /// independently: a one-digit hours segment gains a leading zero, longer
    /// segments are truncated to two digits; a one-digit minutes segment
    /// gains a trailing zero. A buffer without a dot becomes "HH.00".
    pub fn commit(&mut self) -> String {
        if self.buffer.is_empty() {
            return String::new();
        }
        let formatted = match self.buffer.split_once('.') {
            Some((hours, minutes)) => {
                let hours = pad_hours(hours);
                let minutes = match minutes.len() {
                    0 => "00".to_string(),
                    1 => format!("{}0", minutes),
                    _ => minutes[..2].to_string(),
                };
                format!("{}.{}", hours, minutes)
            }
            None => format!("{}.00", pad_hours(&self.buffer)),
        };
        self.buffer = formatted.clone();
        formatted
    }
}

fn pad_hours(segment: &str) -> String {
    match segment.len() {
        0 => "00".to_string(),
        1 => format!("0{}", segment),
        2 => segment.to_string(),
        _ => segment[..2].to_string(),
    }
}
