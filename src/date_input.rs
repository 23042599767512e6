//src/date_input.rs
use chrono::{Datelike, Local, NaiveDate};

/// Display and entry format for all workout dates.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

const MAX_LEN: usize = 10; // DD.MM.YYYY
const MAX_YEARS_AHEAD: i32 = 10;

/// Parses strict `DD.MM.YYYY` text into a calendar date.
///
/// Returns `None` for anything that is not a real calendar date
/// ("31.02.2024") or carries trailing input. Callers trim first; the
/// parser itself is exact.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

/// Today's date in `DD.MM.YYYY` form, for pre-filling the entry field.
#[must_use]
pub fn today_text() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// Incremental date-entry buffer.
///
/// Accepts one typed character at a time and keeps the buffer in
/// `DD.MM.YYYY` shape: only digits and `.` are admitted, a separator is
/// appended automatically when the buffer reaches length 2 or 5, and a
/// year typed past the allowed maximum is clamped in place once the
/// buffer is full. The buffer never grows past 10 characters.
///
/// Only insertion runs the normalizer; [`pop`](Self::pop) and
/// [`set_text`](Self::set_text) edit the buffer verbatim, matching the
/// entry widget this models (a today-button fill or a backspace must not
/// re-trigger separator insertion).
#[derive(Debug, Clone)]
pub struct DateInput {
    text: String,
    max_year: i32,
}

impl DateInput {
    /// Creates a buffer that clamps years to the current year plus ten.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_year(Local::now().year() + MAX_YEARS_AHEAD)
    }

    /// Creates a buffer with an explicit clamp year. Lets tests pin the
    /// clock-dependent bound.
    #[must_use]
    pub fn with_max_year(max_year: i32) -> Self {
        Self {
            text: String::with_capacity(MAX_LEN),
            max_year,
        }
    }

    /// Feeds one typed character. Returns whether it was accepted;
    /// rejected characters leave the buffer untouched.
    pub fn push(&mut self, ch: char) -> bool {
        if self.text.len() >= MAX_LEN {
            return false;
        }
        if !ch.is_ascii_digit() && ch != '.' {
            return false;
        }
        self.text.push(ch);
        match self.text.len() {
            2 | 5 => self.text.push('.'),
            MAX_LEN => self.clamp_year(),
            _ => {}
        }
        true
    }

    /// Feeds characters one at a time, as if typed.
    pub fn push_str(&mut self, input: &str) {
        for ch in input.chars() {
            self.push(ch);
        }
    }

    // Buffer is full; rewrite the year portion if it is numeric and too
    // far in the future. A non-numeric tail (stray separators) is left
    // alone, as is a buffer where byte 6 falls inside a multi-byte
    // character (possible after `set_text`).
    fn clamp_year(&mut self) {
        let Some(tail) = self.text.get(6..) else {
            return;
        };
        if let Ok(year) = tail.parse::<i32>() {
            if year > self.max_year {
                self.text.truncate(6);
                self.text.push_str(&self.max_year.to_string());
            }
        }
    }

    /// Removes and returns the last character (backspace).
    pub fn pop(&mut self) -> Option<char> {
        self.text.pop()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Replaces the whole buffer without normalizing, like a programmatic
    /// widget-text assignment.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl Default for DateInput {
    fn default() -> Self {
        Self::new()
    }
}
