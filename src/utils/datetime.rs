//! Date/time values
//!
//! Metadata formats store dates either EXIF-style (`YYYY:MM:DD HH:MM:SS`) or
//! ISO 8601-style (`YYYY-MM-DDThh:mm:ss`). Both are accepted here, including
//! partial dates, fractional seconds and time zones.

use crate::core::error::{MetadataError, MetadataResult};
use std::fmt;

/// Date/time structure
///
/// Represents a date/time value with optional components.
/// Partial dates (e.g., just year, or year-month) are supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DateTime {
    /// Year (can be negative for BCE dates)
    pub year: i32,
    /// Month (1-12, 0 means not set)
    pub month: u8,
    /// Day (1-31, 0 means not set)
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Nanoseconds (0-999999999)
    pub nanosecond: u32,
    /// Whether date components are present
    pub has_date: bool,
    /// Whether time components are present
    pub has_time: bool,
    /// Whether timezone is present
    pub has_timezone: bool,
    /// Timezone sign: -1 (west), 0 (UTC), +1 (east)
    pub tz_sign: i8,
    pub tz_hour: u8,
    pub tz_minute: u8,
}

impl DateTime {
    /// Create an empty date/time
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a full date and time without a time zone
    pub fn from_parts(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            has_date: true,
            has_time: true,
            ..Self::default()
        }
    }

    /// Parse a date/time string
    ///
    /// Accepted forms:
    /// - `YYYY`, `YYYY-MM`, `YYYY-MM-DD` (or with `:` separators)
    /// - `YYYY-MM-DDThh:mm[:ss[.sss]]`, `YYYY:MM:DD hh:mm:ss`
    /// - any of the above followed by `Z`, `+hh:mm` or `-hh:mm`
    /// - time-only values such as `T10:30` or `10:30:00`
    ///
    /// # Example
    ///
    /// ```rust
    /// use segmeta::utils::datetime::DateTime;
    ///
    /// let dt = DateTime::parse("2023:12:25 10:30:00").unwrap();
    /// assert_eq!(dt.year, 2023);
    /// assert_eq!(dt.month, 12);
    /// assert_eq!(dt.hour, 10);
    /// ```
    pub fn parse(s: &str) -> MetadataResult<Self> {
        let s = s.trim_end_matches('\0').trim();
        if s.is_empty() {
            return Err(bad("Empty date/time string"));
        }

        let mut dt = Self::new();
        let bytes = s.as_bytes();
        let mut pos = 0;

        // Check if this is a time-only value (starts with 'T' or has ':' early)
        let time_only = bytes[0] == b'T'
            || (bytes.len() >= 2 && bytes[1] == b':')
            || (bytes.len() >= 3 && bytes[2] == b':');

        if !time_only {
            dt.has_date = true;

            let negative = bytes[pos] == b'-';
            if negative {
                pos += 1;
            }
            let year = take_number(bytes, &mut pos, "year")?;
            dt.year = i32::try_from(year).map_err(|_| bad("Invalid year value"))?;
            if negative {
                dt.year = -dt.year;
            }
            if pos >= bytes.len() {
                return Ok(dt);
            }

            let separator = bytes[pos];
            if separator != b'-' && separator != b':' {
                return Err(bad("Invalid date string, expected separator after year"));
            }
            pos += 1;
            dt.month = (take_number(bytes, &mut pos, "month")? as u8).clamp(1, 12);
            if pos >= bytes.len() {
                return Ok(dt);
            }

            if bytes[pos] != separator {
                return Err(bad("Invalid date string, expected separator after month"));
            }
            pos += 1;
            dt.day = (take_number(bytes, &mut pos, "day")? as u8).clamp(1, 31);
            if pos >= bytes.len() {
                return Ok(dt);
            }

            if bytes[pos] != b'T' && bytes[pos] != b' ' {
                return Err(bad("Invalid date string, expected 'T' or ' ' after day"));
            }
            pos += 1;
        } else if bytes[0] == b'T' {
            pos += 1;
        }

        dt.has_time = true;

        dt.hour = (take_number(bytes, &mut pos, "hour")? as u8).min(23);
        expect(bytes, &mut pos, b':', "hour")?;
        dt.minute = (take_number(bytes, &mut pos, "minute")? as u8).min(59);

        if pos < bytes.len() && bytes[pos] == b':' {
            pos += 1;
            dt.second = (take_number(bytes, &mut pos, "second")? as u8).min(59);

            if pos < bytes.len() && bytes[pos] == b'.' {
                pos += 1;
                let frac_start = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                dt.nanosecond = fraction_to_nanos(&s[frac_start..pos]);
            }
        }

        if pos >= bytes.len() {
            return Ok(dt);
        }

        dt.has_timezone = true;
        match bytes[pos] {
            b'Z' => {
                pos += 1;
            }
            sign @ (b'+' | b'-') => {
                dt.tz_sign = if sign == b'+' { 1 } else { -1 };
                pos += 1;
                let tz_hour = take_number(bytes, &mut pos, "timezone hour")?;
                if tz_hour > 23 {
                    return Err(bad("Timezone hour is out of range"));
                }
                dt.tz_hour = tz_hour as u8;
                expect(bytes, &mut pos, b':', "timezone hour")?;
                let tz_minute = take_number(bytes, &mut pos, "timezone minute")?;
                if tz_minute > 59 {
                    return Err(bad("Timezone minute is out of range"));
                }
                dt.tz_minute = tz_minute as u8;
            }
            _ => return Err(bad("Invalid date string, unexpected characters after time")),
        }

        if pos < bytes.len() {
            return Err(bad("Invalid date string, extra characters at end"));
        }

        Ok(dt)
    }

    /// Format as ISO 8601
    ///
    /// - Year only: `YYYY`
    /// - Year and month: `YYYY-MM`
    /// - Date only: `YYYY-MM-DD`
    /// - Date and time: `YYYY-MM-DDThh:mm:ss[.sss]`
    /// - With timezone: `...Z` or `...+hh:mm`
    pub fn format(&self) -> String {
        let mut result = String::new();

        if self.has_date {
            if self.month == 0 {
                result.push_str(&format!("{:04}", self.year));
            } else if self.day == 0 {
                result.push_str(&format!("{:04}-{:02}", self.year, self.month));
            } else {
                result.push_str(&format!(
                    "{:04}-{:02}-{:02}",
                    self.year, self.month, self.day
                ));
            }
        }

        if self.has_time {
            if self.has_date {
                result.push('T');
            }
            result.push_str(&format!(
                "{:02}:{:02}:{:02}",
                self.hour, self.minute, self.second
            ));
            if self.nanosecond != 0 {
                let nanos = format!("{:09}", self.nanosecond);
                result.push('.');
                result.push_str(nanos.trim_end_matches('0'));
            }
        }

        if self.has_timezone {
            if self.tz_sign == 0 {
                result.push('Z');
            } else {
                let sign = if self.tz_sign < 0 { '-' } else { '+' };
                result.push_str(&format!("{}{:02}:{:02}", sign, self.tz_hour, self.tz_minute));
            }
        }

        result
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

fn bad(message: &str) -> MetadataError {
    MetadataError::BadValue(message.to_string())
}

fn take_number(bytes: &[u8], pos: &mut usize, what: &str) -> MetadataResult<u32> {
    let start = *pos;
    while *pos < bytes.len() && bytes[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if *pos == start {
        return Err(MetadataError::BadValue(format!(
            "Invalid {} in date string",
            what
        )));
    }
    std::str::from_utf8(&bytes[start..*pos])
        .ok()
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| MetadataError::BadValue(format!("Invalid {} value", what)))
}

fn expect(bytes: &[u8], pos: &mut usize, expected: u8, after: &str) -> MetadataResult<()> {
    if *pos >= bytes.len() || bytes[*pos] != expected {
        return Err(MetadataError::BadValue(format!(
            "Invalid date string, expected '{}' after {}",
            expected as char, after
        )));
    }
    *pos += 1;
    Ok(())
}

/// Normalize fractional-second digits to nanoseconds (max 9 digits)
fn fraction_to_nanos(digits: &str) -> u32 {
    let mut nanos = 0u32;
    for (i, d) in digits.bytes().take(9).enumerate() {
        nanos += u32::from(d - b'0') * 10u32.pow(8 - i as u32);
    }
    nanos
}
