//! Time codec and calendar conversion for the DS3231 RTC.
//!
//! The DS3231 keeps time in seven consecutive packed-BCD registers starting at
//! 0x00: seconds, minutes, hours, day of week, date, month and year. This
//! module converts between those registers and [`CalendarTime`], and between
//! [`CalendarTime`] and Unix timestamps (via chrono).
//!
//! # Register conventions
//!
//! - Bit 7 of the seconds register is never written as 1.
//! - The hours register is always written in 24-hour mode (bit 6 = 0).
//! - Years are two-digit and relative to 2000; the century bit is not used.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

const SECONDS_MASK: u8 = 0x7F;
const MINUTES_MASK: u8 = 0x7F;
const HOURS_24_MASK: u8 = 0x3F;
const WEEKDAY_MASK: u8 = 0x07;
const DATE_MASK: u8 = 0x3F;
const MONTH_MASK: u8 = 0x1F;

const BASE_YEAR: i32 = 2000;

/// Encodes a binary value as packed BCD (tens in the high nibble).
///
/// The input must be in `0..=99`; larger values produce meaningless nibbles.
#[must_use]
pub const fn bin2bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Decodes a packed BCD byte into its binary value.
#[must_use]
pub const fn bcd2bin(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

/// Calendar time as exchanged with callers and stored in the timekeeping block.
///
/// `weekday` runs from 1 (Sunday) to 7 (Saturday), `year` is the offset from
/// 2000 (0-99).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    /// Seconds (0-59)
    pub seconds: u8,
    /// Minutes (0-59)
    pub minutes: u8,
    /// Hours (0-23)
    pub hours: u8,
    /// Day of week (1-7, 1 = Sunday)
    pub weekday: u8,
    /// Day of month (1-31)
    pub day: u8,
    /// Month (1-12)
    pub month: u8,
    /// Year offset from 2000 (0-99)
    pub year: u8,
}

impl CalendarTime {
    /// Checks every field against its register range.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231DateTimeError::InvalidDateTime`] if any field is out of range.
    pub fn validate(&self) -> Result<(), DS3231DateTimeError> {
        let in_range = self.seconds <= 59
            && self.minutes <= 59
            && self.hours <= 23
            && (1..=7).contains(&self.weekday)
            && (1..=31).contains(&self.day)
            && (1..=12).contains(&self.month)
            && self.year <= 99;
        if in_range {
            Ok(())
        } else {
            Err(DS3231DateTimeError::InvalidDateTime)
        }
    }

    /// Converts a Unix timestamp to calendar time.
    ///
    /// # Errors
    ///
    /// Fails if the timestamp lies outside the years 2000-2099.
    pub fn from_unix(seconds: u32) -> Result<Self, DS3231DateTimeError> {
        let datetime = DateTime::from_timestamp(i64::from(seconds), 0)
            .ok_or(DS3231DateTimeError::InvalidDateTime)?;
        Self::from_datetime(&datetime.naive_utc())
    }

    /// Converts calendar time to a Unix timestamp. The weekday is ignored.
    ///
    /// # Errors
    ///
    /// Fails if the fields do not form a valid date and time.
    pub fn to_unix(&self) -> Result<u32, DS3231DateTimeError> {
        let timestamp = self.to_datetime()?.and_utc().timestamp();
        u32::try_from(timestamp).map_err(|_| DS3231DateTimeError::InvalidDateTime)
    }

    /// Converts a chrono `NaiveDateTime` to calendar time.
    ///
    /// # Errors
    ///
    /// Fails if the year is outside 2000-2099.
    pub fn from_datetime(datetime: &NaiveDateTime) -> Result<Self, DS3231DateTimeError> {
        let year = datetime.year();
        if year < BASE_YEAR {
            error!("Year {} is too early! must be greater than 1999", year);
            return Err(DS3231DateTimeError::YearNotAfter1999);
        }
        if year > BASE_YEAR + 99 {
            error!("Year {} is too late! must be before 2100", year);
            return Err(DS3231DateTimeError::YearNotBefore2100);
        }
        let narrow = |v: u32| u8::try_from(v).map_err(|_| DS3231DateTimeError::InvalidDateTime);
        Ok(CalendarTime {
            seconds: narrow(datetime.second())?,
            minutes: narrow(datetime.minute())?,
            hours: narrow(datetime.hour())?,
            weekday: narrow(datetime.weekday().number_from_sunday())?,
            day: narrow(datetime.day())?,
            month: narrow(datetime.month())?,
            year: u8::try_from(year - BASE_YEAR)
                .map_err(|_| DS3231DateTimeError::InvalidDateTime)?,
        })
    }

    /// Converts calendar time to a chrono `NaiveDateTime`. The weekday is ignored.
    ///
    /// # Errors
    ///
    /// Fails if the fields do not form a valid date and time.
    pub fn to_datetime(&self) -> Result<NaiveDateTime, DS3231DateTimeError> {
        if self.year > 99 {
            return Err(DS3231DateTimeError::InvalidDateTime);
        }
        NaiveDate::from_ymd_opt(
            BASE_YEAR + i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(self.hours),
                u32::from(self.minutes),
                u32::from(self.seconds),
            )
        })
        .ok_or(DS3231DateTimeError::InvalidDateTime)
    }

    /// Encodes the seven timekeeping registers, oscillator bit clear and 24-hour mode.
    pub(crate) fn to_registers(&self) -> [u8; 7] {
        [
            bin2bcd(self.seconds) & SECONDS_MASK,
            bin2bcd(self.minutes),
            bin2bcd(self.hours) & HOURS_24_MASK,
            bin2bcd(self.weekday) & WEEKDAY_MASK,
            bin2bcd(self.day),
            bin2bcd(self.month),
            bin2bcd(self.year),
        ]
    }

    /// Decodes the seven timekeeping registers, stripping control bits.
    pub(crate) fn from_registers(data: &[u8; 7]) -> Self {
        CalendarTime {
            seconds: bcd2bin(data[0] & SECONDS_MASK),
            minutes: bcd2bin(data[1] & MINUTES_MASK),
            hours: bcd2bin(data[2] & HOURS_24_MASK),
            weekday: bcd2bin(data[3] & WEEKDAY_MASK),
            day: bcd2bin(data[4] & DATE_MASK),
            month: bcd2bin(data[5] & MONTH_MASK),
            year: bcd2bin(data[6]),
        }
    }
}

impl TryFrom<&NaiveDateTime> for CalendarTime {
    type Error = DS3231DateTimeError;

    fn try_from(datetime: &NaiveDateTime) -> Result<Self, Self::Error> {
        Self::from_datetime(datetime)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors that can occur during DS3231 date/time conversion or validation.
pub enum DS3231DateTimeError {
    /// The provided or decoded date/time is invalid (e.g., out of range, not representable)
    InvalidDateTime,
    /// The year is not before 2100 (two-digit year register)
    YearNotBefore2100,
    /// The year is not after 1999
    YearNotAfter1999,
}
