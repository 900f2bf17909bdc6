//! A platform-agnostic driver for the DS3231 real-time clock.
//!
//! The driver talks to the chip through the `embedded-hal` 1.0 I2C and delay
//! traits and keeps no copy of device state: every accessor goes to the
//! registers. Bus transactions are treated as unreliable, so the convenience
//! accessors retry within bounded limits and the alarm programmer reads back
//! what it wrote.
//!
//! # Features
//!
//! - Read and set the time as [`CalendarTime`], chrono `NaiveDateTime` or a Unix timestamp
//! - Oscillator health check with clear-and-verify of the oscillator stop flag
//! - 1 Hz square wave output control
//! - Daily alarms on both comparators, verified after programming
//! - Optional interrupt line handling for the INT/SQW pin
//! - Temperature and aging offset registers
//! - Optional logging through `log` or `defmt`
//!
//! # Example
//!
//! ```rust,ignore
//! use ds3231_rtc::{Alarm1Time, DS3231};
//!
//! let mut rtc = DS3231::new(i2c, delay);
//!
//! if !rtc.is_running() {
//!     rtc.adjust_from_epoch(1_700_000_000)?;
//! }
//! let now = rtc.now_epoch();
//!
//! rtc.set_alarm1(&Alarm1Time { hours: 7, minutes: 30, seconds: 0 })?;
//! ```
//!
//! # Concurrency
//!
//! All operations take `&mut self` and block until the bus transactions (and
//! any retry delays) complete. Share a handle between threads by wrapping it
//! in a mutex.
#![no_std]

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! debug { ($($arg:tt)*) => { defmt::debug!($($arg)*) }; }
        macro_rules! warn { ($($arg:tt)*) => { defmt::warn!($($arg)*) }; }
        macro_rules! error { ($($arg:tt)*) => { defmt::error!($($arg)*) }; }
    } else if #[cfg(feature = "log")] {
        macro_rules! debug { ($($arg:tt)*) => { log::debug!($($arg)*) }; }
        macro_rules! warn { ($($arg:tt)*) => { log::warn!($($arg)*) }; }
        macro_rules! error { ($($arg:tt)*) => { log::error!($($arg)*) }; }
    } else {
        macro_rules! debug { ($($arg:tt)*) => {}; }
        macro_rules! warn { ($($arg:tt)*) => {}; }
        macro_rules! error { ($($arg:tt)*) => {}; }
    }
}

pub mod alarm;
pub mod datetime;
pub mod interrupt;
pub mod registers;

#[cfg(test)]
mod sim;

use chrono::NaiveDateTime;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

pub use alarm::{Alarm1Time, Alarm2Time, AlarmError};
pub use datetime::{bcd2bin, bin2bcd, CalendarTime, DS3231DateTimeError};
pub use interrupt::{Edge, InterruptLine, NoInterruptLine, Pull};
pub use registers::{
    AgingOffset, AlarmDayDate, AlarmHours, AlarmMinutes, AlarmSeconds, Control,
    InterruptControl, Oscillator, RegAddr, SquareWaveFrequency, Status, Temperature,
    TimeRepresentation,
};

/// Fixed 7-bit I2C address of the DS3231.
pub const DEVICE_ADDRESS: u8 = 0x68;

/// Bounded retry policy: how many attempts, and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Retry {
    /// Total number of attempts (values below 1 are treated as 1)
    pub attempts: u8,
    /// Delay between consecutive attempts, in milliseconds
    pub interval_ms: u32,
}

/// Retry and timing configuration for the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Policy for [`DS3231::now_epoch`]
    pub time_read: Retry,
    /// Policy for [`DS3231::is_running`]
    pub oscillator_check: Retry,
    /// Wait between clearing the oscillator stop flag and reading it back
    pub oscillator_settle_ms: u32,
    /// Policy for [`DS3231::enable_1hz_output`]
    pub output_control: Retry,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            time_read: Retry {
                attempts: 10,
                interval_ms: 10,
            },
            oscillator_check: Retry {
                attempts: 10,
                interval_ms: 10,
            },
            oscillator_settle_ms: 100,
            output_control: Retry {
                attempts: 15,
                interval_ms: 10,
            },
        }
    }
}

/// Errors reported by the driver.
#[derive(Debug)]
pub enum DS3231Error<I2CE> {
    /// An I2C transaction failed
    I2c(I2CE),
    /// A date/time could not be converted or is out of range
    DateTime(DS3231DateTimeError),
    /// An alarm time is invalid, or the alarm registers hold a pattern this driver does not write
    Alarm(AlarmError),
    /// The device accepted a write but reading it back gave different contents
    VerificationFailed,
    /// An interrupt pin operation was requested but no pin is configured
    NoInterruptPin,
}

impl<I2CE> From<I2CE> for DS3231Error<I2CE> {
    fn from(e: I2CE) -> Self {
        DS3231Error::I2c(e)
    }
}

/// DS3231 Real-Time Clock driver.
///
/// Owns the I2C bus, a delay provider used by the retry loops, and an
/// optional interrupt line connected to the INT/SQW pin.
pub struct DS3231<I2C, D, P = NoInterruptLine> {
    i2c: I2C,
    delay: D,
    int_pin: Option<P>,
    config: Config,
}

impl<I2C: I2c, D: DelayNs> DS3231<I2C, D, NoInterruptLine> {
    /// Creates a driver with the default [`Config`] and no interrupt pin.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            int_pin: None,
            config: Config::default(),
        }
    }
}

// Single register accessors: `read_<name>` / `write_<name>`
macro_rules! register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        $(
            paste::paste! {
                #[doc = concat!("Reads the ", stringify!($name), " register.")]
                ///
                /// # Errors
                ///
                /// Returns [`DS3231Error::I2c`] if the bus transaction fails.
                pub fn [<read_ $name>](&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                    let mut data = [0];
                    self.i2c
                        .write_read(DEVICE_ADDRESS, &[$regaddr as u8], &mut data)?;
                    Ok(<$typ>::from(data[0]))
                }

                #[doc = concat!("Writes the ", stringify!($name), " register.")]
                ///
                /// # Errors
                ///
                /// Returns [`DS3231Error::I2c`] if the bus transaction fails.
                pub fn [<write_ $name>](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                    self.i2c
                        .write(DEVICE_ADDRESS, &[$regaddr as u8, u8::from(value)])?;
                    Ok(())
                }
            }
        )+
    }
}

impl<I2C: I2c, D: DelayNs, P: InterruptLine> DS3231<I2C, D, P> {
    /// Attaches an interrupt line connected to the INT/SQW pin.
    pub fn with_interrupt_pin<Q: InterruptLine>(self, pin: Q) -> DS3231<I2C, D, Q> {
        DS3231 {
            i2c: self.i2c,
            delay: self.delay,
            int_pin: Some(pin),
            config: self.config,
        }
    }

    /// Replaces the retry configuration.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Returns the active retry configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Releases the bus and delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Runs `op` until it succeeds or the policy's attempts are used up,
    /// sleeping between attempts. Returns the last error on exhaustion.
    fn retry<T>(
        &mut self,
        policy: Retry,
        mut op: impl FnMut(&mut Self) -> Result<T, DS3231Error<I2C::Error>>,
    ) -> Result<T, DS3231Error<I2C::Error>> {
        let attempts = policy.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(self) {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= attempts => return Err(e),
                Err(_) => {
                    debug!("DS3231: attempt {} of {} failed", attempt, attempts);
                    self.delay.delay_ms(policy.interval_ms);
                    attempt += 1;
                }
            }
        }
    }

    /// Sets the clock.
    ///
    /// The oscillator enable bit is written as 0 and the hours register is
    /// written in 24-hour mode. No retry.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::DateTime`] if a field is out of range, or
    /// [`DS3231Error::I2c`] if the write fails.
    pub fn adjust(&mut self, time: &CalendarTime) -> Result<(), DS3231Error<I2C::Error>> {
        time.validate().map_err(DS3231Error::DateTime)?;
        let mut data = [0u8; 8];
        data[0] = RegAddr::Seconds as u8;
        data[1..].copy_from_slice(&time.to_registers());
        debug!("DS3231: writing time registers {:?}", data);
        self.i2c.write(DEVICE_ADDRESS, &data)?;
        Ok(())
    }

    /// Sets the clock from a Unix timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::DateTime`] if the timestamp is outside the years
    /// 2000-2099, or [`DS3231Error::I2c`] if the write fails.
    pub fn adjust_from_epoch(&mut self, unix_seconds: u32) -> Result<(), DS3231Error<I2C::Error>> {
        let time = CalendarTime::from_unix(unix_seconds).map_err(DS3231Error::DateTime)?;
        self.adjust(&time)
    }

    /// Reads the current time. No retry.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::I2c`] if the bus transaction fails.
    pub fn now(&mut self) -> Result<CalendarTime, DS3231Error<I2C::Error>> {
        let mut data = [0u8; 7];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[RegAddr::Seconds as u8], &mut data)?;
        debug!("DS3231: read time registers {:?}", data);
        Ok(CalendarTime::from_registers(&data))
    }

    /// Reads the current time as a Unix timestamp.
    ///
    /// Retries per [`Config::time_read`]; a read that does not decode to a
    /// valid date counts as a failed attempt. Returns 0 if every attempt fails.
    pub fn now_epoch(&mut self) -> u32 {
        let policy = self.config.time_read;
        let result = self.retry(policy, |dev| {
            dev.now()?.to_unix().map_err(DS3231Error::DateTime)
        });
        result.unwrap_or_else(|_| {
            warn!("DS3231: unable to read time after {} attempts", policy.attempts.max(1));
            0
        })
    }

    /// Reads the current time as a chrono `NaiveDateTime`.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::I2c`] if the read fails or
    /// [`DS3231Error::DateTime`] if the registers hold an invalid date.
    pub fn datetime(&mut self) -> Result<NaiveDateTime, DS3231Error<I2C::Error>> {
        self.now()?.to_datetime().map_err(DS3231Error::DateTime)
    }

    /// Sets the clock from a chrono `NaiveDateTime`.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::DateTime`] if the year is outside 2000-2099,
    /// or [`DS3231Error::I2c`] if the write fails.
    pub fn set_datetime(&mut self, datetime: &NaiveDateTime) -> Result<(), DS3231Error<I2C::Error>> {
        let time = CalendarTime::from_datetime(datetime).map_err(DS3231Error::DateTime)?;
        self.adjust(&time)
    }

    register_access!(
        (control, RegAddr::Control, Control),
        (status, RegAddr::ControlStatus, Status),
        (aging_offset, RegAddr::AgingOffset, AgingOffset)
    );

    /// Writes 0 to the status register.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::I2c`] if the write fails.
    pub fn clear_status(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.write_status(Status::default())
    }

    /// Clears both alarm flags, leaving the other status bits as read.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::I2c`] if the read or the write fails.
    pub fn clear_alarm_flags(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        let mut status = self.read_status()?;
        status.set_alarm1_flag(false);
        status.set_alarm2_flag(false);
        self.write_status(status)
    }

    /// Checks that the oscillator is running.
    ///
    /// Each attempt clears the oscillator stop flag, waits
    /// [`Config::oscillator_settle_ms`] and reads the flag back; the flag
    /// still being set counts as a failed attempt. Returns `false` once the
    /// attempts in [`Config::oscillator_check`] are used up.
    pub fn is_running(&mut self) -> bool {
        let policy = self.config.oscillator_check;
        let settle_ms = self.config.oscillator_settle_ms;
        let result = self.retry(policy, |dev| {
            let mut status = dev.read_status()?;
            status.set_oscillator_stop_flag(false);
            dev.write_status(status)?;
            dev.delay.delay_ms(settle_ms);
            if dev.read_status()?.oscillator_stop_flag() {
                debug!("DS3231: oscillator stop flag still set");
                return Err(DS3231Error::VerificationFailed);
            }
            Ok(())
        });
        if result.is_err() {
            warn!("DS3231: oscillator not confirmed running");
        }
        result.is_ok()
    }

    /// Enables or disables the 1 Hz square wave on the INT/SQW pin.
    ///
    /// Enabling selects the 1 Hz rate and square wave mode (RS2, RS1 and
    /// INTCN cleared); disabling sets INTCN. Other control bits are kept.
    /// Retries per [`Config::output_control`].
    ///
    /// # Errors
    ///
    /// Returns the last [`DS3231Error::I2c`] once every attempt has failed.
    pub fn enable_1hz_output(&mut self, enable: bool) -> Result<(), DS3231Error<I2C::Error>> {
        let policy = self.config.output_control;
        self.retry(policy, |dev| {
            let mut control = dev.read_control()?;
            if enable {
                control.set_square_wave_frequency(SquareWaveFrequency::Hz1);
                control.set_interrupt_control(InterruptControl::SquareWave);
            } else {
                control.set_interrupt_control(InterruptControl::Interrupt);
            }
            debug!("DS3231: writing control {:?}", control);
            dev.write_control(control)
        })
    }

    /// Attaches a falling-edge interrupt, without pull resistor, on the INT/SQW line.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::NoInterruptPin`] if no line was configured.
    pub fn enable_interrupt_pin(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        let pin = self.int_pin.as_mut().ok_or(DS3231Error::NoInterruptPin)?;
        pin.attach(Pull::None, Edge::Falling);
        Ok(())
    }

    /// Detaches the INT/SQW interrupt, if a line is configured.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` mirrors [`DS3231::enable_interrupt_pin`].
    pub fn disable_interrupt_pin(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        if let Some(pin) = self.int_pin.as_mut() {
            pin.detach();
        }
        Ok(())
    }

    /// Reads the on-chip temperature sensor.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::I2c`] if the bus transaction fails.
    pub fn temperature(&mut self) -> Result<Temperature, DS3231Error<I2C::Error>> {
        let mut data = [0u8; 2];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[RegAddr::MSBTemp as u8], &mut data)?;
        Ok(Temperature::from_registers(data[0], data[1]))
    }
}
