//! Daily alarm programming for the DS3231 RTC.
//!
//! Both alarms are programmed to fire once a day when the time of day matches:
//! the seconds/minutes/hours mask bits are cleared, hours are in 24-hour mode
//! and the day/date register is masked out (`0x80`). Alarm 2 has no seconds
//! register and fires at 00 seconds.
//!
//! # Programming sequence
//!
//! The alarm registers sit directly in front of the control and status
//! registers, and the chip only accepts contiguous writes. Each alarm is
//! therefore programmed in four steps:
//!
//! 1. Read everything from the alarm's first register through the status register.
//! 2. Arm the alarm in the control byte (AxIE and INTCN) and clear its flag in
//!    the status byte. For alarm 1 the alarm 2 registers in between are carried
//!    over unchanged.
//! 3. Write the new match bytes together with the carried-over bytes in one transaction.
//! 4. Read the block back and compare.
//!
//! A failed comparison is reported but nothing is rolled back; the device keeps
//! whatever step 3 wrote.

use chrono::{DateTime, Timelike};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::{
    datetime::{bcd2bin, bin2bcd, CalendarTime},
    interrupt::InterruptLine,
    registers::{
        AlarmDayDate, AlarmHours, AlarmMinutes, AlarmSeconds, Control, InterruptControl, RegAddr,
        Status, TimeRepresentation,
    },
    DS3231Error, DEVICE_ADDRESS, DS3231,
};

// Alarm 1 block through the status register
const ALARM_SPAN_MAX: usize = 9;

/// Error type for alarm configuration operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmError {
    /// Invalid time component value
    InvalidTime(&'static str),
    /// The alarm registers do not hold a daily time-of-day alarm
    NotDaily,
}

/// Time of day for alarm 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm1Time {
    /// Hours (0-23)
    pub hours: u8,
    /// Minutes (0-59)
    pub minutes: u8,
    /// Seconds (0-59)
    pub seconds: u8,
}

/// Time of day for alarm 2, which always fires at 00 seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm2Time {
    /// Hours (0-23)
    pub hours: u8,
    /// Minutes (0-59)
    pub minutes: u8,
}

fn validate_hours_minutes(hours: u8, minutes: u8) -> Result<(), AlarmError> {
    if hours > 23 {
        return Err(AlarmError::InvalidTime("hours must be 0-23"));
    }
    if minutes > 59 {
        return Err(AlarmError::InvalidTime("minutes must be 0-59"));
    }
    Ok(())
}

impl Alarm1Time {
    /// Validates the alarm time.
    ///
    /// # Errors
    ///
    /// Returns an error if any time component is out of valid range.
    pub fn validate(&self) -> Result<(), AlarmError> {
        validate_hours_minutes(self.hours, self.minutes)?;
        if self.seconds > 59 {
            return Err(AlarmError::InvalidTime("seconds must be 0-59"));
        }
        Ok(())
    }

    fn to_registers(self) -> [u8; 4] {
        [
            match_seconds(self.seconds).into(),
            match_minutes(self.minutes).into(),
            match_hours(self.hours).into(),
            ignore_day_date().into(),
        ]
    }

    fn from_registers(data: &[u8; 4]) -> Result<Self, AlarmError> {
        let seconds = AlarmSeconds::from(data[0]);
        if seconds.alarm_mask1() {
            return Err(AlarmError::NotDaily);
        }
        let (hours, minutes) = decode_daily(data[1], data[2], data[3])?;
        let time = Alarm1Time {
            hours,
            minutes,
            seconds: bcd2bin(u8::from(seconds)),
        };
        time.validate()?;
        Ok(time)
    }
}

impl Alarm1Time {
    /// Takes the time of day of a Unix timestamp, ignoring its date.
    ///
    /// # Errors
    ///
    /// Fails only if chrono cannot represent the timestamp.
    pub fn from_unix(unix_seconds: u32) -> Result<Self, AlarmError> {
        let (hours, minutes, seconds) = time_of_day(unix_seconds)?;
        Ok(Alarm1Time {
            hours,
            minutes,
            seconds,
        })
    }
}

impl From<&CalendarTime> for Alarm1Time {
    fn from(time: &CalendarTime) -> Self {
        Alarm1Time {
            hours: time.hours,
            minutes: time.minutes,
            seconds: time.seconds,
        }
    }
}

impl Alarm2Time {
    /// Validates the alarm time.
    ///
    /// # Errors
    ///
    /// Returns an error if any time component is out of valid range.
    pub fn validate(&self) -> Result<(), AlarmError> {
        validate_hours_minutes(self.hours, self.minutes)
    }

    fn to_registers(self) -> [u8; 3] {
        [
            match_minutes(self.minutes).into(),
            match_hours(self.hours).into(),
            ignore_day_date().into(),
        ]
    }

    fn from_registers(data: &[u8; 3]) -> Result<Self, AlarmError> {
        let (hours, minutes) = decode_daily(data[0], data[1], data[2])?;
        let time = Alarm2Time { hours, minutes };
        time.validate()?;
        Ok(time)
    }
}

impl Alarm2Time {
    /// Takes the hours and minutes of a Unix timestamp, ignoring its date.
    ///
    /// # Errors
    ///
    /// Fails only if chrono cannot represent the timestamp.
    pub fn from_unix(unix_seconds: u32) -> Result<Self, AlarmError> {
        let (hours, minutes, _) = time_of_day(unix_seconds)?;
        Ok(Alarm2Time { hours, minutes })
    }
}

impl From<&CalendarTime> for Alarm2Time {
    fn from(time: &CalendarTime) -> Self {
        Alarm2Time {
            hours: time.hours,
            minutes: time.minutes,
        }
    }
}

/// Hours, minutes and seconds (UTC) of a Unix timestamp. Any date is accepted.
fn time_of_day(unix_seconds: u32) -> Result<(u8, u8, u8), AlarmError> {
    let time = DateTime::from_timestamp(i64::from(unix_seconds), 0)
        .ok_or(AlarmError::InvalidTime("timestamp out of range"))?
        .time();
    let narrow = |v: u32| u8::try_from(v).map_err(|_| AlarmError::InvalidTime("time of day"));
    Ok((
        narrow(time.hour())?,
        narrow(time.minute())?,
        narrow(time.second())?,
    ))
}

fn match_seconds(seconds: u8) -> AlarmSeconds {
    let mut value = AlarmSeconds::from(bin2bcd(seconds));
    value.set_alarm_mask1(false);
    value
}

fn match_minutes(minutes: u8) -> AlarmMinutes {
    let mut value = AlarmMinutes::from(bin2bcd(minutes));
    value.set_alarm_mask2(false);
    value
}

fn match_hours(hours: u8) -> AlarmHours {
    let mut value = AlarmHours::from(bin2bcd(hours));
    value.set_alarm_mask3(false);
    value.set_time_representation(TimeRepresentation::TwentyFourHour);
    value
}

fn ignore_day_date() -> AlarmDayDate {
    let mut value = AlarmDayDate::default();
    value.set_alarm_mask4(true);
    value
}

/// Decodes minutes and hours of a daily alarm, checking the mask pattern.
fn decode_daily(minutes: u8, hours: u8, day_date: u8) -> Result<(u8, u8), AlarmError> {
    let minutes = AlarmMinutes::from(minutes);
    let hours = AlarmHours::from(hours);
    let day_date = AlarmDayDate::from(day_date);
    if minutes.alarm_mask2()
        || hours.alarm_mask3()
        || hours.time_representation() != TimeRepresentation::TwentyFourHour
        || !day_date.alarm_mask4()
    {
        return Err(AlarmError::NotDaily);
    }
    Ok((bcd2bin(u8::from(hours)), bcd2bin(u8::from(minutes))))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AlarmSlot {
    One,
    Two,
}

impl AlarmSlot {
    fn base(self) -> RegAddr {
        match self {
            AlarmSlot::One => RegAddr::Alarm1Seconds,
            AlarmSlot::Two => RegAddr::Alarm2Minutes,
        }
    }

    /// Bytes from the alarm's first register through the status register.
    fn span(self) -> usize {
        RegAddr::ControlStatus as usize - self.base() as usize + 1
    }

    fn arm(self, control: &mut Control) {
        match self {
            AlarmSlot::One => control.set_alarm1_interrupt_enable(true),
            AlarmSlot::Two => control.set_alarm2_interrupt_enable(true),
        }
        control.set_interrupt_control(InterruptControl::Interrupt);
    }

    fn is_armed(self, control: Control) -> bool {
        let enabled = match self {
            AlarmSlot::One => control.alarm1_interrupt_enable(),
            AlarmSlot::Two => control.alarm2_interrupt_enable(),
        };
        enabled && control.interrupt_control() == InterruptControl::Interrupt
    }

    fn clear_flag(self, status: &mut Status) {
        match self {
            AlarmSlot::One => status.set_alarm1_flag(false),
            AlarmSlot::Two => status.set_alarm2_flag(false),
        }
    }

    fn is_flagged(self, status: Status) -> bool {
        match self {
            AlarmSlot::One => status.alarm1_flag(),
            AlarmSlot::Two => status.alarm2_flag(),
        }
    }
}

impl<I2C: I2c, D: DelayNs, P: InterruptLine> DS3231<I2C, D, P> {
    /// Programs alarm 1 to fire daily at the given time and enables its interrupt.
    ///
    /// Also selects interrupt mode on the INT/SQW pin and clears the alarm 1
    /// flag. Alarm 2 is left untouched. No retry.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::Alarm`] for an invalid time,
    /// [`DS3231Error::I2c`] if any transaction fails, or
    /// [`DS3231Error::VerificationFailed`] if the read-back disagrees.
    pub fn set_alarm1(&mut self, time: &Alarm1Time) -> Result<(), DS3231Error<I2C::Error>> {
        time.validate().map_err(DS3231Error::Alarm)?;
        self.program_alarm(AlarmSlot::One, &time.to_registers())
    }

    /// Programs alarm 1 with the time of day of a Unix timestamp.
    ///
    /// Only hours, minutes and seconds are used, so the timestamp may fall in
    /// any year.
    ///
    /// # Errors
    ///
    /// As [`DS3231::set_alarm1`].
    pub fn set_alarm1_epoch(&mut self, unix_seconds: u32) -> Result<(), DS3231Error<I2C::Error>> {
        let time = Alarm1Time::from_unix(unix_seconds).map_err(DS3231Error::Alarm)?;
        self.set_alarm1(&time)
    }

    /// Programs alarm 2 to fire daily at the given time and enables its interrupt.
    ///
    /// # Errors
    ///
    /// As [`DS3231::set_alarm1`].
    pub fn set_alarm2(&mut self, time: &Alarm2Time) -> Result<(), DS3231Error<I2C::Error>> {
        time.validate().map_err(DS3231Error::Alarm)?;
        self.program_alarm(AlarmSlot::Two, &time.to_registers())
    }

    /// Programs alarm 2 with the hours and minutes of a Unix timestamp.
    ///
    /// # Errors
    ///
    /// As [`DS3231::set_alarm1`].
    pub fn set_alarm2_epoch(&mut self, unix_seconds: u32) -> Result<(), DS3231Error<I2C::Error>> {
        let time = Alarm2Time::from_unix(unix_seconds).map_err(DS3231Error::Alarm)?;
        self.set_alarm2(&time)
    }

    /// Reads back the alarm 1 time.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::I2c`] if the read fails, or
    /// [`DS3231Error::Alarm`] if the registers do not hold a daily alarm.
    pub fn alarm1(&mut self) -> Result<Alarm1Time, DS3231Error<I2C::Error>> {
        let mut data = [0u8; 4];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[RegAddr::Alarm1Seconds as u8], &mut data)?;
        Alarm1Time::from_registers(&data).map_err(DS3231Error::Alarm)
    }

    /// Reads back the alarm 2 time.
    ///
    /// # Errors
    ///
    /// As [`DS3231::alarm1`].
    pub fn alarm2(&mut self) -> Result<Alarm2Time, DS3231Error<I2C::Error>> {
        let mut data = [0u8; 3];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[RegAddr::Alarm2Minutes as u8], &mut data)?;
        Alarm2Time::from_registers(&data).map_err(DS3231Error::Alarm)
    }

    fn program_alarm(
        &mut self,
        slot: AlarmSlot,
        match_bytes: &[u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let base = slot.base() as u8;
        let span = slot.span();
        let own = match_bytes.len();
        let control_at = span - 2;
        let status_at = span - 1;

        let mut block = [0u8; ALARM_SPAN_MAX];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[base], &mut block[..span])?;
        debug!("DS3231: alarm block before {:?}", block);

        let mut control = Control::from(block[control_at]);
        let mut status = Status::from(block[status_at]);
        slot.arm(&mut control);
        slot.clear_flag(&mut status);

        // image[i + 1] holds the register at base + i
        let mut image = [0u8; ALARM_SPAN_MAX + 1];
        image[0] = base;
        image[1..=own].copy_from_slice(match_bytes);
        image[own + 1..=control_at].copy_from_slice(&block[own..control_at]);
        image[control_at + 1] = control.into();
        image[status_at + 1] = status.into();
        self.i2c.write(DEVICE_ADDRESS, &image[..=span])?;

        self.i2c
            .write_read(DEVICE_ADDRESS, &[base], &mut block[..span])?;
        debug!("DS3231: alarm block after {:?}", block);

        // the last match byte is day/date, which only has to stay masked
        let time_len = own - 1;
        let verified = block[..time_len] == match_bytes[..time_len]
            && AlarmDayDate::from(block[time_len]).alarm_mask4()
            && slot.is_armed(Control::from(block[control_at]))
            && !slot.is_flagged(Status::from(block[status_at]));
        if !verified {
            warn!("DS3231: alarm verification failed");
            return Err(DS3231Error::VerificationFailed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use crate::sim::{RecordingDelay, SimDs3231};
    use alloc::vec;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const ALARM1: u8 = RegAddr::Alarm1Seconds as u8;
    const ALARM2: u8 = RegAddr::Alarm2Minutes as u8;

    fn setup_mock(expectations: &[I2cTrans]) -> DS3231<I2cMock, RecordingDelay> {
        DS3231::new(I2cMock::new(expectations), RecordingDelay::default())
    }

    fn setup_sim() -> DS3231<SimDs3231, RecordingDelay> {
        let mut sim = SimDs3231::default();
        // power-on control value: INTCN set, 8.192 kHz
        sim.regs[RegAddr::Control as usize] = 0x1C;
        DS3231::new(sim, RecordingDelay::default())
    }

    fn alarm1_at(hours: u8, minutes: u8, seconds: u8) -> Alarm1Time {
        Alarm1Time {
            hours,
            minutes,
            seconds,
        }
    }

    #[test]
    fn test_alarm_time_validation() {
        assert!(alarm1_at(23, 59, 59).validate().is_ok());
        assert!(matches!(
            alarm1_at(24, 0, 0).validate(),
            Err(AlarmError::InvalidTime(_))
        ));
        assert!(alarm1_at(0, 60, 0).validate().is_err());
        assert!(alarm1_at(0, 0, 60).validate().is_err());
        assert!(Alarm2Time {
            hours: 0,
            minutes: 0
        }
        .validate()
        .is_ok());
        assert!(Alarm2Time {
            hours: 12,
            minutes: 60
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_match_registers() {
        assert_eq!(alarm1_at(14, 5, 30).to_registers(), [0x30, 0x05, 0x14, 0x80]);
        assert_eq!(alarm1_at(23, 59, 59).to_registers(), [0x59, 0x59, 0x23, 0x80]);
        let alarm2 = Alarm2Time {
            hours: 7,
            minutes: 45,
        };
        assert_eq!(alarm2.to_registers(), [0x45, 0x07, 0x80]);
    }

    #[test]
    fn test_set_alarm1_transactions() {
        let mut dev = setup_mock(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![ALARM1],
                vec![
                    0x11, 0x22, 0x33, 0x44, // alarm 1 (stale)
                    0x05, 0x14, 0x80, // alarm 2
                    0x1C, // control
                    0x8B, // status: OSF, EN32kHz, A2F, A1F
                ],
            ),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![
                    ALARM1, 0x30, 0x05, 0x14, 0x80, // alarm 1 at 14:05:30
                    0x05, 0x14, 0x80, // alarm 2 unchanged
                    0x1D, // A1IE + INTCN
                    0x8A, // A1F cleared
                ],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![ALARM1],
                vec![0x30, 0x05, 0x14, 0x80, 0x05, 0x14, 0x80, 0x1D, 0x8A],
            ),
        ]);
        dev.set_alarm1(&alarm1_at(14, 5, 30)).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm2_transactions() {
        let mut dev = setup_mock(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![ALARM2],
                vec![0x01, 0x02, 0x03, 0x1C, 0x8B],
            ),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![ALARM2, 0x05, 0x14, 0x80, 0x1E, 0x89],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![ALARM2],
                vec![0x05, 0x14, 0x80, 0x1E, 0x89],
            ),
        ]);
        dev.set_alarm2(&Alarm2Time {
            hours: 14,
            minutes: 5,
        })
        .unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm1_detects_corrupted_readback() {
        let mut dev = setup_mock(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![ALARM1],
                vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            ),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![ALARM1, 0x30, 0x05, 0x14, 0x80, 0x00, 0x00, 0x00, 0x05, 0x00],
            ),
            // minutes came back wrong
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![ALARM1],
                vec![0x30, 0x06, 0x14, 0x80, 0x00, 0x00, 0x00, 0x05, 0x00],
            ),
        ]);
        let err = dev.set_alarm1(&alarm1_at(14, 5, 30)).unwrap_err();
        assert!(matches!(err, DS3231Error::VerificationFailed));
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm1_detects_disabled_interrupt() {
        let mut dev = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![ALARM1], vec![0x00; 9]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![ALARM1, 0x30, 0x05, 0x14, 0x80, 0x00, 0x00, 0x00, 0x05, 0x00],
            ),
            // INTCN did not stick
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![ALARM1],
                vec![0x30, 0x05, 0x14, 0x80, 0x00, 0x00, 0x00, 0x01, 0x00],
            ),
        ]);
        let err = dev.set_alarm1(&alarm1_at(14, 5, 30)).unwrap_err();
        assert!(matches!(err, DS3231Error::VerificationFailed));
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm2_detects_flag_still_set() {
        let mut dev = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![ALARM2], vec![0x00, 0x00, 0x00, 0x00, 0x02]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![ALARM2, 0x05, 0x14, 0x80, 0x06, 0x00],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![ALARM2],
                vec![0x05, 0x14, 0x80, 0x06, 0x02],
            ),
        ]);
        let err = dev
            .set_alarm2(&Alarm2Time {
                hours: 14,
                minutes: 5,
            })
            .unwrap_err();
        assert!(matches!(err, DS3231Error::VerificationFailed));
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm2_detects_missing_day_date_mask() {
        let mut dev = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![ALARM2], vec![0x00; 5]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![ALARM2, 0x05, 0x14, 0x80, 0x06, 0x00],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![ALARM2],
                vec![0x05, 0x14, 0x00, 0x06, 0x00],
            ),
        ]);
        let err = dev
            .set_alarm2(&Alarm2Time {
                hours: 14,
                minutes: 5,
            })
            .unwrap_err();
        assert!(matches!(err, DS3231Error::VerificationFailed));
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm1_initial_read_failure() {
        let mut dev = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![ALARM1], vec![0x00; 9])
                .with_error(ErrorKind::Other),
        ]);
        let err = dev.set_alarm1(&alarm1_at(14, 5, 30)).unwrap_err();
        assert!(matches!(err, DS3231Error::I2c(ErrorKind::Other)));
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm1_write_failure() {
        let mut dev = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![ALARM1], vec![0x00; 9]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![ALARM1, 0x30, 0x05, 0x14, 0x80, 0x00, 0x00, 0x00, 0x05, 0x00],
            )
            .with_error(ErrorKind::Other),
        ]);
        let err = dev.set_alarm1(&alarm1_at(14, 5, 30)).unwrap_err();
        assert!(matches!(err, DS3231Error::I2c(ErrorKind::Other)));
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm2_verify_read_failure() {
        let mut dev = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![ALARM2], vec![0x00; 5]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![ALARM2, 0x05, 0x14, 0x80, 0x06, 0x00],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![ALARM2], vec![0x00; 5])
                .with_error(ErrorKind::Other),
        ]);
        let err = dev
            .set_alarm2(&Alarm2Time {
                hours: 14,
                minutes: 5,
            })
            .unwrap_err();
        assert!(matches!(err, DS3231Error::I2c(ErrorKind::Other)));
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm_rejects_invalid_time() {
        let mut dev = setup_mock(&[]);
        let err = dev.set_alarm1(&alarm1_at(25, 0, 0)).unwrap_err();
        assert!(matches!(err, DS3231Error::Alarm(AlarmError::InvalidTime(_))));
        dev.i2c.done();
    }

    #[test]
    fn test_alarm1_keeps_alarm2_block() {
        let mut dev = setup_sim();
        dev.set_alarm2(&Alarm2Time {
            hours: 14,
            minutes: 5,
        })
        .unwrap();
        let alarm2_block = [0x05, 0x14, 0x80];
        assert_eq!(dev.i2c.regs[0x0B..0x0E], alarm2_block);
        assert_eq!(dev.i2c.regs[RegAddr::Control as usize], 0x1E);

        dev.set_alarm1(&alarm1_at(14, 5, 30)).unwrap();
        assert_eq!(dev.i2c.regs[0x07..0x0B], [0x30, 0x05, 0x14, 0x80]);
        assert_eq!(dev.i2c.regs[0x0B..0x0E], alarm2_block);
        // only A1IE was added
        assert_eq!(dev.i2c.regs[RegAddr::Control as usize], 0x1F);

        assert_eq!(dev.alarm1().unwrap(), alarm1_at(14, 5, 30));
        assert_eq!(
            dev.alarm2().unwrap(),
            Alarm2Time {
                hours: 14,
                minutes: 5
            }
        );
    }

    #[test]
    fn test_set_alarm_clears_only_own_flag() {
        let mut dev = setup_sim();
        dev.i2c.regs[RegAddr::ControlStatus as usize] = 0x0B;
        dev.set_alarm1(&alarm1_at(6, 0, 0)).unwrap();
        assert_eq!(dev.i2c.regs[RegAddr::ControlStatus as usize], 0x0A);
        dev.set_alarm2(&Alarm2Time {
            hours: 6,
            minutes: 0,
        })
        .unwrap();
        assert_eq!(dev.i2c.regs[RegAddr::ControlStatus as usize], 0x08);
    }

    #[test]
    fn test_set_alarm_from_epoch() {
        let mut dev = setup_sim();
        // 2023-06-15 13:30:45 UTC
        dev.set_alarm1_epoch(1_686_835_845).unwrap();
        dev.set_alarm2_epoch(1_686_835_845).unwrap();
        assert_eq!(dev.alarm1().unwrap(), alarm1_at(13, 30, 45));
        assert_eq!(
            dev.alarm2().unwrap(),
            Alarm2Time {
                hours: 13,
                minutes: 30
            }
        );
    }

    #[test]
    fn test_set_alarm_from_epoch_ignores_date() {
        let mut dev = setup_sim();
        // 14:05:30 on 1970-01-01
        dev.set_alarm1_epoch(14 * 3600 + 5 * 60 + 30).unwrap();
        assert_eq!(dev.alarm1().unwrap(), alarm1_at(14, 5, 30));

        // 02:40:00 UTC in 2103
        dev.set_alarm2_epoch(4_200_000_000).unwrap();
        assert_eq!(
            dev.alarm2().unwrap(),
            Alarm2Time {
                hours: 2,
                minutes: 40
            }
        );
    }

    #[test]
    fn test_alarm_time_from_unix() {
        assert_eq!(Alarm1Time::from_unix(0).unwrap(), alarm1_at(0, 0, 0));
        assert_eq!(Alarm1Time::from_unix(u32::MAX).unwrap(), alarm1_at(6, 28, 15));
        assert_eq!(
            Alarm2Time::from_unix(86_399).unwrap(),
            Alarm2Time {
                hours: 23,
                minutes: 59
            }
        );
    }

    #[test]
    fn test_read_alarm_not_daily() {
        let mut dev = setup_sim();
        // every-second alarm: all mask bits set
        dev.i2c.regs[0x07..0x0B].copy_from_slice(&[0x80, 0x80, 0x80, 0x80]);
        let err = dev.alarm1().unwrap_err();
        assert!(matches!(err, DS3231Error::Alarm(AlarmError::NotDaily)));

        // alarm 2 matching on date
        dev.i2c.regs[0x0B..0x0E].copy_from_slice(&[0x05, 0x14, 0x15]);
        let err = dev.alarm2().unwrap_err();
        assert!(matches!(err, DS3231Error::Alarm(AlarmError::NotDaily)));
    }
}
