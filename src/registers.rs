//! Register map and bitfield value types for the DS3231 RTC.
//!
//! Control, status and alarm bytes are modelled as small bitfield types with
//! named accessors so that read-modify-write sequences only touch the bits
//! they mean to touch. Bit positions follow the DS3231 datasheet.

use bitfield::bitfield;

/// Register map of the DS3231. The chip auto-increments the register pointer,
/// so a block access starts at the first register of a group.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    // timekeeping, packed BCD
    Seconds = 0x00,
    Minutes = 0x01,
    Hours = 0x02,
    /// Day of week, 1-7
    Day = 0x03,
    Date = 0x04,
    /// Month with the century bit in bit 7
    Month = 0x05,
    Year = 0x06,
    // alarm 1
    Alarm1Seconds = 0x07,
    Alarm1Minutes = 0x08,
    Alarm1Hours = 0x09,
    Alarm1DayDate = 0x0A,
    // alarm 2, no seconds register
    Alarm2Minutes = 0x0B,
    Alarm2Hours = 0x0C,
    Alarm2DayDate = 0x0D,
    Control = 0x0E,
    /// Status register (datasheet name: Control/Status)
    ControlStatus = 0x0F,
    AgingOffset = 0x10,
    /// Temperature, integer part
    MSBTemp = 0x11,
    /// Temperature, fraction in bits 7..6
    LSBTemp = 0x12,
}

// Declares a register bit field as an enum. Variants must be listed in
// value order and cover every value of `$mask`; bits above the mask are ignored.
macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        $name:ident: $mask:expr => {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl $name {
            const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl From<u8> for $name {
            fn from(v: u8) -> Self {
                Self::ALL[usize::from(v & $mask)]
            }
        }

        impl From<$name> for u8 {
            fn from(v: $name) -> Self {
                v as u8
            }
        }
    };
}

field_enum! {
    /// Hour format bit (bit 6) of the hours and alarm hours registers.
    TimeRepresentation: 0b1 => {
        /// 24-hour format (0-23)
        TwentyFourHour = 0,
        /// 12-hour format with AM/PM bit
        TwelveHour = 1,
    }
}

field_enum! {
    /// Oscillator control (EOSC bit, active low).
    Oscillator: 0b1 => {
        /// Runs on both supply and battery
        Enabled = 0,
        /// Stops when running on battery
        Disabled = 1,
    }
}

field_enum! {
    /// Function of the INT/SQW pin (INTCN bit).
    InterruptControl: 0b1 => {
        /// Square wave on INT/SQW
        SquareWave = 0,
        /// Alarm interrupt on INT/SQW (active low)
        Interrupt = 1,
    }
}

field_enum! {
    /// Square wave output rate (RS2/RS1 bits).
    SquareWaveFrequency: 0b11 => {
        /// 1 Hz
        Hz1 = 0b00,
        /// 1.024 kHz
        Hz1024 = 0b01,
        /// 4.096 kHz
        Hz4096 = 0b10,
        /// 8.192 kHz
        Hz8192 = 0b11,
    }
}

// Raw byte conversions for single-register bitfield types
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Control register (0x0E).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control(u8);
    impl Debug;
    /// Oscillator enable/disable control (EOSC)
    pub from into Oscillator, oscillator_enable, set_oscillator_enable: 7, 7;
    /// Enable square wave output on battery power (BBSQW)
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    /// Force temperature conversion (CONV)
    pub convert_temperature, set_convert_temperature: 5;
    /// Square wave output rate (RS2, RS1)
    pub from into SquareWaveFrequency, square_wave_frequency, set_square_wave_frequency: 4, 3;
    /// INT/SQW pin function (INTCN)
    pub from into InterruptControl, interrupt_control, set_interrupt_control: 2, 2;
    /// Enable alarm 2 interrupt (A2IE)
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    /// Enable alarm 1 interrupt (A1IE)
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}
from_register_u8!(Control);

#[cfg(feature = "defmt")]
impl defmt::Format for Control {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Control({=u8:#04x}, {}, {}",
            self.0,
            self.square_wave_frequency(),
            self.interrupt_control()
        );
        if self.alarm2_interrupt_enable() {
            defmt::write!(f, ", A2IE");
        }
        if self.alarm1_interrupt_enable() {
            defmt::write!(f, ", A1IE");
        }
        defmt::write!(f, ")");
    }
}

bitfield! {
    /// Control/Status register (0x0F).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    /// Oscillator stop flag (OSF); set when timekeeping may be invalid
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    /// Enable 32kHz output
    pub enable_32khz_output, set_enable_32khz_output: 3;
    /// Device busy flag
    pub busy, set_busy: 2;
    /// Alarm 2 triggered flag (A2F)
    pub alarm2_flag, set_alarm2_flag: 1;
    /// Alarm 1 triggered flag (A1F)
    pub alarm1_flag, set_alarm1_flag: 0;
}
from_register_u8!(Status);

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Status(");
        let mut first = true;
        for (set, name) in [
            (self.oscillator_stop_flag(), "OSF"),
            (self.enable_32khz_output(), "EN32kHz"),
            (self.busy(), "BSY"),
            (self.alarm2_flag(), "A2F"),
            (self.alarm1_flag(), "A1F"),
        ] {
            if set {
                if !first {
                    defmt::write!(f, ", ");
                }
                defmt::write!(f, "{=str}", name);
                first = false;
            }
        }
        if first {
            defmt::write!(f, "clear");
        }
        defmt::write!(f, ")");
    }
}

bitfield! {
    /// Aging offset register for oscillator trimming.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AgingOffset(u8);
    impl Debug;
    /// Aging offset value (-128 to +127)
    pub i8, aging_offset, set_aging_offset: 7, 0;
}
from_register_u8!(AgingOffset);

bitfield! {
    /// Temperature register pair (0x11 MSB, 0x12 LSB) as a 16-bit value.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Temperature(u16);
    impl Debug;
    /// Integer degrees Celsius (two's complement)
    pub i8, degrees, set_degrees: 15, 8;
    /// Fractional part in quarter degrees (0-3)
    pub u8, quarters, set_quarters: 7, 6;
}

impl Temperature {
    /// Builds the value from the MSB and LSB temperature registers.
    #[must_use]
    pub fn from_registers(msb: u8, lsb: u8) -> Self {
        Temperature(u16::from_be_bytes([msb, lsb]))
    }

    /// Temperature in quarter degrees Celsius.
    #[must_use]
    pub fn quarter_degrees(&self) -> i16 {
        i16::from(self.degrees()) * 4 + i16::from(self.quarters())
    }

    /// Temperature in degrees Celsius.
    #[cfg(feature = "temperature_f32")]
    #[must_use]
    pub fn celsius(&self) -> f32 {
        f32::from(self.quarter_degrees()) / 4.0
    }
}

// Alarm registers: bit 7 of every byte is the AxMn mask bit.
bitfield! {
    /// Alarm 1 seconds register.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmSeconds(u8);
    impl Debug;
    /// Alarm mask bit 1 (A1M1)
    pub alarm_mask1, set_alarm_mask1: 7;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(AlarmSeconds);

bitfield! {
    /// Alarm minutes register (both alarms).
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmMinutes(u8);
    impl Debug;
    /// Alarm mask bit 2 (A1M2/A2M2)
    pub alarm_mask2, set_alarm_mask2: 7;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 6, 4;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(AlarmMinutes);

bitfield! {
    /// Alarm hours register (both alarms).
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmHours(u8);
    impl Debug;
    /// Alarm mask bit 3 (A1M3/A2M3)
    pub alarm_mask3, set_alarm_mask3: 7;
    /// Hour format
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    /// Tens of hours in 24-hour format (0-2)
    pub ten_hours, set_ten_hours: 5, 4;
    /// Ones place of hours
    pub hours, set_hours: 3, 0;
}
from_register_u8!(AlarmHours);

bitfield! {
    /// Alarm day/date register (both alarms).
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmDayDate(u8);
    impl Debug;
    /// Alarm mask bit 4 (A1M4/A2M4); set means day/date is ignored
    pub alarm_mask4, set_alarm_mask4: 7;
    /// DY/DT select (1 = day of week, 0 = date of month)
    pub day_select, set_day_select: 6;
    /// Day of week or date value
    pub day_or_date, set_day_or_date: 5, 0;
}
from_register_u8!(AlarmDayDate);
