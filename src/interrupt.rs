//! External interrupt line wired to the DS3231 INT/SQW pin.
//!
//! embedded-hal has no notion of attaching an edge interrupt to a pin, so the
//! driver consumes this small trait instead. Implement it for whatever the
//! target HAL uses to configure EXTI (or equivalent) on the input pin.

/// Pull resistor configuration requested when attaching the interrupt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// No internal pull resistor
    None,
    /// Internal pull-up
    Up,
    /// Internal pull-down
    Down,
}

/// Edge that triggers the interrupt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Low to high transition
    Rising,
    /// High to low transition
    Falling,
    /// Both transitions
    Both,
}

/// An interrupt-capable input line.
pub trait InterruptLine {
    /// Arms the interrupt with the given pull and edge configuration.
    fn attach(&mut self, pull: Pull, edge: Edge);

    /// Disarms the interrupt.
    fn detach(&mut self);
}

impl<T: InterruptLine + ?Sized> InterruptLine for &mut T {
    fn attach(&mut self, pull: Pull, edge: Edge) {
        T::attach(self, pull, edge);
    }

    fn detach(&mut self) {
        T::detach(self);
    }
}

/// Placeholder line type for a driver with no interrupt pin connected.
///
/// It has no values, so a `DS3231<_, _, NoInterruptLine>` can never hold a pin.
#[derive(Debug)]
pub enum NoInterruptLine {}

impl InterruptLine for NoInterruptLine {
    fn attach(&mut self, _pull: Pull, _edge: Edge) {
        match *self {}
    }

    fn detach(&mut self) {
        match *self {}
    }
}
