//! Support for the `TCA9548A` "8-channel I2C switch with reset"
use crate::{BusMutex, Channel, CreateBusMutex, Error, SmBus};

/// Address of the chip with all address pins tied low.
pub const DEFAULT_ADDRESS: u8 = 0x70;

/// Number of downstream channels.
pub const CHANNEL_COUNT: u8 = 8;

/// Chip address for the given levels on the A0, A1 and A2 pins.
pub const fn address_from_pins(a0: bool, a1: bool, a2: bool) -> u8 {
    DEFAULT_ADDRESS | ((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8)
}

/// `TCA9548A` "8-channel I2C switch with reset"
///
/// Owns the upstream bus inside the mutex `M`.  Every [`Channel`] handed out borrows the
/// multiplexer and goes through that same mutex, so the bus can only be reached with exactly one
/// channel selected.
pub struct Tca9548a<M> {
    bus: M,
    address: u8,
}

impl<T> Tca9548a<core::cell::RefCell<T>>
where
    T: SmBus,
{
    /// Multiplexer at [`DEFAULT_ADDRESS`], shared within a single execution context.
    pub fn new(bus: T) -> Self {
        Self::with_mutex(bus, DEFAULT_ADDRESS)
    }
}

impl<T, M> Tca9548a<M>
where
    T: SmBus,
    M: CreateBusMutex<Bus = T>,
{
    pub fn with_mutex(bus: T, address: u8) -> Self {
        Self::from_mutex(CreateBusMutex::create(bus), address)
    }
}

impl<T, M> Tca9548a<M>
where
    T: SmBus,
    M: BusMutex<Bus = T>,
{
    /// Multiplexer around an existing mutex.
    ///
    /// Several multiplexers on the same upstream bus must be built this way around one shared
    /// mutex, e.g. with `&mutex` or an `Arc` clone for `M`.  Only then is at most one channel of
    /// all of them connected at any time.
    pub fn from_mutex(bus: M, address: u8) -> Self {
        Self { bus, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Connect the channels in `mask` to the upstream bus.
    ///
    /// `mask` may have at most one bit set, anything else is refused before touching the bus.  A
    /// channel selected this way stays selected until [`deselect_all()`](Self::deselect_all) or
    /// the next channel transaction.
    pub fn select_channel(&self, mask: u8) -> Result<(), Error<T::Error>> {
        if mask.count_ones() > 1 {
            return Err(Error::InvalidMask(mask));
        }
        self.bus
            .lock(|bus| select(bus, self.address, mask))
            .map_err(Error::Select)
    }

    /// Disconnect all channels from the upstream bus.
    pub fn deselect_all(&self) -> Result<(), Error<T::Error>> {
        self.bus
            .lock(|bus| deselect(bus, self.address))
            .map_err(Error::Deselect)
    }

    /// Read back the control register, bit `n` set means channel `n` is connected.
    pub fn control(&self) -> Result<u8, Error<T::Error>> {
        self.bus
            .lock(|bus| bus.read_byte(self.address, None))
            .map_err(Error::Bus)
    }

    /// Get channel `n`.
    ///
    /// Fails with [`Error::InvalidChannel`] for `n > 7`.
    pub fn channel(&self, n: u8) -> Result<Channel<'_, M>, Error<T::Error>> {
        if n >= CHANNEL_COUNT {
            return Err(Error::InvalidChannel(n));
        }
        Ok(Channel::new(n, self))
    }

    pub fn split(&self) -> Parts<'_, M> {
        Parts {
            ch0: Channel::new(0, self),
            ch1: Channel::new(1, self),
            ch2: Channel::new(2, self),
            ch3: Channel::new(3, self),
            ch4: Channel::new(4, self),
            ch5: Channel::new(5, self),
            ch6: Channel::new(6, self),
            ch7: Channel::new(7, self),
        }
    }

    pub(crate) fn bus(&self) -> &M {
        &self.bus
    }
}

pub struct Parts<'a, M> {
    pub ch0: Channel<'a, M>,
    pub ch1: Channel<'a, M>,
    pub ch2: Channel<'a, M>,
    pub ch3: Channel<'a, M>,
    pub ch4: Channel<'a, M>,
    pub ch5: Channel<'a, M>,
    pub ch6: Channel<'a, M>,
    pub ch7: Channel<'a, M>,
}

pub(crate) fn select<T: SmBus>(bus: &mut T, address: u8, mask: u8) -> Result<(), T::Error> {
    #[cfg(feature = "defmt")]
    defmt::trace!("tca9548a@{=u8:#x}: select {=u8:#b}", address, mask);
    bus.write_byte(address, mask, None)
}

pub(crate) fn deselect<T: SmBus>(bus: &mut T, address: u8) -> Result<(), T::Error> {
    #[cfg(feature = "defmt")]
    defmt::trace!("tca9548a@{=u8:#x}: deselect", address);
    bus.write_byte(address, 0x00, None)
}
