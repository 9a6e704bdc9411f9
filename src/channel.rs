use crate::mux::{self, Tca9548a};
use crate::{Block, BusMutex, Completed, Error, SmBus};
use embedded_hal::i2c::{self as hal_i2c, ErrorType, I2c};

/// One downstream bus of a [`Tca9548a`].
///
/// `Channel` is not constructed directly, it is obtained from [`Tca9548a::channel()`] or
/// [`Tca9548a::split()`].  It can be used like the upstream bus itself: every call selects this
/// channel, runs the transfer and deselects all channels again, while holding the mutex of the
/// multiplexer the whole time.
pub struct Channel<'a, M> {
    mux: &'a Tca9548a<M>,
    number: u8,
    mask: u8,
}

impl<'a, M> Clone for Channel<'a, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M> Copy for Channel<'a, M> {}

impl<'a, M, T> Channel<'a, M>
where
    T: SmBus,
    M: BusMutex<Bus = T>,
{
    pub(crate) fn new(number: u8, mux: &'a Tca9548a<M>) -> Self {
        assert!(number < mux::CHANNEL_COUNT);
        Self {
            mux,
            number,
            mask: 1 << number,
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    /// Value written to the control register to select this channel.
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Run `f` on the upstream bus with this channel selected.
    ///
    /// All channels are deselected after `f`, whether it succeeded or not.  If selecting fails,
    /// `f` is not called.  If only deselecting fails, the value returned by `f` is handed back
    /// inside [`Error::DeselectAfter`].
    pub fn with_bus<R, F>(&self, f: F) -> Result<R, Error<T::Error>>
    where
        R: Into<Completed>,
        F: FnOnce(&mut T) -> Result<R, T::Error>,
    {
        let address = self.mux.address();
        self.mux.bus().lock(|bus| -> Result<R, Error<T::Error>> {
            mux::select(bus, address, self.mask).map_err(Error::Select)?;
            let result = f(bus);
            let cleanup = mux::deselect(bus, address);
            match (result, cleanup) {
                (Ok(v), Ok(())) => Ok(v),
                (Ok(v), Err(d)) => Err(Error::DeselectAfter {
                    deselect: d,
                    completed: v.into(),
                }),
                (Err(e), Ok(())) => Err(Error::Bus(e)),
                (Err(e), Err(d)) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "tca9548a@{=u8:#x}: deselect after failed transfer on channel {=u8} failed",
                        address,
                        self.number
                    );
                    Err(Error::BusAndDeselect {
                        transfer: e,
                        deselect: d,
                    })
                }
            }
        })
    }
}

impl<'a, M, T> ErrorType for Channel<'a, M>
where
    T: SmBus,
    M: BusMutex<Bus = T>,
{
    type Error = Error<T::Error>;
}

impl<'a, M, T> SmBus for Channel<'a, M>
where
    T: SmBus,
    M: BusMutex<Bus = T>,
{
    fn write_quick(&mut self, addr: u8, force: Option<bool>) -> Result<(), Self::Error> {
        self.with_bus(|bus| bus.write_quick(addr, force))
    }

    fn read_byte(&mut self, addr: u8, force: Option<bool>) -> Result<u8, Self::Error> {
        self.with_bus(|bus| bus.read_byte(addr, force))
    }

    fn write_byte(&mut self, addr: u8, value: u8, force: Option<bool>) -> Result<(), Self::Error> {
        self.with_bus(|bus| bus.write_byte(addr, value, force))
    }

    fn read_byte_data(
        &mut self,
        addr: u8,
        register: u8,
        force: Option<bool>,
    ) -> Result<u8, Self::Error> {
        self.with_bus(|bus| bus.read_byte_data(addr, register, force))
    }

    fn write_byte_data(
        &mut self,
        addr: u8,
        register: u8,
        value: u8,
        force: Option<bool>,
    ) -> Result<(), Self::Error> {
        self.with_bus(|bus| bus.write_byte_data(addr, register, value, force))
    }

    fn read_word_data(
        &mut self,
        addr: u8,
        register: u8,
        force: Option<bool>,
    ) -> Result<u16, Self::Error> {
        self.with_bus(|bus| bus.read_word_data(addr, register, force))
    }

    fn write_word_data(
        &mut self,
        addr: u8,
        register: u8,
        value: u16,
        force: Option<bool>,
    ) -> Result<(), Self::Error> {
        self.with_bus(|bus| bus.write_word_data(addr, register, value, force))
    }

    fn process_call(
        &mut self,
        addr: u8,
        register: u8,
        value: u16,
        force: Option<bool>,
    ) -> Result<u16, Self::Error> {
        self.with_bus(|bus| bus.process_call(addr, register, value, force))
    }

    fn read_block_data(
        &mut self,
        addr: u8,
        register: u8,
        force: Option<bool>,
    ) -> Result<Block, Self::Error> {
        self.with_bus(|bus| bus.read_block_data(addr, register, force))
    }

    fn write_block_data(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        force: Option<bool>,
    ) -> Result<(), Self::Error> {
        self.with_bus(|bus| bus.write_block_data(addr, register, data, force))
    }

    fn block_process_call(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        force: Option<bool>,
    ) -> Result<Block, Self::Error> {
        self.with_bus(|bus| bus.block_process_call(addr, register, data, force))
    }

    fn read_i2c_block_data(
        &mut self,
        addr: u8,
        register: u8,
        length: u8,
        force: Option<bool>,
    ) -> Result<Block, Self::Error> {
        self.with_bus(|bus| bus.read_i2c_block_data(addr, register, length, force))
    }

    fn write_i2c_block_data(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        force: Option<bool>,
    ) -> Result<(), Self::Error> {
        self.with_bus(|bus| bus.write_i2c_block_data(addr, register, data, force))
    }
}

impl<'a, M, T> I2c for Channel<'a, M>
where
    T: SmBus + I2c,
    M: BusMutex<Bus = T>,
{
    fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        self.with_bus(|bus| bus.read(address, read))
    }

    fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        self.with_bus(|bus| bus.write(address, write))
    }

    fn write_read(
        &mut self,
        address: u8,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.with_bus(|bus| bus.write_read(address, write, read))
    }

    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [hal_i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.with_bus(|bus| I2c::transaction(bus, address, operations))
    }
}
