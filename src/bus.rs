use embedded_hal::i2c::{self as hal_i2c, ErrorType, I2c};

/// Largest payload of an SMBus block transfer.
pub const BLOCK_MAX: usize = 32;

/// Data returned by block reads.
pub type Block = heapless::Vec<u8, BLOCK_MAX>;

/// SMBus-style access to devices on an I2C bus.
///
/// This is the set of primitives that a multiplexer [`Channel`](crate::Channel) forwards.  Every
/// method takes the 7-bit device address and an optional `force` flag.  `force` is handed through
/// untouched; it only means something to transports that distinguish forced access to an address
/// already claimed by a kernel driver.  Transports without such a notion ignore it.
///
/// Implementations are not expected to be thread-safe on their own, hence `&mut self`.
pub trait SmBus: ErrorType {
    /// Send only the read/write bit to the device.
    fn write_quick(&mut self, addr: u8, force: Option<bool>) -> Result<(), Self::Error>;

    /// Read a single byte without selecting a register first.
    fn read_byte(&mut self, addr: u8, force: Option<bool>) -> Result<u8, Self::Error>;

    /// Write a single byte without selecting a register first.
    fn write_byte(&mut self, addr: u8, value: u8, force: Option<bool>) -> Result<(), Self::Error>;

    fn read_byte_data(
        &mut self,
        addr: u8,
        register: u8,
        force: Option<bool>,
    ) -> Result<u8, Self::Error>;

    fn write_byte_data(
        &mut self,
        addr: u8,
        register: u8,
        value: u8,
        force: Option<bool>,
    ) -> Result<(), Self::Error>;

    fn read_word_data(
        &mut self,
        addr: u8,
        register: u8,
        force: Option<bool>,
    ) -> Result<u16, Self::Error>;

    fn write_word_data(
        &mut self,
        addr: u8,
        register: u8,
        value: u16,
        force: Option<bool>,
    ) -> Result<(), Self::Error>;

    /// Write a word to `register` and read a word back in the same transfer.
    fn process_call(
        &mut self,
        addr: u8,
        register: u8,
        value: u16,
        force: Option<bool>,
    ) -> Result<u16, Self::Error>;

    /// Read a count-prefixed block of up to [`BLOCK_MAX`] bytes.
    fn read_block_data(
        &mut self,
        addr: u8,
        register: u8,
        force: Option<bool>,
    ) -> Result<Block, Self::Error>;

    /// Write a count-prefixed block of up to [`BLOCK_MAX`] bytes.
    fn write_block_data(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        force: Option<bool>,
    ) -> Result<(), Self::Error>;

    /// Write a count-prefixed block and read a count-prefixed block back in the same transfer.
    fn block_process_call(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        force: Option<bool>,
    ) -> Result<Block, Self::Error>;

    /// Read exactly `length` bytes starting at `register`, without a count byte.
    fn read_i2c_block_data(
        &mut self,
        addr: u8,
        register: u8,
        length: u8,
        force: Option<bool>,
    ) -> Result<Block, Self::Error>;

    /// Write `data` starting at `register`, without a count byte.
    fn write_i2c_block_data(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        force: Option<bool>,
    ) -> Result<(), Self::Error>;
}

impl<T: SmBus + ?Sized> SmBus for &mut T {
    fn write_quick(&mut self, addr: u8, force: Option<bool>) -> Result<(), Self::Error> {
        T::write_quick(self, addr, force)
    }

    fn read_byte(&mut self, addr: u8, force: Option<bool>) -> Result<u8, Self::Error> {
        T::read_byte(self, addr, force)
    }

    fn write_byte(&mut self, addr: u8, value: u8, force: Option<bool>) -> Result<(), Self::Error> {
        T::write_byte(self, addr, value, force)
    }

    fn read_byte_data(
        &mut self,
        addr: u8,
        register: u8,
        force: Option<bool>,
    ) -> Result<u8, Self::Error> {
        T::read_byte_data(self, addr, register, force)
    }

    fn write_byte_data(
        &mut self,
        addr: u8,
        register: u8,
        value: u8,
        force: Option<bool>,
    ) -> Result<(), Self::Error> {
        T::write_byte_data(self, addr, register, value, force)
    }

    fn read_word_data(
        &mut self,
        addr: u8,
        register: u8,
        force: Option<bool>,
    ) -> Result<u16, Self::Error> {
        T::read_word_data(self, addr, register, force)
    }

    fn write_word_data(
        &mut self,
        addr: u8,
        register: u8,
        value: u16,
        force: Option<bool>,
    ) -> Result<(), Self::Error> {
        T::write_word_data(self, addr, register, value, force)
    }

    fn process_call(
        &mut self,
        addr: u8,
        register: u8,
        value: u16,
        force: Option<bool>,
    ) -> Result<u16, Self::Error> {
        T::process_call(self, addr, register, value, force)
    }

    fn read_block_data(
        &mut self,
        addr: u8,
        register: u8,
        force: Option<bool>,
    ) -> Result<Block, Self::Error> {
        T::read_block_data(self, addr, register, force)
    }

    fn write_block_data(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        force: Option<bool>,
    ) -> Result<(), Self::Error> {
        T::write_block_data(self, addr, register, data, force)
    }

    fn block_process_call(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        force: Option<bool>,
    ) -> Result<Block, Self::Error> {
        T::block_process_call(self, addr, register, data, force)
    }

    fn read_i2c_block_data(
        &mut self,
        addr: u8,
        register: u8,
        length: u8,
        force: Option<bool>,
    ) -> Result<Block, Self::Error> {
        T::read_i2c_block_data(self, addr, register, length, force)
    }

    fn write_i2c_block_data(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        force: Option<bool>,
    ) -> Result<(), Self::Error> {
        T::write_i2c_block_data(self, addr, register, data, force)
    }
}

/// Errors of the [`I2cSmBus`] adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SmBusError<E> {
    /// The underlying I2C bus failed.
    Bus(E),
    /// A block was longer than [`BLOCK_MAX`], either as requested or as announced by the device.
    BlockLength(usize),
}

impl<E> From<E> for SmBusError<E> {
    fn from(e: E) -> Self {
        SmBusError::Bus(e)
    }
}

impl<E: hal_i2c::Error> hal_i2c::Error for SmBusError<E> {
    fn kind(&self) -> hal_i2c::ErrorKind {
        match self {
            SmBusError::Bus(e) => e.kind(),
            SmBusError::BlockLength(_) => hal_i2c::ErrorKind::Other,
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for SmBusError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SmBusError::Bus(e) => write!(f, "i2c bus error: {e:?}"),
            SmBusError::BlockLength(n) => {
                write!(f, "block of {n} bytes exceeds the {BLOCK_MAX} byte limit")
            }
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for SmBusError<E> {}

/// [`SmBus`] on top of an `embedded-hal` I2C bus.
///
/// Uses the usual SMBus framing: words are little-endian and block transfers carry a count byte.
/// Count-prefixed block reads always clock in `BLOCK_MAX + 1` bytes and keep as many as the
/// device announced.  `force` is ignored.
///
/// The adapter also passes the plain [`I2c`] interface through so that channels can serve
/// `embedded-hal` drivers as well.
pub struct I2cSmBus<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> I2cSmBus<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

type Frame = heapless::Vec<u8, { BLOCK_MAX + 2 }>;

fn frame_block(register: u8, data: &[u8], counted: bool) -> Result<Frame, usize> {
    if data.len() > BLOCK_MAX {
        return Err(data.len());
    }
    let mut buf = Frame::new();
    buf.push(register).map_err(|_| data.len())?;
    if counted {
        buf.push(data.len() as u8).map_err(|_| data.len())?;
    }
    buf.extend_from_slice(data).map_err(|_| data.len())?;
    Ok(buf)
}

fn unframe_block(buf: &[u8]) -> Result<Block, usize> {
    let count = buf[0] as usize;
    if count > BLOCK_MAX {
        return Err(count);
    }
    Block::from_slice(&buf[1..=count]).map_err(|_| count)
}

impl<I2C: I2c> ErrorType for I2cSmBus<I2C> {
    type Error = SmBusError<I2C::Error>;
}

impl<I2C: I2c> SmBus for I2cSmBus<I2C> {
    fn write_quick(&mut self, addr: u8, _force: Option<bool>) -> Result<(), Self::Error> {
        self.i2c.write(addr, &[])?;
        Ok(())
    }

    fn read_byte(&mut self, addr: u8, _force: Option<bool>) -> Result<u8, Self::Error> {
        let mut buf = [0x00];
        self.i2c.read(addr, &mut buf)?;
        Ok(buf[0])
    }

    fn write_byte(&mut self, addr: u8, value: u8, _force: Option<bool>) -> Result<(), Self::Error> {
        self.i2c.write(addr, &[value])?;
        Ok(())
    }

    fn read_byte_data(
        &mut self,
        addr: u8,
        register: u8,
        _force: Option<bool>,
    ) -> Result<u8, Self::Error> {
        let mut buf = [0x00];
        self.i2c.write_read(addr, &[register], &mut buf)?;
        Ok(buf[0])
    }

    fn write_byte_data(
        &mut self,
        addr: u8,
        register: u8,
        value: u8,
        _force: Option<bool>,
    ) -> Result<(), Self::Error> {
        self.i2c.write(addr, &[register, value])?;
        Ok(())
    }

    fn read_word_data(
        &mut self,
        addr: u8,
        register: u8,
        _force: Option<bool>,
    ) -> Result<u16, Self::Error> {
        let mut buf = [0x00; 2];
        self.i2c.write_read(addr, &[register], &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn write_word_data(
        &mut self,
        addr: u8,
        register: u8,
        value: u16,
        _force: Option<bool>,
    ) -> Result<(), Self::Error> {
        let [lo, hi] = value.to_le_bytes();
        self.i2c.write(addr, &[register, lo, hi])?;
        Ok(())
    }

    fn process_call(
        &mut self,
        addr: u8,
        register: u8,
        value: u16,
        _force: Option<bool>,
    ) -> Result<u16, Self::Error> {
        let [lo, hi] = value.to_le_bytes();
        let mut buf = [0x00; 2];
        self.i2c.write_read(addr, &[register, lo, hi], &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_block_data(
        &mut self,
        addr: u8,
        register: u8,
        _force: Option<bool>,
    ) -> Result<Block, Self::Error> {
        let mut buf = [0x00; BLOCK_MAX + 1];
        self.i2c.write_read(addr, &[register], &mut buf)?;
        unframe_block(&buf).map_err(SmBusError::BlockLength)
    }

    fn write_block_data(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        _force: Option<bool>,
    ) -> Result<(), Self::Error> {
        let frame = frame_block(register, data, true).map_err(SmBusError::BlockLength)?;
        self.i2c.write(addr, &frame)?;
        Ok(())
    }

    fn block_process_call(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        _force: Option<bool>,
    ) -> Result<Block, Self::Error> {
        let frame = frame_block(register, data, true).map_err(SmBusError::BlockLength)?;
        let mut buf = [0x00; BLOCK_MAX + 1];
        self.i2c.write_read(addr, &frame, &mut buf)?;
        unframe_block(&buf).map_err(SmBusError::BlockLength)
    }

    fn read_i2c_block_data(
        &mut self,
        addr: u8,
        register: u8,
        length: u8,
        _force: Option<bool>,
    ) -> Result<Block, Self::Error> {
        let length = length as usize;
        if length > BLOCK_MAX {
            return Err(SmBusError::BlockLength(length));
        }
        let mut buf = [0x00; BLOCK_MAX];
        self.i2c.write_read(addr, &[register], &mut buf[..length])?;
        Block::from_slice(&buf[..length]).map_err(|_| SmBusError::BlockLength(length))
    }

    fn write_i2c_block_data(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        _force: Option<bool>,
    ) -> Result<(), Self::Error> {
        let frame = frame_block(register, data, false).map_err(SmBusError::BlockLength)?;
        self.i2c.write(addr, &frame)?;
        Ok(())
    }
}

impl<I2C: I2c> I2c for I2cSmBus<I2C> {
    fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        Ok(self.i2c.read(address, read)?)
    }

    fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        Ok(self.i2c.write(address, write)?)
    }

    fn write_read(
        &mut self,
        address: u8,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        Ok(self.i2c.write_read(address, write, read)?)
    }

    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [hal_i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        Ok(self.i2c.transaction(address, operations)?)
    }
}
