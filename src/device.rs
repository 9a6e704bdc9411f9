use crate::{Block, SmBus};
use embedded_hal::i2c::{self as hal_i2c, ErrorType, I2c};

/// A single device on some bus, with its address and `force` flag bound.
///
/// The wrapped bus can be anything implementing [`SmBus`]: a [`Channel`](crate::Channel), a
/// `&mut` reference to the raw upstream bus, ...  `Device` only fills in the address and does no
/// locking of its own.  Put it on top of a channel if the device sits behind the multiplexer.
///
/// ```
/// # use embedded_hal_mock::eh1::i2c as mock_i2c;
/// # let mut i2c = mock_i2c::Mock::new(&[
/// #     mock_i2c::Transaction::write(0x70, vec![0x01]),
/// #     mock_i2c::Transaction::write_read(0x50, vec![0x00], vec![0x2a]),
/// #     mock_i2c::Transaction::write(0x70, vec![0x00]),
/// # ]);
/// let mux = tca9548a::Tca9548a::new(tca9548a::I2cSmBus::new(i2c.clone()));
/// let mut eeprom = tca9548a::Device::new(mux.channel(0).unwrap(), 0x50, None);
/// assert_eq!(eeprom.read_byte_data(0x00).unwrap(), 0x2a);
/// # i2c.done();
/// ```
pub struct Device<B> {
    bus: B,
    address: u8,
    force: Option<bool>,
}

impl<B> Device<B> {
    pub fn new(bus: B, address: u8, force: Option<bool>) -> Self {
        Self {
            bus,
            address,
            force,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn force(&self) -> Option<bool> {
        self.force
    }

    /// Give back the wrapped bus.
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: SmBus> Device<B> {
    pub fn write_quick(&mut self) -> Result<(), B::Error> {
        self.bus.write_quick(self.address, self.force)
    }

    pub fn read_byte(&mut self) -> Result<u8, B::Error> {
        self.bus.read_byte(self.address, self.force)
    }

    pub fn write_byte(&mut self, value: u8) -> Result<(), B::Error> {
        self.bus.write_byte(self.address, value, self.force)
    }

    pub fn read_byte_data(&mut self, register: u8) -> Result<u8, B::Error> {
        self.bus.read_byte_data(self.address, register, self.force)
    }

    pub fn write_byte_data(&mut self, register: u8, value: u8) -> Result<(), B::Error> {
        self.bus
            .write_byte_data(self.address, register, value, self.force)
    }

    pub fn read_word_data(&mut self, register: u8) -> Result<u16, B::Error> {
        self.bus.read_word_data(self.address, register, self.force)
    }

    pub fn write_word_data(&mut self, register: u8, value: u16) -> Result<(), B::Error> {
        self.bus
            .write_word_data(self.address, register, value, self.force)
    }

    pub fn process_call(&mut self, register: u8, value: u16) -> Result<u16, B::Error> {
        self.bus
            .process_call(self.address, register, value, self.force)
    }

    pub fn read_block_data(&mut self, register: u8) -> Result<Block, B::Error> {
        self.bus.read_block_data(self.address, register, self.force)
    }

    pub fn write_block_data(&mut self, register: u8, data: &[u8]) -> Result<(), B::Error> {
        self.bus
            .write_block_data(self.address, register, data, self.force)
    }

    pub fn block_process_call(&mut self, register: u8, data: &[u8]) -> Result<Block, B::Error> {
        self.bus
            .block_process_call(self.address, register, data, self.force)
    }

    pub fn read_i2c_block_data(&mut self, register: u8, length: u8) -> Result<Block, B::Error> {
        self.bus
            .read_i2c_block_data(self.address, register, length, self.force)
    }

    pub fn write_i2c_block_data(&mut self, register: u8, data: &[u8]) -> Result<(), B::Error> {
        self.bus
            .write_i2c_block_data(self.address, register, data, self.force)
    }
}

impl<B: I2c> Device<B> {
    /// Plain I2C read from the device.
    pub fn read(&mut self, read: &mut [u8]) -> Result<(), B::Error> {
        self.bus.read(self.address, read)
    }

    /// Plain I2C write to the device.
    pub fn write(&mut self, write: &[u8]) -> Result<(), B::Error> {
        self.bus.write(self.address, write)
    }

    pub fn write_read(&mut self, write: &[u8], read: &mut [u8]) -> Result<(), B::Error> {
        self.bus.write_read(self.address, write, read)
    }

    pub fn transaction(
        &mut self,
        operations: &mut [hal_i2c::Operation<'_>],
    ) -> Result<(), B::Error> {
        self.bus.transaction(self.address, operations)
    }
}

impl<B: ErrorType> ErrorType for Device<B> {
    type Error = B::Error;
}
