//! Arbitrated access to the downstream buses of a `TCA9548A` I2C multiplexer.
//!
//! Devices with the same address can share one upstream bus when each of them sits behind a
//! different channel of the multiplexer.  [`Tca9548a`] owns the upstream bus inside a mutex and
//! hands out one [`Channel`] per downstream bus.  A channel behaves like the upstream bus itself:
//! each call selects the channel, runs the transfer and deselects all channels again, all while
//! holding the mutex, so at most one channel is connected at any time.
//!
//! ```
//! # use embedded_hal_mock::eh1::i2c as mock_i2c;
//! # let mut i2c = mock_i2c::Mock::new(&[
//! #     mock_i2c::Transaction::write(0x70, vec![0x01]),
//! #     mock_i2c::Transaction::write_read(0x50, vec![0x00], vec![0x2a]),
//! #     mock_i2c::Transaction::write(0x70, vec![0x00]),
//! #     mock_i2c::Transaction::write(0x70, vec![0x80]),
//! #     mock_i2c::Transaction::write_read(0x50, vec![0x00], vec![0x2b]),
//! #     mock_i2c::Transaction::write(0x70, vec![0x00]),
//! # ]);
//! use tca9548a::SmBus;
//!
//! let mux = tca9548a::Tca9548a::new(tca9548a::I2cSmBus::new(i2c.clone()));
//! let mut left = mux.channel(0).unwrap();
//! let mut right = mux.channel(7).unwrap();
//!
//! // the same EEPROM address on both channels
//! assert_eq!(left.read_byte_data(0x50, 0x00, None).unwrap(), 0x2a);
//! assert_eq!(right.read_byte_data(0x50, 0x00, None).unwrap(), 0x2b);
//! # i2c.done();
//! ```
//!
//! For sharing channels between threads, create the multiplexer with
//! [`Tca9548a::with_mutex()`] and a thread-safe [`BusMutex`] such as `std::sync::Mutex`.  Several
//! multiplexers on one upstream bus are built with [`Tca9548a::from_mutex()`] around one shared
//! mutex.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod bus;
mod channel;
mod device;
mod error;
mod mutex;
mod mux;
#[cfg(test)]
mod recorder;

pub use bus::{Block, I2cSmBus, SmBus, SmBusError, BLOCK_MAX};
pub use channel::Channel;
pub use device::Device;
pub use error::{Completed, Error};
pub use mutex::{BusMutex, CreateBusMutex};
pub use mux::{address_from_pins, Parts, Tca9548a, CHANNEL_COUNT, DEFAULT_ADDRESS};
