//! Recording [`SmBus`] stand-in for tests.
//!
//! Single byte writes and reads to any address in [`MUXES`] are treated as accesses to the control
//! register of a multiplexer at that address, everything else is logged and answered with fixed
//! data.
use crate::{Block, SmBus};
use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const MUX: u8 = 0x70;
pub const MUXES: core::ops::RangeInclusive<u8> = 0x70..=0x77;
pub const WORD: u16 = 0xbeef;
pub const BLOCK: [u8; 2] = [0xde, 0xad];

const NACK: ErrorKind = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    WriteQuick(u8, Option<bool>),
    ReadByte(u8, Option<bool>),
    WriteByte(u8, u8, Option<bool>),
    ReadByteData(u8, u8, Option<bool>),
    WriteByteData(u8, u8, u8, Option<bool>),
    ReadWordData(u8, u8, Option<bool>),
    WriteWordData(u8, u8, u16, Option<bool>),
    ProcessCall(u8, u8, u16, Option<bool>),
    ReadBlockData(u8, u8, Option<bool>),
    WriteBlockData(u8, u8, Vec<u8>, Option<bool>),
    BlockProcessCall(u8, u8, Vec<u8>, Option<bool>),
    ReadI2cBlockData(u8, u8, u8, Option<bool>),
    WriteI2cBlockData(u8, u8, Vec<u8>, Option<bool>),
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    byte: u8,
    control: [u8; 8],
    max_selected_bits: u32,
    fail_device: Option<u8>,
    fail_select: bool,
    fail_deselect: bool,
    delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct Recorder {
    state: Arc<Mutex<State>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Value returned by byte reads.
    pub fn respond_byte(&self, value: u8) {
        self.state().byte = value;
    }

    /// Make every transfer to `addr` fail with a NACK.
    pub fn fail_device(&self, addr: u8) {
        self.state().fail_device = Some(addr);
    }

    pub fn fail_select(&self, fail: bool) {
        self.state().fail_select = fail;
    }

    pub fn fail_deselect(&self, fail: bool) {
        self.state().fail_deselect = fail;
    }

    /// Sleep inside every device transfer, without holding the recorder's own lock.
    pub fn slow_down(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    /// Drain the call log.
    pub fn take(&self) -> Vec<Call> {
        core::mem::take(&mut self.state().calls)
    }

    /// Control register of the multiplexer at [`MUX`].
    pub fn control(&self) -> u8 {
        self.control_of(MUX)
    }

    pub fn control_of(&self, mux: u8) -> u8 {
        self.state().control[usize::from(mux - MUX)]
    }

    /// Most channels ever connected at once, summed over all multiplexers.
    pub fn max_selected_bits(&self) -> u32 {
        self.state().max_selected_bits
    }

    fn device<R>(&self, call: Call, addr: u8, response: R) -> Result<R, ErrorKind> {
        let delay = {
            let mut state = self.state();
            state.calls.push(call);
            if state.fail_device == Some(addr) {
                return Err(NACK);
            }
            state.delay
        };
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        Ok(response)
    }

    fn control_write(&self, mux: u8, value: u8, force: Option<bool>) -> Result<(), ErrorKind> {
        let mut state = self.state();
        state.calls.push(Call::WriteByte(mux, value, force));
        let fail = if value == 0 {
            state.fail_deselect
        } else {
            state.fail_select
        };
        if fail {
            return Err(NACK);
        }
        state.control[usize::from(mux - MUX)] = value;
        let selected = state.control.iter().map(|c| c.count_ones()).sum();
        state.max_selected_bits = state.max_selected_bits.max(selected);
        Ok(())
    }
}

impl ErrorType for Recorder {
    type Error = ErrorKind;
}

impl SmBus for Recorder {
    fn write_quick(&mut self, addr: u8, force: Option<bool>) -> Result<(), Self::Error> {
        self.device(Call::WriteQuick(addr, force), addr, ())
    }

    fn read_byte(&mut self, addr: u8, force: Option<bool>) -> Result<u8, Self::Error> {
        let value = if MUXES.contains(&addr) {
            self.control_of(addr)
        } else {
            self.state().byte
        };
        self.device(Call::ReadByte(addr, force), addr, value)
    }

    fn write_byte(&mut self, addr: u8, value: u8, force: Option<bool>) -> Result<(), Self::Error> {
        if MUXES.contains(&addr) {
            return self.control_write(addr, value, force);
        }
        self.device(Call::WriteByte(addr, value, force), addr, ())
    }

    fn read_byte_data(
        &mut self,
        addr: u8,
        register: u8,
        force: Option<bool>,
    ) -> Result<u8, Self::Error> {
        let value = self.state().byte;
        self.device(Call::ReadByteData(addr, register, force), addr, value)
    }

    fn write_byte_data(
        &mut self,
        addr: u8,
        register: u8,
        value: u8,
        force: Option<bool>,
    ) -> Result<(), Self::Error> {
        self.device(Call::WriteByteData(addr, register, value, force), addr, ())
    }

    fn read_word_data(
        &mut self,
        addr: u8,
        register: u8,
        force: Option<bool>,
    ) -> Result<u16, Self::Error> {
        self.device(Call::ReadWordData(addr, register, force), addr, WORD)
    }

    fn write_word_data(
        &mut self,
        addr: u8,
        register: u8,
        value: u16,
        force: Option<bool>,
    ) -> Result<(), Self::Error> {
        self.device(Call::WriteWordData(addr, register, value, force), addr, ())
    }

    fn process_call(
        &mut self,
        addr: u8,
        register: u8,
        value: u16,
        force: Option<bool>,
    ) -> Result<u16, Self::Error> {
        self.device(Call::ProcessCall(addr, register, value, force), addr, !value)
    }

    fn read_block_data(
        &mut self,
        addr: u8,
        register: u8,
        force: Option<bool>,
    ) -> Result<Block, Self::Error> {
        let block = Block::from_slice(&BLOCK).unwrap();
        self.device(Call::ReadBlockData(addr, register, force), addr, block)
    }

    fn write_block_data(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        force: Option<bool>,
    ) -> Result<(), Self::Error> {
        let call = Call::WriteBlockData(addr, register, data.to_vec(), force);
        self.device(call, addr, ())
    }

    fn block_process_call(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        force: Option<bool>,
    ) -> Result<Block, Self::Error> {
        let reversed: Vec<u8> = data.iter().rev().copied().collect();
        let block = Block::from_slice(&reversed).unwrap();
        let call = Call::BlockProcessCall(addr, register, data.to_vec(), force);
        self.device(call, addr, block)
    }

    fn read_i2c_block_data(
        &mut self,
        addr: u8,
        register: u8,
        length: u8,
        force: Option<bool>,
    ) -> Result<Block, Self::Error> {
        let block: Block = (0..length).collect();
        let call = Call::ReadI2cBlockData(addr, register, length, force);
        self.device(call, addr, block)
    }

    fn write_i2c_block_data(
        &mut self,
        addr: u8,
        register: u8,
        data: &[u8],
        force: Option<bool>,
    ) -> Result<(), Self::Error> {
        let call = Call::WriteI2cBlockData(addr, register, data.to_vec(), force);
        self.device(call, addr, ())
    }
}
