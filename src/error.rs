use crate::Block;
use embedded_hal::i2c::{self as hal_i2c, ErrorKind};

/// Outcome of a channel transfer that succeeded before deselecting failed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completed {
    /// The transfer returned no data, or wrote into a caller supplied buffer.
    Done,
    Byte(u8),
    Word(u16),
    Block(Block),
}

impl From<()> for Completed {
    fn from(_: ()) -> Self {
        Completed::Done
    }
}

impl From<u8> for Completed {
    fn from(v: u8) -> Self {
        Completed::Byte(v)
    }
}

impl From<u16> for Completed {
    fn from(v: u16) -> Self {
        Completed::Word(v)
    }
}

impl From<Block> for Completed {
    fn from(v: Block) -> Self {
        Completed::Block(v)
    }
}

/// Errors of multiplexer and channel operations.
///
/// `E` is the error type of the upstream bus.  Bus errors are never retried or swallowed, they
/// are only tagged with the step of the channel protocol that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The transfer to the downstream device failed.  All channels were deselected afterwards.
    Bus(E),
    /// Selecting the channel failed.  Nothing was sent to the downstream device.
    Select(E),
    /// Deselecting all channels failed.
    Deselect(E),
    /// The transfer succeeded, but deselecting all channels afterwards failed.  The channel may
    /// still be connected.  `completed` holds what the transfer returned.
    DeselectAfter { deselect: E, completed: Completed },
    /// The transfer failed and deselecting all channels afterwards failed, too.
    BusAndDeselect { transfer: E, deselect: E },
    /// Channel number outside of `0..=7`.
    InvalidChannel(u8),
    /// Select mask with more than one channel bit set.
    InvalidMask(u8),
}

impl<E> Error<E> {
    /// The bus error from the downstream transfer, if the transfer got that far and failed.
    pub fn transfer_error(&self) -> Option<&E> {
        match self {
            Error::Bus(e) | Error::BusAndDeselect { transfer: e, .. } => Some(e),
            _ => None,
        }
    }

    /// What a transfer returned when only the deselect after it failed.
    pub fn completed(&self) -> Option<&Completed> {
        match self {
            Error::DeselectAfter { completed, .. } => Some(completed),
            _ => None,
        }
    }
}

impl<E: hal_i2c::Error> hal_i2c::Error for Error<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::Bus(e) | Error::BusAndDeselect { transfer: e, .. } => e.kind(),
            Error::Select(e) | Error::Deselect(e) => e.kind(),
            Error::DeselectAfter { deselect, .. } => deselect.kind(),
            Error::InvalidChannel(_) | Error::InvalidMask(_) => ErrorKind::Other,
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "transfer failed: {e:?}"),
            Error::Select(e) => write!(f, "selecting channel failed: {e:?}"),
            Error::Deselect(e) => write!(f, "deselecting channels failed: {e:?}"),
            Error::DeselectAfter { deselect, .. } => write!(
                f,
                "transfer succeeded, but deselecting channels afterwards failed: {deselect:?}"
            ),
            Error::BusAndDeselect { transfer, deselect } => write!(
                f,
                "transfer failed: {transfer:?} (deselecting channels failed as well: {deselect:?})"
            ),
            Error::InvalidChannel(n) => write!(f, "no channel {n}, valid channels are 0 to 7"),
            Error::InvalidMask(m) => write!(f, "select mask {m:#04x} has more than one bit set"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for Error<E> {}
