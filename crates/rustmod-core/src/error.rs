use core::fmt;

/// Errors that can occur while checking Modbus data from an input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodeError {
    InvalidFunctionCode,
    InvalidLength,
    InvalidCrc { expected: u16, actual: u16 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFunctionCode => f.write_str("invalid function code"),
            Self::InvalidLength => f.write_str("invalid length"),
            Self::InvalidCrc { expected, actual } => {
                write!(f, "invalid crc (expected {expected:#06x}, got {actual:#06x})")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}
