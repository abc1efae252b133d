use crate::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FunctionCode {
    ReadCoils,
    ReadDiscreteInputs,
    ReadHoldingRegisters,
    ReadInputRegisters,
    WriteSingleCoil,
    WriteSingleRegister,
    ReadExceptionStatus,
    Diagnostics,
    GetCommEventCounter,
    GetCommEventLog,
    WriteMultipleCoils,
    WriteMultipleRegisters,
    ReportServerId,
    MaskWriteRegister,
    ReadWriteMultipleRegisters,
    Custom(u8),
}

impl FunctionCode {
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::ReadCoils => 0x01,
            Self::ReadDiscreteInputs => 0x02,
            Self::ReadHoldingRegisters => 0x03,
            Self::ReadInputRegisters => 0x04,
            Self::WriteSingleCoil => 0x05,
            Self::WriteSingleRegister => 0x06,
            Self::ReadExceptionStatus => 0x07,
            Self::Diagnostics => 0x08,
            Self::GetCommEventCounter => 0x0B,
            Self::GetCommEventLog => 0x0C,
            Self::WriteMultipleCoils => 0x0F,
            Self::WriteMultipleRegisters => 0x10,
            Self::ReportServerId => 0x11,
            Self::MaskWriteRegister => 0x16,
            Self::ReadWriteMultipleRegisters => 0x17,
            Self::Custom(code) => code,
        }
    }

    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        if Self::is_exception(value) {
            return Err(DecodeError::InvalidFunctionCode);
        }
        Ok(Self::from_base(value))
    }

    const fn from_base(value: u8) -> Self {
        match value {
            0x01 => Self::ReadCoils,
            0x02 => Self::ReadDiscreteInputs,
            0x03 => Self::ReadHoldingRegisters,
            0x04 => Self::ReadInputRegisters,
            0x05 => Self::WriteSingleCoil,
            0x06 => Self::WriteSingleRegister,
            0x07 => Self::ReadExceptionStatus,
            0x08 => Self::Diagnostics,
            0x0B => Self::GetCommEventCounter,
            0x0C => Self::GetCommEventLog,
            0x0F => Self::WriteMultipleCoils,
            0x10 => Self::WriteMultipleRegisters,
            0x11 => Self::ReportServerId,
            0x16 => Self::MaskWriteRegister,
            0x17 => Self::ReadWriteMultipleRegisters,
            _ => Self::Custom(value),
        }
    }

    /// Resolves the function an exception response refers to.
    ///
    /// Returns `None` when `value` has no exception bit, or when the base
    /// function is not one of the public function codes.
    pub const fn from_exception(value: u8) -> Option<Self> {
        if !Self::is_exception(value) {
            return None;
        }
        match Self::from_base(value & 0x7F) {
            Self::Custom(_) => None,
            known => Some(known),
        }
    }

    pub const fn is_exception(value: u8) -> bool {
        (value & 0x80) != 0
    }

    /// Human-readable name, `None` for custom codes.
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::ReadCoils => Some("Read Coils"),
            Self::ReadDiscreteInputs => Some("Read Discrete Inputs"),
            Self::ReadHoldingRegisters => Some("Read Holding Registers"),
            Self::ReadInputRegisters => Some("Read Input Registers"),
            Self::WriteSingleCoil => Some("Write Single Coil"),
            Self::WriteSingleRegister => Some("Write Single Register"),
            Self::ReadExceptionStatus => Some("Read Exception Status"),
            Self::Diagnostics => Some("Diagnostics"),
            Self::GetCommEventCounter => Some("Get Comm Event Counter"),
            Self::GetCommEventLog => Some("Get Comm Event Log"),
            Self::WriteMultipleCoils => Some("Write Multiple Coils"),
            Self::WriteMultipleRegisters => Some("Write Multiple Registers"),
            Self::ReportServerId => Some("Report Server ID"),
            Self::MaskWriteRegister => Some("Mask Write Register"),
            Self::ReadWriteMultipleRegisters => Some("Read/Write Multiple Registers"),
            Self::Custom(_) => None,
        }
    }
}
