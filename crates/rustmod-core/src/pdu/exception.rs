use crate::pdu::FunctionCode;
use crate::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExceptionCode {
    IllegalFunction,
    IllegalDataAddress,
    IllegalDataValue,
    ServerDeviceFailure,
    Acknowledge,
    ServerDeviceBusy,
    NegativeAcknowledge,
    MemoryParityError,
    GatewayPathUnavailable,
    GatewayTargetFailedToRespond,
    Unknown(u8),
}

impl ExceptionCode {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0x01 => Self::IllegalFunction,
            0x02 => Self::IllegalDataAddress,
            0x03 => Self::IllegalDataValue,
            0x04 => Self::ServerDeviceFailure,
            0x05 => Self::Acknowledge,
            0x06 => Self::ServerDeviceBusy,
            0x07 => Self::NegativeAcknowledge,
            0x08 => Self::MemoryParityError,
            0x0A => Self::GatewayPathUnavailable,
            0x0B => Self::GatewayTargetFailedToRespond,
            other => Self::Unknown(other),
        }
    }

    pub const fn as_u8(self) -> u8 {
        match self {
            Self::IllegalFunction => 0x01,
            Self::IllegalDataAddress => 0x02,
            Self::IllegalDataValue => 0x03,
            Self::ServerDeviceFailure => 0x04,
            Self::Acknowledge => 0x05,
            Self::ServerDeviceBusy => 0x06,
            Self::NegativeAcknowledge => 0x07,
            Self::MemoryParityError => 0x08,
            Self::GatewayPathUnavailable => 0x0A,
            Self::GatewayTargetFailedToRespond => 0x0B,
            Self::Unknown(raw) => raw,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::IllegalFunction => "Illegal function",
            Self::IllegalDataAddress => "Illegal data address",
            Self::IllegalDataValue => "Illegal data value",
            Self::ServerDeviceFailure => "Slave device failure",
            Self::Acknowledge => "Acknowledge",
            Self::ServerDeviceBusy => "Slave device busy",
            Self::NegativeAcknowledge => "Negative acknowledge",
            Self::MemoryParityError => "Memory parity error",
            Self::GatewayPathUnavailable => "Gateway path unavailable",
            Self::GatewayTargetFailedToRespond => "Gateway target device failed to respond",
            Self::Unknown(_) => "Unknown exception code",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExceptionResponse {
    /// Function the exception answers, without the exception bit (bit 7).
    pub function: FunctionCode,
    pub exception_code: ExceptionCode,
}

impl ExceptionResponse {
    /// Builds an exception response from the raw function byte (bit 7 set)
    /// and the exception code byte.
    pub fn from_bytes(function_byte: u8, exception: u8) -> Result<Self, DecodeError> {
        let function =
            FunctionCode::from_exception(function_byte).ok_or(DecodeError::InvalidFunctionCode)?;
        Ok(Self {
            function,
            exception_code: ExceptionCode::from_u8(exception),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ExceptionCode, ExceptionResponse};
    use crate::pdu::FunctionCode;
    use crate::DecodeError;

    #[test]
    fn decodes_exception_response() {
        let decoded = ExceptionResponse::from_bytes(0x83, 0x06).unwrap();
        assert_eq!(decoded.function, FunctionCode::ReadHoldingRegisters);
        assert_eq!(decoded.exception_code, ExceptionCode::ServerDeviceBusy);
        assert_eq!(decoded.exception_code.description(), "Slave device busy");
    }

    #[test]
    fn preserves_unknown_exception_codes() {
        let decoded = ExceptionResponse::from_bytes(0x83, 0x11).unwrap();
        assert_eq!(decoded.exception_code, ExceptionCode::Unknown(0x11));
        assert_eq!(decoded.exception_code.as_u8(), 0x11);
    }

    #[test]
    fn rejects_non_exception_function_bytes() {
        assert_eq!(
            ExceptionResponse::from_bytes(0x03, 0x02).unwrap_err(),
            DecodeError::InvalidFunctionCode
        );
        assert_eq!(
            ExceptionResponse::from_bytes(0x99, 0x02).unwrap_err(),
            DecodeError::InvalidFunctionCode
        );
    }
}
