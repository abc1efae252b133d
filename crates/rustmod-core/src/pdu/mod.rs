pub mod diagnostics;
pub mod exception;
pub mod function_code;

pub use diagnostics::DiagnosticSubfunction;
pub use exception::{ExceptionCode, ExceptionResponse};
pub use function_code::FunctionCode;

/// Upper quantity bounds from the Modbus application protocol.
pub mod limits {
    pub const MAX_READ_BITS: u16 = 0x07D0;
    pub const MAX_READ_REGISTERS: u16 = 0x007D;
    pub const MAX_WRITE_COILS: u16 = 0x07B0;
    pub const MAX_WRITE_REGISTERS: u16 = 0x007B;
    pub const MAX_RW_WRITE_REGISTERS: u16 = 0x0079;
    /// Highest unicast server address; 248..=255 are reserved.
    pub const MAX_SERVER_ID: u8 = 247;
    pub const BROADCAST_ID: u8 = 0;
}
