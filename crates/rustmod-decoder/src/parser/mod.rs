//! Function-code field tables for both frame roles.
//!
//! Every parse pass starts again at the server id and walks the fields in
//! wire order. Each field is one emit-if-new step; the first step that emits
//! or runs out of bytes ends the pass. Re-running a pass over the same bytes
//! therefore reports nothing twice.

/// Propagates any step result other than [`Step::Continue`].
macro_rules! step {
    ($step:expr) => {
        match $step {
            $crate::frame::Step::Continue => {}
            other => return Ok(other),
        }
    };
}

/// Unwraps a guarded read, deferring the pass when the bytes are missing.
macro_rules! need {
    ($value:expr) => {
        match $value {
            Some(value) => value,
            None => return Ok($crate::frame::Step::NeedMoreData),
        }
    };
}

mod request;
mod response;

pub use request::{RequestLayout, RequestParser};
pub use response::{ResponseLayout, ResponseParser};

use crate::annotation::{Category, Role};
use crate::frame::{Fields, Step};
use crate::DecoderError;
use rustmod_core::frame::rtu::MIN_ADU_LEN;
use rustmod_core::pdu::limits::{
    BROADCAST_ID, MAX_SERVER_ID, MAX_WRITE_COILS, MAX_WRITE_REGISTERS,
};
use rustmod_core::pdu::{DiagnosticSubfunction, FunctionCode};
use std::fmt;

/// Role-specific field table.
pub trait FrameParser: Copy {
    /// Decode operation selected by a function code.
    type Layout: Copy + fmt::Debug;

    const ROLE: Role;

    /// Static function code lookup. `None` means "unknown function".
    fn layout(&self, function: u8) -> Option<Self::Layout>;

    /// Decodes everything after the function byte.
    fn parse_layout(&self, layout: Self::Layout, f: &mut Fields<'_>) -> Result<Step, DecoderError>;

    fn function_text(&self, _layout: Self::Layout, function: u8) -> Result<String, DecoderError> {
        standard_function_text(function)
    }

    fn recognizes(&self, function: u8) -> bool {
        self.layout(function).is_some()
    }

    /// One parse pass over the frame.
    ///
    /// Unknown functions stay pending: only the frame's close knows where
    /// the unknown payload ends.
    fn parse(&self, f: &mut Fields<'_>) -> Result<Step, DecoderError> {
        if f.len() < MIN_ADU_LEN {
            return Ok(Step::NeedMoreData);
        }

        let server_id = need!(f.value(0));
        step!(server_id_step(f, Self::ROLE, server_id));

        let function = need!(f.value(1));
        let Some(layout) = self.layout(function) else {
            return Ok(Step::NeedMoreData);
        };
        step!(f.try_emit_if_new(1, Category::Function, || self.function_text(layout, function))?);

        self.parse_layout(layout, f)
    }
}

fn server_id_step(f: &mut Fields<'_>, role: Role, id: u8) -> Step {
    match (role, id) {
        (Role::Request, BROADCAST_ID) => {
            f.emit_if_new(0, Category::ServerId, || "Slave ID: 0 (broadcast)".to_string())
        }
        (Role::Response, BROADCAST_ID) => f.emit_if_new(0, Category::Error, || {
            "Slave ID 0 is a broadcast address and cannot reply".to_string()
        }),
        (_, id) if id <= MAX_SERVER_ID => {
            f.emit_if_new(0, Category::ServerId, || format!("Slave ID: {id}"))
        }
        (_, id) => f.emit_if_new(0, Category::Error, || format!("Slave ID {id} is reserved")),
    }
}

pub(crate) fn standard_function_text(function: u8) -> Result<String, DecoderError> {
    let name = FunctionCode::from_u8(function)
        .ok()
        .and_then(FunctionCode::name)
        .ok_or(DecoderError::Internal("function table entry without a name"))?;
    Ok(format!("Function {function}: {name}"))
}

/// Data table an address refers to. Only affects the long-form address shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSpace {
    Coils,
    DiscreteInputs,
    InputRegisters,
    HoldingRegisters,
}

impl AddressSpace {
    const fn base(self) -> u32 {
        match self {
            Self::Coils => 1,
            Self::DiscreteInputs => 10_001,
            Self::InputRegisters => 30_001,
            Self::HoldingRegisters => 40_001,
        }
    }

    /// Conventional one-based "long form" number, e.g. 40108 for holding
    /// register 0x6B.
    pub const fn long_form(self, address: u16) -> u32 {
        self.base() + address as u32
    }

    const fn unit(self) -> &'static str {
        match self {
            Self::Coils => "Coils",
            Self::DiscreteInputs => "Inputs",
            Self::InputRegisters | Self::HoldingRegisters => "Registers",
        }
    }
}

/// Target of functions 15 and 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Coils,
    Registers,
}

impl WriteKind {
    const fn space(self) -> AddressSpace {
        match self {
            Self::Coils => AddressSpace::Coils,
            Self::Registers => AddressSpace::HoldingRegisters,
        }
    }

    const fn max_quantity(self) -> u16 {
        match self {
            Self::Coils => MAX_WRITE_COILS,
            Self::Registers => MAX_WRITE_REGISTERS,
        }
    }

    const fn noun(self) -> &'static str {
        match self {
            Self::Coils => "coils",
            Self::Registers => "registers",
        }
    }

    /// Payload size implied by `quantity`.
    fn byte_count(self, quantity: u16) -> usize {
        match self {
            Self::Coils => usize::from(quantity).div_ceil(8),
            Self::Registers => usize::from(quantity) * 2,
        }
    }
}

fn hex_bytes(values: &[u8]) -> String {
    values
        .iter()
        .map(|value| format!("0x{value:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn address_step(
    f: &mut Fields<'_>,
    index: usize,
    space: AddressSpace,
    label: &'static str,
) -> Result<Step, DecoderError> {
    let address = need!(f.half_word(index));
    Ok(f.emit_if_new(index + 1, Category::Address, || {
        format!("{label} 0x{address:X} / {}", space.long_form(address))
    }))
}

/// Quantity field at `index..=index + 1`, bounded to `1..=max`.
fn quantity_step<F>(
    f: &mut Fields<'_>,
    index: usize,
    max: u16,
    text: F,
) -> Result<(Step, u16), DecoderError>
where
    F: FnOnce(u16) -> String,
{
    let Some(quantity) = f.half_word(index) else {
        return Ok((Step::NeedMoreData, 0));
    };
    let step = if (1..=max).contains(&quantity) {
        f.emit_if_new(index + 1, Category::Length, || text(quantity))
    } else {
        f.emit_if_new(index + 1, Category::Error, || {
            format!("Quantity {quantity} is out of range (1..={max})")
        })
    };
    Ok((step, quantity))
}

/// Byte count at `index`, cross-checked against what the quantity implies.
fn byte_count_step(f: &mut Fields<'_>, index: usize, byte_count: u8, expected: usize) -> Step {
    if usize::from(byte_count) == expected {
        f.emit_if_new(index, Category::Length, || format!("Byte count: {byte_count}"))
    } else {
        f.emit_if_new(index, Category::Error, || {
            format!("Byte count {byte_count} does not match quantity (expected {expected})")
        })
    }
}

/// Register words packed from `first`, one span per register. A trailing
/// odd byte gets its own span.
fn register_words(f: &mut Fields<'_>, first: usize, byte_count: usize) -> Result<Step, DecoderError> {
    for i in 0..byte_count / 2 {
        let at = first + 2 * i;
        let value = need!(f.half_word(at));
        step!(f.emit_if_new(at + 1, Category::Data, || {
            format!("Register {i}: 0x{value:04X} / {value}")
        }));
    }
    if byte_count % 2 == 1 {
        let at = first + byte_count - 1;
        let value = need!(f.value(at));
        step!(f.emit_if_new(at, Category::Data, || format!("Unpaired byte 0x{value:02X}")));
    }
    Ok(Step::Continue)
}

/// Bit-packed status bytes from `first`, least significant bit first.
fn bit_bytes(
    f: &mut Fields<'_>,
    first: usize,
    count: usize,
    unit: &'static str,
) -> Result<Step, DecoderError> {
    for i in 0..count {
        let at = first + i;
        let value = need!(f.value(at));
        step!(f.emit_if_new(at, Category::Data, || {
            format!("{unit} {}-{}: 0b{value:08b}", i * 8, i * 8 + 7)
        }));
    }
    Ok(Step::Continue)
}

fn write_single_coil(f: &mut Fields<'_>) -> Result<Step, DecoderError> {
    f.require_len(8);
    step!(address_step(f, 2, AddressSpace::Coils, "Address")?);
    let value = need!(f.half_word(4));
    step!(match value {
        0x0000 => f.emit_if_new(5, Category::Data, || "Coil value OFF".to_string()),
        0xFF00 => f.emit_if_new(5, Category::Data, || "Coil value ON".to_string()),
        other => f.emit_if_new(5, Category::Error, || {
            format!("Invalid coil value 0x{other:04X}")
        }),
    });
    f.check_crc(7)
}

fn write_single_register(f: &mut Fields<'_>) -> Result<Step, DecoderError> {
    f.require_len(8);
    step!(address_step(f, 2, AddressSpace::HoldingRegisters, "Address")?);
    let value = need!(f.half_word(4));
    step!(f.emit_if_new(5, Category::Data, || {
        format!("Register value 0x{value:04X} / {value}")
    }));
    f.check_crc(7)
}

fn diagnostics(f: &mut Fields<'_>, data_len: usize) -> Result<Step, DecoderError> {
    f.require_len(6 + data_len);
    let raw = need!(f.half_word(2));
    step!(match DiagnosticSubfunction::from_u16(raw) {
        Some(sub) => f.emit_if_new(3, Category::Function, || {
            format!("Subfunction {raw}: {}", sub.name())
        }),
        None => f.emit_if_new(3, Category::Error, || format!("Unknown subfunction 0x{raw:04X}")),
    });
    if data_len > 0 {
        let data = need!(f.values(4, data_len));
        step!(f.emit_if_new(3 + data_len, Category::Data, || {
            format!("Data: {}", hex_bytes(&data))
        }));
    }
    f.check_crc(5 + data_len)
}

fn mask_write_register(f: &mut Fields<'_>) -> Result<Step, DecoderError> {
    f.require_len(10);
    step!(address_step(f, 2, AddressSpace::HoldingRegisters, "Address")?);
    let and_mask = need!(f.half_word(4));
    step!(f.emit_if_new(5, Category::Data, || format!("AND mask 0x{and_mask:04X}")));
    let or_mask = need!(f.half_word(6));
    step!(f.emit_if_new(7, Category::Data, || format!("OR mask 0x{or_mask:04X}")));
    f.check_crc(9)
}
