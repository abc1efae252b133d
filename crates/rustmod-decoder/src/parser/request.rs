use super::{
    address_step, bit_bytes, byte_count_step, diagnostics, mask_write_register, quantity_step,
    register_words, write_single_coil, write_single_register, AddressSpace, FrameParser,
    WriteKind,
};
use crate::annotation::Role;
use crate::config::DecoderConfig;
use crate::frame::{Fields, Step};
use crate::DecoderError;
use rustmod_core::pdu::limits::{MAX_READ_BITS, MAX_READ_REGISTERS, MAX_RW_WRITE_REGISTERS};

/// Client to server field layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestLayout {
    /// Functions 1 and 2: start address and bit count.
    ReadBits(AddressSpace),
    /// Functions 3 and 4: start address and register count.
    ReadRegisters(AddressSpace),
    WriteSingleCoil,
    WriteSingleRegister,
    /// Functions 7, 11, 12 and 17 carry nothing but the CRC.
    NoData,
    Diagnostics,
    WriteMultiple(WriteKind),
    MaskWriteRegister,
    ReadWriteMultipleRegisters,
}

impl RequestLayout {
    pub const fn for_function(function: u8) -> Option<Self> {
        match function {
            0x01 => Some(Self::ReadBits(AddressSpace::Coils)),
            0x02 => Some(Self::ReadBits(AddressSpace::DiscreteInputs)),
            0x03 => Some(Self::ReadRegisters(AddressSpace::HoldingRegisters)),
            0x04 => Some(Self::ReadRegisters(AddressSpace::InputRegisters)),
            0x05 => Some(Self::WriteSingleCoil),
            0x06 => Some(Self::WriteSingleRegister),
            0x07 | 0x0B | 0x0C | 0x11 => Some(Self::NoData),
            0x08 => Some(Self::Diagnostics),
            0x0F => Some(Self::WriteMultiple(WriteKind::Coils)),
            0x10 => Some(Self::WriteMultiple(WriteKind::Registers)),
            0x16 => Some(Self::MaskWriteRegister),
            0x17 => Some(Self::ReadWriteMultipleRegisters),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestParser {
    diagnostics_data_len: usize,
}

impl RequestParser {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            diagnostics_data_len: config.diagnostics_data_len,
        }
    }
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new(&DecoderConfig::default())
    }
}

impl FrameParser for RequestParser {
    type Layout = RequestLayout;

    const ROLE: Role = Role::Request;

    fn layout(&self, function: u8) -> Option<RequestLayout> {
        RequestLayout::for_function(function)
    }

    fn parse_layout(&self, layout: RequestLayout, f: &mut Fields<'_>) -> Result<Step, DecoderError> {
        match layout {
            RequestLayout::ReadBits(space) => read_request(f, space, MAX_READ_BITS),
            RequestLayout::ReadRegisters(space) => read_request(f, space, MAX_READ_REGISTERS),
            RequestLayout::WriteSingleCoil => write_single_coil(f),
            RequestLayout::WriteSingleRegister => write_single_register(f),
            RequestLayout::NoData => f.check_crc(3),
            RequestLayout::Diagnostics => diagnostics(f, self.diagnostics_data_len),
            RequestLayout::WriteMultiple(kind) => write_multiple(f, kind),
            RequestLayout::MaskWriteRegister => mask_write_register(f),
            RequestLayout::ReadWriteMultipleRegisters => read_write_multiple(f),
        }
    }
}

fn read_request(f: &mut Fields<'_>, space: AddressSpace, max: u16) -> Result<Step, DecoderError> {
    f.require_len(8);
    step!(address_step(f, 2, space, "Start at address")?);
    let (step, _) = quantity_step(f, 4, max, |quantity| format!("Read {quantity} units of data"))?;
    step!(step);
    f.check_crc(7)
}

fn write_multiple(f: &mut Fields<'_>, kind: WriteKind) -> Result<Step, DecoderError> {
    f.require_len(9);
    step!(address_step(f, 2, kind.space(), "Start at address")?);
    let (step, quantity) = quantity_step(f, 4, kind.max_quantity(), |quantity| {
        format!("Write {quantity} {}", kind.noun())
    })?;
    step!(step);

    let byte_count = need!(f.value(6));
    let payload = usize::from(byte_count);
    f.require_len(9 + payload);
    step!(byte_count_step(f, 6, byte_count, kind.byte_count(quantity)));
    step!(match kind {
        WriteKind::Coils => bit_bytes(f, 7, payload, AddressSpace::Coils.unit())?,
        WriteKind::Registers => register_words(f, 7, payload)?,
    });
    f.check_crc(8 + payload)
}

fn read_write_multiple(f: &mut Fields<'_>) -> Result<Step, DecoderError> {
    f.require_len(13);
    step!(address_step(f, 2, AddressSpace::HoldingRegisters, "Read from address")?);
    let (step, _) = quantity_step(f, 4, MAX_READ_REGISTERS, |quantity| {
        format!("Read {quantity} registers")
    })?;
    step!(step);
    step!(address_step(f, 6, AddressSpace::HoldingRegisters, "Write to address")?);
    let (step, write_quantity) = quantity_step(f, 8, MAX_RW_WRITE_REGISTERS, |quantity| {
        format!("Write {quantity} registers")
    })?;
    step!(step);

    let byte_count = need!(f.value(10));
    let payload = usize::from(byte_count);
    f.require_len(13 + payload);
    step!(byte_count_step(
        f,
        10,
        byte_count,
        WriteKind::Registers.byte_count(write_quantity)
    ));
    step!(register_words(f, 11, payload)?);
    f.check_crc(12 + payload)
}
