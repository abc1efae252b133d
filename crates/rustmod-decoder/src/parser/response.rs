use super::{
    address_step, bit_bytes, diagnostics, hex_bytes, mask_write_register, quantity_step,
    register_words, standard_function_text, write_single_coil, write_single_register,
    AddressSpace, FrameParser, WriteKind,
};
use crate::annotation::{Category, Role};
use crate::config::DecoderConfig;
use crate::frame::{Fields, Step};
use crate::DecoderError;
use rustmod_core::pdu::{ExceptionResponse, FunctionCode};

/// Server to client field layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseLayout {
    /// Functions 1 and 2: byte count and bit-packed states.
    ReadBits(AddressSpace),
    /// Functions 3, 4 and 23: byte count and register words.
    ReadRegisters,
    WriteSingleCoil,
    WriteSingleRegister,
    ReadExceptionStatus,
    Diagnostics,
    CommEventCounter,
    CommEventLog,
    /// Functions 15 and 16 echo the address and quantity.
    WriteMultiple(WriteKind),
    ReportServerId,
    MaskWriteRegister,
    /// Exception bit set on a known function.
    Exception,
}

impl ResponseLayout {
    pub const fn for_function(function: u8) -> Option<Self> {
        match function {
            0x01 => Some(Self::ReadBits(AddressSpace::Coils)),
            0x02 => Some(Self::ReadBits(AddressSpace::DiscreteInputs)),
            0x03 | 0x04 | 0x17 => Some(Self::ReadRegisters),
            0x05 => Some(Self::WriteSingleCoil),
            0x06 => Some(Self::WriteSingleRegister),
            0x07 => Some(Self::ReadExceptionStatus),
            0x08 => Some(Self::Diagnostics),
            0x0B => Some(Self::CommEventCounter),
            0x0C => Some(Self::CommEventLog),
            0x0F => Some(Self::WriteMultiple(WriteKind::Coils)),
            0x10 => Some(Self::WriteMultiple(WriteKind::Registers)),
            0x11 => Some(Self::ReportServerId),
            0x16 => Some(Self::MaskWriteRegister),
            code if FunctionCode::from_exception(code).is_some() => Some(Self::Exception),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseParser {
    diagnostics_data_len: usize,
}

impl ResponseParser {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            diagnostics_data_len: config.diagnostics_data_len,
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new(&DecoderConfig::default())
    }
}

impl FrameParser for ResponseParser {
    type Layout = ResponseLayout;

    const ROLE: Role = Role::Response;

    fn layout(&self, function: u8) -> Option<ResponseLayout> {
        ResponseLayout::for_function(function)
    }

    fn function_text(&self, layout: ResponseLayout, function: u8) -> Result<String, DecoderError> {
        if layout != ResponseLayout::Exception {
            return standard_function_text(function);
        }
        let name = FunctionCode::from_exception(function)
            .and_then(FunctionCode::name)
            .ok_or(DecoderError::Internal("exception on a function without a name"))?;
        Ok(format!("Function 0x{function:02X}: {name} exception"))
    }

    fn parse_layout(&self, layout: ResponseLayout, f: &mut Fields<'_>) -> Result<Step, DecoderError> {
        match layout {
            ResponseLayout::ReadBits(space) => read_bits(f, space),
            ResponseLayout::ReadRegisters => read_registers(f),
            ResponseLayout::WriteSingleCoil => write_single_coil(f),
            ResponseLayout::WriteSingleRegister => write_single_register(f),
            ResponseLayout::ReadExceptionStatus => exception_status(f),
            ResponseLayout::Diagnostics => diagnostics(f, self.diagnostics_data_len),
            ResponseLayout::CommEventCounter => comm_event_counter(f),
            ResponseLayout::CommEventLog => comm_event_log(f),
            ResponseLayout::WriteMultiple(kind) => write_multiple(f, kind),
            ResponseLayout::ReportServerId => report_server_id(f),
            ResponseLayout::MaskWriteRegister => mask_write_register(f),
            ResponseLayout::Exception => exception(f),
        }
    }
}

fn read_bits(f: &mut Fields<'_>, space: AddressSpace) -> Result<Step, DecoderError> {
    f.require_len(5);
    let byte_count = need!(f.value(2));
    let payload = usize::from(byte_count);
    f.require_len(5 + payload);
    step!(if byte_count == 0 {
        f.emit_if_new(2, Category::Error, || "Byte count 0 carries no data".to_string())
    } else {
        f.emit_if_new(2, Category::Length, || format!("Byte count: {byte_count}"))
    });
    step!(bit_bytes(f, 3, payload, space.unit())?);
    f.check_crc(4 + payload)
}

fn read_registers(f: &mut Fields<'_>) -> Result<Step, DecoderError> {
    f.require_len(5);
    let byte_count = need!(f.value(2));
    let payload = usize::from(byte_count);
    f.require_len(5 + payload);
    step!(if byte_count % 2 == 1 {
        f.emit_if_new(2, Category::Error, || format!("Odd byte count: {byte_count}"))
    } else {
        f.emit_if_new(2, Category::Length, || format!("Byte count: {byte_count}"))
    });
    step!(register_words(f, 3, payload)?);
    f.check_crc(4 + payload)
}

fn exception_status(f: &mut Fields<'_>) -> Result<Step, DecoderError> {
    f.require_len(5);
    let status = need!(f.value(2));
    step!(f.emit_if_new(2, Category::Data, || format!("Exception status: 0b{status:08b}")));
    f.check_crc(4)
}

/// Busy flag of functions 11 and 12, at `index..=index + 1`.
fn comm_status(f: &mut Fields<'_>, index: usize) -> Result<Step, DecoderError> {
    let status = need!(f.half_word(index));
    Ok(match status {
        0x0000 => f.emit_if_new(index + 1, Category::Data, || "Status: not busy".to_string()),
        0xFFFF => f.emit_if_new(index + 1, Category::Data, || "Status: busy".to_string()),
        other => f.emit_if_new(index + 1, Category::Error, || {
            format!("Invalid status 0x{other:04X}")
        }),
    })
}

fn counter(f: &mut Fields<'_>, index: usize, label: &'static str) -> Result<Step, DecoderError> {
    let count = need!(f.half_word(index));
    Ok(f.emit_if_new(index + 1, Category::Data, || format!("{label}: {count}")))
}

fn comm_event_counter(f: &mut Fields<'_>) -> Result<Step, DecoderError> {
    f.require_len(8);
    step!(comm_status(f, 2)?);
    step!(counter(f, 4, "Event count")?);
    f.check_crc(7)
}

fn comm_event_log(f: &mut Fields<'_>) -> Result<Step, DecoderError> {
    f.require_len(5);
    let byte_count = need!(f.value(2));
    let payload = usize::from(byte_count);
    f.require_len(5 + payload);

    // status, event count and message count come first
    if payload < 6 {
        step!(f.emit_if_new(2, Category::Error, || {
            format!("Byte count {byte_count} is too small for an event log")
        }));
        return f.check_crc(4 + payload);
    }

    step!(f.emit_if_new(2, Category::Length, || format!("Byte count: {byte_count}")));
    step!(comm_status(f, 3)?);
    step!(counter(f, 5, "Event count")?);
    step!(counter(f, 7, "Message count")?);
    for (i, at) in (9..3 + payload).enumerate() {
        let event = need!(f.value(at));
        step!(f.emit_if_new(at, Category::Data, || format!("Event {i}: 0x{event:02X}")));
    }
    f.check_crc(4 + payload)
}

fn write_multiple(f: &mut Fields<'_>, kind: WriteKind) -> Result<Step, DecoderError> {
    f.require_len(8);
    step!(address_step(f, 2, kind.space(), "Start at address")?);
    let (step, _) = quantity_step(f, 4, kind.max_quantity(), |quantity| {
        format!("Wrote {quantity} {}", kind.noun())
    })?;
    step!(step);
    f.check_crc(7)
}

fn report_server_id(f: &mut Fields<'_>) -> Result<Step, DecoderError> {
    f.require_len(7);
    let byte_count = need!(f.value(2));
    let payload = usize::from(byte_count);
    f.require_len(7 + payload);
    step!(f.emit_if_new(2, Category::Length, || format!("Byte count: {byte_count}")));

    let server_id = need!(f.value(3));
    step!(f.emit_if_new(3, Category::Data, || format!("Server ID: {server_id}")));
    if payload > 0 {
        let data = need!(f.values(4, payload));
        step!(f.emit_if_new(3 + payload, Category::Data, || {
            format!("Device specific data: {}", hex_bytes(&data))
        }));
    }

    let run = 4 + payload;
    let indicator = need!(f.value(run));
    step!(match indicator {
        0x00 => f.emit_if_new(run, Category::Data, || "Run indicator: OFF".to_string()),
        0xFF => f.emit_if_new(run, Category::Data, || "Run indicator: ON".to_string()),
        other => f.emit_if_new(run, Category::Error, || {
            format!("Invalid run indicator 0x{other:02X}")
        }),
    });
    f.check_crc(6 + payload)
}

fn exception(f: &mut Fields<'_>) -> Result<Step, DecoderError> {
    f.require_len(5);
    let function = need!(f.value(1));
    let code = need!(f.value(2));
    let response = ExceptionResponse::from_bytes(function, code)
        .map_err(|_| DecoderError::Internal("exception layout on a regular function"))?;
    step!(f.emit_if_new(2, Category::Error, || {
        format!(
            "Exception {code}: {}",
            response.exception_code.description()
        )
    }));
    f.check_crc(4)
}
