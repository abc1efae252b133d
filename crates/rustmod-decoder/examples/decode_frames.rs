use rustmod_decoder::{Annotation, DecoderConfig, Event, Line, ModbusRtuDecoder};

/// 9600 baud, timestamps in nanoseconds.
const BIT_NS: u64 = 104_167;
const CHAR_NS: u64 = 11 * BIT_NS;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}

fn send(
    decoder: &mut ModbusRtuDecoder<Vec<Annotation>>,
    line: Line,
    start: u64,
    frame: &[u8],
) -> Result<u64, Box<dyn std::error::Error>> {
    let mut at = start;
    for value in frame {
        decoder.push(Event::Data {
            line,
            value: *value,
            start: at,
            end: at + CHAR_NS,
        })?;
        at += CHAR_NS;
    }
    Ok(at)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut decoder = ModbusRtuDecoder::new(DecoderConfig::default(), Vec::new())?;
    decoder.push(Event::BitTiming {
        start: 0,
        end: BIT_NS,
    })?;

    let silence = 40 * BIT_NS;
    let mut at = silence;
    at = send(
        &mut decoder,
        Line::Tx,
        at,
        &[0x11, 0x03, 0x00, 0x6B, 0x00, 0x03, 0x76, 0x87],
    )?;
    at = send(
        &mut decoder,
        Line::Rx,
        at + silence,
        &[0x11, 0x03, 0x06, 0x02, 0x2B, 0x00, 0x00, 0x00, 0x64, 0xC8, 0xBA],
    )?;
    at = send(&mut decoder, Line::Tx, at + silence, &[0x11, 0x83, 0x02, 0xC1, 0x34])?;
    send(&mut decoder, Line::Rx, at + silence, &[0x11, 0x03])?;

    for annotation in decoder.finish()? {
        println!("{annotation}");
    }
    Ok(())
}
