use crate::adu::{Adu, CloseOptions};
use crate::config::{DecoderConfig, Line};
use crate::frame::Byte;
use crate::parser::{FrameParser, RequestParser, ResponseParser};
use crate::{AnnotationSink, DecoderError};
use tracing::{debug, trace};

/// One timestamped input event. Events must arrive in time order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    /// A start or stop bit, used only to measure the bit time.
    BitTiming { start: u64, end: u64 },
    /// One received byte.
    Data {
        line: Line,
        value: u8,
        start: u64,
        end: u64,
    },
}

/// Splits the byte stream into frames by silence and feeds them to the
/// request and response accumulators.
#[derive(Debug)]
pub struct ModbusRtuDecoder<S: AnnotationSink> {
    config: DecoderConfig,
    sink: S,
    bitlength: Option<u64>,
    request_parser: RequestParser,
    response_parser: ResponseParser,
    request: Option<Adu<RequestParser>>,
    response: Option<Adu<ResponseParser>>,
}

impl<S: AnnotationSink> ModbusRtuDecoder<S> {
    pub fn new(config: DecoderConfig, sink: S) -> Result<Self, DecoderError> {
        config.validate()?;
        Ok(Self {
            request_parser: RequestParser::new(&config),
            response_parser: ResponseParser::new(&config),
            config,
            sink,
            bitlength: None,
            request: None,
            response: None,
        })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Bit time learned from the first timing marker.
    pub fn bitlength(&self) -> Option<u64> {
        self.bitlength
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn request(&self) -> Option<&Adu<RequestParser>> {
        self.request.as_ref()
    }

    pub fn response(&self) -> Option<&Adu<ResponseParser>> {
        self.response.as_ref()
    }

    pub fn push(&mut self, event: Event) -> Result<(), DecoderError> {
        match event {
            Event::BitTiming { start, end } => {
                let bitlength = end.saturating_sub(start);
                if self.bitlength.is_none() && bitlength > 0 {
                    debug!(bitlength, "learned bit time");
                    self.bitlength = Some(bitlength);
                }
                Ok(())
            }
            Event::Data {
                line,
                value,
                start,
                end,
            } => {
                let Some(bitlength) = self.bitlength else {
                    trace!(?line, value, start, "byte before bit timing ignored");
                    return Ok(());
                };
                let byte = Byte::new(value, start, end);
                let threshold = self.config.silence_threshold(bitlength);
                let options = self.close_options(bitlength);

                if line == self.config.request_line {
                    route(
                        &mut self.request,
                        self.request_parser,
                        byte,
                        threshold,
                        options,
                        &mut self.sink,
                    )?;
                }
                if line == self.config.response_line {
                    route(
                        &mut self.response,
                        self.response_parser,
                        byte,
                        threshold,
                        options,
                        &mut self.sink,
                    )?;
                }
                Ok(())
            }
        }
    }

    /// Closes any open frames, as at the end of a capture.
    pub fn flush(&mut self) -> Result<(), DecoderError> {
        let options = self.close_options(self.bitlength.unwrap_or_default());
        if let Some(adu) = self.request.take() {
            close(adu, options, &mut self.sink)?;
        }
        if let Some(adu) = self.response.take() {
            close(adu, options, &mut self.sink)?;
        }
        Ok(())
    }

    /// Ends the stream and hands back the sink.
    pub fn finish(mut self) -> Result<S, DecoderError> {
        self.flush()?;
        Ok(self.sink)
    }

    fn close_options(&self, bitlength: u64) -> CloseOptions {
        CloseOptions {
            margin: self.config.close_margin(bitlength),
            mark_errors: self.config.marks_error_frames(),
        }
    }
}

/// Appends `byte` to the open frame, or starts a new frame when the
/// silence before it exceeds `threshold`.
fn route<P: FrameParser>(
    slot: &mut Option<Adu<P>>,
    parser: P,
    byte: Byte,
    threshold: u64,
    options: CloseOptions,
    sink: &mut dyn AnnotationSink,
) -> Result<(), DecoderError> {
    if let Some(adu) = slot.as_mut() {
        // overlapping timestamps count as no gap at all
        let gap = byte.start.saturating_sub(adu.frame().last_read());
        if gap <= threshold {
            adu.push(byte, sink)?;
            return Ok(());
        }
    }
    if let Some(adu) = slot.take() {
        close(adu, options, sink)?;
    }

    debug!(role = ?P::ROLE, start = byte.start, "modbus frame opened");
    let mut adu = Adu::new(parser, byte.start);
    adu.push(byte, sink)?;
    *slot = Some(adu);
    Ok(())
}

fn close<P: FrameParser>(
    adu: Adu<P>,
    options: CloseOptions,
    sink: &mut dyn AnnotationSink,
) -> Result<(), DecoderError> {
    let frame = adu.close(sink, options)?;
    debug!(
        role = ?P::ROLE,
        len = frame.len(),
        errors = frame.has_error(),
        "modbus frame closed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Event, ModbusRtuDecoder};
    use crate::annotation::{Annotation, Role};
    use crate::config::{DecoderConfig, Line};
    use crate::DecoderError;

    fn decoder() -> ModbusRtuDecoder<Vec<Annotation>> {
        ModbusRtuDecoder::new(DecoderConfig::default(), Vec::new()).unwrap()
    }

    fn data(line: Line, value: u8, start: u64) -> Event {
        Event::Data {
            line,
            value,
            start,
            end: start + 100,
        }
    }

    #[test]
    fn learns_first_nonzero_bit_time() {
        let mut decoder = decoder();
        decoder.push(Event::BitTiming { start: 5, end: 5 }).unwrap();
        assert_eq!(decoder.bitlength(), None);
        decoder.push(Event::BitTiming { start: 0, end: 10 }).unwrap();
        decoder.push(Event::BitTiming { start: 0, end: 20 }).unwrap();
        assert_eq!(decoder.bitlength(), Some(10));
    }

    #[test]
    fn ignores_bytes_before_bit_time() {
        let mut decoder = decoder();
        decoder.push(data(Line::Tx, 0x11, 0)).unwrap();
        assert!(decoder.request().is_none());
        assert!(decoder.finish().unwrap().is_empty());
    }

    #[test]
    fn silence_threshold_splits_frames() {
        let mut decoder = decoder();
        decoder.push(Event::BitTiming { start: 0, end: 10 }).unwrap();
        decoder.push(data(Line::Tx, 0x11, 1_000)).unwrap();
        // exactly at the threshold still continues the frame
        decoder.push(data(Line::Tx, 0x07, 1_380)).unwrap();
        assert_eq!(decoder.request().map(|adu| adu.frame().len()), Some(2));
        decoder.push(data(Line::Tx, 0x11, 1_761)).unwrap();
        assert_eq!(decoder.request().map(|adu| adu.frame().len()), Some(1));

        let out = decoder.finish().unwrap();
        let too_short = out
            .iter()
            .filter(|a| a.text == "Message too short or not finished")
            .count();
        assert_eq!(too_short, 2);
    }

    #[test]
    fn overlapping_byte_continues_frame() {
        let mut decoder = decoder();
        decoder.push(Event::BitTiming { start: 0, end: 10 }).unwrap();
        decoder.push(data(Line::Tx, 0x11, 1_000)).unwrap();
        decoder.push(data(Line::Tx, 0x07, 1_050)).unwrap();
        assert_eq!(decoder.request().map(|adu| adu.frame().len()), Some(2));
    }

    #[test]
    fn directions_are_independent() {
        let mut decoder = decoder();
        decoder.push(Event::BitTiming { start: 0, end: 10 }).unwrap();
        decoder.push(data(Line::Tx, 0x11, 1_000)).unwrap();
        decoder.push(data(Line::Rx, 0x11, 1_110)).unwrap();
        decoder.push(data(Line::Tx, 0x07, 1_110)).unwrap();
        assert_eq!(decoder.request().map(|adu| adu.frame().len()), Some(2));
        assert_eq!(decoder.response().map(|adu| adu.frame().len()), Some(1));
        let out = decoder.finish().unwrap();
        assert!(out.iter().any(|a| a.role == Role::Request));
        assert!(out.iter().any(|a| a.role == Role::Response));
    }

    #[test]
    fn shared_line_feeds_both_roles() {
        let config = DecoderConfig::default().with_response_line(Line::Tx);
        let mut decoder = ModbusRtuDecoder::new(config, Vec::<Annotation>::new()).unwrap();
        decoder.push(Event::BitTiming { start: 0, end: 10 }).unwrap();
        decoder.push(data(Line::Tx, 0x11, 1_000)).unwrap();
        assert!(decoder.request().is_some());
        assert!(decoder.response().is_some());
        decoder.push(data(Line::Rx, 0x11, 1_110)).unwrap();
        assert_eq!(decoder.request().map(|adu| adu.frame().len()), Some(1));
    }

    #[test]
    fn rejects_invalid_config() {
        let config = DecoderConfig::default().with_frame_gap_bits(0);
        let result = ModbusRtuDecoder::new(config, Vec::<Annotation>::new());
        assert!(matches!(result, Err(DecoderError::InvalidConfig(_))));
    }
}
