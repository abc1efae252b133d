use crate::annotation::Category;
use crate::frame::{Byte, Fields, Frame, Step};
use crate::parser::FrameParser;
use crate::{AnnotationSink, DecoderError};
use rustmod_core::frame::rtu::{MAX_ADU_LEN, MIN_ADU_LEN};
use tracing::warn;

/// Settings applied when a frame is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CloseOptions {
    /// Time added past the last byte for a "too short" span.
    pub margin: u64,
    /// Emit a whole-frame marker on frames with errors.
    pub mark_errors: bool,
}

/// One application data unit being received in a single direction.
///
/// Closing consumes the accumulator, so nothing can be appended afterwards.
#[derive(Debug, Clone)]
pub struct Adu<P: FrameParser> {
    parser: P,
    frame: Frame,
}

impl<P: FrameParser> Adu<P> {
    pub fn new(parser: P, start: u64) -> Self {
        Self {
            parser,
            frame: Frame::new(P::ROLE, start),
        }
    }

    pub fn parser(&self) -> P {
        self.parser
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Appends a byte without parsing.
    pub fn append(&mut self, byte: Byte) {
        self.frame.append(byte);
    }

    /// Runs parse passes until one ends without emitting.
    ///
    /// Every emission advances the cursor, so this terminates within
    /// `len` passes.
    pub fn parse(&mut self, sink: &mut dyn AnnotationSink) -> Result<Step, DecoderError> {
        loop {
            let step = self
                .parser
                .parse(&mut Fields::new(&mut self.frame, &mut *sink))?;
            if step != Step::Emitted {
                return Ok(step);
            }
        }
    }

    pub fn push(&mut self, byte: Byte, sink: &mut dyn AnnotationSink) -> Result<Step, DecoderError> {
        self.append(byte);
        self.parse(sink)
    }

    /// Runs the trailing checks and returns the finished frame.
    pub fn close(
        mut self,
        sink: &mut dyn AnnotationSink,
        options: CloseOptions,
    ) -> Result<Frame, DecoderError> {
        let parsed = self.parse(sink)?;
        let frame = &mut self.frame;
        let len = frame.len();
        let Some(last) = len.checked_sub(1) else {
            return Ok(self.frame);
        };

        if len >= MIN_ADU_LEN {
            if let Some(function) = frame.value(1) {
                if !self.parser.recognizes(function) {
                    frame.emit_if_new(sink, last, Category::Error, || {
                        format!("Unknown function: {function}")
                    });
                }
            }
        }

        let oversized = len > MAX_ADU_LEN;
        if oversized {
            warn!(role = ?P::ROLE, len, "modbus frame exceeds maximum size");
            let text = || "Modbus data frames are limited to 256 bytes".to_string();
            if frame.emit_if_new(sink, last, Category::Error, text) == Step::Continue {
                // cursor covers the whole frame; the crossing byte is used
                // unless an error span already owns it
                let (start, end) = if frame.error_covers(MAX_ADU_LEN) {
                    (
                        frame.bytes()[last].end,
                        frame.last_read().saturating_add(options.margin),
                    )
                } else {
                    let crossing = frame.bytes()[MAX_ADU_LEN];
                    (crossing.start, crossing.end)
                };
                frame.emit_span(sink, start, end, Category::Error, text());
            }
        }

        // an oversized frame is never reported as too short as well
        if !oversized && len < frame.minimum_length() {
            let start = match frame.last_emitted() {
                Some(index) => frame.bytes()[index].end,
                None => frame.start(),
            };
            let end = frame.last_read().saturating_add(options.margin);
            frame.emit_span(
                sink,
                start,
                end,
                Category::Error,
                "Message too short or not finished".to_string(),
            );
        } else if parsed == Step::Continue {
            frame.emit_if_new(sink, last, Category::Error, || "Message too long".to_string());
        }

        if options.mark_errors && frame.has_error() {
            let start = frame.bytes()[0].start;
            let end = frame.bytes()[last].end;
            frame.emit_span(
                sink,
                start,
                end,
                Category::ErrorIndication,
                "Frame contains error".to_string(),
            );
        }

        Ok(self.frame)
    }
}
