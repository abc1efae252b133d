//! Streaming Modbus RTU decoder.
//!
//! Feeds on timestamped serial bytes (plus one bit-timing marker used to
//! learn the baud rate), infers frame boundaries from inter-byte silence and
//! reports every decoded field as an [`Annotation`] the moment the bytes
//! that make it up have arrived.
//!
//! ```
//! use rustmod_decoder::{Annotation, DecoderConfig, Event, Line, ModbusRtuDecoder};
//!
//! let mut decoder = ModbusRtuDecoder::new(DecoderConfig::default(), Vec::<Annotation>::new())?;
//! decoder.push(Event::BitTiming { start: 0, end: 10 })?;
//! let frame = [0x11, 0x03, 0x00, 0x6B, 0x00, 0x03, 0x76, 0x87];
//! for (i, value) in frame.into_iter().enumerate() {
//!     let start = 1_000 + i as u64 * 110;
//!     decoder.push(Event::Data { line: Line::Tx, value, start, end: start + 100 })?;
//! }
//! let annotations = decoder.finish()?;
//! assert_eq!(annotations.last().map(|a| a.text.as_str()), Some("CRC correct"));
//! # Ok::<(), rustmod_decoder::DecoderError>(())
//! ```

#![forbid(unsafe_code)]

pub mod adu;
pub mod annotation;
pub mod config;
pub mod detector;
pub mod frame;
pub mod parser;

pub use adu::{Adu, CloseOptions};
pub use annotation::{Annotation, Category, Role};
pub use config::{DecoderConfig, Line};
pub use detector::{Event, ModbusRtuDecoder};
pub use frame::{Byte, Fields, Frame, Step};
pub use parser::{
    AddressSpace, FrameParser, RequestLayout, RequestParser, ResponseLayout, ResponseParser,
    WriteKind,
};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecoderError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// A decoder invariant was broken. Never caused by line data.
    #[error("internal decoder defect: {0}")]
    Internal(&'static str),
}

/// Receives decoded spans as soon as they are known.
pub trait AnnotationSink {
    fn annotate(&mut self, annotation: Annotation);
}

impl AnnotationSink for Vec<Annotation> {
    fn annotate(&mut self, annotation: Annotation) {
        self.push(annotation);
    }
}

impl<S: AnnotationSink + ?Sized> AnnotationSink for &mut S {
    fn annotate(&mut self, annotation: Annotation) {
        (**self).annotate(annotation);
    }
}
