use crate::annotation::{Annotation, Category, Role};
use crate::{AnnotationSink, DecoderError};
use rustmod_core::frame::rtu::{self, MIN_ADU_LEN};
use rustmod_core::DecodeError;
use tracing::trace;

/// One serial byte with its capture times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Byte {
    pub value: u8,
    pub start: u64,
    pub end: u64,
}

impl Byte {
    pub const fn new(value: u8, start: u64, end: u64) -> Self {
        Self { value, start, end }
    }
}

/// Result of a single field step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The field was reported on an earlier pass.
    Continue,
    /// A new span was reported; the current pass ends here.
    Emitted,
    /// The field ends beyond the bytes received so far.
    NeedMoreData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    Missing,
    Done,
    Ready,
}

/// Bytes and emission state of one frame under construction.
#[derive(Debug, Clone)]
pub struct Frame {
    role: Role,
    bytes: Vec<Byte>,
    minimum_length: usize,
    last_emitted: Option<usize>,
    start: u64,
    last_read: u64,
    has_error: bool,
    /// Byte ranges reported as errors through the cursor.
    error_ranges: Vec<(usize, usize)>,
}

impl Frame {
    pub fn new(role: Role, start: u64) -> Self {
        Self {
            role,
            bytes: Vec::new(),
            minimum_length: MIN_ADU_LEN,
            last_emitted: None,
            start,
            last_read: start,
            has_error: false,
            error_ranges: Vec::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn bytes(&self) -> &[Byte] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn minimum_length(&self) -> usize {
        self.minimum_length
    }

    /// Highest byte index already covered by a span.
    pub fn last_emitted(&self) -> Option<usize> {
        self.last_emitted
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn last_read(&self) -> u64 {
        self.last_read
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// Whether byte `index` lies inside an error span tied to the cursor.
    pub fn error_covers(&self, index: usize) -> bool {
        self.error_ranges
            .iter()
            .any(|&(first, last)| (first..=last).contains(&index))
    }

    pub fn value(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).map(|byte| byte.value)
    }

    /// Big-endian word at `index` and `index + 1`.
    pub fn half_word(&self, index: usize) -> Option<u16> {
        let high = self.value(index)?;
        let low = self.value(index.checked_add(1)?)?;
        Some(u16::from_be_bytes([high, low]))
    }

    /// `len` bytes starting at `start`, if all of them have arrived.
    pub fn values(&self, start: usize, len: usize) -> Option<Vec<u8>> {
        let bytes = self.bytes.get(start..start.checked_add(len)?)?;
        Some(bytes.iter().map(|byte| byte.value).collect())
    }

    pub(crate) fn append(&mut self, byte: Byte) {
        self.last_read = self.last_read.max(byte.end);
        self.bytes.push(byte);
    }

    pub(crate) fn require_len(&mut self, len: usize) {
        self.minimum_length = self.minimum_length.max(len);
    }

    pub(crate) fn next_index(&self) -> usize {
        self.last_emitted.map_or(0, |last| last + 1)
    }

    fn claim(&self, index: usize) -> Claim {
        if index >= self.bytes.len() {
            Claim::Missing
        } else if index < self.next_index() {
            Claim::Done
        } else {
            Claim::Ready
        }
    }

    /// Reports `[next_index ..= index]` and moves the cursor to `index`.
    ///
    /// Callers must have claimed `index` first.
    fn emit(
        &mut self,
        sink: &mut dyn AnnotationSink,
        index: usize,
        category: Category,
        text: String,
    ) {
        let first = self.next_index();
        let start = self.bytes[first].start;
        let end = self.bytes[index].end;
        self.last_emitted = Some(index);
        if category == Category::Error {
            self.error_ranges.push((first, index));
        }
        self.emit_span(sink, start, end, category, text);
    }

    /// Reports a span that is not tied to the emission cursor.
    pub(crate) fn emit_span(
        &mut self,
        sink: &mut dyn AnnotationSink,
        start: u64,
        end: u64,
        category: Category,
        text: String,
    ) {
        if category == Category::Error {
            self.has_error = true;
        }
        trace!(
            role = ?self.role,
            category = category.as_str(),
            start,
            end,
            text = %text,
            "modbus annotation"
        );
        sink.annotate(Annotation {
            role: self.role,
            category,
            start,
            end,
            text,
        });
    }

    pub(crate) fn try_emit_if_new<F>(
        &mut self,
        sink: &mut dyn AnnotationSink,
        index: usize,
        category: Category,
        text: F,
    ) -> Result<Step, DecoderError>
    where
        F: FnOnce() -> Result<String, DecoderError>,
    {
        match self.claim(index) {
            Claim::Missing => Ok(Step::NeedMoreData),
            Claim::Done => Ok(Step::Continue),
            Claim::Ready => {
                let text = text()?;
                self.emit(sink, index, category, text);
                Ok(Step::Emitted)
            }
        }
    }

    pub(crate) fn emit_if_new<F>(
        &mut self,
        sink: &mut dyn AnnotationSink,
        index: usize,
        category: Category,
        text: F,
    ) -> Step
    where
        F: FnOnce() -> String,
    {
        match self.claim(index) {
            Claim::Missing => Step::NeedMoreData,
            Claim::Done => Step::Continue,
            Claim::Ready => {
                self.emit(sink, index, category, text());
                Step::Emitted
            }
        }
    }
}

/// Parse context handed to the field tables: the frame plus the sink its
/// spans go to.
pub struct Fields<'a> {
    frame: &'a mut Frame,
    sink: &'a mut dyn AnnotationSink,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(frame: &'a mut Frame, sink: &'a mut dyn AnnotationSink) -> Self {
        Self { frame, sink }
    }

    pub fn frame(&self) -> &Frame {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    pub fn value(&self, index: usize) -> Option<u8> {
        self.frame.value(index)
    }

    pub fn half_word(&self, index: usize) -> Option<u16> {
        self.frame.half_word(index)
    }

    pub fn values(&self, start: usize, len: usize) -> Option<Vec<u8>> {
        self.frame.values(start, len)
    }

    /// Raises the frame's minimum length. Never lowers it.
    pub fn require_len(&mut self, len: usize) {
        self.frame.require_len(len);
    }

    /// Emit-if-new: reports the bytes up to `index` unless they were
    /// reported before or have not arrived yet.
    pub fn emit_if_new<F>(&mut self, index: usize, category: Category, text: F) -> Step
    where
        F: FnOnce() -> String,
    {
        self.frame.emit_if_new(&mut *self.sink, index, category, text)
    }

    pub fn try_emit_if_new<F>(
        &mut self,
        index: usize,
        category: Category,
        text: F,
    ) -> Result<Step, DecoderError>
    where
        F: FnOnce() -> Result<String, DecoderError>,
    {
        self.frame.try_emit_if_new(&mut *self.sink, index, category, text)
    }

    /// Validates the two CRC bytes ending at `index` against everything
    /// before them, and marks the frame as `index + 1` bytes long.
    pub fn check_crc(&mut self, index: usize) -> Result<Step, DecoderError> {
        self.require_len(index + 1);
        match self.frame.claim(index) {
            Claim::Missing => return Ok(Step::NeedMoreData),
            Claim::Done => return Ok(Step::Continue),
            Claim::Ready => {}
        }
        if index + 1 < MIN_ADU_LEN {
            return Err(DecoderError::Internal("crc check on fewer than 4 bytes"));
        }

        let frame: Vec<u8> = self.frame.bytes[..=index].iter().map(|byte| byte.value).collect();
        let (category, text) = match rtu::check_frame(&frame) {
            Ok(()) => (Category::Crc, "CRC correct".to_string()),
            Err(DecodeError::InvalidCrc { expected, .. }) => {
                let [low, high] = expected.to_le_bytes();
                (
                    Category::Error,
                    format!("CRC should be 0x{low:02X} 0x{high:02X}"),
                )
            }
            Err(_) => return Err(DecoderError::Internal("crc check on a malformed frame")),
        };
        self.frame.emit(&mut *self.sink, index, category, text);
        Ok(Step::Emitted)
    }
}
