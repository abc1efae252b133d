use crate::DecoderError;
use rustmod_core::frame::rtu::MAX_ADU_LEN;

/// Default silence, in bit times, that separates two frames.
///
/// Modbus asks for 3.5 character times between frames and at most 1.5
/// inside a frame. With 11-bit characters the midpoint is about 28 bits.
pub const DEFAULT_FRAME_GAP_BITS: u64 = 28;
pub const DEFAULT_DIAGNOSTICS_DATA_LEN: usize = 2;

/// Physical serial line a byte was captured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Line {
    Rx,
    Tx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecoderConfig {
    /// Line carrying client to server frames.
    pub request_line: Line,
    /// Line carrying server to client frames. May equal `request_line`, in
    /// which case every byte is decoded in both roles.
    pub response_line: Line,
    /// Inter-frame silence multiplier `K`, in bit times.
    pub frame_gap_bits: u64,
    /// How far past the last byte a "too short" annotation reaches, in bit
    /// times. Clamped to `frame_gap_bits` so it never reaches the next frame.
    pub close_margin_bits: u64,
    /// Size of the data field of function 8. Moves the CRC boundary.
    pub diagnostics_data_len: usize,
    /// Mark frames containing errors with a whole-frame span. Only honoured
    /// when requests and responses are on different lines.
    pub mark_error_frames: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            request_line: Line::Tx,
            response_line: Line::Rx,
            frame_gap_bits: DEFAULT_FRAME_GAP_BITS,
            close_margin_bits: DEFAULT_FRAME_GAP_BITS,
            diagnostics_data_len: DEFAULT_DIAGNOSTICS_DATA_LEN,
            mark_error_frames: false,
        }
    }
}

impl DecoderConfig {
    pub fn with_request_line(mut self, line: Line) -> Self {
        self.request_line = line;
        self
    }

    pub fn with_response_line(mut self, line: Line) -> Self {
        self.response_line = line;
        self
    }

    pub fn with_frame_gap_bits(mut self, bits: u64) -> Self {
        self.frame_gap_bits = bits;
        self
    }

    pub fn with_close_margin_bits(mut self, bits: u64) -> Self {
        self.close_margin_bits = bits;
        self
    }

    pub fn with_diagnostics_data_len(mut self, len: usize) -> Self {
        self.diagnostics_data_len = len;
        self
    }

    pub fn with_mark_error_frames(mut self, enabled: bool) -> Self {
        self.mark_error_frames = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), DecoderError> {
        if self.frame_gap_bits == 0 {
            return Err(DecoderError::InvalidConfig(
                "frame gap must be at least one bit time",
            ));
        }
        if self.close_margin_bits == 0 {
            return Err(DecoderError::InvalidConfig(
                "close margin must be at least one bit time",
            ));
        }
        // slave id, function, subfunction and crc take six bytes
        if self.diagnostics_data_len > MAX_ADU_LEN - 6 {
            return Err(DecoderError::InvalidConfig(
                "diagnostics data field does not fit in a frame",
            ));
        }
        Ok(())
    }

    pub fn shares_line(&self) -> bool {
        self.request_line == self.response_line
    }

    pub(crate) fn marks_error_frames(&self) -> bool {
        self.mark_error_frames && !self.shares_line()
    }

    pub(crate) fn silence_threshold(&self, bitlength: u64) -> u64 {
        bitlength.saturating_mul(self.frame_gap_bits)
    }

    pub(crate) fn close_margin(&self, bitlength: u64) -> u64 {
        bitlength.saturating_mul(self.close_margin_bits.min(self.frame_gap_bits))
    }
}
