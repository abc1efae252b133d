use crate::DecodeError;

/// Smallest legal RTU frame: address, function and two CRC bytes.
pub const MIN_ADU_LEN: usize = 4;
/// Largest RTU frame the protocol allows.
pub const MAX_ADU_LEN: usize = 256;

const fn build_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u16;
        let mut bit = 0;
        while bit < 8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const CRC16_TABLE: [u16; 256] = build_crc16_table();

/// Modbus CRC16 (initial value 0xFFFF, reflected polynomial 0xA001).
pub fn crc16(data: &[u8]) -> u16 {
    crc16_iter(data.iter().copied())
}

/// Same as [`crc16`] for bytes that are not stored contiguously.
pub fn crc16_iter<I: IntoIterator<Item = u8>>(data: I) -> u16 {
    let mut crc = 0xFFFFu16;
    for byte in data {
        let idx = ((crc ^ u16::from(byte)) & 0x00FF) as usize;
        crc = (crc >> 8) ^ CRC16_TABLE[idx];
    }
    crc
}

/// CRC bytes in wire order: low byte first, high byte second.
pub fn crc16_bytes(data: &[u8]) -> [u8; 2] {
    crc16(data).to_le_bytes()
}

/// Checks the trailing two CRC bytes of a complete frame.
pub fn check_frame(frame: &[u8]) -> Result<(), DecodeError> {
    if frame.len() < MIN_ADU_LEN {
        return Err(DecodeError::InvalidLength);
    }

    let split = frame.len() - 2;
    let expected = crc16(&frame[..split]);
    let actual = u16::from_le_bytes([frame[split], frame[split + 1]]);
    if expected != actual {
        return Err(DecodeError::InvalidCrc { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_frame, crc16, crc16_bytes, crc16_iter};
    use crate::DecodeError;

    #[test]
    fn crc16_known_vector() {
        let frame_wo_crc = [0x01u8, 0x03, 0x00, 0x00, 0x00, 0x0A];
        assert_eq!(crc16(&frame_wo_crc), 0xCDC5);
        assert_eq!(crc16_bytes(&frame_wo_crc), [0xC5, 0xCD]);
    }

    #[test]
    fn iter_matches_slice() {
        let data = [0x11u8, 0x03, 0x00, 0x6B, 0x00, 0x03];
        assert_eq!(crc16_iter(data), crc16(&data));
    }

    #[test]
    fn accepts_valid_frame() {
        let frame = [0x11u8, 0x03, 0x00, 0x6B, 0x00, 0x03, 0x76, 0x87];
        assert_eq!(check_frame(&frame), Ok(()));
    }

    #[test]
    fn detects_bad_crc() {
        let bad = [0x11u8, 0x03, 0x00, 0x6B, 0x00, 0x03, 0x00, 0x00];
        assert_eq!(
            check_frame(&bad).unwrap_err(),
            DecodeError::InvalidCrc {
                expected: 0x8776,
                actual: 0x0000,
            }
        );
    }

    #[test]
    fn rejects_short_frames() {
        assert_eq!(check_frame(&[0x11, 0x03, 0x00]).unwrap_err(), DecodeError::InvalidLength);
    }
}
