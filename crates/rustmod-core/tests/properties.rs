use proptest::prelude::*;
use rustmod_core::frame::rtu;
use rustmod_core::DecodeError;

fn crc16_bitwise(data: &[u8]) -> u16 {
    let mut crc = 0xFFFFu16;
    for byte in data {
        crc ^= u16::from(*byte);
        for _ in 0..8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

fn with_crc(prefix: &[u8]) -> Vec<u8> {
    let mut frame = prefix.to_vec();
    frame.extend_from_slice(&rtu::crc16_bytes(prefix));
    frame
}

proptest! {
    #[test]
    fn table_crc_matches_bitwise_reference(data in proptest::collection::vec(any::<u8>(), 0..300)) {
        prop_assert_eq!(rtu::crc16(&data), crc16_bitwise(&data));
    }

    #[test]
    fn appended_crc_validates(prefix in proptest::collection::vec(any::<u8>(), 2..254)) {
        prop_assert_eq!(rtu::check_frame(&with_crc(&prefix)), Ok(()));
    }

    #[test]
    fn single_bit_flip_in_prefix_is_detected(
        prefix in proptest::collection::vec(any::<u8>(), 2..254),
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut frame = with_crc(&prefix);
        let at = index.index(prefix.len());
        frame[at] ^= 1 << bit;

        let split = frame.len() - 2;
        let expected = rtu::crc16(&frame[..split]);
        prop_assert_eq!(
            rtu::check_frame(&frame),
            Err(DecodeError::InvalidCrc {
                expected,
                actual: u16::from_le_bytes([frame[split], frame[split + 1]]),
            })
        );
    }

    #[test]
    fn random_frames_do_not_panic(data in proptest::collection::vec(any::<u8>(), 0..260)) {
        let _ = rtu::check_frame(&data);
    }
}
