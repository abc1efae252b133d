use proptest::prelude::*;
use rustmod_core::frame::rtu;
use rustmod_decoder::{
    Adu, Annotation, Byte, CloseOptions, DecoderConfig, Event, FrameParser, Line,
    ModbusRtuDecoder, RequestParser, ResponseParser,
};

const OPTIONS: CloseOptions = CloseOptions {
    margin: 280,
    mark_errors: true,
};

fn bytes(values: &[u8]) -> Vec<Byte> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let start = i as u64 * 110;
            Byte::new(*value, start, start + 100)
        })
        .collect()
}

fn incremental<P: FrameParser>(parser: P, values: &[u8]) -> Vec<Annotation> {
    let mut out: Vec<Annotation> = Vec::new();
    let mut adu = Adu::new(parser, 0);
    for byte in bytes(values) {
        adu.push(byte, &mut out).unwrap();
    }
    adu.close(&mut out, OPTIONS).unwrap();
    out
}

fn batch<P: FrameParser>(parser: P, values: &[u8]) -> Vec<Annotation> {
    let mut out: Vec<Annotation> = Vec::new();
    let mut adu = Adu::new(parser, 0);
    for byte in bytes(values) {
        adu.append(byte);
    }
    adu.parse(&mut out).unwrap();
    adu.close(&mut out, OPTIONS).unwrap();
    out
}

fn sorted(mut out: Vec<Annotation>) -> Vec<Annotation> {
    out.sort();
    out
}

fn overlapping_same_category(out: &[Annotation]) -> Option<(Annotation, Annotation)> {
    for (i, a) in out.iter().enumerate() {
        for b in &out[i + 1..] {
            if a.category == b.category && a.start < b.end && b.start < a.end {
                return Some((a.clone(), b.clone()));
            }
        }
    }
    None
}

/// A frame with a mostly known function code, a random body and, half of
/// the time, a matching CRC.
fn frame_strategy() -> impl Strategy<Value = Vec<u8>> {
    let functions = prop::sample::select(vec![
        0x01u8, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x0B, 0x0C, 0x0F, 0x10, 0x11, 0x16,
        0x17, 0x81, 0x83, 0x90, 0x99, 0x2B,
    ]);
    (
        0u8..=255,
        functions,
        prop::collection::vec(any::<u8>(), 0..40),
        any::<bool>(),
    )
        .prop_map(|(id, function, body, with_crc)| {
            let mut frame = vec![id, function];
            frame.extend(body);
            if with_crc {
                let crc = rtu::crc16_bytes(&frame);
                frame.extend(crc);
            }
            frame
        })
}

proptest! {
    #[test]
    fn request_batch_matches_incremental(values in frame_strategy()) {
        let parser = RequestParser::default();
        prop_assert_eq!(sorted(incremental(parser, &values)), sorted(batch(parser, &values)));
    }

    #[test]
    fn response_batch_matches_incremental(values in frame_strategy()) {
        let parser = ResponseParser::default();
        prop_assert_eq!(sorted(incremental(parser, &values)), sorted(batch(parser, &values)));
    }

    #[test]
    fn spans_of_one_category_never_overlap(values in frame_strategy()) {
        let requests = incremental(RequestParser::default(), &values);
        prop_assert_eq!(overlapping_same_category(&requests), None);
        let responses = incremental(ResponseParser::default(), &values);
        prop_assert_eq!(overlapping_same_category(&responses), None);
    }

    #[test]
    fn spans_stay_inside_the_frame(values in frame_strategy()) {
        let out = incremental(ResponseParser::default(), &values);
        let frame_end = values.len() as u64 * 110;
        for annotation in &out {
            prop_assert!(annotation.start <= annotation.end);
            prop_assert!(annotation.end <= frame_end + OPTIONS.margin);
        }
    }

    #[test]
    fn random_streams_never_fail(
        events in prop::collection::vec((any::<bool>(), any::<u8>(), 0u64..600), 0..400),
        shared in any::<bool>(),
    ) {
        let mut config = DecoderConfig::default().with_mark_error_frames(true);
        if shared {
            config = config.with_response_line(Line::Tx);
        }
        let mut decoder = ModbusRtuDecoder::new(config, Vec::<Annotation>::new()).unwrap();
        let pushed = decoder.push(Event::BitTiming { start: 0, end: 10 }).is_ok();
        prop_assert!(pushed);

        let mut now = 100u64;
        for (rx, value, delay) in events {
            let line = if rx { Line::Rx } else { Line::Tx };
            let pushed = decoder
                .push(Event::Data { line, value, start: now, end: now + 100 })
                .is_ok();
            prop_assert!(pushed);
            now += delay;
        }
        prop_assert!(decoder.finish().is_ok());
    }
}
