//! End-to-end coverage of codecs running over buffered and length-prefixed
//! endpoints.

use std::io;

use rstest::rstest;
use wirecodec::{
    CodecError,
    codec::{self, EofError, FramingError},
    frame::{LengthFormat, LengthPrefixedCodec, LengthPrefixedSink, LengthPrefixedSource},
    sink::{Sink, plain_sink},
    source::{Source, buffered_source},
};
use wirecodec_testing::{
    ChunkedReader,
    FailingReader,
    FailingWriter,
    ShortWriter,
    TaskStatus,
    decode_all,
    encode_all,
    length_codec,
    round_trip_buffered,
    round_trip_length_prefixed,
    task_statuses,
};

#[rstest]
fn buffered_round_trip_binary(task_statuses: Vec<TaskStatus>) {
    let decoded = round_trip_buffered(&codec::BINARY, &task_statuses).expect("round trip");
    assert_eq!(decoded, task_statuses);
}

#[rstest]
fn buffered_round_trip_json(task_statuses: Vec<TaskStatus>) {
    let decoded = round_trip_buffered(&codec::JSON, &task_statuses).expect("round trip");
    assert_eq!(decoded, task_statuses);
}

#[rstest]
fn length_prefixed_round_trip_preserves_order(
    task_statuses: Vec<TaskStatus>,
    length_codec: LengthPrefixedCodec,
) {
    let binary = round_trip_length_prefixed(&codec::BINARY, length_codec, &task_statuses)
        .expect("binary round trip");
    assert_eq!(binary, task_statuses);

    let json = round_trip_length_prefixed(&codec::JSON, length_codec, &task_statuses)
        .expect("json round trip");
    assert_eq!(json, task_statuses);
}

#[rstest]
#[case(1, false)]
#[case(3, true)]
#[case(4096, true)]
fn length_prefixed_source_reassembles_chunked_input(
    task_statuses: Vec<TaskStatus>,
    length_codec: LengthPrefixedCodec,
    #[case] chunk: usize,
    #[case] interrupts: bool,
) {
    let mut sink = LengthPrefixedSink::new(Vec::new(), length_codec);
    encode_all(&codec::BINARY, &mut sink, &task_statuses).expect("encode");

    let mut reader = ChunkedReader::new(sink.into_inner(), chunk);
    if interrupts {
        reader = reader.with_interrupts();
    }
    let mut source = LengthPrefixedSource::new(reader, length_codec);
    let decoded: Vec<TaskStatus> = decode_all(&codec::BINARY, &mut source).expect("decode");
    assert_eq!(decoded, task_statuses);
}

#[rstest]
fn truncated_stream_reports_mid_frame(length_codec: LengthPrefixedCodec) {
    let mut sink = LengthPrefixedSink::new(Vec::new(), length_codec);
    encode_all(&codec::JSON, &mut sink, &[TaskStatus::running("a")]).expect("encode");
    let mut wire = sink.into_inner();
    wire.truncate(wire.len() - 1);

    let mut source = LengthPrefixedSource::new(wire.as_slice(), length_codec);
    let mut decoder = codec::JSON.new_decoder(&mut source);
    let mut status = TaskStatus::default();
    let err = decoder.decode(&mut status).expect_err("truncated");
    assert!(matches!(err, CodecError::Eof(EofError::MidFrame { .. })));
    assert!(!err.is_end_of_stream());
    assert!(err.should_disconnect());
    assert!(matches!(
        decoder.decode(&mut status).expect_err("terminal"),
        CodecError::Poisoned
    ));
}

#[test]
fn truncated_header_reports_mid_header() {
    let framing = LengthPrefixedCodec::new(LengthFormat::u32_be(), 1024);
    let mut source = LengthPrefixedSource::new(&[0u8, 0][..], framing);
    let mut status = TaskStatus::default();
    let err = codec::BINARY
        .new_decoder(&mut source)
        .decode(&mut status)
        .expect_err("truncated header");
    assert!(matches!(
        err,
        CodecError::Eof(EofError::MidHeader {
            bytes_received: 2,
            header_size: 4
        })
    ));
}

#[test]
fn oversized_frames_are_rejected_in_both_directions() {
    let framing = LengthPrefixedCodec::new(LengthFormat::u16_be(), 64);
    let big = TaskStatus::running("big").with_data(500);

    let mut sink = LengthPrefixedSink::new(Vec::new(), framing);
    let err = codec::BINARY
        .new_encoder(&mut sink)
        .encode(&big)
        .expect_err("oversized encode");
    assert!(matches!(
        err,
        CodecError::Framing(FramingError::OversizedFrame { max: 64, .. })
    ));
    assert!(sink.into_inner().is_empty());

    let mut source = LengthPrefixedSource::new(&[0x01u8, 0x00, 0xAA][..], framing);
    let mut status = TaskStatus::default();
    let err = codec::BINARY
        .new_decoder(&mut source)
        .decode(&mut status)
        .expect_err("oversized decode");
    assert!(matches!(
        err,
        CodecError::Framing(FramingError::OversizedFrame { size: 256, max: 64 })
    ));
}

#[test]
fn short_write_is_reported_and_session_closed() {
    let mut endpoint = ShortWriter::new(5);
    {
        let mut sink = plain_sink(&mut endpoint);
        let mut encoder = codec::JSON.new_encoder(&mut sink);
        let err = encoder
            .encode(&TaskStatus::running("web-1"))
            .expect_err("short write");
        match &err {
            CodecError::ShortWrite { written, expected } => {
                assert_eq!(*written, 5);
                assert!(*expected > 5);
            }
            other => panic!("expected short write, got {other:?}"),
        }
        assert_eq!(io::Error::from(err).kind(), io::ErrorKind::WriteZero);
        assert!(matches!(
            encoder.encode(&TaskStatus::default()).expect_err("closed"),
            CodecError::Poisoned
        ));
    }
    assert_eq!(endpoint.written(), br#"{"tas"#);
}

#[rstest]
fn write_failure_closes_length_prefixed_session(length_codec: LengthPrefixedCodec) {
    let mut sink = LengthPrefixedSink::new(FailingWriter(io::ErrorKind::BrokenPipe), length_codec);
    let mut encoder = codec::BINARY.new_encoder(&mut sink);
    let err = encoder
        .encode(&TaskStatus::running("web-1"))
        .expect_err("transport error");
    assert!(err.should_disconnect());
    match err {
        CodecError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert!(matches!(
        encoder.encode(&TaskStatus::default()).expect_err("closed"),
        CodecError::Poisoned
    ));
}

#[test]
fn drain_failure_surfaces_as_transport_error() {
    let mut source = buffered_source(FailingReader::new(
        br#"{"task_id":"#.to_vec(),
        io::ErrorKind::ConnectionReset,
    ));
    let mut status = TaskStatus::default();
    let mut decoder = codec::JSON.new_decoder(&mut source);
    match decoder.decode(&mut status).expect_err("drain failure") {
        CodecError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(status, TaskStatus::default());
}

#[test]
fn buffered_source_serves_one_message_per_session() {
    let mut wire = Vec::new();
    {
        let mut sink = plain_sink(&mut wire);
        codec::JSON
            .new_encoder(&mut sink)
            .encode(&TaskStatus::running("a"))
            .expect("encode");
    }
    let mut source = buffered_source(wire.as_slice());
    let mut decoder = codec::JSON.new_decoder(&mut source);
    let mut status = TaskStatus::default();
    decoder.decode(&mut status).expect("first message");
    assert_eq!(status, TaskStatus::running("a"));
    for _ in 0..2 {
        assert!(decoder.decode(&mut status).expect_err("eof").is_end_of_stream());
    }
}

#[test]
fn binary_and_json_wire_forms_differ() {
    let status = TaskStatus::running("web-1");
    let mut binary = plain_sink(Vec::new());
    let mut json = plain_sink(Vec::new());
    codec::BINARY
        .new_encoder(&mut binary)
        .encode(&status)
        .expect("binary");
    codec::JSON.new_encoder(&mut json).encode(&status).expect("json");

    let json = json.into_inner();
    assert!(json.starts_with(b"{\"task_id\":\"web-1\""));
    assert_ne!(binary.into_inner(), json);
}

#[test]
fn json_frame_rejected_by_binary_decoder() {
    let mut wire = Vec::new();
    {
        let mut sink: Box<dyn Sink + '_> = Box::new(plain_sink(&mut wire));
        codec::JSON
            .new_encoder(&mut sink)
            .encode(&TaskStatus::running("x"))
            .expect("encode");
    }
    let mut source: Box<dyn Source + '_> = Box::new(buffered_source(wire.as_slice()));
    let mut status = TaskStatus::default();
    let err = codec::BINARY
        .new_decoder(&mut source)
        .decode(&mut status)
        .expect_err("wrong representation");
    assert!(matches!(err, CodecError::Deserialize(_)));
    assert!(!err.should_disconnect());
}
