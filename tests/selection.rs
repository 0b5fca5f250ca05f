//! Runtime codec selection from configuration and content types.

use proptest::prelude::*;
use rstest::rstest;
use wirecodec::{
    Codec,
    CodecRegistry,
    ConfigError,
    MediaType,
    Text,
    codec::{framed_decoder, framed_encoder},
    config::{CodecConfig, FramingKind},
    decorate::{FrameStats, with_counter},
    frame::{LengthPrefixedCodec, LengthPrefixedSink, LengthPrefixedSource},
    source::{SourceFactory, null_source},
};
use wirecodec_testing::{TaskState, TaskStatus, registry, task_statuses};

fn length_prefixed(endpoint: &[u8]) -> LengthPrefixedSource<&[u8]> {
    LengthPrefixedSource::new(endpoint, LengthPrefixedCodec::default())
}

fn config(json: &str) -> CodecConfig { serde_json::from_str(json).expect("valid config") }

#[rstest]
#[case(r#"{"codec":"binary"}"#)]
#[case(r#"{"codec":"json"}"#)]
#[case(r#"{"content_type":"application/json; charset=utf-8"}"#)]
#[case(r#"{"codec":"binary","framing":{"kind":"length_prefixed","prefix_bytes":2}}"#)]
#[case(r#"{"codec":"json","framing":{"kind":"length_prefixed","prefix_bytes":8,"endianness":"little"}}"#)]
fn configured_endpoints_round_trip(
    registry: CodecRegistry,
    task_statuses: Vec<TaskStatus>,
    #[case] json: &str,
) {
    let config = config(json);
    let codec = config.resolve(&registry).expect("codec");

    let mut wire = Vec::new();
    let sent = match config.framing.kind {
        FramingKind::Buffered => vec![task_statuses[1].clone()],
        FramingKind::LengthPrefixed => task_statuses[..4].to_vec(),
    };
    {
        let mut sink = config.framing.sink(&mut wire).expect("sink");
        let mut encoder = codec.new_encoder(&mut sink);
        for status in &sent {
            encoder.encode(status).expect("encode");
        }
    }

    let mut source = config.framing.source(wire.as_slice()).expect("source");
    let mut decoder = codec.new_decoder(&mut source);
    let mut received = Vec::new();
    loop {
        let mut status = TaskStatus::default();
        match decoder.decode(&mut status) {
            Ok(()) => received.push(status),
            Err(e) if e.is_end_of_stream() => break,
            Err(e) => panic!("decode failed: {e}"),
        }
    }
    assert_eq!(received, sent);
}

#[rstest]
fn registered_codec_is_found_by_content_type(mut registry: CodecRegistry) {
    let vendor = Codec::<Text>::new(
        "status-json",
        MediaType::new("application/vnd.status+json"),
        framed_encoder::<Text>,
        framed_decoder::<Text>,
    )
    .expect("codec");
    registry.register(vendor).expect("register");

    let config = config(r#"{"content_type":"Application/Vnd.Status+JSON"}"#);
    let codec = config.resolve(&registry).expect("resolves");
    assert_eq!(codec.name(), "status-json");
    assert_eq!(codec.media_type().content_type(), "application/vnd.status+json");
}

#[rstest]
fn unknown_content_type_is_reported(registry: CodecRegistry) {
    let err = config(r#"{"content_type":"application/yaml"}"#)
        .resolve(&registry)
        .expect_err("unknown");
    assert!(matches!(err, ConfigError::UnknownContentType(ref ct) if ct == "application/yaml"));
    assert!(err.to_string().contains("application/yaml"));
}

#[rstest]
fn empty_request_body_decodes_to_end_of_stream(registry: CodecRegistry) {
    let codec = registry.by_name("json").expect("json");
    let mut source = null_source();
    let mut status = TaskStatus::running("kept");
    let err = codec
        .new_decoder(&mut source)
        .decode(&mut status)
        .expect_err("empty body");
    assert!(err.is_end_of_stream());
    assert_eq!(status, TaskStatus::running("kept"));
}

#[rstest]
fn counted_length_prefixed_factory(registry: CodecRegistry) {
    let codec = registry.by_name("binary").expect("binary");
    let stats = FrameStats::new();

    let mut wire = LengthPrefixedSink::new(Vec::new(), LengthPrefixedCodec::default());
    {
        let mut encoder = codec.new_encoder(&mut wire);
        for id in ["a", "b", "c"] {
            encoder.encode(&TaskStatus::running(id)).expect("encode");
        }
    }
    let bytes = wire.into_inner();

    let factory = with_counter(length_prefixed, stats.clone());
    let mut source = factory.new_source(bytes.as_slice());
    let mut decoder = codec.new_decoder(&mut source);
    let mut status = TaskStatus::default();
    while decoder.decode(&mut status).is_ok() {}
    assert_eq!(stats.frames(), 3);
    assert_eq!(status.task_id, "c");
}

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    (
        "[a-z0-9-]{0,24}",
        prop_oneof![
            Just(TaskState::Staging),
            Just(TaskState::Running),
            Just(TaskState::Finished),
            Just(TaskState::Failed),
        ],
        proptest::option::of(".{0,40}"),
        proptest::collection::vec(any::<u8>(), 0..512),
    )
        .prop_map(|(task_id, state, message, data)| TaskStatus {
            task_id,
            state,
            message,
            data,
        })
}

proptest! {
    #[test]
    fn any_status_survives_both_codecs(statuses in proptest::collection::vec(arb_status(), 0..8)) {
        let registry = CodecRegistry::with_defaults();
        for codec in registry.iter() {
            let mut sink = LengthPrefixedSink::new(Vec::new(), LengthPrefixedCodec::default());
            {
                let mut encoder = codec.new_encoder(&mut sink);
                for status in &statuses {
                    encoder.encode(status).expect("encode");
                }
            }
            let wire = sink.into_inner();
            let mut source = LengthPrefixedSource::new(wire.as_slice(), LengthPrefixedCodec::default());
            let mut decoder = codec.new_decoder(&mut source);
            let mut received = Vec::new();
            loop {
                let mut status = TaskStatus::default();
                match decoder.decode(&mut status) {
                    Ok(()) => received.push(status),
                    Err(e) => {
                        prop_assert!(e.is_end_of_stream(), "unexpected error: {}", e);
                        break;
                    }
                }
            }
            prop_assert_eq!(&received, &statuses);
        }
    }
}
