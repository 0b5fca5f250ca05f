//! Encode-then-decode helpers over in-memory buffers.

use wirecodec::{
    Codec,
    CodecError,
    frame::{LengthPrefixedCodec, LengthPrefixedSink, LengthPrefixedSource},
    message::{DecodeWith, EncodeWith, Format},
    sink::{Sink, plain_sink},
    source::{Source, buffered_source},
};

/// Encode every message in `messages` through one encoder bound to `sink`.
///
/// # Errors
///
/// Returns the first error reported by the encoder.
pub fn encode_all<F, M>(codec: &Codec<F>, sink: &mut dyn Sink, messages: &[M]) -> Result<(), CodecError>
where
    F: Format,
    M: EncodeWith<F>,
{
    let mut encoder = codec.new_encoder(sink);
    for message in messages {
        encoder.encode(message)?;
    }
    Ok(())
}

/// Decode messages from one decoder bound to `source` until end of stream.
///
/// # Errors
///
/// Returns the first error other than a clean end of stream.
pub fn decode_all<F, M>(codec: &Codec<F>, source: &mut dyn Source) -> Result<Vec<M>, CodecError>
where
    F: Format,
    M: DecodeWith<F> + Default,
{
    let mut decoder = codec.new_decoder(source);
    let mut out = Vec::new();
    loop {
        let mut message = M::default();
        match decoder.decode(&mut message) {
            Ok(()) => out.push(message),
            Err(e) if e.is_end_of_stream() => return Ok(out),
            Err(e) => return Err(e),
        }
    }
}

/// Encode `messages` as consecutive length-prefixed frames and decode them
/// back.
///
/// # Errors
///
/// Returns any encoding or decoding error.
pub fn round_trip_length_prefixed<F, M>(
    codec: &Codec<F>,
    framing: LengthPrefixedCodec,
    messages: &[M],
) -> Result<Vec<M>, CodecError>
where
    F: Format,
    M: EncodeWith<F> + DecodeWith<F> + Default,
{
    let mut sink = LengthPrefixedSink::new(Vec::new(), framing);
    encode_all(codec, &mut sink, messages)?;
    let wire = sink.into_inner();
    let mut source = LengthPrefixedSource::new(wire.as_slice(), framing);
    decode_all(codec, &mut source)
}

/// Encode each message through a plain sink and decode it with a buffered
/// source, one endpoint per message.
///
/// # Errors
///
/// Returns any encoding or decoding error.
pub fn round_trip_buffered<F, M>(codec: &Codec<F>, messages: &[M]) -> Result<Vec<M>, CodecError>
where
    F: Format,
    M: EncodeWith<F> + DecodeWith<F> + Default,
{
    messages
        .iter()
        .map(|message| -> Result<M, CodecError> {
            let mut sink = plain_sink(Vec::new());
            codec.new_encoder(&mut sink).encode(message)?;
            let wire = sink.into_inner();
            let mut source = buffered_source(wire.as_slice());
            let mut decoded = M::default();
            codec.new_decoder(&mut source).decode(&mut decoded)?;
            Ok(decoded)
        })
        .collect()
}
