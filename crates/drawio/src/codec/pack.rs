//! Packed page bodies.
//!
//! A packed body is the serialized `mxGraphModel` run through three layers:
//!
//! ```text
//! pack:   percent-escape -> raw deflate -> base64
//! unpack: base64 -> raw inflate -> percent-unescape
//! ```
//!
//! The deflate layer is raw (no zlib header or trailer) at the default
//! compression level. Base64 uses the standard alphabet with padding.

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::write::DeflateEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use log::trace;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::{DecodeError, EncodeError};
use crate::limits::MAX_INFLATED_SIZE;

/// Bytes left unescaped in a URL query component.
///
/// Space is escaped as `%20` rather than `+`; the draw.io decoder does not
/// read `+` as a space.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

// =============================================================================
// ENCODING
// =============================================================================

/// Packs text into the wire form of a page body.
pub fn pack(text: &str) -> Result<String, EncodeError> {
    let escaped = escape(text);
    let deflated = deflate(escaped.as_bytes())?;
    let blob = STANDARD.encode(&deflated);
    trace!(text_len = text.len(), deflated_len = deflated.len(), blob_len = blob.len(); "Packed page body");
    Ok(blob)
}

/// Percent-escapes text as a URL query component, spaces as `%20`.
pub fn escape(text: &str) -> String {
    utf8_percent_encode(text, QUERY_COMPONENT).to_string()
}

fn deflate(input: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(input.len() / 2), Compression::default());
    encoder
        .write_all(input)
        .map_err(|e| EncodeError::Deflate(e.to_string()))?;
    encoder.finish().map_err(|e| EncodeError::Deflate(e.to_string()))
}

// =============================================================================
// DECODING
// =============================================================================

/// Unpacks the wire form of a page body back into text.
///
/// ASCII whitespace in the blob is ignored, since pretty-printed files may
/// wrap or indent it.
pub fn unpack(blob: &str) -> Result<String, DecodeError> {
    let compact: String = blob.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let deflated = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    let inflated = inflate(&deflated, MAX_INFLATED_SIZE)?;
    let escaped = std::str::from_utf8(&inflated)
        .map_err(|_| DecodeError::InvalidUtf8 { context: "inflated page body" })?;
    let text = unescape(escaped)?;
    trace!(blob_len = blob.len(), inflated_len = inflated.len(), text_len = text.len(); "Unpacked page body");
    Ok(text)
}

/// Reverses [`escape`].
///
/// Every `%` must start a two-digit hex escape. `+` reads as a space.
pub fn unescape(text: &str) -> Result<String, DecodeError> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] != b'%' {
            pos += 1;
            continue;
        }
        match bytes.get(pos + 1..pos + 3) {
            Some(&[hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => pos += 3,
            _ => return Err(DecodeError::InvalidEscape { position: pos }),
        }
    }

    let spaced = text.replace('+', " ");
    let decoded = percent_decode_str(&spaced)
        .decode_utf8()
        .map_err(|_| DecodeError::InvalidUtf8 { context: "unescaped page body" })?;
    Ok(decoded.into_owned())
}

/// Inflates a raw deflate stream, requiring it to reach its final block.
///
/// A stream that runs out of input early is an error rather than a short
/// result. The output buffer never grows past `limit + 1` bytes.
fn inflate(deflated: &[u8], limit: usize) -> Result<Vec<u8>, DecodeError> {
    let cap = limit.saturating_add(1);
    let mut inflater = Decompress::new(false);
    let mut out = Vec::with_capacity(deflated.len().saturating_mul(4).max(64).min(cap));

    loop {
        let consumed_before = inflater.total_in();
        let produced_before = inflater.total_out();
        let consumed = consumed_before as usize;

        let status = inflater
            .decompress_vec(&deflated[consumed..], &mut out, FlushDecompress::None)
            .map_err(|e| DecodeError::Inflate(e.to_string()))?;

        if out.len() > limit {
            return Err(DecodeError::LengthExceedsLimit {
                field: "inflated page body",
                len: out.len(),
                max: limit,
            });
        }
        if status == Status::StreamEnd {
            return Ok(out);
        }
        if out.len() == out.capacity() {
            out.reserve_exact(out.capacity().min(cap - out.len()));
            continue;
        }

        let consumed = inflater.total_in() as usize;
        let stalled =
            inflater.total_in() == consumed_before && inflater.total_out() == produced_before;
        if consumed >= deflated.len() || stalled {
            return Err(DecodeError::TruncatedStream {
                consumed,
                len: deflated.len(),
            });
        }
    }
}
