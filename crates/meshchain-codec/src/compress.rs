//! MTU-aware compression selection.
//!
//! Meshtastic frames top out at 237 bytes; after accounting for a 20-byte
//! link header the codec has an effective payload budget of 217 bytes.
//! Compression is only attempted when a plaintext payload is already large
//! relative to that budget, and only kept when it actually pays for itself
//! once the 1-byte method tag is included.

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use crate::error::{CodecError, Result};

pub const MESHTASTIC_MTU: usize = 237;
pub const LINK_HEADER_OVERHEAD: usize = 20;
pub const EFFECTIVE_MTU: usize = MESHTASTIC_MTU - LINK_HEADER_OVERHEAD;

const COMPRESSION_TRY_THRESHOLD: f64 = 0.7;
const ZLIB_LEVELS: [u32; 4] = [1, 3, 6, 9];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CompressionMethod {
    None = 0,
    Zlib = 1,
}

impl CompressionMethod {
    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::None),
            1 => Ok(Self::Zlib),
            other => Err(CodecError::UnknownCompressionMethod(other)),
        }
    }
}

fn zlib_compress(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level));
    encoder
        .write_all(data)
        .map_err(|e| CodecError::Compression(e.to_string()))?;
    encoder.finish().map_err(|e| CodecError::Compression(e.to_string()))
}

fn zlib_decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| CodecError::Compression(e.to_string()))?;
    Ok(out)
}

/// Select a representation for `plain` and prepend the 1-byte method tag.
///
/// Tries every zlib level in [`ZLIB_LEVELS`] when `plain` is large relative
/// to [`EFFECTIVE_MTU`], keeps the smallest, and falls back to an
/// uncompressed (tag = 0) encoding whenever compression doesn't win.
pub fn encode_with_compression(plain: &[u8]) -> Result<Vec<u8>> {
    let try_compression = (plain.len() as f64) > COMPRESSION_TRY_THRESHOLD * EFFECTIVE_MTU as f64;

    if try_compression {
        let mut best: Option<Vec<u8>> = None;
        for level in ZLIB_LEVELS {
            let candidate = zlib_compress(plain, level)?;
            if best.as_ref().map(|b| candidate.len() < b.len()).unwrap_or(true) {
                best = Some(candidate);
            }
        }
        if let Some(compressed) = best {
            // +1 accounts for the method tag we are about to prepend.
            if compressed.len() + 1 < plain.len() {
                let mut out = Vec::with_capacity(compressed.len() + 1);
                out.push(CompressionMethod::Zlib as u8);
                out.extend_from_slice(&compressed);
                return Ok(out);
            }
        }
    }

    let mut out = Vec::with_capacity(plain.len() + 1);
    out.push(CompressionMethod::None as u8);
    out.extend_from_slice(plain);
    Ok(out)
}

/// Reverse of [`encode_with_compression`]: strip and dispatch on the method
/// tag, returning the original plaintext.
pub fn decode_with_compression(framed: &[u8]) -> Result<Vec<u8>> {
    let tag = *framed.first().ok_or(CodecError::BufferUnderrun {
        needed: 1,
        available: 0,
    })?;
    let body = &framed[1..];
    match CompressionMethod::from_tag(tag)? {
        CompressionMethod::None => Ok(body.to_vec()),
        CompressionMethod::Zlib => zlib_decompress(body),
    }
}
