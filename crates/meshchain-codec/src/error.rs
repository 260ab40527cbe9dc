use thiserror::Error;

/// Errors raised by the wire codec.
///
/// These map onto the `MalformedFrame` error kind in the node's error
/// taxonomy: codec failures are always dropped by the caller,
/// never propagated, and never individually penalize a peer beyond the
/// small reputation delta the router applies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("buffer underrun: needed {needed} bytes, had {available}")]
    BufferUnderrun { needed: usize, available: usize },

    #[error("varint value {0} exceeds the 21-bit range")]
    VarintTooLarge(u64),

    #[error("varint prefix bits reserved for future use")]
    ReservedVarintPrefix,

    #[error("unknown message kind tag {0}")]
    UnknownMessageKind(u8),

    #[error("unknown compression method tag {0}")]
    UnknownCompressionMethod(u8),

    #[error("compression failure: {0}")]
    Compression(String),

    #[error("message of {len} bytes exceeds the effective MTU of {mtu} bytes and was not fragmented")]
    ExceedsMtu { len: usize, mtu: usize },

    #[error("field length {declared} exceeds remaining buffer of {remaining} bytes")]
    FieldTooLong { declared: usize, remaining: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
