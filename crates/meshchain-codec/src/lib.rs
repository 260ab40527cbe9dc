//! Compact binary wire codec for MeshChain.
//!
//! Sized for Meshtastic's 237-byte link MTU: variable-length integers for
//! counts and heights, fixed-width fields for hashes and keys, and an
//! optional zlib compression envelope selected per-message.

pub mod buf;
pub mod compress;
pub mod error;
pub mod frame;
pub mod varint;

pub use buf::{Reader, Writer};
pub use compress::EFFECTIVE_MTU;
pub use error::{CodecError, Result};
pub use frame::{batch_frames, decode_frame, encode_frame, MessageKind, RawMessage};
pub use varint::{decode_varint, encode_varint, varint_len};
