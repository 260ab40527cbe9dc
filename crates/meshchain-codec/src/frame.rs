//! Compact wire frames: a 1-byte message-kind tag plus body, optionally
//! wrapped in the compression envelope from [`crate::compress`].

use crate::compress::{decode_with_compression, encode_with_compression, EFFECTIVE_MTU};
use crate::error::{CodecError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    Transaction = 0,
    Block = 1,
    SyncRequest = 2,
    SyncResponse = 3,
    PeerHello = 4,
    RouteUpdate = 5,
}

impl MessageKind {
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Transaction),
            1 => Ok(Self::Block),
            2 => Ok(Self::SyncRequest),
            3 => Ok(Self::SyncResponse),
            4 => Ok(Self::PeerHello),
            5 => Ok(Self::RouteUpdate),
            other => Err(CodecError::UnknownMessageKind(other)),
        }
    }
}

/// A decoded, still-opaque wire message: kind tag plus its un-compressed body.
pub struct RawMessage {
    pub kind: MessageKind,
    pub body: Vec<u8>,
}

/// Build a complete on-wire frame from a message kind and its body,
/// applying compression selection over the whole `kind ‖ body` span.
pub fn encode_frame(kind: MessageKind, body: &[u8]) -> Result<Vec<u8>> {
    let mut plain = Vec::with_capacity(body.len() + 1);
    plain.push(kind as u8);
    plain.extend_from_slice(body);
    encode_with_compression(&plain)
}

/// Reverse of [`encode_frame`]: strip the compression envelope, then parse
/// out the kind tag and body.
pub fn decode_frame(framed: &[u8]) -> Result<RawMessage> {
    let plain = decode_with_compression(framed)?;
    let kind_tag = *plain.first().ok_or(CodecError::BufferUnderrun {
        needed: 1,
        available: 0,
    })?;
    let kind = MessageKind::from_tag(kind_tag)?;
    Ok(RawMessage {
        kind,
        body: plain[1..].to_vec(),
    })
}

/// Greedily pack pre-encoded frames into packets no larger than the
/// effective MTU. A frame that individually exceeds the MTU is rejected —
/// fragmenting it is the responsibility of an upper layer not specified here.
pub fn batch_frames(frames: &[Vec<u8>]) -> Result<Vec<Vec<u8>>> {
    let mut packets: Vec<Vec<u8>> = Vec::new();
    let mut current = Vec::new();

    for frame in frames {
        if frame.len() > EFFECTIVE_MTU {
            return Err(CodecError::ExceedsMtu {
                len: frame.len(),
                mtu: EFFECTIVE_MTU,
            });
        }
        if !current.is_empty() && current.len() + frame.len() > EFFECTIVE_MTU {
            packets.push(std::mem::take(&mut current));
        }
        current.extend_from_slice(frame);
    }
    if !current.is_empty() {
        packets.push(current);
    }
    Ok(packets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_roundtrip() {
        let body = b"hello-mesh".to_vec();
        let framed = encode_frame(MessageKind::PeerHello, &body).unwrap();
        let decoded = decode_frame(&framed).unwrap();
        assert_eq!(decoded.kind, MessageKind::PeerHello);
        assert_eq!(decoded.body, body);
    }

    #[test]
    fn batching_respects_mtu() {
        let frame = vec![0u8; 100];
        let frames: Vec<Vec<u8>> = (0..5).map(|_| frame.clone()).collect();
        let packets = batch_frames(&frames).unwrap();
        for packet in &packets {
            assert!(packet.len() <= EFFECTIVE_MTU);
        }
        let total: usize = packets.iter().map(|p| p.len()).sum();
        assert_eq!(total, frames.iter().map(|f| f.len()).sum::<usize>());
    }

    #[test]
    fn oversize_frame_is_rejected() {
        let frame = vec![0u8; EFFECTIVE_MTU + 1];
        assert!(batch_frames(&[frame]).is_err());
    }
}
