use thiserror::Error;

/// Bytes between the length field and the payload: seq(2) + type(1) + memory(2).
pub const HEADER_TAIL: usize = 5;
/// Full header size on the wire, length field included.
pub const HEADER_LEN: usize = 2 + HEADER_TAIL;
/// Fixed size of a reply header ahead of any global memory.
pub const REPLY_HEADER_LEN: usize = 5;

pub const MAX_LOCAL_MEMORY: u16 = 63;
pub const MAX_GLOBAL_MEMORY: u16 = 1023;

pub const OP_NOP: u8 = 0x01;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("empty opcode payload")]
    EmptyPayload,
    #[error("payload of {0} bytes does not fit the 16-bit length field")]
    PayloadTooLong(usize),
    #[error("local memory {0} exceeds 63")]
    LocalMemory(u16),
    #[error("global memory {0} exceeds 1023")]
    GlobalMemory(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    DirectReply = 0x00,
    DirectNoReply = 0x80,
}

impl CommandType {
    pub fn expects_reply(self) -> bool {
        matches!(self, CommandType::DirectReply)
    }
}

/// One direct command as it goes on the wire.
///
/// The length field is never stored; it is derived from the payload when
/// encoding so it always equals `payload.len() + 5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectCommandFrame {
    seq: u16,
    kind: CommandType,
    local_memory: u16,
    global_memory: u16,
    payload: Vec<u8>,
}

impl DirectCommandFrame {
    pub fn new(
        seq: u16,
        kind: CommandType,
        payload: &[u8],
        local_memory: u16,
        global_memory: u16,
    ) -> Result<Self, FrameError> {
        if payload.is_empty() {
            return Err(FrameError::EmptyPayload);
        }
        if payload.len() + HEADER_TAIL > u16::MAX as usize {
            return Err(FrameError::PayloadTooLong(payload.len()));
        }
        if local_memory > MAX_LOCAL_MEMORY {
            return Err(FrameError::LocalMemory(local_memory));
        }
        if global_memory > MAX_GLOBAL_MEMORY {
            return Err(FrameError::GlobalMemory(global_memory));
        }
        Ok(Self {
            seq,
            kind,
            local_memory,
            global_memory,
            payload: payload.to_vec(),
        })
    }

    pub fn seq(&self) -> u16 {
        self.seq
    }

    pub fn kind(&self) -> CommandType {
        self.kind
    }

    pub fn length(&self) -> u16 {
        (self.payload.len() + HEADER_TAIL) as u16
    }

    pub fn memory_size(&self) -> u16 {
        self.local_memory * 1024 + self.global_memory
    }

    /// Bytes the brick will send back: reply header plus global memory.
    pub fn reply_len(&self) -> usize {
        REPLY_HEADER_LEN + self.global_memory as usize
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        out.extend_from_slice(&self.length().to_le_bytes());
        out.extend_from_slice(&self.seq.to_le_bytes());
        out.push(self.kind as u8);
        out.extend_from_slice(&self.memory_size().to_le_bytes());
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Header fields as read back off the wire, without any validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub length: u16,
    pub seq: u16,
    pub kind: u8,
    pub memory_size: u16,
}

impl FrameHeader {
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let h = bytes.get(..HEADER_LEN)?;
        Some(Self {
            length: u16::from_le_bytes([h[0], h[1]]),
            seq: u16::from_le_bytes([h[2], h[3]]),
            kind: h[4],
            memory_size: u16::from_le_bytes([h[5], h[6]]),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    Ok,
    Error,
    Unknown(u8),
}

impl From<u8> for ReplyStatus {
    fn from(b: u8) -> Self {
        match b {
            0x02 => ReplyStatus::Ok,
            0x04 => ReplyStatus::Error,
            other => ReplyStatus::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyHeader {
    pub length: u16,
    pub seq: u16,
    pub status: ReplyStatus,
}

impl ReplyHeader {
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let h = bytes.get(..REPLY_HEADER_LEN)?;
        Some(Self {
            length: u16::from_le_bytes([h[0], h[1]]),
            seq: u16::from_le_bytes([h[2], h[3]]),
            status: ReplyStatus::from(h[4]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nop_frame_bytes() {
        let f = DirectCommandFrame::new(42, CommandType::DirectReply, &[OP_NOP], 0, 0).unwrap();
        assert_eq!(
            f.encode(),
            vec![0x06, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x00, 0x01]
        );
        assert_eq!(f.reply_len(), 5);
    }

    #[test]
    fn length_and_memory_fields() {
        for (len, local, global) in [(1usize, 0u16, 0u16), (7, 1, 6), (300, 63, 1023), (2, 4, 0)] {
            let payload = vec![0xAB; len];
            let f =
                DirectCommandFrame::new(1, CommandType::DirectReply, &payload, local, global)
                    .unwrap();
            let bytes = f.encode();
            assert_eq!(bytes.len(), HEADER_LEN + len);
            assert_eq!(u16::from_le_bytes([bytes[0], bytes[1]]) as usize, len + 5);
            assert_eq!(
                u16::from_le_bytes([bytes[5], bytes[6]]),
                local * 1024 + global
            );
            assert_eq!(&bytes[HEADER_LEN..], payload.as_slice());
        }
    }

    #[test]
    fn header_decodes_what_was_encoded() {
        let f = DirectCommandFrame::new(0xBEEF, CommandType::DirectNoReply, &[0x01, 0x02], 3, 17)
            .unwrap();
        let h = FrameHeader::decode(&f.encode()).unwrap();
        assert_eq!(h.length, 7);
        assert_eq!(h.seq, 0xBEEF);
        assert_eq!(h.kind, 0x80);
        assert_eq!(h.memory_size, 3 * 1024 + 17);
        assert_eq!(h.memory_size >> 10, 3);
        assert_eq!(h.memory_size & 0x03FF, 17);
    }

    #[test]
    fn getters_report_constructor_arguments() {
        let f = DirectCommandFrame::new(0xBEEF, CommandType::DirectNoReply, &[0x01], 3, 17)
            .unwrap();
        assert_eq!(f.seq(), 0xBEEF);
        assert_eq!(f.kind(), CommandType::DirectNoReply);
        assert!(!f.kind().expects_reply());
        assert_eq!(f.memory_size(), 3 * 1024 + 17);
    }

    #[test]
    fn rejects_unencodable_frames() {
        let k = CommandType::DirectReply;
        assert_eq!(
            DirectCommandFrame::new(0, k, &[], 0, 0),
            Err(FrameError::EmptyPayload)
        );
        assert_eq!(
            DirectCommandFrame::new(0, k, &[1], 64, 0),
            Err(FrameError::LocalMemory(64))
        );
        assert_eq!(
            DirectCommandFrame::new(0, k, &[1], 0, 1024),
            Err(FrameError::GlobalMemory(1024))
        );
        let big = vec![0u8; u16::MAX as usize];
        assert_eq!(
            DirectCommandFrame::new(0, k, &big, 0, 0),
            Err(FrameError::PayloadTooLong(big.len()))
        );
    }

    #[test]
    fn reply_header_status() {
        let ok = ReplyHeader::decode(&[0x03, 0x00, 0x2A, 0x00, 0x02]).unwrap();
        assert_eq!(ok.length, 3);
        assert_eq!(ok.seq, 42);
        assert_eq!(ok.status, ReplyStatus::Ok);

        let err = ReplyHeader::decode(&[0x03, 0x00, 0x01, 0x00, 0x04, 0xFF]).unwrap();
        assert_eq!(err.status, ReplyStatus::Error);

        assert_eq!(
            ReplyHeader::decode(&[0x03, 0x00, 0x01, 0x00, 0x09]).unwrap().status,
            ReplyStatus::Unknown(0x09)
        );
        assert!(ReplyHeader::decode(&[0x03, 0x00, 0x2A]).is_none());
    }
}
