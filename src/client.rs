use std::io::{self, Read, Write};

use tracing::{debug, info, warn};

use crate::error::{Ev3Error, Result};
use crate::frame::{CommandType, DirectCommandFrame, FrameHeader, ReplyHeader, ReplyStatus};
use crate::hex::to_hex;
use crate::link::{Link, LinkTarget, open_link};

/// Sequence number stamped into the original one-shot script's frames.
pub const DEFAULT_SEQ: u16 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMode {
    /// Every frame carries the same number.
    Fixed(u16),
    /// Start here and count up per frame, wrapping at `u16::MAX`.
    Counter(u16),
}

#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    pub kind: CommandType,
    pub seq: SequenceMode,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            kind: CommandType::DirectReply,
            seq: SequenceMode::Fixed(DEFAULT_SEQ),
        }
    }
}

/// One exclusively owned connection to a brick.
///
/// Two states: open, then closed for good. [`close`](Self::close) may be
/// called any number of times and dropping the client closes it too.
pub struct DirectCommandClient<L: Link = Box<dyn Link>> {
    link: Option<L>,
    opts: ClientOptions,
    next_seq: u16,
}

impl DirectCommandClient {
    pub fn connect(target: &LinkTarget, opts: ClientOptions) -> Result<Self> {
        Ok(Self::new(open_link(target)?, opts))
    }

    /// Connect, run `f`, and close the link whatever `f` returns.
    pub fn with_connection<T>(
        target: &LinkTarget,
        opts: ClientOptions,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        Self::connect(target, opts)?.scoped(f)
    }
}

impl<L: Link> DirectCommandClient<L> {
    pub fn new(link: L, opts: ClientOptions) -> Self {
        let next_seq = match opts.seq {
            SequenceMode::Fixed(n) | SequenceMode::Counter(n) => n,
        };
        Self {
            link: Some(link),
            opts,
            next_seq,
        }
    }

    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// Run `f` against this client and close it afterwards.
    ///
    /// An error from `f` wins over an error from closing.
    pub fn scoped<T>(mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let out = f(&mut self);
        let closed = self.close();
        let out = out?;
        closed?;
        Ok(out)
    }

    fn advance_seq(&mut self) {
        if let SequenceMode::Counter(_) = self.opts.seq {
            self.next_seq = self.next_seq.wrapping_add(1);
        }
    }

    /// Send `opcodes` as one direct command and return the reply bytes.
    ///
    /// Exactly one read of up to `5 + global_memory` bytes is issued and its
    /// result returned as-is: if the transport delivers a short read, the
    /// reply is short. No-reply commands skip the read and return nothing.
    pub fn send_direct_command(
        &mut self,
        opcodes: &[u8],
        local_memory: u16,
        global_memory: u16,
    ) -> Result<Vec<u8>> {
        if !self.is_open() {
            return Err(Ev3Error::Closed);
        }
        let frame = DirectCommandFrame::new(
            self.next_seq,
            self.opts.kind,
            opcodes,
            local_memory,
            global_memory,
        )?;
        // Rejected frames never reach the wire and keep their number.
        self.advance_seq();
        let seq = frame.seq();
        let bytes = frame.encode();
        let link = self.link.as_mut().ok_or(Ev3Error::Closed)?;

        link.write_all(&bytes).map_err(Ev3Error::Transmission)?;
        link.flush().map_err(Ev3Error::Transmission)?;
        info!("Sent 0x|{}|", to_hex(&bytes));
        if let Some(h) = FrameHeader::decode(&bytes) {
            debug!(length = h.length, seq = h.seq, kind = h.kind, memory = h.memory_size, "sent header");
        }

        if !frame.kind().expects_reply() {
            return Ok(Vec::new());
        }

        let mut reply = vec![0u8; frame.reply_len()];
        let n = link.read(&mut reply).map_err(Ev3Error::Transmission)?;
        if n == 0 {
            return Err(Ev3Error::Transmission(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "peer closed the connection",
            )));
        }
        reply.truncate(n);
        info!("Recv 0x|{}|", to_hex(&reply));

        if n < frame.reply_len() {
            debug!(got = n, wanted = frame.reply_len(), "short reply");
        }
        if let Some(h) = ReplyHeader::decode(&reply) {
            debug!(length = h.length, status = ?h.status, "reply header");
            for issue in reply_issues(seq, &h) {
                match issue {
                    ReplyIssue::SeqMismatch { got } => {
                        warn!(sent = seq, got, "reply sequence mismatch")
                    }
                    ReplyIssue::BrickError => warn!(seq = h.seq, "brick reported command error"),
                }
            }
        }
        Ok(reply)
    }

    pub fn close(&mut self) -> Result<()> {
        match self.link.take() {
            Some(mut link) => {
                debug!("closing link");
                link.close().map_err(Ev3Error::Transmission)
            }
            None => Ok(()),
        }
    }
}

/// Things worth a warning in a reply header. Neither rejects the reply.
#[derive(Debug, PartialEq, Eq)]
enum ReplyIssue {
    SeqMismatch { got: u16 },
    BrickError,
}

fn reply_issues(sent: u16, h: &ReplyHeader) -> Vec<ReplyIssue> {
    let mut out = Vec::new();
    if h.seq != sent {
        out.push(ReplyIssue::SeqMismatch { got: h.seq });
    }
    if h.status == ReplyStatus::Error {
        out.push(ReplyIssue::BrickError);
    }
    out
}

impl<L: Link> Drop for DirectCommandClient<L> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("close on drop: {}", e);
        }
    }
}
