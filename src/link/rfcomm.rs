use std::io::{self, Read, Write};
use std::iter;

use io_bluetooth::bt::{self, BtAddr, BtStream};
use tracing::debug;

use super::{Link, not_connected};
use crate::addr::BdAddr;

/// Blocking RFCOMM stream to the brick's serial port service. No connect or
/// read timeout is set.
pub struct RfcommStream {
    stream: Option<BtStream>,
    peer: BdAddr,
}

impl RfcommStream {
    pub fn connect(peer: BdAddr) -> io::Result<Self> {
        let addr = BtAddr(peer.0);
        let stream = BtStream::connect(iter::once(&addr), bt::BtProtocol::RFCOMM)?;
        match stream.peer_addr() {
            Ok(remote) => debug!(%remote, "rfcomm connected"),
            Err(e) => debug!(%peer, "rfcomm connected, peer address unavailable: {}", e),
        }
        Ok(Self {
            stream: Some(stream),
            peer,
        })
    }

    fn stream(&mut self) -> io::Result<&mut BtStream> {
        self.stream.as_mut().ok_or_else(not_connected)
    }
}

impl Read for RfcommStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream()?.recv(buf)
    }
}

impl Write for RfcommStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream()?.send(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Link for RfcommStream {
    fn close(&mut self) -> io::Result<()> {
        if self.stream.take().is_some() {
            debug!(peer = %self.peer, "rfcomm stream closed");
        }
        Ok(())
    }
}
