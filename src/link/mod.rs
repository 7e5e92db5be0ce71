//! Blocking byte links to a brick.
//!
//! A [`Link`] is whatever carries direct command frames: an RFCOMM socket on
//! Linux, or a serial device node (an `rfcomm bind` tty, or the virtual port
//! macOS creates for a paired brick). The client only needs `Read`, `Write`
//! and an explicit close.

use std::fmt;
use std::io::{self, Read, Write};
use std::time::Duration;

use tracing::info;

use crate::addr::BdAddr;
use crate::error::{Ev3Error, Result};

#[cfg(any(target_os = "linux", windows))]
pub mod rfcomm;
pub mod serial;

pub trait Link: Read + Write {
    /// Release the underlying descriptor. Calling it again is a no-op.
    fn close(&mut self) -> io::Result<()>;
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Rfcomm { addr: BdAddr },
    Serial { dev: String, timeout: Duration },
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTarget::Rfcomm { addr } => write!(f, "rfcomm://{}", addr),
            LinkTarget::Serial { dev, .. } => write!(f, "serial://{}", dev),
        }
    }
}

pub fn open_link(target: &LinkTarget) -> Result<Box<dyn Link>> {
    info!("Request to connect to {}", target);
    let link: io::Result<Box<dyn Link>> = match target {
        #[cfg(any(target_os = "linux", windows))]
        LinkTarget::Rfcomm { addr } => {
            rfcomm::RfcommStream::connect(*addr).map(|s| Box::new(s) as Box<dyn Link>)
        }
        #[cfg(not(any(target_os = "linux", windows)))]
        LinkTarget::Rfcomm { .. } => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "no RFCOMM sockets on this platform; use --dev with the brick's serial port",
        )),
        LinkTarget::Serial { dev, timeout } => {
            serial::SerialLink::open(dev, *timeout).map(|s| Box::new(s) as Box<dyn Link>)
        }
    };
    let link = link.map_err(|source| Ev3Error::Connection {
        target: target.to_string(),
        source,
    })?;
    info!("Connection to {} established", target);
    Ok(link)
}

pub(crate) fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "link closed")
}
