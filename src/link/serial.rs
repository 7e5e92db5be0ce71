use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::debug;

use super::{Link, not_connected};

// Ignored by rfcomm ttys, but serialport wants one.
const BAUD: u32 = 115_200;

pub struct SerialLink {
    port: Option<Box<dyn SerialPort>>,
    dev: String,
}

impl SerialLink {
    pub fn open(dev: &str, timeout: Duration) -> io::Result<Self> {
        let port = serialport::new(dev, BAUD)
            .timeout(timeout)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open()?;
        debug!(dev, ?timeout, "serial link open");
        Ok(Self {
            port: Some(port),
            dev: dev.to_string(),
        })
    }

    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or_else(not_connected)
    }
}

impl Read for SerialLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port()?.read(buf)
    }
}

impl Write for SerialLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port()?.flush()
    }
}

impl Link for SerialLink {
    fn close(&mut self) -> io::Result<()> {
        if self.port.take().is_some() {
            debug!(dev = %self.dev, "serial link closed");
        }
        Ok(())
    }
}
