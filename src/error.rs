use std::io;

use thiserror::Error;

use crate::frame::FrameError;

#[derive(Debug, Error)]
pub enum Ev3Error {
    #[error("connect {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("transmission: {0}")]
    Transmission(#[source] io::Error),
    #[error("connection already closed")]
    Closed,
    #[error(transparent)]
    Frame(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, Ev3Error>;
