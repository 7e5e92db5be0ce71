use anyhow::bail;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::str::FromStr;
use std::time::Duration;

use crate::addr::BdAddr;
use crate::client::{ClientOptions, DEFAULT_SEQ, SequenceMode};
use crate::frame::CommandType;
use crate::hex::{HexError, parse_hex};
use crate::link::LinkTarget;

#[derive(Parser, Debug, Clone)]
#[command(name = "ev3-direct", about = "Send LEGO EV3 direct commands over Bluetooth")]
pub struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Cmd {
    /// Send an arbitrary opcode sequence and print the reply
    Send(SendOpts),
    /// Send a single no-op, useful to check the link
    Nop(NopOpts),
}

#[derive(Args, Debug, Clone)]
pub struct LinkOpts {
    /// Brick Bluetooth address, e.g. 00:16:53:3F:71:F0
    #[arg(long, env = "EV3_ADDR")]
    pub addr: Option<BdAddr>,
    /// Serial device instead of a socket (e.g. /dev/rfcomm0); wins over --addr
    #[arg(long, env = "EV3_DEV")]
    pub dev: Option<String>,
    /// Read timeout for --dev, in milliseconds
    #[arg(long, default_value_t = 5_000)]
    pub timeout_ms: u64,
}

impl LinkOpts {
    pub fn target(&self) -> anyhow::Result<LinkTarget> {
        if let Some(dev) = &self.dev {
            Ok(LinkTarget::Serial {
                dev: dev.clone(),
                timeout: Duration::from_millis(self.timeout_ms),
            })
        } else if let Some(addr) = self.addr {
            Ok(LinkTarget::Rfcomm { addr })
        } else {
            bail!("no brick given: pass --addr (or EV3_ADDR) or --dev (or EV3_DEV)")
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SeqOpts {
    /// Sequence number put in the frame header
    #[arg(long, default_value_t = DEFAULT_SEQ)]
    pub seq: u16,
    /// Count up from --seq for each frame instead of repeating it
    #[arg(long, default_value_t = false)]
    pub counter: bool,
}

impl SeqOpts {
    pub fn mode(&self) -> SequenceMode {
        if self.counter {
            SequenceMode::Counter(self.seq)
        } else {
            SequenceMode::Fixed(self.seq)
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SendOpts {
    #[command(flatten)]
    pub link: LinkOpts,
    #[command(flatten)]
    pub seq: SeqOpts,
    /// Opcode bytes in hex: "01", "0x01", "30:60", "8104"
    #[arg(long)]
    pub ops: Opcodes,
    /// Local memory to reserve on the brick
    #[arg(long, default_value_t = 0)]
    pub local: u16,
    /// Global memory to reserve; the reply carries it after the 5 byte header
    #[arg(long, default_value_t = 0)]
    pub global: u16,
    /// Send as "direct command, no reply" and skip reading
    #[arg(long, default_value_t = false)]
    pub no_reply: bool,
}

impl SendOpts {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            kind: if self.no_reply {
                CommandType::DirectNoReply
            } else {
                CommandType::DirectReply
            },
            seq: self.seq.mode(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct NopOpts {
    #[command(flatten)]
    pub link: LinkOpts,
    #[command(flatten)]
    pub seq: SeqOpts,
}

/// Non-empty opcode bytes parsed from hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opcodes(pub Vec<u8>);

impl FromStr for Opcodes {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s).map(Opcodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ev3-direct").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn send_defaults() {
        let cli = parse(&["send", "--addr", "00:16:53:3F:71:F0", "--ops", "0x01"]);
        let Cmd::Send(opts) = cli.cmd else {
            panic!("wrong subcommand");
        };
        assert_eq!(opts.ops, Opcodes(vec![0x01]));
        assert_eq!(opts.local, 0);
        assert_eq!(opts.global, 0);
        let co = opts.client_options();
        assert_eq!(co.kind, CommandType::DirectReply);
        assert_eq!(co.seq, SequenceMode::Fixed(42));
        assert_eq!(
            opts.link.target().unwrap(),
            LinkTarget::Rfcomm {
                addr: "00:16:53:3F:71:F0".parse().unwrap()
            }
        );
    }

    #[test]
    fn send_all_flags() {
        let cli = parse(&[
            "-vv", "send", "--dev", "/dev/rfcomm0", "--timeout-ms", "250", "--ops", "30:60",
            "--local", "1", "--global", "6", "--seq", "7", "--counter", "--no-reply",
        ]);
        assert_eq!(cli.verbose, 2);
        let Cmd::Send(opts) = cli.cmd else {
            panic!("wrong subcommand");
        };
        assert_eq!(opts.ops.0, vec![0x30, 0x60]);
        assert_eq!((opts.local, opts.global), (1, 6));
        let co = opts.client_options();
        assert_eq!(co.kind, CommandType::DirectNoReply);
        assert_eq!(co.seq, SequenceMode::Counter(7));
        assert_eq!(
            opts.link.target().unwrap(),
            LinkTarget::Serial {
                dev: "/dev/rfcomm0".into(),
                timeout: Duration::from_millis(250)
            }
        );
    }

    #[test]
    fn dev_wins_over_addr() {
        let cli = parse(&["nop", "--addr", "00:16:53:3F:71:F0", "--dev", "/dev/rfcomm1"]);
        let Cmd::Nop(opts) = cli.cmd else {
            panic!("wrong subcommand");
        };
        assert!(matches!(opts.link.target().unwrap(), LinkTarget::Serial { .. }));
    }

    #[test]
    fn rejects_bad_input() {
        let bad = |args: &[&str]| {
            Cli::try_parse_from(std::iter::once("ev3-direct").chain(args.iter().copied())).is_err()
        };
        assert!(bad(&["send", "--addr", "00:16:53", "--ops", "01"]));
        assert!(bad(&["send", "--addr", "00:16:53:3F:71:F0", "--ops", "0"]));
        assert!(bad(&["send", "--addr", "00:16:53:3F:71:F0"]));
    }

    #[test]
    fn missing_target_is_an_error() {
        let opts = LinkOpts {
            addr: None,
            dev: None,
            timeout_ms: 10,
        };
        assert!(opts.target().is_err());
    }
}
