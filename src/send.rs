use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{NopOpts, SendOpts};
use crate::client::{ClientOptions, DirectCommandClient};
use crate::frame::OP_NOP;
use crate::hex::to_hex;

pub fn run(opts: SendOpts) -> Result<()> {
    let target = opts.link.target()?;
    info!(
        "[send] target={} ops={} local={} global={} no_reply={}",
        target,
        to_hex(&opts.ops.0),
        opts.local,
        opts.global,
        opts.no_reply
    );
    let reply = DirectCommandClient::with_connection(&target, opts.client_options(), |ev3| {
        ev3.send_direct_command(&opts.ops.0, opts.local, opts.global)
    })
    .with_context(|| format!("direct command to {}", target))?;
    print_reply(&reply);
    Ok(())
}

pub fn run_nop(opts: NopOpts) -> Result<()> {
    let target = opts.link.target()?;
    let client_opts = ClientOptions {
        seq: opts.seq.mode(),
        ..ClientOptions::default()
    };
    let reply = DirectCommandClient::with_connection(&target, client_opts, |ev3| {
        ev3.send_direct_command(&[OP_NOP], 0, 0)
    })
    .with_context(|| format!("no-op to {}", target))?;
    print_reply(&reply);
    Ok(())
}

fn print_reply(reply: &[u8]) {
    if !reply.is_empty() {
        println!("0x|{}|", to_hex(reply));
    }
}
