use anyhow::Result;
use clap::Parser;

mod addr;
mod cli;
mod client;
mod error;
mod frame;
mod hex;
mod link;
mod logging;
mod send;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init(args.verbose)?;
    match args.cmd {
        cli::Cmd::Send(opts) => send::run(opts),
        cli::Cmd::Nop(opts) => send::run_nop(opts),
    }
}
