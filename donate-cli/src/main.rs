// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! CLI for `donate-deploy`.

use std::process::ExitCode;

use clap::Parser;

mod commands;
mod common_args;
mod constants;
mod error;
mod utils;

#[derive(Debug, Parser)]
#[command(name = "donate-deploy")]
#[command(author)]
#[command(about = "Deploy, upgrade and wire the Donate contracts on EVM chains", long_about = None)]
#[command(propagate_version = true)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: commands::Command,

    /// Whether to print debug info.
    #[arg(long, global = true)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(log_level).expect("setting up logger");

    // Offline commands don't need a thread pool
    let mut runtime = match args.command {
        commands::Command::Predict(_) => tokio::runtime::Builder::new_current_thread(),
        _ => tokio::runtime::Builder::new_multi_thread(),
    };

    let result = runtime
        .enable_all()
        .build()
        .map_err(Into::into)
        .and_then(|rt| rt.block_on(commands::exec(args.command)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            utils::print_error(&err);
            err.exit_code()
        }
    }
}
