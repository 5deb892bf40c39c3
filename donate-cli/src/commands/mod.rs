// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use crate::error::DonateDeployResult;

mod deploy;
mod link;
mod predict;
mod send_token;
mod upgrade;

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Print the address the contract will be deployed at, without touching the chain
    #[clap(visible_alias = "p")]
    Predict(predict::Args),
    /// Deploy the contract, or attach to the configured one, and verify it
    #[clap(visible_alias = "d")]
    Deploy(deploy::Args),
    /// Upgrade the contract behind its proxy
    #[clap(visible_alias = "u")]
    Upgrade(upgrade::Args),
    /// Register the chains, tokens and charities recorded in config on the contract
    #[clap(visible_alias = "l")]
    Link(link::Args),
    /// Send tokens to another chain through the contract
    SendToken(send_token::Args),
}

pub async fn exec(cmd: Command) -> DonateDeployResult {
    match cmd {
        Command::Predict(args) => predict::exec(args),
        Command::Deploy(args) => deploy::exec(args).await,
        Command::Upgrade(args) => upgrade::exec(args).await,
        Command::Link(args) => link::exec(args).await,
        Command::SendToken(args) => send_token::exec(args).await,
    }
}
