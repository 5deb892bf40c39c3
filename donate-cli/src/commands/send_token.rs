// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use donate_tools::core::interact::{self, SendToken, TokenAmount};

use crate::{
    common_args::{AuthArgs, NetworkArgs, ProviderArgs},
    error::DonateDeployResult,
};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Destination chain name as known to the bridge, e.g. "multiversx"
    destination_chain: String,
    /// Recipient on the destination chain
    destination_address: String,
    /// Token and amount as TOKEN:AMOUNT, e.g. "USDC:10.5"
    value: TokenAmount,

    #[command(flatten)]
    auth: AuthArgs,
    #[command(flatten)]
    network: NetworkArgs,
    #[command(flatten)]
    provider: ProviderArgs,
}

pub async fn exec(args: Args) -> DonateDeployResult {
    let manifest = args.network.manifest()?;
    let (_, config) = args.network.load_config(&manifest)?;
    let chain = args
        .provider
        .build_chain(&manifest, &args.network.network, &args.auth)
        .await?;

    let request = SendToken {
        value: args.value,
        destination_chain: args.destination_chain,
        destination_address: args.destination_address,
    };
    interact::send_token(&config, &request, &chain).await?;
    Ok(())
}
