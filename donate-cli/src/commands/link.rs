// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use donate_tools::core::{
    chain::Chain,
    config::NetworkConfig,
    links::{self, LinkKind},
};
use eyre::eyre;

use crate::{
    common_args::{AuthArgs, NetworkArgs, ProviderArgs},
    constants::DONATE,
    error::DonateDeployResult,
};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum Category {
    KnownChains,
    KnownTokens,
    KnownCharities,
    KnownCharitiesInterchain,
    AnalyticTokens,
}

impl From<Category> for LinkKind {
    fn from(category: Category) -> Self {
        match category {
            Category::KnownChains => Self::KnownChains,
            Category::KnownTokens => Self::KnownTokens,
            Category::KnownCharities => Self::KnownCharities,
            Category::KnownCharitiesInterchain => Self::KnownCharitiesInterchain,
            Category::AnalyticTokens => Self::AnalyticsTokens,
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Only replay these categories (all by default)
    #[arg(long, value_enum, value_delimiter = ',')]
    only: Vec<Category>,

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
    let kinds: Vec<LinkKind> = if args.only.is_empty() {
        LinkKind::ALL.to_vec()
    } else {
        args.only.iter().map(|&category| category.into()).collect()
    };

    let chain = args
        .provider
        .build_chain(&manifest, &args.network.network, &args.auth)
        .await?;
    replay(DONATE, &config, &chain, &kinds).await
}

/// Replays the given categories and fails if any of them did not complete.
pub async fn replay(
    name: &str,
    config: &NetworkConfig,
    chain: &impl Chain,
    kinds: &[LinkKind],
) -> DonateDeployResult {
    let report = links::replay_all(name, config, chain, kinds).await?;
    let failed: Vec<String> = report
        .failures()
        .map(|category| category.kind.to_string())
        .collect();
    if !failed.is_empty() {
        return Err(eyre!("failed to link {}", failed.join(", ")).into());
    }
    Ok(())
}
