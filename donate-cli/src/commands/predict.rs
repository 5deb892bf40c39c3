// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::path::PathBuf;

use alloy::primitives::Address;
use donate_tools::{
    core::{
        deployment::{ContractSpec, DeploymentConfig},
        predict,
    },
    utils::color::Color,
};

use crate::{common_args::NetworkArgs, error::DonateDeployResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Address that will sign the deployment
    #[arg(long)]
    sender: Address,
    /// Compiled contract artifact, defaults to the one in Deploy.toml
    #[arg(long)]
    artifact: Option<PathBuf>,
    /// Key the deployment salt is derived from
    #[arg(long)]
    salt: Option<String>,
    /// Deployment factory, defaults to the Deployer recorded in config
    #[arg(long)]
    factory: Option<Address>,

    #[command(flatten)]
    network: NetworkArgs,
}

pub fn exec(args: Args) -> DonateDeployResult {
    let manifest = args.network.manifest()?;
    let (_, config) = args.network.load_config(&manifest)?;
    let artifact = args
        .network
        .artifact(args.artifact.as_ref(), manifest.contract.artifact.as_ref())?;

    let mut spec = ContractSpec::donate();
    if let Some(salt) = args.salt {
        spec = spec.with_salt_key(salt);
    }
    let factory = match args.factory {
        Some(factory) => factory,
        None => DeploymentConfig {
            factory: args.network.manifest_factory(&manifest),
            ..Default::default()
        }
        .factory(&config)?,
    };

    let expectations = spec.expectations(&config)?;
    let init_code = artifact.init_code(&spec.init_args(args.sender, &expectations))?;
    let address = predict::predict(factory, args.sender, &init_code, &spec.salt_key);

    log::debug!("factory: {factory}, salt key: {}", spec.salt_key);
    println!(
        "{} will be deployed at {}",
        spec.name.grey(),
        address.mint()
    );
    Ok(())
}
