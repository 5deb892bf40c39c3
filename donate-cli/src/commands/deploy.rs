// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::path::PathBuf;

use donate_tools::core::{
    config::DeploymentMethod,
    deployment::{ContractSpec, DeploymentConfig, DeploymentReconciler, DeploymentState},
    links::LinkKind,
};

use crate::{
    commands::link,
    common_args::{AuthArgs, ConfirmArgs, NetworkArgs, ProviderArgs},
    error::{DonateDeployError, DonateDeployResult},
};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum Method {
    /// Plain CREATE from the wallet
    Direct,
    /// Deterministic deployment through the factory
    Create2,
    /// ERC-1967 proxy through the factory in front of a fresh implementation
    Proxy,
}

impl From<Method> for DeploymentMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Direct => Self::Direct,
            Method::Create2 => Self::Create2,
            Method::Proxy => Self::Proxy,
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Compiled contract artifact, defaults to the one in Deploy.toml
    #[arg(long)]
    artifact: Option<PathBuf>,
    /// How to deploy a contract that has no address in config yet
    #[arg(long, value_enum, default_value_t = Method::Create2)]
    method: Method,
    /// Compiled ERC-1967 proxy artifact, required by the proxy method
    #[arg(long)]
    proxy_artifact: Option<PathBuf>,
    /// Key the deployment salt is derived from
    #[arg(long)]
    salt: Option<String>,
    /// Register everything recorded in config on the contract once it is verified
    #[arg(long)]
    link: bool,

    #[command(flatten)]
    confirm: ConfirmArgs,
    #[command(flatten)]
    auth: AuthArgs,
    #[command(flatten)]
    network: NetworkArgs,
    #[command(flatten)]
    provider: ProviderArgs,
}

pub async fn exec(args: Args) -> DonateDeployResult {
    let manifest = args.network.manifest()?;
    let (store, mut config) = args.network.load_config(&manifest)?;
    let artifact = args
        .network
        .artifact(args.artifact.as_ref(), manifest.contract.artifact.as_ref())?;
    let proxy_bytecode = match args.method {
        Method::Proxy => Some(
            args.network
                .artifact(
                    args.proxy_artifact.as_ref(),
                    manifest.contract.proxy_artifact.as_ref(),
                )?
                .bytecode,
        ),
        _ => None,
    };

    let mut spec = ContractSpec::donate();
    if let Some(salt) = args.salt {
        spec = spec.with_salt_key(salt);
    }
    let deployment_config = DeploymentConfig {
        method: args.method.into(),
        proxy_bytecode,
        factory: args.network.manifest_factory(&manifest),
    };

    let chain = args
        .provider
        .build_chain(&manifest, &args.network.network, &args.auth)
        .await?;
    let state = DeploymentReconciler::new(&spec, &artifact, &deployment_config, &chain)
        .run(&mut config, &mut args.confirm.prompt())
        .await?;

    match state {
        DeploymentState::Verified {
            deployment: Some(_),
            ..
        } => {
            store.save(&config, &args.network.network)?;
            log::info!("saved {}", store.path(&args.network.network).display());
        }
        DeploymentState::Failed {
            address,
            mismatches,
        } => {
            return Err(DonateDeployError::verification_failed(format!(
                "{} at {address} does not match config ({} mismatch(es))",
                spec.name,
                mismatches.len()
            )));
        }
        DeploymentState::Aborted => return Ok(()),
        _ => {}
    }

    if args.link {
        link::replay(&spec.name, &config, &chain, &LinkKind::ALL).await?;
    }
    Ok(())
}
