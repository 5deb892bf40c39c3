// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::path::PathBuf;

use donate_tools::core::{
    artifact::Artifact,
    deployment::ContractSpec,
    upgrade::{Reinitializer, UpgradeReconciler, UpgradeState},
};

use crate::{
    common_args::{AuthArgs, ConfirmArgs, NetworkArgs, ProviderArgs},
    error::{DonateDeployError, DonateDeployResult},
};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Compiled artifact of the new implementation, defaults to the one in Deploy.toml
    #[arg(long)]
    artifact: Option<PathBuf>,
    /// Compiled artifact of the running implementation; the upgrade is refused if the code
    /// behind the proxy was not built from it
    #[arg(long)]
    previous_artifact: Option<PathBuf>,
    /// Signature of a function to call right after upgrading, e.g. "reinitialize(uint64)"
    #[arg(long)]
    reinit_signature: Option<String>,
    /// Arguments of the reinitializer call
    #[arg(
        long,
        num_args(0..),
        value_name = "ARGS",
        allow_hyphen_values = true,
        requires = "reinit_signature"
    )]
    reinit_args: Vec<String>,

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
    let previous = args
        .previous_artifact
        .as_ref()
        .map(Artifact::load)
        .transpose()?;
    let reinitializer = args.reinit_signature.map(|signature| Reinitializer {
        signature,
        args: args.reinit_args,
    });

    let spec = ContractSpec::donate();
    let chain = args
        .provider
        .build_chain(&manifest, &args.network.network, &args.auth)
        .await?;
    let mut reconciler = UpgradeReconciler::new(&spec, &artifact, &chain);
    if let Some(previous) = &previous {
        reconciler = reconciler.with_previous(previous);
    }
    if let Some(reinitializer) = &reinitializer {
        reconciler = reconciler.with_reinitializer(reinitializer);
    }

    match reconciler.run(&mut config, &mut args.confirm.prompt()).await? {
        UpgradeState::Verified { .. } => {
            store.save(&config, &args.network.network)?;
            log::info!("saved {}", store.path(&args.network.network).display());
            Ok(())
        }
        UpgradeState::Failed {
            proxy, mismatches, ..
        } => Err(DonateDeployError::verification_failed(format!(
            "{} at {proxy} does not match config after upgrade ({} mismatch(es))",
            spec.name,
            mismatches.len()
        ))),
        UpgradeState::Aborted => Ok(()),
    }
}
