// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Logic contracts behind ERC-1967 proxies.

use alloy::{json_abi::Function, primitives::Address};

use super::DeploymentError;
use crate::{
    core::{
        artifact::Artifact,
        chain::{Chain, ChainError},
        contracts::{ContractHandle, IMPLEMENTATION_SLOT},
    },
    utils::color::DebugColor,
};

/// The `initialize` overload taking `arity` arguments.
pub fn initializer<'a>(
    artifact: &'a Artifact,
    contract: &str,
    arity: usize,
) -> Result<&'a Function, DeploymentError> {
    artifact
        .abi
        .function("initialize")
        .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
        .ok_or_else(|| DeploymentError::MissingInitializer {
            contract: contract.to_owned(),
            arity,
        })
}

/// Deploys the logic contract with a plain `CREATE` and returns its address.
pub async fn deploy_implementation(
    artifact: &Artifact,
    chain: &impl Chain,
) -> Result<Address, DeploymentError> {
    greyln!("Deploying implementation contract...");
    let receipt = chain.create(artifact.init_code(&[])?).await?;
    let implementation = receipt
        .contract_address
        .ok_or(ChainError::MissingReceiptAddress {
            tx_hash: receipt.tx_hash,
        })?;
    info!(@grey, "implementation deployed at {}", implementation.debug_lavender());
    Ok(implementation)
}

/// Checks that the proxy's implementation slot points at `expected`.
pub async fn check_implementation(
    proxy: Address,
    expected: Address,
    chain: &impl Chain,
) -> Result<(), DeploymentError> {
    let actual = ContractHandle::attach(proxy, chain)
        .slot_address(IMPLEMENTATION_SLOT)
        .await?;
    if actual != expected {
        return Err(DeploymentError::ProxyNotInitialized {
            proxy,
            expected,
            actual,
        });
    }
    Ok(())
}
