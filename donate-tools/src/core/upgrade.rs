// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Upgrades of contracts deployed behind ERC-1967 proxies.

use alloy::primitives::{keccak256, Address, Bytes, B256};

use crate::{
    core::{
        artifact::{self, Artifact, ArtifactError},
        chain::{Chain, ChainError},
        config::{ConfigError, NetworkConfig},
        confirm::Confirm,
        contracts::{ContractHandle, IProxyAdmin, IUUPSUpgradeable, ADMIN_SLOT, IMPLEMENTATION_SLOT},
        deployment::{proxy, verify_cross_references, ContractSpec, DeploymentError, Mismatch},
    },
    utils::color::{Color, DebugColor},
};

#[derive(Debug, thiserror::Error)]
pub enum UpgradeError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Artifact(#[from] ArtifactError),
    #[error("{0}")]
    Deployment(#[from] DeploymentError),
    #[error("transaction failed: {0}")]
    TransactionFailure(#[from] ChainError),

    #[error("{0} is not deployed on this network, deploy it first")]
    NotDeployed(String),
    #[error(
        "{name} at {} is not behind a proxy, its implementation slot is empty",
        .address.debug_lavender()
    )]
    NotAProxy { name: String, address: Address },
    #[error(
        "implementation {} does not match the previous artifact: expected codehash {}, found {}",
        .implementation.debug_lavender(),
        .expected.mint(),
        .actual.red()
    )]
    ImportMismatch {
        implementation: Address,
        expected: B256,
        actual: B256,
    },
    #[error(
        "proxy {} still points at {} instead of {}",
        .proxy.debug_lavender(),
        .actual.red(),
        .expected.mint()
    )]
    ProxyNotUpgraded {
        proxy: Address,
        expected: Address,
        actual: Address,
    },
}

/// A call run by the proxy right after switching implementations, e.g.
/// `reinitialize(uint64 version)` with `["2"]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reinitializer {
    pub signature: String,
    pub args: Vec<String>,
}

impl Reinitializer {
    pub fn encode(&self) -> Result<Bytes, ArtifactError> {
        artifact::encode_call(&self.signature, &self.args)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UpgradeState {
    Verified {
        proxy: Address,
        implementation: Address,
    },
    Failed {
        proxy: Address,
        implementation: Address,
        mismatches: Vec<Mismatch>,
    },
    Aborted,
}

impl UpgradeState {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}

pub struct UpgradeReconciler<'a, C> {
    spec: &'a ContractSpec,
    artifact: &'a Artifact,
    previous: Option<&'a Artifact>,
    reinitializer: Option<&'a Reinitializer>,
    chain: &'a C,
}

impl<'a, C: Chain> UpgradeReconciler<'a, C> {
    pub fn new(spec: &'a ContractSpec, artifact: &'a Artifact, chain: &'a C) -> Self {
        Self {
            spec,
            artifact,
            previous: None,
            reinitializer: None,
            chain,
        }
    }

    /// Requires the running implementation to match `previous` before upgrading.
    pub fn with_previous(mut self, previous: &'a Artifact) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn with_reinitializer(mut self, reinitializer: &'a Reinitializer) -> Self {
        self.reinitializer = Some(reinitializer);
        self
    }

    /// Points the proxy recorded in `network` at a fresh implementation.
    ///
    /// Only the record's `implementation` changes, and only once verification passed.
    pub async fn run(
        &self,
        network: &mut NetworkConfig,
        confirm: &mut impl Confirm,
    ) -> Result<UpgradeState, UpgradeError> {
        let name = &self.spec.name;
        let record = network.contract(name).cloned().unwrap_or_default();
        let proxy = record
            .address
            .ok_or_else(|| UpgradeError::NotDeployed(name.clone()))?;
        record.validate(name)?;
        let expectations = self.spec.expectations(network)?;
        let data = match self.reinitializer {
            Some(reinitializer) => reinitializer.encode()?,
            None => Bytes::new(),
        };

        let handle = ContractHandle::attach(proxy, self.chain);
        let current = handle.slot_address(IMPLEMENTATION_SLOT).await?;
        if current.is_zero() {
            return Err(UpgradeError::NotAProxy {
                name: name.clone(),
                address: proxy,
            });
        }
        debug!(@grey, "current implementation: {}", current.debug_lavender());

        let prompt = format!(
            "Do you want to proceed with upgrade of {name} at {proxy}? (double check everything first!)"
        );
        if !confirm.confirm(&prompt) {
            greyln!("Upgrade aborted");
            return Ok(UpgradeState::Aborted);
        }

        if let Some(previous) = self.previous {
            self.import(current, previous).await?;
        }

        let implementation = proxy::deploy_implementation(self.artifact, self.chain).await?;
        let admin = handle.slot_address(ADMIN_SLOT).await?;
        let receipt = if admin.is_zero() {
            info!(@grey, "upgrading through the proxy (UUPS)");
            handle
                .send(IUUPSUpgradeable::upgradeToAndCallCall {
                    newImplementation: implementation,
                    data,
                })
                .await?
        } else {
            info!(@grey, "upgrading through proxy admin {}", admin.debug_lavender());
            ContractHandle::attach(admin, self.chain)
                .send(IProxyAdmin::upgradeAndCallCall {
                    proxy,
                    implementation,
                    data,
                })
                .await?
        };
        debug!(@grey, "upgrade tx hash: {}", receipt.tx_hash.debug_lavender());

        let actual = handle.slot_address(IMPLEMENTATION_SLOT).await?;
        if actual != implementation {
            return Err(UpgradeError::ProxyNotUpgraded {
                proxy,
                expected: implementation,
                actual,
            });
        }

        greyln!("{name} address: {proxy}");
        greyln!("Implementation address: {implementation}");
        let mismatches = verify_cross_references(proxy, &expectations, self.chain).await?;
        if !mismatches.is_empty() {
            redln!("Upgrade status: FAILED");
            return Ok(UpgradeState::Failed {
                proxy,
                implementation,
                mismatches,
            });
        }

        network.contract_mut(name).implementation = Some(implementation);
        mintln!("Upgrade status: SUCCESS");
        Ok(UpgradeState::Verified {
            proxy,
            implementation,
        })
    }

    /// Checks that the code behind the proxy is the one built from `previous`.
    async fn import(&self, implementation: Address, previous: &Artifact) -> Result<(), UpgradeError> {
        let code = self.chain.code_at(implementation).await?;
        let actual = keccak256(&code);
        let expected = previous.code_hash();
        if actual != expected {
            return Err(UpgradeError::ImportMismatch {
                implementation,
                expected,
                actual,
            });
        }
        greyln!("Imported implementation at {implementation}");
        Ok(())
    }
}
