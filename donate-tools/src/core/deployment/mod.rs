// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Deploy-or-attach reconciliation.
//!
//! [`DeploymentReconciler::run`] drives a [`DeploymentState`] from `Unconfigured` to one of the
//! terminal states `Verified`, `Failed` or `Aborted`:
//!
//! ```text
//! Unconfigured ──address in config──▶ Attached ─────────────┐
//!      │                                                     ├─▶ Verified | Failed
//!      └──▶ PendingConfirmation ──confirmed──▶ Deployed ─────┘
//!                     └──declined──▶ Aborted
//! ```
//!
//! Only a `Verified` fresh deployment is written into the [`NetworkConfig`]; nothing is written
//! for `Attached`, `Failed` or `Aborted` runs.

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    primitives::{Address, Bytes, B256},
};

use crate::{
    core::{
        artifact::{Artifact, ArtifactError},
        chain::{Chain, ChainError, Receipt},
        config::{ConfigError, DeploymentMethod, NetworkConfig, FACTORY},
        confirm::Confirm,
        contracts::{deployed_event_address, proxy_init_code, ContractHandle, IDeployer},
        predict,
    },
    utils::color::{Color, DebugColor},
};

pub use verify::{verify_cross_references, CrossReference, Expectation, Mismatch};

pub mod proxy;
pub mod verify;

/// Name of the dependency the Donate contract is initialized with.
pub const INTERCHAIN_TOKEN_SERVICE: &str = "InterchainTokenService";

#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Artifact(#[from] ArtifactError),
    #[error("transaction failed: {0}")]
    TransactionFailure(#[from] ChainError),
    #[error("abi error: {0}")]
    Abi(#[from] alloy::dyn_abi::Error),

    #[error(
        "salt collision: code already exists at predicted address {} for salt {salt}",
        .address.red()
    )]
    SaltCollision { address: Address, salt: String },
    #[error(
        "address mismatch: predicted {} but chain reports {}",
        .expected.mint(),
        .actual.red()
    )]
    AddressMismatch { expected: Address, actual: Address },
    #[error("proxy deployment requires the proxy contract bytecode")]
    MissingProxyBytecode,
    #[error("{contract} has no initializer taking {arity} arguments")]
    MissingInitializer { contract: String, arity: usize },
    #[error(
        "proxy {} reports implementation {} instead of {}",
        .proxy.debug_lavender(),
        .actual.red(),
        .expected.mint()
    )]
    ProxyNotInitialized {
        proxy: Address,
        expected: Address,
        actual: Address,
    },
    #[error("invalid cross reference getter {0}")]
    InvalidGetter(String),
}

/// A contract this tool manages: its config name, its deployment key, and the cross references
/// it must hold once deployed.
///
/// Constructor and initializer arguments are `(owner, dependency addresses...)` in the order of
/// `cross_references`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractSpec {
    pub name: String,
    pub salt_key: String,
    pub cross_references: Vec<CrossReference>,
}

impl ContractSpec {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            salt_key: name.clone(),
            name,
            cross_references: Vec::new(),
        }
    }

    pub fn with_salt_key(mut self, key: impl Into<String>) -> Self {
        self.salt_key = key.into();
        self
    }

    pub fn with_cross_reference(mut self, reference: CrossReference) -> Self {
        self.cross_references.push(reference);
        self
    }

    /// The Donate bridge contract.
    pub fn donate() -> Self {
        Self::new("Donate").with_cross_reference(CrossReference::new(
            "interchainTokenService",
            INTERCHAIN_TOKEN_SERVICE,
        ))
    }

    /// Resolves every cross reference against config.
    pub fn expectations(&self, config: &NetworkConfig) -> Result<Vec<Expectation>, ConfigError> {
        self.cross_references
            .iter()
            .map(|reference| reference.expect(config))
            .collect()
    }

    /// Constructor or initializer arguments: the owner followed by the dependency addresses.
    pub fn init_args(&self, owner: Address, expectations: &[Expectation]) -> Vec<DynSolValue> {
        std::iter::once(owner)
            .chain(expectations.iter().map(|expectation| expectation.expected))
            .map(DynSolValue::Address)
            .collect()
    }
}

#[derive(Debug)]
pub struct DeploymentConfig {
    /// Strategy for contracts without an address in config. A method already recorded in config
    /// takes precedence.
    pub method: DeploymentMethod,
    /// Creation code of the ERC-1967 proxy, required by [`DeploymentMethod::Proxy`].
    pub proxy_bytecode: Option<Bytes>,
    /// Factory to use when the network has no `Deployer` record. Never written to config.
    pub factory: Option<Address>,
}

impl DeploymentConfig {
    /// The network's `Deployer`, or the fallback factory.
    pub fn factory(&self, network: &NetworkConfig) -> Result<Address, ConfigError> {
        network
            .require_address(FACTORY)
            .or_else(|err| self.factory.ok_or(err))
    }
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            method: DeploymentMethod::Create2,
            proxy_bytecode: None,
            factory: None,
        }
    }
}

/// A freshly deployed contract, not yet verified.
#[derive(Clone, Debug, PartialEq)]
pub struct Deployment {
    pub address: Address,
    pub deployer: Address,
    pub method: DeploymentMethod,
    pub salt: Option<String>,
    pub implementation: Option<Address>,
    pub receipt: Receipt,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeploymentState {
    Unconfigured,
    PendingConfirmation,
    Attached(Address),
    Deployed(Deployment),
    Verified {
        address: Address,
        deployment: Option<Deployment>,
    },
    Failed {
        address: Address,
        mismatches: Vec<Mismatch>,
    },
    Aborted,
}

impl DeploymentState {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    pub fn address(&self) -> Option<Address> {
        match self {
            Self::Attached(address)
            | Self::Verified { address, .. }
            | Self::Failed { address, .. } => Some(*address),
            Self::Deployed(deployment) => Some(deployment.address),
            Self::Unconfigured | Self::PendingConfirmation | Self::Aborted => None,
        }
    }
}

pub struct DeploymentReconciler<'a, C> {
    spec: &'a ContractSpec,
    artifact: &'a Artifact,
    config: &'a DeploymentConfig,
    chain: &'a C,
}

impl<'a, C: Chain> DeploymentReconciler<'a, C> {
    pub fn new(
        spec: &'a ContractSpec,
        artifact: &'a Artifact,
        config: &'a DeploymentConfig,
        chain: &'a C,
    ) -> Self {
        Self {
            spec,
            artifact,
            config,
            chain,
        }
    }

    /// Attaches to or deploys the contract, then verifies it against config.
    ///
    /// On a verified fresh deployment the contract's record in `network` is updated in memory;
    /// persisting it is left to the caller.
    pub async fn run(
        &self,
        network: &mut NetworkConfig,
        confirm: &mut impl Confirm,
    ) -> Result<DeploymentState, DeploymentError> {
        let name = &self.spec.name;
        let record = network.contract(name).cloned().unwrap_or_default();
        record.validate(name)?;
        let expectations = self.spec.expectations(network)?;
        let method = record.deployment_method.unwrap_or(self.config.method);

        let mut state = DeploymentState::Unconfigured;
        let state = loop {
            state = match state {
                DeploymentState::Unconfigured => match record.address {
                    Some(address) => {
                        greyln!("{name} contract already exists in config, not redeploying...");
                        DeploymentState::Attached(address)
                    }
                    None => {
                        self.check_preconditions(network, method)?;
                        DeploymentState::PendingConfirmation
                    }
                },
                DeploymentState::PendingConfirmation => {
                    let prompt = format!(
                        "Do you want to proceed with deployment of {name} ({method})? (double check everything first!)"
                    );
                    if confirm.confirm(&prompt) {
                        greyln!("Deploying {name} contract...");
                        let deployment = self.deploy(network, method, &expectations).await?;
                        DeploymentState::Deployed(deployment)
                    } else {
                        DeploymentState::Aborted
                    }
                }
                DeploymentState::Attached(address) => {
                    self.verify(address, None, &expectations).await?
                }
                DeploymentState::Deployed(deployment) => {
                    self.verify(deployment.address, Some(deployment), &expectations)
                        .await?
                }
                terminal @ (DeploymentState::Verified { .. }
                | DeploymentState::Failed { .. }
                | DeploymentState::Aborted) => break terminal,
            };
        };

        match &state {
            DeploymentState::Verified {
                deployment: Some(deployment),
                ..
            } => {
                let record = network.contract_mut(name);
                record.address = Some(deployment.address);
                record.deployer = Some(deployment.deployer);
                record.deployment_method = Some(deployment.method);
                record.salt = deployment.salt.clone();
                record.implementation = deployment.implementation;
                mintln!("Deployment status: SUCCESS");
            }
            DeploymentState::Verified { .. } => mintln!("Deployment status: SUCCESS"),
            DeploymentState::Failed { .. } => redln!("Deployment status: FAILED"),
            DeploymentState::Aborted => greyln!("Deployment aborted"),
            _ => {}
        }
        Ok(state)
    }

    fn check_preconditions(
        &self,
        network: &NetworkConfig,
        method: DeploymentMethod,
    ) -> Result<(), DeploymentError> {
        match method {
            DeploymentMethod::Direct => {}
            DeploymentMethod::Create2 => {
                self.config.factory(network)?;
            }
            DeploymentMethod::Proxy => {
                self.config.factory(network)?;
                if self.config.proxy_bytecode.is_none() {
                    return Err(DeploymentError::MissingProxyBytecode);
                }
                proxy::initializer(self.artifact, &self.spec.name, 1 + self.spec.cross_references.len())?;
            }
        }
        Ok(())
    }

    async fn deploy(
        &self,
        network: &NetworkConfig,
        method: DeploymentMethod,
        expectations: &[Expectation],
    ) -> Result<Deployment, DeploymentError> {
        let sender = self.chain.sender();
        let args = self.spec.init_args(sender, expectations);
        info!(@grey, "deployer address: {}", sender.debug_lavender());

        let deployment = match method {
            DeploymentMethod::Direct => {
                let init_code = self.artifact.init_code(&args)?;
                let predicted = predict::predict_create(sender, self.chain.nonce().await?);
                info!(@grey, "predicted address: {}", predicted.debug_lavender());
                let receipt = self.chain.create(init_code).await?;
                let actual = receipt
                    .contract_address
                    .ok_or(ChainError::MissingReceiptAddress {
                        tx_hash: receipt.tx_hash,
                    })?;
                if actual != predicted {
                    return Err(DeploymentError::AddressMismatch {
                        expected: predicted,
                        actual,
                    });
                }
                Deployment {
                    address: actual,
                    deployer: sender,
                    method,
                    salt: None,
                    implementation: None,
                    receipt,
                }
            }
            DeploymentMethod::Create2 => {
                let factory = self.config.factory(network)?;
                let init_code = self.artifact.init_code(&args)?;
                let (address, receipt) = self.factory_deploy(factory, init_code).await?;
                Deployment {
                    address,
                    deployer: sender,
                    method,
                    salt: Some(self.spec.salt_key.clone()),
                    implementation: None,
                    receipt,
                }
            }
            DeploymentMethod::Proxy => {
                let factory = self.config.factory(network)?;
                let proxy_bytecode = self
                    .config
                    .proxy_bytecode
                    .as_ref()
                    .ok_or(DeploymentError::MissingProxyBytecode)?;
                let initializer = proxy::initializer(self.artifact, &self.spec.name, args.len())?;
                let init_data: Bytes = initializer.abi_encode_input(&args)?.into();

                let implementation = proxy::deploy_implementation(self.artifact, self.chain).await?;
                let init_code = proxy_init_code(proxy_bytecode, implementation, init_data);
                let (address, receipt) = self.factory_deploy(factory, init_code).await?;
                proxy::check_implementation(address, implementation, self.chain).await?;
                Deployment {
                    address,
                    deployer: sender,
                    method,
                    salt: Some(self.spec.salt_key.clone()),
                    implementation: Some(implementation),
                    receipt,
                }
            }
        };

        greyln!(
            "\n\"{}\" was successfully deployed:\n - Contract address: {}",
            self.spec.name,
            deployment.address
        );
        Ok(deployment)
    }

    /// Deploys `init_code` through the factory under the spec's salt key.
    ///
    /// The address is predicted before submission and must match both the factory's own lookup
    /// and its `Deployed` event afterwards.
    async fn factory_deploy(
        &self,
        factory: Address,
        init_code: Bytes,
    ) -> Result<(Address, Receipt), DeploymentError> {
        let sender = self.chain.sender();
        let key = &self.spec.salt_key;
        let salt: B256 = predict::salt_from_key(key);
        greyln!("Contract deploy salt: {key}");

        let predicted = predict::create2_address(factory, sender, salt, &init_code);
        info!(@grey, "predicted address: {}", predicted.debug_lavender());
        if !self.chain.code_at(predicted).await?.is_empty() {
            return Err(DeploymentError::SaltCollision {
                address: predicted,
                salt: key.clone(),
            });
        }

        let deployer = ContractHandle::attach(factory, self.chain);
        let receipt = deployer
            .send(IDeployer::deployCall {
                bytecode: init_code.clone(),
                salt,
            })
            .await?;
        debug!(@grey, "deployment tx hash: {}", receipt.tx_hash.debug_lavender());

        let reported = deployer
            .call(IDeployer::deployedAddressCall {
                bytecode: init_code,
                sender,
                salt,
            })
            .await?;
        if reported != predicted {
            return Err(DeploymentError::AddressMismatch {
                expected: predicted,
                actual: reported,
            });
        }
        if let Some(emitted) = deployed_event_address(&receipt, factory) {
            if emitted != predicted {
                return Err(DeploymentError::AddressMismatch {
                    expected: predicted,
                    actual: emitted,
                });
            }
        }
        Ok((predicted, receipt))
    }

    async fn verify(
        &self,
        address: Address,
        deployment: Option<Deployment>,
        expectations: &[Expectation],
    ) -> Result<DeploymentState, DeploymentError> {
        let handle = ContractHandle::attach(address, self.chain);
        greyln!("{} address: {address}", self.spec.name);
        greyln!("Codehash: {}", handle.code_hash().await?);

        let mismatches = verify_cross_references(address, expectations, self.chain).await?;
        Ok(if mismatches.is_empty() {
            DeploymentState::Verified {
                address,
                deployment,
            }
        } else {
            DeploymentState::Failed {
                address,
                mismatches,
            }
        })
    }
}
