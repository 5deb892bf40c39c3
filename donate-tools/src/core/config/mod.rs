// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Per-network address book.
//!
//! A [`NetworkConfig`] is loaded once per run, threaded by `&mut` through the reconcilers, and
//! written back by the caller with [`ConfigStore::save`] only after the run succeeded. Fields this
//! tool does not know about are carried through untouched.

use std::fmt;

use alloy::primitives::{Address, B256};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use store::ConfigStore;

mod checksum;
mod store;

/// Name of the factory record used for deterministic deployments.
pub const FACTORY: &str = "Deployer";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to load config for network {network}: {source}")]
    Load {
        network: String,
        source: Box<ConfigError>,
    },
    #[error("{0} contract not deployed yet")]
    MissingDependency(String),
    #[error("token {0} has no entry in tokens")]
    MissingToken(String),
    #[error("invalid record {name}: {reason}")]
    InvalidRecord { name: String, reason: &'static str },
}

/// Root record of one network's configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub contracts: IndexMap<String, ContractRecord>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tokens: IndexMap<String, TokenRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NetworkConfig {
    pub fn contract(&self, name: &str) -> Option<&ContractRecord> {
        self.contracts.get(name)
    }

    /// Returns the record for `name`, inserting an empty one if needed.
    pub fn contract_mut(&mut self, name: &str) -> &mut ContractRecord {
        self.contracts.entry(name.to_owned()).or_default()
    }

    /// Address of a contract that must already be deployed.
    pub fn require_address(&self, name: &str) -> Result<Address, ConfigError> {
        self.contract(name)
            .and_then(|record| record.address)
            .ok_or_else(|| ConfigError::MissingDependency(name.to_owned()))
    }

    pub fn token(&self, symbol: &str) -> Result<&TokenRecord, ConfigError> {
        self.tokens
            .get(symbol)
            .ok_or_else(|| ConfigError::MissingToken(symbol.to_owned()))
    }
}

/// How a contract got to its recorded address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMethod {
    /// Plain `CREATE` transaction from the deployer wallet.
    Direct,
    /// Deterministic deployment through the factory.
    Create2,
    /// ERC-1967 proxy deployed through the factory in front of a separately deployed logic
    /// contract.
    Proxy,
}

impl fmt::Display for DeploymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Direct => "direct",
            Self::Create2 => "create2",
            Self::Proxy => "proxy",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "checksum::option"
    )]
    pub address: Option<Address>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "checksum::option"
    )]
    pub deployer: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_method: Option<DeploymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "checksum::option"
    )]
    pub implementation: Option<Address>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub known_chains: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub known_tokens: IndexMap<String, B256>,
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        serialize_with = "checksum::map"
    )]
    pub known_charities: IndexMap<String, Address>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub known_charities_interchain: IndexMap<String, InterchainCharity>,
    #[serde(
        default,
        skip_serializing_if = "IndexSet::is_empty",
        serialize_with = "checksum::set"
    )]
    pub analytic_tokens: IndexSet<Address>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContractRecord {
    /// Checks the invariants of a record managed by this tool.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidRecord {
            name: name.to_owned(),
            reason,
        };
        if self.address.is_some() {
            if self.deployer.is_none() {
                return Err(invalid("address is set but deployer is missing"));
            }
            if self.deployment_method.is_none() {
                return Err(invalid("address is set but deploymentMethod is missing"));
            }
        }
        if self.deployment_method == Some(DeploymentMethod::Create2)
            && self.salt.as_deref().map_or(true, str::is_empty)
        {
            return Err(invalid("create2 deployment requires a non-empty salt"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterchainCharity {
    pub destination_chain: String,
    pub charity_address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    #[serde(serialize_with = "checksum::serialize")]
    pub address: Address,
    pub token_id: B256,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    18
}
