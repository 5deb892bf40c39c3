// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Post-deployment cross-reference checks.

use std::fmt;

use alloy::{
    dyn_abi::{FunctionExt, JsonAbiExt},
    json_abi::Function,
    primitives::Address,
};

use super::DeploymentError;
use crate::core::{
    chain::Chain,
    config::{ConfigError, NetworkConfig},
};

/// A view getter on the deployed contract that must return the address of another contract in
/// the config, e.g. `interchainTokenService()` against `InterchainTokenService`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrossReference {
    pub getter: String,
    pub dependency: String,
}

impl CrossReference {
    pub fn new(getter: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self {
            getter: getter.into(),
            dependency: dependency.into(),
        }
    }

    /// Resolves the expected address from config.
    pub fn expect(&self, config: &NetworkConfig) -> Result<Expectation, ConfigError> {
        Ok(Expectation {
            reference: self.clone(),
            expected: config.require_address(&self.dependency)?,
        })
    }

    fn function(&self) -> Result<Function, DeploymentError> {
        let signature = format!("function {}() view returns (address)", self.getter);
        Function::parse(&signature).map_err(|_| DeploymentError::InvalidGetter(self.getter.clone()))
    }
}

impl fmt::Display for CrossReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}() = {}", self.getter, self.dependency)
    }
}

/// A cross reference with the address config expects it to hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expectation {
    pub reference: CrossReference,
    pub expected: Address,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub getter: String,
    pub expected: Address,
    pub actual: Address,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}() returned {} but config expects {}",
            self.getter, self.actual, self.expected
        )
    }
}

/// Reads every expected cross reference from the contract at `address`.
///
/// Returns the mismatches; an empty list means the contract is wired as configured.
pub async fn verify_cross_references(
    address: Address,
    expectations: &[Expectation],
    chain: &impl Chain,
) -> Result<Vec<Mismatch>, DeploymentError> {
    let mut mismatches = Vec::new();
    for expectation in expectations {
        let getter = &expectation.reference.getter;
        let function = expectation.reference.function()?;
        let output = chain
            .call(address, function.abi_encode_input(&[])?.into())
            .await?;
        let actual = function
            .abi_decode_output(&output)?
            .first()
            .and_then(|value| value.as_address())
            .ok_or_else(|| DeploymentError::InvalidGetter(getter.clone()))?;

        greyln!("Existing {getter} address: {actual}");
        if actual != expectation.expected {
            redln!("ERROR: Retrieved {getter} address is different:");
            redln!("   Actual:   {actual}");
            redln!("   Expected: {}", expectation.expected);
            mismatches.push(Mismatch {
                getter: getter.clone(),
                expected: expectation.expected,
                actual,
            });
        }
    }
    Ok(mismatches)
}
