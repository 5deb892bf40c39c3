// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::fmt;
use std::process::ExitCode;

use crate::constants::VERIFICATION_FAILED;

pub type DonateDeployResult = Result<(), DonateDeployError>;

#[derive(Debug)]
pub struct DonateDeployError {
    error: eyre::Error,
    exit_code: ExitCode,
}

impl DonateDeployError {
    /// The run completed but left the chain out of line with config.
    pub fn verification_failed(message: impl fmt::Display) -> Self {
        Self {
            error: eyre::eyre!("{message}"),
            exit_code: ExitCode::from(VERIFICATION_FAILED),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }
}

impl fmt::Display for DonateDeployError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl From<std::io::Error> for DonateDeployError {
    fn from(err: std::io::Error) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<eyre::Error> for DonateDeployError {
    fn from(error: eyre::Error) -> Self {
        Self {
            error,
            exit_code: ExitCode::FAILURE,
        }
    }
}

macro_rules! impl_from_tools_error {
    ($($ty:path),* $(,)?) => {
        $(
            impl From<$ty> for DonateDeployError {
                fn from(err: $ty) -> Self {
                    Self {
                        error: err.into(),
                        exit_code: ExitCode::FAILURE,
                    }
                }
            }
        )*
    };
}

impl_from_tools_error!(
    donate_tools::Error,
    donate_tools::core::artifact::ArtifactError,
    donate_tools::core::chain::ChainError,
    donate_tools::core::config::ConfigError,
    donate_tools::core::deployment::DeploymentError,
    donate_tools::core::interact::InteractError,
    donate_tools::core::links::LinkError,
    donate_tools::core::manifest::ManifestError,
    donate_tools::core::upgrade::UpgradeError,
);
