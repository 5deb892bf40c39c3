// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! The `Deploy.toml` manifest: where network configs live and how to reach each network.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::Address;
use serde::{de::DeserializeOwned, Deserialize};

/// Filename of the deployment manifest.
pub const FILENAME: &str = "Deploy.toml";

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml read error: {0}")]
    TomlRead(#[from] toml::de::Error),

    #[error("missing Deploy.toml")]
    Missing,
    #[error("network {0} is not defined in Deploy.toml")]
    UnknownNetwork(String),
}

pub fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ManifestError> {
    if !path.as_ref().exists() {
        return Err(ManifestError::Missing);
    }

    let contents = fs::read_to_string(path)?;
    let manifest = toml::from_str(&contents)?;
    Ok(manifest)
}

#[derive(Debug, Default, Deserialize)]
pub struct DeployManifest {
    #[serde(default)]
    pub workspace: TomlWorkspace,
    #[serde(default)]
    pub contract: TomlContract,
}

impl DeployManifest {
    /// Loads `Deploy.toml` from `dir`, or the defaults when there is none.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, ManifestError> {
        match load(dir.as_ref().join(FILENAME)) {
            Err(ManifestError::Missing) => Ok(Self::default()),
            result => result,
        }
    }

    pub fn network(&self, name: &str) -> Result<&TomlNetwork, ManifestError> {
        self.workspace
            .networks
            .get(name)
            .ok_or_else(|| ManifestError::UnknownNetwork(name.to_owned()))
    }
}

#[derive(Debug, Deserialize)]
pub struct TomlWorkspace {
    /// Directory holding one `<network>.json` address book per network.
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
    #[serde(default)]
    pub networks: HashMap<String, TomlNetwork>,
}

impl Default for TomlWorkspace {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            networks: HashMap::new(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("config")
}

#[derive(Debug, Deserialize)]
pub struct TomlNetwork {
    pub endpoint: String,
    /// Factory used when the address book has no `Deployer` record.
    #[serde(default)]
    pub factory: Option<Address>,
}

/// Default artifact paths for the managed contract.
#[derive(Debug, Default, Deserialize)]
pub struct TomlContract {
    pub artifact: Option<PathBuf>,
    pub proxy_artifact: Option<PathBuf>,
}
