// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use super::{ConfigError, NetworkConfig};

/// Directory of `<network>.json` address books.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, network: &str) -> PathBuf {
        self.dir.join(format!("{network}.json"))
    }

    pub fn load(&self, network: &str) -> Result<NetworkConfig, ConfigError> {
        let path = self.path(network);
        debug!(@grey, "loading config from {}", path.display());
        let load = || -> Result<NetworkConfig, ConfigError> {
            let contents = fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        };
        load().map_err(|err| ConfigError::Load {
            network: network.to_owned(),
            source: Box::new(err),
        })
    }

    /// Replaces the network's file with `config` in a single rename.
    ///
    /// The document is written to a temporary file in the same directory first, so readers see
    /// either the old or the new file, never a truncated one.
    pub fn save(&self, config: &NetworkConfig, network: &str) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.dir)?;
        let mut contents = serde_json::to_string_pretty(config)?;
        contents.push('\n');

        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(contents.as_bytes())?;
        file.as_file().sync_all()?;
        let path = self.path(network);
        file.persist(&path).map_err(|err| err.error)?;
        debug!(@grey, "saved config to {}", path.display());
        Ok(())
    }
}
