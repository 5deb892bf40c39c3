// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use alloy::{
    network::EthereumWallet,
    primitives::{Address, FixedBytes},
    providers::{Provider, ProviderBuilder, WalletProvider},
    signers::{
        local::{LocalSigner, PrivateKeySigner},
        Signer,
    },
};
use donate_tools::core::{
    artifact::Artifact,
    chain::RpcChain,
    config::{ConfigStore, NetworkConfig},
    confirm::Confirm,
    manifest::DeployManifest,
};
use eyre::{bail, eyre, Context};

use crate::utils::{convert_gwei_to_wei, decode0x, PROMPT};

#[derive(Debug, clap::Args)]
pub struct AuthArgs {
    /// File path to a text file containing a hex-encoded private key
    #[arg(long)]
    private_key_path: Option<PathBuf>,
    /// Private key as a hex string. Warning: this exposes your key to shell history
    #[arg(long, env = "WALLET_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,
    /// Path to an Ethereum wallet keystore file (e.g. clef)
    #[arg(long)]
    keystore_path: Option<String>,
    /// Keystore password file
    #[arg(long)]
    keystore_password_path: Option<PathBuf>,
    /// Optional max fee per gas in gwei units.
    #[arg(long)]
    max_fee_per_gas_gwei: Option<String>,
}

impl AuthArgs {
    fn build_wallet(&self, chain_id: u64) -> eyre::Result<EthereumWallet> {
        if let Some(key) = &self.private_key {
            if key.is_empty() {
                return Err(eyre!("empty private key"));
            }
            let signer = key_signer(key)?.with_chain_id(Some(chain_id));
            return Ok(EthereumWallet::new(signer));
        }

        if let Some(file) = &self.private_key_path {
            let key = fs::read_to_string(file).wrap_err("could not open private key file")?;
            let signer = key_signer(&key)?.with_chain_id(Some(chain_id));
            return Ok(EthereumWallet::new(signer));
        }

        let keystore = self.keystore_path.as_ref().ok_or(eyre!("no keystore"))?;
        let password = self
            .keystore_password_path
            .as_ref()
            .map(fs::read_to_string)
            .unwrap_or(Ok("".into()))?;

        let signer =
            LocalSigner::decrypt_keystore(keystore, password)?.with_chain_id(Some(chain_id));
        Ok(EthereumWallet::new(signer))
    }

    pub fn get_max_fee_per_gas_wei(&self) -> eyre::Result<Option<u128>> {
        self.max_fee_per_gas_gwei
            .as_ref()
            .map(|fee_str| convert_gwei_to_wei(fee_str))
            .transpose()
    }
}

fn key_signer(key: &str) -> eyre::Result<PrivateKeySigner> {
    let bytes = decode0x(key)?;
    if bytes.len() != 32 {
        bail!("private key must be 32 bytes, got {}", bytes.len());
    }
    let priv_key_bytes: FixedBytes<32> = FixedBytes::from_slice(&bytes);
    Ok(PrivateKeySigner::from_bytes(&priv_key_bytes)?)
}

#[derive(Debug, clap::Args)]
pub struct NetworkArgs {
    /// Network to operate on, as named in Deploy.toml and in the config directory
    #[arg(short, long)]
    pub network: String,
    /// Directory containing Deploy.toml
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Directory of the per-network config files, overriding Deploy.toml
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

impl NetworkArgs {
    pub fn manifest(&self) -> eyre::Result<DeployManifest> {
        Ok(DeployManifest::discover(&self.root)?)
    }

    pub fn store(&self, manifest: &DeployManifest) -> ConfigStore {
        match &self.config_dir {
            Some(dir) => ConfigStore::new(dir),
            None => ConfigStore::new(self.root.join(&manifest.workspace.config_dir)),
        }
    }

    pub fn load_config(&self, manifest: &DeployManifest) -> eyre::Result<(ConfigStore, NetworkConfig)> {
        let store = self.store(manifest);
        let config = store.load(&self.network)?;
        Ok((store, config))
    }

    /// Factory from Deploy.toml, used only when the network config has no `Deployer` record.
    pub fn manifest_factory(&self, manifest: &DeployManifest) -> Option<Address> {
        manifest
            .network(&self.network)
            .ok()
            .and_then(|network| network.factory)
    }

    /// Resolves an artifact path given on the command line or in the manifest.
    pub fn artifact(&self, path: Option<&PathBuf>, fallback: Option<&PathBuf>) -> eyre::Result<Artifact> {
        let path = match path {
            Some(path) => path.clone(),
            None => self.root.join(fallback.ok_or(eyre!(
                "no artifact given, pass --artifact or set [contract] artifact in Deploy.toml"
            ))?),
        };
        Ok(Artifact::load(&path)?)
    }
}

#[derive(Debug, clap::Args)]
pub struct ProviderArgs {
    /// RPC endpoint, overriding the network's endpoint in Deploy.toml
    #[arg(short, long)]
    pub endpoint: Option<String>,
}

impl ProviderArgs {
    pub fn endpoint(&self, manifest: &DeployManifest, network: &str) -> eyre::Result<String> {
        match &self.endpoint {
            Some(endpoint) => Ok(endpoint.clone()),
            None => Ok(manifest.network(network)?.endpoint.clone()),
        }
    }

    pub async fn build_provider(&self, endpoint: &str) -> eyre::Result<impl Provider> {
        let provider = ProviderBuilder::new().connect(endpoint).await?;
        Ok(provider)
    }

    pub async fn build_provider_with_wallet(
        &self,
        endpoint: &str,
        auth: &AuthArgs,
    ) -> eyre::Result<impl Provider + WalletProvider> {
        let provider = self.build_provider(endpoint).await?;
        let chain_id = provider.get_chain_id().await?;
        let wallet = auth.build_wallet(chain_id)?;
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect(endpoint)
            .await?;
        Ok(provider)
    }

    /// Connects the signing wallet to the network's endpoint.
    pub async fn build_chain(
        &self,
        manifest: &DeployManifest,
        network: &str,
        auth: &AuthArgs,
    ) -> eyre::Result<RpcChain<impl Provider + WalletProvider>> {
        let endpoint = self.endpoint(manifest, network)?;
        log::debug!("connecting to {endpoint}");
        let provider = self.build_provider_with_wallet(&endpoint, auth).await?;
        Ok(RpcChain::new(provider, auth.get_max_fee_per_gas_wei()?))
    }
}

#[derive(Debug, clap::Args)]
pub struct ConfirmArgs {
    /// Answer yes to every confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

impl ConfirmArgs {
    pub fn prompt(&self) -> Prompt {
        Prompt {
            assume_yes: self.yes,
        }
    }
}

/// Asks on the terminal unless `--yes` was passed.
#[derive(Debug)]
pub struct Prompt {
    assume_yes: bool,
}

impl Confirm for Prompt {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{prompt} {PROMPT}(y/n){PROMPT:#} ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        println!();
        answer.trim() == "y"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_private_key() {
        let err = key_signer("0xdeadbeef").unwrap_err();
        assert!(err.to_string().contains("must be 32 bytes, got 4"));
        assert!(key_signer("zz").is_err());
    }

    #[test]
    fn accepts_hex_private_key() {
        let key = format!("0x{}\n", "11".repeat(32));
        assert!(key_signer(&key).is_ok());
    }
}
