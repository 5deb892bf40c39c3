// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Artifact(#[from] crate::core::artifact::ArtifactError),
    #[error("{0}")]
    Chain(#[from] crate::core::chain::ChainError),
    #[error("{0}")]
    Config(#[from] crate::core::config::ConfigError),
    #[error("{0}")]
    Deployment(#[from] crate::core::deployment::DeploymentError),
    #[error("{0}")]
    Interact(#[from] crate::core::interact::InteractError),
    #[error("{0}")]
    Link(#[from] crate::core::links::LinkError),
    #[error("{0}")]
    Manifest(#[from] crate::core::manifest::ManifestError),
    #[error("{0}")]
    Upgrade(#[from] crate::core::upgrade::UpgradeError),
}
