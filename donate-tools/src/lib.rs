// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Tools for deploying and maintaining the Donate bridge contracts.
//!
//! The [`core`] module holds the deployment orchestrator: address prediction, the per-network
//! address book, the deploy-or-attach and upgrade reconcilers, and the link replayer.

#[macro_use]
mod macros;

pub mod core;
pub(crate) mod error;
pub mod utils;

pub use error::{Error, Result};
