// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

pub mod artifact;
pub mod chain;
pub mod config;
pub mod confirm;
pub mod contracts;
pub mod deployment;
pub mod interact;
pub mod links;
pub mod manifest;
pub mod predict;
pub mod upgrade;
