// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

/// Config name of the contract this tool manages.
pub const DONATE: &str = "Donate";

/// Exit code of runs whose on-chain state does not match the config.
pub const VERIFICATION_FAILED: u8 = 2;
