// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Operator confirmation before spending funds.

/// Asks the operator before any transaction is submitted.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Accepts every prompt, for non-interactive runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, prompt: &str) -> bool {
        debug!(@grey, "{prompt} (assumed yes)");
        true
    }
}

/// Declines every prompt.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&mut self, prompt: &str) -> bool {
        debug!(@grey, "{prompt} (assumed no)");
        false
    }
}
