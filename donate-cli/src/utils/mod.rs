// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::fmt::Display;

use eyre::bail;

pub use style::PROMPT;
use style::{BOLD, ERROR};

mod style;

pub fn convert_gwei_to_wei(fee_str: &str) -> eyre::Result<u128> {
    let gwei = match fee_str.parse::<f64>() {
        Ok(fee) if fee >= 0.0 => fee,
        Ok(_) => bail!("Max fee per gas must be non-negative"),
        Err(_) => bail!("Invalid max fee per gas value: {}", fee_str),
    };

    if !gwei.is_finite() {
        bail!("Invalid gwei value: must be finite");
    }

    let wei = gwei * 1e9;
    if wei >= u128::MAX as f64 {
        bail!("Result outside valid range for wei");
    }

    Ok(wei as u128)
}

pub fn decode0x(text: impl AsRef<str>) -> eyre::Result<Vec<u8>> {
    Ok(donate_tools::utils::decode0x(text)?)
}

pub fn print_error(err: impl Display) {
    eprintln!("{ERROR}error{ERROR:#}{BOLD}:{BOLD:#} {err}");
}
