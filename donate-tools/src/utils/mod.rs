// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! General purpose utilities.

pub mod color;

#[cfg(test)]
pub(crate) mod testing;

/// Pretty-prints a gas amount.
pub fn format_gas(gas: u64) -> String {
    use color::Color;

    let text = format!("{gas} gas");
    if gas <= 3_000_000 {
        text.mint()
    } else if gas <= 7_000_000 {
        text.yellow()
    } else {
        text.pink()
    }
}

pub fn decode0x(text: impl AsRef<str>) -> Result<Vec<u8>, hex::FromHexError> {
    let text = text.as_ref().trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(text)
}
