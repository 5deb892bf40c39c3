// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Cross-chain token transfers through a deployed Donate contract.

use std::str::FromStr;

use alloy::{
    primitives::{
        utils::{parse_units, ParseUnits},
        Bytes, B256, U256,
    },
    sol_types::SolValue,
};

use crate::{
    core::{
        chain::{Chain, ChainError, Receipt},
        config::{ConfigError, NetworkConfig},
        contracts::{ContractHandle, IDonate, IERC20},
    },
    utils::{color::DebugColor, decode0x},
};

/// Name of the contract tokens are sent through.
pub const DONATE: &str = "Donate";

#[derive(Debug, thiserror::Error)]
pub enum InteractError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("transaction failed: {0}")]
    TransactionFailure(#[from] ChainError),
    #[error("invalid destination address: {0}")]
    InvalidDestination(#[from] hex::FromHexError),
    #[error("invalid MultiversX address: {0}")]
    InvalidBech32(#[from] bech32::DecodeError),
    #[error("MultiversX address {address} decodes to {len} bytes, expected 32")]
    InvalidPublicKey { address: String, len: usize },

    #[error("invalid value {0}, expected TOKEN:AMOUNT")]
    InvalidValue(String),
    #[error("invalid amount {amount} for a token with {decimals} decimals")]
    InvalidAmount { amount: String, decimals: u8 },
}

/// A `TOKEN:AMOUNT` pair such as `USDC:10.5`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenAmount {
    pub symbol: String,
    pub amount: String,
}

impl FromStr for TokenAmount {
    type Err = InteractError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once(':') {
            Some((symbol, amount)) if !symbol.is_empty() && !amount.is_empty() => Ok(Self {
                symbol: symbol.to_owned(),
                amount: amount.to_owned(),
            }),
            _ => Err(InteractError::InvalidValue(value.to_owned())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SendToken {
    pub value: TokenAmount,
    pub destination_chain: String,
    pub destination_address: String,
}

#[derive(Debug)]
pub struct SendTokenReceipts {
    pub approve: Receipt,
    pub send: Receipt,
    /// Payload the bridge delivers on the destination chain.
    pub payload: Bytes,
}

/// Human-readable prefix of MultiversX addresses.
const MULTIVERSX_HRP: &str = "erd";

/// Bytes passed as `destinationAddress`.
///
/// `0x` addresses are hex-decoded and `erd1...` addresses are bech32-decoded into the 32-byte
/// public key the receiving contract reads. Anything else is sent as its UTF-8 bytes.
pub fn destination_bytes(address: &str) -> Result<Bytes, InteractError> {
    if address.starts_with("0x") {
        return Ok(decode0x(address)?.into());
    }
    if address.starts_with(MULTIVERSX_HRP) {
        let (_, data) = bech32::decode(address)?;
        if data.len() != 32 {
            return Err(InteractError::InvalidPublicKey {
                address: address.to_owned(),
                len: data.len(),
            });
        }
        return Ok(data.into());
    }
    Ok(Bytes::copy_from_slice(address.as_bytes()))
}

/// `abi.encodePacked(bytes32 tokenId, uint256 amount, bytes destination)`.
pub fn payload(token_id: B256, amount: U256, destination: &Bytes) -> Bytes {
    (token_id, amount, destination.clone()).abi_encode_packed().into()
}

/// Scales a decimal amount such as `"1.5"` by `10^decimals`.
///
/// Amounts with more fractional digits than the token supports are rejected rather than
/// truncated.
pub fn token_amount(amount: &str, decimals: u8) -> Result<U256, InteractError> {
    let invalid = || InteractError::InvalidAmount {
        amount: amount.to_owned(),
        decimals,
    };
    let fraction = amount.split_once('.').map_or("", |(_, fraction)| fraction);
    if amount.is_empty() || amount == "." || fraction.len() > decimals as usize {
        return Err(invalid());
    }
    match parse_units(amount, decimals).map_err(|_| invalid())? {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => Err(invalid()),
    }
}

/// Approves the Donate contract for `amount` and sends it to the destination chain.
pub async fn send_token(
    network: &NetworkConfig,
    request: &SendToken,
    chain: &impl Chain,
) -> Result<SendTokenReceipts, InteractError> {
    let TokenAmount { symbol, amount } = &request.value;
    let token = network.token(symbol)?;
    let donate = network.require_address(DONATE)?;
    let destination = destination_bytes(&request.destination_address)?;
    let amount = token_amount(amount, token.decimals)?;

    let approve = ContractHandle::attach(token.address, chain)
        .send(IERC20::approveCall {
            spender: donate,
            amount,
        })
        .await?;
    greyln!("Sent allowance transaction {}", approve.tx_hash.debug_lavender());

    let send = ContractHandle::attach(donate, chain)
        .send(IDonate::sendTokenCall {
            destinationChain: request.destination_chain.clone(),
            tokenId: token.token_id,
            destinationAddress: destination.clone(),
            amount,
        })
        .await?;
    greyln!("Sent cross chain transaction {}", send.tx_hash.debug_lavender());

    let payload = payload(token.token_id, amount, &destination);
    greyln!("Cross chain payload {payload}");
    Ok(SendTokenReceipts {
        approve,
        send,
        payload,
    })
}
