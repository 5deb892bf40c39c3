// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Replays the registrations recorded in config onto a deployed Donate contract.
//!
//! Each entry is checked against live state first, so replaying a category twice submits nothing
//! the second time.

use std::fmt;

use alloy::primitives::{Address, B256};

use crate::{
    core::{
        chain::{Chain, ChainError, Receipt},
        config::{ConfigError, ContractRecord, NetworkConfig},
        contracts::{charity_id, ContractHandle, IDonate},
    },
    utils::color::DebugColor,
};

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error(
        "failed to add {entry} after {} confirmed transaction(s): {source}",
        .applied.len()
    )]
    Entry {
        entry: Link,
        applied: Vec<Receipt>,
        source: ChainError,
    },
}

/// One family of registrations, replayed in this order by [`replay_all`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    KnownChains,
    KnownTokens,
    KnownCharities,
    KnownCharitiesInterchain,
    AnalyticsTokens,
}

impl LinkKind {
    pub const ALL: [LinkKind; 5] = [
        Self::KnownChains,
        Self::KnownTokens,
        Self::KnownCharities,
        Self::KnownCharitiesInterchain,
        Self::AnalyticsTokens,
    ];

    /// Entries of this kind recorded for a contract, in config order.
    pub fn entries(
        self,
        record: &ContractRecord,
        network: &NetworkConfig,
    ) -> Result<Vec<Link>, ConfigError> {
        let links: Vec<Link> = match self {
            Self::KnownChains => record
                .known_chains
                .iter()
                .map(|(name, address)| Link::KnownChain {
                    name: name.clone(),
                    address: address.clone(),
                })
                .collect(),
            Self::KnownTokens => record
                .known_tokens
                .iter()
                .map(|(symbol, token_id)| {
                    Ok(Link::KnownToken {
                        symbol: symbol.clone(),
                        token_id: *token_id,
                        address: network.token(symbol)?.address,
                    })
                })
                .collect::<Result<_, ConfigError>>()?,
            Self::KnownCharities => record
                .known_charities
                .iter()
                .map(|(name, address)| Link::KnownCharity {
                    name: name.clone(),
                    address: *address,
                })
                .collect(),
            Self::KnownCharitiesInterchain => record
                .known_charities_interchain
                .iter()
                .map(|(name, charity)| Link::KnownCharityInterchain {
                    name: name.clone(),
                    destination_chain: charity.destination_chain.clone(),
                    charity_address: charity.charity_address.clone(),
                })
                .collect(),
            Self::AnalyticsTokens => record
                .analytic_tokens
                .iter()
                .map(|address| Link::AnalyticsToken { address: *address })
                .collect(),
        };
        Ok(links)
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::KnownChains => "known chains",
            Self::KnownTokens => "known tokens",
            Self::KnownCharities => "known charities",
            Self::KnownCharitiesInterchain => "known interchain charities",
            Self::AnalyticsTokens => "analytic tokens",
        };
        f.write_str(name)
    }
}

/// A single registration on the Donate contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Link {
    KnownChain {
        name: String,
        address: String,
    },
    KnownToken {
        symbol: String,
        token_id: B256,
        address: Address,
    },
    KnownCharity {
        name: String,
        address: Address,
    },
    KnownCharityInterchain {
        name: String,
        destination_chain: String,
        charity_address: String,
    },
    AnalyticsToken {
        address: Address,
    },
}

impl Link {
    pub fn kind(&self) -> LinkKind {
        match self {
            Self::KnownChain { .. } => LinkKind::KnownChains,
            Self::KnownToken { .. } => LinkKind::KnownTokens,
            Self::KnownCharity { .. } => LinkKind::KnownCharities,
            Self::KnownCharityInterchain { .. } => LinkKind::KnownCharitiesInterchain,
            Self::AnalyticsToken { .. } => LinkKind::AnalyticsTokens,
        }
    }

    /// Whether the contract already holds this entry.
    pub async fn is_applied<C: Chain>(
        &self,
        donate: &ContractHandle<'_, C>,
    ) -> Result<bool, ChainError> {
        let applied = match self {
            Self::KnownChain { name, address } => {
                let current = donate
                    .call(IDonate::knownChainsAddressesCall {
                        chainName: name.clone(),
                    })
                    .await?;
                current == *address
            }
            Self::KnownToken {
                token_id, address, ..
            } => {
                let current = donate
                    .call(IDonate::knownTokensCall { tokenId: *token_id })
                    .await?;
                current == *address
            }
            Self::KnownCharity { name, address } => {
                let current = donate
                    .call(IDonate::knownCharitiesCall {
                        charityId: charity_id(name),
                    })
                    .await?;
                current == *address
            }
            Self::KnownCharityInterchain {
                name,
                destination_chain,
                charity_address,
            } => {
                let current = donate
                    .call(IDonate::knownCharitiesInterchainCall {
                        charityId: charity_id(name),
                    })
                    .await?;
                current.destinationChain == *destination_chain
                    && current.charityAddress == *charity_address
            }
            Self::AnalyticsToken { address } => {
                donate
                    .call(IDonate::analyticsTokensCall { token: *address })
                    .await?
            }
        };
        Ok(applied)
    }

    /// Submits the registration and waits for it to be included.
    pub async fn apply<C: Chain>(&self, donate: &ContractHandle<'_, C>) -> Result<Receipt, ChainError> {
        match self.clone() {
            Self::KnownChain { name, address } => {
                donate
                    .send(IDonate::addKnownChainCall {
                        chainName: name,
                        chainAddress: address,
                    })
                    .await
            }
            Self::KnownToken {
                token_id, address, ..
            } => {
                donate
                    .send(IDonate::addKnownTokenCall {
                        tokenId: token_id,
                        tokenAddress: address,
                    })
                    .await
            }
            Self::KnownCharity { name, address } => {
                donate
                    .send(IDonate::addKnownCharityCall {
                        charityName: name,
                        charityAddress: address,
                    })
                    .await
            }
            Self::KnownCharityInterchain {
                name,
                destination_chain,
                charity_address,
            } => {
                donate
                    .send(IDonate::addKnownCharityInterchainCall {
                        charityName: name,
                        destinationChain: destination_chain,
                        charityAddress: charity_address,
                    })
                    .await
            }
            Self::AnalyticsToken { address } => {
                donate
                    .send(IDonate::addAnalyticsTokenCall { token: address })
                    .await
            }
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KnownChain { name, address } => write!(f, "known chain {name}: {address}"),
            Self::KnownToken {
                symbol, address, ..
            } => write!(f, "known token {symbol}: {address}"),
            Self::KnownCharity { name, address } => write!(f, "known charity {name}: {address}"),
            Self::KnownCharityInterchain {
                name,
                destination_chain,
                charity_address,
            } => write!(
                f,
                "known interchain charity {name}: {destination_chain}: {charity_address}"
            ),
            Self::AnalyticsToken { address } => write!(f, "analytic token {address}"),
        }
    }
}

/// Submits every entry the contract does not hold yet, one transaction at a time.
///
/// Stops at the first failing entry; the error carries the receipts confirmed before it. A live
/// state read that fails is logged and the entry is submitted anyway.
pub async fn replay<C: Chain>(
    donate: &ContractHandle<'_, C>,
    entries: &[Link],
) -> Result<Vec<Receipt>, LinkError> {
    let mut applied = Vec::new();
    for entry in entries {
        match entry.is_applied(donate).await {
            Ok(true) => {
                greyln!("Skipping {entry}, already set");
                continue;
            }
            Ok(false) => {}
            Err(err) => {
                warn!(@yellow, "could not read {entry} from contract, submitting anyway: {err}");
            }
        }

        greyln!("Adding {entry}");
        match entry.apply(donate).await {
            Ok(receipt) => {
                greyln!("Sent transaction {}", receipt.tx_hash.debug_lavender());
                applied.push(receipt);
            }
            Err(source) => {
                return Err(LinkError::Entry {
                    entry: entry.clone(),
                    applied,
                    source,
                })
            }
        }
    }
    Ok(applied)
}

/// Outcome of replaying one [`LinkKind`].
#[derive(Debug)]
pub struct CategoryReport {
    pub kind: LinkKind,
    pub result: Result<Vec<Receipt>, LinkError>,
}

#[derive(Debug, Default)]
pub struct LinkReport {
    pub categories: Vec<CategoryReport>,
}

impl LinkReport {
    pub fn is_success(&self) -> bool {
        self.categories.iter().all(|category| category.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CategoryReport> {
        self.categories
            .iter()
            .filter(|category| category.result.is_err())
    }
}

/// Replays every category recorded for `name`.
///
/// All entries are resolved against config before the first transaction. A failing category does
/// not stop the ones after it.
pub async fn replay_all(
    name: &str,
    network: &NetworkConfig,
    chain: &impl Chain,
    kinds: &[LinkKind],
) -> Result<LinkReport, LinkError> {
    let address = network.require_address(name)?;
    let record = network
        .contract(name)
        .ok_or_else(|| ConfigError::MissingDependency(name.to_owned()))?;
    let plan = kinds
        .iter()
        .map(|kind| Ok((*kind, kind.entries(record, network)?)))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let donate = ContractHandle::attach(address, chain);
    let mut report = LinkReport::default();
    for (kind, entries) in plan {
        if entries.is_empty() {
            debug!(@grey, "no {kind} configured");
            continue;
        }
        greyln!("Replaying {} {kind}...", entries.len());
        let result = replay(&donate, &entries).await;
        match &result {
            Ok(receipts) => mintln!("{kind}: {} transaction(s) sent", receipts.len()),
            Err(err) => redln!("{kind}: {err}"),
        }
        report.categories.push(CategoryReport { kind, result });
    }
    Ok(report)
}
