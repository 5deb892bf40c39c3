// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Serializers writing addresses in their EIP-55 checksummed form.

use alloy::primitives::Address;
use indexmap::{IndexMap, IndexSet};
use serde::Serializer;

pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&address.to_checksum(None))
}

pub fn option<S: Serializer>(address: &Option<Address>, serializer: S) -> Result<S::Ok, S::Error> {
    match address {
        Some(address) => serializer.serialize_some(&address.to_checksum(None)),
        None => serializer.serialize_none(),
    }
}

pub fn map<S: Serializer>(
    addresses: &IndexMap<String, Address>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(
        addresses
            .iter()
            .map(|(key, address)| (key, address.to_checksum(None))),
    )
}

pub fn set<S: Serializer>(addresses: &IndexSet<Address>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(addresses.iter().map(|address| address.to_checksum(None)))
}
