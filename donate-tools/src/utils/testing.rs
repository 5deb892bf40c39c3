// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! In-memory [`Chain`] emulating the factory, the Donate contract and ERC-1967 proxies.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
};

use alloy::{
    primitives::{address, keccak256, Address, Bytes, Log, LogData, B256, U256},
    sol_types::{SolCall, SolEvent, SolValue},
};
use serde_json::json;

use crate::core::{
    artifact::Artifact,
    chain::{Chain, ChainError, Receipt},
    config::{ContractRecord, DeploymentMethod, NetworkConfig, FACTORY},
    contracts::{
        charity_id, IDeployer, IDonate, IERC20, IProxyAdmin, IUUPSUpgradeable, ADMIN_SLOT,
        IMPLEMENTATION_SLOT,
    },
    deployment::INTERCHAIN_TOKEN_SERVICE,
    predict,
};

pub const SENDER: Address = address!("0x5E0DE0000000000000000000000000000000000A");
pub const FACTORY_ADDRESS: Address = address!("0xFAC7000000000000000000000000000000000001");
pub const ITS_ADDRESS: Address = address!("0xB5FB4BE02232B1bBA4dC8f81dc24C26980dE9e3C");

/// A transaction submitted to the mock, in order.
#[derive(Clone, Debug, PartialEq)]
pub struct SentTx {
    pub to: Option<Address>,
    pub input: Bytes,
    pub value: U256,
}

impl SentTx {
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.input.get(..4).map(|bytes| [bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Storage of an emulated Donate contract or Donate proxy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DonateState {
    pub owner: Address,
    pub interchain_token_service: Address,
    pub known_chains: HashMap<String, String>,
    pub known_tokens: HashMap<B256, Address>,
    pub known_charities: HashMap<B256, Address>,
    pub known_charities_interchain: HashMap<B256, (String, String)>,
    pub analytics_tokens: HashSet<Address>,
    /// `(destinationChain, tokenId, destinationAddress, amount)` of every `sendToken`.
    pub sent_tokens: Vec<(String, B256, Bytes, U256)>,
}

#[derive(Debug, Default)]
struct State {
    nonce: u64,
    code: HashMap<Address, Bytes>,
    storage: HashMap<(Address, B256), B256>,
    factories: HashSet<Address>,
    proxy_admins: HashSet<Address>,
    proxy_bytecode: Option<Bytes>,
    artifacts: Vec<(Bytes, Bytes)>,
    donates: HashMap<Address, DonateState>,
    sent: Vec<SentTx>,
    factory_skew: bool,
    reported_token_service: Option<Address>,
    ignore_upgrades: bool,
    fail_send_at: Option<usize>,
    failing_calls: HashSet<[u8; 4]>,
}

/// A single-sender chain held entirely in memory.
#[derive(Debug)]
pub struct MockChain {
    sender: Address,
    state: RefCell<State>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new(SENDER)
    }
}

impl MockChain {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            state: RefCell::default(),
        }
    }

    /// A chain with the factory and the interchain token service already deployed.
    pub fn with_infrastructure() -> Self {
        let chain = Self::default();
        chain.add_factory(FACTORY_ADDRESS);
        chain.set_code(ITS_ADDRESS, Bytes::from_static(&[0x17, 0x50]));
        chain
    }

    pub fn add_factory(&self, address: Address) {
        let mut state = self.state.borrow_mut();
        state.factories.insert(address);
        state.code.insert(address, Bytes::from_static(&[0xfa, 0xc7]));
    }

    pub fn set_code(&self, address: Address, code: Bytes) {
        self.state.borrow_mut().code.insert(address, code);
    }

    /// Lets contracts created from `artifact` be recognized by their creation code.
    pub fn register_artifact(&self, artifact: &Artifact) {
        self.state
            .borrow_mut()
            .artifacts
            .push((artifact.bytecode.clone(), artifact.deployed_bytecode.clone()));
    }

    pub fn register_proxy_bytecode(&self, bytecode: Bytes) {
        self.state.borrow_mut().proxy_bytecode = Some(bytecode);
    }

    /// Installs an already deployed Donate contract.
    pub fn add_donate(&self, address: Address, interchain_token_service: Address) {
        let mut state = self.state.borrow_mut();
        state.code.insert(address, Bytes::from_static(&[0xd0, 0x4a]));
        state.donates.insert(
            address,
            DonateState {
                owner: self.sender,
                interchain_token_service,
                ..Default::default()
            },
        );
    }

    /// Installs a proxy in front of `implementation`, optionally managed by a proxy admin.
    pub fn add_proxy(&self, proxy: Address, implementation: Address, admin: Option<Address>) {
        let mut state = self.state.borrow_mut();
        state.code.insert(proxy, Bytes::from_static(&[0x19, 0x67]));
        state
            .storage
            .insert((proxy, IMPLEMENTATION_SLOT), implementation.into_word());
        state.donates.entry(proxy).or_insert_with(|| DonateState {
            owner: self.sender,
            interchain_token_service: ITS_ADDRESS,
            ..Default::default()
        });
        if let Some(admin) = admin {
            state.storage.insert((proxy, ADMIN_SLOT), admin.into_word());
            state.proxy_admins.insert(admin);
            state.code.insert(admin, Bytes::from_static(&[0xad, 0x01]));
        }
    }

    /// Makes the factory's `deployedAddress` disagree with the real CREATE2 address.
    pub fn skew_factory(&self) {
        self.state.borrow_mut().factory_skew = true;
    }

    /// Makes every Donate report `service` from `interchainTokenService()`, whatever it was
    /// constructed with.
    pub fn misreport_token_service(&self, service: Address) {
        self.state.borrow_mut().reported_token_service = Some(service);
    }

    /// Makes upgrade calls succeed without touching the implementation slot.
    pub fn ignore_upgrades(&self) {
        self.state.borrow_mut().ignore_upgrades = true;
    }

    /// Reverts the `index`-th transaction sent from now on, counting from zero.
    pub fn fail_send_at(&self, index: usize) {
        let mut state = self.state.borrow_mut();
        state.fail_send_at = Some(state.sent.len() + index);
    }

    /// Reverts every read-only call with this selector.
    pub fn fail_calls(&self, selector: impl Into<[u8; 4]>) {
        self.state.borrow_mut().failing_calls.insert(selector.into());
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.state.borrow().sent.clone()
    }

    pub fn sent_count(&self) -> usize {
        self.state.borrow().sent.len()
    }

    pub fn donate(&self, address: Address) -> Option<DonateState> {
        self.state.borrow().donates.get(&address).cloned()
    }

    pub fn implementation(&self, proxy: Address) -> Address {
        let state = self.state.borrow();
        let word = state
            .storage
            .get(&(proxy, IMPLEMENTATION_SLOT))
            .copied()
            .unwrap_or_default();
        Address::from_word(word)
    }

    fn next_receipt(state: &mut State) -> Receipt {
        state.nonce += 1;
        Receipt {
            tx_hash: keccak256(state.nonce.to_be_bytes()),
            block_number: Some(state.nonce),
            gas_used: 21_000,
            contract_address: None,
            logs: Vec::new(),
        }
    }

    fn instantiate(&self, state: &mut State, address: Address, init_code: &[u8]) {
        if let Some(proxy) = state.proxy_bytecode.clone() {
            if let Some(args) = init_code.strip_prefix(&proxy[..]) {
                let (implementation, data) =
                    <(Address, Bytes)>::abi_decode_params(args).expect("proxy constructor");
                state.code.insert(address, proxy);
                state
                    .storage
                    .insert((address, IMPLEMENTATION_SLOT), implementation.into_word());
                state.donates.entry(address).or_default();
                if !data.is_empty() {
                    self.apply(state, address, &data);
                }
                return;
            }
        }

        let artifact = state
            .artifacts
            .iter()
            .find(|(bytecode, _)| init_code.starts_with(bytecode))
            .cloned();
        match artifact {
            Some((bytecode, runtime)) => {
                state.code.insert(address, runtime);
                let args = &init_code[bytecode.len()..];
                let donate = state.donates.entry(address).or_default();
                if args.len() == 64 {
                    donate.owner = Address::from_slice(&args[12..32]);
                    donate.interchain_token_service = Address::from_slice(&args[44..64]);
                }
            }
            None => {
                state.code.insert(address, Bytes::copy_from_slice(init_code));
            }
        }
    }

    /// Executes a state-changing call against the emulated contract at `to`.
    fn apply(&self, state: &mut State, to: Address, input: &[u8]) -> Vec<Log> {
        if state.factories.contains(&to) {
            if let Ok(call) = IDeployer::deployCall::abi_decode(input) {
                let deployed = predict::create2_address(to, self.sender, call.salt, &call.bytecode);
                self.instantiate(state, deployed, &call.bytecode);
                let event = LogData::new_unchecked(
                    vec![
                        IDeployer::Deployed::SIGNATURE_HASH,
                        deployed.into_word(),
                        self.sender.into_word(),
                        call.salt,
                    ],
                    keccak256(&call.bytecode).0.to_vec().into(),
                );
                return vec![Log {
                    address: to,
                    data: event,
                }];
            }
            return Vec::new();
        }

        if state.proxy_admins.contains(&to) {
            if let Ok(call) = IProxyAdmin::upgradeAndCallCall::abi_decode(input) {
                self.upgrade(state, call.proxy, call.implementation, &call.data);
            }
            return Vec::new();
        }

        if let Ok(call) = IUUPSUpgradeable::upgradeToAndCallCall::abi_decode(input) {
            self.upgrade(state, to, call.newImplementation, &call.data);
            return Vec::new();
        }

        let Some(donate) = state.donates.get_mut(&to) else {
            return Vec::new();
        };
        match input.get(..4).map(|s| [s[0], s[1], s[2], s[3]]) {
            Some(IDonate::initializeCall::SELECTOR) => {
                let call = IDonate::initializeCall::abi_decode(input).expect("initialize");
                donate.owner = call.owner;
                donate.interchain_token_service = call.interchainTokenService;
            }
            Some(IDonate::addKnownChainCall::SELECTOR) => {
                let call = IDonate::addKnownChainCall::abi_decode(input).expect("addKnownChain");
                donate.known_chains.insert(call.chainName, call.chainAddress);
            }
            Some(IDonate::addKnownTokenCall::SELECTOR) => {
                let call = IDonate::addKnownTokenCall::abi_decode(input).expect("addKnownToken");
                donate.known_tokens.insert(call.tokenId, call.tokenAddress);
            }
            Some(IDonate::addKnownCharityCall::SELECTOR) => {
                let call = IDonate::addKnownCharityCall::abi_decode(input).expect("addKnownCharity");
                donate
                    .known_charities
                    .insert(charity_id(&call.charityName), call.charityAddress);
            }
            Some(IDonate::addKnownCharityInterchainCall::SELECTOR) => {
                let call = IDonate::addKnownCharityInterchainCall::abi_decode(input)
                    .expect("addKnownCharityInterchain");
                donate.known_charities_interchain.insert(
                    charity_id(&call.charityName),
                    (call.destinationChain, call.charityAddress),
                );
            }
            Some(IDonate::addAnalyticsTokenCall::SELECTOR) => {
                let call =
                    IDonate::addAnalyticsTokenCall::abi_decode(input).expect("addAnalyticsToken");
                donate.analytics_tokens.insert(call.token);
            }
            Some(IDonate::sendTokenCall::SELECTOR) => {
                let call = IDonate::sendTokenCall::abi_decode(input).expect("sendToken");
                donate.sent_tokens.push((
                    call.destinationChain,
                    call.tokenId,
                    call.destinationAddress,
                    call.amount,
                ));
            }
            _ => {}
        }
        Vec::new()
    }

    fn upgrade(&self, state: &mut State, proxy: Address, implementation: Address, data: &[u8]) {
        if state.ignore_upgrades {
            return;
        }
        state
            .storage
            .insert((proxy, IMPLEMENTATION_SLOT), implementation.into_word());
        if !data.is_empty() {
            self.apply(state, proxy, data);
        }
    }

    fn view(&self, state: &State, to: Address, input: &[u8]) -> Result<Bytes, ChainError> {
        let revert = || ChainError::CallReverted(format!("no view at {to}"));
        let selector = input.get(..4).ok_or_else(revert)?;
        if state.failing_calls.contains(selector) {
            return Err(ChainError::CallReverted("injected failure".to_owned()));
        }

        if state.factories.contains(&to) {
            let call = IDeployer::deployedAddressCall::abi_decode(input)?;
            let mut predicted =
                predict::create2_address(to, call.sender, call.salt, &call.bytecode);
            if state.factory_skew {
                predicted.0[19] ^= 0xff;
            }
            return Ok((predicted,).abi_encode_params().into());
        }

        if selector == IERC20::allowanceCall::SELECTOR {
            return Ok((U256::ZERO,).abi_encode_params().into());
        }

        let donate = state.donates.get(&to).ok_or_else(revert)?;
        let output = match [selector[0], selector[1], selector[2], selector[3]] {
            IDonate::interchainTokenServiceCall::SELECTOR => {
                let service = state
                    .reported_token_service
                    .unwrap_or(donate.interchain_token_service);
                (service,).abi_encode_params()
            }
            IDonate::knownChainsAddressesCall::SELECTOR => {
                let call = IDonate::knownChainsAddressesCall::abi_decode(input)?;
                let known = donate
                    .known_chains
                    .get(&call.chainName)
                    .cloned()
                    .unwrap_or_default();
                (known,).abi_encode_params()
            }
            IDonate::knownTokensCall::SELECTOR => {
                let call = IDonate::knownTokensCall::abi_decode(input)?;
                let known = donate
                    .known_tokens
                    .get(&call.tokenId)
                    .copied()
                    .unwrap_or_default();
                (known,).abi_encode_params()
            }
            IDonate::knownCharitiesCall::SELECTOR => {
                let call = IDonate::knownCharitiesCall::abi_decode(input)?;
                let known = donate
                    .known_charities
                    .get(&call.charityId)
                    .copied()
                    .unwrap_or_default();
                (known,).abi_encode_params()
            }
            IDonate::knownCharitiesInterchainCall::SELECTOR => {
                let call = IDonate::knownCharitiesInterchainCall::abi_decode(input)?;
                let known = donate
                    .known_charities_interchain
                    .get(&call.charityId)
                    .cloned()
                    .unwrap_or_default();
                known.abi_encode_params()
            }
            IDonate::analyticsTokensCall::SELECTOR => {
                let call = IDonate::analyticsTokensCall::abi_decode(input)?;
                (donate.analytics_tokens.contains(&call.token),).abi_encode_params()
            }
            _ => return Err(revert()),
        };
        Ok(output.into())
    }
}

impl Chain for MockChain {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ChainError> {
        let state = self.state.borrow();
        self.view(&state, to, &input)
    }

    async fn send(&self, to: Address, input: Bytes, value: U256) -> Result<Receipt, ChainError> {
        let mut state = self.state.borrow_mut();
        state.sent.push(SentTx {
            to: Some(to),
            input: input.clone(),
            value,
        });
        let fail = state.fail_send_at == Some(state.sent.len() - 1);
        let mut receipt = Self::next_receipt(&mut state);
        if fail {
            return Err(ChainError::Reverted {
                tx_hash: receipt.tx_hash,
            });
        }
        receipt.logs = self.apply(&mut state, to, &input);
        Ok(receipt)
    }

    async fn create(&self, init_code: Bytes) -> Result<Receipt, ChainError> {
        let mut state = self.state.borrow_mut();
        state.sent.push(SentTx {
            to: None,
            input: init_code.clone(),
            value: U256::ZERO,
        });
        let address = self.sender.create(state.nonce);
        let fail = state.fail_send_at == Some(state.sent.len() - 1);
        let mut receipt = Self::next_receipt(&mut state);
        if fail {
            return Err(ChainError::Reverted {
                tx_hash: receipt.tx_hash,
            });
        }
        self.instantiate(&mut state, address, &init_code);
        receipt.contract_address = Some(address);
        Ok(receipt)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
        Ok(self
            .state
            .borrow()
            .code
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }

    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, ChainError> {
        Ok(self
            .state
            .borrow()
            .storage
            .get(&(address, slot))
            .copied()
            .unwrap_or_default())
    }

    async fn nonce(&self) -> Result<u64, ChainError> {
        Ok(self.state.borrow().nonce)
    }
}

fn artifact(value: serde_json::Value) -> Artifact {
    serde_json::from_value(value).expect("test artifact")
}

/// Donate deployed with `constructor(owner, interchainTokenService)`.
pub fn donate_artifact() -> Artifact {
    artifact(json!({
        "contractName": "Donate",
        "abi": [
            {
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [
                    { "name": "owner", "type": "address", "internalType": "address" },
                    { "name": "interchainTokenService", "type": "address", "internalType": "address" }
                ]
            },
            {
                "type": "function",
                "name": "interchainTokenService",
                "stateMutability": "view",
                "inputs": [],
                "outputs": [{ "name": "", "type": "address", "internalType": "address" }]
            }
        ],
        "bytecode": "0x6080604052d0a7e0",
        "deployedBytecode": "0x60806040d0a7e0"
    }))
}

/// Donate logic contract initialized through a proxy.
pub fn donate_upgradeable_artifact() -> Artifact {
    upgradeable("0x6080604052ab01", "0x60806040ab01")
}

/// Second version of [`donate_upgradeable_artifact`].
pub fn donate_v2_artifact() -> Artifact {
    upgradeable("0x6080604052ab02", "0x60806040ab02")
}

fn upgradeable(bytecode: &str, deployed: &str) -> Artifact {
    artifact(json!({
        "contractName": "DonateUpgradeable",
        "abi": [
            {
                "type": "function",
                "name": "initialize",
                "stateMutability": "nonpayable",
                "inputs": [
                    { "name": "owner", "type": "address", "internalType": "address" },
                    { "name": "interchainTokenService", "type": "address", "internalType": "address" }
                ],
                "outputs": []
            }
        ],
        "bytecode": bytecode,
        "deployedBytecode": deployed
    }))
}

pub fn proxy_bytecode() -> Bytes {
    Bytes::from_static(&[0x60, 0x80, 0x19, 0x67, 0x00])
}

/// Config holding only the factory and the interchain token service.
pub fn network() -> NetworkConfig {
    let mut config = NetworkConfig::default();
    config.contracts.insert(
        FACTORY.to_owned(),
        ContractRecord {
            address: Some(FACTORY_ADDRESS),
            ..Default::default()
        },
    );
    config.contracts.insert(
        INTERCHAIN_TOKEN_SERVICE.to_owned(),
        ContractRecord {
            address: Some(ITS_ADDRESS),
            ..Default::default()
        },
    );
    config
}

/// Config where Donate is already recorded at `address`.
pub fn network_with_donate(address: Address) -> NetworkConfig {
    let mut config = network();
    config.contracts.insert(
        "Donate".to_owned(),
        ContractRecord {
            address: Some(address),
            deployer: Some(SENDER),
            deployment_method: Some(DeploymentMethod::Create2),
            salt: Some("Donate".to_owned()),
            ..Default::default()
        },
    );
    config
}
