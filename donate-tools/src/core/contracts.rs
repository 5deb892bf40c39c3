// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Interfaces of the contracts the orchestrator talks to, and a typed handle to call them.

use alloy::{
    primitives::{b256, keccak256, Address, Bytes, B256, U256},
    sol,
    sol_types::{SolCall, SolEvent},
};

use super::chain::{Chain, ChainError, Receipt};

sol! {
    /// Deterministic deployment factory.
    interface IDeployer {
        event Deployed(
            address indexed deployedAddress,
            address indexed sender,
            bytes32 indexed salt,
            bytes32 bytecodeHash
        );

        function deploy(bytes bytecode, bytes32 salt) external payable returns (address deployedAddress_);
        function deployedAddress(bytes bytecode, address sender, bytes32 salt) external view returns (address deployedAddress_);
    }

    interface IDonate {
        function initialize(address owner, address interchainTokenService) external;
        function interchainTokenService() external view returns (address);

        function knownChainsAddresses(string chainName) external view returns (string);
        function addKnownChain(string chainName, string chainAddress) external;

        function knownTokens(bytes32 tokenId) external view returns (address);
        function addKnownToken(bytes32 tokenId, address tokenAddress) external;

        function knownCharities(bytes32 charityId) external view returns (address);
        function addKnownCharity(string charityName, address charityAddress) external;

        function knownCharitiesInterchain(bytes32 charityId) external view returns (string destinationChain, string charityAddress);
        function addKnownCharityInterchain(string charityName, string destinationChain, string charityAddress) external;

        function analyticsTokens(address token) external view returns (bool);
        function addAnalyticsToken(address token) external;

        function sendToken(string destinationChain, bytes32 tokenId, bytes destinationAddress, uint256 amount) external payable;
    }

    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
    }

    /// ERC-1967 proxy constructor arguments.
    struct ProxyConstructor {
        address implementation;
        bytes data;
    }

    interface IUUPSUpgradeable {
        function upgradeToAndCall(address newImplementation, bytes data) external payable;
    }

    interface IProxyAdmin {
        function upgradeAndCall(address proxy, address implementation, bytes data) external payable;
    }
}

/// `keccak256("eip1967.proxy.implementation") - 1`
pub const IMPLEMENTATION_SLOT: B256 =
    b256!("0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// `keccak256("eip1967.proxy.admin") - 1`
pub const ADMIN_SLOT: B256 =
    b256!("0xb53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

/// Identifier the Donate contract stores charities under.
pub fn charity_id(name: &str) -> B256 {
    keccak256(name.as_bytes())
}

/// A deployed contract bound to a chain.
#[derive(Debug)]
pub struct ContractHandle<'a, C> {
    address: Address,
    chain: &'a C,
}

impl<'a, C: Chain> ContractHandle<'a, C> {
    pub fn attach(address: Address, chain: &'a C) -> Self {
        Self { address, chain }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn call<F: SolCall>(&self, call: F) -> Result<F::Return, ChainError> {
        let output = self.chain.call(self.address, call.abi_encode().into()).await?;
        Ok(F::abi_decode_returns(&output)?)
    }

    pub async fn send<F: SolCall>(&self, call: F) -> Result<Receipt, ChainError> {
        self.send_with_value(call, U256::ZERO).await
    }

    pub async fn send_with_value<F: SolCall>(
        &self,
        call: F,
        value: U256,
    ) -> Result<Receipt, ChainError> {
        self.chain
            .send(self.address, call.abi_encode().into(), value)
            .await
    }

    pub async fn code_hash(&self) -> Result<B256, ChainError> {
        let code = self.chain.code_at(self.address).await?;
        Ok(keccak256(&code))
    }

    /// Address stored in an EIP-1967 slot, zero when unset.
    pub async fn slot_address(&self, slot: B256) -> Result<Address, ChainError> {
        let word = self.chain.storage_at(self.address, slot).await?;
        Ok(Address::from_word(word))
    }
}

/// Finds the factory's `Deployed` event in a receipt.
pub fn deployed_event_address(receipt: &Receipt, factory: Address) -> Option<Address> {
    receipt
        .logs
        .iter()
        .filter(|log| log.address == factory)
        .find(|log| log.topics().first() == Some(&IDeployer::Deployed::SIGNATURE_HASH))
        .and_then(|log| log.topics().get(1))
        .map(|topic| Address::from_word(*topic))
}

/// Init data for an ERC-1967 proxy: the proxy's creation code followed by its constructor
/// arguments.
pub fn proxy_init_code(proxy_bytecode: &[u8], implementation: Address, data: Bytes) -> Bytes {
    use alloy::sol_types::SolValue;

    let mut code = proxy_bytecode.to_vec();
    code.extend(ProxyConstructor {
        implementation,
        data,
    }
    .abi_encode_params());
    code.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        primitives::{address, Log, LogData},
        sol_types::SolValue,
    };

    #[test]
    fn eip1967_slots() {
        let implementation =
            U256::from_be_bytes(keccak256("eip1967.proxy.implementation").0) - U256::from(1);
        assert_eq!(B256::new(implementation.to_be_bytes::<32>()), IMPLEMENTATION_SLOT);
        let admin = U256::from_be_bytes(keccak256("eip1967.proxy.admin").0) - U256::from(1);
        assert_eq!(B256::new(admin.to_be_bytes::<32>()), ADMIN_SLOT);
    }

    #[test]
    fn finds_deployed_event() {
        let factory = address!("0xFAC0000000000000000000000000000000000001");
        let deployed = address!("0x1111111111111111111111111111111111111111");
        let sender = address!("0x2222222222222222222222222222222222222222");
        let log = Log {
            address: factory,
            data: LogData::new_unchecked(
                vec![
                    IDeployer::Deployed::SIGNATURE_HASH,
                    deployed.into_word(),
                    sender.into_word(),
                    B256::repeat_byte(3),
                ],
                B256::repeat_byte(4).0.to_vec().into(),
            ),
        };
        let mut receipt = Receipt {
            tx_hash: B256::ZERO,
            block_number: Some(1),
            gas_used: 21_000,
            contract_address: None,
            logs: vec![log.clone()],
        };
        assert_eq!(deployed_event_address(&receipt, factory), Some(deployed));
        assert_eq!(deployed_event_address(&receipt, sender), None);

        receipt.logs[0].data = LogData::new_unchecked(vec![B256::repeat_byte(9)], Bytes::new());
        assert_eq!(deployed_event_address(&receipt, factory), None);
    }

    #[test]
    fn proxy_init_code_encodes_constructor() {
        let implementation = address!("0x3333333333333333333333333333333333333333");
        let data = IDonate::initializeCall {
            owner: Address::repeat_byte(1),
            interchainTokenService: Address::repeat_byte(2),
        }
        .abi_encode();
        let code = proxy_init_code(&[0xaa, 0xbb], implementation, data.clone().into());
        assert_eq!(&code[..2], &[0xaa, 0xbb]);

        let decoded = <(Address, Bytes)>::abi_decode_params(&code[2..]).unwrap();
        assert_eq!(decoded.0, implementation);
        assert_eq!(decoded.1.to_vec(), data);
    }

    #[test]
    fn charity_id_is_keccak_of_name() {
        assert_eq!(charity_id("first-charity"), keccak256(b"first-charity"));
    }
}
