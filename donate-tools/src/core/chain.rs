// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! The wallet and RPC seam.
//!
//! Every on-chain effect of the orchestrator goes through [`Chain`]. Transactions are submitted
//! one at a time from a single sender and each call to [`Chain::send`] or [`Chain::create`]
//! returns only once the transaction is included, so nonces stay strictly ordered.

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, Log, TxHash, B256, U256},
    providers::{Provider, WalletProvider},
    rpc::types::{TransactionReceipt, TransactionRequest},
};

use crate::utils::{color::DebugColor, format_gas};

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("rpc error: {0}")]
    Rpc(#[from] alloy::transports::RpcError<alloy::transports::TransportErrorKind>),
    #[error("pending transaction error: {0}")]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),
    #[error("failed to decode return data: {0}")]
    Decode(#[from] alloy::sol_types::Error),

    #[error("tx reverted {}", .tx_hash.debug_red())]
    Reverted { tx_hash: TxHash },
    #[error("call reverted: {0}")]
    CallReverted(String),
    #[error("missing contract address in receipt {}", .tx_hash.debug_red())]
    MissingReceiptAddress { tx_hash: TxHash },
}

/// The parts of a transaction receipt the orchestrator relies on.
#[derive(Clone, Debug, PartialEq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub contract_address: Option<Address>,
    pub logs: Vec<Log>,
}

impl From<&TransactionReceipt> for Receipt {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            contract_address: receipt.contract_address,
            logs: receipt
                .inner
                .logs()
                .iter()
                .map(|log| log.inner.clone())
                .collect(),
        }
    }
}

/// A signing account connected to one network.
#[allow(async_fn_in_trait)]
pub trait Chain {
    /// Address that signs every transaction sent through this chain.
    fn sender(&self) -> Address;

    /// Read-only call.
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ChainError>;

    /// Sends a state-changing transaction and waits for it to be included.
    async fn send(&self, to: Address, input: Bytes, value: U256) -> Result<Receipt, ChainError>;

    /// Sends a contract creation transaction and waits for it to be included.
    async fn create(&self, init_code: Bytes) -> Result<Receipt, ChainError>;

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError>;

    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, ChainError>;

    /// Next nonce of [`Chain::sender`].
    async fn nonce(&self) -> Result<u64, ChainError>;
}

/// [`Chain`] backed by an alloy provider with a wallet.
#[derive(Debug)]
pub struct RpcChain<P> {
    provider: P,
    max_fee_per_gas_wei: Option<u128>,
}

impl<P: Provider + WalletProvider> RpcChain<P> {
    pub fn new(provider: P, max_fee_per_gas_wei: Option<u128>) -> Self {
        Self {
            provider,
            max_fee_per_gas_wei,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn exec(&self, tx: TransactionRequest) -> Result<Receipt, ChainError> {
        let mut tx = tx.with_from(self.sender());
        let gas = self.provider.estimate_gas(tx.clone()).await?;
        tx.gas = Some(gas);
        if let Some(max_fee) = self.max_fee_per_gas_wei {
            tx.max_fee_per_gas = Some(max_fee);
            tx.max_priority_fee_per_gas = Some(0);
        }

        let pending = self.provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();
        debug!(@grey, "sent tx: {}", tx_hash.debug_lavender());

        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(ChainError::Reverted { tx_hash });
        }
        debug!(@grey, "tx {} included, {}", tx_hash.debug_lavender(), format_gas(receipt.gas_used));
        Ok(Receipt::from(&receipt))
    }
}

impl<P: Provider + WalletProvider> Chain for RpcChain<P> {
    fn sender(&self) -> Address {
        self.provider.default_signer_address()
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ChainError> {
        let tx = TransactionRequest::default()
            .with_from(self.sender())
            .with_to(to)
            .with_input(input);
        Ok(self.provider.call(tx).await?)
    }

    async fn send(&self, to: Address, input: Bytes, value: U256) -> Result<Receipt, ChainError> {
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_value(value)
            .with_input(input);
        self.exec(tx).await
    }

    async fn create(&self, init_code: Bytes) -> Result<Receipt, ChainError> {
        let tx = TransactionRequest::default().with_deploy_code(init_code);
        let receipt = self.exec(tx).await?;
        if receipt.contract_address.is_none() {
            return Err(ChainError::MissingReceiptAddress {
                tx_hash: receipt.tx_hash,
            });
        }
        Ok(receipt)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
        Ok(self.provider.get_code_at(address).await?)
    }

    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, ChainError> {
        let value = self
            .provider
            .get_storage_at(address, U256::from_be_bytes(slot.0))
            .await?;
        Ok(B256::new(value.to_be_bytes::<32>()))
    }

    async fn nonce(&self) -> Result<u64, ChainError> {
        Ok(self
            .provider
            .get_transaction_count(self.sender())
            .await?)
    }
}
