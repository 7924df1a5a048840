//! The chain client the deploy scripts submit transactions through

use std::str::FromStr;

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, Bytes, B256, U256};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{constants::EVM_MINE_METHOD, errors::ScriptError, types::TxOutcome};

/// The operations the deploy scripts need from a chain.
///
/// Transactions are signed by a single sending account and every method
/// resolves only once its transaction is mined.
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    /// The account transactions are sent from
    fn sender(&self) -> Address;

    /// The ID of the connected chain
    async fn chain_id(&self) -> Result<u64, ScriptError>;

    /// Send a contract creation transaction with the given init code
    async fn deploy_code(&self, init_code: Bytes, auto_mine: bool)
        -> Result<TxOutcome, ScriptError>;

    /// Send a transaction calling `to` with the given calldata
    async fn send_call(
        &self,
        to: Address,
        calldata: Bytes,
        auto_mine: bool,
    ) -> Result<TxOutcome, ScriptError>;

    /// Execute a read-only call against the latest block
    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ScriptError>;

    /// The runtime code at an address, empty when no contract lives there
    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError>;

    /// The word stored at a storage slot of a contract
    async fn storage_at(&self, address: Address, slot: U256) -> Result<B256, ScriptError>;
}

/// A [`ChainClient`] talking JSON-RPC over HTTP, signing with a local key
#[derive(Clone)]
pub struct RpcClient {
    /// The provider, with the deployer wallet attached
    provider: DynProvider,
    /// The address of the deployer
    sender: Address,
}

/// Sets up the client with which to deploy and call contracts, signing with
/// the given private key
pub async fn setup_client(priv_key: &str, rpc_url: &str) -> Result<RpcClient, ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let sender = signer.address();
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);
    let client = RpcClient {
        provider: DynProvider::new(provider),
        sender,
    };

    // Fail early on an unreachable node
    let chain_id = client.chain_id().await?;
    debug!("Connected to chain {} as {:#x}", chain_id, sender);

    Ok(client)
}

impl RpcClient {
    /// Submit a transaction and wait for its receipt, mining a block in
    /// between if requested
    async fn send(
        &self,
        tx: TransactionRequest,
        auto_mine: bool,
    ) -> Result<TransactionReceipt, String> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| e.to_string())?;

        if auto_mine {
            self.mine().await;
        }

        let receipt = pending.get_receipt().await.map_err(|e| e.to_string())?;
        if !receipt.status() {
            return Err(format!("transaction {:#x} reverted", receipt.transaction_hash));
        }

        Ok(receipt)
    }

    /// Ask the node to mine a block.
    ///
    /// Live networks reject `evm_mine`, so failure is only logged.
    async fn mine(&self) {
        let res = self
            .provider
            .raw_request::<_, Value>(EVM_MINE_METHOD.into(), ())
            .await;

        if let Err(e) = res {
            warn!("could not auto-mine: {}", e);
        }
    }
}

/// Extract the outcome of a mined transaction from its receipt
fn outcome(receipt: &TransactionReceipt) -> TxOutcome {
    TxOutcome {
        transaction_hash: receipt.transaction_hash,
        contract_address: receipt.contract_address,
        gas_used: receipt.gas_used,
    }
}

impl ChainClient for RpcClient {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn chain_id(&self) -> Result<u64, ScriptError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
    }

    async fn deploy_code(
        &self,
        init_code: Bytes,
        auto_mine: bool,
    ) -> Result<TxOutcome, ScriptError> {
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_deploy_code(init_code);

        let receipt = self
            .send(tx, auto_mine)
            .await
            .map_err(ScriptError::ContractDeployment)?;

        if receipt.contract_address.is_none() {
            return Err(ScriptError::ContractDeployment(format!(
                "no contract address in receipt of {:#x}",
                receipt.transaction_hash
            )));
        }

        Ok(outcome(&receipt))
    }

    async fn send_call(
        &self,
        to: Address,
        calldata: Bytes,
        auto_mine: bool,
    ) -> Result<TxOutcome, ScriptError> {
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_to(to)
            .with_input(calldata);

        let receipt = self
            .send(tx, auto_mine)
            .await
            .map_err(ScriptError::ContractInteraction)?;

        Ok(outcome(&receipt))
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ScriptError> {
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_to(to)
            .with_input(calldata);

        self.provider
            .call(&tx)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    async fn storage_at(&self, address: Address, slot: U256) -> Result<B256, ScriptError> {
        let value = self
            .provider
            .get_storage_at(address, slot)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(B256::from(value.to_be_bytes::<32>()))
    }
}
