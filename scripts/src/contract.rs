//! Handles to deployed contracts, bound to the deployer account

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use tracing::info;

use crate::{
    client::ChainClient,
    constants::PROXY_IMPLEMENTATION_STORAGE_SLOT,
    deployments::DeploymentStore,
    errors::ScriptError,
    solidity::IOwnable,
    types::TxOutcome,
    utils::{address_from_storage_word, parse_storage_slot},
};

/// A callable handle to a contract deployed behind a proxy
pub struct ContractHandle<'a, C> {
    /// The name the contract was deployed under
    name: String,
    /// The address of the proxy
    address: Address,
    /// The client transactions are sent through
    client: &'a C,
}

/// Get a handle to the named deployed contract, sending transactions as `signer`
pub fn get_contract<'a, C: ChainClient>(
    client: &'a C,
    deployments: &DeploymentStore,
    name: &str,
    signer: Address,
) -> Result<ContractHandle<'a, C>, ScriptError> {
    if signer != client.sender() {
        return Err(ScriptError::Unauthorized(format!(
            "client signs as {:#x}, not {:#x}",
            client.sender(),
            signer
        )));
    }

    let record = deployments.get(name)?;
    Ok(ContractHandle {
        name: name.to_string(),
        address: record.address,
        client,
    })
}

impl<C: ChainClient> ContractHandle<'_, C> {
    /// The address calls are sent to
    pub fn address(&self) -> Address {
        self.address
    }

    /// The current owner of the contract
    pub async fn owner(&self) -> Result<Address, ScriptError> {
        let calldata = Bytes::from(IOwnable::ownerCall {}.abi_encode());
        let output = self.client.call(self.address, calldata).await?;

        let decoded = IOwnable::ownerCall::abi_decode_returns(&output, true /* validate */)
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        Ok(decoded._0)
    }

    /// Transfer ownership of the contract, waiting for the transaction to be mined
    pub async fn transfer_ownership(
        &self,
        new_owner: Address,
        auto_mine: bool,
    ) -> Result<TxOutcome, ScriptError> {
        let call = IOwnable::transferOwnershipCall { newOwner: new_owner };
        let calldata = Bytes::from(call.abi_encode());
        let outcome = self
            .client
            .send_call(self.address, calldata, auto_mine)
            .await?;

        info!(
            "{}: ownership transferred to {:#x} (tx: {:#x})",
            self.name, new_owner, outcome.transaction_hash
        );

        Ok(outcome)
    }

    /// The implementation the proxy currently forwards to
    pub async fn implementation(&self) -> Result<Address, ScriptError> {
        let slot = parse_storage_slot(PROXY_IMPLEMENTATION_STORAGE_SLOT)?;
        let word = self.client.storage_at(self.address, slot).await?;
        Ok(address_from_storage_word(word))
    }
}
