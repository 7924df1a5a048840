//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy_primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::constants::{INITIALIZER_METHOD_NAME, TRANSPARENT_PROXY_ARTIFACT};

/// A deployment task, selectable by its tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployTask {
    /// The tag the task is selected by
    pub tag: &'static str,
    /// The name of the contract artifact the task deploys
    pub contract_name: &'static str,
}

/// The proxy implementations a contract can be deployed behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProxyContract {
    /// OpenZeppelin's v5 `TransparentUpgradeableProxy`, which deploys its own
    /// `ProxyAdmin` in its constructor
    OpenZeppelinTransparentProxy,
}

impl ProxyContract {
    /// The name of the compilation artifact holding the proxy's bytecode
    pub fn artifact_name(&self) -> &'static str {
        match self {
            ProxyContract::OpenZeppelinTransparentProxy => TRANSPARENT_PROXY_ARTIFACT,
        }
    }
}

impl Display for ProxyContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyContract::OpenZeppelinTransparentProxy => {
                write!(f, "OpenZeppelinTransparentProxy")
            }
        }
    }
}

/// An initializer method executed through the proxy when it is first deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitCall {
    /// The name of the initializer method
    pub method_name: String,
    /// The arguments the initializer is called with
    pub args: Vec<Address>,
}

/// Proxy configuration for a deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyOptions {
    /// The initializer executed on first deployment
    pub execute: InitCall,
    /// The proxy implementation to deploy behind
    pub proxy_contract: ProxyContract,
    /// The owner of the proxy admin, the deployer if unset
    pub owner: Option<Address>,
}

/// Options for the `deploy` operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// The account deploying the contracts
    pub from: Address,
    /// The proxy configuration
    pub proxy: ProxyOptions,
    /// Whether to log each deployment transaction
    pub log: bool,
    /// Whether to request a block be mined after each transaction
    pub auto_mine: bool,
}

/// A request to deploy a contract behind a proxy and hand its ownership over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    /// The name of the contract artifact to deploy
    pub contract_name: String,
    /// The account deploying the contract
    pub deployer: Address,
    /// The proxy implementation to deploy behind
    pub proxy_contract: ProxyContract,
    /// The name of the initializer method
    pub initializer_method_name: String,
    /// The arguments the initializer is called with
    pub initializer_args: Vec<Address>,
    /// The account ownership is transferred to once deployed
    pub new_owner: Address,
}

impl DeploymentRequest {
    /// Build the request for a contract initialized as `initialize(owner, minter)`
    pub fn new(contract_name: &str, deployer: Address, owner: Address, minter: Address) -> Self {
        Self {
            contract_name: contract_name.to_string(),
            deployer,
            proxy_contract: ProxyContract::OpenZeppelinTransparentProxy,
            initializer_method_name: INITIALIZER_METHOD_NAME.to_string(),
            initializer_args: vec![owner, minter],
            new_owner: owner,
        }
    }

    /// The options to pass to the `deploy` operation
    pub fn deploy_options(
        &self,
        proxy_admin_owner: Option<Address>,
        log: bool,
        auto_mine: bool,
    ) -> DeployOptions {
        DeployOptions {
            from: self.deployer,
            proxy: ProxyOptions {
                execute: InitCall {
                    method_name: self.initializer_method_name.clone(),
                    args: self.initializer_args.clone(),
                },
                proxy_contract: self.proxy_contract,
                owner: proxy_admin_owner,
            },
            log,
            auto_mine,
        }
    }
}

/// The outcome of a mined transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOutcome {
    /// The hash of the transaction
    pub transaction_hash: TxHash,
    /// The address of the created contract, if the transaction created one
    pub contract_address: Option<Address>,
    /// The gas used by the transaction
    pub gas_used: u64,
}

/// The result of the `deploy` operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployResult {
    /// The address of the proxy, through which the contract is called
    pub address: Address,
    /// The address of the implementation contract
    pub implementation: Address,
    /// The address of the proxy admin contract
    pub proxy_admin: Address,
    /// Whether any transaction was sent, false when an existing deployment
    /// was reused as is
    pub newly_deployed: bool,
}
