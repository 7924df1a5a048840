//! Persistence of deployment records, one JSON file per contract and network

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::json_abi::JsonAbi;
use alloy_primitives::{Address, TxHash, B256};
use serde::{Deserialize, Serialize};

use crate::{
    constants::JSON_EXTENSION,
    errors::ScriptError,
    types::{InitCall, ProxyContract},
};

/// Everything known about a contract deployed behind a proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// The address of the proxy, through which the contract is called
    pub address: Address,
    /// The address of the current implementation contract
    pub implementation: Address,
    /// The address of the proxy admin contract
    pub proxy_admin: Address,
    /// The proxy implementation deployed
    pub proxy_contract: ProxyContract,
    /// The hash of the transaction that last changed the deployment
    pub transaction_hash: TxHash,
    /// The chain the contract is deployed to
    pub chain_id: u64,
    /// The initializer executed when the proxy was deployed
    pub initializer: InitCall,
    /// The hash of the implementation's creation bytecode
    pub implementation_bytecode_hash: B256,
    /// The contract ABI
    pub abi: JsonAbi,
}

/// The deployment records of a single network
#[derive(Debug, Clone)]
pub struct DeploymentStore {
    /// The directory holding this network's records
    dir: PathBuf,
}

impl DeploymentStore {
    /// Create a store for the given network under the deployments root
    pub fn new(root: impl AsRef<Path>, network: &str) -> Self {
        Self {
            dir: root.as_ref().join(network),
        }
    }

    /// The path of the named contract's record
    pub fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{JSON_EXTENSION}"))
    }

    /// Read the named contract's record, if one was written
    pub fn load(&self, name: &str) -> Result<Option<DeploymentRecord>, ScriptError> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| ScriptError::ReadDeployments(format!("{}: {e}", path.display())))?;
        let record = serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ReadDeployments(format!("{}: {e}", path.display())))?;

        Ok(Some(record))
    }

    /// Read the named contract's record, failing if none was written
    pub fn get(&self, name: &str) -> Result<DeploymentRecord, ScriptError> {
        self.load(name)?
            .ok_or_else(|| ScriptError::DeploymentNotFound(name.to_string()))
    }

    /// Write the named contract's record, replacing any previous one
    pub fn save(&self, name: &str, record: &DeploymentRecord) -> Result<(), ScriptError> {
        // If the directory doesn't exist, create it
        fs::create_dir_all(&self.dir).map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;

        let contents = serde_json::to_string_pretty(record)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        fs::write(self.record_path(name), contents)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))
    }
}
