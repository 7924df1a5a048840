//! An in-memory chain implementing just enough of an Ownable contract behind a
//! transparent proxy to exercise the deployment tasks

#![allow(dead_code)]

use std::{cell::RefCell, collections::HashMap, fs, path::PathBuf};

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolCall, SolValue};
use nft_deploy::{
    artifacts::ArtifactStore,
    client::ChainClient,
    constants::{PROXY_ADMIN_STORAGE_SLOT, PROXY_IMPLEMENTATION_STORAGE_SLOT},
    deployments::DeploymentStore,
    errors::ScriptError,
    runner::DeploymentEnv,
    solidity::{IOwnable, IProxyAdmin},
    types::TxOutcome,
    utils::parse_storage_slot,
};
use serde_json::json;
use tempfile::TempDir;

sol! {
    function initialize(address owner, address minter) external;
}

/// The chain ID of the mock chain
pub const CHAIN_ID: u64 = 31337;
/// The gas every mock transaction uses
pub const GAS_USED: u64 = 100_000;
/// The creation bytecode of the mock proxy
pub const PROXY_BYTECODE: &str = "0x60ff60ff";
/// The creation bytecode of the mock `ERC721`
pub const ERC721_BYTECODE: &str = "0x6001";
/// The creation bytecode of the mock `NFT`
pub const NFT_BYTECODE: &str = "0x6002";

/// The deployer account of the tests
pub fn deployer() -> Address {
    Address::repeat_byte(0xde)
}

/// The owner and minter used in the tests
pub fn owner() -> Address {
    "0x007E483Cf6Df009Db5Ec571270b454764d954d95"
        .parse()
        .unwrap()
}

/// A transaction the mock chain received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentTx {
    /// A contract creation
    Deploy,
    /// A call, identified by its selector
    Call {
        /// The called contract
        to: Address,
        /// The selector of the called method
        selector: [u8; 4],
    },
}

/// A contract living on the mock chain
#[derive(Debug, Clone)]
enum MockContract {
    /// An implementation contract, never called directly
    Implementation,
    /// A transparent proxy with the Ownable state of its implementation
    Proxy {
        implementation: Address,
        admin: Address,
        owner: Address,
        minter: Address,
    },
    /// A proxy admin
    ProxyAdmin { owner: Address },
}

/// The mutable state of the mock chain
#[derive(Default)]
struct MockState {
    /// Counter used to derive addresses and hashes
    nonce: u8,
    /// The deployed contracts
    contracts: HashMap<Address, MockContract>,
    /// Every transaction received, including reverted ones
    sent: Vec<SentTx>,
}

/// An in-memory [`ChainClient`]
pub struct MockChain {
    /// The sending account
    sender: Address,
    /// The proxy creation bytecode, used to recognize proxy deployments
    proxy_bytecode: Bytes,
    /// Whether the initializer reverts
    pub revert_initializer: bool,
    /// Whether `transferOwnership` reverts
    pub revert_transfer: bool,
    /// Whether the initializer assigns ownership to its `owner` argument
    /// rather than leaving it with the caller
    pub initializer_sets_owner: bool,
    /// The chain state
    state: RefCell<MockState>,
}

impl MockChain {
    /// A fresh chain sending as [`deployer`]
    pub fn new() -> Self {
        Self {
            sender: deployer(),
            proxy_bytecode: PROXY_BYTECODE.parse().unwrap(),
            revert_initializer: false,
            revert_transfer: false,
            initializer_sets_owner: false,
            state: RefCell::new(MockState::default()),
        }
    }

    /// Wipe all contracts, as a restarted development node would
    pub fn reset(&self) {
        self.state.borrow_mut().contracts.clear();
    }

    /// All transactions received so far
    pub fn sent(&self) -> Vec<SentTx> {
        self.state.borrow().sent.clone()
    }

    /// The number of contract creations received so far
    pub fn num_deploys(&self) -> usize {
        self.sent().iter().filter(|tx| **tx == SentTx::Deploy).count()
    }

    /// The number of calls with the given selector received so far
    pub fn num_calls(&self, selector: [u8; 4]) -> usize {
        self.sent()
            .iter()
            .filter(|tx| matches!(tx, SentTx::Call { selector: s, .. } if *s == selector))
            .count()
    }

    /// The minter a proxy was initialized with
    pub fn minter_of(&self, proxy: Address) -> Option<Address> {
        match self.state.borrow().contracts.get(&proxy) {
            Some(MockContract::Proxy { minter, .. }) => Some(*minter),
            _ => None,
        }
    }

    /// Allocate the next address and transaction hash
    fn next_ids(state: &mut MockState) -> (Address, B256) {
        state.nonce += 1;
        (
            Address::with_last_byte(state.nonce),
            B256::with_last_byte(state.nonce),
        )
    }

    /// A reverted transaction
    fn revert(reason: &str) -> String {
        format!("execution reverted: {reason}")
    }
}

impl ChainClient for MockChain {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn chain_id(&self) -> Result<u64, ScriptError> {
        Ok(CHAIN_ID)
    }

    async fn deploy_code(
        &self,
        init_code: Bytes,
        _auto_mine: bool,
    ) -> Result<TxOutcome, ScriptError> {
        let mut state = self.state.borrow_mut();
        state.sent.push(SentTx::Deploy);

        let proxy_len = self.proxy_bytecode.len();
        let is_proxy =
            init_code.len() > proxy_len && init_code.starts_with(&self.proxy_bytecode[..]);
        if !is_proxy {
            let (address, hash) = Self::next_ids(&mut state);
            state.contracts.insert(address, MockContract::Implementation);
            return Ok(TxOutcome {
                transaction_hash: hash,
                contract_address: Some(address),
                gas_used: GAS_USED,
            });
        }

        let (implementation, admin_owner, data) =
            <(Address, Address, Bytes)>::abi_decode_params(&init_code[proxy_len..], true)
                .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
        let init = initializeCall::abi_decode(&data, true)
            .map_err(|_| ScriptError::ContractDeployment(Self::revert("unknown initializer")))?;
        if self.revert_initializer {
            return Err(ScriptError::ContractDeployment(Self::revert(
                "InvalidInitialization()",
            )));
        }

        let (admin, _) = Self::next_ids(&mut state);
        state
            .contracts
            .insert(admin, MockContract::ProxyAdmin { owner: admin_owner });

        // The initializer runs in the proxy constructor, so the caller is the deployer
        let owner = if self.initializer_sets_owner {
            init.owner
        } else {
            self.sender
        };
        let (proxy, hash) = Self::next_ids(&mut state);
        state.contracts.insert(
            proxy,
            MockContract::Proxy {
                implementation,
                admin,
                owner,
                minter: init.minter,
            },
        );

        Ok(TxOutcome {
            transaction_hash: hash,
            contract_address: Some(proxy),
            gas_used: GAS_USED,
        })
    }

    async fn send_call(
        &self,
        to: Address,
        calldata: Bytes,
        _auto_mine: bool,
    ) -> Result<TxOutcome, ScriptError> {
        let mut state = self.state.borrow_mut();
        let selector: [u8; 4] = calldata[..4].try_into().unwrap();
        state.sent.push(SentTx::Call { to, selector });

        let sender = self.sender;
        let revert_transfer = self.revert_transfer;
        let new_implementation = match state.contracts.get_mut(&to) {
            Some(MockContract::Proxy { owner, .. })
                if selector == IOwnable::transferOwnershipCall::SELECTOR =>
            {
                if revert_transfer || *owner != sender {
                    return Err(ScriptError::ContractInteraction(Self::revert(
                        "OwnableUnauthorizedAccount(address)",
                    )));
                }

                let call = IOwnable::transferOwnershipCall::abi_decode(&calldata, true).unwrap();
                *owner = call.newOwner;
                None
            }
            Some(MockContract::ProxyAdmin { owner })
                if selector == IProxyAdmin::upgradeAndCallCall::SELECTOR =>
            {
                if *owner != sender {
                    return Err(ScriptError::ContractInteraction(Self::revert(
                        "OwnableUnauthorizedAccount(address)",
                    )));
                }

                let call = IProxyAdmin::upgradeAndCallCall::abi_decode(&calldata, true).unwrap();
                Some((call.proxy, call.implementation))
            }
            _ => return Err(ScriptError::ContractInteraction(Self::revert("no such method"))),
        };

        if let Some((proxy, new_impl)) = new_implementation {
            if let Some(MockContract::Proxy { implementation, .. }) =
                state.contracts.get_mut(&proxy)
            {
                *implementation = new_impl;
            }
        }

        let (_, hash) = Self::next_ids(&mut state);
        Ok(TxOutcome {
            transaction_hash: hash,
            contract_address: None,
            gas_used: GAS_USED,
        })
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ScriptError> {
        let state = self.state.borrow();
        let selector: [u8; 4] = calldata[..4].try_into().unwrap();
        if selector != IOwnable::ownerCall::SELECTOR {
            return Err(ScriptError::ContractInteraction(Self::revert("no such method")));
        }

        match state.contracts.get(&to) {
            Some(MockContract::Proxy { owner, .. }) | Some(MockContract::ProxyAdmin { owner }) => {
                Ok(Bytes::from(owner.abi_encode()))
            }
            _ => Ok(Bytes::new()),
        }
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError> {
        let state = self.state.borrow();
        Ok(if state.contracts.contains_key(&address) {
            Bytes::from_static(&[0x60, 0x80])
        } else {
            Bytes::new()
        })
    }

    async fn storage_at(&self, address: Address, slot: U256) -> Result<B256, ScriptError> {
        let admin_slot = parse_storage_slot(PROXY_ADMIN_STORAGE_SLOT)?;
        let implementation_slot = parse_storage_slot(PROXY_IMPLEMENTATION_STORAGE_SLOT)?;

        let state = self.state.borrow();
        let value = match state.contracts.get(&address) {
            Some(MockContract::Proxy { admin, .. }) if slot == admin_slot => *admin,
            Some(MockContract::Proxy { implementation, .. }) if slot == implementation_slot => {
                *implementation
            }
            _ => Address::ZERO,
        };

        Ok(value.into_word())
    }
}

/// Scratch directories and a mock chain for a single test
pub struct TestSetup {
    /// The scratch directory, removed on drop
    pub dir: TempDir,
    /// The mock chain
    pub chain: MockChain,
    /// The artifacts under the scratch directory
    pub artifacts: ArtifactStore,
    /// The deployment records under the scratch directory
    pub deployments: DeploymentStore,
}

impl TestSetup {
    /// Set up artifacts for the proxy, `ERC721`, and `NFT`
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let setup = Self {
            chain: MockChain::new(),
            artifacts: ArtifactStore::new(dir.path().join("artifacts")),
            deployments: DeploymentStore::new(dir.path().join("deployments"), "localhost"),
            dir,
        };

        setup.write_artifact("TransparentUpgradeableProxy", PROXY_BYTECODE, json!([]));
        setup.write_artifact("ERC721", ERC721_BYTECODE, initializer_abi());
        setup.write_artifact("NFT", NFT_BYTECODE, initializer_abi());
        setup
    }

    /// Write a Hardhat-style artifact
    pub fn write_artifact(&self, name: &str, bytecode: &str, abi: serde_json::Value) {
        let dir = self
            .artifacts_dir()
            .join("contracts")
            .join(format!("{name}.sol"));
        fs::create_dir_all(&dir).unwrap();

        let artifact = json!({
            "contractName": name,
            "abi": abi,
            "bytecode": bytecode,
        });
        fs::write(dir.join(format!("{name}.json")), artifact.to_string()).unwrap();
    }

    /// The root of the artifacts
    pub fn artifacts_dir(&self) -> PathBuf {
        self.dir.path().join("artifacts")
    }

    /// The root of the deployment records, holding a directory per network
    pub fn deployments_dir(&self) -> PathBuf {
        self.dir.path().join("deployments")
    }

    /// The environment the tasks run against
    pub fn env(&self) -> DeploymentEnv<'_, MockChain> {
        DeploymentEnv {
            client: &self.chain,
            artifacts: &self.artifacts,
            deployments: &self.deployments,
            proxy_admin_owner: None,
            log: true,
            auto_mine: true,
        }
    }
}

/// The ABI of `initialize(address owner, address minter)`
pub fn initializer_abi() -> serde_json::Value {
    json!([{
        "type": "function",
        "name": "initialize",
        "inputs": [
            { "name": "owner", "type": "address", "internalType": "address" },
            { "name": "minter", "type": "address", "internalType": "address" }
        ],
        "outputs": [],
        "stateMutability": "nonpayable"
    }])
}
