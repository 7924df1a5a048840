//! Constants used in the deploy scripts

use crate::types::DeployTask;

/// The deployment tasks known to the scripts, in the order they run when no
/// tags are selected
pub const DEPLOY_TASKS: [DeployTask; 2] = [
    DeployTask {
        tag: "ERC721",
        contract_name: "ERC721",
    },
    DeployTask {
        tag: "NFT",
        contract_name: "NFT",
    },
];

/// The name of the initializer method executed through the proxy on deployment
pub const INITIALIZER_METHOD_NAME: &str = "initialize";

/// The artifact name of the TransparentUpgradeableProxy contract
///
/// Expected to be compiled from https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/transparent/TransparentUpgradeableProxy.sol
pub const TRANSPARENT_PROXY_ARTIFACT: &str = "TransparentUpgradeableProxy";

/// The storage slot containing the proxy admin contract address in the upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#admin-address
pub const PROXY_ADMIN_STORAGE_SLOT: &str =
    "0xb53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103";

/// The storage slot containing the implementation contract address in the upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const PROXY_IMPLEMENTATION_STORAGE_SLOT: &str =
    "0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc";

/// The number of bytes stored in a single storage slot
pub const NUM_BYTES_STORAGE_SLOT: usize = 32;

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The RPC method used to mine a block on development nodes
pub const EVM_MINE_METHOD: &str = "evm_mine";

/// The default RPC URL, a local development node
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The default directory in which compilation artifacts are searched for
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The default directory in which deployment records are kept
pub const DEFAULT_DEPLOYMENTS_DIR: &str = "deployments";

/// The extension of artifact and deployment record files
pub const JSON_EXTENSION: &str = "json";

/// The marker the Solidity compiler leaves in bytecode for unlinked libraries
pub const LIBRARY_PLACEHOLDER_MARKER: &str = "__";

/// The default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";
