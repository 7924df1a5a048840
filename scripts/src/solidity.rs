//! Definitions of Solidity functions called after deployment

use alloy_sol_types::sol;

sol! {
    interface IOwnable {
        function owner() external view returns (address);
        function transferOwnership(address newOwner) external;
    }
}

sol! {
    interface IProxyAdmin {
        function owner() external view returns (address);
        function upgradeAndCall(address proxy, address implementation, bytes memory data) external payable;
    }
}
