//! Scripts for deploying the upgradeable NFT contracts behind transparent
//! proxies and handing their ownership over.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
pub mod client;
pub mod commands;
pub mod constants;
pub mod contract;
pub mod deployer;
pub mod deployments;
pub mod errors;
pub mod runner;
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub mod solidity;
pub mod types;
pub mod utils;
