//! Utilities for the deploy scripts.

use std::str::FromStr;

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use itertools::Itertools;
use tracing_subscriber::EnvFilter;

use crate::{
    constants::{DEFAULT_LOG_FILTER, DEPLOY_TASKS, NUM_BYTES_ADDRESS, NUM_BYTES_STORAGE_SLOT},
    errors::ScriptError,
    types::DeployTask,
};

/// Sets up the global tracing subscriber, filtered by `RUST_LOG`
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Parses a hex address given as configuration input.
///
/// Only well-formed 20-byte addresses are accepted.
pub fn parse_address(address: &str) -> Result<Address, ScriptError> {
    Address::from_str(address.trim())
        .map_err(|e| ScriptError::InvalidAddress(format!("{address}: {e}")))
}

/// Parses a storage slot constant
pub fn parse_storage_slot(slot: &str) -> Result<U256, ScriptError> {
    U256::from_str(slot).map_err(|e| ScriptError::ContractInteraction(e.to_string()))
}

/// Extracts the address stored right-aligned in a storage word
pub fn address_from_storage_word(word: B256) -> Address {
    Address::from_slice(&word[NUM_BYTES_STORAGE_SLOT - NUM_BYTES_ADDRESS..NUM_BYTES_STORAGE_SLOT])
}

/// The hash by which deployed bytecode is compared across runs
pub fn bytecode_hash(bytecode: &Bytes) -> B256 {
    keccak256(bytecode)
}

/// Resolves deployment tags into the tasks to run, in table order.
///
/// No tags selects every task. Duplicate tags are ignored.
pub fn select_tasks(tags: &[String]) -> Result<Vec<DeployTask>, ScriptError> {
    if tags.is_empty() {
        return Ok(DEPLOY_TASKS.to_vec());
    }

    if let Some(unknown) = tags
        .iter()
        .find(|tag| !DEPLOY_TASKS.iter().any(|task| task.tag == tag.as_str()))
    {
        return Err(ScriptError::UnknownTag(unknown.clone()));
    }

    let selected = tags.iter().unique().collect_vec();
    Ok(DEPLOY_TASKS
        .iter()
        .filter(|task| selected.iter().any(|tag| tag.as_str() == task.tag))
        .copied()
        .collect())
}
