//! The deployment task: deploy a contract behind a proxy, then hand its
//! ownership over

use alloy_primitives::Address;
use tracing::info;

use crate::{
    artifacts::ArtifactStore,
    client::ChainClient,
    contract::get_contract,
    deployer::deploy,
    deployments::DeploymentStore,
    errors::ScriptError,
    types::DeploymentRequest,
};

/// Everything a deployment task runs against
pub struct DeploymentEnv<'a, C> {
    /// The client transactions are sent through, signing as the deployer
    pub client: &'a C,
    /// The compiled contracts
    pub artifacts: &'a ArtifactStore,
    /// The deployment records of the target network
    pub deployments: &'a DeploymentStore,
    /// The owner of the proxy admin, the deployer if unset
    pub proxy_admin_owner: Option<Address>,
    /// Whether to log each deployment transaction
    pub log: bool,
    /// Whether to request a block be mined after each transaction
    pub auto_mine: bool,
}

/// Deploy `contract_name` behind a transparent proxy initialized with
/// `initialize(owner, minter)`, then transfer its ownership to `owner`.
///
/// Any failure aborts the task. A failed ownership transfer leaves the
/// contract deployed and owned by the deployer.
///
/// The task departs from a strictly linear deploy-then-transfer run: the
/// transfer is skipped when `owner()` already returns `owner`. A rerun after a
/// successful run therefore succeeds, where an unconditional transfer from
/// the deployer would revert.
pub async fn run_deployment<C: ChainClient>(
    env: &DeploymentEnv<'_, C>,
    contract_name: &str,
    owner: Address,
    minter: Address,
) -> Result<(), ScriptError> {
    let deployer = env.client.sender();
    let request = DeploymentRequest::new(contract_name, deployer, owner, minter);
    let options = request.deploy_options(env.proxy_admin_owner, env.log, env.auto_mine);

    deploy(
        env.client,
        env.artifacts,
        env.deployments,
        &request.contract_name,
        &options,
    )
    .await?;

    let contract = get_contract(env.client, env.deployments, &request.contract_name, deployer)?;

    let current_owner = contract.owner().await?;
    if current_owner == request.new_owner {
        info!(
            "{}: already owned by {:#x}",
            request.contract_name, request.new_owner
        );
        return Ok(());
    }

    contract
        .transfer_ownership(request.new_owner, env.auto_mine)
        .await?;

    Ok(())
}
