//! Implementations of the deploy script subcommands

use std::path::Path;

use itertools::Itertools;
use tracing::{info, warn};

use crate::{
    artifacts::ArtifactStore,
    cli::{DeployArgs, InspectArgs},
    client::ChainClient,
    contract::get_contract,
    deployments::DeploymentStore,
    errors::ScriptError,
    runner::{run_deployment, DeploymentEnv},
    utils::{parse_address, select_tasks},
};

/// Run the selected deployment tasks in order, stopping at the first failure
pub async fn deploy_tasks(
    args: DeployArgs,
    client: &impl ChainClient,
    artifacts_dir: &Path,
    deployments_dir: &Path,
    network: Option<String>,
) -> Result<(), ScriptError> {
    // Parse all configuration before anything is sent
    let owner = parse_address(&args.owner)?;
    let minter = args
        .minter
        .as_deref()
        .map(parse_address)
        .transpose()?
        .unwrap_or(owner);
    let proxy_admin_owner = args
        .proxy_admin_owner
        .as_deref()
        .map(parse_address)
        .transpose()?;
    let tasks = select_tasks(&args.tags)?;

    let network = resolve_network(client, network).await?;
    let artifacts = ArtifactStore::new(artifacts_dir);
    let deployments = DeploymentStore::new(deployments_dir, &network);
    let env = DeploymentEnv {
        client,
        artifacts: &artifacts,
        deployments: &deployments,
        proxy_admin_owner,
        log: !args.quiet,
        auto_mine: !args.no_auto_mine,
    };

    info!(
        "Running [{}] on network {} as {:#x}",
        tasks.iter().map(|task| task.tag).join(", "),
        network,
        client.sender()
    );
    for task in tasks {
        info!("Running task {}", task.tag);
        run_deployment(&env, task.contract_name, owner, minter).await?;
    }

    Ok(())
}

/// Print the recorded deployments of the selected tasks
pub async fn inspect(
    args: InspectArgs,
    client: &impl ChainClient,
    deployments_dir: &Path,
    network: Option<String>,
) -> Result<(), ScriptError> {
    let tasks = select_tasks(&args.tags)?;
    let network = resolve_network(client, network).await?;
    let deployments = DeploymentStore::new(deployments_dir, &network);

    for task in tasks {
        let Some(record) = deployments.load(task.contract_name)? else {
            println!("{}: not deployed on {}", task.contract_name, network);
            continue;
        };

        let contract = get_contract(client, &deployments, task.contract_name, client.sender())?;
        let owner = contract.owner().await?;
        let implementation = contract.implementation().await?;
        if implementation != record.implementation {
            warn!(
                "{}: proxy points at {:#x}, recorded implementation is {:#x}",
                task.contract_name, implementation, record.implementation
            );
        }

        println!("{}:", task.contract_name);
        println!("\tProxy: {:#x}", record.address);
        println!("\tImplementation: {:#x}", implementation);
        println!("\tProxy admin: {:#x}", record.proxy_admin);
        println!("\tOwner: {:#x}", owner);
    }

    Ok(())
}

/// The name under which the network's records are kept, defaulting to the chain ID
async fn resolve_network(
    client: &impl ChainClient,
    network: Option<String>,
) -> Result<String, ScriptError> {
    match network {
        Some(network) => Ok(network),
        None => Ok(client.chain_id().await?.to_string()),
    }
}
