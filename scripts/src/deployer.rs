//! Deployment of contracts behind a transparent upgradeable proxy.
//!
//! A deployment is recorded per network. Running a deployment again reuses
//! the recorded proxy when the implementation bytecode is unchanged, and
//! upgrades the proxy in place through its `ProxyAdmin` when it changed.
//! The initializer only ever runs when the proxy is first deployed.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{SolCall, SolValue};
use tracing::{info, warn};

use crate::{
    artifacts::{Artifact, ArtifactStore},
    client::ChainClient,
    constants::PROXY_ADMIN_STORAGE_SLOT,
    deployments::{DeploymentRecord, DeploymentStore},
    errors::ScriptError,
    solidity::IProxyAdmin,
    types::{DeployOptions, DeployResult, TxOutcome},
    utils::{address_from_storage_word, bytecode_hash, parse_storage_slot},
};

/// The suffix of the implementation contract's name in logs
const IMPLEMENTATION_SUFFIX: &str = "_Implementation";
/// The suffix of the proxy contract's name in logs
const PROXY_SUFFIX: &str = "_Proxy";

/// Deploy the named contract behind a proxy as configured by `options`,
/// executing the initializer through the proxy.
///
/// Resolves once every transaction sent is mined.
pub async fn deploy<C: ChainClient>(
    client: &C,
    artifacts: &ArtifactStore,
    deployments: &DeploymentStore,
    name: &str,
    options: &DeployOptions,
) -> Result<DeployResult, ScriptError> {
    if options.from != client.sender() {
        return Err(ScriptError::Unauthorized(format!(
            "cannot deploy from {:#x}, client signs as {:#x}",
            options.from,
            client.sender()
        )));
    }

    let artifact = artifacts.load(name)?;
    let proxy_artifact = artifacts.load(options.proxy.proxy_contract.artifact_name())?;
    // Fails on an initializer the ABI does not declare, before anything is sent
    artifact.initializer_calldata(&options.proxy.execute)?;

    let chain_id = client.chain_id().await?;
    if let Some(record) = deployments.load(name)? {
        if record.chain_id != chain_id {
            return Err(ScriptError::ReadDeployments(format!(
                "record for {name} is for chain {}, connected to chain {chain_id}",
                record.chain_id
            )));
        }

        let code = client.code_at(record.address).await?;
        if code.is_empty() {
            warn!(
                "{}: no code at recorded address {:#x}, deploying anew",
                name, record.address
            );
        } else if record.implementation_bytecode_hash == bytecode_hash(&artifact.bytecode) {
            if options.log {
                info!("reusing \"{}\" at {:#x}", name, record.address);
            }

            return Ok(DeployResult {
                address: record.address,
                implementation: record.implementation,
                proxy_admin: record.proxy_admin,
                newly_deployed: false,
            });
        } else {
            return upgrade(client, deployments, name, &artifact, record, options).await;
        }
    }

    deploy_proxy(
        client,
        deployments,
        name,
        &artifact,
        &proxy_artifact,
        chain_id,
        options,
    )
    .await
}

/// Deploy the implementation and a proxy executing the initializer
async fn deploy_proxy<C: ChainClient>(
    client: &C,
    deployments: &DeploymentStore,
    name: &str,
    artifact: &Artifact,
    proxy_artifact: &Artifact,
    chain_id: u64,
    options: &DeployOptions,
) -> Result<DeployResult, ScriptError> {
    let implementation = deploy_implementation(client, name, artifact, options).await?;

    // Proxy constructor arguments are `(logic, initialOwner, data)`, where
    // `initialOwner` becomes the owner of the proxy admin
    let admin_owner = options.proxy.owner.unwrap_or(options.from);
    let init_calldata = artifact.initializer_calldata(&options.proxy.execute)?;
    let constructor_args = (implementation, admin_owner, init_calldata).abi_encode_params();
    let init_code = [proxy_artifact.bytecode.as_ref(), constructor_args.as_slice()].concat();

    let proxy_name = format!("{name}{PROXY_SUFFIX}");
    let outcome = client
        .deploy_code(Bytes::from(init_code), options.auto_mine)
        .await?;
    let proxy = created_address(&proxy_name, &outcome)?;
    if options.log {
        log_deployment(&proxy_name, &outcome, proxy);
    }

    let proxy_admin = read_proxy_admin(client, proxy).await?;

    let record = DeploymentRecord {
        address: proxy,
        implementation,
        proxy_admin,
        proxy_contract: options.proxy.proxy_contract,
        transaction_hash: outcome.transaction_hash,
        chain_id,
        initializer: options.proxy.execute.clone(),
        implementation_bytecode_hash: bytecode_hash(&artifact.bytecode),
        abi: artifact.abi.clone(),
    };
    deployments.save(name, &record)?;

    Ok(DeployResult {
        address: proxy,
        implementation,
        proxy_admin,
        newly_deployed: true,
    })
}

/// Point an existing proxy at a newly deployed implementation
async fn upgrade<C: ChainClient>(
    client: &C,
    deployments: &DeploymentStore,
    name: &str,
    artifact: &Artifact,
    record: DeploymentRecord,
    options: &DeployOptions,
) -> Result<DeployResult, ScriptError> {
    let proxy_admin = read_proxy_admin(client, record.address).await?;

    let owner_calldata = Bytes::from(IProxyAdmin::ownerCall {}.abi_encode());
    let output = client.call(proxy_admin, owner_calldata).await?;
    let admin_owner = IProxyAdmin::ownerCall::abi_decode_returns(&output, true /* validate */)
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        ._0;
    if admin_owner != options.from {
        return Err(ScriptError::Unauthorized(format!(
            "cannot upgrade {name}: proxy admin {:#x} is owned by {:#x}",
            proxy_admin, admin_owner
        )));
    }

    let implementation = deploy_implementation(client, name, artifact, options).await?;

    let upgrade_calldata = IProxyAdmin::upgradeAndCallCall {
        proxy: record.address,
        implementation,
        data: Bytes::new(),
    }
    .abi_encode();
    let outcome = client
        .send_call(proxy_admin, Bytes::from(upgrade_calldata), options.auto_mine)
        .await?;
    if options.log {
        info!(
            "upgraded \"{}\" at {:#x} to implementation {:#x} (tx: {:#x})",
            name, record.address, implementation, outcome.transaction_hash
        );
    }

    let record = DeploymentRecord {
        implementation,
        proxy_admin,
        transaction_hash: outcome.transaction_hash,
        implementation_bytecode_hash: bytecode_hash(&artifact.bytecode),
        abi: artifact.abi.clone(),
        ..record
    };
    deployments.save(name, &record)?;

    Ok(DeployResult {
        address: record.address,
        implementation,
        proxy_admin,
        newly_deployed: true,
    })
}

/// Deploy the implementation contract from its creation bytecode
async fn deploy_implementation<C: ChainClient>(
    client: &C,
    name: &str,
    artifact: &Artifact,
    options: &DeployOptions,
) -> Result<Address, ScriptError> {
    let implementation_name = format!("{name}{IMPLEMENTATION_SUFFIX}");
    let outcome = client
        .deploy_code(artifact.bytecode.clone(), options.auto_mine)
        .await?;
    let implementation = created_address(&implementation_name, &outcome)?;
    if options.log {
        log_deployment(&implementation_name, &outcome, implementation);
    }

    Ok(implementation)
}

/// Get the proxy admin contract address.
///
/// This is the recommended way to get the proxy admin address:
/// <https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/ERC1967/ERC1967Utils.sol#L104-L106>
async fn read_proxy_admin<C: ChainClient>(
    client: &C,
    proxy: Address,
) -> Result<Address, ScriptError> {
    let slot = parse_storage_slot(PROXY_ADMIN_STORAGE_SLOT)?;
    let word = client.storage_at(proxy, slot).await?;
    Ok(address_from_storage_word(word))
}

/// The address of the contract created by a deployment transaction
fn created_address(name: &str, outcome: &TxOutcome) -> Result<Address, ScriptError> {
    outcome.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!(
            "{name}: transaction {:#x} created no contract",
            outcome.transaction_hash
        ))
    })
}

/// Log a mined deployment
fn log_deployment(name: &str, outcome: &TxOutcome, address: Address) {
    info!(
        "deploying \"{}\" (tx: {:#x})...: deployed at {:#x} with {} gas",
        name, outcome.transaction_hash, address, outcome.gas_used
    );
}
