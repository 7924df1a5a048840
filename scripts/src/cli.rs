//! Definitions of CLI arguments and commands for deploy scripts

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::{
    client::ChainClient,
    commands::{deploy_tasks, inspect},
    constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_DIR, DEFAULT_RPC_URL},
    errors::ScriptError,
};

/// Deploy the upgradeable NFT contracts behind transparent proxies
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Private key of the deployer
    #[arg(short, long, env = "PKEY")]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Directory searched for compiled contract artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// Directory in which deployment records are kept
    #[arg(long, default_value = DEFAULT_DEPLOYMENTS_DIR)]
    pub deployments: PathBuf,

    /// Name of the network's deployment records, defaults to the chain ID
    #[arg(long, env = "NETWORK")]
    pub network: Option<String>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// The subcommands of the deploy scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the selected contracts and transfer their ownership
    Deploy(DeployArgs),
    /// Show the recorded deployments of the selected contracts
    Inspect(InspectArgs),
}

impl Command {
    /// Run the subcommand
    pub async fn run(
        self,
        client: &impl ChainClient,
        artifacts_dir: &Path,
        deployments_dir: &Path,
        network: Option<String>,
    ) -> Result<(), ScriptError> {
        match self {
            Command::Deploy(args) => {
                deploy_tasks(args, client, artifacts_dir, deployments_dir, network).await
            }
            Command::Inspect(args) => inspect(args, client, deployments_dir, network).await,
        }
    }
}

/// Deploy contracts behind a [`TransparentUpgradeableProxy`](https://docs.openzeppelin.com/contracts/5.x/api/proxy#transparent_proxy),
/// which itself deploys a `ProxyAdmin` contract.
///
/// Each proxy executes `initialize(owner, minter)` on deployment, after which
/// ownership of the contract is transferred to the owner.
#[derive(Args)]
pub struct DeployArgs {
    /// Address ownership of the contracts is transferred to
    #[arg(short, long, env = "OWNER_ADDRESS")]
    pub owner: String,

    /// Address of the minter, defaults to the owner
    #[arg(short, long, env = "MINTER_ADDRESS")]
    pub minter: Option<String>,

    /// Tags of the deployment tasks to run, all of them if omitted
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Owner of the proxy admin contracts, defaults to the deployer
    #[arg(long)]
    pub proxy_admin_owner: Option<String>,

    /// Do not request a block be mined after each transaction
    #[arg(long)]
    pub no_auto_mine: bool,

    /// Do not log each deployment transaction
    #[arg(short, long)]
    pub quiet: bool,
}

/// Show recorded deployments alongside their on-chain owner
#[derive(Args)]
pub struct InspectArgs {
    /// Tags of the deployments to show, all of them if omitted
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,
}
