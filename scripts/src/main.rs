use clap::Parser;
use nft_deploy::{cli::Cli, client::setup_client, errors::ScriptError, utils::init_tracing};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        priv_key,
        rpc_url,
        artifacts,
        deployments,
        network,
        command,
    } = Cli::parse();

    init_tracing();

    let client = setup_client(&priv_key, &rpc_url).await?;

    command
        .run(&client, &artifacts, &deployments, network)
        .await
}
