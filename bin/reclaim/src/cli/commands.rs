use super::args::{CreateWalletArgs, ExecuteArgs};
use crate::execute::{create_wallet, execute_bundle};
use clap::Parser;
use ethers::providers::{Http, Provider, Ws};
use std::sync::Arc;

/// Execute a bundle from the wallet or propose it to a Safe
#[derive(Debug, Parser)]
pub struct ExecuteCommand {
    /// All execute args
    #[clap(flatten)]
    args: ExecuteArgs,
}

impl ExecuteCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        if self.args.chain.eth_client_address.starts_with("http") {
            let provider = Provider::<Http>::try_from(self.args.chain.eth_client_address.as_str())?
                .interval(self.args.chain.poll_interval);
            execute_bundle(self.args, Arc::new(provider)).await
        } else {
            let provider =
                Provider::<Ws>::connect(self.args.chain.eth_client_address.as_str()).await?;
            execute_bundle(self.args, Arc::new(provider)).await
        }
    }
}

/// Create an encrypted key in the keystore directory
#[derive(Debug, Parser)]
pub struct CreateWalletCommand {
    /// All create wallet args
    #[clap(flatten)]
    create_wallet: CreateWalletArgs,
}

impl CreateWalletCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        create_wallet(self.create_wallet).await
    }
}
