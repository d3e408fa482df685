use crate::utils::run_until_ctrl_c;
use clap::{value_parser, Parser, Subcommand};

pub mod args;
pub mod commands;

/// The main Reclaim CLI interface
#[derive(Debug, Parser)]
#[command(author, version, about = "Reclaim", long_about = None)]
pub struct Cli {
    /// The command to execute
    #[clap(subcommand)]
    command: Commands,

    /// The verbosity level
    #[clap(long, short, global = true, default_value_t = 2, value_parser = value_parser!(u8).range(..=4))]
    verbosity: u8,
}

impl Cli {
    /// Get the log level based on the verbosity level
    pub fn get_log_level(&self) -> String {
        match self.verbosity {
            0 => "error",
            1 => "warn",
            2 => "info",
            3 => "debug",
            _ => "trace",
        }
        .into()
    }

    /// Log filter composed of `RUST_LOG` and the verbosity level
    pub fn log_filter(&self, rust_log: Option<String>) -> String {
        let level = self.get_log_level();
        let crates = format!("reclaim={level},reclaim_executor={level},reclaim_primitives={level}");
        match rust_log {
            Some(val) => format!("{val},{crates}"),
            None => crates,
        }
    }
}

/// Commands to be executed
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Execute a bundle from the wallet or propose it to a Safe
    #[command(name = "execute")]
    Execute(Box<commands::ExecuteCommand>),

    /// Create an encrypted key in the keystore directory
    #[command(name = "create-wallet")]
    CreateWallet(commands::CreateWalletCommand),
}

pub fn run() -> eyre::Result<()> {
    let cli = Cli::parse();

    let filter = cli.log_filter(std::env::var("RUST_LOG").ok());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    let task = async move {
        match cli.command {
            Commands::Execute(command) => command.execute().await,
            Commands::CreateWallet(command) => command.execute().await,
        }
    };

    rt.block_on(run_until_ctrl_c(task))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_and_rust_log() {
        let cli = Cli::try_parse_from(vec!["reclaim", "-v", "3", "create-wallet", "--name", "op"])
            .unwrap();
        assert_eq!(cli.get_log_level(), "debug");
        assert_eq!(
            cli.log_filter(Some("ethers=warn".into())),
            "ethers=warn,reclaim=debug,reclaim_executor=debug,reclaim_primitives=debug"
        );

        let cli = Cli::try_parse_from(vec!["reclaim", "create-wallet", "--name", "op"]).unwrap();
        assert_eq!(
            cli.log_filter(None),
            "reclaim=info,reclaim_executor=info,reclaim_primitives=info"
        );

        assert!(Cli::try_parse_from(vec!["reclaim", "-v", "5", "create-wallet", "--name", "op"])
            .is_err());
    }

    #[test]
    fn execute_command() {
        let cli = Cli::try_parse_from(vec![
            "reclaim",
            "execute",
            "--bundle",
            "bundle.json",
            "--wallet",
            "operator",
            "--atomic-batch",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Execute(_)));
    }
}
