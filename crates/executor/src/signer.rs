use crate::{
    collaborators::{UiHandler, WalletService},
    errors::ExecutionError,
};
use reclaim_primitives::Wallet;
use tracing::info;

/// Unlocks the named key, prompting the operator for its password
///
/// # Arguments
/// * `wallets` - The [WalletService](WalletService) holding the key
/// * `ui` - The [UiHandler](UiHandler) used for the password prompt
/// * `name` - Name of the key
///
/// # Returns
/// * `Wallet` - The unlocked signer
pub async fn acquire_signer(
    wallets: &dyn WalletService,
    ui: &dyn UiHandler,
    name: &str,
) -> eyre::Result<Wallet> {
    if !wallets.has_private_key(name) {
        return Err(ExecutionError::Collaborator {
            collaborator: "wallet service",
            inner: format!("no private key named {name}"),
        }
        .into());
    }

    let password = ui
        .get_user_input(
            &format!("Password for wallet {name}"),
            &|input: &str| !input.is_empty(),
            "Password cannot be empty",
        )
        .await?;

    let wallet = wallets.create_signer(name, &password).await.map_err(|err| {
        ExecutionError::Collaborator { collaborator: "wallet service", inner: err.to_string() }
    })?;

    info!("Using signer {:?}", wallet.address());

    Ok(wallet)
}
