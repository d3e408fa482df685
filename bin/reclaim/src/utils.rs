use dirs::home_dir;
use ethers::types::{Address, U256};
use expanded_pathbuf::ExpandedPathBuf;
use pin_utils::pin_mut;
use reclaim_primitives::{constants::keystore, OnRevert};
use std::{future::Future, str::FromStr, time::Duration};
use tracing::{info, warn};

/// Unwrap path or returns the default keystore directory in the home directory
pub fn unwrap_path_or_home(path: Option<ExpandedPathBuf>) -> eyre::Result<ExpandedPathBuf> {
    if let Some(path) = path {
        Ok(path)
    } else {
        home_dir()
            .map(|h| h.join(keystore::DEFAULT_DIR))
            .ok_or_else(|| eyre::eyre!("Get Home directory error"))
            .map(ExpandedPathBuf)
    }
}

/// Parses address from string
pub fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_str(s).map_err(|_| format!("String {s} is not a valid address"))
}

/// Parses U256 from string
pub fn parse_u256(s: &str) -> Result<U256, String> {
    U256::from_str_radix(s, 10).map_err(|_| format!("String {s} is not a valid U256"))
}

/// Parses OnRevert from string
pub fn parse_on_revert(s: &str) -> Result<OnRevert, String> {
    OnRevert::from_str(s).map_err(|_| format!("String {s} is not a valid OnRevert"))
}

/// Parses a duration given in milliseconds
pub fn parse_duration(duration: &str) -> Result<Duration, String> {
    let millis: u64 = duration.parse().map_err(|_| format!("{duration} must be unsigned int"))?;
    Ok(Duration::from_millis(millis))
}

/// Runs the future to completion or until:
/// - `ctrl-c` is received.
/// - `SIGTERM` is received (unix only).
///
/// An interruption is reported as an error.
pub async fn run_until_ctrl_c<F>(fut: F) -> eyre::Result<()>
where
    F: Future<Output = eyre::Result<()>>,
{
    let ctrl_c = async {
        tokio::signal::ctrl_c().await?;
        info!("Received ctrl-c signal.");
        Ok::<_, std::io::Error>(())
    };

    let mut stream = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let sigterm = async move {
        stream.recv().await;
        info!("Received SIGTERM signal.");
        Ok::<_, std::io::Error>(())
    };

    run_until_signal(fut, async move {
        tokio::select! {
            res = ctrl_c => res,
            res = sigterm => res,
        }
    })
    .await
}

/// Runs the future to completion unless the signal resolves first
pub async fn run_until_signal<F, S>(fut: F, signal: S) -> eyre::Result<()>
where
    F: Future<Output = eyre::Result<()>>,
    S: Future<Output = std::io::Result<()>>,
{
    pin_mut!(fut, signal);

    tokio::select! {
        res = fut => res,
        res = signal => {
            res?;
            warn!(
                "Interrupted. Transactions already submitted may still be mined, check the \
                 submitted hashes in the log before running the bundle again"
            );
            Err(eyre::eyre!("Interrupted before the bundle was fully processed"))
        }
    }
}
