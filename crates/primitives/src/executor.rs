//! Executor-related primitives

use strum_macros::EnumString;

/// What to do when an atomic batch reverts on-chain
#[derive(Clone, Copy, Debug, Default, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "kebab_case")]
pub enum OnRevert {
    /// Ask the operator whether to send the calls one by one
    #[default]
    #[strum(serialize = "ask")]
    AskOperator,
    /// Always fall back to sending the calls one by one
    #[strum(serialize = "always")]
    AlwaysFallback,
    /// Report the revert and stop
    #[strum(serialize = "never")]
    NeverFallback,
}
