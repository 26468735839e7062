//! Error types for the guard-injection pipeline
//!
//! This module provides the error taxonomy for the whole injection
//! lifecycle. Errors are designed to be:
//! - Informative: every variant carries the account address and owner
//!   context needed to diagnose a refused transaction
//! - Conservative: there is no local recovery anywhere in the pipeline;
//!   a partially guarded transaction is worse than no transaction at all
//! - Observable: `category()` provides stable labels for metrics

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::resolver::ProgramOwner;

/// Error type covering the entire guard-injection lifecycle
///
/// Any of these aborts the pipeline immediately. No partial result is
/// ever returned and no strategy is ever silently downgraded.
#[derive(Error, Debug)]
pub enum GuardInjectError {
    /// The chain rejected the simulated transaction
    ///
    /// Propagated verbatim with the simulation diagnostic. Guards are
    /// derived from simulated post-state, so there is nothing useful to
    /// build from a failed simulation.
    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    /// The transport returned a different number of account snapshots
    /// than requested
    ///
    /// This indicates an RPC/protocol inconsistency and must not be
    /// tolerated: a missing snapshot would leave an account unguarded.
    #[error("Simulation returned {actual} account snapshots, expected {expected}")]
    SimulationAccountCountMismatch {
        /// Number of accounts requested from simulation
        expected: usize,
        /// Number of snapshots actually returned
        actual: usize,
    },

    /// Account data length matches no known layout for the claimed owner
    #[error("Invalid account size for {owner} account {address}: {size} bytes")]
    InvalidAccountSize {
        /// Program owner the account claimed
        owner: ProgramOwner,
        /// The account in question
        address: Pubkey,
        /// Observed data length
        size: usize,
    },

    /// Account bytes decoded to no known shape for the claimed owner
    #[error("Invalid account type for {owner} account {address}: {detail}")]
    InvalidAccountType {
        owner: ProgramOwner,
        address: Pubkey,
        /// What the decoder saw (discriminator byte, decode failure, ...)
        detail: String,
    },

    /// The account shape is recognized but has no guard path yet
    ///
    /// Covers token multisigs, Token-2022 accounts shorter than the base
    /// token-account layout, and upgradeable-loader `Program` /
    /// `Uninitialized` states. Classifying an account the pipeline cannot
    /// guard must never be silently downgraded to "no guard".
    #[error("{owner} account {address} is not yet supported: {detail}")]
    UnsupportedAccountShape {
        owner: ProgramOwner,
        address: Pubkey,
        detail: String,
    },

    /// Caller policy has no selector for an owner present in the transaction
    #[error("No strategy defined for program owner {owner}")]
    MissingStrategyForOwner { owner: ProgramOwner },

    /// A structurally valid (owner, subtype, strategy) pairing has no
    /// implemented builder
    #[error("Unimplemented strategy {strategy} for {owner} {account_type} {address}")]
    UnsupportedGuardCombination {
        owner: ProgramOwner,
        /// Account subtype within the owner family ("account", "mint", ...)
        account_type: &'static str,
        /// Strategy name as resolved from policy
        strategy: &'static str,
        address: Pubkey,
    },

    /// Hash-verify was requested on an account with no byte payload
    #[error("Account info is missing for account {address}")]
    AccountInfoMissing { address: Pubkey },

    /// RPC/transport-layer failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Message decompile/recompile failure
    #[error("Message compile error: {0}")]
    Compile(String),

    /// Internal invariant violation or unexpected state
    #[error("Internal error: {0}")]
    Internal(String),

    /// Wrapped error from external crates
    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl GuardInjectError {
    /// Check if this error is potentially retryable
    ///
    /// The pipeline itself never retries; this is a hint for callers that
    /// own the retry policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Get the error category for metrics and observability
    pub fn category(&self) -> &'static str {
        match self {
            Self::SimulationFailed(_) => "simulation",
            Self::SimulationAccountCountMismatch { .. } => "simulation",
            Self::InvalidAccountSize { .. } => "classification",
            Self::InvalidAccountType { .. } => "classification",
            Self::UnsupportedAccountShape { .. } => "classification",
            Self::MissingStrategyForOwner { .. } => "policy",
            Self::UnsupportedGuardCombination { .. } => "builder",
            Self::AccountInfoMissing { .. } => "builder",
            Self::Transport(_) => "transport",
            Self::Compile(_) => "compile",
            Self::Internal(_) => "internal",
            Self::External(_) => "external",
        }
    }
}

// Convenience constructors for common error scenarios
impl GuardInjectError {
    /// Create a simulation failure error
    pub fn simulation_failed(reason: impl Into<String>) -> Self {
        Self::SimulationFailed(reason.into())
    }

    /// Create a transport error
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport(reason.into())
    }

    /// Create a compile error
    pub fn compile(reason: impl Into<String>) -> Self {
        Self::Compile(reason.into())
    }

    /// Create an internal error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }

    /// Create an unsupported-combination error for a dispatch-table miss
    pub fn unsupported_combination(
        owner: ProgramOwner,
        account_type: Option<&'static str>,
        strategy: &'static str,
        address: Pubkey,
    ) -> Self {
        Self::UnsupportedGuardCombination {
            owner,
            account_type: account_type.unwrap_or("account"),
            strategy,
            address,
        }
    }
}
