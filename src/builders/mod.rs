//! Strategy-specific guard builders
//!
//! One builder family per program owner, plus the owner-agnostic
//! content-digest fallback:
//! - **system**: lamport balance + ownership guards
//! - **token**: token-account and mint guards for both token programs
//! - **stake**: stake state + authority guards
//! - **loader**: upgradeable-loader authority guards
//! - **hash_verify**: keccak digest over raw bytes, any owner
//! - **util**: tolerance-band math
//!
//! [`build_account_guards`] is the dispatch table over
//! (owner, subtype, strategy). It is a single flat match so the legal
//! combinations stay auditable in one place; every pairing without an
//! implemented builder falls through to an explicit
//! `UnsupportedGuardCombination` error. Silently weakening a guard is a
//! worse failure mode than refusing to build the transaction.

use solana_sdk::instruction::Instruction;

use crate::errors::GuardInjectError;
use crate::guard::LogLevel;
use crate::resolver::ResolvedAccount;
use crate::strategy::Strategy;

pub mod hash_verify;
pub mod loader;
pub mod stake;
pub mod system;
pub mod token;
mod util;

pub use util::tolerance_range;

/// Build the guard instructions for one resolved account under one
/// strategy
///
/// Returns zero or more instructions to append to the transaction.
/// `Strategy::None` is only legal for unknown-program accounts; every
/// other owner refusing to guard is a policy error, not a no-op.
pub fn build_account_guards(
    account: &ResolvedAccount,
    strategy: &Strategy,
    log_level: LogLevel,
) -> Result<Vec<Instruction>, GuardInjectError> {
    match (account, strategy) {
        // Content digest is uniform across every owner family.
        (_, Strategy::HashVerify { start, length }) => hash_verify::build(
            account.address(),
            account.account_info(),
            *start,
            *length,
            log_level,
        ),

        // System program, including accounts absent at simulation time.
        (ResolvedAccount::Unowned { address }, Strategy::Strict) => {
            system::build_strict(*address, None, log_level)
        }
        (
            ResolvedAccount::Unowned { address },
            Strategy::Tolerance { percent, inclusive },
        ) => system::build_tolerance(*address, None, *percent, *inclusive, log_level),
        (
            ResolvedAccount::System {
                address,
                account_info,
            },
            Strategy::Strict,
        ) => system::build_strict(*address, Some(account_info), log_level),
        (
            ResolvedAccount::System {
                address,
                account_info,
            },
            Strategy::Tolerance { percent, inclusive },
        ) => system::build_tolerance(*address, Some(account_info), *percent, *inclusive, log_level),

        // Token accounts, both token programs.
        (
            ResolvedAccount::TokenAccount {
                address,
                program_owner,
                state,
                ..
            },
            Strategy::Strict,
        ) => token::build_strict(*address, *program_owner, state, log_level),
        (
            ResolvedAccount::TokenAccount {
                address,
                program_owner,
                state,
                ..
            },
            Strategy::Tolerance { percent, inclusive },
        ) => token::build_tolerance(
            *address,
            *program_owner,
            state,
            *percent,
            *inclusive,
            log_level,
        ),

        // Mints: strict only.
        (ResolvedAccount::Mint { address, state, .. }, Strategy::Strict) => {
            token::build_mint_strict(*address, state, log_level)
        }

        // Stake: strict only.
        (
            ResolvedAccount::Stake {
                address,
                state,
                account_info,
            },
            Strategy::Strict,
        ) => stake::build_strict(*address, state, account_info, log_level),

        // Upgradeable loader: strict only.
        (ResolvedAccount::Loader { address, state, .. }, Strategy::Strict) => {
            loader::build_strict(*address, state, log_level)
        }

        // Unknown-program accounts may legitimately opt out of guarding.
        (ResolvedAccount::Unknown { .. }, Strategy::None) => Ok(Vec::new()),

        // Everything else has no implemented builder.
        (account, strategy) => Err(GuardInjectError::unsupported_combination(
            account.program_owner(),
            account.account_type(),
            strategy.name(),
            account.address(),
        )),
    }
}
