//! Account classification
//!
//! Maps a raw account snapshot (owner pubkey + bytes) to a tagged
//! [`ResolvedAccount`] variant. Classification is closed and owner-driven:
//! the owning program id is authoritative, and size or leading tag bytes
//! are the only intra-owner discriminators. An account with no on-chain
//! presence is always classified as a system-program account with no
//! account info, covering accounts expected to be created mid-transaction.
//!
//! ## Architecture
//!
//! - **token**: SPL-Token and Token-2022 byte decoding (size + extension
//!   discriminator dispatch)
//! - **stake**: stake-program state decoding (leading tag)
//! - **loader**: upgradeable-loader state decoding (leading tag)
//!
//! Shapes the pipeline cannot guard (token multisigs, loader `Program` /
//! `Uninitialized` states, Token-2022 accounts below the base layout) are
//! surfaced as explicit errors at classification time, never silently
//! downgraded.

use serde::{Deserialize, Serialize};
use solana_sdk::{bpf_loader_upgradeable, pubkey::Pubkey, system_program};

use crate::errors::GuardInjectError;
use crate::transport::AccountSnapshot;

mod loader;
mod stake;
mod token;

pub use loader::LoaderAccountState;
pub use stake::StakeAccountState;
pub use token::{MintState, TokenAccountState};

/// Program that owns an account, determining which decoder and guard
/// builder family applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramOwner {
    SystemProgram,
    TokenProgram,
    Token2022Program,
    StakeProgram,
    UpgradeableLoaderProgram,
    UnknownProgram,
}

impl std::fmt::Display for ProgramOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::SystemProgram => "SystemProgram",
            Self::TokenProgram => "TokenProgram",
            Self::Token2022Program => "Token2022Program",
            Self::StakeProgram => "StakeProgram",
            Self::UpgradeableLoaderProgram => "UpgradeableLoaderProgram",
            Self::UnknownProgram => "UnknownProgram",
        };
        f.write_str(name)
    }
}

/// A classified account snapshot
///
/// Tagged by program owner, with secondary subtype tags for owners with
/// more than one account shape. Constructed once per simulated snapshot
/// and immutable afterwards; the subtype and decoded state are always
/// consistent with the owner tag.
#[derive(Debug, Clone)]
pub enum ResolvedAccount {
    /// Account absent at snapshot time (system-owned by convention)
    Unowned { address: Pubkey },
    /// System-program account
    System {
        address: Pubkey,
        account_info: AccountSnapshot,
    },
    /// SPL-Token or Token-2022 token account
    TokenAccount {
        address: Pubkey,
        /// `TokenProgram` or `Token2022Program`
        program_owner: ProgramOwner,
        state: TokenAccountState,
        account_info: AccountSnapshot,
    },
    /// SPL-Token or Token-2022 mint
    Mint {
        address: Pubkey,
        /// `TokenProgram` or `Token2022Program`
        program_owner: ProgramOwner,
        state: MintState,
        account_info: AccountSnapshot,
    },
    /// Stake-program account, any of the four stake states
    Stake {
        address: Pubkey,
        state: StakeAccountState,
        account_info: AccountSnapshot,
    },
    /// Upgradeable-loader buffer or program-data account
    Loader {
        address: Pubkey,
        state: LoaderAccountState,
        account_info: AccountSnapshot,
    },
    /// Account owned by a program the pipeline has no decoder for
    ///
    /// A legitimate, guardable state (via hash-verify), not an error.
    Unknown {
        address: Pubkey,
        account_info: AccountSnapshot,
    },
}

impl ResolvedAccount {
    /// The account's address
    pub fn address(&self) -> Pubkey {
        match self {
            Self::Unowned { address }
            | Self::System { address, .. }
            | Self::TokenAccount { address, .. }
            | Self::Mint { address, .. }
            | Self::Stake { address, .. }
            | Self::Loader { address, .. }
            | Self::Unknown { address, .. } => *address,
        }
    }

    /// The owner family this account was classified under
    pub fn program_owner(&self) -> ProgramOwner {
        match self {
            Self::Unowned { .. } | Self::System { .. } => ProgramOwner::SystemProgram,
            Self::TokenAccount { program_owner, .. } | Self::Mint { program_owner, .. } => {
                *program_owner
            }
            Self::Stake { .. } => ProgramOwner::StakeProgram,
            Self::Loader { .. } => ProgramOwner::UpgradeableLoaderProgram,
            Self::Unknown { .. } => ProgramOwner::UnknownProgram,
        }
    }

    /// The subtype tag within the owner family, if the owner has one
    pub fn account_type(&self) -> Option<&'static str> {
        match self {
            Self::Unowned { .. } | Self::System { .. } | Self::Unknown { .. } => None,
            Self::TokenAccount { .. } => Some("account"),
            Self::Mint { .. } => Some("mint"),
            Self::Stake { state, .. } => Some(state.type_name()),
            Self::Loader { state, .. } => Some(state.type_name()),
        }
    }

    /// The raw snapshot this classification was derived from, when the
    /// account exists
    pub fn account_info(&self) -> Option<&AccountSnapshot> {
        match self {
            Self::Unowned { .. } => None,
            Self::System { account_info, .. }
            | Self::TokenAccount { account_info, .. }
            | Self::Mint { account_info, .. }
            | Self::Stake { account_info, .. }
            | Self::Loader { account_info, .. }
            | Self::Unknown { account_info, .. } => Some(account_info),
        }
    }
}

/// Classify an account snapshot
///
/// Dispatches on the owning program id. Returns an error for account
/// shapes that are recognized but cannot be guarded yet; returning a
/// wrong variant is never an option.
pub fn resolve_account(
    address: Pubkey,
    snapshot: Option<AccountSnapshot>,
) -> Result<ResolvedAccount, GuardInjectError> {
    let Some(account_info) = snapshot else {
        return Ok(ResolvedAccount::Unowned { address });
    };

    if account_info.owner == system_program::id() {
        Ok(ResolvedAccount::System {
            address,
            account_info,
        })
    } else if account_info.owner == spl_token::id() {
        token::resolve_spl_token_account(address, account_info)
    } else if account_info.owner == spl_token_2022::id() {
        token::resolve_token_2022_account(address, account_info)
    } else if account_info.owner == bpf_loader_upgradeable::id() {
        loader::resolve_loader_account(address, account_info)
    } else if account_info.owner == solana_sdk::stake::program::id() {
        stake::resolve_stake_account(address, account_info)
    } else {
        Ok(ResolvedAccount::Unknown {
            address,
            account_info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(owner: Pubkey, data: Vec<u8>) -> AccountSnapshot {
        AccountSnapshot {
            lamports: 1_000_000,
            owner,
            data,
            executable: false,
        }
    }

    #[test]
    fn test_missing_account_resolves_as_unowned() {
        let address = Pubkey::new_unique();
        let resolved = resolve_account(address, None).expect("should classify");

        assert!(matches!(resolved, ResolvedAccount::Unowned { .. }));
        assert_eq!(resolved.program_owner(), ProgramOwner::SystemProgram);
        assert!(resolved.account_info().is_none());
        assert!(resolved.account_type().is_none());
    }

    #[test]
    fn test_system_owned_account() {
        let address = Pubkey::new_unique();
        let resolved = resolve_account(address, Some(snapshot(system_program::id(), vec![])))
            .expect("should classify");

        assert!(matches!(resolved, ResolvedAccount::System { .. }));
        assert_eq!(resolved.program_owner(), ProgramOwner::SystemProgram);
        assert!(resolved.account_info().is_some());
    }

    #[test]
    fn test_unknown_owner_is_guardable_not_error() {
        let address = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let resolved = resolve_account(address, Some(snapshot(owner, vec![7; 64])))
            .expect("should classify");

        assert!(matches!(resolved, ResolvedAccount::Unknown { .. }));
        assert_eq!(resolved.program_owner(), ProgramOwner::UnknownProgram);
    }

    #[test]
    fn test_address_accessor_is_stable() {
        let address = Pubkey::new_unique();
        let resolved = resolve_account(address, None).expect("should classify");
        assert_eq!(resolved.address(), address);
    }
}
