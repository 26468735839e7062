//! Upgradeable-loader account decoding
//!
//! Loader accounts carry a leading u32 state tag. `Buffer` and
//! `ProgramData` are the mutable states worth guarding and are supported;
//! `Program` and `Uninitialized` have no guard path yet and fail loudly.

use solana_sdk::bpf_loader_upgradeable::UpgradeableLoaderState;
use solana_sdk::pubkey::Pubkey;

use crate::errors::GuardInjectError;
use crate::resolver::{ProgramOwner, ResolvedAccount};
use crate::transport::AccountSnapshot;

/// Decoded upgradeable-loader state, restricted to the guardable shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderAccountState {
    Buffer {
        authority_address: Option<Pubkey>,
    },
    ProgramData {
        slot: u64,
        upgrade_authority_address: Option<Pubkey>,
    },
}

impl LoaderAccountState {
    /// Subtype tag used in dispatch and diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Buffer { .. } => "buffer",
            Self::ProgramData { .. } => "programData",
        }
    }
}

pub(super) fn resolve_loader_account(
    address: Pubkey,
    account_info: AccountSnapshot,
) -> Result<ResolvedAccount, GuardInjectError> {
    let state: UpgradeableLoaderState =
        bincode::deserialize(&account_info.data).map_err(|e| {
            GuardInjectError::InvalidAccountType {
                owner: ProgramOwner::UpgradeableLoaderProgram,
                address,
                detail: format!("loader state deserialize failed: {e}"),
            }
        })?;

    let state = match state {
        UpgradeableLoaderState::Buffer { authority_address } => {
            LoaderAccountState::Buffer { authority_address }
        }
        UpgradeableLoaderState::ProgramData {
            slot,
            upgrade_authority_address,
        } => LoaderAccountState::ProgramData {
            slot,
            upgrade_authority_address,
        },
        UpgradeableLoaderState::Program { .. } => {
            return Err(GuardInjectError::UnsupportedAccountShape {
                owner: ProgramOwner::UpgradeableLoaderProgram,
                address,
                detail: "program accounts are not yet supported".to_string(),
            })
        }
        UpgradeableLoaderState::Uninitialized => {
            return Err(GuardInjectError::UnsupportedAccountShape {
                owner: ProgramOwner::UpgradeableLoaderProgram,
                address,
                detail: "uninitialized accounts are not yet supported".to_string(),
            })
        }
    };

    Ok(ResolvedAccount::Loader {
        address,
        state,
        account_info,
    })
}
