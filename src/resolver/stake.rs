//! Stake-program account decoding
//!
//! Stake accounts carry a leading u32 state tag followed by the
//! bincode-serialized state body. All four stake states classify.

use solana_sdk::pubkey::Pubkey;
use solana_sdk::stake::state::{Meta, Stake as StakeInfo, StakeStateV2};

use crate::errors::GuardInjectError;
use crate::resolver::{ProgramOwner, ResolvedAccount};
use crate::transport::AccountSnapshot;

/// Decoded stake-account state
#[derive(Debug, Clone)]
pub enum StakeAccountState {
    Uninitialized,
    Initialized { meta: Meta },
    Stake { meta: Meta, stake: StakeInfo },
    RewardsPool,
}

impl StakeAccountState {
    /// Subtype tag used in dispatch and diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized { .. } => "initialized",
            Self::Stake { .. } => "stake",
            Self::RewardsPool => "rewardsPool",
        }
    }

    /// Authorities to assert for this state, when the state carries them
    pub fn meta(&self) -> Option<&Meta> {
        match self {
            Self::Initialized { meta } | Self::Stake { meta, .. } => Some(meta),
            Self::Uninitialized | Self::RewardsPool => None,
        }
    }
}

pub(super) fn resolve_stake_account(
    address: Pubkey,
    account_info: AccountSnapshot,
) -> Result<ResolvedAccount, GuardInjectError> {
    let state: StakeStateV2 = bincode::deserialize(&account_info.data).map_err(|e| {
        GuardInjectError::InvalidAccountType {
            owner: ProgramOwner::StakeProgram,
            address,
            detail: format!("stake state deserialize failed: {e}"),
        }
    })?;

    let state = match state {
        StakeStateV2::Uninitialized => StakeAccountState::Uninitialized,
        StakeStateV2::Initialized(meta) => StakeAccountState::Initialized { meta },
        StakeStateV2::Stake(meta, stake, _flags) => StakeAccountState::Stake { meta, stake },
        StakeStateV2::RewardsPool => StakeAccountState::RewardsPool,
    };

    Ok(ResolvedAccount::Stake {
        address,
        state,
        account_info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve_account;
    use solana_sdk::stake::state::{Authorized, Lockup};

    fn snapshot(data: Vec<u8>) -> AccountSnapshot {
        AccountSnapshot {
            lamports: 5_000_000_000,
            owner: solana_sdk::stake::program::id(),
            data,
            executable: false,
        }
    }

    fn meta(staker: Pubkey, withdrawer: Pubkey) -> Meta {
        Meta {
            rent_exempt_reserve: 2_282_880,
            authorized: Authorized { staker, withdrawer },
            lockup: Lockup::default(),
        }
    }

    #[test]
    fn test_initialized_state_classifies_with_meta() {
        let address = Pubkey::new_unique();
        let staker = Pubkey::new_unique();
        let withdrawer = Pubkey::new_unique();
        let mut data = bincode::serialize(&StakeStateV2::Initialized(meta(staker, withdrawer)))
            .expect("serialize stake state");
        data.resize(StakeStateV2::size_of(), 0);

        let resolved = resolve_account(address, Some(snapshot(data))).expect("should classify");

        match resolved {
            ResolvedAccount::Stake { ref state, .. } => {
                assert_eq!(state.type_name(), "initialized");
                let meta = state.meta().expect("initialized carries meta");
                assert_eq!(meta.authorized.staker, staker);
                assert_eq!(meta.authorized.withdrawer, withdrawer);
            }
            other => panic!("expected stake account, got {other:?}"),
        }
        assert_eq!(resolved.account_type(), Some("initialized"));
    }

    #[test]
    fn test_uninitialized_state_classifies() {
        let address = Pubkey::new_unique();
        let data =
            bincode::serialize(&StakeStateV2::Uninitialized).expect("serialize stake state");

        let resolved = resolve_account(address, Some(snapshot(data))).expect("should classify");
        assert_eq!(resolved.account_type(), Some("uninitialized"));
        assert_eq!(resolved.program_owner(), ProgramOwner::StakeProgram);
    }

    #[test]
    fn test_rewards_pool_state_classifies() {
        let address = Pubkey::new_unique();
        let data = bincode::serialize(&StakeStateV2::RewardsPool).expect("serialize stake state");

        let resolved = resolve_account(address, Some(snapshot(data))).expect("should classify");
        assert_eq!(resolved.account_type(), Some("rewardsPool"));
    }

    #[test]
    fn test_undecodable_bytes_are_invalid_type() {
        let address = Pubkey::new_unique();
        // Tag 9 matches no stake state.
        let data = vec![9, 0, 0, 0];

        let err = resolve_account(address, Some(snapshot(data)))
            .expect_err("unknown tag must not classify");
        assert!(matches!(err, GuardInjectError::InvalidAccountType { .. }));
    }
}
