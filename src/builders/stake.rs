//! Guard builders for stake-program accounts
//!
//! A stake guard pins the lamport balance, the stake state tag, and the
//! authorized staker and withdrawer when the state carries them.
//! Authority substitution on a stake account is exactly the attack the
//! guard exists to stop.

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::errors::GuardInjectError;
use crate::guard::{
    assert_account_info, assert_stake_account_multi, AccountInfoAssertion, EquatableOperator,
    IntegerOperator, LogLevel, MetaAssertion, StakeAccountAssertion, StakeStateType,
};
use crate::resolver::StakeAccountState;
use crate::transport::AccountSnapshot;

fn state_type(state: &StakeAccountState) -> StakeStateType {
    match state {
        StakeAccountState::Uninitialized => StakeStateType::Uninitialized,
        StakeAccountState::Initialized { .. } => StakeStateType::Initialized,
        StakeAccountState::Stake { .. } => StakeStateType::Stake,
        StakeAccountState::RewardsPool => StakeStateType::RewardsPool,
    }
}

/// Exact lamports, state tag, and authorities where present
///
/// Emits two instructions: a raw account-info lamport assertion followed
/// by the stake multi-assert.
pub fn build_strict(
    address: Pubkey,
    state: &StakeAccountState,
    account_info: &AccountSnapshot,
    log_level: LogLevel,
) -> Result<Vec<Instruction>, GuardInjectError> {
    let mut assertions = vec![StakeAccountAssertion::State {
        value: state_type(state),
        operator: EquatableOperator::Equal,
    }];

    if let Some(meta) = state.meta() {
        assertions.push(StakeAccountAssertion::MetaAssertion(
            MetaAssertion::AuthorizedWithdrawer {
                value: meta.authorized.withdrawer,
                operator: EquatableOperator::Equal,
            },
        ));
        assertions.push(StakeAccountAssertion::MetaAssertion(
            MetaAssertion::AuthorizedStaker {
                value: meta.authorized.staker,
                operator: EquatableOperator::Equal,
            },
        ));
    }

    let lamports_ix = assert_account_info(
        address,
        log_level,
        AccountInfoAssertion::Lamports {
            value: account_info.lamports,
            operator: IntegerOperator::Equal,
        },
    )?;
    let stake_ix = assert_stake_account_multi(address, log_level, assertions)?;

    Ok(vec![lamports_ix, stake_ix])
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::stake::state::{Authorized, Lockup, Meta};

    fn snapshot(lamports: u64) -> AccountSnapshot {
        AccountSnapshot {
            lamports,
            owner: solana_sdk::stake::program::id(),
            data: vec![],
            executable: false,
        }
    }

    fn initialized(staker: Pubkey, withdrawer: Pubkey) -> StakeAccountState {
        StakeAccountState::Initialized {
            meta: Meta {
                rent_exempt_reserve: 2_282_880,
                authorized: Authorized { staker, withdrawer },
                lockup: Lockup::default(),
            },
        }
    }

    #[test]
    fn test_strict_emits_lamports_then_stake_assertion() {
        let address = Pubkey::new_unique();
        let state = initialized(Pubkey::new_unique(), Pubkey::new_unique());
        let info = snapshot(5_000_000_000);

        let ixs = build_strict(address, &state, &info, LogLevel::Silent).expect("build");
        assert_eq!(ixs.len(), 2);

        let needle = 5_000_000_000u64.to_le_bytes();
        assert!(ixs[0].data.windows(8).any(|w| w == needle));
    }

    #[test]
    fn test_initialized_asserts_both_authorities() {
        let address = Pubkey::new_unique();
        let staker = Pubkey::new_unique();
        let withdrawer = Pubkey::new_unique();
        let state = initialized(staker, withdrawer);

        let ixs =
            build_strict(address, &state, &snapshot(1), LogLevel::Silent).expect("build");
        let data = &ixs[1].data;
        assert!(data.windows(32).any(|w| w == staker.as_ref()));
        assert!(data.windows(32).any(|w| w == withdrawer.as_ref()));
    }

    #[test]
    fn test_uninitialized_asserts_state_tag_only() {
        let address = Pubkey::new_unique();
        let state = StakeAccountState::Uninitialized;

        let with_meta = build_strict(
            address,
            &initialized(Pubkey::new_unique(), Pubkey::new_unique()),
            &snapshot(1),
            LogLevel::Silent,
        )
        .expect("build");
        let without_meta =
            build_strict(address, &state, &snapshot(1), LogLevel::Silent).expect("build");

        assert!(without_meta[1].data.len() < with_meta[1].data.len());
    }
}
