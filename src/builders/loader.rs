//! Guard builders for upgradeable-loader accounts
//!
//! The property worth guarding on a loader account is its authority: a
//! swapped upgrade authority on a program-data account, or a swapped
//! buffer authority mid-deploy, hands the program to an attacker.

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::errors::GuardInjectError;
use crate::guard::{
    assert_upgradeable_loader_account, EquatableOperator, LogLevel, UpgradeableBufferAssertion,
    UpgradeableLoaderStateAssertion, UpgradeableProgramDataAssertion,
};
use crate::resolver::LoaderAccountState;

/// Exact authority for a buffer or program-data account
pub fn build_strict(
    address: Pubkey,
    state: &LoaderAccountState,
    log_level: LogLevel,
) -> Result<Vec<Instruction>, GuardInjectError> {
    let assertion = match state {
        LoaderAccountState::ProgramData {
            upgrade_authority_address,
            ..
        } => UpgradeableLoaderStateAssertion::ProgramData(
            UpgradeableProgramDataAssertion::UpgradeAuthority {
                value: *upgrade_authority_address,
                operator: EquatableOperator::Equal,
            },
        ),
        LoaderAccountState::Buffer { authority_address } => {
            UpgradeableLoaderStateAssertion::Buffer(UpgradeableBufferAssertion::Authority {
                value: *authority_address,
                operator: EquatableOperator::Equal,
            })
        }
    };

    Ok(vec![assert_upgradeable_loader_account(
        address, log_level, assertion,
    )?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_data_asserts_upgrade_authority() {
        let address = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let state = LoaderAccountState::ProgramData {
            slot: 42,
            upgrade_authority_address: Some(authority),
        };

        let ixs = build_strict(address, &state, LogLevel::Silent).expect("build");
        assert_eq!(ixs.len(), 1);
        assert!(ixs[0].data.windows(32).any(|w| w == authority.as_ref()));
    }

    #[test]
    fn test_buffer_asserts_buffer_authority() {
        let address = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let state = LoaderAccountState::Buffer {
            authority_address: Some(authority),
        };

        let ixs = build_strict(address, &state, LogLevel::Silent).expect("build");
        assert_eq!(ixs.len(), 1);
        assert!(ixs[0].data.windows(32).any(|w| w == authority.as_ref()));
    }

    #[test]
    fn test_none_authority_still_asserted() {
        let address = Pubkey::new_unique();
        let state = LoaderAccountState::Buffer {
            authority_address: None,
        };

        // A revoked authority is a state worth pinning too.
        let ixs = build_strict(address, &state, LogLevel::Silent).expect("build");
        assert_eq!(ixs.len(), 1);
    }
}
