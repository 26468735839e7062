//! Guard builders for SPL-Token and Token-2022 accounts
//!
//! Token-account guards pin ownership, balance and delegation. When the
//! account address equals the associated token address derived from its
//! own (owner, mint) pair, a single compact derived-ownership assertion
//! replaces the two explicit equality assertions; the guard program
//! re-derives the address at runtime. This is a byte-size optimization
//! the overhead numbers depend on, not a correctness requirement.

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use spl_associated_token_account::get_associated_token_address_with_program_id;

use crate::builders::util::{band_operators, tolerance_range};
use crate::errors::GuardInjectError;
use crate::guard::{
    assert_mint_account_multi, assert_token_account_multi, EquatableOperator, IntegerOperator,
    LogLevel, MintAccountAssertion, TokenAccountAssertion,
};
use crate::resolver::{MintState, ProgramOwner, TokenAccountState};

fn token_program_id(program_owner: ProgramOwner) -> Result<Pubkey, GuardInjectError> {
    match program_owner {
        ProgramOwner::TokenProgram => Ok(spl_token::id()),
        ProgramOwner::Token2022Program => Ok(spl_token_2022::id()),
        other => Err(GuardInjectError::internal(format!(
            "token builder invoked for non-token owner {other}"
        ))),
    }
}

/// Ownership assertions, taking the derived-ATA shortcut when available
fn ownership_assertions(
    address: Pubkey,
    program_owner: ProgramOwner,
    state: &TokenAccountState,
) -> Result<Vec<TokenAccountAssertion>, GuardInjectError> {
    let derived = get_associated_token_address_with_program_id(
        &state.owner,
        &state.mint,
        &token_program_id(program_owner)?,
    );

    if derived == address {
        Ok(vec![TokenAccountAssertion::TokenAccountOwnerIsDerived])
    } else {
        Ok(vec![
            TokenAccountAssertion::Owner {
                value: state.owner,
                operator: EquatableOperator::Equal,
            },
            TokenAccountAssertion::Mint {
                value: state.mint,
                operator: EquatableOperator::Equal,
            },
        ])
    }
}

/// Exact ownership, balance and delegation
pub fn build_strict(
    address: Pubkey,
    program_owner: ProgramOwner,
    state: &TokenAccountState,
    log_level: LogLevel,
) -> Result<Vec<Instruction>, GuardInjectError> {
    let mut assertions = ownership_assertions(address, program_owner, state)?;

    assertions.push(TokenAccountAssertion::Amount {
        value: state.amount,
        operator: IntegerOperator::Equal,
    });
    assertions.push(TokenAccountAssertion::Delegate {
        value: state.delegate,
        operator: EquatableOperator::Equal,
    });
    if program_owner == ProgramOwner::Token2022Program {
        assertions.push(TokenAccountAssertion::DelegatedAmount {
            value: state.delegated_amount,
            operator: IntegerOperator::Equal,
        });
    }

    Ok(vec![assert_token_account_multi(
        address, log_level, assertions,
    )?])
}

/// Ownership and delegation as strict, balance within a symmetric band
pub fn build_tolerance(
    address: Pubkey,
    program_owner: ProgramOwner,
    state: &TokenAccountState,
    percent: u8,
    inclusive: bool,
    log_level: LogLevel,
) -> Result<Vec<Instruction>, GuardInjectError> {
    let range = tolerance_range(state.amount, percent);
    let (lower_op, upper_op) = band_operators(inclusive);

    let mut assertions = ownership_assertions(address, program_owner, state)?;

    assertions.push(TokenAccountAssertion::Amount {
        value: state.amount.saturating_sub(range),
        operator: lower_op,
    });
    assertions.push(TokenAccountAssertion::Amount {
        value: state.amount.saturating_add(range),
        operator: upper_op,
    });
    assertions.push(TokenAccountAssertion::Delegate {
        value: state.delegate,
        operator: EquatableOperator::Equal,
    });
    if program_owner == ProgramOwner::Token2022Program {
        assertions.push(TokenAccountAssertion::DelegatedAmount {
            value: state.delegated_amount,
            operator: IntegerOperator::Equal,
        });
    }

    Ok(vec![assert_token_account_multi(
        address, log_level, assertions,
    )?])
}

/// Exact supply and authorities for a mint
pub fn build_mint_strict(
    address: Pubkey,
    state: &MintState,
    log_level: LogLevel,
) -> Result<Vec<Instruction>, GuardInjectError> {
    let assertions = vec![
        MintAccountAssertion::Supply {
            value: state.supply,
            operator: IntegerOperator::Equal,
        },
        MintAccountAssertion::FreezeAuthority {
            value: state.freeze_authority,
            operator: EquatableOperator::Equal,
        },
        MintAccountAssertion::MintAuthority {
            value: state.mint_authority,
            operator: EquatableOperator::Equal,
        },
    ];

    Ok(vec![assert_mint_account_multi(
        address, log_level, assertions,
    )?])
}
