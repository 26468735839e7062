//! Instruction constructors for the guard program
//!
//! Each constructor borsh-encodes a discriminator + log level + assertion
//! payload and targets a single read-only account.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey,
    pubkey::Pubkey,
};

use crate::errors::GuardInjectError;
use crate::guard::{
    AccountInfoAssertion, LogLevel, MintAccountAssertion, StakeAccountAssertion,
    TokenAccountAssertion, UpgradeableLoaderStateAssertion,
};

/// On-chain guard (assertion) program
pub const GUARD_PROGRAM_ID: Pubkey = pubkey!("L2TExMFKdjpN9kozasaurPirfHy9P8sbXoAN1qA3S95");

// Instruction discriminators, in program declaration order.
const IX_ASSERT_ACCOUNT_INFO: u8 = 4;
const IX_ASSERT_ACCOUNT_INFO_MULTI: u8 = 5;
const IX_ASSERT_MINT_ACCOUNT_MULTI: u8 = 7;
const IX_ASSERT_TOKEN_ACCOUNT_MULTI: u8 = 9;
const IX_ASSERT_STAKE_ACCOUNT_MULTI: u8 = 11;
const IX_ASSERT_UPGRADEABLE_LOADER_ACCOUNT: u8 = 12;

fn encode<T: BorshSerialize>(
    discriminator: u8,
    log_level: LogLevel,
    payload: &T,
) -> Result<Vec<u8>, GuardInjectError> {
    let mut data = vec![discriminator];
    log_level
        .serialize(&mut data)
        .and_then(|_| payload.serialize(&mut data))
        .map_err(|e| GuardInjectError::internal(format!("assertion encoding failed: {e}")))?;
    Ok(data)
}

fn instruction(target_account: Pubkey, data: Vec<u8>) -> Instruction {
    Instruction {
        program_id: GUARD_PROGRAM_ID,
        accounts: vec![AccountMeta::new_readonly(target_account, false)],
        data,
    }
}

/// Assert a single raw account-info property
pub fn assert_account_info(
    target_account: Pubkey,
    log_level: LogLevel,
    assertion: AccountInfoAssertion,
) -> Result<Instruction, GuardInjectError> {
    let data = encode(IX_ASSERT_ACCOUNT_INFO, log_level, &assertion)?;
    Ok(instruction(target_account, data))
}

/// Assert multiple raw account-info properties in one instruction
pub fn assert_account_info_multi(
    target_account: Pubkey,
    log_level: LogLevel,
    assertions: Vec<AccountInfoAssertion>,
) -> Result<Instruction, GuardInjectError> {
    let data = encode(IX_ASSERT_ACCOUNT_INFO_MULTI, log_level, &assertions)?;
    Ok(instruction(target_account, data))
}

/// Assert multiple decoded token-account properties in one instruction
pub fn assert_token_account_multi(
    target_account: Pubkey,
    log_level: LogLevel,
    assertions: Vec<TokenAccountAssertion>,
) -> Result<Instruction, GuardInjectError> {
    let data = encode(IX_ASSERT_TOKEN_ACCOUNT_MULTI, log_level, &assertions)?;
    Ok(instruction(target_account, data))
}

/// Assert multiple decoded mint properties in one instruction
pub fn assert_mint_account_multi(
    target_account: Pubkey,
    log_level: LogLevel,
    assertions: Vec<MintAccountAssertion>,
) -> Result<Instruction, GuardInjectError> {
    let data = encode(IX_ASSERT_MINT_ACCOUNT_MULTI, log_level, &assertions)?;
    Ok(instruction(target_account, data))
}

/// Assert multiple decoded stake-account properties in one instruction
pub fn assert_stake_account_multi(
    target_account: Pubkey,
    log_level: LogLevel,
    assertions: Vec<StakeAccountAssertion>,
) -> Result<Instruction, GuardInjectError> {
    let data = encode(IX_ASSERT_STAKE_ACCOUNT_MULTI, log_level, &assertions)?;
    Ok(instruction(target_account, data))
}

/// Assert a decoded upgradeable-loader state property
pub fn assert_upgradeable_loader_account(
    target_account: Pubkey,
    log_level: LogLevel,
    assertion: UpgradeableLoaderStateAssertion,
) -> Result<Instruction, GuardInjectError> {
    let data = encode(IX_ASSERT_UPGRADEABLE_LOADER_ACCOUNT, log_level, &assertion)?;
    Ok(instruction(target_account, data))
}
