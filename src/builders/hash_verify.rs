//! Content-digest guard, uniform across all owner families
//!
//! Computes a keccak-256 digest over the account's raw byte payload
//! (optionally a sub-range) and asserts it on chain. This is the fallback
//! for any account shape the structured builders do not support yet.

use solana_sdk::{instruction::Instruction, keccak, pubkey::Pubkey};

use crate::errors::GuardInjectError;
use crate::guard::{assert_account_info, AccountInfoAssertion, LogLevel};
use crate::transport::AccountSnapshot;

/// Digest assertion over the account data, or the `(start, length)`
/// sub-range when given
///
/// Range endpoints are clamped to the payload, matching the sub-slice
/// semantics the guard program applies at verification time.
pub fn build(
    address: Pubkey,
    account_info: Option<&AccountSnapshot>,
    start: Option<u16>,
    length: Option<u16>,
    log_level: LogLevel,
) -> Result<Vec<Instruction>, GuardInjectError> {
    let info = account_info.ok_or(GuardInjectError::AccountInfoMissing { address })?;

    let begin = usize::from(start.unwrap_or(0)).min(info.data.len());
    let end = match length {
        Some(len) => (begin + usize::from(len)).min(info.data.len()),
        None => info.data.len(),
    };

    let digest = keccak::hash(&info.data[begin..end]);

    let ix = assert_account_info(
        address,
        log_level,
        AccountInfoAssertion::VerifyDatahash {
            expected_hash: digest.to_bytes(),
            start,
            length,
        },
    )?;

    Ok(vec![ix])
}
