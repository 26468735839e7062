//! Compiled-message utilities: account extraction and
//! decompile/recompile
//!
//! Works on static account keys. Transactions that require address
//! lookup-table resolution are refused up front; guarding an account set
//! the pipeline cannot fully see would produce false confidence.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};

use crate::errors::GuardInjectError;

/// Refuse messages whose account set extends past the static keys
pub(super) fn ensure_static_keys_only(
    message: &VersionedMessage,
) -> Result<(), GuardInjectError> {
    let has_lookups = message
        .address_table_lookups()
        .map(|lookups| !lookups.is_empty())
        .unwrap_or(false);

    if has_lookups {
        return Err(GuardInjectError::compile(
            "address lookup tables are not supported; resolve the full account set first",
        ));
    }
    if message.static_account_keys().is_empty() {
        return Err(GuardInjectError::compile("message has no account keys"));
    }
    Ok(())
}

/// Writable and signer account sets, in first-appearance order
///
/// Signers are always added to the writable (guard) set even when not
/// technically writable: signer substitution is itself a risk. The fee
/// payer joins both sets unconditionally.
pub(super) fn writables_and_signers(
    message: &VersionedMessage,
) -> (Vec<Pubkey>, Vec<Pubkey>) {
    let keys = message.static_account_keys();
    let mut writable: Vec<Pubkey> = Vec::new();
    let mut signers: Vec<Pubkey> = Vec::new();

    let mut push_unique = |list: &mut Vec<Pubkey>, key: Pubkey| {
        if !list.contains(&key) {
            list.push(key);
        }
    };

    for instruction in message.instructions() {
        for &index in &instruction.accounts {
            let index = index as usize;
            let Some(&key) = keys.get(index) else {
                continue;
            };

            if message.is_maybe_writable(index, None) {
                push_unique(&mut writable, key);
            }
            if message.is_signer(index) {
                push_unique(&mut writable, key);
                push_unique(&mut signers, key);
            }
        }
    }

    // Fee payer is always the first static key and always a signer.
    let fee_payer = keys[0];
    push_unique(&mut writable, fee_payer);
    push_unique(&mut signers, fee_payer);

    (writable, signers)
}

/// Decompile a message back into an editable instruction list
pub(super) fn decompile_instructions(
    message: &VersionedMessage,
) -> Result<Vec<Instruction>, GuardInjectError> {
    let keys = message.static_account_keys();

    message
        .instructions()
        .iter()
        .map(|compiled| {
            let program_id = *keys
                .get(compiled.program_id_index as usize)
                .ok_or_else(|| {
                    GuardInjectError::compile(format!(
                        "program id index {} out of bounds",
                        compiled.program_id_index
                    ))
                })?;

            let accounts = compiled
                .accounts
                .iter()
                .map(|&index| {
                    let index = index as usize;
                    let pubkey = *keys.get(index).ok_or_else(|| {
                        GuardInjectError::compile(format!(
                            "account index {index} out of bounds"
                        ))
                    })?;
                    Ok(AccountMeta {
                        pubkey,
                        is_signer: message.is_signer(index),
                        is_writable: message.is_maybe_writable(index, None),
                    })
                })
                .collect::<Result<Vec<_>, GuardInjectError>>()?;

            Ok(Instruction {
                program_id,
                accounts,
                data: compiled.data.clone(),
            })
        })
        .collect()
}

/// Recompile an instruction list into an unsigned v0 transaction keeping
/// the original payer and blockhash
pub(super) fn recompile(
    original: &VersionedMessage,
    instructions: &[Instruction],
) -> Result<VersionedTransaction, GuardInjectError> {
    let payer = original.static_account_keys()[0];
    let blockhash = *original.recent_blockhash();

    let message = v0::Message::try_compile(&payer, instructions, &[], blockhash)
        .map_err(|e| GuardInjectError::compile(e.to_string()))?;
    let message = VersionedMessage::V0(message);

    let num_signatures = message.header().num_required_signatures as usize;
    Ok(VersionedTransaction {
        signatures: vec![Signature::default(); num_signatures],
        message,
    })
}
