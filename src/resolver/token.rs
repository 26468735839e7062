//! SPL-Token and Token-2022 account decoding
//!
//! Legacy token accounts are discriminated by exact byte length (mint,
//! token account, multisig). Token-2022 reuses the same base layouts but
//! appends extension data; when the payload is longer than the base
//! token-account layout, the account type is given by the discriminator
//! byte immediately past it.

use solana_sdk::{program_option::COption, program_pack::Pack, pubkey::Pubkey};
use spl_token::state::{
    Account as SplTokenAccount, Mint as SplMint, Multisig as SplMultisig,
};
use spl_token_2022::extension::{AccountType, StateWithExtensions};

use crate::errors::GuardInjectError;
use crate::resolver::{ProgramOwner, ResolvedAccount};
use crate::transport::AccountSnapshot;

/// Decoded view of a token account, identical across both token programs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountState {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub delegate: Option<Pubkey>,
    pub delegated_amount: u64,
    pub close_authority: Option<Pubkey>,
}

/// Decoded view of a mint, identical across both token programs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintState {
    pub mint_authority: Option<Pubkey>,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<Pubkey>,
}

impl From<SplTokenAccount> for TokenAccountState {
    fn from(account: SplTokenAccount) -> Self {
        Self {
            mint: account.mint,
            owner: account.owner,
            amount: account.amount,
            delegate: coption_to_option(account.delegate),
            delegated_amount: account.delegated_amount,
            close_authority: coption_to_option(account.close_authority),
        }
    }
}

impl From<spl_token_2022::state::Account> for TokenAccountState {
    fn from(account: spl_token_2022::state::Account) -> Self {
        Self {
            mint: account.mint,
            owner: account.owner,
            amount: account.amount,
            delegate: coption_to_option(account.delegate),
            delegated_amount: account.delegated_amount,
            close_authority: coption_to_option(account.close_authority),
        }
    }
}

impl From<SplMint> for MintState {
    fn from(mint: SplMint) -> Self {
        Self {
            mint_authority: coption_to_option(mint.mint_authority),
            supply: mint.supply,
            decimals: mint.decimals,
            is_initialized: mint.is_initialized,
            freeze_authority: coption_to_option(mint.freeze_authority),
        }
    }
}

impl From<spl_token_2022::state::Mint> for MintState {
    fn from(mint: spl_token_2022::state::Mint) -> Self {
        Self {
            mint_authority: coption_to_option(mint.mint_authority),
            supply: mint.supply,
            decimals: mint.decimals,
            is_initialized: mint.is_initialized,
            freeze_authority: coption_to_option(mint.freeze_authority),
        }
    }
}

fn coption_to_option(value: COption<Pubkey>) -> Option<Pubkey> {
    match value {
        COption::Some(key) => Some(key),
        COption::None => None,
    }
}

/// Classify a legacy SPL-Token account by exact byte length
pub(super) fn resolve_spl_token_account(
    address: Pubkey,
    account_info: AccountSnapshot,
) -> Result<ResolvedAccount, GuardInjectError> {
    let size = account_info.data.len();

    if size == SplMint::LEN {
        let mint =
            SplMint::unpack(&account_info.data).map_err(|e| GuardInjectError::InvalidAccountType {
                owner: ProgramOwner::TokenProgram,
                address,
                detail: format!("mint unpack failed: {e}"),
            })?;
        Ok(ResolvedAccount::Mint {
            address,
            program_owner: ProgramOwner::TokenProgram,
            state: MintState::from(mint),
            account_info,
        })
    } else if size == SplTokenAccount::LEN {
        let account = SplTokenAccount::unpack(&account_info.data).map_err(|e| {
            GuardInjectError::InvalidAccountType {
                owner: ProgramOwner::TokenProgram,
                address,
                detail: format!("token account unpack failed: {e}"),
            }
        })?;
        Ok(ResolvedAccount::TokenAccount {
            address,
            program_owner: ProgramOwner::TokenProgram,
            state: TokenAccountState::from(account),
            account_info,
        })
    } else if size == SplMultisig::LEN {
        Err(GuardInjectError::UnsupportedAccountShape {
            owner: ProgramOwner::TokenProgram,
            address,
            detail: "multisig accounts are not yet supported".to_string(),
        })
    } else {
        Err(GuardInjectError::InvalidAccountSize {
            owner: ProgramOwner::TokenProgram,
            address,
            size,
        })
    }
}

/// Classify a Token-2022 account
///
/// Base-length payloads are plain token accounts; anything longer carries
/// the extension discriminator byte at the base token-account offset.
pub(super) fn resolve_token_2022_account(
    address: Pubkey,
    account_info: AccountSnapshot,
) -> Result<ResolvedAccount, GuardInjectError> {
    let size = account_info.data.len();
    let base_len = SplTokenAccount::LEN;

    if size < base_len {
        return Err(GuardInjectError::UnsupportedAccountShape {
            owner: ProgramOwner::Token2022Program,
            address,
            detail: format!("accounts shorter than {base_len} bytes are not yet supported"),
        });
    }

    let account_type = if size == base_len {
        AccountType::Account as u8
    } else {
        account_info.data[base_len]
    };

    if account_type == AccountType::Mint as u8 {
        let state = StateWithExtensions::<spl_token_2022::state::Mint>::unpack(&account_info.data)
            .map_err(|e| GuardInjectError::InvalidAccountType {
                owner: ProgramOwner::Token2022Program,
                address,
                detail: format!("mint unpack failed: {e}"),
            })?;
        Ok(ResolvedAccount::Mint {
            address,
            program_owner: ProgramOwner::Token2022Program,
            state: MintState::from(state.base),
            account_info,
        })
    } else if account_type == AccountType::Account as u8 {
        let state =
            StateWithExtensions::<spl_token_2022::state::Account>::unpack(&account_info.data)
                .map_err(|e| GuardInjectError::InvalidAccountType {
                    owner: ProgramOwner::Token2022Program,
                    address,
                    detail: format!("token account unpack failed: {e}"),
                })?;
        Ok(ResolvedAccount::TokenAccount {
            address,
            program_owner: ProgramOwner::Token2022Program,
            state: TokenAccountState::from(state.base),
            account_info,
        })
    } else {
        Err(GuardInjectError::InvalidAccountType {
            owner: ProgramOwner::Token2022Program,
            address,
            detail: format!("unrecognized account type discriminator {account_type}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve_account;
    use spl_token::state::AccountState;

    fn snapshot(owner: Pubkey, data: Vec<u8>) -> AccountSnapshot {
        AccountSnapshot {
            lamports: 2_039_280,
            owner,
            data,
            executable: false,
        }
    }

    fn packed_token_account(mint: Pubkey, owner: Pubkey, amount: u64) -> Vec<u8> {
        let account = SplTokenAccount {
            mint,
            owner,
            amount,
            delegate: COption::None,
            state: AccountState::Initialized,
            is_native: COption::None,
            delegated_amount: 0,
            close_authority: COption::None,
        };
        let mut data = vec![0u8; SplTokenAccount::LEN];
        SplTokenAccount::pack(account, &mut data).expect("pack token account");
        data
    }

    fn packed_mint(mint_authority: Pubkey, supply: u64) -> Vec<u8> {
        let mint = SplMint {
            mint_authority: COption::Some(mint_authority),
            supply,
            decimals: 6,
            is_initialized: true,
            freeze_authority: COption::None,
        };
        let mut data = vec![0u8; SplMint::LEN];
        SplMint::pack(mint, &mut data).expect("pack mint");
        data
    }

    #[test]
    fn test_token_account_by_exact_length() {
        let address = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let data = packed_token_account(mint, owner, 500);

        let resolved = resolve_account(address, Some(snapshot(spl_token::id(), data)))
            .expect("should classify");

        match resolved {
            ResolvedAccount::TokenAccount {
                program_owner,
                state,
                ..
            } => {
                assert_eq!(program_owner, ProgramOwner::TokenProgram);
                assert_eq!(state.mint, mint);
                assert_eq!(state.owner, owner);
                assert_eq!(state.amount, 500);
                assert_eq!(state.delegate, None);
            }
            other => panic!("expected token account, got {other:?}"),
        }
    }

    #[test]
    fn test_mint_by_exact_length() {
        let address = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let data = packed_mint(authority, 1_000_000);

        let resolved = resolve_account(address, Some(snapshot(spl_token::id(), data)))
            .expect("should classify");

        match resolved {
            ResolvedAccount::Mint { state, .. } => {
                assert_eq!(state.mint_authority, Some(authority));
                assert_eq!(state.supply, 1_000_000);
                assert_eq!(state.freeze_authority, None);
            }
            other => panic!("expected mint, got {other:?}"),
        }
    }

    #[test]
    fn test_multisig_length_fails_loudly() {
        let address = Pubkey::new_unique();
        let data = vec![0u8; SplMultisig::LEN];

        let err = resolve_account(address, Some(snapshot(spl_token::id(), data)))
            .expect_err("multisig must not classify");
        assert!(matches!(
            err,
            GuardInjectError::UnsupportedAccountShape { .. }
        ));
    }

    #[test]
    fn test_unrecognized_length_is_invalid_size() {
        let address = Pubkey::new_unique();
        let data = vec![0u8; 17];

        let err = resolve_account(address, Some(snapshot(spl_token::id(), data)))
            .expect_err("bad length must not classify");
        assert!(matches!(err, GuardInjectError::InvalidAccountSize { size: 17, .. }));
    }

    #[test]
    fn test_token_2022_account_with_extension_discriminator() {
        let address = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut data = packed_token_account(mint, owner, 9);
        data.push(AccountType::Account as u8);

        let resolved = resolve_account(address, Some(snapshot(spl_token_2022::id(), data)))
            .expect("should classify");

        match resolved {
            ResolvedAccount::TokenAccount {
                program_owner,
                state,
                ..
            } => {
                assert_eq!(program_owner, ProgramOwner::Token2022Program);
                assert_eq!(state.amount, 9);
            }
            other => panic!("expected token account, got {other:?}"),
        }
    }

    #[test]
    fn test_token_2022_mint_with_extension_discriminator() {
        let address = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        // Base mint layout zero-padded to the token-account length, then
        // the mint discriminator byte.
        let mut data = packed_mint(authority, 77);
        data.resize(SplTokenAccount::LEN, 0);
        data.push(AccountType::Mint as u8);

        let resolved = resolve_account(address, Some(snapshot(spl_token_2022::id(), data)))
            .expect("should classify");

        match resolved {
            ResolvedAccount::Mint {
                program_owner,
                state,
                ..
            } => {
                assert_eq!(program_owner, ProgramOwner::Token2022Program);
                assert_eq!(state.supply, 77);
            }
            other => panic!("expected mint, got {other:?}"),
        }
    }

    #[test]
    fn test_token_2022_below_base_length_fails_loudly() {
        let address = Pubkey::new_unique();
        let data = vec![0u8; SplMint::LEN];

        let err = resolve_account(address, Some(snapshot(spl_token_2022::id(), data)))
            .expect_err("short token-2022 account must not classify");
        assert!(matches!(
            err,
            GuardInjectError::UnsupportedAccountShape { .. }
        ));
    }

    #[test]
    fn test_token_2022_bad_discriminator_is_invalid_type() {
        let address = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut data = packed_token_account(mint, owner, 1);
        data.push(0xAB);

        let err = resolve_account(address, Some(snapshot(spl_token_2022::id(), data)))
            .expect_err("bad discriminator must not classify");
        assert!(matches!(err, GuardInjectError::InvalidAccountType { .. }));
    }
}
