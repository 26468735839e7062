//! Guard builders for system-program accounts
//!
//! System accounts have no decoded state; the meaningful properties are
//! the lamport balance and the owner itself. An account that does not
//! exist at simulation time still gets a strict guard: zero lamports and
//! system ownership pin down "still does not exist".

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::builders::util::{band_operators, tolerance_range};
use crate::errors::GuardInjectError;
use crate::guard::{
    assert_account_info_multi, AccountInfoAssertion, EquatableOperator, IntegerOperator,
    KnownProgram, LogLevel,
};
use crate::transport::AccountSnapshot;

/// Exact lamport balance plus system ownership
pub fn build_strict(
    address: Pubkey,
    account_info: Option<&AccountSnapshot>,
    log_level: LogLevel,
) -> Result<Vec<Instruction>, GuardInjectError> {
    let lamports = account_info.map(|info| info.lamports).unwrap_or(0);

    let assertions = vec![
        AccountInfoAssertion::Lamports {
            value: lamports,
            operator: IntegerOperator::Equal,
        },
        AccountInfoAssertion::KnownOwner {
            value: KnownProgram::System,
            operator: EquatableOperator::Equal,
        },
    ];

    Ok(vec![assert_account_info_multi(
        address, log_level, assertions,
    )?])
}

/// Lamport balance within a symmetric band, plus system ownership
///
/// Falls back to the strict guard when the account does not exist: there
/// is no balance to band around, and "still absent" is the strongest
/// statement available.
pub fn build_tolerance(
    address: Pubkey,
    account_info: Option<&AccountSnapshot>,
    percent: u8,
    inclusive: bool,
    log_level: LogLevel,
) -> Result<Vec<Instruction>, GuardInjectError> {
    let Some(info) = account_info else {
        return build_strict(address, None, log_level);
    };

    let range = tolerance_range(info.lamports, percent);
    let (lower_op, upper_op) = band_operators(inclusive);

    let assertions = vec![
        AccountInfoAssertion::Lamports {
            value: info.lamports.saturating_sub(range),
            operator: lower_op,
        },
        AccountInfoAssertion::Lamports {
            value: info.lamports.saturating_add(range),
            operator: upper_op,
        },
        AccountInfoAssertion::KnownOwner {
            value: KnownProgram::System,
            operator: EquatableOperator::Equal,
        },
    ];

    Ok(vec![assert_account_info_multi(
        address, log_level, assertions,
    )?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::GUARD_PROGRAM_ID;
    use solana_sdk::system_program;

    fn snapshot(lamports: u64) -> AccountSnapshot {
        AccountSnapshot {
            lamports,
            owner: system_program::id(),
            data: vec![],
            executable: false,
        }
    }

    #[test]
    fn test_strict_asserts_exact_lamports_and_owner() {
        let address = Pubkey::new_unique();
        let info = snapshot(1_000_000);

        let ixs = build_strict(address, Some(&info), LogLevel::Silent).expect("build");
        assert_eq!(ixs.len(), 1);
        assert_eq!(ixs[0].program_id, GUARD_PROGRAM_ID);
        assert_eq!(ixs[0].accounts[0].pubkey, address);
    }

    #[test]
    fn test_strict_missing_account_pins_zero_lamports() {
        let address = Pubkey::new_unique();

        let with_zero = build_strict(address, Some(&snapshot(0)), LogLevel::Silent).expect("build");
        let missing = build_strict(address, None, LogLevel::Silent).expect("build");
        // A missing account asserts the same zero-balance guard an
        // empty existing account would.
        assert_eq!(with_zero[0].data, missing[0].data);
    }

    #[test]
    fn test_tolerance_emits_symmetric_band() {
        let address = Pubkey::new_unique();
        let info = snapshot(1_000_000);

        let ixs =
            build_tolerance(address, Some(&info), 2, true, LogLevel::Silent).expect("build");
        assert_eq!(ixs.len(), 1);

        // Expected bounds for 2% of 1_000_000: [980_000, 1_020_000]
        let data = &ixs[0].data;
        assert!(contains_le_u64(data, 980_000));
        assert!(contains_le_u64(data, 1_020_000));
    }

    #[test]
    fn test_tolerance_zero_percent_degenerates_to_equality_band() {
        let address = Pubkey::new_unique();
        let info = snapshot(777);

        let ixs =
            build_tolerance(address, Some(&info), 0, true, LogLevel::Silent).expect("build");
        let data = &ixs[0].data;
        // Both bounds collapse onto the value itself.
        assert!(contains_le_u64(data, 777));
    }

    #[test]
    fn test_tolerance_missing_account_falls_back_to_strict() {
        let address = Pubkey::new_unique();

        let tolerance = build_tolerance(address, None, 5, true, LogLevel::Silent).expect("build");
        let strict = build_strict(address, None, LogLevel::Silent).expect("build");
        assert_eq!(tolerance[0].data, strict[0].data);
    }

    fn contains_le_u64(data: &[u8], value: u64) -> bool {
        let needle = value.to_le_bytes();
        data.windows(8).any(|window| window == needle)
    }
}
