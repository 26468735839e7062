//! Guard-program instruction encoding
//!
//! Structured assertion descriptions and the encoder that turns them into
//! on-chain instructions for the guard program. The injection pipeline
//! treats the produced [`Instruction`] values as opaque: it appends them
//! to the transaction and never inspects their contents.
//!
//! Assertion data is borsh-encoded behind a one-byte instruction
//! discriminator, matching the guard program's wire format. The only
//! account each assertion instruction references is the target account,
//! read-only.

use borsh::BorshSerialize;
use solana_sdk::pubkey::Pubkey;

mod encoder;

pub use encoder::{
    assert_account_info, assert_account_info_multi, assert_mint_account_multi,
    assert_stake_account_multi, assert_token_account_multi, assert_upgradeable_loader_account,
    GUARD_PROGRAM_ID,
};

/// On-chain log verbosity for a guard assertion
#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    PlaintextMessage,
    EncodedMessage,
    EncodedNoop,
    FailedPlaintextMessage,
    FailedEncodedMessage,
    FailedEncodedNoop,
}

/// Comparison operator for integer-valued assertions
#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerOperator {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Contains,
    DoesNotContain,
}

/// Comparison operator for equality-only assertions
#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquatableOperator {
    Equal,
    NotEqual,
}

/// Well-known program owners the guard program can assert against
/// without a full pubkey payload
#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownProgram {
    System,
    SplToken,
    SplToken2022,
    SplAccountCompression,
    SplNoop,
    BpfLoaderUpgradeable,
    Stake,
}

/// Assertion over raw account-info fields
#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub enum AccountInfoAssertion {
    Lamports {
        value: u64,
        operator: IntegerOperator,
    },
    DataLength {
        value: u64,
        operator: IntegerOperator,
    },
    Owner {
        value: Pubkey,
        operator: EquatableOperator,
    },
    KnownOwner {
        value: KnownProgram,
        operator: EquatableOperator,
    },
    RentEpoch {
        value: u64,
        operator: IntegerOperator,
    },
    IsSigner {
        value: bool,
        operator: EquatableOperator,
    },
    IsWritable {
        value: bool,
        operator: EquatableOperator,
    },
    Executable {
        value: bool,
        operator: EquatableOperator,
    },
    /// Assert a keccak digest over the account data, optionally a
    /// sub-range given by `start`/`length`
    VerifyDatahash {
        expected_hash: [u8; 32],
        start: Option<u16>,
        length: Option<u16>,
    },
}

/// Assertion over decoded token-account fields
#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub enum TokenAccountAssertion {
    Mint {
        value: Pubkey,
        operator: EquatableOperator,
    },
    Owner {
        value: Pubkey,
        operator: EquatableOperator,
    },
    Amount {
        value: u64,
        operator: IntegerOperator,
    },
    Delegate {
        value: Option<Pubkey>,
        operator: EquatableOperator,
    },
    State {
        value: u8,
        operator: IntegerOperator,
    },
    IsNative {
        value: Option<u64>,
        operator: IntegerOperator,
    },
    DelegatedAmount {
        value: u64,
        operator: IntegerOperator,
    },
    CloseAuthority {
        value: Option<Pubkey>,
        operator: EquatableOperator,
    },
    /// Compact form: assert the account address is the associated token
    /// address derived from its own (owner, mint) pair, replacing two
    /// explicit equality assertions
    TokenAccountOwnerIsDerived,
}

/// Assertion over decoded mint fields
#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub enum MintAccountAssertion {
    MintAuthority {
        value: Option<Pubkey>,
        operator: EquatableOperator,
    },
    Supply {
        value: u64,
        operator: IntegerOperator,
    },
    Decimals {
        value: u8,
        operator: IntegerOperator,
    },
    IsInitialized {
        value: bool,
        operator: EquatableOperator,
    },
    FreezeAuthority {
        value: Option<Pubkey>,
        operator: EquatableOperator,
    },
}

/// Stake state discriminant as asserted on chain
#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeStateType {
    Uninitialized,
    Initialized,
    Stake,
    RewardsPool,
}

/// Assertion over stake-meta fields
#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub enum MetaAssertion {
    RentExemptReserve {
        value: u64,
        operator: IntegerOperator,
    },
    AuthorizedStaker {
        value: Pubkey,
        operator: EquatableOperator,
    },
    AuthorizedWithdrawer {
        value: Pubkey,
        operator: EquatableOperator,
    },
    LockupUnixTimestamp {
        value: i64,
        operator: IntegerOperator,
    },
    LockupEpoch {
        value: u64,
        operator: IntegerOperator,
    },
    LockupCustodian {
        value: Pubkey,
        operator: EquatableOperator,
    },
}

/// Assertion over decoded stake-account fields
#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub enum StakeAccountAssertion {
    State {
        value: StakeStateType,
        operator: EquatableOperator,
    },
    MetaAssertion(MetaAssertion),
}

/// Assertion over decoded upgradeable-loader buffer fields
#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub enum UpgradeableBufferAssertion {
    Authority {
        value: Option<Pubkey>,
        operator: EquatableOperator,
    },
}

/// Assertion over decoded upgradeable-loader program-data fields
#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub enum UpgradeableProgramDataAssertion {
    UpgradeAuthority {
        value: Option<Pubkey>,
        operator: EquatableOperator,
    },
    Slot {
        value: u64,
        operator: IntegerOperator,
    },
}

/// Assertion over decoded upgradeable-loader state
#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub enum UpgradeableLoaderStateAssertion {
    Buffer(UpgradeableBufferAssertion),
    ProgramData(UpgradeableProgramDataAssertion),
}
