//! Verification strategies and caller policy
//!
//! A [`Strategy`] decides how a single account's post-state gets guarded.
//! The caller supplies an [`AssertionBuilderConfig`]: one selector function
//! per program-owner family, each a pure function from the fully resolved
//! account to a strategy. Policy must be total over the owners actually
//! present in a transaction; a missing selector aborts the pipeline rather
//! than silently defaulting.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::GuardInjectError;
use crate::resolver::{ProgramOwner, ResolvedAccount};

/// How to guard a single account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum Strategy {
    /// Assert simulated values exactly
    Strict,
    /// Assert a symmetric numeric band around the simulated value
    Tolerance {
        /// Band half-width as a percentage of the value, 0-100.
        /// Zero yields a zero-width band equivalent to strict equality.
        percent: u8,
        /// Inclusive bounds (>=/<=) when true, exclusive (>/<) when false
        inclusive: bool,
    },
    /// Assert a content digest over the raw byte payload, optionally a
    /// sub-range
    #[serde(rename = "hashverify")]
    HashVerify {
        start: Option<u16>,
        length: Option<u16>,
    },
    /// Emit no guard for this account
    None,
}

impl Strategy {
    /// Stable name for diagnostics and dispatch errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Tolerance { .. } => "tolerance",
            Self::HashVerify { .. } => "hashverify",
            Self::None => "none",
        }
    }
}

/// Pure selector from a resolved account to a strategy
///
/// Same account state must always yield the same strategy; selectors may
/// branch on decoded state but must not capture hidden mutable context.
pub type StrategySelector = Arc<dyn Fn(&ResolvedAccount) -> Strategy + Send + Sync>;

/// Caller-supplied policy: a partial mapping from program owner to a
/// strategy selector
///
/// Built incrementally:
///
/// ```no_run
/// use txguard::strategy::{AssertionBuilderConfig, Strategy};
///
/// let config = AssertionBuilderConfig::new()
///     .with_token(|_| Strategy::Strict)
///     .with_unknown(|_| Strategy::None);
/// ```
#[derive(Clone, Default)]
pub struct AssertionBuilderConfig {
    system: Option<StrategySelector>,
    token: Option<StrategySelector>,
    token_2022: Option<StrategySelector>,
    stake: Option<StrategySelector>,
    upgradeable_loader: Option<StrategySelector>,
    unknown: Option<StrategySelector>,
}

impl AssertionBuilderConfig {
    /// Empty policy; every owner encountered will fail until covered
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selector for system-program accounts (including accounts
    /// that do not exist yet at simulation time)
    pub fn with_system(
        mut self,
        selector: impl Fn(&ResolvedAccount) -> Strategy + Send + Sync + 'static,
    ) -> Self {
        self.system = Some(Arc::new(selector));
        self
    }

    /// Set the selector for SPL-Token accounts
    pub fn with_token(
        mut self,
        selector: impl Fn(&ResolvedAccount) -> Strategy + Send + Sync + 'static,
    ) -> Self {
        self.token = Some(Arc::new(selector));
        self
    }

    /// Set the selector for Token-2022 accounts
    pub fn with_token_2022(
        mut self,
        selector: impl Fn(&ResolvedAccount) -> Strategy + Send + Sync + 'static,
    ) -> Self {
        self.token_2022 = Some(Arc::new(selector));
        self
    }

    /// Set the selector for stake-program accounts
    pub fn with_stake(
        mut self,
        selector: impl Fn(&ResolvedAccount) -> Strategy + Send + Sync + 'static,
    ) -> Self {
        self.stake = Some(Arc::new(selector));
        self
    }

    /// Set the selector for upgradeable-loader accounts
    pub fn with_upgradeable_loader(
        mut self,
        selector: impl Fn(&ResolvedAccount) -> Strategy + Send + Sync + 'static,
    ) -> Self {
        self.upgradeable_loader = Some(Arc::new(selector));
        self
    }

    /// Set the selector for accounts owned by unrecognized programs
    pub fn with_unknown(
        mut self,
        selector: impl Fn(&ResolvedAccount) -> Strategy + Send + Sync + 'static,
    ) -> Self {
        self.unknown = Some(Arc::new(selector));
        self
    }

    /// Look up the selector for an owner family, if the policy covers it
    pub fn selector_for(&self, owner: ProgramOwner) -> Option<&StrategySelector> {
        match owner {
            ProgramOwner::SystemProgram => self.system.as_ref(),
            ProgramOwner::TokenProgram => self.token.as_ref(),
            ProgramOwner::Token2022Program => self.token_2022.as_ref(),
            ProgramOwner::StakeProgram => self.stake.as_ref(),
            ProgramOwner::UpgradeableLoaderProgram => self.upgradeable_loader.as_ref(),
            ProgramOwner::UnknownProgram => self.unknown.as_ref(),
        }
    }

    /// A policy covering every owner with conservative defaults
    ///
    /// Token, stake and loader accounts get strict field equality. System
    /// accounts with a non-empty byte payload get a content digest; empty
    /// ones get a 2% inclusive lamport band, absorbing fee drift between
    /// simulation and execution. Unknown-program accounts emit no guard.
    pub fn recommended() -> Self {
        Self::new()
            .with_token(|_| Strategy::Strict)
            .with_token_2022(|_| Strategy::Strict)
            .with_system(|account| {
                let has_data = account
                    .account_info()
                    .map(|info| !info.data.is_empty())
                    .unwrap_or(false);
                if has_data {
                    Strategy::HashVerify {
                        start: None,
                        length: None,
                    }
                } else {
                    Strategy::Tolerance {
                        percent: 2,
                        inclusive: true,
                    }
                }
            })
            .with_stake(|_| Strategy::Strict)
            .with_upgradeable_loader(|_| Strategy::Strict)
            .with_unknown(|_| Strategy::None)
    }
}

impl std::fmt::Debug for AssertionBuilderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let covered: Vec<&str> = [
            (self.system.is_some(), "SystemProgram"),
            (self.token.is_some(), "TokenProgram"),
            (self.token_2022.is_some(), "Token2022Program"),
            (self.stake.is_some(), "StakeProgram"),
            (self.upgradeable_loader.is_some(), "UpgradeableLoaderProgram"),
            (self.unknown.is_some(), "UnknownProgram"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();

        f.debug_struct("AssertionBuilderConfig")
            .field("covered_owners", &covered)
            .finish()
    }
}

/// Resolve the strategy for one account from caller policy
///
/// The selector is invoked exactly once per account, with the fully
/// resolved (decoded) account so policy may branch on decoded state.
pub fn resolve_strategy(
    config: &AssertionBuilderConfig,
    account: &ResolvedAccount,
) -> Result<Strategy, GuardInjectError> {
    let owner = account.program_owner();
    let selector = config
        .selector_for(owner)
        .ok_or(GuardInjectError::MissingStrategyForOwner { owner })?;

    Ok(selector(account))
}
