//! Guard-injection orchestrator
//!
//! The top-level pipeline over a compiled transaction, in five ordered
//! phases with no phase retried or skipped:
//!
//! 1. **Extract**: collect the deduplicated writable + signer account
//!    set from the compiled message; the fee payer always joins it
//! 2. **Simulate**: request post-execution snapshots for exactly that
//!    set; an execution error or a count mismatch aborts
//! 3. **Classify**: resolve each account from its simulated snapshot,
//!    in extraction order
//! 4. **Strategize & build**: resolve each account's strategy from
//!    caller policy and dispatch to the matching guard builder
//! 5. **Recompile & measure**: append the accumulated guards, rebuild
//!    the transaction, report byte overhead
//!
//! Failure in phases 2-4 aborts the whole pipeline: the guard set is
//! all-or-nothing, because a transaction with guards for only some
//! accounts gives false confidence.
//!
//! The transport is passed in by the caller (no global RPC state), so
//! tests run the full pipeline against an in-memory mock.

use std::collections::HashMap;

use solana_sdk::{
    instruction::Instruction, pubkey::Pubkey, transaction::VersionedTransaction,
};
use tracing::{debug, info};

use crate::builders::build_account_guards;
use crate::errors::GuardInjectError;
use crate::guard::LogLevel;
use crate::resolver::{resolve_account, ResolvedAccount};
use crate::strategy::{resolve_strategy, AssertionBuilderConfig, Strategy};
use crate::transport::{AccountSnapshot, GuardTransport};

mod message;

/// Per-account audit record kept for observability and testing
#[derive(Debug, Clone)]
pub struct AccountAudit {
    /// Current on-chain state from the direct fetch (pre-execution)
    pub raw_account: Option<AccountSnapshot>,
    /// Classification of the simulated post-execution snapshot
    pub resolved: ResolvedAccount,
    /// Strategy the caller's policy selected for this account
    pub applied_strategy: Strategy,
}

/// Output of a successful injection pass
#[derive(Debug, Clone)]
pub struct InjectionResult {
    /// Serialized byte length of the original transaction
    pub pre_tx_length: usize,
    /// Serialized byte length of the rebuilt transaction
    pub post_tx_length: usize,
    /// `post_tx_length - pre_tx_length`
    pub overhead: i64,
    /// Injected guard instructions, in account-extraction order
    pub injection_ixs: Vec<Instruction>,
    /// The rebuilt, unsigned transaction with guards appended
    pub injected_tx: VersionedTransaction,
    /// Audit record per guarded account
    pub accounts: HashMap<Pubkey, AccountAudit>,
}

/// Guard-injection pipeline with a fixed policy and log level
///
/// Construct once, inject into as many transactions as needed; every
/// invocation is a pure function of (policy, transaction, network
/// responses).
#[derive(Debug, Clone)]
pub struct GuardInjector {
    config: AssertionBuilderConfig,
    log_level: LogLevel,
}

impl GuardInjector {
    pub fn new(config: AssertionBuilderConfig, log_level: LogLevel) -> Self {
        Self { config, log_level }
    }

    /// Run the full pipeline against `tx`
    ///
    /// # Errors
    ///
    /// Any classification, policy, builder, or transport failure aborts
    /// with no partial result; see [`GuardInjectError`] for the taxonomy.
    pub async fn inject<T>(
        &self,
        transport: &T,
        tx: &VersionedTransaction,
    ) -> Result<InjectionResult, GuardInjectError>
    where
        T: GuardTransport + ?Sized,
    {
        message::ensure_static_keys_only(&tx.message)?;

        // Phase 1: extract the guard set.
        let (writable_accounts, signer_accounts) = message::writables_and_signers(&tx.message);
        debug!(
            writable = writable_accounts.len(),
            signers = signer_accounts.len(),
            "extracted guard set"
        );

        // Phase 2: simulate with post-execution snapshots.
        let simulation = transport
            .simulate_with_accounts(tx, &writable_accounts)
            .await?;
        if let Some(err) = simulation.err {
            return Err(GuardInjectError::simulation_failed(err));
        }
        if simulation.accounts.len() != writable_accounts.len() {
            return Err(GuardInjectError::SimulationAccountCountMismatch {
                expected: writable_accounts.len(),
                actual: simulation.accounts.len(),
            });
        }

        // Current state, for the audit trail alongside the simulated view.
        let raw_accounts = transport.fetch_accounts(&writable_accounts).await?;
        if raw_accounts.len() != writable_accounts.len() {
            return Err(GuardInjectError::transport(format!(
                "account fetch returned {} entries, expected {}",
                raw_accounts.len(),
                writable_accounts.len()
            )));
        }

        // Phases 3 and 4: classify, resolve strategy, build guards. Each
        // account is independent, but instruction order must stay
        // extraction order: guards execute on chain in this order.
        let mut injection_ixs: Vec<Instruction> = Vec::new();
        let mut accounts: HashMap<Pubkey, AccountAudit> = HashMap::new();

        for ((address, snapshot), raw_account) in writable_accounts
            .iter()
            .zip(simulation.accounts)
            .zip(raw_accounts)
        {
            let resolved = resolve_account(*address, snapshot)?;
            let strategy = resolve_strategy(&self.config, &resolved)?;

            let guards = build_account_guards(&resolved, &strategy, self.log_level)?;
            debug!(
                account = %address,
                owner = %resolved.program_owner(),
                strategy = strategy.name(),
                guards = guards.len(),
                "built account guards"
            );
            injection_ixs.extend(guards);

            accounts.insert(
                *address,
                AccountAudit {
                    raw_account,
                    resolved,
                    applied_strategy: strategy,
                },
            );
        }

        // Phase 5: rebuild and measure.
        let mut instructions = message::decompile_instructions(&tx.message)?;
        instructions.extend(injection_ixs.iter().cloned());
        let injected_tx = message::recompile(&tx.message, &instructions)?;

        let pre_tx_length = serialized_length(tx)?;
        let post_tx_length = serialized_length(&injected_tx)?;
        let overhead = post_tx_length as i64 - pre_tx_length as i64;
        info!(
            accounts = accounts.len(),
            guards = injection_ixs.len(),
            pre_tx_length,
            post_tx_length,
            overhead,
            "guard injection complete"
        );

        Ok(InjectionResult {
            pre_tx_length,
            post_tx_length,
            overhead,
            injection_ixs,
            injected_tx,
            accounts,
        })
    }
}

/// Single-call convenience wrapper around [`GuardInjector`]
pub async fn inject_guards<T>(
    config: AssertionBuilderConfig,
    log_level: LogLevel,
    transport: &T,
    tx: &VersionedTransaction,
) -> Result<InjectionResult, GuardInjectError>
where
    T: GuardTransport + ?Sized,
{
    GuardInjector::new(config, log_level).inject(transport, tx).await
}

fn serialized_length(tx: &VersionedTransaction) -> Result<usize, GuardInjectError> {
    bincode::serialize(tx)
        .map(|bytes| bytes.len())
        .map_err(|e| GuardInjectError::internal(format!("transaction serialize failed: {e}")))
}
