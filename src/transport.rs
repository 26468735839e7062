//! Network transport boundary for simulation and account fetches
//!
//! The pipeline never talks to an RPC endpoint directly. Everything goes
//! through the [`GuardTransport`] trait so tests can run against an
//! in-memory mock and callers keep ownership of client lifecycle, retry
//! policy, and timeouts. [`RpcGuardTransport`] is the production
//! implementation over the nonblocking Solana RPC client.

use async_trait::async_trait;
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::config::{
    RpcSimulateTransactionAccountsConfig, RpcSimulateTransactionConfig,
};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, pubkey::Pubkey,
    transaction::VersionedTransaction,
};
use solana_transaction_status::UiTransactionEncoding;

use crate::errors::GuardInjectError;

/// Raw view of an on-chain account, as returned by simulation or a
/// direct fetch
///
/// This is the undecoded form the classifier dispatches on: the owner
/// program id is authoritative, the byte payload is self-describing via
/// fixed offsets and leading tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Lamport balance at snapshot time
    pub lamports: u64,
    /// Program that owns the account
    pub owner: Pubkey,
    /// Raw account data
    pub data: Vec<u8>,
    /// Whether the account is executable
    pub executable: bool,
}

impl From<Account> for AccountSnapshot {
    fn from(account: Account) -> Self {
        Self {
            lamports: account.lamports,
            owner: account.owner,
            data: account.data,
            executable: account.executable,
        }
    }
}

/// Result of simulating a transaction with post-execution account snapshots
///
/// `accounts` preserves the ordering of the requested address list; a
/// `None` entry means the account does not exist after execution (or did
/// not exist at all).
#[derive(Debug, Clone, Default)]
pub struct SimulationOutcome {
    /// Execution error reported by the chain, if any
    pub err: Option<String>,
    /// Post-execution snapshots, one per requested address, in request order
    pub accounts: Vec<Option<AccountSnapshot>>,
}

/// Transport capability the injection pipeline requires
///
/// Implementations must preserve input ordering in their output arrays.
/// The pipeline performs no retries of its own; transient failures are
/// surfaced as [`GuardInjectError::Transport`] and retrying is the
/// caller's decision.
#[async_trait]
pub trait GuardTransport: Send + Sync {
    /// Simulate `tx` and return post-execution snapshots for exactly
    /// `addresses`, in order
    async fn simulate_with_accounts(
        &self,
        tx: &VersionedTransaction,
        addresses: &[Pubkey],
    ) -> Result<SimulationOutcome, GuardInjectError>;

    /// Fetch current account state for `addresses`, in order
    async fn fetch_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<AccountSnapshot>>, GuardInjectError>;
}

/// Production transport over the nonblocking Solana RPC client
pub struct RpcGuardTransport {
    client: RpcClient,
}

impl std::fmt::Debug for RpcGuardTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcGuardTransport").finish_non_exhaustive()
    }
}

impl RpcGuardTransport {
    /// Create a transport for the given RPC endpoint URL
    pub fn new(url: impl ToString) -> Self {
        Self {
            client: RpcClient::new(url.to_string()),
        }
    }

    /// Wrap an existing RPC client
    pub fn from_client(client: RpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GuardTransport for RpcGuardTransport {
    async fn simulate_with_accounts(
        &self,
        tx: &VersionedTransaction,
        addresses: &[Pubkey],
    ) -> Result<SimulationOutcome, GuardInjectError> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(CommitmentConfig::confirmed()),
            encoding: Some(UiTransactionEncoding::Base64),
            accounts: Some(RpcSimulateTransactionAccountsConfig {
                encoding: Some(UiAccountEncoding::Base64),
                addresses: addresses.iter().map(|address| address.to_string()).collect(),
            }),
            ..RpcSimulateTransactionConfig::default()
        };

        let response = self
            .client
            .simulate_transaction_with_config(tx, config)
            .await
            .map_err(|e| GuardInjectError::transport(e.to_string()))?;

        let result = response.value;
        let accounts = result
            .accounts
            .unwrap_or_default()
            .into_iter()
            .map(|maybe_account| {
                maybe_account
                    .and_then(|ui_account| ui_account.decode::<Account>())
                    .map(AccountSnapshot::from)
            })
            .collect();

        Ok(SimulationOutcome {
            err: result.err.map(|e| e.to_string()),
            accounts,
        })
    }

    async fn fetch_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<AccountSnapshot>>, GuardInjectError> {
        let accounts = self
            .client
            .get_multiple_accounts(addresses)
            .await
            .map_err(|e| GuardInjectError::transport(e.to_string()))?;

        Ok(accounts
            .into_iter()
            .map(|maybe_account| maybe_account.map(AccountSnapshot::from))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_account() {
        let owner = Pubkey::new_unique();
        let account = Account {
            lamports: 42,
            data: vec![1, 2, 3],
            owner,
            executable: false,
            rent_epoch: 0,
        };

        let snapshot = AccountSnapshot::from(account);
        assert_eq!(snapshot.lamports, 42);
        assert_eq!(snapshot.owner, owner);
        assert_eq!(snapshot.data, vec![1, 2, 3]);
        assert!(!snapshot.executable);
    }
}
