//! Simulation-driven guard injection for Solana transactions
//!
//! Hardens a built transaction against on-chain state drift between
//! build time and execution time: simulate, classify every account the
//! transaction will mutate, and append guard-program assertions that make
//! the chain itself reject the transaction if the expected post-state no
//! longer holds.
//!
//! ## Architecture
//!
//! - **errors**: error taxonomy with observability hooks
//! - **transport**: network boundary (simulate + account fetch)
//! - **resolver**: owner-driven account classification
//! - **strategy**: verification strategies and caller policy
//! - **guard**: guard-program assertion encoding
//! - **builders**: per-owner guard builders and tolerance math
//! - **injector**: the five-phase injection pipeline
//!
//! ## Usage
//!
//! ```no_run
//! use txguard::{
//!     inject_guards, AssertionBuilderConfig, LogLevel, RpcGuardTransport,
//! };
//! # use solana_sdk::transaction::VersionedTransaction;
//!
//! # async fn example(tx: VersionedTransaction) -> anyhow::Result<()> {
//! let transport = RpcGuardTransport::new("https://api.devnet.solana.com");
//! let result = inject_guards(
//!     AssertionBuilderConfig::recommended(),
//!     LogLevel::Silent,
//!     &transport,
//!     &tx,
//! )
//! .await?;
//!
//! // Sign and broadcast result.injected_tx; result.overhead reports the
//! // byte cost of the appended guards.
//! # Ok(())
//! # }
//! ```

pub mod builders;
pub mod errors;
pub mod guard;
pub mod injector;
pub mod resolver;
pub mod strategy;
pub mod transport;

pub use errors::GuardInjectError;
pub use guard::LogLevel;
pub use injector::{inject_guards, AccountAudit, GuardInjector, InjectionResult};
pub use resolver::{resolve_account, ProgramOwner, ResolvedAccount};
pub use strategy::{AssertionBuilderConfig, Strategy};
pub use transport::{AccountSnapshot, GuardTransport, RpcGuardTransport, SimulationOutcome};
