//! Interface to the verification ledger.
//!
//! The ledger is an external contract exposing two writes
//! (`requestVerification`, `completeVerification`) and an append-only event
//! log. This crate defines the event types, the [`LedgerClient`] read trait
//! and [`Wallet`] write trait the rest of the workspace programs against,
//! a JSON-RPC implementation of the read side, and an in-memory mock chain
//! for tests and demo runs.

pub mod client;
pub mod error;
pub mod event;
pub mod mock;
pub mod rpc;
pub mod wallet;

pub use client::LedgerClient;
pub use error::LedgerError;
pub use event::{CompletedEvent, RequestedEvent, COMPLETED_SIGNATURE, REQUESTED_SIGNATURE};
pub use mock::{MockLedger, MockWallet};
pub use rpc::RpcLedger;
pub use wallet::{Receipt, Wallet};
