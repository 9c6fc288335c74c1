//! Unconfirmed transaction pool.
//!
//! Subscribes to the consensus engine and replays every revert/apply update
//! onto its own view: transactions confirmed by applied blocks leave the
//! pool, transactions of reverted blocks return to it, and entries that a
//! chain change has invalidated are purged together with their dependents.

#[macro_use]
extern crate log;
extern crate parking_lot;
extern crate chain;
extern crate consensus;

#[cfg(test)]
extern crate network;
#[cfg(test)]
extern crate test_data;

mod error;
mod pool;

pub use error::Error;
pub use pool::{TransactionPool, MempoolSubscriber, TRANSACTION_SIZE_LIMIT};
