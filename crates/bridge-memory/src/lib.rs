//! Memory Layer - Context store and thought traces for Tone Bridge
//!
//! This crate provides:
//! - A capacity- and TTL-bounded store of context entries, gated per role
//! - Append-only thought traces with per-trace locking
//! - Role-to-role transfer with consumer-side filtering
//! - A background sweep with deterministic shutdown, reusable by any
//!   [`Sweep`] implementor
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bridge_core::{EntryKind, Role, StoreConfig};
//! use bridge_memory::{ContextStore, PutOptions};
//!
//! # async fn example() {
//! let store = Arc::new(ContextStore::new(StoreConfig::default()));
//! store.start_sweeper(store.config().cleanup_interval());
//!
//! let id = store.put(Role::Producer, EntryKind::State, "server restarted", PutOptions::new());
//! assert!(store.get(&id, Role::Consumer).is_none());
//!
//! store.shutdown().await;
//! # }
//! ```

mod clock;
mod store;
mod sweeper;
mod thought;
mod transfer;

pub use store::{ContextQuery, ContextStore, PutOptions, StoreStats, SweepReport};
pub use sweeper::{Sweep, SweeperHandle};
pub use thought::ThoughtRegistry;
pub use transfer::{TransferResult, NEUTRAL_TRANSFER_MESSAGE};
