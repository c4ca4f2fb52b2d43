//! # Shardscan Core
//!
//! The query-optimization and index-materialization core of a query engine layered over a
//! sorted, range-scannable, tablet-partitioned key-value store.
//!
//! The crate covers:
//!
//! - cost ordering and anchor detection over the boolean query tree ([`idx::planner`]),
//! - the Field-Index and Term-Frequency composite key codecs ([`key`]),
//! - prioritised, capacity-aware selection of ivarator spill directories ([`idx::ivarator`]),
//! - the bounded blocking queue and scan-session lifecycle used between scan producers and
//!   evaluation consumers ([`scan`]).
//!
//! Query lifecycle, transport, authorization and ingest concerns live outside of this crate and
//! are reached through the narrow traits exposed here (`IndexedFields`, `StorageProbe`,
//! `Shutdown`).

#[macro_use]
extern crate tracing;

#[macro_use]
mod mac;

pub mod cnf;
pub mod err;
pub mod expr;
pub mod idx;
pub mod key;
pub mod scan;
pub mod syn;
