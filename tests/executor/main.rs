//! Executor Layer Tests
//!
//! End-to-end tests through the public `haystackdb` API:
//! - operation registry and path dispatch
//! - entity reads (checked/unchecked, alignment)
//! - priority writes
//! - watch lifecycle and leases
//! - history reads and writes
//! - config and seed files

mod common;

mod adversarial;
mod command_dispatch;
mod error_handling;
mod history;
mod read_invariants;
mod serialization;
mod watch_lifecycle;
mod write_register;
