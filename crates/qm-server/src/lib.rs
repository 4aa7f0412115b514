//! Quest ledger server: library crate.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `qm-e2e-tests`) can reach `AppState`, `build_router`, and the
//! in-memory `TaskStore`.

pub mod config;
pub mod error;
pub mod executor;
pub mod flavor;
pub mod routes;
pub mod state;
pub mod store;
