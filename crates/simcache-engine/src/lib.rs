//! Record/replay cache controller for step-driven simulations.
//!
//! [`CacheController`] wraps a [`Subject`](simcache_core::Subject) and
//! runs it in one of two modes fixed by [`CacheConfig`]:
//!
//! - **Record** executes the subject's own step and captures snapshots
//!   every [`StepRate`] steps.
//! - **Replay** restores those snapshots in order without running the
//!   subject's step logic at all.
//!
//! The codec and the store are injected, so what a snapshot contains and
//! where it lives vary independently. [`run_model`](CacheController::run_model)
//! and [`run_until`](CacheController::run_until) drive a run to its end.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod controller;
pub mod driver;

pub use config::{CacheConfig, ConfigError, StepRate};
pub use controller::CacheController;
pub use driver::RunUntilOutcome;
