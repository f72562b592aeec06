//! Core types and traits for the simcache record/replay layer.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the abstractions shared by the codec, store, and engine crates:
//! the [`Subject`] contract, the [`CacheMode`] switch, the opaque
//! [`Snapshot`] payload, and the error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod mode;
pub mod snapshot;
pub mod subject;

pub use error::{CacheError, SubjectError};
pub use mode::CacheMode;
pub use snapshot::Snapshot;
pub use subject::Subject;
