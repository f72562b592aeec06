//! Test subjects and codecs for simcache development.
//!
//! - [`Fibonacci`] is the deterministic reference subject.
//! - [`ReplayOnly`] wraps a subject so that any call to its step fails,
//!   which proves replay restores state instead of simulating.
//! - [`CurrentOnlyCodec`] stores a single `u64` per snapshot.
//! - [`Colony`] owns a scheduler and a [`DataCollector`] for exercising
//!   [`StrippedCodec`].
//!
//! [`DataCollector`]: simcache_codec::DataCollector
//! [`StrippedCodec`]: simcache_codec::StrippedCodec

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{Colony, CurrentOnlyCodec, Fibonacci, ReplayOnly};
