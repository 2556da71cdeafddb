//! pipq benchmarking suite
//!
//! This crate contains benchmarks for the parsing and matching hot paths:
//! version parsing, ordering, requirement parsing and dependency filtering.

pub mod common;

pub use common::*;
