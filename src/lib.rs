// Copyright 2026 Stockyard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Stockyard library — bitemporal warehouse topology and cargo ledger.
//!
//! Tracks a warehouse → platform → picket storage hierarchy where platforms
//! are temporary groupings of physically contiguous pickets. Membership is
//! recorded as half-open time intervals, so every query can be answered
//! "as of" any instant. Each platform carries an append-only single-commodity
//! cargo ledger with a running remainder.

#![allow(dead_code, clippy::new_without_default)]

pub mod cli;
pub mod db;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod model;
pub mod store;
pub mod topology;
pub mod tree;

pub use db::Database;
pub use error::{Error, ErrorKind, Result};
