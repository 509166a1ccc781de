//! Row-level persistence, one submodule per table.
//!
//! These modules hold no business rules. They translate between rows and the
//! types in [`crate::model`] and keep the interval predicates in one place:
//! a row is live at `t` when `created_at <= t` and `closed_at` is either null
//! or strictly greater than `t` (same shape for assignment intervals).

pub mod assignments;
pub mod cargo;
pub mod cargo_types;
pub mod pickets;
pub mod platforms;
pub mod warehouses;
