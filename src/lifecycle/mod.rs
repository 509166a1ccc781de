// Copyright 2026 Stockyard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Mutating operations over the warehouse hierarchy.
//!
//! Every function here resolves the optional `at` instant once at the
//! boundary, then runs all of its reads and writes inside one immediate
//! transaction so validation and mutation see the same snapshot. Errors roll
//! the whole operation back.

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::error::{Error, Result};
use crate::model::WarehouseId;
use crate::store;
use crate::topology::{PlatformClaim, SequenceIndex};

pub mod pickets;
pub mod platforms;
pub mod warehouses;

/// Resolve the caller's optional instant. `None` means the present, pinned
/// exactly once so every statement in the operation agrees on the time.
pub(crate) fn effective_at(at: Option<DateTime<Utc>>) -> DateTime<Utc> {
    at.unwrap_or_else(Utc::now)
}

/// Trim and reject blank names.
pub(crate) fn clean_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::InvalidOperation("name must not be blank".into()));
    }
    Ok(name.to_string())
}

/// Every platform live at `t` with the picket set it held at `t`.
pub(crate) fn load_claims(
    conn: &Connection,
    warehouse_id: WarehouseId,
    t: DateTime<Utc>,
) -> Result<Vec<PlatformClaim>> {
    let platforms = store::platforms::active_at(conn, warehouse_id, t)?;
    let mut claims = Vec::with_capacity(platforms.len());
    for platform in platforms {
        let ids = store::assignments::picket_ids_at(conn, platform.id, t)?;
        claims.push(PlatformClaim {
            id: platform.id,
            name: platform.name,
            pickets: ids.into_iter().collect(),
        });
    }
    Ok(claims)
}

/// Sweep the claims against a (possibly hypothetical) picket sequence and
/// report the name of the first platform whose run would no longer be
/// unbroken. A claim referencing an id absent from the sequence counts as
/// broken.
pub(crate) fn broken_claim(index: &SequenceIndex, claims: &[PlatformClaim]) -> Option<String> {
    for claim in claims {
        if claim.pickets.is_empty() {
            continue;
        }
        match index.is_contiguous(claim.pickets.iter().copied()) {
            Ok(true) => {}
            Ok(false) | Err(_) => return Some(claim.name.clone()),
        }
    }
    None
}
