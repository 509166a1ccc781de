//! Point-in-time snapshot of the whole yard as a tree.
//!
//! Read-only composition: warehouses live at the instant, their platforms in
//! name order, each platform's pickets and the booking in force. Nodes carry
//! an explicit `kind` discriminator so consumers can dispatch on the tag
//! instead of guessing from the shape.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::lifecycle::effective_at;
use crate::model::{CargoTypeId, PicketId, PlatformId, WarehouseId};
use crate::store;

/// The booking in force on a platform at the snapshot instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CargoSummary {
    pub cargo_type: String,
    pub remainder: Decimal,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeNode {
    Warehouse {
        id: WarehouseId,
        name: String,
        platforms: Vec<TreeNode>,
    },
    Platform {
        id: PlatformId,
        name: String,
        /// `None` is the explicit "no cargo" marker.
        cargo: Option<CargoSummary>,
        pickets: Vec<TreeNode>,
    },
    Picket {
        id: PicketId,
        name: String,
    },
}

/// Build the snapshot for `at` (defaulting to now), optionally narrowed to
/// platforms holding a nonzero remainder of one cargo type. Under a filter,
/// warehouses left with no matching platform are dropped from the result.
pub fn build(
    db: &Database,
    at: Option<DateTime<Utc>>,
    cargo_type: Option<CargoTypeId>,
) -> Result<Vec<TreeNode>> {
    let t = effective_at(at);
    let conn = db.conn();
    if let Some(id) = cargo_type {
        store::cargo_types::get(conn, id)?
            .ok_or_else(|| Error::CargoTypeNotFound(id.to_string()))?;
    }
    let type_names: HashMap<CargoTypeId, String> = store::cargo_types::list(conn)?
        .into_iter()
        .map(|ct| (ct.id, ct.name))
        .collect();

    let mut roots = Vec::new();
    for warehouse in store::warehouses::active_at(conn, t)? {
        let mut platform_nodes = Vec::new();
        for platform in store::platforms::active_at(conn, warehouse.id, t)? {
            let record = store::cargo::latest_at_or_before(conn, platform.id, t)?;
            if let Some(filter_id) = cargo_type {
                let matches = record
                    .as_ref()
                    .is_some_and(|r| r.cargo_type_id == filter_id && r.remainder > Decimal::ZERO);
                if !matches {
                    continue;
                }
            }
            let cargo = record.map(|r| CargoSummary {
                cargo_type: type_names
                    .get(&r.cargo_type_id)
                    .cloned()
                    .unwrap_or_else(|| r.cargo_type_id.to_string()),
                remainder: r.remainder,
                recorded_at: r.recorded_at,
            });
            let pickets = store::assignments::pickets_at(conn, platform.id, t)?
                .into_iter()
                .map(|p| TreeNode::Picket {
                    id: p.id,
                    name: p.name,
                })
                .collect();
            platform_nodes.push(TreeNode::Platform {
                id: platform.id,
                name: platform.name,
                cargo,
                pickets,
            });
        }
        if cargo_type.is_some() && platform_nodes.is_empty() {
            continue;
        }
        roots.push(TreeNode::Warehouse {
            id: warehouse.id,
            name: warehouse.name,
            platforms: platform_nodes,
        });
    }
    Ok(roots)
}
