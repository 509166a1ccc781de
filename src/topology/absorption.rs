//! Classification of active platforms against a candidate picket set.

use crate::error::{Error, Result};
use crate::model::{PicketId, PlatformId};
use crate::topology::sequence::SequenceIndex;
use std::collections::BTreeSet;

/// An active platform and the picket set it holds at the effective instant.
#[derive(Debug, Clone)]
pub struct PlatformClaim {
    pub id: PlatformId,
    pub name: String,
    pub pickets: BTreeSet<PicketId>,
}

/// One partially-absorbed platform: `released` pickets move to the new
/// platform, `retained` pickets stay behind (verified contiguous).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialAbsorption {
    pub platform_id: PlatformId,
    pub released: Vec<PicketId>,
    pub retained: Vec<PicketId>,
}

/// Side-effect-free absorption decision, consumed by the lifecycle layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbsorptionPlan {
    pub fully_absorbed: Vec<PlatformId>,
    pub partial: Vec<PartialAbsorption>,
}

impl AbsorptionPlan {
    pub fn is_empty(&self) -> bool {
        self.fully_absorbed.is_empty() && self.partial.is_empty()
    }
}

/// Classify every claim against `candidate`.
///
/// A claim whose pickets all lie inside `candidate` is fully absorbed. A
/// claim sharing only some of its pickets is partially absorbed, and its
/// retained set must stay contiguous in `index` — otherwise the creation
/// would split that platform into disjoint parts, and the whole operation is
/// rejected. Claims with an empty intersection are unaffected and do not
/// appear in the plan.
pub fn analyze(
    index: &SequenceIndex,
    claims: &[PlatformClaim],
    candidate: &BTreeSet<PicketId>,
) -> Result<AbsorptionPlan> {
    let mut plan = AbsorptionPlan::default();

    for claim in claims {
        let released: Vec<PicketId> = claim.pickets.intersection(candidate).copied().collect();
        if released.is_empty() {
            continue;
        }
        if released.len() == claim.pickets.len() {
            plan.fully_absorbed.push(claim.id);
            continue;
        }

        let retained: Vec<PicketId> = claim.pickets.difference(candidate).copied().collect();
        let contiguous = index.is_contiguous(retained.iter().copied()).map_err(|id| {
            Error::InvalidOperation(format!(
                "picket {id} held by platform '{}' is not part of the warehouse snapshot",
                claim.name
            ))
        })?;
        if !contiguous {
            return Err(Error::PlatformSplit {
                platform: claim.name.clone(),
                remaining: index.sorted_names(retained.iter().copied()).join(", "),
            });
        }

        plan.partial.push(PartialAbsorption {
            platform_id: claim.id,
            released,
            retained,
        });
    }

    Ok(plan)
}
