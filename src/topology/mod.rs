//! Pure topology analysis: contiguity of picket runs and absorption of
//! existing platforms by a candidate picket set.
//!
//! Nothing here touches persistence. The lifecycle layer feeds these
//! functions a snapshot taken at one instant and applies their decisions
//! inside its own transaction.

pub mod absorption;
pub mod sequence;

pub use absorption::{analyze, AbsorptionPlan, PartialAbsorption, PlatformClaim};
pub use sequence::SequenceIndex;
