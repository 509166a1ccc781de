//! Contiguity checks over a warehouse's picket-name ordering.

use crate::model::PicketId;
use std::collections::HashMap;

/// Sorted-name index over the pickets of one warehouse at one instant.
///
/// Each picket gets a rank in the lexicographic ordering of names. A set of
/// pickets is contiguous when its ranks form one unbroken window; the window
/// check never rescans the name list, only the rank lookup.
#[derive(Debug, Clone)]
pub struct SequenceIndex {
    // (name, id) pairs sorted by name; rank == index into this vec
    names: Vec<(String, PicketId)>,
    position: HashMap<PicketId, usize>,
}

impl SequenceIndex {
    /// Build the index from `(id, name)` pairs. Names are expected to be
    /// unique within the warehouse at the snapshot instant.
    pub fn new(pickets: impl IntoIterator<Item = (PicketId, String)>) -> Self {
        let mut names: Vec<(String, PicketId)> =
            pickets.into_iter().map(|(id, name)| (name, id)).collect();
        names.sort();
        let position = names
            .iter()
            .enumerate()
            .map(|(rank, (_, id))| (*id, rank))
            .collect();
        Self { names, position }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, id: PicketId) -> bool {
        self.position.contains_key(&id)
    }

    /// Rank of a picket in the name ordering, if it is indexed.
    pub fn position(&self, id: PicketId) -> Option<usize> {
        self.position.get(&id).copied()
    }

    pub fn name_of(&self, id: PicketId) -> Option<&str> {
        self.position
            .get(&id)
            .map(|&rank| self.names[rank].0.as_str())
    }

    /// Ranks of `ids`, sorted ascending. Fails with the first id that is not
    /// indexed. `ids` must not contain duplicates.
    pub fn positions(
        &self,
        ids: impl IntoIterator<Item = PicketId>,
    ) -> Result<Vec<usize>, PicketId> {
        let mut ranks = Vec::new();
        for id in ids {
            match self.position.get(&id) {
                Some(&rank) => ranks.push(rank),
                None => return Err(id),
            }
        }
        ranks.sort_unstable();
        Ok(ranks)
    }

    /// Whether `ids` occupy one unbroken window of the name ordering. Zero or
    /// one picket is trivially contiguous.
    pub fn is_contiguous(
        &self,
        ids: impl IntoIterator<Item = PicketId>,
    ) -> Result<bool, PicketId> {
        let ranks = self.positions(ids)?;
        Ok(ranks.windows(2).all(|w| w[1] == w[0] + 1))
    }

    /// Names of `ids` in name order, for error messages. Unknown ids are
    /// skipped.
    pub fn sorted_names(&self, ids: impl IntoIterator<Item = PicketId>) -> Vec<&str> {
        let mut ranks: Vec<usize> = ids.into_iter().filter_map(|id| self.position(id)).collect();
        ranks.sort_unstable();
        ranks.into_iter().map(|r| self.names[r].0.as_str()).collect()
    }
}
