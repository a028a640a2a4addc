use std::time::Duration;

use crate::state::FilterKind;

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadPage { offset: u32, limit: u32 },
    LoadNameIndex,
    LoadTypes,
    LoadGenerations,
    LoadFilterMembers { kind: FilterKind, name: String },
    /// Debounced by `delay`; a newer fetch replaces a pending one.
    SearchFetch { names: Vec<String>, delay: Duration },
    CancelSearchFetch,
    LoadEvolution { name: String },
}
