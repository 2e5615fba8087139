use crate::models::ListingRecord;
use std::collections::HashSet;

/// Merge a freshly ingested batch into the existing dataset.
///
/// Rows are ordered existing-then-incoming; among rows sharing a key only the
/// last one survives, at its own position. Rows without a positive price are
/// dropped. Sequence numbers are reassigned as `1..=N` in final row order.
pub fn merge(existing: Option<Vec<ListingRecord>>, incoming: Vec<ListingRecord>) -> Vec<ListingRecord> {
    let combined: Vec<ListingRecord> = existing
        .unwrap_or_default()
        .into_iter()
        .chain(incoming)
        .filter(ListingRecord::is_admissible)
        .collect();

    let mut seen = HashSet::with_capacity(combined.len());
    let mut merged: Vec<ListingRecord> = combined
        .into_iter()
        .rev()
        .filter(|record| seen.insert(record.key()))
        .collect();
    merged.reverse();

    resequence(&mut merged);
    merged
}

/// Number rows `1..=N` in their current order
pub fn resequence(records: &mut [ListingRecord]) {
    for (idx, record) in records.iter_mut().enumerate() {
        record.sequence = idx as u32 + 1;
    }
}
