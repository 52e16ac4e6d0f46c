use crate::models::BookRecord;
use crate::snapshot::SnapshotTable;

/// Keep the records whose key does not appear in any prior snapshot.
///
/// Order is preserved from extraction. Two *new* records sharing a key are
/// both kept; deduplication only happens against the snapshots, matching
/// the historical export behavior.
pub fn diff_against_snapshots(
    records: Vec<BookRecord>,
    snapshots: &SnapshotTable,
) -> Vec<BookRecord> {
    let key_field = snapshots.key_field();
    let new: Vec<BookRecord> = records
        .into_iter()
        .filter(|record| !snapshots.contains(record.key(key_field)))
        .collect();

    tracing::info!(new = new.len(), key = %key_field, "computed diff");
    new
}
