//! Conversions between record lists and keyed collections.

use crate::{Definition, Index, Record};
use tracing::trace;

/// File each record under its key. Later records win on duplicate keys.
///
/// Records without a key are skipped.
pub fn index(records: &[Record], definition: &Definition) -> Index {
    records
        .iter()
        .filter_map(|record| match definition.get_key(record) {
            Some(key) => Some((key, record.clone())),
            None => {
                trace!("record without key left out of index");
                None
            }
        })
        .collect()
}

/// The records of a collection, in key order.
pub fn deindex(index: &Index) -> Vec<Record> {
    index.iter().map(|(_, record)| record.clone()).collect()
}
