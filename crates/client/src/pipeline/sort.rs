//! Sort comparator dispatched on the declared column kind.

use std::cmp::Ordering;

use adminlist_core::{FieldKind, Record};

use super::state::{SortOrder, SortState};

/// Pre-extracted sort key; missing values sort first in ascending order.
///
/// Text keys compare lowercased strings by code point. This matches locale
/// order for unaccented text only: accented letters such as `É` sort after
/// `z` rather than next to their base letter.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Missing,
    Number(f64),
    Timestamp(i64),
    Text(String),
}

impl SortKey {
    fn extract<R: Record>(record: &R, field: &str, kind: FieldKind) -> Self {
        let Some(value) = record.field(field) else {
            return SortKey::Missing;
        };
        let key = match kind {
            FieldKind::Number => value.as_number().map(SortKey::Number),
            FieldKind::Date => value
                .as_timestamp()
                .map(|ts| SortKey::Timestamp(ts.timestamp_millis())),
            FieldKind::Text => value
                .search_text()
                .map(|text| SortKey::Text(text.to_lowercase())),
        };
        key.unwrap_or(SortKey::Missing)
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Missing => 0,
            _ => 1,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Stable sort of `rows` by `sort`. Equal keys keep their input order in
/// both directions.
pub(crate) fn sort_rows<R: Record>(rows: &mut Vec<&R>, sort: &SortState, kind: FieldKind) {
    let mut keyed: Vec<(SortKey, &R)> = rows
        .iter()
        .map(|row| (SortKey::extract(*row, &sort.order_by, kind), *row))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match sort.order {
        SortOrder::Ascending => a.compare(b),
        SortOrder::Descending => b.compare(a),
    });

    rows.clear();
    rows.extend(keyed.into_iter().map(|(_, row)| row));
}
