use crate::extraction::ImageRecord;
use std::collections::BTreeMap;

/// CT records sharing one Series Instance UID
#[derive(Debug, Clone)]
pub struct SeriesGroup {
    /// Series Instance UID shared by every member
    pub series_uid: String,

    /// Member records, in no particular order
    pub records: Vec<ImageRecord>,
}

impl SeriesGroup {
    /// Number of slices in the series
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Checks if the series holds no slices
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Partitions records into candidate CT series
///
/// Non-CT records are dropped, the rest are grouped by series identifier and
/// only groups with at least `min_slices` members are kept. Scout and
/// localizer series rarely reach that size.
///
/// # Returns
///
/// Qualifying groups ordered by series identifier
pub fn group_series(records: Vec<ImageRecord>, min_slices: usize) -> Vec<SeriesGroup> {
    let mut by_uid: BTreeMap<String, Vec<ImageRecord>> = BTreeMap::new();
    for record in records.into_iter().filter(ImageRecord::is_ct) {
        by_uid
            .entry(record.series_uid.clone())
            .or_default()
            .push(record);
    }

    by_uid
        .into_iter()
        .filter(|(_, members)| members.len() >= min_slices)
        .map(|(series_uid, records)| SeriesGroup {
            series_uid,
            records,
        })
        .collect()
}

/// Selects the primary CT series of one patient
///
/// The primary series is the qualifying group with the most slices. Among
/// equally large groups the lexicographically smallest series identifier
/// wins, so the choice does not depend on file system order.
///
/// # Returns
///
/// `None` when no series qualifies, which is expected for patients that only
/// carry localizer scans
pub fn select_primary_series(records: Vec<ImageRecord>, min_slices: usize) -> Option<SeriesGroup> {
    let mut primary: Option<SeriesGroup> = None;
    for group in group_series(records, min_slices) {
        // Strictly greater keeps the first maximum in identifier order
        if primary.as_ref().map_or(true, |best| group.len() > best.len()) {
            primary = Some(group);
        }
    }
    primary
}
