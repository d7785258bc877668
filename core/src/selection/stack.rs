use crate::extraction::ImageRecord;

/// Orders a series into a spatially coherent stack
///
/// When every slice has a finite Z position the stack is sorted by
/// (Z, instance number) ascending. Otherwise instance number alone is used,
/// which scanners assign monotonically along the scan axis.
///
/// # Arguments
///
/// * `records` - Records of one series
///
/// # Returns
///
/// The sorted stack; all positional reasoning assumes this order
pub fn sort_stack(mut records: Vec<ImageRecord>) -> Vec<ImageRecord> {
    if has_spatial_order(&records) {
        records.sort_by(|a, b| {
            a.z_position
                .total_cmp(&b.z_position)
                .then(a.instance_number.cmp(&b.instance_number))
        });
    } else {
        records.sort_by_key(|r| r.instance_number);
    }
    records
}

/// Checks if every record carries a usable Z position
pub fn has_spatial_order(records: &[ImageRecord]) -> bool {
    records.iter().all(|r| r.z_position.is_finite())
}
