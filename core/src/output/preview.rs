use crate::error::{L3Error, Result};
use crate::output::index::IndexRow;
use image::imageops::{self, FilterType};
use image::GrayImage;
use std::path::{Path, PathBuf};

/// Edge length of each tile in a preview montage
pub const TILE_SIZE: u32 = 256;

/// Writes one contact sheet per patient for a quick visual check
///
/// The first `max_patients` patients (in index order) get a montage of up to
/// `per_patient` evenly spaced saved slices, tiled left to right and stored
/// as `<figures>/preview_<patient_id>.png`.
///
/// # Returns
///
/// Paths of the written montages
pub fn write_previews(
    rows: &[IndexRow],
    figures: &Path,
    max_patients: usize,
    per_patient: usize,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if per_patient == 0 {
        return Ok(written);
    }

    for (patient_id, patient_rows) in group_by_patient(rows).into_iter().take(max_patients) {
        let picks = spread(patient_rows.len(), per_patient);
        let mut tiles = Vec::with_capacity(picks.len());
        for i in picks {
            let path = Path::new(&patient_rows[i].saved_path);
            let tile = image::open(path)
                .map_err(|e| L3Error::DecodeError {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?
                .to_luma8();
            tiles.push(imageops::resize(&tile, TILE_SIZE, TILE_SIZE, FilterType::Triangle));
        }

        std::fs::create_dir_all(figures).map_err(|source| L3Error::OutputDir {
            path: figures.to_path_buf(),
            source,
        })?;
        let out = figures.join(format!("preview_{}.png", patient_id));
        montage(&tiles)
            .save_with_format(&out, image::ImageFormat::Png)
            .map_err(|source| L3Error::ImageWrite {
                path: out.clone(),
                source,
            })?;
        written.push(out);
    }

    Ok(written)
}

/// Groups consecutive rows by patient, keeping first-seen order
fn group_by_patient(rows: &[IndexRow]) -> Vec<(&str, Vec<&IndexRow>)> {
    let mut groups: Vec<(&str, Vec<&IndexRow>)> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|(id, _)| *id == row.patient_id) {
            Some((_, members)) => members.push(row),
            None => groups.push((row.patient_id.as_str(), vec![row])),
        }
    }
    groups
}

/// Up to `count` evenly spaced positions in `0..len`
fn spread(len: usize, count: usize) -> Vec<usize> {
    let count = count.min(len);
    (0..count).map(|k| k * len / count).collect()
}

fn montage(tiles: &[GrayImage]) -> GrayImage {
    let mut sheet = GrayImage::new(TILE_SIZE * tiles.len().max(1) as u32, TILE_SIZE);
    for (i, tile) in tiles.iter().enumerate() {
        imageops::overlay(&mut sheet, tile, i as i64 * TILE_SIZE as i64, 0);
    }
    sheet
}
