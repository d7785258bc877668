use crate::error::{L3Error, Result};
use image::GrayImage;
use ndarray::Array2;
use std::path::Path;

/// Converts an 8-bit image array (rows x columns) into a grayscale raster
pub fn to_gray_image(img: &Array2<u8>) -> GrayImage {
    let (rows, cols) = img.dim();
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        image::Luma([img[[y as usize, x as usize]]])
    })
}

/// Writes an 8-bit image array as a grayscale PNG
///
/// # Errors
///
/// Returns [`L3Error::ImageWrite`] if the file cannot be encoded or written
pub fn save_png(img: &Array2<u8>, path: &Path) -> Result<()> {
    to_gray_image(img)
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| L3Error::ImageWrite {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::TempDir;

    #[test]
    fn test_gray_image_orientation() {
        let img = array![[1, 2, 3], [4, 5, 6]];
        let gray = to_gray_image(&img);
        assert_eq!(gray.dimensions(), (3, 2));
        assert_eq!(gray.get_pixel(2, 0).0, [3]);
        assert_eq!(gray.get_pixel(0, 1).0, [4]);
    }

    #[test]
    fn test_save_png_reloads() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("0001.png");
        let img = array![[0, 127], [200, 255]];

        save_png(&img, &path).unwrap();

        let loaded = image::open(&path).unwrap().to_luma8();
        assert_eq!(loaded.dimensions(), (2, 2));
        assert_eq!(loaded.get_pixel(1, 1).0, [255]);
        assert_eq!(loaded.get_pixel(0, 1).0, [200]);
    }

    #[test]
    fn test_save_png_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("0001.png");
        let err = save_png(&array![[0u8]], &path).unwrap_err();
        assert!(err.is_fatal());
    }
}
