use crate::error::{L3Error, Result};
use crate::extraction::tags::{
    get_float_value, get_int_value, get_multi_float_value, get_string_value,
    IMAGE_POSITION_PATIENT, INSTANCE_NUMBER, MODALITY, RESCALE_INTERCEPT, RESCALE_SLOPE,
    SERIES_INSTANCE_UID, SLICE_LOCATION,
};
use crate::types::Rescale;
use dicom_object::file::{OpenFileOptions, ReadPreamble};
use dicom_object::{FileDicomObject, InMemDicomObject};
use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder};
use log::debug;
use ndarray::{s, Array2};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Series identifier used when SeriesInstanceUID is absent or blank
pub const UNKNOWN_SERIES: &str = "UNKNOWN";

/// Where a record's pixels come from
#[derive(Debug, Clone)]
enum PixelSource {
    /// Decoded on demand from the parsed file
    Dicom(Box<FileDicomObject<InMemDicomObject>>),
    /// Already materialized stored values
    Raw(Array2<i32>),
}

/// One 2D CT slice: tolerant metadata plus its pixel source
///
/// Every metadata field has an explicit default so that building a record
/// never fails because an attribute is missing:
///
/// | field | source | default |
/// |---|---|---|
/// | `modality` | Modality, upper-cased | `""` |
/// | `series_uid` | SeriesInstanceUID | `"UNKNOWN"` |
/// | `instance_number` | InstanceNumber | `0` |
/// | `z_position` | ImagePositionPatient\[2\], then SliceLocation | `NaN` |
/// | `rescale` | RescaleSlope / RescaleIntercept | `1.0` / `0.0` |
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// Path to the DICOM file
    pub file_path: PathBuf,

    /// Acquisition modality
    pub modality: String,

    /// Series Instance UID
    pub series_uid: String,

    /// Instance number within the series
    pub instance_number: i32,

    /// Craniocaudal position in patient coordinates (mm)
    pub z_position: f64,

    /// HU calibration
    pub rescale: Rescale,

    pixels: PixelSource,
}

impl ImageRecord {
    /// Creates a record from a DICOM file path
    ///
    /// Files without the 128-byte preamble are accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable, truncated or not DICOM.
    /// Callers treat this as "skip this file".
    pub fn from_file(path: PathBuf) -> Result<Self> {
        let dcm = OpenFileOptions::new()
            .read_preamble(ReadPreamble::Auto)
            .open_file(&path)?;
        Ok(Self::from_dicom(path, dcm))
    }

    /// Creates a record from an already-opened DICOM object
    pub fn from_dicom(path: PathBuf, dcm: FileDicomObject<InMemDicomObject>) -> Self {
        Self {
            file_path: path,
            modality: get_string_value(&dcm, MODALITY)
                .unwrap_or_default()
                .to_uppercase(),
            series_uid: get_string_value(&dcm, SERIES_INSTANCE_UID)
                .filter(|uid| !uid.is_empty())
                .unwrap_or_else(|| UNKNOWN_SERIES.to_string()),
            instance_number: get_int_value(&dcm, INSTANCE_NUMBER).unwrap_or(0),
            z_position: extract_z_position(&dcm),
            rescale: extract_rescale(&dcm),
            pixels: PixelSource::Dicom(Box::new(dcm)),
        }
    }

    /// Creates a record around stored values that are already in memory
    pub fn from_pixels(
        path: PathBuf,
        modality: &str,
        series_uid: &str,
        instance_number: i32,
        z_position: f64,
        rescale: Rescale,
        pixels: Array2<i32>,
    ) -> Self {
        Self {
            file_path: path,
            modality: modality.to_uppercase(),
            series_uid: series_uid.to_string(),
            instance_number,
            z_position,
            rescale,
            pixels: PixelSource::Raw(pixels),
        }
    }

    /// Checks if this record belongs to a CT acquisition
    pub fn is_ct(&self) -> bool {
        self.modality == "CT"
    }

    /// Materializes the stored pixel values of the first frame
    ///
    /// No modality LUT is applied; use [`crate::imaging::to_hu`] with
    /// [`ImageRecord::rescale`] for calibrated values.
    ///
    /// # Errors
    ///
    /// Returns [`L3Error::DecodeError`] if the pixel data is missing or uses
    /// an unsupported transfer syntax
    pub fn pixels(&self) -> Result<Array2<i32>> {
        match &self.pixels {
            PixelSource::Raw(arr) => Ok(arr.clone()),
            PixelSource::Dicom(dcm) => {
                let decode_error = |message: String| L3Error::DecodeError {
                    path: self.file_path.clone(),
                    message,
                };
                let decoded = dcm
                    .decode_pixel_data()
                    .map_err(|e| decode_error(e.to_string()))?;
                let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
                let frames = decoded
                    .to_ndarray_with_options::<f32>(&options)
                    .map_err(|e| decode_error(e.to_string()))?;
                if frames.shape().iter().any(|&d| d == 0) {
                    return Err(decode_error("empty pixel data".to_string()));
                }
                // Stored values are integral; the cast only changes representation
                Ok(frames.slice_move(s![0, .., .., 0]).mapv(|v| v as i32))
            }
        }
    }
}

/// Z position: ImagePositionPatient[2], then SliceLocation, else NaN
fn extract_z_position(dcm: &InMemDicomObject) -> f64 {
    get_multi_float_value(dcm, IMAGE_POSITION_PATIENT)
        .and_then(|pos| pos.get(2).copied())
        .or_else(|| get_float_value(dcm, SLICE_LOCATION))
        .unwrap_or(f64::NAN)
}

fn extract_rescale(dcm: &InMemDicomObject) -> Rescale {
    Rescale::new(
        get_float_value(dcm, RESCALE_SLOPE).unwrap_or(1.0),
        get_float_value(dcm, RESCALE_INTERCEPT).unwrap_or(0.0),
    )
}

/// Checks if a file is a plausible DICOM candidate
///
/// Accepted when the name carries a `.dcm`/`.dicom` extension (any case) or
/// when the 4-byte `DICM` magic sits at offset 128 after the preamble.
pub fn is_dicom_candidate(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    if let Some(ext) = path.extension() {
        if ext.eq_ignore_ascii_case("dcm") || ext.eq_ignore_ascii_case("dicom") {
            return true;
        }
    }
    has_dicom_magic(path)
}

fn has_dicom_magic(path: &Path) -> bool {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    // 128-byte preamble + 4-byte "DICM" magic
    let mut buffer = [0u8; 132];
    match file.read_exact(&mut buffer) {
        Ok(()) => &buffer[128..132] == b"DICM",
        Err(_) => false,
    }
}

/// Recursively collects DICOM candidates under a directory, in sorted order
pub fn collect_dicom_files(directory: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(directory, &mut files)?;
    files.sort();
    Ok(files)
}

/// Unreadable subdirectories and entries are skipped. Symlinked directories
/// are not followed.
fn walk(directory: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(directory)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping entry in {}: {}", directory.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        if file_type.is_dir() {
            if let Err(e) = walk(&path, files) {
                debug!("Skipping unreadable directory {}: {}", path.display(), e);
            }
        } else if !file_type.is_symlink() || path.is_file() {
            if is_dicom_candidate(&path) {
                files.push(path);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::extraction::tags::{
        BITS_ALLOCATED, BITS_STORED, COLUMNS, HIGH_BIT, PHOTOMETRIC_INTERPRETATION, PIXEL_DATA,
        PIXEL_REPRESENTATION, ROWS, SAMPLES_PER_PIXEL,
    };
    use dicom_core::{DataElement, PrimitiveValue, VR};
    use dicom_object::meta::FileMetaTableBuilder;
    use std::io::Write;
    use tempfile::TempDir;

    const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";
    const CT_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.2";

    /// Builds a small uncompressed CT slice with the given metadata
    pub(crate) fn make_ct_object(
        series_uid: &str,
        instance: i32,
        z: f64,
        pixels: &[u16],
        size: (u16, u16),
    ) -> FileDicomObject<InMemDicomObject> {
        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(MODALITY, VR::CS, PrimitiveValue::from("CT")));
        obj.put(DataElement::new(
            SERIES_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(series_uid),
        ));
        obj.put(DataElement::new(
            INSTANCE_NUMBER,
            VR::IS,
            PrimitiveValue::from(instance.to_string()),
        ));
        obj.put(DataElement::new(
            IMAGE_POSITION_PATIENT,
            VR::DS,
            PrimitiveValue::Strs(
                vec!["0".to_string(), "0".to_string(), format!("{}", z)].into(),
            ),
        ));
        obj.put(DataElement::new(RESCALE_SLOPE, VR::DS, PrimitiveValue::from("1")));
        obj.put(DataElement::new(
            RESCALE_INTERCEPT,
            VR::DS,
            PrimitiveValue::from("-1024"),
        ));
        obj.put(DataElement::new(
            SAMPLES_PER_PIXEL,
            VR::US,
            PrimitiveValue::from(1_u16),
        ));
        obj.put(DataElement::new(
            PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from("MONOCHROME2"),
        ));
        obj.put(DataElement::new(
            ROWS,
            VR::US,
            PrimitiveValue::from(size.0),
        ));
        obj.put(DataElement::new(
            COLUMNS,
            VR::US,
            PrimitiveValue::from(size.1),
        ));
        obj.put(DataElement::new(
            BITS_ALLOCATED,
            VR::US,
            PrimitiveValue::from(16_u16),
        ));
        obj.put(DataElement::new(
            BITS_STORED,
            VR::US,
            PrimitiveValue::from(16_u16),
        ));
        obj.put(DataElement::new(
            HIGH_BIT,
            VR::US,
            PrimitiveValue::from(15_u16),
        ));
        obj.put(DataElement::new(
            PIXEL_REPRESENTATION,
            VR::US,
            PrimitiveValue::from(0_u16),
        ));
        obj.put(DataElement::new(
            PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U16(pixels.iter().copied().collect()),
        ));

        let sop_instance = format!("{}.{}", series_uid, instance);
        obj.with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(EXPLICIT_VR_LE)
                .media_storage_sop_class_uid(CT_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(sop_instance),
        )
        .unwrap()
    }

    #[test]
    fn test_from_dicom_reads_fields() {
        let dcm = make_ct_object("1.2.3", 7, -412.5, &[0; 4], (2, 2));
        let record = ImageRecord::from_dicom(PathBuf::from("a.dcm"), dcm);

        assert_eq!(record.modality, "CT");
        assert!(record.is_ct());
        assert_eq!(record.series_uid, "1.2.3");
        assert_eq!(record.instance_number, 7);
        assert_eq!(record.z_position, -412.5);
        assert_eq!(record.rescale, Rescale::new(1.0, -1024.0));
    }

    #[test]
    fn test_from_dicom_missing_fields_use_defaults() {
        let dcm = InMemDicomObject::new_empty()
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(EXPLICIT_VR_LE)
                    .media_storage_sop_class_uid(CT_IMAGE_STORAGE)
                    .media_storage_sop_instance_uid("1.2.3.4"),
            )
            .unwrap();
        let record = ImageRecord::from_dicom(PathBuf::from("empty.dcm"), dcm);

        assert_eq!(record.modality, "");
        assert_eq!(record.series_uid, UNKNOWN_SERIES);
        assert_eq!(record.instance_number, 0);
        assert!(record.z_position.is_nan());
        assert_eq!(record.rescale, Rescale::default());
    }

    #[test]
    fn test_z_position_falls_back_to_slice_location() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            SLICE_LOCATION,
            VR::DS,
            PrimitiveValue::from("-120.25"),
        ));
        assert_eq!(extract_z_position(&dcm), -120.25);
    }

    #[test]
    fn test_unparseable_instance_number_defaults_to_zero() {
        let mut dcm = make_ct_object("1.2.3", 7, 0.0, &[0; 4], (2, 2));
        dcm.put(DataElement::new(
            INSTANCE_NUMBER,
            VR::IS,
            PrimitiveValue::from("not-a-number"),
        ));
        let record = ImageRecord::from_dicom(PathBuf::from("a.dcm"), dcm);
        assert_eq!(record.instance_number, 0);
    }

    #[test]
    fn test_blank_series_uid_is_unknown() {
        let mut dcm = make_ct_object("1.2.3", 1, 0.0, &[0; 4], (2, 2));
        dcm.put(DataElement::new(
            SERIES_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from("  "),
        ));
        let record = ImageRecord::from_dicom(PathBuf::from("a.dcm"), dcm);
        assert_eq!(record.series_uid, UNKNOWN_SERIES);
    }

    #[test]
    fn test_pixels_decoded_from_file_object() {
        let dcm = make_ct_object("1.2.3", 1, 0.0, &[0, 1024, 2048, 4095], (2, 2));
        let record = ImageRecord::from_dicom(PathBuf::from("a.dcm"), dcm);

        let pixels = record.pixels().unwrap();
        assert_eq!(pixels.dim(), (2, 2));
        assert_eq!(pixels[[0, 1]], 1024);
        assert_eq!(pixels[[1, 1]], 4095);
    }

    #[test]
    fn test_missing_pixel_data_is_decode_error() {
        let dcm = InMemDicomObject::new_empty()
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(EXPLICIT_VR_LE)
                    .media_storage_sop_class_uid(CT_IMAGE_STORAGE)
                    .media_storage_sop_instance_uid("1.2.3.4"),
            )
            .unwrap();
        let record = ImageRecord::from_dicom(PathBuf::from("nopix.dcm"), dcm);

        assert!(matches!(record.pixels(), Err(L3Error::DecodeError { .. })));
    }

    #[test]
    fn test_from_file_round_trip_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slice.dcm");
        make_ct_object("9.9", 3, 12.0, &[5; 4], (2, 2))
            .write_to_file(&path)
            .unwrap();

        let record = ImageRecord::from_file(path.clone()).unwrap();
        assert_eq!(record.file_path, path);
        assert_eq!(record.series_uid, "9.9");
        assert_eq!(record.z_position, 12.0);
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.dcm");
        File::create(&path)
            .unwrap()
            .write_all(b"definitely not a dicom file")
            .unwrap();

        assert!(ImageRecord::from_file(path).is_err());
    }

    #[test]
    fn test_is_dicom_candidate_with_valid_header() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("IM0001");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(&[0u8; 128]).unwrap();
        file.write_all(b"DICM").unwrap();
        file.write_all(b"additional data").unwrap();

        assert!(is_dicom_candidate(&file_path));
    }

    #[test]
    fn test_is_dicom_candidate_wrong_magic() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("wrong_magic");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(&[0u8; 128]).unwrap();
        file.write_all(b"NOTM").unwrap();

        assert!(!is_dicom_candidate(&file_path));
    }

    #[test]
    fn test_is_dicom_candidate_too_small() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("small_file");
        File::create(&file_path).unwrap().write_all(b"small").unwrap();

        assert!(!is_dicom_candidate(&file_path));
    }

    #[test]
    fn test_is_dicom_candidate_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let upper = temp_dir.path().join("slice.DCM");
        File::create(&upper).unwrap();

        assert!(is_dicom_candidate(&upper));
        assert!(!is_dicom_candidate(temp_dir.path()));
    }

    #[test]
    fn test_collect_dicom_files_recurses_into_subtree() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("study").join("series");
        std::fs::create_dir_all(&nested).unwrap();

        File::create(temp_dir.path().join("top.dcm")).unwrap();
        File::create(nested.join("b.dcm")).unwrap();
        File::create(nested.join("a.dicom")).unwrap();
        File::create(nested.join("notes.txt")).unwrap();

        let files = collect_dicom_files(temp_dir.path()).unwrap();

        assert_eq!(files.len(), 3);
        assert!(files.windows(2).all(|w| w[0] <= w[1]));
        assert!(files.iter().all(|f| f.extension().unwrap() != "txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_dicom_files_ignores_directory_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let series = temp_dir.path().join("series");
        std::fs::create_dir_all(&series).unwrap();
        File::create(series.join("a.dcm")).unwrap();

        // Loop back to the root plus a link to a real file
        std::os::unix::fs::symlink(temp_dir.path(), series.join("loop")).unwrap();
        std::os::unix::fs::symlink(series.join("a.dcm"), series.join("b.dcm")).unwrap();

        let files = collect_dicom_files(temp_dir.path()).unwrap();

        assert_eq!(files, vec![series.join("a.dcm"), series.join("b.dcm")]);
    }
}
