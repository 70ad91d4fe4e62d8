//! Volume export pipeline.
//!
//! Every image-tagged record with a backing buffer becomes one gzip'd
//! NIfTI-1 container named after the buffer file. A missing buffer skips
//! that image only.

pub mod nifti;

use std::path::{Path, PathBuf};

use glam::DMat4;
use tracing::{debug, info, warn};

use crate::buffer::{self, ArrayDescriptor, BufferLocation, TypedArray};
use crate::core::run_by_output;
use crate::options::ExportOptions;
use crate::record::{self, Record, IMAGE_TAG};
use crate::util::{Dimensions, ElementType, Error, Result};

/// Description written into every exported header.
pub const DESCRIPTION: &str = "CT scan exported from VPZ";

/// A 3D scan ready for serialisation.
///
/// Spacing is 1 mm isotropic, orientation is the identity transform,
/// units are millimetres in scanner-anatomical space.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumetricImage {
    /// Samples in C order, exactly `shape.num_points()` of them.
    pub data: TypedArray,
    /// Axis sizes, conventionally `[x, y, z]`.
    pub shape: Dimensions,
    /// Voxel size in millimetres.
    pub spacing: [f32; 3],
    /// Voxel-to-world transform.
    pub affine: DMat4,
    /// Header description.
    pub description: String,
}

impl VolumetricImage {
    /// Wrap samples with the fixed spacing, orientation and description.
    ///
    /// Data is truncated or zero-padded to the shape, and half precision
    /// is widened to `f32`.
    pub fn new(data: TypedArray, shape: Dimensions) -> Self {
        let data = if data.len() == shape.num_points() {
            data
        } else {
            data.resized(shape.num_points())
        };
        Self {
            data: data.widen_half(),
            shape,
            spacing: [1.0, 1.0, 1.0],
            affine: DMat4::IDENTITY,
            description: DESCRIPTION.to_string(),
        }
    }

    /// Element type as stored in the container.
    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }
}

/// Outcome of a volume export run.
#[derive(Debug, Default)]
pub struct VolumeExportStats {
    /// Written containers, in document order.
    pub exported: Vec<PathBuf>,
    /// Images skipped because their buffer file was absent.
    pub skipped_missing: usize,
    /// Image records that carry no buffer reference.
    pub skipped_unbacked: usize,
}

impl VolumeExportStats {
    /// Images seen in the document.
    pub fn total(&self) -> usize {
        self.exported.len() + self.skipped_missing + self.skipped_unbacked
    }
}

/// Build the array descriptor of an image record.
///
/// Returns `None` for images without a buffer reference.
pub fn image_descriptor(image: &Record) -> Result<Option<ArrayDescriptor>> {
    let blob = match image.get("array.buffer").or_else(|| image.get("buffer")) {
        Some(Record::BlobRef(blob)) => blob.clone(),
        _ => return Ok(None),
    };

    let element_type = match image.get("array.type").and_then(Record::as_str) {
        None => ElementType::Uint8,
        Some(name) => ElementType::from_name(name).ok_or_else(|| Error::UnsupportedType(name.to_string()))?,
    };
    let shape = buffer::read_shape(image, "array.size")?;

    let strides = buffer::read_strides(image, "array.strides")?;
    Ok(Some(ArrayDescriptor::new(element_type, shape, blob).with_strides(strides)))
}

/// Container written for `desc`: the buffer file's stem plus `.nii.gz`.
fn output_path(desc: &ArrayDescriptor, out_dir: &Path) -> PathBuf {
    out_dir.join(format!("{}.nii.gz", desc.buffer.file_stem()))
}

enum ImageOutcome {
    Exported(PathBuf),
    Missing,
}

fn export_image(
    desc: &ArrayDescriptor,
    doc_dir: &Path,
    out_dir: &Path,
    options: &ExportOptions,
) -> Result<ImageOutcome> {
    let resolved = match buffer::resolve(desc, BufferLocation::DocumentRelative(doc_dir)) {
        Ok(resolved) => resolved,
        Err(Error::FileNotFound(path)) => {
            warn!("Missing RAW file: {}", path.display());
            return Ok(ImageOutcome::Missing);
        }
        Err(e) => return Err(e),
    };

    let out_path = output_path(desc, out_dir);
    let image = VolumetricImage::new(resolved.data, resolved.shape);
    nifti::save_nifti_gz(&out_path, &image, options.compression)?;
    info!("Exported NIfTI: {}", out_path.display());
    Ok(ImageOutcome::Exported(out_path))
}

/// Export every image of an already parsed document.
///
/// `doc_dir` is the directory buffer paths are relative to. Images whose
/// buffers share a file stem are written one after another in document
/// order, so the last one owns the container.
pub fn export_images(
    root: &Record,
    doc_dir: &Path,
    out_dir: &Path,
    options: &ExportOptions,
) -> Result<VolumeExportStats> {
    std::fs::create_dir_all(out_dir)?;

    let mut stats = VolumeExportStats::default();
    let mut jobs = Vec::new();
    for image in record::locate(root, IMAGE_TAG) {
        match image_descriptor(image)? {
            Some(desc) => {
                info!(
                    "Found {} ({}, {}, strides={:?})",
                    desc.buffer.path,
                    desc.element_type,
                    desc.shape,
                    desc.strides.as_deref()
                );
                jobs.push(desc);
            }
            None => {
                debug!("Image record without buffer reference, skipping");
                stats.skipped_unbacked += 1;
            }
        }
    }

    let outcomes = run_by_output(
        &jobs,
        |desc| output_path(desc, out_dir),
        options.parallel,
        |desc| export_image(desc, doc_dir, out_dir, options),
    );

    for outcome in outcomes {
        match outcome? {
            ImageOutcome::Exported(path) => stats.exported.push(path),
            ImageOutcome::Missing => stats.skipped_missing += 1,
        }
    }
    Ok(stats)
}

/// Parse `document` and export its images into `out_dir`.
pub fn export_volumes(
    document: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<VolumeExportStats> {
    let document = document.as_ref();
    let root = record::load_document(document)?;
    let doc_dir = document.parent().unwrap_or(Path::new(""));
    export_images(&root, doc_dir, out_dir.as_ref(), options)
}
