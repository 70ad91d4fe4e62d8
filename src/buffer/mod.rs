//! Typed-buffer resolution.
//!
//! An [`ArrayDescriptor`] names a side-car file plus the element type,
//! shape, optional byte strides and component count needed to read it.
//! [`resolve`] turns it into an owned, contiguous [`ResolvedArray`].
//!
//! Size mismatches between the declared shape and the decoded data are
//! reported with a warning and never fail the call.

mod source;
mod typed;
mod view;

pub use source::RawBuffer;
pub use typed::TypedArray;
pub use view::{Gathered, StridedView};

use std::path::{Path, PathBuf};

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::record::{BlobRef, Record};
use crate::util::{Dimensions, ElementType, Error, Result};

/// Everything needed to materialise one array from a side-car file.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayDescriptor {
    /// Element type of the raw samples.
    pub element_type: ElementType,
    /// Declared shape, axis 0 first.
    pub shape: Dimensions,
    /// Optional byte stride per axis of `shape`.
    pub strides: Option<SmallVec<[i64; 4]>>,
    /// Values per sample (3 for points and normals).
    pub component_count: usize,
    /// Side-car file holding the samples.
    pub buffer: BlobRef,
}

impl ArrayDescriptor {
    /// Descriptor for a contiguous single-component array.
    pub fn new(element_type: ElementType, shape: impl Into<Dimensions>, buffer: BlobRef) -> Self {
        Self {
            element_type,
            shape: shape.into(),
            strides: None,
            component_count: 1,
            buffer,
        }
    }

    /// Set per-axis byte strides; `None` means contiguous.
    pub fn with_strides(mut self, strides: Option<SmallVec<[i64; 4]>>) -> Self {
        self.strides = strides;
        self
    }

    /// Set the number of components per sample.
    pub fn with_components(mut self, count: usize) -> Self {
        self.component_count = count.max(1);
        self
    }

    /// Element count implied by shape and component count.
    pub fn expected_len(&self) -> usize {
        self.shape.num_points() * self.component_count
    }

    /// Shape with the component axis appended when there is more than one component.
    fn view_shape(&self) -> Dimensions {
        let mut shape = self.shape.clone();
        if self.component_count > 1 {
            shape.push(self.component_count);
        }
        shape
    }
}

/// How a [`BlobRef`] is turned into a file path.
#[derive(Clone, Copy, Debug)]
pub enum BufferLocation<'a> {
    /// Full relative path under the document's directory.
    DocumentRelative(&'a Path),
    /// File name only, looked up in a flat directory.
    Basename(&'a Path),
}

impl BufferLocation<'_> {
    /// Absolute (or caller-relative) path of the referenced file.
    pub fn path_of(&self, blob: &BlobRef) -> PathBuf {
        match self {
            BufferLocation::DocumentRelative(dir) => {
                blob.components().fold(dir.to_path_buf(), |p, c| p.join(c))
            }
            BufferLocation::Basename(dir) => dir.join(blob.file_name()),
        }
    }
}

/// Owned, contiguous array decoded from a side-car file.
///
/// `data.len()` may disagree with `shape` when the file size did not match.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedArray {
    /// Decoded samples in C order.
    pub data: TypedArray,
    /// Declared shape.
    pub shape: Dimensions,
    /// Values per sample.
    pub component_count: usize,
    /// File the samples were read from.
    pub source: PathBuf,
}

impl ResolvedArray {
    /// Element type of the samples.
    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Number of decoded values.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when nothing was decoded.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of whole component tuples.
    pub fn tuple_count(&self) -> usize {
        self.data.len() / self.component_count.max(1)
    }
}

/// Read a descriptor's side-car file and decode it.
///
/// A missing file is [`Error::FileNotFound`]; callers decide whether that
/// is fatal. With strides the buffer is gathered through a [`StridedView`]
/// (samples outside the file read as zero), otherwise the flat decode is
/// used as-is.
pub fn resolve(desc: &ArrayDescriptor, location: BufferLocation<'_>) -> Result<ResolvedArray> {
    let path = location.path_of(&desc.buffer);
    debug!(
        "Resolving {} ({}, shape {}, components {})",
        path.display(),
        desc.element_type,
        desc.shape,
        desc.component_count
    );

    let raw = RawBuffer::open(&path)?;
    let expected = desc.expected_len();
    let elem_bytes = desc.element_type.num_bytes();

    let (data, decoded) = match &desc.strides {
        Some(strides) => {
            if strides.len() != desc.shape.rank() {
                return Err(Error::invalid(format!(
                    "{}: {} strides for a rank-{} shape",
                    path.display(),
                    strides.len(),
                    desc.shape.rank()
                )));
            }
            let shape = desc.view_shape();
            let mut view_strides = strides.clone();
            if desc.component_count > 1 {
                view_strides.push(elem_bytes as i64);
            }
            let gathered = StridedView::new(raw.as_bytes(), &shape, &view_strides, elem_bytes).gather();
            let data = TypedArray::decode(desc.element_type, &gathered.bytes);
            let decoded = expected - gathered.out_of_range;
            (data, decoded)
        }
        None => {
            let data = TypedArray::decode(desc.element_type, raw.as_bytes());
            let decoded = data.len();
            (data, decoded)
        }
    };

    if decoded != expected {
        warn!("Unexpected size for {}: {} vs {}", path.display(), decoded, expected);
    }

    Ok(ResolvedArray {
        data,
        shape: desc.shape.clone(),
        component_count: desc.component_count,
        source: path,
    })
}

// ============================================================================
// Descriptor attribute helpers
// ============================================================================

/// Read a sequence of non-negative sizes, e.g. an array's `size` attribute.
pub(crate) fn read_shape(rec: &Record, path: &str) -> Result<Dimensions> {
    let seq = rec.require(path)?;
    let values = seq
        .int_sequence()
        .ok_or_else(|| Error::invalid(format!("{path}: expected a sequence of integers, found {}", seq.kind())))?;
    let sizes = values
        .into_iter()
        .map(|v| usize::try_from(v).map_err(|_| Error::invalid(format!("{path}: negative size {v}"))))
        .collect::<Result<Vec<usize>>>()?;
    Ok(Dimensions::from(sizes))
}

/// Read an optional stride sequence. Absent or empty means no strides.
pub(crate) fn read_strides(rec: &Record, path: &str) -> Result<Option<SmallVec<[i64; 4]>>> {
    let Some(seq) = rec.get(path) else {
        return Ok(None);
    };
    let values = seq
        .int_sequence()
        .ok_or_else(|| Error::invalid(format!("{path}: expected a sequence of integers")))?;
    Ok((!values.is_empty()).then(|| SmallVec::from_vec(values)))
}

/// Read a blob reference attribute.
pub(crate) fn read_blob(rec: &Record, path: &str) -> Result<BlobRef> {
    let leaf = rec.require(path)?;
    leaf.as_blob()
        .cloned()
        .ok_or_else(|| Error::invalid(format!("{path}: expected a buffer reference, found {}", leaf.kind())))
}
