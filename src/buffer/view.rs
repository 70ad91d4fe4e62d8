//! Strided byte views over a flat buffer.

use crate::util::Dimensions;

/// A multi-dimensional view of `bytes` with explicit per-axis byte strides.
///
/// Sample `[i0, i1, ...]` starts at byte `sum(ik * strides[k])`.
pub struct StridedView<'a> {
    bytes: &'a [u8],
    shape: &'a Dimensions,
    strides: &'a [i64],
    elem_bytes: usize,
}

/// Contiguous copy produced by [`StridedView::gather`].
pub struct Gathered {
    /// Samples in C order, `elem_bytes` each.
    pub bytes: Vec<u8>,
    /// Samples whose byte range fell outside the buffer (zero-filled).
    pub out_of_range: usize,
}

impl<'a> StridedView<'a> {
    /// Create a view. `strides` must have one entry per axis of `shape`.
    pub fn new(bytes: &'a [u8], shape: &'a Dimensions, strides: &'a [i64], elem_bytes: usize) -> Self {
        debug_assert_eq!(shape.rank(), strides.len());
        Self { bytes, shape, strides, elem_bytes }
    }

    /// Byte offset of a sample, if it lies wholly inside the buffer.
    fn offset(&self, index: &[usize]) -> Option<usize> {
        let mut start: i64 = 0;
        for (&i, &s) in index.iter().zip(self.strides) {
            start = i64::try_from(i).ok()?.checked_mul(s)?.checked_add(start)?;
        }
        let start = usize::try_from(start).ok()?;
        let end = start.checked_add(self.elem_bytes)?;
        (end <= self.bytes.len()).then_some(start)
    }

    /// Copy every sample into a C-ordered contiguous buffer.
    pub fn gather(&self) -> Gathered {
        let mut bytes = Vec::with_capacity(self.shape.num_points() * self.elem_bytes);
        let mut out_of_range = 0;

        for index in self.shape.indices_c() {
            match self.offset(&index) {
                Some(start) => bytes.extend_from_slice(&self.bytes[start..start + self.elem_bytes]),
                None => {
                    bytes.resize(bytes.len() + self.elem_bytes, 0);
                    out_of_range += 1;
                }
            }
        }

        Gathered { bytes, out_of_range }
    }
}
