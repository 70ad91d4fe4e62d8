//! Multi-dimensional array shapes.
//!
//! Dimensions describe the declared shape of a side-car buffer, axis 0 first.

use smallvec::SmallVec;

/// Dimensions of a multi-dimensional array.
///
/// Volumes are conventionally `[x, y, z]`; mesh arrays are one-dimensional
/// with the component axis appended by the resolver.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dimensions {
    /// Size of each dimension, axis 0 first.
    dims: SmallVec<[usize; 4]>,
}

impl Dimensions {
    /// Create 1D dimensions.
    pub fn d1(size: usize) -> Self {
        Self { dims: smallvec::smallvec![size] }
    }

    /// Create 3D dimensions.
    pub fn d3(x: usize, y: usize, z: usize) -> Self {
        Self { dims: smallvec::smallvec![x, y, z] }
    }

    /// Create from a slice of sizes.
    pub fn from_slice(sizes: &[usize]) -> Self {
        Self { dims: SmallVec::from_slice(sizes) }
    }

    /// Get the rank (number of dimensions).
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Get all dimension sizes as a slice.
    pub fn sizes(&self) -> &[usize] {
        &self.dims
    }

    /// Get the total number of elements (product of all dimensions).
    pub fn num_points(&self) -> usize {
        self.dims.iter().product()
    }

    /// Add a new dimension at the end.
    pub fn push(&mut self, size: usize) {
        self.dims.push(size);
    }

    /// Iterate all multi-indices in C order (last axis fastest).
    pub fn indices_c(&self) -> IndexIter<'_> {
        IndexIter::new(&self.dims, false)
    }

    /// Iterate all multi-indices in Fortran order (first axis fastest).
    pub fn indices_fortran(&self) -> IndexIter<'_> {
        IndexIter::new(&self.dims, true)
    }

    /// Flat C-order position of a multi-index.
    pub fn c_offset(&self, index: &[usize]) -> usize {
        index
            .iter()
            .zip(self.dims.iter())
            .fold(0, |acc, (&i, &size)| acc * size + i)
    }
}

/// Odometer over every multi-index of a shape.
pub struct IndexIter<'a> {
    dims: &'a [usize],
    current: SmallVec<[usize; 4]>,
    fortran: bool,
    done: bool,
}

impl<'a> IndexIter<'a> {
    fn new(dims: &'a [usize], fortran: bool) -> Self {
        Self {
            dims,
            current: smallvec::smallvec![0; dims.len()],
            fortran,
            done: dims.iter().any(|&d| d == 0),
        }
    }

    fn advance(&mut self) {
        let rank = self.dims.len();
        for step in 0..rank {
            let axis = if self.fortran { step } else { rank - 1 - step };
            self.current[axis] += 1;
            if self.current[axis] < self.dims[axis] {
                return;
            }
            self.current[axis] = 0;
        }
        self.done = true;
    }
}

impl Iterator for IndexIter<'_> {
    type Item = SmallVec<[usize; 4]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.current.clone();
        self.advance();
        Some(item)
    }
}

impl From<usize> for Dimensions {
    fn from(size: usize) -> Self {
        Self::d1(size)
    }
}

impl From<(usize, usize, usize)> for Dimensions {
    fn from((x, y, z): (usize, usize, usize)) -> Self {
        Self::d3(x, y, z)
    }
}

impl From<Vec<usize>> for Dimensions {
    fn from(v: Vec<usize>) -> Self {
        Self { dims: SmallVec::from_vec(v) }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, s) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_3d() {
        let d = Dimensions::d3(4, 3, 2);
        assert_eq!(d.rank(), 3);
        assert_eq!(d.num_points(), 24);
        assert_eq!(format!("{}", d), "[4 x 3 x 2]");
    }

    #[test]
    fn test_index_orders() {
        let d = Dimensions::from_slice(&[2, 3]);
        let c: Vec<Vec<usize>> = d.indices_c().map(|i| i.to_vec()).collect();
        assert_eq!(c[..4], [vec![0, 0], vec![0, 1], vec![0, 2], vec![1, 0]]);
        assert_eq!(c.len(), 6);

        let f: Vec<Vec<usize>> = d.indices_fortran().map(|i| i.to_vec()).collect();
        assert_eq!(f[..4], [vec![0, 0], vec![1, 0], vec![0, 1], vec![1, 1]]);
        assert_eq!(f.len(), 6);
    }

    #[test]
    fn test_c_offset_matches_iteration() {
        let d = Dimensions::d3(3, 2, 4);
        for (flat, idx) in d.indices_c().enumerate() {
            assert_eq!(d.c_offset(&idx), flat);
        }
    }

    #[test]
    fn test_empty_axis_yields_nothing() {
        let d = Dimensions::from_slice(&[3, 0]);
        assert_eq!(d.num_points(), 0);
        assert_eq!(d.indices_c().count(), 0);
    }
}
