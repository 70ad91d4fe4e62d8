//! Cell topology decoding.
//!
//! Cells are runs of connectivity indices delimited by an offsets array and
//! tagged with a topology code. Only triangles and quads are exported; any
//! other tag, or a run whose length disagrees with the tag, is dropped.

use std::ops::Range;

/// Topology code of a triangle.
pub const TRIANGLE_TAG: i64 = 5;
/// Topology code of a quad.
pub const QUAD_TAG: i64 = 9;
/// Older documents tag triangles with this code.
pub const LEGACY_TRIANGLE_TAG: i64 = 3;

/// Face kinds the geometry writer emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellTopology {
    /// Three vertices.
    Triangle,
    /// Four vertices.
    Quad,
}

impl CellTopology {
    /// Decode a topology code. Unknown codes yield `None`.
    pub const fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            TRIANGLE_TAG | LEGACY_TRIANGLE_TAG => Some(Self::Triangle),
            QUAD_TAG => Some(Self::Quad),
            _ => None,
        }
    }

    /// Vertex count the topology requires.
    pub const fn vertex_count(self) -> usize {
        match self {
            Self::Triangle => 3,
            Self::Quad => 4,
        }
    }
}

/// Connectivity range of cell `cell`.
///
/// A cell runs to the next offset, or to the end of the connectivity when
/// there is no next offset. Ranges are clamped to `connectivity_len`; a cell
/// with no (or a negative) start offset has no range.
pub fn cell_range(offsets: &[i64], cell: usize, connectivity_len: usize) -> Option<Range<usize>> {
    let start = usize::try_from(*offsets.get(cell)?).ok()?.min(connectivity_len);
    let end = match offsets.get(cell + 1) {
        Some(&next) => usize::try_from(next).unwrap_or(0).min(connectivity_len),
        None => connectivity_len,
    };
    Some(start..end.max(start))
}

/// One exportable face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face<'a> {
    /// Decoded topology.
    pub topology: CellTopology,
    /// Zero-based point indices.
    pub vertices: &'a [i64],
}

/// Iterator over the cells that decode to a face.
pub struct Faces<'a> {
    connectivity: &'a [i64],
    offsets: &'a [i64],
    types: &'a [i64],
    cell: usize,
}

impl<'a> Faces<'a> {
    /// Walk `types.len()` cells.
    pub fn new(connectivity: &'a [i64], offsets: &'a [i64], types: &'a [i64]) -> Self {
        Self { connectivity, offsets, types, cell: 0 }
    }
}

impl<'a> Iterator for Faces<'a> {
    type Item = Face<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cell < self.types.len() {
            let cell = self.cell;
            self.cell += 1;

            let Some(topology) = CellTopology::from_tag(self.types[cell]) else {
                continue;
            };
            let Some(range) = cell_range(self.offsets, cell, self.connectivity.len()) else {
                continue;
            };
            if range.len() == topology.vertex_count() {
                return Some(Face { topology, vertices: &self.connectivity[range] });
            }
        }
        None
    }
}
