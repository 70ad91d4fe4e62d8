//! Owned, contiguous typed element storage.

use std::io::{self, Write};

use half::f16;

use crate::util::{ElementPod, ElementType};

/// Decoded buffer contents, one vector variant per element type.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedArray {
    Uint8(Vec<u8>),
    Int8(Vec<i8>),
    Uint16(Vec<u16>),
    Int16(Vec<i16>),
    Uint32(Vec<u32>),
    Int32(Vec<i32>),
    Uint64(Vec<u64>),
    Int64(Vec<i64>),
    Float16(Vec<f16>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// Run `$body` with `$v` bound to the inner vector, whatever its type.
macro_rules! dispatch {
    ($array:expr, $v:ident => $body:expr) => {
        match $array {
            TypedArray::Uint8($v) => $body,
            TypedArray::Int8($v) => $body,
            TypedArray::Uint16($v) => $body,
            TypedArray::Int16($v) => $body,
            TypedArray::Uint32($v) => $body,
            TypedArray::Int32($v) => $body,
            TypedArray::Uint64($v) => $body,
            TypedArray::Int64($v) => $body,
            TypedArray::Float16($v) => $body,
            TypedArray::Float32($v) => $body,
            TypedArray::Float64($v) => $body,
        }
    };
}

/// Lossy numeric conversions shared by every element type.
trait Widen: Copy {
    fn widen_i64(self) -> i64;
}

macro_rules! impl_widen_int {
    ($($ty:ty),*) => {$(
        impl Widen for $ty {
            #[inline]
            fn widen_i64(self) -> i64 { self as i64 }
        }
    )*};
}

impl_widen_int!(u8, i8, u16, i16, u32, i32, u64, i64);

impl Widen for f16 {
    #[inline]
    fn widen_i64(self) -> i64 { self.to_f64() as i64 }
}

impl Widen for f32 {
    #[inline]
    fn widen_i64(self) -> i64 { self as i64 }
}

impl Widen for f64 {
    #[inline]
    fn widen_i64(self) -> i64 { self as i64 }
}

fn collect<T: ElementPod>(bytes: &[u8]) -> Vec<T> {
    let whole = bytes.len() - bytes.len() % T::SIZE;
    bytemuck::pod_collect_to_vec(&bytes[..whole])
}

impl TypedArray {
    /// Decode raw bytes as a flat sequence of `ty`.
    ///
    /// Trailing bytes that do not fill a whole element are dropped.
    pub fn decode(ty: ElementType, bytes: &[u8]) -> Self {
        match ty {
            ElementType::Uint8 => Self::Uint8(bytes.to_vec()),
            ElementType::Int8 => Self::Int8(collect(bytes)),
            ElementType::Uint16 => Self::Uint16(collect(bytes)),
            ElementType::Int16 => Self::Int16(collect(bytes)),
            ElementType::Uint32 => Self::Uint32(collect(bytes)),
            ElementType::Int32 => Self::Int32(collect(bytes)),
            ElementType::Uint64 => Self::Uint64(collect(bytes)),
            ElementType::Int64 => Self::Int64(collect(bytes)),
            ElementType::Float16 => Self::Float16(collect(bytes)),
            ElementType::Float32 => Self::Float32(collect(bytes)),
            ElementType::Float64 => Self::Float64(collect(bytes)),
        }
    }

    /// Element type of the stored values.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Uint8(_) => ElementType::Uint8,
            Self::Int8(_) => ElementType::Int8,
            Self::Uint16(_) => ElementType::Uint16,
            Self::Int16(_) => ElementType::Int16,
            Self::Uint32(_) => ElementType::Uint32,
            Self::Int32(_) => ElementType::Int32,
            Self::Uint64(_) => ElementType::Uint64,
            Self::Int64(_) => ElementType::Int64,
            Self::Float16(_) => ElementType::Float16,
            Self::Float32(_) => ElementType::Float32,
            Self::Float64(_) => ElementType::Float64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        dispatch!(self, v => v.len())
    }

    /// True when no elements were decoded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw little-endian bytes of the stored elements.
    pub fn as_bytes(&self) -> &[u8] {
        dispatch!(self, v => bytemuck::cast_slice(v.as_slice()))
    }

    /// All elements converted to `i64`.
    pub fn to_i64_vec(&self) -> Vec<i64> {
        dispatch!(self, v => v.iter().map(|x| x.widen_i64()).collect())
    }

    /// Write element `i` in its shortest round-trip text form
    /// (`0.1`, `1.0`, `42`).
    pub fn write_element<W: Write>(&self, i: usize, out: &mut W) -> io::Result<()> {
        dispatch!(self, v => match v.get(i) {
            Some(x) => write!(out, "{:?}", x),
            None => Err(io::Error::new(io::ErrorKind::InvalidInput, "element index out of range")),
        })
    }

    /// Copy truncated or zero-padded to exactly `len` elements.
    pub fn resized(&self, len: usize) -> Self {
        let mut out = self.clone();
        dispatch!(&mut out, v => v.resize(len, Default::default()));
        out
    }

    /// Half-precision data widened to `f32`; other types unchanged.
    pub fn widen_half(self) -> Self {
        match self {
            Self::Float16(v) => Self::Float32(v.into_iter().map(f16::to_f32).collect()),
            other => other,
        }
    }
}
