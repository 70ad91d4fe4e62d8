//! Element types - the storage types a side-car buffer can hold.

use bytemuck::{Pod, Zeroable};
use half::f16;
use std::fmt;

/// Element type of a raw side-car buffer.
///
/// Each type has a fixed width and is decoded little-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ElementType {
    /// Unsigned 8-bit integer
    Uint8 = 0,
    /// Signed 8-bit integer
    Int8 = 1,
    /// Unsigned 16-bit integer
    Uint16 = 2,
    /// Signed 16-bit integer
    Int16 = 3,
    /// Unsigned 32-bit integer
    Uint32 = 4,
    /// Signed 32-bit integer
    Int32 = 5,
    /// Unsigned 64-bit integer
    Uint64 = 6,
    /// Signed 64-bit integer
    Int64 = 7,
    /// 16-bit floating point (IEEE 754 half precision)
    Float16 = 8,
    /// 32-bit floating point (IEEE 754 single precision)
    Float32 = 9,
    /// 64-bit floating point (IEEE 754 double precision)
    Float64 = 10,
}

impl ElementType {
    /// Returns the size in bytes of a single element of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 | Self::Float16 => 2,
            Self::Uint32 | Self::Int32 | Self::Float32 => 4,
            Self::Uint64 | Self::Int64 | Self::Float64 => 8,
        }
    }

    /// Returns the canonical name of this type.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Int8 => "int8",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Uint32 => "uint32",
            Self::Int32 => "int32",
            Self::Uint64 => "uint64",
            Self::Int64 => "int64",
            Self::Float16 => "float16",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Parse an element type from the name stored in a document.
    ///
    /// Accepts the canonical names plus the document aliases
    /// `float` (32-bit), `double` and `half`.
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "uint8" => Self::Uint8,
            "int8" => Self::Int8,
            "uint16" => Self::Uint16,
            "int16" => Self::Int16,
            "uint32" => Self::Uint32,
            "int32" => Self::Int32,
            "uint64" => Self::Uint64,
            "int64" => Self::Int64,
            "float16" | "half" => Self::Float16,
            "float32" | "float" => Self::Float32,
            "float64" | "double" => Self::Float64,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// === POD trait for type-safe decoding ===

/// Trait for Rust types a buffer element can be decoded into.
pub trait ElementPod: Pod + Zeroable + Copy + Default + fmt::Debug + Send + Sync {
    /// The corresponding ElementType enum value.
    const ELEMENT_TYPE: ElementType;

    /// Size of this type in bytes.
    const SIZE: usize = std::mem::size_of::<Self>();
}

macro_rules! impl_element_pod {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ElementPod for $ty {
                const ELEMENT_TYPE: ElementType = ElementType::$variant;
            }
        )*
    };
}

impl_element_pod! {
    u8 => Uint8,
    i8 => Int8,
    u16 => Uint16,
    i16 => Int16,
    u32 => Uint32,
    i32 => Int32,
    u64 => Uint64,
    i64 => Int64,
    f16 => Float16,
    f32 => Float32,
    f64 => Float64,
}
