//! Scalar type system for blockpipe matrices
//!
//! The pipelines operate on real floating-point scalars only. `DType` names the
//! runtime type for diagnostics; `Element` is the compile-time bound every
//! algorithm is generic over.

mod element;

pub use element::Element;

use std::fmt;

/// Runtime tag for the scalar type stored in a [`Matrix`](crate::matrix::Matrix)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    /// 64-bit floating point
    F64,
    /// 32-bit floating point
    F32,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::F64 => 8,
            Self::F32 => 4,
        }
    }

    /// Short lowercase name, e.g. `f32`
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}
