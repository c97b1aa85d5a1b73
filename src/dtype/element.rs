//! Element trait for mapping Rust scalar types to DType

use super::DType;
use num_traits::Float;
use std::fmt::Debug;

/// Trait for scalar types that can be stored in a matrix and pushed through a pipeline
///
/// # Bounds
/// - `Float` - Arithmetic, `sqrt`, `abs`, finiteness checks (num-traits)
/// - `Send + Sync + 'static` - Values cross worker threads inside queue messages
/// - `Debug` - Diagnostics
///
/// Conversions carry a `_val` suffix so they do not collide with
/// `num_traits::ToPrimitive::to_f64`, which `Float` brings into scope.
pub trait Element: Float + Send + Sync + Debug + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64 for error reporting and tolerance checks
    fn to_f64_val(self) -> f64;

    /// Convert from f64 to this type
    fn from_f64_val(v: f64) -> Self;
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    #[inline]
    fn to_f64_val(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64_val(v: f64) -> Self {
        v
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    #[inline]
    fn to_f64_val(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64_val(v: f64) -> Self {
        v as f32
    }
}
