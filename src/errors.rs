use thiserror::Error;

/// The ways a transform operation can be misused.
///
/// Every variant is a programming-contract violation at the call site: these errors are
/// raised synchronously, are never retried internally, and are never recovered from  -- 
/// they propagate to the caller via `?`. NaN poisoning is deliberately *not* an error;
/// use the `contains_nan` predicates on the transform types to diagnose it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// Attempted to invert a linear or affine transform whose matrix is not invertible.
    #[error("matrix is not invertible (determinant = {determinant:e})")]
    SingularMatrix {
        /// The determinant of the offending matrix.
        determinant: f64,
    },

    /// A 2D-constrained operation was invoked on a transform whose rotation is not
    /// confined to the XY plane.
    #[error("transform is not restricted to the XY plane")]
    NotATransform2D,

    /// A 3×3 block that was expected to be a proper rotation (orthonormal, determinant
    /// +1) is not one within tolerance, e.g. when unpacking a rigid-body transform from
    /// a homogeneous matrix.
    #[error("3x3 block is not a proper rotation matrix (determinant = {determinant})")]
    InvalidOrientation {
        /// The determinant of the offending block.
        determinant: f64,
    },
}
