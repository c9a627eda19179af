//! Mutable rigid-body and affine transform algebra for 3D geometry.
//!
//! This library provides the small family of value types that describe how geometry moves:
//! [`RigidBodyTransform`] for rotation + translation, [`AffineTransform`] for a general
//! invertible linear map + translation, and [`LinearTransform3D`] for the 3×3 linear map
//! itself. All three are plain mutable value objects that default to identity and are
//! edited in place through `append`/`prepend`/`multiply` operations, mirroring how such
//! transforms are threaded through robotics and simulation code.
//!
//! Rotations are carried by [`Orientation3D`], which can hold a unit quaternion, a rotation
//! matrix, an axis-angle pair, or a bare yaw angle, and exposes the same operations
//! regardless of representation.
//!
//! The [`Transform`] trait is the uniform entry point for applying any of the transform
//! kinds to points, vectors, orientations, homogeneous 4-vectors, 2D tuples, 3×3 matrices,
//! and other transforms:
//!
//! ```
//! use kardan::{Orientation3D, RigidBodyTransform, Transform};
//! use nalgebra::{Point3, Vector3};
//! use std::f64::consts::FRAC_PI_2;
//!
//! // quarter-turn yaw, then shift one unit along x
//! let transform = RigidBodyTransform::new(
//!     Orientation3D::from_yaw(FRAC_PI_2),
//!     Vector3::new(1.0, 0.0, 0.0),
//! );
//!
//! let mut transformed = Point3::origin();
//! transform.transform_point(&Point3::new(1.0, 0.0, 0.0), &mut transformed);
//! approx::assert_relative_eq!(transformed, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-10);
//!
//! // transforms invert exactly (up to floating-point tolerance)
//! let mut back = Point3::origin();
//! transform
//!     .inverse_transform_point(&transformed, &mut back)
//!     .expect("rigid-body transforms are always invertible");
//! approx::assert_relative_eq!(back, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-10);
//! ```
//!
//! An [`AffineTransform`] additionally carries scale and shear. Its linear part keeps the
//! nine raw matrix coefficients as the source of truth and lazily maintains a
//! rotate-scale-rotate decomposition, so asking for "just the rotation" of a scaled
//! transform is cheap and does not disturb the matrix:
//!
//! ```
//! use kardan::{AffineTransform, Transform};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut transform = AffineTransform::default();
//! transform.append_scale(2.0, 3.0, 0.5);
//! transform.prepend_translation(&Vector3::new(0.0, 0.0, 1.0));
//!
//! let mut transformed = Point3::origin();
//! transform.transform_point(&Point3::new(1.0, 1.0, 1.0), &mut transformed);
//! approx::assert_relative_eq!(transformed, Point3::new(2.0, 3.0, 1.5), epsilon = 1e-10);
//! ```
//!
//! Composition follows the usual matrix conventions: `append` applies the new operation
//! *before* the existing transform (local frame), `prepend` applies it *after* (world
//! frame), and `multiply`/`pre_multiply` compose whole transforms on the right and left
//! respectively. Operations that can fail -- inverting a singular linear part, or asking
//! for a 2D transform from a rotation that leaves the XY plane -- return
//! [`TransformError`] rather than producing silently wrong numbers.

mod affine;
mod errors;
mod linear;
mod orientation;
mod rigid;
mod transform;

pub(crate) type Point2 = nalgebra::Point2<f64>;
pub(crate) type Point3 = nalgebra::Point3<f64>;
pub(crate) type Vector2 = nalgebra::Vector2<f64>;
pub(crate) type Vector3 = nalgebra::Vector3<f64>;
pub(crate) type Vector4 = nalgebra::Vector4<f64>;
pub(crate) type Matrix3 = nalgebra::Matrix3<f64>;
pub(crate) type Matrix4 = nalgebra::Matrix4<f64>;
pub(crate) type Rotation3 = nalgebra::Rotation3<f64>;
pub(crate) type UnitQuaternion = nalgebra::UnitQuaternion<f64>;

pub use affine::AffineTransform;
pub use errors::TransformError;
pub use linear::LinearTransform3D;
pub use orientation::Orientation3D;
pub use rigid::RigidBodyTransform;
pub use transform::Transform;
