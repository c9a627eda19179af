//! General 3×3 linear maps with a lazily maintained rotate-scale-rotate decomposition.

use crate::errors::TransformError;
use crate::orientation::Orientation3D;
use crate::{Matrix3, Point2, Point3, Rotation3, UnitQuaternion, Vector2, Vector3, Vector4};
use std::cell::OnceCell;
use std::fmt;
use std::fmt::{Display, Formatter};

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance below which a matrix is considered to be the identity.
pub(crate) const EPS_CHECK_IDENTITY: f64 = 1.0e-12;

/// Tolerance used when testing whether a matrix is a proper rotation.
pub(crate) const EPS_CHECK_ROTATION: f64 = 1.0e-7;

/// Tolerance used when testing whether a matrix maps the XY plane to itself.
pub(crate) const EPS_CHECK_2D: f64 = 1.0e-8;

/// Determinants below this magnitude are treated as singular.
pub(crate) const EPS_INVERT: f64 = 1.0e-16;

/// A general invertible 3×3 linear map: rotation, scale, shear, reflection, or any mix.
///
/// The nine raw matrix coefficients are the source of truth. On top of them the type
/// lazily maintains a rotate-scale-rotate decomposition
///
/// ```text
/// M = R(pre) · diag(scale) · R(post)⁻¹
/// ```
///
/// computed by singular value decomposition on first use and invalidated whenever the
/// coefficients change. `invert`, `transpose`, and `reset_scale` keep an
/// already-computed decomposition consistent in place instead of re-deriving it.
///
/// The decomposition is canonicalized as follows: the scale components are ordered by
/// decreasing magnitude, both bracketing rotations are proper (determinant +1), and
/// when the map contains a reflection the sign is carried by the *last* scale
/// component. A pure rotation therefore always decomposes with scale `(1, 1, 1)`.
///
/// ```
/// use kardan::{LinearTransform3D, Orientation3D};
///
/// let mut map = LinearTransform3D::identity();
/// map.append_rotation(&Orientation3D::from_yaw(0.8));
/// map.append_scale(2.0, 3.0, 0.5);
///
/// approx::assert_relative_eq!(map.determinant(), 3.0, epsilon = 1e-12);
/// assert!(!map.is_rotation_matrix());
///
/// // dropping the scale projects the map onto its rotational component
/// map.reset_scale();
/// assert!(map.is_rotation_matrix());
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinearTransform3D {
    matrix: Matrix3,
    #[cfg_attr(feature = "serde", serde(skip))]
    svd: OnceCell<RotateScaleRotate>,
}

/// The cached decomposition: `matrix = R(u) · diag(w) · R(v)ᵀ`.
#[derive(Clone, Copy, Debug)]
struct RotateScaleRotate {
    u: UnitQuaternion,
    w: Vector3,
    v: UnitQuaternion,
}

impl RotateScaleRotate {
    fn identity() -> Self {
        Self {
            u: UnitQuaternion::identity(),
            w: Vector3::new(1.0, 1.0, 1.0),
            v: UnitQuaternion::identity(),
        }
    }

    fn from_rotation(rotation: UnitQuaternion) -> Self {
        Self {
            u: rotation,
            w: Vector3::new(1.0, 1.0, 1.0),
            v: UnitQuaternion::identity(),
        }
    }

    /// `M⁻¹ = R(v) · diag(w)⁻¹ · R(u)ᵀ`
    fn inverted(&self) -> Self {
        Self {
            u: self.v,
            w: Vector3::new(1.0 / self.w.x, 1.0 / self.w.y, 1.0 / self.w.z),
            v: self.u,
        }
    }

    /// `Mᵀ = R(v) · diag(w) · R(u)ᵀ`
    fn transposed(&self) -> Self {
        Self {
            u: self.v,
            w: self.w,
            v: self.u,
        }
    }

    /// The rotational aspect of the map, scale stripped.
    fn as_quaternion(&self) -> UnitQuaternion {
        self.u * self.v.inverse()
    }
}

pub(crate) fn is_rotation_matrix_raw(matrix: &Matrix3) -> bool {
    let gram = matrix * matrix.transpose();
    let orthonormal = (gram - Matrix3::identity())
        .iter()
        .all(|c| c.abs() <= EPS_CHECK_ROTATION);
    orthonormal && (matrix.determinant() - 1.0).abs() <= EPS_CHECK_ROTATION
}

fn decompose(matrix: &Matrix3) -> RotateScaleRotate {
    if matrix.iter().any(|c| c.is_nan()) {
        return RotateScaleRotate {
            u: UnitQuaternion::identity(),
            w: Vector3::from_element(f64::NAN),
            v: UnitQuaternion::identity(),
        };
    }
    if is_rotation_matrix_raw(matrix) {
        return RotateScaleRotate::from_rotation(UnitQuaternion::from_rotation_matrix(
            &Rotation3::from_matrix_unchecked(*matrix),
        ));
    }

    let svd = matrix.svd(true, true);
    let (Some(mut u), Some(mut v_t)) = (svd.u, svd.v_t) else {
        unreachable!("SVD was computed with both factors requested");
    };
    let mut w = svd.singular_values;

    // nalgebra returns non-negative singular values and orthogonal (but possibly
    // improper) factors; push any reflection onto the smallest singular value so that
    // both factors are proper rotations.
    if u.determinant() < 0.0 {
        for i in 0..3 {
            u[(i, 2)] = -u[(i, 2)];
        }
        w.z = -w.z;
    }
    if v_t.determinant() < 0.0 {
        for i in 0..3 {
            v_t[(2, i)] = -v_t[(2, i)];
        }
        w.z = -w.z;
    }

    RotateScaleRotate {
        u: UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(u)),
        w,
        v: UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(
            v_t.transpose(),
        )),
    }
}

impl LinearTransform3D {
    /// The identity map.
    #[must_use]
    pub fn identity() -> Self {
        let svd = OnceCell::new();
        let _ = svd.set(RotateScaleRotate::identity());
        Self {
            matrix: Matrix3::identity(),
            svd,
        }
    }

    /// Wraps the given raw matrix.
    #[must_use]
    pub fn from_matrix(matrix: Matrix3) -> Self {
        Self {
            matrix,
            svd: OnceCell::new(),
        }
    }

    /// Constructs the map from its nine coefficients, row by row.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn from_coefficients(
        m00: f64,
        m01: f64,
        m02: f64,
        m10: f64,
        m11: f64,
        m12: f64,
        m20: f64,
        m21: f64,
        m22: f64,
    ) -> Self {
        Self::from_matrix(Matrix3::new(m00, m01, m02, m10, m11, m12, m20, m21, m22))
    }

    /// Constructs a pure-rotation map from the given orientation.
    #[must_use]
    pub fn from_orientation(orientation: &Orientation3D) -> Self {
        let q = orientation.as_quaternion();
        let svd = OnceCell::new();
        let _ = svd.set(RotateScaleRotate::from_rotation(q));
        Self {
            matrix: q.to_rotation_matrix().into_inner(),
            svd,
        }
    }

    /// The raw matrix coefficients.
    #[must_use]
    pub fn matrix(&self) -> &Matrix3 {
        &self.matrix
    }

    /// Overwrites the raw coefficients, invalidating the cached decomposition.
    pub fn set_matrix(&mut self, matrix: &Matrix3) {
        self.matrix = *matrix;
        self.svd = OnceCell::new();
    }

    /// Overwrites the raw coefficients row by row, invalidating the cached
    /// decomposition.
    #[allow(clippy::too_many_arguments)]
    pub fn set_coefficients(
        &mut self,
        m00: f64,
        m01: f64,
        m02: f64,
        m10: f64,
        m11: f64,
        m12: f64,
        m20: f64,
        m21: f64,
        m22: f64,
    ) {
        self.set_matrix(&Matrix3::new(m00, m01, m02, m10, m11, m12, m20, m21, m22));
    }

    /// Copies `other` into this map, cached decomposition included.
    pub fn set(&mut self, other: &LinearTransform3D) {
        self.matrix = other.matrix;
        self.svd = other.svd.clone();
    }

    /// Resets this map to identity.
    pub fn set_identity(&mut self) {
        self.matrix = Matrix3::identity();
        self.svd = OnceCell::new();
        let _ = self.svd.set(RotateScaleRotate::identity());
    }

    /// Replaces this map with the pure rotation described by `orientation`.
    pub fn set_orientation(&mut self, orientation: &Orientation3D) {
        let q = orientation.as_quaternion();
        self.matrix = q.to_rotation_matrix().into_inner();
        self.svd = OnceCell::new();
        let _ = self.svd.set(RotateScaleRotate::from_rotation(q));
    }

    /// Fills the coefficients with NaNs, marking the map invalid.
    pub fn set_to_nan(&mut self) {
        self.matrix = Matrix3::from_element(f64::NAN);
        self.svd = OnceCell::new();
    }

    fn svd(&self) -> &RotateScaleRotate {
        self.svd.get_or_init(|| decompose(&self.matrix))
    }

    /// The determinant of the map; equal to the product of the scale components.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        match self.svd.get() {
            Some(d) => d.w.x * d.w.y * d.w.z,
            None => self.matrix.determinant(),
        }
    }

    /// Whether this map is the identity, within a fixed tolerance.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        (self.matrix - Matrix3::identity())
            .iter()
            .all(|c| c.abs() <= EPS_CHECK_IDENTITY)
    }

    /// Whether this map is a proper rotation (orthonormal, determinant +1), within a
    /// fixed tolerance.
    #[must_use]
    pub fn is_rotation_matrix(&self) -> bool {
        match self.svd.get() {
            Some(d) => {
                (d.w.x - 1.0).abs() <= EPS_CHECK_ROTATION
                    && (d.w.y - 1.0).abs() <= EPS_CHECK_ROTATION
                    && (d.w.z - 1.0).abs() <= EPS_CHECK_ROTATION
            }
            None => is_rotation_matrix_raw(&self.matrix),
        }
    }

    /// Whether this map leaves the XY plane invariant (no coupling between the plane
    /// and the Z axis), within a fixed tolerance.
    #[must_use]
    pub fn is_matrix_2d(&self) -> bool {
        self.matrix.m13.abs() <= EPS_CHECK_2D
            && self.matrix.m23.abs() <= EPS_CHECK_2D
            && self.matrix.m31.abs() <= EPS_CHECK_2D
            && self.matrix.m32.abs() <= EPS_CHECK_2D
            && (self.matrix.m33 - 1.0).abs() <= EPS_CHECK_2D
    }

    /// Asserts that this map leaves the XY plane invariant.
    pub fn check_matrix_2d(&self) -> Result<(), TransformError> {
        if self.is_matrix_2d() {
            Ok(())
        } else {
            Err(TransformError::NotATransform2D)
        }
    }

    /// Whether any coefficient is NaN.
    #[must_use]
    pub fn contains_nan(&self) -> bool {
        self.matrix.iter().any(|c| c.is_nan())
    }

    /// Transposes the map in place, keeping a computed decomposition consistent.
    pub fn transpose(&mut self) {
        let cached = self.svd.take();
        self.matrix.transpose_mut();
        if let Some(c) = cached {
            let _ = self.svd.set(c.transposed());
        }
    }

    /// Inverts the map in place, keeping a computed decomposition consistent.
    ///
    /// Uses the transpose when the map currently is a rotation matrix, and a general
    /// matrix inverse otherwise.
    pub fn invert(&mut self) -> Result<(), TransformError> {
        if self.is_identity() {
            return Ok(());
        }

        let rotation = self.is_rotation_matrix();
        let cached = self.svd.take();

        if rotation {
            self.matrix.transpose_mut();
        } else {
            let determinant = self.matrix.determinant();
            let inverse = if determinant.abs() < EPS_INVERT {
                None
            } else {
                self.matrix.try_inverse()
            };
            match inverse {
                Some(inverse) => self.matrix = inverse,
                None => {
                    if let Some(c) = cached {
                        let _ = self.svd.set(c);
                    }
                    return Err(TransformError::SingularMatrix { determinant });
                }
            }
        }

        if let Some(c) = cached {
            let _ = self.svd.set(c.inverted());
        }
        Ok(())
    }

    /// Replaces the scale part of the decomposition with `(1, 1, 1)`, projecting the
    /// map onto its nearest pure-rotation component.
    pub fn reset_scale(&mut self) {
        if self.is_identity() || self.is_rotation_matrix() {
            return;
        }
        let rotation = self.svd().as_quaternion();
        self.matrix = rotation.to_rotation_matrix().into_inner();
        self.svd = OnceCell::new();
        let _ = self.svd.set(RotateScaleRotate::from_rotation(rotation));
    }

    /// The pre-scale rotation of the decomposition.
    #[must_use]
    pub fn pre_scale_quaternion(&self) -> UnitQuaternion {
        self.svd().u
    }

    /// The scale vector of the decomposition.
    ///
    /// A freshly computed decomposition orders the components by decreasing magnitude
    /// and carries a reflection, when present, as a negative sign on the last
    /// component. In-place edits such as [`LinearTransform3D::invert`] update the
    /// components without re-sorting them.
    #[must_use]
    pub fn scale_vector(&self) -> Vector3 {
        self.svd().w
    }

    /// The post-scale rotation of the decomposition (the inverse of the decomposition's
    /// right factor, so that `matrix = pre · diag(scale) · post`).
    #[must_use]
    pub fn post_scale_quaternion(&self) -> UnitQuaternion {
        self.svd().v.inverse()
    }

    /// The rotational aspect of this map as a quaternion, scale stripped.
    ///
    /// Degenerates to the exact rotation when the map is a pure rotation matrix.
    #[must_use]
    pub fn as_quaternion(&self) -> UnitQuaternion {
        self.svd().as_quaternion()
    }

    /// The rotational aspect of this map as an [`Orientation3D`].
    #[must_use]
    pub fn as_orientation(&self) -> Orientation3D {
        Orientation3D::from_quaternion(self.as_quaternion())
    }

    /// Multiplies on the right: `this = this · other`.
    pub fn multiply(&mut self, other: &LinearTransform3D) {
        self.matrix *= other.matrix;
        self.svd = OnceCell::new();
    }

    /// Inverts this map, then multiplies on the right: `this = this⁻¹ · other`.
    pub fn multiply_invert_this(&mut self, other: &LinearTransform3D) -> Result<(), TransformError> {
        self.invert()?;
        self.multiply(other);
        Ok(())
    }

    /// Multiplies by the inverse of `other` on the right: `this = this · other⁻¹`.
    pub fn multiply_invert_other(
        &mut self,
        other: &LinearTransform3D,
    ) -> Result<(), TransformError> {
        self.matrix *= other.inverted_matrix()?;
        self.svd = OnceCell::new();
        Ok(())
    }

    /// Multiplies on the left: `this = other · this`.
    pub fn pre_multiply(&mut self, other: &LinearTransform3D) {
        self.matrix = other.matrix * self.matrix;
        self.svd = OnceCell::new();
    }

    /// Inverts this map, then multiplies on the left: `this = other · this⁻¹`.
    pub fn pre_multiply_invert_this(
        &mut self,
        other: &LinearTransform3D,
    ) -> Result<(), TransformError> {
        self.invert()?;
        self.pre_multiply(other);
        Ok(())
    }

    /// Multiplies by the inverse of `other` on the left: `this = other⁻¹ · this`.
    pub fn pre_multiply_invert_other(
        &mut self,
        other: &LinearTransform3D,
    ) -> Result<(), TransformError> {
        self.matrix = other.inverted_matrix()? * self.matrix;
        self.svd = OnceCell::new();
        Ok(())
    }

    /// Appends the given rotation: `this = this · R(orientation)`.
    pub fn append_rotation(&mut self, orientation: &Orientation3D) {
        self.matrix *= orientation.as_rotation_matrix().into_inner();
        self.svd = OnceCell::new();
    }

    /// Appends the inverse of the given rotation: `this = this · R(orientation)⁻¹`.
    pub fn append_rotation_invert_other(&mut self, orientation: &Orientation3D) {
        self.matrix *= orientation
            .as_rotation_matrix()
            .into_inner()
            .transpose();
        self.svd = OnceCell::new();
    }

    /// Inverts this map, then appends the given rotation:
    /// `this = this⁻¹ · R(orientation)`.
    pub fn append_rotation_invert_this(
        &mut self,
        orientation: &Orientation3D,
    ) -> Result<(), TransformError> {
        self.invert()?;
        self.append_rotation(orientation);
        Ok(())
    }

    /// Prepends the given rotation: `this = R(orientation) · this`.
    pub fn prepend_rotation(&mut self, orientation: &Orientation3D) {
        self.matrix = orientation.as_rotation_matrix().into_inner() * self.matrix;
        self.svd = OnceCell::new();
    }

    /// Prepends the inverse of the given rotation: `this = R(orientation)⁻¹ · this`.
    pub fn prepend_rotation_invert_other(&mut self, orientation: &Orientation3D) {
        self.matrix =
            orientation.as_rotation_matrix().into_inner().transpose() * self.matrix;
        self.svd = OnceCell::new();
    }

    /// Inverts this map, then prepends the given rotation:
    /// `this = R(orientation) · this⁻¹`.
    pub fn prepend_rotation_invert_this(
        &mut self,
        orientation: &Orientation3D,
    ) -> Result<(), TransformError> {
        self.invert()?;
        self.prepend_rotation(orientation);
        Ok(())
    }

    /// Appends a rotation of `yaw` radians about Z.
    pub fn append_yaw_rotation(&mut self, yaw: f64) {
        self.append_rotation(&Orientation3D::from_yaw(yaw));
    }

    /// Appends a rotation of `pitch` radians about Y.
    pub fn append_pitch_rotation(&mut self, pitch: f64) {
        self.append_rotation(&Orientation3D::from_axis_angle(Vector3::y_axis(), pitch));
    }

    /// Appends a rotation of `roll` radians about X.
    pub fn append_roll_rotation(&mut self, roll: f64) {
        self.append_rotation(&Orientation3D::from_axis_angle(Vector3::x_axis(), roll));
    }

    /// Prepends a rotation of `yaw` radians about Z.
    pub fn prepend_yaw_rotation(&mut self, yaw: f64) {
        self.prepend_rotation(&Orientation3D::from_yaw(yaw));
    }

    /// Prepends a rotation of `pitch` radians about Y.
    pub fn prepend_pitch_rotation(&mut self, pitch: f64) {
        self.prepend_rotation(&Orientation3D::from_axis_angle(Vector3::y_axis(), pitch));
    }

    /// Prepends a rotation of `roll` radians about X.
    pub fn prepend_roll_rotation(&mut self, roll: f64) {
        self.prepend_rotation(&Orientation3D::from_axis_angle(Vector3::x_axis(), roll));
    }

    /// Appends an axis-aligned scale: `this = this · diag(x, y, z)`, i.e. the columns
    /// of the raw matrix are scaled.
    pub fn append_scale(&mut self, x: f64, y: f64, z: f64) {
        for row in 0..3 {
            self.matrix[(row, 0)] *= x;
            self.matrix[(row, 1)] *= y;
            self.matrix[(row, 2)] *= z;
        }
        self.svd = OnceCell::new();
    }

    /// Prepends an axis-aligned scale: `this = diag(x, y, z) · this`, i.e. the rows of
    /// the raw matrix are scaled.
    pub fn prepend_scale(&mut self, x: f64, y: f64, z: f64) {
        for column in 0..3 {
            self.matrix[(0, column)] *= x;
            self.matrix[(1, column)] *= y;
            self.matrix[(2, column)] *= z;
        }
        self.svd = OnceCell::new();
    }

    fn inverted_matrix(&self) -> Result<Matrix3, TransformError> {
        let determinant = self.matrix.determinant();
        if determinant.abs() < EPS_INVERT {
            return Err(TransformError::SingularMatrix { determinant });
        }
        self.matrix
            .try_inverse()
            .ok_or(TransformError::SingularMatrix { determinant })
    }

    /// Maps `original` into `transformed`: `transformed = M · original`.
    pub fn transform_point(&self, original: &Point3, transformed: &mut Point3) {
        *transformed = self.matrix * original;
    }

    /// Maps `original` by the inverse of this map.
    pub fn inverse_transform_point(
        &self,
        original: &Point3,
        transformed: &mut Point3,
    ) -> Result<(), TransformError> {
        *transformed = self.inverted_matrix()? * original;
        Ok(())
    }

    /// Maps `original` into `transformed`: `transformed = M · original`.
    pub fn transform_vector(&self, original: &Vector3, transformed: &mut Vector3) {
        *transformed = self.matrix * original;
    }

    /// Maps `original` by the inverse of this map.
    pub fn inverse_transform_vector(
        &self,
        original: &Vector3,
        transformed: &mut Vector3,
    ) -> Result<(), TransformError> {
        *transformed = self.inverted_matrix()? * original;
        Ok(())
    }

    /// Maps the 2D point `original`, treating it as lying in the XY plane.
    ///
    /// With `check_if_transform_in_xy_plane` set, fails with
    /// [`TransformError::NotATransform2D`] when this map couples the plane with the Z
    /// axis; without it, the out-of-plane component is silently dropped.
    pub fn transform_point2(
        &self,
        original: &Point2,
        transformed: &mut Point2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        if check_if_transform_in_xy_plane {
            self.check_matrix_2d()?;
        }
        let (x, y) = (original.x, original.y);
        *transformed = Point2::new(
            self.matrix.m11 * x + self.matrix.m12 * y,
            self.matrix.m21 * x + self.matrix.m22 * y,
        );
        Ok(())
    }

    /// The inverse-map counterpart of [`LinearTransform3D::transform_point2`].
    pub fn inverse_transform_point2(
        &self,
        original: &Point2,
        transformed: &mut Point2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        if check_if_transform_in_xy_plane {
            self.check_matrix_2d()?;
        }
        let inverse = self.inverted_matrix()?;
        let (x, y) = (original.x, original.y);
        *transformed = Point2::new(
            inverse.m11 * x + inverse.m12 * y,
            inverse.m21 * x + inverse.m22 * y,
        );
        Ok(())
    }

    /// Maps the 2D vector `original`, treating it as lying in the XY plane. See
    /// [`LinearTransform3D::transform_point2`] for the plane check.
    pub fn transform_vector2(
        &self,
        original: &Vector2,
        transformed: &mut Vector2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        if check_if_transform_in_xy_plane {
            self.check_matrix_2d()?;
        }
        let (x, y) = (original.x, original.y);
        *transformed = Vector2::new(
            self.matrix.m11 * x + self.matrix.m12 * y,
            self.matrix.m21 * x + self.matrix.m22 * y,
        );
        Ok(())
    }

    /// The inverse-map counterpart of [`LinearTransform3D::transform_vector2`].
    pub fn inverse_transform_vector2(
        &self,
        original: &Vector2,
        transformed: &mut Vector2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        if check_if_transform_in_xy_plane {
            self.check_matrix_2d()?;
        }
        let inverse = self.inverted_matrix()?;
        let (x, y) = (original.x, original.y);
        *transformed = Vector2::new(
            inverse.m11 * x + inverse.m12 * y,
            inverse.m21 * x + inverse.m22 * y,
        );
        Ok(())
    }

    /// Maps the vector part of the homogeneous 4-vector `original`; the scalar part
    /// passes through untouched.
    pub fn transform_vector4(&self, original: &Vector4, transformed: &mut Vector4) {
        let mapped = self.matrix * original.xyz();
        *transformed = Vector4::new(mapped.x, mapped.y, mapped.z, original.w);
    }

    /// The inverse-map counterpart of [`LinearTransform3D::transform_vector4`].
    pub fn inverse_transform_vector4(
        &self,
        original: &Vector4,
        transformed: &mut Vector4,
    ) -> Result<(), TransformError> {
        let mapped = self.inverted_matrix()? * original.xyz();
        *transformed = Vector4::new(mapped.x, mapped.y, mapped.z, original.w);
        Ok(())
    }

    /// Applies this map to a 3×3 matrix as a similarity transform:
    /// `transformed = M · original · M⁻¹`.
    pub fn transform_matrix3(
        &self,
        original: &Matrix3,
        transformed: &mut Matrix3,
    ) -> Result<(), TransformError> {
        *transformed = self.matrix * original * self.inverted_matrix()?;
        Ok(())
    }

    /// The inverse counterpart of [`LinearTransform3D::transform_matrix3`]:
    /// `transformed = M⁻¹ · original · M`.
    pub fn inverse_transform_matrix3(
        &self,
        original: &Matrix3,
        transformed: &mut Matrix3,
    ) -> Result<(), TransformError> {
        *transformed = self.inverted_matrix()? * original * self.matrix;
        Ok(())
    }

    /// Rotates `original` by the rotational aspect of this map; the scale part has no
    /// effect on orientations.
    pub fn transform_orientation(&self, original: &Orientation3D, transformed: &mut Orientation3D) {
        transformed.set(original);
        transformed.prepend(&self.as_orientation());
    }

    /// The inverse-rotation counterpart of [`LinearTransform3D::transform_orientation`].
    pub fn inverse_transform_orientation(
        &self,
        original: &Orientation3D,
        transformed: &mut Orientation3D,
    ) {
        transformed.set(original);
        transformed.prepend_invert_other(&self.as_orientation());
    }
}

impl Default for LinearTransform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix3> for LinearTransform3D {
    fn from(matrix: Matrix3) -> Self {
        Self::from_matrix(matrix)
    }
}

impl PartialEq for LinearTransform3D {
    fn eq(&self, other: &Self) -> bool {
        self.matrix == other.matrix
    }
}

impl Display for LinearTransform3D {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.matrix)
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for LinearTransform3D {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.matrix.abs_diff_eq(&other.matrix, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for LinearTransform3D {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.matrix.relative_eq(&other.matrix, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::f64::consts::FRAC_PI_2;

    fn recomposed(map: &LinearTransform3D) -> Matrix3 {
        let pre = map.pre_scale_quaternion().to_rotation_matrix().into_inner();
        let scale = Matrix3::from_diagonal(&map.scale_vector());
        let post = map.post_scale_quaternion().to_rotation_matrix().into_inner();
        pre * scale * post
    }

    #[test]
    fn decomposition_round_trips_rotation_scale_rotation() {
        let mut map = LinearTransform3D::identity();
        map.prepend_rotation(&Orientation3D::from_yaw_pitch_roll(0.7, -0.3, 1.2));
        map.append_scale(2.0, 3.0, 0.5);
        map.append_rotation(&Orientation3D::from_yaw_pitch_roll(-1.1, 0.4, 0.2));

        assert_relative_eq!(recomposed(&map), *map.matrix(), epsilon = 1e-9);
    }

    #[test]
    fn scale_components_are_ordered_by_magnitude() {
        let mut map = LinearTransform3D::identity();
        map.append_scale(2.0, 3.0, 0.5);
        let scale = map.scale_vector();
        assert_relative_eq!(scale, Vector3::new(3.0, 2.0, 0.5), epsilon = 1e-9);
    }

    #[test]
    fn reflection_lands_on_the_last_scale_component() {
        let map = LinearTransform3D::from_matrix(Matrix3::from_diagonal(&Vector3::new(
            -2.0, 3.0, 0.5,
        )));
        assert!(map.determinant() < 0.0);

        let scale = map.scale_vector();
        assert!(scale.x.abs() >= scale.y.abs() && scale.y.abs() >= scale.z.abs());
        assert!(scale.x > 0.0 && scale.y > 0.0 && scale.z < 0.0);

        // both bracketing factors stay proper rotations
        assert_relative_eq!(
            map.pre_scale_quaternion().norm(),
            1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(recomposed(&map), *map.matrix(), epsilon = 1e-9);
    }

    #[test]
    fn pure_rotation_decomposes_with_unit_scale() {
        let orientation = Orientation3D::from_yaw_pitch_roll(0.3, 0.8, -0.4);
        let map = LinearTransform3D::from_orientation(&orientation);
        assert!(map.is_rotation_matrix());
        assert_relative_eq!(map.scale_vector(), Vector3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(
            Orientation3D::from_quaternion(map.as_quaternion()),
            orientation,
            epsilon = 1e-10
        );
    }

    #[rstest]
    #[case(LinearTransform3D::identity(), true)]
    #[case(LinearTransform3D::from_orientation(&Orientation3D::from_yaw(1.0)), true)]
    #[case({
        let mut map = LinearTransform3D::identity();
        map.append_scale(2.0, 1.0, 1.0);
        map
    }, false)]
    #[case(LinearTransform3D::from_matrix(Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -1.0))), false)]
    fn rotation_matrix_predicate(#[case] map: LinearTransform3D, #[case] expected: bool) {
        assert_eq!(map.is_rotation_matrix(), expected);
    }

    #[test]
    fn invert_uses_the_transpose_for_rotations() {
        let mut map =
            LinearTransform3D::from_orientation(&Orientation3D::from_yaw_pitch_roll(0.5, 0.2, 0.9));
        let transpose = map.matrix().transpose();
        map.invert().expect("rotations are invertible");
        assert_relative_eq!(*map.matrix(), transpose, epsilon = 1e-12);
    }

    #[test]
    fn invert_round_trips_a_general_map() {
        let original = LinearTransform3D::from_coefficients(
            2.0, 0.5, 0.0, //
            -1.0, 3.0, 1.0, //
            0.0, 0.25, 0.5,
        );
        let mut map = original.clone();
        map.invert().expect("map is invertible");
        map.invert().expect("inverse is invertible");
        assert_relative_eq!(*map.matrix(), *original.matrix(), epsilon = 1e-10);
    }

    #[test]
    fn invert_refuses_a_singular_map() {
        let mut map = LinearTransform3D::from_coefficients(
            1.0, 2.0, 3.0, //
            2.0, 4.0, 6.0, //
            0.0, 1.0, 1.0,
        );
        assert!(matches!(
            map.invert(),
            Err(TransformError::SingularMatrix { .. })
        ));
        // the failed inversion leaves the coefficients untouched
        assert_relative_eq!(map.matrix().m21, 2.0);
    }

    #[test]
    fn invert_keeps_a_computed_decomposition_consistent() {
        let mut map = LinearTransform3D::identity();
        map.prepend_rotation(&Orientation3D::from_yaw_pitch_roll(0.4, 0.1, -0.6));
        map.append_scale(2.0, 4.0, 8.0);

        // force the decomposition, then edit in place
        let before = map.scale_vector();
        map.invert().expect("map is invertible");
        let after = map.scale_vector();
        assert_relative_eq!(
            after,
            Vector3::new(1.0 / before.x, 1.0 / before.y, 1.0 / before.z),
            epsilon = 1e-9
        );
        assert_relative_eq!(recomposed(&map), *map.matrix(), epsilon = 1e-9);
    }

    #[test]
    fn transpose_keeps_a_computed_decomposition_consistent() {
        let mut map = LinearTransform3D::identity();
        map.prepend_rotation(&Orientation3D::from_yaw_pitch_roll(1.0, -0.2, 0.3));
        map.append_scale(3.0, 2.0, 0.25);

        let _ = map.scale_vector();
        map.transpose();
        assert_relative_eq!(recomposed(&map), *map.matrix(), epsilon = 1e-9);
    }

    #[test]
    fn reset_scale_projects_onto_the_rotation() {
        let pre = Orientation3D::from_yaw_pitch_roll(0.6, 0.0, 0.0);
        let post = Orientation3D::from_yaw_pitch_roll(0.0, 0.0, 0.8);
        let mut map = LinearTransform3D::from_orientation(&post);
        map.append_scale(2.0, 3.0, 0.5);
        map.prepend_rotation(&pre);

        let rotation_before = map.as_quaternion();
        map.reset_scale();

        assert!(map.is_rotation_matrix());
        assert_relative_eq!(map.scale_vector(), Vector3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(
            Orientation3D::from_quaternion(map.as_quaternion()),
            Orientation3D::from_quaternion(rotation_before),
            epsilon = 1e-10
        );
    }

    #[test]
    fn append_scales_columns_and_prepend_scales_rows() {
        let base = Matrix3::new(
            1.0, 2.0, 3.0, //
            4.0, 5.0, 6.0, //
            7.0, 8.0, 9.0,
        );
        let mut appended = LinearTransform3D::from_matrix(base);
        appended.append_scale(2.0, 3.0, 4.0);
        assert_relative_eq!(
            *appended.matrix(),
            Matrix3::new(2.0, 6.0, 12.0, 8.0, 15.0, 24.0, 14.0, 24.0, 36.0)
        );

        let mut prepended = LinearTransform3D::from_matrix(base);
        prepended.prepend_scale(2.0, 3.0, 4.0);
        assert_relative_eq!(
            *prepended.matrix(),
            Matrix3::new(2.0, 4.0, 6.0, 12.0, 15.0, 18.0, 28.0, 32.0, 36.0)
        );
    }

    #[test]
    fn determinant_uses_the_cached_scale_product() {
        let mut map = LinearTransform3D::identity();
        map.append_scale(2.0, 3.0, 0.5);
        map.append_rotation(&Orientation3D::from_yaw(0.4));

        assert_relative_eq!(map.determinant(), 3.0, epsilon = 1e-12);
        let _ = map.scale_vector();
        assert_relative_eq!(map.determinant(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn similarity_transform_of_a_matrix_round_trips() {
        let map = LinearTransform3D::from_coefficients(
            2.0, 1.0, 0.0, //
            0.0, 3.0, 0.5, //
            0.0, 0.0, 0.5,
        );
        let probe = Matrix3::new(1.0, 0.5, 0.0, -1.0, 2.0, 0.0, 0.0, 1.0, 1.5);

        let mut mapped = Matrix3::zeros();
        map.transform_matrix3(&probe, &mut mapped)
            .expect("map is invertible");
        let mut back = Matrix3::zeros();
        map.inverse_transform_matrix3(&mapped, &mut back)
            .expect("map is invertible");
        assert_relative_eq!(back, probe, epsilon = 1e-10);
    }

    #[test]
    fn point2_transform_honors_the_plane_check() {
        let mut tilted = LinearTransform3D::identity();
        tilted.append_pitch_rotation(0.4);
        let mut out = Point2::origin();
        assert!(matches!(
            tilted.transform_point2(&Point2::new(1.0, 0.0), &mut out, true),
            Err(TransformError::NotATransform2D)
        ));

        let mut planar = LinearTransform3D::identity();
        planar.append_yaw_rotation(FRAC_PI_2);
        planar
            .transform_point2(&Point2::new(1.0, 0.0), &mut out, true)
            .expect("yaw stays in the XY plane");
        assert_relative_eq!(out, Point2::new(0.0, 1.0), epsilon = 1e-10);
    }

    #[test]
    fn orientation_transform_ignores_scale() {
        let rotation = Orientation3D::from_yaw(0.9);
        let mut map = LinearTransform3D::from_orientation(&rotation);
        map.append_scale(5.0, 5.0, 5.0);

        let original = Orientation3D::from_yaw_pitch_roll(0.1, 0.2, 0.3);
        let mut transformed = Orientation3D::identity();
        map.transform_orientation(&original, &mut transformed);

        let mut expected = Orientation3D::identity();
        rotation.transform_orientation(&original, &mut expected);
        assert_relative_eq!(transformed, expected, epsilon = 1e-9);

        let mut back = Orientation3D::identity();
        map.inverse_transform_orientation(&transformed, &mut back);
        assert_relative_eq!(back, original, epsilon = 1e-9);
    }

    #[test]
    fn interleaved_edits_keep_matrix_and_decomposition_in_agreement() {
        let mut map = LinearTransform3D::identity();
        map.append_rotation(&Orientation3D::from_yaw_pitch_roll(0.2, -0.5, 0.7));
        let _ = map.scale_vector();
        map.append_scale(1.5, 0.5, 2.0);
        map.prepend_rotation(&Orientation3D::from_yaw(1.3));
        let _ = map.scale_vector();
        map.prepend_scale(0.5, 2.0, 1.0);
        map.transpose();
        assert_relative_eq!(recomposed(&map), *map.matrix(), epsilon = 1e-9);
    }
}
