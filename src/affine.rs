//! Affine transforms: a general invertible linear map + translation.

use crate::errors::TransformError;
use crate::linear::LinearTransform3D;
use crate::orientation::Orientation3D;
use crate::rigid::RigidBodyTransform;
use crate::transform::Transform;
use crate::{Matrix3, Matrix4, Point2, Point3, Rotation3, Vector2, Vector3, Vector4};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::Mul;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An affine transform: the map `p′ = L·p + t` where `L` is any invertible 3×3 linear
/// map -- rotation, scale, shear, reflection, or any mix -- and `t` a translation.
///
/// The linear part is a [`LinearTransform3D`], so the rotational aspect of the map is
/// always available without disturbing the scale (see
/// [`LinearTransform3D::as_quaternion`]). Composition mirrors
/// [`RigidBodyTransform`](crate::RigidBodyTransform) with `L` substituted for `R`, with
/// one asymmetry: folding a rigid-body transform *into* an affine transform preserves
/// the affine scale, while folding an affine transform into a rigid-body transform
/// drops it.
///
/// ```
/// use kardan::{AffineTransform, Transform};
/// use nalgebra::{Point3, Vector3};
///
/// let mut transform = AffineTransform::default();
/// transform.append_scale(2.0, 2.0, 2.0);
/// transform.prepend_translation(&Vector3::new(1.0, 0.0, 0.0));
///
/// let mut transformed = Point3::origin();
/// transform.transform_point(&Point3::new(1.0, 1.0, 1.0), &mut transformed);
/// approx::assert_relative_eq!(transformed, Point3::new(3.0, 2.0, 2.0), epsilon = 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AffineTransform {
    linear: LinearTransform3D,
    translation: Vector3,
}

impl AffineTransform {
    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            linear: LinearTransform3D::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Constructs a transform from a linear part and a translation.
    #[must_use]
    pub fn new(linear: LinearTransform3D, translation: Vector3) -> Self {
        Self {
            linear,
            translation,
        }
    }

    /// Constructs the affine embedding of a rigid-body transform (exact, no scale).
    #[must_use]
    pub fn from_rigid(rigid: &RigidBodyTransform) -> Self {
        Self {
            linear: LinearTransform3D::from_orientation(rigid.rotation()),
            translation: *rigid.translation(),
        }
    }

    /// Constructs a transform from a rotation and a translation.
    #[must_use]
    pub fn from_orientation_translation(orientation: &Orientation3D, translation: Vector3) -> Self {
        Self {
            linear: LinearTransform3D::from_orientation(orientation),
            translation,
        }
    }

    /// The linear part of this transform.
    #[must_use]
    pub fn linear_transform(&self) -> &LinearTransform3D {
        &self.linear
    }

    /// Write access to the linear part of this transform.
    pub fn linear_transform_mut(&mut self) -> &mut LinearTransform3D {
        &mut self.linear
    }

    /// The translation part of this transform.
    #[must_use]
    pub fn translation(&self) -> &Vector3 {
        &self.translation
    }

    /// Write access to the translation part of this transform.
    pub fn translation_mut(&mut self) -> &mut Vector3 {
        &mut self.translation
    }

    /// Copies `other` into this transform.
    pub fn set(&mut self, other: &AffineTransform) {
        self.linear.set(&other.linear);
        self.translation = other.translation;
    }

    /// Resets this transform to identity.
    pub fn set_identity(&mut self) {
        self.linear.set_identity();
        self.translation = Vector3::zeros();
    }

    /// Fills this transform with NaNs, marking it invalid.
    pub fn set_to_nan(&mut self) {
        self.linear.set_to_nan();
        self.translation = Vector3::from_element(f64::NAN);
    }

    /// Resets the linear part to identity, leaving the translation untouched.
    pub fn set_linear_transform_to_identity(&mut self) {
        self.linear.set_identity();
    }

    /// Resets the translation part to zero, leaving the linear part untouched.
    pub fn set_translation_to_zero(&mut self) {
        self.translation = Vector3::zeros();
    }

    /// Sets this transform from the 12 coefficients of the upper three rows of its
    /// homogeneous matrix, row by row (the fourth column being the translation).
    #[allow(clippy::too_many_arguments)]
    pub fn set_coefficients(
        &mut self,
        m00: f64,
        m01: f64,
        m02: f64,
        m03: f64,
        m10: f64,
        m11: f64,
        m12: f64,
        m13: f64,
        m20: f64,
        m21: f64,
        m22: f64,
        m23: f64,
    ) {
        self.linear
            .set_coefficients(m00, m01, m02, m10, m11, m12, m20, m21, m22);
        self.translation = Vector3::new(m03, m13, m23);
    }

    /// Replaces the linear part, leaving the translation untouched.
    pub fn set_linear_transform(&mut self, matrix: &Matrix3) {
        self.linear.set_matrix(matrix);
    }

    /// Replaces the linear part with a pure rotation, leaving the translation
    /// untouched.
    pub fn set_linear_transform_orientation(&mut self, orientation: &Orientation3D) {
        self.linear.set_orientation(orientation);
    }

    /// Replaces the translation part, leaving the linear part untouched.
    pub fn set_translation(&mut self, translation: &Vector3) {
        self.translation = *translation;
    }

    /// Sets this transform to equal the given rigid-body transform.
    pub fn set_from_rigid(&mut self, rigid: &RigidBodyTransform) {
        self.linear.set_orientation(rigid.rotation());
        self.translation = *rigid.translation();
    }

    /// Replaces the scale part of the linear decomposition with `(1, 1, 1)`, leaving
    /// the translation untouched.
    pub fn reset_scale(&mut self) {
        self.linear.reset_scale();
    }

    /// Whether the linear part is non-negligible (not the identity). Derived from the
    /// current coefficients on every call.
    #[must_use]
    pub fn has_linear_transform(&self) -> bool {
        !self.linear.is_identity()
    }

    /// Whether the translation part is non-negligible. Derived from the current
    /// translation value on every call.
    #[must_use]
    pub fn has_translation(&self) -> bool {
        self.translation.x.abs() > crate::rigid::EPS_ZERO_TRANSLATION
            || self.translation.y.abs() > crate::rigid::EPS_ZERO_TRANSLATION
            || self.translation.z.abs() > crate::rigid::EPS_ZERO_TRANSLATION
    }

    /// Whether any component of this transform is NaN.
    #[must_use]
    pub fn contains_nan(&self) -> bool {
        self.linear.contains_nan() || self.translation.iter().any(|c| c.is_nan())
    }

    /// Inverts this transform in place: `L ← L⁻¹`, `t ← −L⁻¹·t`.
    ///
    /// Fails with [`TransformError::SingularMatrix`] when the linear part is not
    /// invertible, leaving the transform untouched.
    pub fn invert(&mut self) -> Result<(), TransformError> {
        if self.has_linear_transform() {
            self.linear.invert()?;
            if self.has_translation() {
                let translation = self.translation;
                self.linear
                    .transform_vector(&translation, &mut self.translation);
            }
        }
        self.translation = -self.translation;
        Ok(())
    }

    /// Returns the inverse of this transform.
    pub fn inverse(&self) -> Result<Self, TransformError> {
        let mut inverted = self.clone();
        inverted.invert()?;
        Ok(inverted)
    }

    /// Multiplies on the right: `this = this · other`.
    pub fn multiply(&mut self, other: &AffineTransform) {
        if other.has_translation() {
            let mut mapped = Vector3::zeros();
            self.linear.transform_vector(&other.translation, &mut mapped);
            self.translation += mapped;
        }
        self.linear.multiply(&other.linear);
    }

    /// Multiplies on the right by a rigid-body transform; the scale of this transform
    /// is preserved.
    pub fn multiply_rigid(&mut self, rigid: &RigidBodyTransform) {
        if rigid.has_translation() {
            let mut mapped = Vector3::zeros();
            self.linear.transform_vector(rigid.translation(), &mut mapped);
            self.translation += mapped;
        }
        self.linear.append_rotation(rigid.rotation());
    }

    /// Inverts this transform, then multiplies on the right: `this = this⁻¹ · other`.
    pub fn multiply_invert_this(&mut self, other: &AffineTransform) -> Result<(), TransformError> {
        let difference = other.translation - self.translation;
        self.linear.invert()?;
        self.linear
            .transform_vector(&difference, &mut self.translation);
        self.linear.multiply(&other.linear);
        Ok(())
    }

    /// Multiplies on the right by the inverse of `other`: `this = this · other⁻¹`.
    pub fn multiply_invert_other(&mut self, other: &AffineTransform) -> Result<(), TransformError> {
        self.linear.multiply_invert_other(&other.linear)?;
        if other.has_translation() {
            let mut mapped = Vector3::zeros();
            self.linear.transform_vector(&other.translation, &mut mapped);
            self.translation -= mapped;
        }
        Ok(())
    }

    /// Inverts this transform, then multiplies on the right by `rigid`:
    /// `this = this⁻¹ · rigid`.
    pub fn multiply_invert_this_rigid(
        &mut self,
        rigid: &RigidBodyTransform,
    ) -> Result<(), TransformError> {
        let difference = rigid.translation() - self.translation;
        self.linear.invert()?;
        self.linear
            .transform_vector(&difference, &mut self.translation);
        self.linear.append_rotation(rigid.rotation());
        Ok(())
    }

    /// Multiplies on the right by the inverse of `rigid`: `this = this · rigid⁻¹`.
    pub fn multiply_invert_other_rigid(&mut self, rigid: &RigidBodyTransform) {
        self.linear.append_rotation_invert_other(rigid.rotation());
        if rigid.has_translation() {
            let mut mapped = Vector3::zeros();
            self.linear.transform_vector(rigid.translation(), &mut mapped);
            self.translation -= mapped;
        }
    }

    /// Multiplies on the left: `this = other · this`.
    pub fn pre_multiply(&mut self, other: &AffineTransform) {
        let translation = self.translation;
        other
            .linear
            .transform_vector(&translation, &mut self.translation);
        self.translation += other.translation;
        self.linear.pre_multiply(&other.linear);
    }

    /// Multiplies on the left by a rigid-body transform; the scale of this transform
    /// is preserved.
    pub fn pre_multiply_rigid(&mut self, rigid: &RigidBodyTransform) {
        let translation = self.translation;
        rigid
            .rotation()
            .transform_vector(&translation, &mut self.translation);
        self.translation += rigid.translation();
        self.linear.prepend_rotation(rigid.rotation());
    }

    /// Inverts this transform, then multiplies on the left: `this = other · this⁻¹`.
    pub fn pre_multiply_invert_this(
        &mut self,
        other: &AffineTransform,
    ) -> Result<(), TransformError> {
        self.linear.pre_multiply_invert_this(&other.linear)?;
        let translation = self.translation;
        self.linear
            .transform_vector(&translation, &mut self.translation);
        self.translation = other.translation - self.translation;
        Ok(())
    }

    /// Multiplies on the left by the inverse of `other`: `this = other⁻¹ · this`.
    pub fn pre_multiply_invert_other(
        &mut self,
        other: &AffineTransform,
    ) -> Result<(), TransformError> {
        let shifted = self.translation - other.translation;
        let mut mapped = Vector3::zeros();
        other.linear.inverse_transform_vector(&shifted, &mut mapped)?;
        self.linear.pre_multiply_invert_other(&other.linear)?;
        self.translation = mapped;
        Ok(())
    }

    /// Inverts this transform, then multiplies on the left by `rigid`:
    /// `this = rigid · this⁻¹`.
    pub fn pre_multiply_invert_this_rigid(
        &mut self,
        rigid: &RigidBodyTransform,
    ) -> Result<(), TransformError> {
        self.linear.prepend_rotation_invert_this(rigid.rotation())?;
        let translation = self.translation;
        self.linear
            .transform_vector(&translation, &mut self.translation);
        self.translation = rigid.translation() - self.translation;
        Ok(())
    }

    /// Multiplies on the left by the inverse of `rigid`: `this = rigid⁻¹ · this`.
    pub fn pre_multiply_invert_other_rigid(&mut self, rigid: &RigidBodyTransform) {
        self.translation -= rigid.translation();
        let translation = self.translation;
        rigid
            .rotation()
            .inverse_transform_vector(&translation, &mut self.translation);
        self.linear.prepend_rotation_invert_other(rigid.rotation());
    }

    /// Appends a translation: `t ← L·d + t`, linear part unchanged.
    pub fn append_translation(&mut self, translation: &Vector3) {
        let mut mapped = Vector3::zeros();
        self.linear.transform_vector(translation, &mut mapped);
        self.translation += mapped;
    }

    /// Prepends a translation: `t ← t + d`, linear part unchanged.
    pub fn prepend_translation(&mut self, translation: &Vector3) {
        self.translation += translation;
    }

    /// Appends the given rotation to the linear part; the translation is unchanged.
    pub fn append_orientation(&mut self, orientation: &Orientation3D) {
        self.linear.append_rotation(orientation);
    }

    /// Appends a rotation of `yaw` radians about Z; the translation is unchanged.
    pub fn append_yaw_rotation(&mut self, yaw: f64) {
        self.linear.append_yaw_rotation(yaw);
    }

    /// Appends a rotation of `pitch` radians about Y; the translation is unchanged.
    pub fn append_pitch_rotation(&mut self, pitch: f64) {
        self.linear.append_pitch_rotation(pitch);
    }

    /// Appends a rotation of `roll` radians about X; the translation is unchanged.
    pub fn append_roll_rotation(&mut self, roll: f64) {
        self.linear.append_roll_rotation(roll);
    }

    /// Prepends a rotation of `yaw` radians about Z, rotating the translation as well.
    pub fn prepend_yaw_rotation(&mut self, yaw: f64) {
        let rotation = Orientation3D::from_yaw(yaw);
        let translation = self.translation;
        rotation.transform_vector(&translation, &mut self.translation);
        self.linear.prepend_yaw_rotation(yaw);
    }

    /// Prepends a rotation of `pitch` radians about Y, rotating the translation as
    /// well.
    pub fn prepend_pitch_rotation(&mut self, pitch: f64) {
        let rotation = Orientation3D::from_axis_angle(Vector3::y_axis(), pitch);
        let translation = self.translation;
        rotation.transform_vector(&translation, &mut self.translation);
        self.linear.prepend_pitch_rotation(pitch);
    }

    /// Prepends a rotation of `roll` radians about X, rotating the translation as
    /// well.
    pub fn prepend_roll_rotation(&mut self, roll: f64) {
        let rotation = Orientation3D::from_axis_angle(Vector3::x_axis(), roll);
        let translation = self.translation;
        rotation.transform_vector(&translation, &mut self.translation);
        self.linear.prepend_roll_rotation(roll);
    }

    /// Appends an axis-aligned scale to the linear part; the translation is unchanged.
    pub fn append_scale(&mut self, x: f64, y: f64, z: f64) {
        self.linear.append_scale(x, y, z);
    }

    /// Prepends an axis-aligned scale. A prepended scale acts on the already-translated
    /// result, so the translation is rescaled element-wise as well.
    pub fn prepend_scale(&mut self, x: f64, y: f64, z: f64) {
        self.translation.x *= x;
        self.translation.y *= y;
        self.translation.z *= z;
        self.linear.prepend_scale(x, y, z);
    }

    /// Packs this transform into a 4×4 row-major homogeneous matrix with bottom row
    /// `[0, 0, 0, 1]`.
    #[must_use]
    pub fn as_homogeneous_matrix(&self) -> Matrix4 {
        let mut homogeneous = Matrix4::identity();
        homogeneous
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(self.linear.matrix());
        homogeneous
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&self.translation);
        homogeneous
    }

    /// Unpacks this transform from a 4×4 homogeneous matrix. The bottom row is
    /// ignored.
    pub fn set_from_homogeneous_matrix(&mut self, matrix: &Matrix4) {
        self.linear
            .set_matrix(&matrix.fixed_view::<3, 3>(0, 0).into_owned());
        self.translation = matrix.fixed_view::<3, 1>(0, 3).into_owned();
    }

    /// Packs this transform into a flat 16-element row-major homogeneous array.
    #[must_use]
    pub fn as_homogeneous_array(&self) -> [f64; 16] {
        let m = self.linear.matrix();
        let t = &self.translation;
        [
            m.m11, m.m12, m.m13, t.x, //
            m.m21, m.m22, m.m23, t.y, //
            m.m31, m.m32, m.m33, t.z, //
            0.0, 0.0, 0.0, 1.0,
        ]
    }

    /// Packs this transform into a flat 12-element row-major array (the homogeneous
    /// array without its constant bottom row).
    #[must_use]
    pub fn as_compact_array(&self) -> [f64; 12] {
        let m = self.linear.matrix();
        let t = &self.translation;
        [
            m.m11, m.m12, m.m13, t.x, //
            m.m21, m.m22, m.m23, t.y, //
            m.m31, m.m32, m.m33, t.z,
        ]
    }

    /// Unpacks this transform from a flat 16-element row-major homogeneous array. The
    /// last four elements are ignored.
    pub fn set_from_homogeneous_array(&mut self, array: &[f64; 16]) {
        self.set_coefficients(
            array[0], array[1], array[2], array[3], //
            array[4], array[5], array[6], array[7], //
            array[8], array[9], array[10], array[11],
        );
    }

    /// Unpacks this transform from a flat 12-element row-major array.
    pub fn set_from_compact_array(&mut self, array: &[f64; 12]) {
        self.set_coefficients(
            array[0], array[1], array[2], array[3], //
            array[4], array[5], array[6], array[7], //
            array[8], array[9], array[10], array[11],
        );
    }
}

impl Transform for AffineTransform {
    fn transform_point(&self, original: &Point3, transformed: &mut Point3) {
        if self.has_linear_transform() {
            self.linear.transform_point(original, transformed);
        } else {
            *transformed = *original;
        }
        if self.has_translation() {
            transformed.coords += self.translation;
        }
    }

    fn inverse_transform_point(
        &self,
        original: &Point3,
        transformed: &mut Point3,
    ) -> Result<(), TransformError> {
        *transformed = *original;
        if self.has_translation() {
            transformed.coords -= self.translation;
        }
        if self.has_linear_transform() {
            let shifted = *transformed;
            self.linear.inverse_transform_point(&shifted, transformed)?;
        }
        Ok(())
    }

    fn transform_vector(&self, original: &Vector3, transformed: &mut Vector3) {
        if self.has_linear_transform() {
            self.linear.transform_vector(original, transformed);
        } else {
            *transformed = *original;
        }
    }

    fn inverse_transform_vector(
        &self,
        original: &Vector3,
        transformed: &mut Vector3,
    ) -> Result<(), TransformError> {
        if self.has_linear_transform() {
            self.linear.inverse_transform_vector(original, transformed)?;
        } else {
            *transformed = *original;
        }
        Ok(())
    }

    fn transform_orientation(&self, original: &Orientation3D, transformed: &mut Orientation3D) {
        if self.has_linear_transform() {
            self.linear.transform_orientation(original, transformed);
        } else {
            transformed.set(original);
        }
    }

    fn inverse_transform_orientation(
        &self,
        original: &Orientation3D,
        transformed: &mut Orientation3D,
    ) {
        if self.has_linear_transform() {
            self.linear
                .inverse_transform_orientation(original, transformed);
        } else {
            transformed.set(original);
        }
    }

    fn transform_vector4(&self, original: &Vector4, transformed: &mut Vector4) {
        if self.has_linear_transform() {
            self.linear.transform_vector4(original, transformed);
        } else {
            *transformed = *original;
        }
        if self.has_translation() {
            transformed.x += transformed.w * self.translation.x;
            transformed.y += transformed.w * self.translation.y;
            transformed.z += transformed.w * self.translation.z;
        }
    }

    fn inverse_transform_vector4(
        &self,
        original: &Vector4,
        transformed: &mut Vector4,
    ) -> Result<(), TransformError> {
        *transformed = *original;
        if self.has_translation() {
            transformed.x -= transformed.w * self.translation.x;
            transformed.y -= transformed.w * self.translation.y;
            transformed.z -= transformed.w * self.translation.z;
        }
        if self.has_linear_transform() {
            let shifted = *transformed;
            self.linear.inverse_transform_vector4(&shifted, transformed)?;
        }
        Ok(())
    }

    fn transform_point2(
        &self,
        original: &Point2,
        transformed: &mut Point2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        if self.has_linear_transform() {
            self.linear
                .transform_point2(original, transformed, check_if_transform_in_xy_plane)?;
        } else {
            *transformed = *original;
        }
        if self.has_translation() {
            transformed.x += self.translation.x;
            transformed.y += self.translation.y;
        }
        Ok(())
    }

    fn inverse_transform_point2(
        &self,
        original: &Point2,
        transformed: &mut Point2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        *transformed = *original;
        if self.has_translation() {
            transformed.x -= self.translation.x;
            transformed.y -= self.translation.y;
        }
        if self.has_linear_transform() {
            let shifted = *transformed;
            self.linear.inverse_transform_point2(
                &shifted,
                transformed,
                check_if_transform_in_xy_plane,
            )?;
        }
        Ok(())
    }

    fn transform_vector2(
        &self,
        original: &Vector2,
        transformed: &mut Vector2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        if self.has_linear_transform() {
            self.linear
                .transform_vector2(original, transformed, check_if_transform_in_xy_plane)
        } else {
            *transformed = *original;
            Ok(())
        }
    }

    fn inverse_transform_vector2(
        &self,
        original: &Vector2,
        transformed: &mut Vector2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        if self.has_linear_transform() {
            self.linear.inverse_transform_vector2(
                original,
                transformed,
                check_if_transform_in_xy_plane,
            )
        } else {
            *transformed = *original;
            Ok(())
        }
    }

    fn transform_matrix3(
        &self,
        original: &Matrix3,
        transformed: &mut Matrix3,
    ) -> Result<(), TransformError> {
        if self.has_linear_transform() {
            self.linear.transform_matrix3(original, transformed)?;
        } else {
            *transformed = *original;
        }
        Ok(())
    }

    fn inverse_transform_matrix3(
        &self,
        original: &Matrix3,
        transformed: &mut Matrix3,
    ) -> Result<(), TransformError> {
        if self.has_linear_transform() {
            self.linear.inverse_transform_matrix3(original, transformed)?;
        } else {
            *transformed = *original;
        }
        Ok(())
    }

    fn transform_rotation_matrix(&self, original: &Rotation3, transformed: &mut Rotation3) {
        if self.has_linear_transform() {
            *transformed = (self.linear.as_quaternion()
                * Orientation3D::from_rotation_matrix(*original).as_quaternion())
            .to_rotation_matrix();
        } else {
            *transformed = *original;
        }
    }

    fn inverse_transform_rotation_matrix(&self, original: &Rotation3, transformed: &mut Rotation3) {
        if self.has_linear_transform() {
            *transformed = (self.linear.as_quaternion().inverse()
                * Orientation3D::from_rotation_matrix(*original).as_quaternion())
            .to_rotation_matrix();
        } else {
            *transformed = *original;
        }
    }

    fn transform_rigid(&self, original: &RigidBodyTransform, transformed: &mut RigidBodyTransform) {
        transformed.set(original);
        transformed.pre_multiply_affine(self);
    }

    fn inverse_transform_rigid(
        &self,
        original: &RigidBodyTransform,
        transformed: &mut RigidBodyTransform,
    ) -> Result<(), TransformError> {
        transformed.set(original);
        transformed.pre_multiply_invert_other_affine(self);
        Ok(())
    }

    fn transform_affine(&self, original: &AffineTransform, transformed: &mut AffineTransform) {
        transformed.set(original);
        transformed.pre_multiply(self);
    }

    fn inverse_transform_affine(
        &self,
        original: &AffineTransform,
        transformed: &mut AffineTransform,
    ) -> Result<(), TransformError> {
        transformed.set(original);
        transformed.pre_multiply_invert_other(self)
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<&RigidBodyTransform> for AffineTransform {
    fn from(rigid: &RigidBodyTransform) -> Self {
        Self::from_rigid(rigid)
    }
}

impl From<&AffineTransform> for RigidBodyTransform {
    /// The lossy narrowing conversion: keeps the rotational aspect and the
    /// translation, drops the scale.
    fn from(affine: &AffineTransform) -> Self {
        let mut rigid = RigidBodyTransform::identity();
        rigid.set_from_affine(affine);
        rigid
    }
}

impl Display for AffineTransform {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "linear: {}, translation: ({}, {}, {})",
            self.linear, self.translation.x, self.translation.y, self.translation.z
        )
    }
}

impl Mul<&AffineTransform> for &AffineTransform {
    type Output = AffineTransform;

    fn mul(self, rhs: &AffineTransform) -> Self::Output {
        let mut product = self.clone();
        product.multiply(rhs);
        product
    }
}

impl Mul<Point3> for &AffineTransform {
    type Output = Point3;

    fn mul(self, rhs: Point3) -> Self::Output {
        let mut transformed = Point3::origin();
        self.transform_point(&rhs, &mut transformed);
        transformed
    }
}

impl Mul<Vector3> for &AffineTransform {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Self::Output {
        let mut transformed = Vector3::zeros();
        self.transform_vector(&rhs, &mut transformed);
        transformed
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for AffineTransform {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.linear.abs_diff_eq(&other.linear, epsilon)
            && self.translation.abs_diff_eq(&other.translation, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for AffineTransform {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.linear.relative_eq(&other.linear, epsilon, max_relative)
            && self
                .translation
                .relative_eq(&other.translation, epsilon, max_relative)
    }
}
