//! Rigid-body transforms: rotation + translation.

use crate::affine::AffineTransform;
use crate::errors::TransformError;
use crate::linear::is_rotation_matrix_raw;
use crate::orientation::Orientation3D;
use crate::transform::Transform;
use crate::{Matrix3, Matrix4, Point2, Point3, Rotation3, Vector2, Vector3, Vector4};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::Mul;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance below which a translation is considered zero.
pub(crate) const EPS_ZERO_TRANSLATION: f64 = 1.0e-10;

/// A rigid-body transform: the map `p′ = R·p + t` where `R` is a proper rotation and
/// `t` a translation.
///
/// The rotation is an [`Orientation3D`], so any rotation representation can back a
/// transform. Composition is done in place: `multiply`/`pre_multiply` compose whole
/// transforms on the right and left, `append_*` operations insert an elementary motion
/// *before* the existing map (local frame), and `prepend_*` operations insert it
/// *after* (world frame).
///
/// Operations skip work when the rotation is the identity or the translation is zero;
/// whether that is the case is always derived from the current component values, never
/// cached, so partial mutations cannot leave the shortcuts stale.
///
/// ```
/// use kardan::{Orientation3D, RigidBodyTransform, Transform};
/// use nalgebra::{Point3, Vector3};
/// use std::f64::consts::FRAC_PI_2;
///
/// let mut a_to_b = RigidBodyTransform::new(
///     Orientation3D::from_yaw(FRAC_PI_2),
///     Vector3::new(1.0, 0.0, 0.0),
/// );
/// let b_to_c = RigidBodyTransform::from_translation(Vector3::new(0.0, 2.0, 0.0));
///
/// // compose:  a_to_c = a_to_b ∘ b_to_c
/// a_to_b.multiply(&b_to_c);
///
/// let mut transformed = Point3::origin();
/// a_to_b.transform_point(&Point3::origin(), &mut transformed);
/// approx::assert_relative_eq!(transformed, Point3::new(-1.0, 0.0, 0.0), epsilon = 1e-10);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidBodyTransform {
    rotation: Orientation3D,
    translation: Vector3,
}

impl RigidBodyTransform {
    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: Orientation3D::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Constructs a transform from a rotation and a translation.
    #[must_use]
    pub fn new(rotation: Orientation3D, translation: Vector3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Constructs a rotation-only transform.
    #[must_use]
    pub fn from_orientation(rotation: Orientation3D) -> Self {
        Self::new(rotation, Vector3::zeros())
    }

    /// Constructs a translation-only transform.
    #[must_use]
    pub fn from_translation(translation: Vector3) -> Self {
        Self::new(Orientation3D::identity(), translation)
    }

    /// The rotation part of this transform.
    #[must_use]
    pub fn rotation(&self) -> &Orientation3D {
        &self.rotation
    }

    /// Write access to the rotation part of this transform.
    pub fn rotation_mut(&mut self) -> &mut Orientation3D {
        &mut self.rotation
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
    pub fn set(&mut self, other: &RigidBodyTransform) {
        self.rotation.set(&other.rotation);
        self.translation = other.translation;
    }

    /// Resets this transform to identity.
    pub fn set_identity(&mut self) {
        self.rotation.set_to_zero();
        self.translation = Vector3::zeros();
    }

    /// Fills this transform with NaNs, marking it invalid.
    pub fn set_to_nan(&mut self) {
        self.rotation.set_to_nan();
        self.translation = Vector3::from_element(f64::NAN);
    }

    /// Resets the rotation part to identity, leaving the translation untouched.
    pub fn set_rotation_to_zero(&mut self) {
        self.rotation.set_to_zero();
    }

    /// Resets the translation part to zero, leaving the rotation untouched.
    pub fn set_translation_to_zero(&mut self) {
        self.translation = Vector3::zeros();
    }

    /// Replaces the rotation part, leaving the translation untouched.
    pub fn set_rotation(&mut self, rotation: &Orientation3D) {
        self.rotation.set(rotation);
    }

    /// Replaces the rotation part with the given intrinsic yaw-pitch-roll angles.
    pub fn set_rotation_yaw_pitch_roll(&mut self, yaw: f64, pitch: f64, roll: f64) {
        self.rotation
            .set(&Orientation3D::from_yaw_pitch_roll(yaw, pitch, roll));
    }

    /// Replaces the translation part, leaving the rotation untouched.
    pub fn set_translation(&mut self, translation: &Vector3) {
        self.translation = *translation;
    }

    /// Replaces the rotation part and zeroes the translation.
    pub fn set_rotation_and_zero_translation(&mut self, rotation: &Orientation3D) {
        self.rotation.set(rotation);
        self.translation = Vector3::zeros();
    }

    /// Replaces the translation part and resets the rotation to identity.
    pub fn set_translation_and_identity_rotation(&mut self, translation: &Vector3) {
        self.translation = *translation;
        self.rotation.set_to_zero();
    }

    /// Sets this transform to the rotation and translation of `affine`, dropping its
    /// scale -- a lossy narrowing conversion.
    pub fn set_from_affine(&mut self, affine: &AffineTransform) {
        self.rotation.set(&affine.linear_transform().as_orientation());
        self.translation = *affine.translation();
    }

    /// Whether the rotation part is non-negligible. Derived from the current rotation
    /// value on every call.
    #[must_use]
    pub fn has_rotation(&self) -> bool {
        !self.rotation.is_zero_orientation()
    }

    /// Whether the translation part is non-negligible. Derived from the current
    /// translation value on every call.
    #[must_use]
    pub fn has_translation(&self) -> bool {
        self.translation.x.abs() > EPS_ZERO_TRANSLATION
            || self.translation.y.abs() > EPS_ZERO_TRANSLATION
            || self.translation.z.abs() > EPS_ZERO_TRANSLATION
    }

    /// Whether the rotation part maps the XY plane to itself.
    #[must_use]
    pub fn is_rotation_2d(&self) -> bool {
        !self.has_rotation() || self.rotation.is_orientation_2d()
    }

    /// Asserts that the rotation part maps the XY plane to itself.
    pub fn check_rotation_2d(&self) -> Result<(), TransformError> {
        if self.has_rotation() {
            self.rotation.check_orientation_2d()?;
        }
        Ok(())
    }

    /// Whether any component of this transform is NaN.
    #[must_use]
    pub fn contains_nan(&self) -> bool {
        self.rotation.contains_nan() || self.translation.iter().any(|c| c.is_nan())
    }

    /// Inverts this transform in place: `R ← R⁻¹`, `t ← −R⁻¹·t`.
    pub fn invert(&mut self) {
        self.rotation.invert();
        if self.has_translation() {
            let translation = self.translation;
            self.rotation
                .transform_vector(&translation, &mut self.translation);
        }
        self.translation = -self.translation;
    }

    /// Returns the inverse of this transform.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut inverted = *self;
        inverted.invert();
        inverted
    }

    /// Inverts only the rotation part; the translation remains unchanged.
    pub fn invert_rotation(&mut self) {
        self.rotation.invert();
    }

    /// Re-normalizes the rotation part to counter floating-point drift accumulated
    /// over repeated composition.
    pub fn normalize_rotation_part(&mut self) {
        self.rotation.normalize();
    }

    /// Multiplies on the right: `this = this · other`.
    pub fn multiply(&mut self, other: &RigidBodyTransform) {
        if other.has_translation() {
            let mut rotated = Vector3::zeros();
            self.rotation
                .transform_vector(&other.translation, &mut rotated);
            self.translation += rotated;
        }
        self.rotation.append(&other.rotation);
    }

    /// Multiplies on the right by the rotation and translation of `affine`; its scale
    /// is dropped so this transform stays rigid.
    pub fn multiply_affine(&mut self, affine: &AffineTransform) {
        let mut rotated = Vector3::zeros();
        self.rotation
            .transform_vector(affine.translation(), &mut rotated);
        self.translation += rotated;
        self.rotation
            .append(&affine.linear_transform().as_orientation());
    }

    /// Inverts this transform, then multiplies on the right: `this = this⁻¹ · other`.
    pub fn multiply_invert_this(&mut self, other: &RigidBodyTransform) {
        let difference = other.translation - self.translation;
        self.rotation.invert();
        self.rotation
            .transform_vector(&difference, &mut self.translation);
        self.rotation.append(&other.rotation);
    }

    /// Multiplies on the right by the inverse of `other`: `this = this · other⁻¹`.
    pub fn multiply_invert_other(&mut self, other: &RigidBodyTransform) {
        self.rotation.append_invert_other(&other.rotation);
        if other.has_translation() {
            let mut rotated = Vector3::zeros();
            self.rotation
                .transform_vector(&other.translation, &mut rotated);
            self.translation -= rotated;
        }
    }

    /// Inverts this transform, then multiplies on the right by the rotation and
    /// translation of `affine` (scale dropped): `this = this⁻¹ · S(affine)`.
    pub fn multiply_invert_this_affine(&mut self, affine: &AffineTransform) {
        let difference = affine.translation() - self.translation;
        self.rotation
            .inverse_transform_vector(&difference, &mut self.translation);
        self.rotation
            .append_invert_this(&affine.linear_transform().as_orientation());
    }

    /// Multiplies on the right by the inverse of the rotation and translation of
    /// `affine` (scale dropped): `this = this · S(affine)⁻¹`.
    pub fn multiply_invert_other_affine(&mut self, affine: &AffineTransform) {
        self.rotation
            .append_invert_other(&affine.linear_transform().as_orientation());
        let mut rotated = Vector3::zeros();
        self.rotation
            .transform_vector(affine.translation(), &mut rotated);
        self.translation -= rotated;
    }

    /// Multiplies on the left: `this = other · this`.
    pub fn pre_multiply(&mut self, other: &RigidBodyTransform) {
        if self.has_translation() {
            let translation = self.translation;
            other
                .rotation
                .transform_vector(&translation, &mut self.translation);
            self.translation += other.translation;
        } else {
            self.translation = other.translation;
        }
        self.rotation.prepend(&other.rotation);
    }

    /// Multiplies on the left by the rotation and translation of `affine` (scale
    /// dropped): `this = S(affine) · this`.
    pub fn pre_multiply_affine(&mut self, affine: &AffineTransform) {
        let rotation = affine.linear_transform().as_orientation();
        let translation = self.translation;
        rotation.transform_vector(&translation, &mut self.translation);
        self.translation += affine.translation();
        self.rotation.prepend(&rotation);
    }

    /// Inverts this transform, then multiplies on the left: `this = other · this⁻¹`.
    pub fn pre_multiply_invert_this(&mut self, other: &RigidBodyTransform) {
        self.rotation.invert();
        self.rotation.prepend(&other.rotation);
        if self.has_translation() {
            let translation = self.translation;
            self.rotation
                .transform_vector(&translation, &mut self.translation);
        }
        self.translation = other.translation - self.translation;
    }

    /// Multiplies on the left by the inverse of `other`: `this = other⁻¹ · this`.
    pub fn pre_multiply_invert_other(&mut self, other: &RigidBodyTransform) {
        self.translation -= other.translation;
        if self.has_translation() {
            let translation = self.translation;
            other
                .rotation
                .inverse_transform_vector(&translation, &mut self.translation);
        }
        self.rotation.prepend_invert_other(&other.rotation);
    }

    /// Inverts this transform, then multiplies on the left by the rotation and
    /// translation of `affine` (scale dropped): `this = S(affine) · this⁻¹`.
    pub fn pre_multiply_invert_this_affine(&mut self, affine: &AffineTransform) {
        self.rotation
            .prepend_invert_this(&affine.linear_transform().as_orientation());
        let translation = self.translation;
        self.rotation
            .transform_vector(&translation, &mut self.translation);
        self.translation = affine.translation() - self.translation;
    }

    /// Multiplies on the left by the inverse of the rotation and translation of
    /// `affine` (scale dropped): `this = S(affine)⁻¹ · this`.
    pub fn pre_multiply_invert_other_affine(&mut self, affine: &AffineTransform) {
        let rotation = affine.linear_transform().as_orientation();
        self.translation -= affine.translation();
        let translation = self.translation;
        rotation.inverse_transform_vector(&translation, &mut self.translation);
        self.rotation.prepend_invert_other(&rotation);
    }

    /// Appends a translation: the motion `d` is inserted before the existing map, so
    /// `t ← R·d + t` and the rotation is unchanged.
    pub fn append_translation(&mut self, translation: &Vector3) {
        let mut rotated = Vector3::zeros();
        self.rotation.transform_vector(translation, &mut rotated);
        self.translation += rotated;
    }

    /// Prepends a translation: the motion `d` is inserted after the existing map, so
    /// `t ← t + d` and the rotation is unchanged.
    pub fn prepend_translation(&mut self, translation: &Vector3) {
        self.translation += translation;
    }

    /// Appends a rotation of `yaw` radians about Z; the translation is unchanged.
    pub fn append_yaw_rotation(&mut self, yaw: f64) {
        self.rotation.append_yaw_rotation(yaw);
    }

    /// Appends a rotation of `pitch` radians about Y; the translation is unchanged.
    pub fn append_pitch_rotation(&mut self, pitch: f64) {
        self.rotation.append_pitch_rotation(pitch);
    }

    /// Appends a rotation of `roll` radians about X; the translation is unchanged.
    pub fn append_roll_rotation(&mut self, roll: f64) {
        self.rotation.append_roll_rotation(roll);
    }

    /// Appends the given rotation; the translation is unchanged.
    pub fn append_orientation(&mut self, orientation: &Orientation3D) {
        self.rotation.append(orientation);
    }

    /// Prepends a rotation of `yaw` radians about Z. The prepended rotation applies
    /// after the whole map, so the translation is rotated as well.
    pub fn prepend_yaw_rotation(&mut self, yaw: f64) {
        self.prepend_elementary_rotation(&Orientation3D::from_yaw(yaw));
    }

    /// Prepends a rotation of `pitch` radians about Y, rotating the translation as
    /// well.
    pub fn prepend_pitch_rotation(&mut self, pitch: f64) {
        self.prepend_elementary_rotation(&Orientation3D::from_axis_angle(
            Vector3::y_axis(),
            pitch,
        ));
    }

    /// Prepends a rotation of `roll` radians about X, rotating the translation as
    /// well.
    pub fn prepend_roll_rotation(&mut self, roll: f64) {
        self.prepend_elementary_rotation(&Orientation3D::from_axis_angle(
            Vector3::x_axis(),
            roll,
        ));
    }

    fn prepend_elementary_rotation(&mut self, rotation: &Orientation3D) {
        let translation = self.translation;
        rotation.transform_vector(&translation, &mut self.translation);
        self.rotation.prepend(rotation);
    }

    /// Packs this transform into a 4×4 row-major homogeneous matrix with bottom row
    /// `[0, 0, 0, 1]`.
    #[must_use]
    pub fn as_homogeneous_matrix(&self) -> Matrix4 {
        let mut homogeneous = Matrix4::identity();
        homogeneous
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(self.rotation.as_rotation_matrix().matrix());
        homogeneous
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&self.translation);
        homogeneous
    }

    /// Unpacks this transform from a 4×4 homogeneous matrix. The bottom row is
    /// ignored; the 3×3 block must be a proper rotation.
    pub fn set_from_homogeneous_matrix(&mut self, matrix: &Matrix4) -> Result<(), TransformError> {
        let block: Matrix3 = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        if !is_rotation_matrix_raw(&block) {
            return Err(TransformError::InvalidOrientation {
                determinant: block.determinant(),
            });
        }
        self.rotation.set(&Orientation3D::from_rotation_matrix(
            Rotation3::from_matrix_unchecked(block),
        ));
        self.translation = matrix.fixed_view::<3, 1>(0, 3).into_owned();
        Ok(())
    }

    /// Packs this transform into a flat 16-element row-major homogeneous array.
    #[must_use]
    pub fn as_homogeneous_array(&self) -> [f64; 16] {
        let rotation = self.rotation.as_rotation_matrix();
        let r = rotation.matrix();
        let t = &self.translation;
        [
            r.m11, r.m12, r.m13, t.x, //
            r.m21, r.m22, r.m23, t.y, //
            r.m31, r.m32, r.m33, t.z, //
            0.0, 0.0, 0.0, 1.0,
        ]
    }

    /// Packs this transform into a flat 12-element row-major array (the homogeneous
    /// array without its constant bottom row).
    #[must_use]
    pub fn as_compact_array(&self) -> [f64; 12] {
        let rotation = self.rotation.as_rotation_matrix();
        let r = rotation.matrix();
        let t = &self.translation;
        [
            r.m11, r.m12, r.m13, t.x, //
            r.m21, r.m22, r.m23, t.y, //
            r.m31, r.m32, r.m33, t.z,
        ]
    }

    /// Unpacks this transform from a flat 16-element row-major homogeneous array. The
    /// last four elements are ignored; the 3×3 block must be a proper rotation.
    pub fn set_from_homogeneous_array(&mut self, array: &[f64; 16]) -> Result<(), TransformError> {
        let compact: [f64; 12] = array[..12]
            .try_into()
            .unwrap_or_else(|_| unreachable!("slice of a [f64; 16] has 12 elements"));
        self.set_from_compact_array(&compact)
    }

    /// Unpacks this transform from a flat 12-element row-major array. The 3×3 block
    /// must be a proper rotation.
    pub fn set_from_compact_array(&mut self, array: &[f64; 12]) -> Result<(), TransformError> {
        let block = Matrix3::new(
            array[0], array[1], array[2], //
            array[4], array[5], array[6], //
            array[8], array[9], array[10],
        );
        if !is_rotation_matrix_raw(&block) {
            return Err(TransformError::InvalidOrientation {
                determinant: block.determinant(),
            });
        }
        self.rotation.set(&Orientation3D::from_rotation_matrix(
            Rotation3::from_matrix_unchecked(block),
        ));
        self.translation = Vector3::new(array[3], array[7], array[11]);
        Ok(())
    }
}

impl Transform for RigidBodyTransform {
    fn transform_point(&self, original: &Point3, transformed: &mut Point3) {
        if self.has_rotation() {
            self.rotation.transform_point(original, transformed);
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
        if self.has_rotation() {
            let shifted = *transformed;
            self.rotation.inverse_transform_point(&shifted, transformed);
        }
        Ok(())
    }

    fn transform_vector(&self, original: &Vector3, transformed: &mut Vector3) {
        if self.has_rotation() {
            self.rotation.transform_vector(original, transformed);
        } else {
            *transformed = *original;
        }
    }

    fn inverse_transform_vector(
        &self,
        original: &Vector3,
        transformed: &mut Vector3,
    ) -> Result<(), TransformError> {
        if self.has_rotation() {
            self.rotation.inverse_transform_vector(original, transformed);
        } else {
            *transformed = *original;
        }
        Ok(())
    }

    fn transform_orientation(&self, original: &Orientation3D, transformed: &mut Orientation3D) {
        if self.has_rotation() {
            self.rotation.transform_orientation(original, transformed);
        } else {
            transformed.set(original);
        }
    }

    fn inverse_transform_orientation(
        &self,
        original: &Orientation3D,
        transformed: &mut Orientation3D,
    ) {
        if self.has_rotation() {
            self.rotation
                .inverse_transform_orientation(original, transformed);
        } else {
            transformed.set(original);
        }
    }

    fn transform_vector4(&self, original: &Vector4, transformed: &mut Vector4) {
        if self.has_rotation() {
            self.rotation.transform_vector4(original, transformed);
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
        if self.has_rotation() {
            let shifted = *transformed;
            self.rotation
                .inverse_transform_vector4(&shifted, transformed);
        }
        Ok(())
    }

    fn transform_point2(
        &self,
        original: &Point2,
        transformed: &mut Point2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        if self.has_rotation() {
            self.rotation
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
        if self.has_rotation() {
            let shifted = *transformed;
            self.rotation.inverse_transform_point2(
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
        if self.has_rotation() {
            self.rotation
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
        if self.has_rotation() {
            self.rotation.inverse_transform_vector2(
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
        if self.has_rotation() {
            self.rotation.transform_matrix3(original, transformed);
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
        if self.has_rotation() {
            self.rotation.inverse_transform_matrix3(original, transformed);
        } else {
            *transformed = *original;
        }
        Ok(())
    }

    fn transform_rotation_matrix(&self, original: &Rotation3, transformed: &mut Rotation3) {
        *transformed = (self.rotation.as_quaternion()
            * Orientation3D::from_rotation_matrix(*original).as_quaternion())
        .to_rotation_matrix();
    }

    fn inverse_transform_rotation_matrix(&self, original: &Rotation3, transformed: &mut Rotation3) {
        *transformed = (self.rotation.as_quaternion().inverse()
            * Orientation3D::from_rotation_matrix(*original).as_quaternion())
        .to_rotation_matrix();
    }

    fn transform_rigid(&self, original: &RigidBodyTransform, transformed: &mut RigidBodyTransform) {
        transformed.set(original);
        transformed.pre_multiply(self);
    }

    fn inverse_transform_rigid(
        &self,
        original: &RigidBodyTransform,
        transformed: &mut RigidBodyTransform,
    ) -> Result<(), TransformError> {
        transformed.set(original);
        transformed.pre_multiply_invert_other(self);
        Ok(())
    }

    fn transform_affine(&self, original: &AffineTransform, transformed: &mut AffineTransform) {
        transformed.set(original);
        transformed.pre_multiply_rigid(self);
    }

    fn inverse_transform_affine(
        &self,
        original: &AffineTransform,
        transformed: &mut AffineTransform,
    ) -> Result<(), TransformError> {
        transformed.set(original);
        transformed.pre_multiply_invert_other_rigid(self);
        Ok(())
    }
}

impl Default for RigidBodyTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Display for RigidBodyTransform {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rotation: {}, translation: ({}, {}, {})",
            self.rotation, self.translation.x, self.translation.y, self.translation.z
        )
    }
}

impl Mul for RigidBodyTransform {
    type Output = RigidBodyTransform;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut product = self;
        product.multiply(&rhs);
        product
    }
}

impl Mul<&RigidBodyTransform> for &RigidBodyTransform {
    type Output = RigidBodyTransform;

    fn mul(self, rhs: &RigidBodyTransform) -> Self::Output {
        let mut product = *self;
        product.multiply(rhs);
        product
    }
}

impl Mul<Point3> for &RigidBodyTransform {
    type Output = Point3;

    fn mul(self, rhs: Point3) -> Self::Output {
        let mut transformed = Point3::origin();
        self.transform_point(&rhs, &mut transformed);
        transformed
    }
}

impl Mul<Vector3> for &RigidBodyTransform {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Self::Output {
        let mut transformed = Vector3::zeros();
        self.transform_vector(&rhs, &mut transformed);
        transformed
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for RigidBodyTransform {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.rotation.abs_diff_eq(&other.rotation, epsilon)
            && self.translation.abs_diff_eq(&other.translation, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for RigidBodyTransform {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.rotation.relative_eq(&other.rotation, epsilon, max_relative)
            && self
                .translation
                .relative_eq(&other.translation, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use quickcheck::quickcheck;
    use rstest::rstest;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    fn sanitize_angle(raw: f64) -> f64 {
        if raw.is_finite() {
            raw.rem_euclid(TAU) - PI
        } else {
            0.0
        }
    }

    fn sanitize_length(raw: f64) -> f64 {
        if raw.is_finite() {
            raw.rem_euclid(20.0) - 10.0
        } else {
            0.0
        }
    }

    fn transform_from(angles: (f64, f64, f64), translation: (f64, f64, f64)) -> RigidBodyTransform {
        RigidBodyTransform::new(
            Orientation3D::from_yaw_pitch_roll(
                sanitize_angle(angles.0),
                sanitize_angle(angles.1),
                sanitize_angle(angles.2),
            ),
            Vector3::new(
                sanitize_length(translation.0),
                sanitize_length(translation.1),
                sanitize_length(translation.2),
            ),
        )
    }

    #[test]
    fn yaw_quarter_turn_with_translation() {
        let transform = RigidBodyTransform::new(
            Orientation3D::from_yaw(FRAC_PI_2),
            Vector3::new(1.0, 0.0, 0.0),
        );
        let mut transformed = Point3::origin();
        transform.transform_point(&Point3::new(1.0, 0.0, 0.0), &mut transformed);
        assert_relative_eq!(transformed, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-10);
    }

    #[test]
    fn inverting_the_quarter_turn_undoes_it() {
        let mut transform = RigidBodyTransform::new(
            Orientation3D::from_yaw(FRAC_PI_2),
            Vector3::new(1.0, 0.0, 0.0),
        );
        transform.invert();
        let mut back = Point3::origin();
        transform.transform_point(&Point3::new(1.0, 1.0, 0.0), &mut back);
        assert_relative_eq!(back, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-10);
    }

    quickcheck! {
        fn double_inversion_is_the_identity(
            angles: (f64, f64, f64),
            translation: (f64, f64, f64)
        ) -> bool {
            let original = transform_from(angles, translation);
            let mut round_tripped = original;
            round_tripped.invert();
            round_tripped.invert();
            approx::abs_diff_eq!(round_tripped, original, epsilon = 1e-10)
        }

        fn transform_times_its_inverse_is_the_identity(
            angles: (f64, f64, f64),
            translation: (f64, f64, f64)
        ) -> bool {
            let transform = transform_from(angles, translation);
            let product = &transform * &transform.inverse();
            approx::abs_diff_eq!(product, RigidBodyTransform::identity(), epsilon = 1e-10)
        }

        fn composition_is_associative(
            first: ((f64, f64, f64), (f64, f64, f64)),
            second: ((f64, f64, f64), (f64, f64, f64)),
            third: ((f64, f64, f64), (f64, f64, f64))
        ) -> bool {
            let t1 = transform_from(first.0, first.1);
            let t2 = transform_from(second.0, second.1);
            let t3 = transform_from(third.0, third.1);

            let left_first = &(&t1 * &t2) * &t3;
            let right_first = &t1 * &(&t2 * &t3);

            let probe = Point3::new(0.3, -0.7, 1.1);
            approx::relative_eq!(
                &left_first * probe,
                &right_first * probe,
                epsilon = 1e-9
            )
        }
    }

    #[rstest]
    #[case(RigidBodyTransform::identity())]
    #[case(RigidBodyTransform::from_translation(Vector3::new(1.0, -2.0, 3.0)))]
    #[case(RigidBodyTransform::from_orientation(Orientation3D::from_yaw(0.8)))]
    fn associativity_holds_through_the_shortcut_paths(#[case] degenerate: RigidBodyTransform) {
        let full = RigidBodyTransform::new(
            Orientation3D::from_yaw_pitch_roll(0.4, -0.2, 0.9),
            Vector3::new(-1.0, 0.5, 2.0),
        );
        let other = RigidBodyTransform::new(
            Orientation3D::from_yaw_pitch_roll(-0.1, 0.6, 0.0),
            Vector3::new(2.0, 0.0, -0.5),
        );

        let probe = Point3::new(1.0, 2.0, 3.0);
        let left = &(&full * &degenerate) * &other;
        let right = &full * &(&degenerate * &other);
        assert_relative_eq!(&left * probe, &right * probe, epsilon = 1e-10);
    }

    #[test]
    fn append_translation_applies_in_the_local_frame() {
        let rotation = Orientation3D::from_yaw_pitch_roll(0.7, 0.2, -0.4);
        let translation = Vector3::new(1.0, 2.0, 3.0);
        let offset = Vector3::new(-0.5, 1.5, 0.25);

        let mut appended = RigidBodyTransform::new(rotation, translation);
        appended.append_translation(&offset);

        let mut rotated_offset = Vector3::zeros();
        rotation.transform_vector(&offset, &mut rotated_offset);
        assert_relative_eq!(
            *appended.translation(),
            translation + rotated_offset,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(*appended.rotation(), rotation, epsilon = 1e-12);

        let mut prepended = RigidBodyTransform::new(rotation, translation);
        prepended.prepend_translation(&offset);
        assert_relative_eq!(
            *prepended.translation(),
            translation + offset,
            epsilon = 1e-12
        );
    }

    #[test]
    fn append_rotation_leaves_translation_and_prepend_rotates_it() {
        let translation = Vector3::new(1.0, 0.0, 0.0);
        let mut appended =
            RigidBodyTransform::new(Orientation3D::from_yaw(0.3), translation);
        appended.append_yaw_rotation(FRAC_PI_2);
        assert_relative_eq!(*appended.translation(), translation, epsilon = 1e-12);

        let mut prepended =
            RigidBodyTransform::new(Orientation3D::from_yaw(0.3), translation);
        prepended.prepend_yaw_rotation(FRAC_PI_2);
        assert_relative_eq!(
            *prepended.translation(),
            Vector3::new(0.0, 1.0, 0.0),
            epsilon = 1e-10
        );
        assert_relative_eq!(prepended.rotation().yaw(), 0.3 + FRAC_PI_2, epsilon = 1e-10);
    }

    #[test]
    fn multiply_variants_match_their_definitions() {
        let a = RigidBodyTransform::new(
            Orientation3D::from_yaw_pitch_roll(0.5, -0.3, 0.8),
            Vector3::new(1.0, -2.0, 0.5),
        );
        let b = RigidBodyTransform::new(
            Orientation3D::from_yaw_pitch_roll(-0.9, 0.1, 0.2),
            Vector3::new(0.0, 3.0, -1.0),
        );

        let mut sut = a;
        sut.multiply_invert_this(&b);
        assert_abs_diff_eq!(sut, &a.inverse() * &b, epsilon = 1e-10);

        let mut sut = a;
        sut.multiply_invert_other(&b);
        assert_abs_diff_eq!(sut, &a * &b.inverse(), epsilon = 1e-10);

        let mut sut = a;
        sut.pre_multiply(&b);
        assert_abs_diff_eq!(sut, &b * &a, epsilon = 1e-10);

        let mut sut = a;
        sut.pre_multiply_invert_this(&b);
        assert_abs_diff_eq!(sut, &b * &a.inverse(), epsilon = 1e-10);

        let mut sut = a;
        sut.pre_multiply_invert_other(&b);
        assert_abs_diff_eq!(sut, &b.inverse() * &a, epsilon = 1e-10);
    }

    #[test]
    fn transforming_a_nested_transform_conjugates() {
        let outer = RigidBodyTransform::new(
            Orientation3D::from_yaw(0.6),
            Vector3::new(0.0, 1.0, 0.0),
        );
        let inner = RigidBodyTransform::new(
            Orientation3D::from_yaw_pitch_roll(0.1, 0.2, 0.3),
            Vector3::new(2.0, 0.0, -1.0),
        );

        let mut transformed = RigidBodyTransform::identity();
        outer.transform_rigid(&inner, &mut transformed);
        assert_abs_diff_eq!(transformed, &outer * &inner, epsilon = 1e-10);

        let mut back = RigidBodyTransform::identity();
        outer
            .inverse_transform_rigid(&transformed, &mut back)
            .expect("rigid transforms always invert");
        assert_abs_diff_eq!(back, inner, epsilon = 1e-10);
    }

    #[rstest]
    #[case(Orientation3D::from_yaw(1.2), true)]
    #[case(Orientation3D::from_yaw_pitch_roll(0.0, 0.4, 0.0), false)]
    #[case(Orientation3D::from_yaw_pitch_roll(0.0, 0.0, -0.2), false)]
    fn two_dimensional_guard(#[case] rotation: Orientation3D, #[case] in_plane: bool) {
        let transform =
            RigidBodyTransform::new(rotation, Vector3::new(0.5, -0.5, 0.0));
        let mut out = Point2::origin();
        let checked = transform.transform_point2(&Point2::new(1.0, 1.0), &mut out, true);
        assert_eq!(checked.is_ok(), in_plane);
        assert_eq!(transform.is_rotation_2d(), in_plane);

        // without the check the call always goes through
        transform
            .transform_point2(&Point2::new(1.0, 1.0), &mut out, false)
            .expect("unchecked 2D transform cannot fail");
    }

    #[test]
    fn homogeneous_round_trip() {
        let original = RigidBodyTransform::new(
            Orientation3D::from_yaw_pitch_roll(0.3, 0.7, -0.2),
            Vector3::new(4.0, -5.0, 6.0),
        );

        let mut unpacked = RigidBodyTransform::identity();
        unpacked
            .set_from_homogeneous_matrix(&original.as_homogeneous_matrix())
            .expect("packed matrix holds a proper rotation");
        assert_abs_diff_eq!(unpacked, original, epsilon = 1e-10);

        let array = original.as_homogeneous_array();
        assert_eq!(&array[12..], &[0.0, 0.0, 0.0, 1.0]);
        let mut from_array = RigidBodyTransform::identity();
        from_array
            .set_from_homogeneous_array(&array)
            .expect("packed array holds a proper rotation");
        assert_abs_diff_eq!(from_array, original, epsilon = 1e-10);

        let mut from_compact = RigidBodyTransform::identity();
        from_compact
            .set_from_compact_array(&original.as_compact_array())
            .expect("packed array holds a proper rotation");
        assert_abs_diff_eq!(from_compact, original, epsilon = 1e-10);
    }

    #[test]
    fn unpacking_a_scaled_block_is_rejected() {
        let mut matrix = Matrix4::identity();
        matrix[(0, 0)] = 2.0;
        let mut transform = RigidBodyTransform::identity();
        assert!(matches!(
            transform.set_from_homogeneous_matrix(&matrix),
            Err(TransformError::InvalidOrientation { .. })
        ));
    }

    #[test]
    fn derived_predicates_follow_the_components() {
        let mut transform = RigidBodyTransform::identity();
        assert!(!transform.has_rotation());
        assert!(!transform.has_translation());

        transform.set_translation(&Vector3::new(0.0, 1e-12, 0.0));
        assert!(!transform.has_translation());
        transform.set_translation(&Vector3::new(0.0, 1e-6, 0.0));
        assert!(transform.has_translation());

        transform.append_yaw_rotation(1e-12);
        assert!(!transform.has_rotation());
        transform.append_yaw_rotation(0.5);
        assert!(transform.has_rotation());

        // predicates are derived, so undoing the mutation clears them
        transform.set_rotation_to_zero();
        transform.set_translation_to_zero();
        assert!(!transform.has_rotation());
        assert!(!transform.has_translation());
    }

    #[test]
    fn vector4_uses_the_scalar_as_translation_weight() {
        let transform = RigidBodyTransform::new(
            Orientation3D::from_yaw(FRAC_PI_2),
            Vector3::new(1.0, 0.0, 0.0),
        );

        let mut transformed = Vector4::zeros();
        transform.transform_vector4(&Vector4::new(1.0, 0.0, 0.0, 2.0), &mut transformed);
        assert_relative_eq!(transformed, Vector4::new(2.0, 1.0, 0.0, 2.0), epsilon = 1e-10);

        let mut back = Vector4::zeros();
        transform
            .inverse_transform_vector4(&transformed, &mut back)
            .expect("rigid transforms always invert");
        assert_relative_eq!(back, Vector4::new(1.0, 0.0, 0.0, 2.0), epsilon = 1e-10);
    }

    #[test]
    fn nan_is_reported_not_raised() {
        let mut transform = RigidBodyTransform::identity();
        assert!(!transform.contains_nan());
        transform.set_to_nan();
        assert!(transform.contains_nan());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let original = RigidBodyTransform::new(
            Orientation3D::from_yaw_pitch_roll(0.1, 0.2, 0.3),
            Vector3::new(1.0, -2.0, 3.0),
        );
        let serialized = serde_yaml::to_string(&original).expect("transform serializes");
        let deserialized: RigidBodyTransform =
            serde_yaml::from_str(&serialized).expect("transform deserializes");
        assert_abs_diff_eq!(deserialized, original, epsilon = 1e-15);
    }
}
