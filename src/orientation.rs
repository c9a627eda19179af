//! Polymorphic 3D rotations.
//!
//! [`Orientation3D`] is the rotation capability shared by every transform kind in this
//! crate: a tagged value that can hold any of the common rotation representations while
//! exposing one set of operations. Transform types hold an `Orientation3D` and never
//! commit to a concrete representation, so a caller that thinks in quaternions and a
//! caller that thinks in yaw angles can feed the same machinery.

use crate::errors::TransformError;
use crate::{Matrix3, Point2, Point3, Rotation3, UnitQuaternion, Vector2, Vector3, Vector4};
use nalgebra::Unit;
use std::fmt;
use std::fmt::{Display, Formatter};

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance below which a rotation is considered to be the identity.
pub(crate) const EPS_ZERO_ORIENTATION: f64 = 1.0e-8;

/// Tolerance for deciding whether a rotation maps the XY plane to itself.
pub(crate) const EPS_ORIENTATION_2D: f64 = 1.0e-8;

/// A proper 3D rotation, in whichever representation the caller handed over.
///
/// All variants represent the same mathematical object -- a member of SO(3) -- and every
/// operation behaves identically across variants. Mutating operations (`set`, `append`,
/// `prepend`, `invert`, ..) keep the current representation whenever the result is
/// expressible in it; the only exception is [`Orientation3D::Yaw`], which silently
/// promotes itself to [`Orientation3D::Quaternion`] when a mutation takes the rotation
/// out of the XY plane.
///
/// ```
/// use kardan::Orientation3D;
/// use nalgebra::Point3;
/// use std::f64::consts::FRAC_PI_2;
///
/// let quarter_turn = Orientation3D::from_yaw(FRAC_PI_2);
/// let mut rotated = Point3::origin();
/// quarter_turn.transform_point(&Point3::new(1.0, 0.0, 0.0), &mut rotated);
/// approx::assert_relative_eq!(rotated, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-10);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation3D {
    /// A unit quaternion.
    Quaternion(UnitQuaternion),
    /// A proper rotation matrix.
    RotationMatrix(Rotation3),
    /// A unit axis and an angle about it, in radians.
    AxisAngle {
        /// The rotation axis, unit length.
        axis: Unit<Vector3>,
        /// The rotation angle about `axis`, in radians.
        angle: f64,
    },
    /// A rotation about +Z only, in radians. This is the 2D-orientation variant.
    Yaw(f64),
}

impl Orientation3D {
    /// The identity rotation (stored as a quaternion).
    #[must_use]
    pub fn identity() -> Self {
        Self::Quaternion(UnitQuaternion::identity())
    }

    /// Wraps an existing unit quaternion.
    #[must_use]
    pub fn from_quaternion(quaternion: UnitQuaternion) -> Self {
        Self::Quaternion(quaternion)
    }

    /// Wraps an existing rotation matrix.
    #[must_use]
    pub fn from_rotation_matrix(rotation: Rotation3) -> Self {
        Self::RotationMatrix(rotation)
    }

    /// Constructs a rotation of `angle` radians about the unit `axis`.
    #[must_use]
    pub fn from_axis_angle(axis: Unit<Vector3>, angle: f64) -> Self {
        Self::AxisAngle { axis, angle }
    }

    /// Constructs a rotation about +Z of `yaw` radians.
    #[must_use]
    pub fn from_yaw(yaw: f64) -> Self {
        Self::Yaw(yaw)
    }

    /// Constructs a rotation from intrinsic yaw-pitch-roll angles (applied in that
    /// order: yaw about Z, then pitch about the new Y, then roll about the new X).
    #[must_use]
    pub fn from_yaw_pitch_roll(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self::Quaternion(UnitQuaternion::from_euler_angles(roll, pitch, yaw))
    }

    /// Constructs a rotation from a rotation vector (axis scaled by angle).
    ///
    /// Not to be confused with yaw-pitch-roll or Euler angles: a rotation vector is the
    /// axis of an axis-angle multiplied by that axis-angle's angle.
    #[must_use]
    pub fn from_rotation_vector(rotation_vector: &Vector3) -> Self {
        Self::Quaternion(UnitQuaternion::from_scaled_axis(*rotation_vector))
    }

    /// This rotation as a unit quaternion, whatever the stored representation.
    #[must_use]
    pub fn as_quaternion(&self) -> UnitQuaternion {
        match *self {
            Self::Quaternion(q) => q,
            Self::RotationMatrix(r) => UnitQuaternion::from_rotation_matrix(&r),
            Self::AxisAngle { axis, angle } => UnitQuaternion::from_axis_angle(&axis, angle),
            Self::Yaw(yaw) => UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw),
        }
    }

    /// This rotation as a rotation matrix, whatever the stored representation.
    #[must_use]
    pub fn as_rotation_matrix(&self) -> Rotation3 {
        match *self {
            Self::Quaternion(q) => q.to_rotation_matrix(),
            Self::RotationMatrix(r) => r,
            Self::AxisAngle { axis, angle } => Rotation3::from_axis_angle(&axis, angle),
            Self::Yaw(yaw) => Rotation3::from_axis_angle(&Vector3::z_axis(), yaw),
        }
    }

    /// This rotation as a rotation vector (axis scaled by angle).
    #[must_use]
    pub fn rotation_vector(&self) -> Vector3 {
        self.as_quaternion().scaled_axis()
    }

    /// The yaw component (rotation about Z) of this rotation, in radians.
    #[must_use]
    pub fn yaw(&self) -> f64 {
        match *self {
            Self::Yaw(yaw) => yaw,
            _ => self.as_quaternion().euler_angles().2,
        }
    }

    /// The pitch component (rotation about Y) of this rotation, in radians.
    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.as_quaternion().euler_angles().1
    }

    /// The roll component (rotation about X) of this rotation, in radians.
    #[must_use]
    pub fn roll(&self) -> f64 {
        self.as_quaternion().euler_angles().0
    }

    /// Overwrites this rotation's value with `other`'s, keeping the representation
    /// where possible (see the type-level docs for the `Yaw` promotion rule).
    pub fn set(&mut self, other: &Orientation3D) {
        if let (Self::Yaw(yaw), Self::Yaw(other_yaw)) = (&mut *self, other) {
            *yaw = *other_yaw;
            return;
        }
        self.store(other.as_quaternion());
    }

    /// Resets this rotation to the identity, keeping the representation.
    pub fn set_to_zero(&mut self) {
        match self {
            Self::Quaternion(q) => *q = UnitQuaternion::identity(),
            Self::RotationMatrix(r) => *r = Rotation3::identity(),
            Self::AxisAngle { axis, angle } => {
                *axis = Vector3::x_axis();
                *angle = 0.0;
            }
            Self::Yaw(yaw) => *yaw = 0.0,
        }
    }

    /// Fills this rotation with NaNs, marking it invalid.
    pub fn set_to_nan(&mut self) {
        match self {
            Self::Quaternion(q) => {
                *q = UnitQuaternion::new_unchecked(nalgebra::Quaternion::new(
                    f64::NAN,
                    f64::NAN,
                    f64::NAN,
                    f64::NAN,
                ));
            }
            Self::RotationMatrix(r) => {
                *r = Rotation3::from_matrix_unchecked(Matrix3::from_element(f64::NAN));
            }
            Self::AxisAngle { axis, angle } => {
                *axis = Unit::new_unchecked(Vector3::from_element(f64::NAN));
                *angle = f64::NAN;
            }
            Self::Yaw(yaw) => *yaw = f64::NAN,
        }
    }

    /// Inverts this rotation in place.
    pub fn invert(&mut self) {
        match self {
            Self::Quaternion(q) => *q = q.inverse(),
            Self::RotationMatrix(r) => *r = r.inverse(),
            Self::AxisAngle { angle, .. } => *angle = -*angle,
            Self::Yaw(yaw) => *yaw = -*yaw,
        }
    }

    /// Returns the inverse of this rotation.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut inverted = *self;
        inverted.invert();
        inverted
    }

    /// Re-normalizes the stored representation to counter floating-point drift.
    pub fn normalize(&mut self) {
        match self {
            Self::Quaternion(q) => {
                q.renormalize();
            }
            Self::RotationMatrix(r) => r.renormalize(),
            Self::AxisAngle { axis, .. } => {
                axis.renormalize();
            }
            Self::Yaw(_) => {}
        }
    }

    /// Appends `other` to this rotation: `this = this ∘ other`.
    pub fn append(&mut self, other: &Orientation3D) {
        if let (Self::Yaw(yaw), Self::Yaw(other_yaw)) = (&mut *self, other) {
            *yaw += *other_yaw;
            return;
        }
        let q = self.as_quaternion() * other.as_quaternion();
        self.store(q);
    }

    /// Appends the inverse of `other`: `this = this ∘ other⁻¹`.
    pub fn append_invert_other(&mut self, other: &Orientation3D) {
        if let (Self::Yaw(yaw), Self::Yaw(other_yaw)) = (&mut *self, other) {
            *yaw -= *other_yaw;
            return;
        }
        let q = self.as_quaternion() * other.as_quaternion().inverse();
        self.store(q);
    }

    /// Inverts this rotation, then appends `other`: `this = this⁻¹ ∘ other`.
    pub fn append_invert_this(&mut self, other: &Orientation3D) {
        self.invert();
        self.append(other);
    }

    /// Prepends `other` to this rotation: `this = other ∘ this`.
    pub fn prepend(&mut self, other: &Orientation3D) {
        if let (Self::Yaw(yaw), Self::Yaw(other_yaw)) = (&mut *self, other) {
            *yaw += *other_yaw;
            return;
        }
        let q = other.as_quaternion() * self.as_quaternion();
        self.store(q);
    }

    /// Prepends the inverse of `other`: `this = other⁻¹ ∘ this`.
    pub fn prepend_invert_other(&mut self, other: &Orientation3D) {
        if let (Self::Yaw(yaw), Self::Yaw(other_yaw)) = (&mut *self, other) {
            *yaw -= *other_yaw;
            return;
        }
        let q = other.as_quaternion().inverse() * self.as_quaternion();
        self.store(q);
    }

    /// Inverts this rotation, then prepends `other`: `this = other ∘ this⁻¹`.
    pub fn prepend_invert_this(&mut self, other: &Orientation3D) {
        self.invert();
        self.prepend(other);
    }

    /// Appends a rotation of `yaw` radians about Z.
    pub fn append_yaw_rotation(&mut self, yaw: f64) {
        self.append(&Self::Yaw(yaw));
    }

    /// Appends a rotation of `pitch` radians about Y.
    pub fn append_pitch_rotation(&mut self, pitch: f64) {
        self.append(&Self::from_axis_angle(Vector3::y_axis(), pitch));
    }

    /// Appends a rotation of `roll` radians about X.
    pub fn append_roll_rotation(&mut self, roll: f64) {
        self.append(&Self::from_axis_angle(Vector3::x_axis(), roll));
    }

    /// Prepends a rotation of `yaw` radians about Z.
    pub fn prepend_yaw_rotation(&mut self, yaw: f64) {
        self.prepend(&Self::Yaw(yaw));
    }

    /// Prepends a rotation of `pitch` radians about Y.
    pub fn prepend_pitch_rotation(&mut self, pitch: f64) {
        self.prepend(&Self::from_axis_angle(Vector3::y_axis(), pitch));
    }

    /// Prepends a rotation of `roll` radians about X.
    pub fn prepend_roll_rotation(&mut self, roll: f64) {
        self.prepend(&Self::from_axis_angle(Vector3::x_axis(), roll));
    }

    /// Stores `q` back into this value, keeping the current representation when it can
    /// express `q` and promoting `Yaw` to `Quaternion` when it cannot.
    ///
    /// Re-normalizes on the way in to counter drift accumulated over repeated
    /// composition.
    fn store(&mut self, q: UnitQuaternion) {
        let q = UnitQuaternion::new_normalize(q.into_inner());
        match self {
            Self::Quaternion(stored) => *stored = q,
            Self::RotationMatrix(stored) => *stored = q.to_rotation_matrix(),
            Self::AxisAngle { axis, angle } => match q.axis_angle() {
                Some((a, ang)) => {
                    *axis = a;
                    *angle = ang;
                }
                None => {
                    // identity has no defined axis; pick X by convention
                    *axis = Vector3::x_axis();
                    *angle = 0.0;
                }
            },
            Self::Yaw(yaw) => {
                if q.i.abs() <= EPS_ORIENTATION_2D && q.j.abs() <= EPS_ORIENTATION_2D {
                    *yaw = q.euler_angles().2;
                } else {
                    *self = Self::Quaternion(q);
                }
            }
        }
    }

    /// Rotates `original` into `transformed`.
    pub fn transform_point(&self, original: &Point3, transformed: &mut Point3) {
        *transformed = self.as_quaternion().transform_point(original);
    }

    /// Rotates `original` by the inverse of this rotation into `transformed`.
    pub fn inverse_transform_point(&self, original: &Point3, transformed: &mut Point3) {
        *transformed = self.as_quaternion().inverse_transform_point(original);
    }

    /// Rotates `original` into `transformed`.
    pub fn transform_vector(&self, original: &Vector3, transformed: &mut Vector3) {
        *transformed = self.as_quaternion().transform_vector(original);
    }

    /// Rotates `original` by the inverse of this rotation into `transformed`.
    pub fn inverse_transform_vector(&self, original: &Vector3, transformed: &mut Vector3) {
        *transformed = self.as_quaternion().inverse_transform_vector(original);
    }

    /// Rotates the 2D point `original` into `transformed`, treating it as lying in the
    /// XY plane.
    ///
    /// With `check_if_transform_in_xy_plane` set, fails with
    /// [`TransformError::NotATransform2D`] when this rotation would move the point out
    /// of the XY plane; without it, the out-of-plane component is silently dropped.
    pub fn transform_point2(
        &self,
        original: &Point2,
        transformed: &mut Point2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        if check_if_transform_in_xy_plane {
            self.check_orientation_2d()?;
        }
        let rotated = self
            .as_quaternion()
            .transform_point(&Point3::new(original.x, original.y, 0.0));
        *transformed = Point2::new(rotated.x, rotated.y);
        Ok(())
    }

    /// The inverse-rotation counterpart of [`Orientation3D::transform_point2`].
    pub fn inverse_transform_point2(
        &self,
        original: &Point2,
        transformed: &mut Point2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        if check_if_transform_in_xy_plane {
            self.check_orientation_2d()?;
        }
        let rotated = self
            .as_quaternion()
            .inverse_transform_point(&Point3::new(original.x, original.y, 0.0));
        *transformed = Point2::new(rotated.x, rotated.y);
        Ok(())
    }

    /// Rotates the 2D vector `original` into `transformed`, treating it as lying in the
    /// XY plane. See [`Orientation3D::transform_point2`] for the plane check.
    pub fn transform_vector2(
        &self,
        original: &Vector2,
        transformed: &mut Vector2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        if check_if_transform_in_xy_plane {
            self.check_orientation_2d()?;
        }
        let rotated = self
            .as_quaternion()
            .transform_vector(&Vector3::new(original.x, original.y, 0.0));
        *transformed = Vector2::new(rotated.x, rotated.y);
        Ok(())
    }

    /// The inverse-rotation counterpart of [`Orientation3D::transform_vector2`].
    pub fn inverse_transform_vector2(
        &self,
        original: &Vector2,
        transformed: &mut Vector2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        if check_if_transform_in_xy_plane {
            self.check_orientation_2d()?;
        }
        let rotated = self
            .as_quaternion()
            .inverse_transform_vector(&Vector3::new(original.x, original.y, 0.0));
        *transformed = Vector2::new(rotated.x, rotated.y);
        Ok(())
    }

    /// Rotates the vector part of the homogeneous 4-vector `original`; the scalar part
    /// passes through untouched.
    pub fn transform_vector4(&self, original: &Vector4, transformed: &mut Vector4) {
        let rotated = self
            .as_quaternion()
            .transform_vector(&original.xyz());
        *transformed = Vector4::new(rotated.x, rotated.y, rotated.z, original.w);
    }

    /// The inverse-rotation counterpart of [`Orientation3D::transform_vector4`].
    pub fn inverse_transform_vector4(&self, original: &Vector4, transformed: &mut Vector4) {
        let rotated = self
            .as_quaternion()
            .inverse_transform_vector(&original.xyz());
        *transformed = Vector4::new(rotated.x, rotated.y, rotated.z, original.w);
    }

    /// Applies this rotation to a 3×3 matrix as a similarity transform:
    /// `transformed = R · original · Rᵀ`.
    pub fn transform_matrix3(&self, original: &Matrix3, transformed: &mut Matrix3) {
        let r = self.as_rotation_matrix().into_inner();
        *transformed = r * original * r.transpose();
    }

    /// The inverse counterpart of [`Orientation3D::transform_matrix3`]:
    /// `transformed = Rᵀ · original · R`.
    pub fn inverse_transform_matrix3(&self, original: &Matrix3, transformed: &mut Matrix3) {
        let r = self.as_rotation_matrix().into_inner();
        *transformed = r.transpose() * original * r;
    }

    /// Rotates `original` into `transformed`: `transformed = this ∘ original`.
    pub fn transform_orientation(&self, original: &Orientation3D, transformed: &mut Orientation3D) {
        transformed.set(original);
        transformed.prepend(self);
    }

    /// Rotates `original` by the inverse of this rotation:
    /// `transformed = this⁻¹ ∘ original`.
    pub fn inverse_transform_orientation(
        &self,
        original: &Orientation3D,
        transformed: &mut Orientation3D,
    ) {
        transformed.set(original);
        transformed.prepend_invert_other(self);
    }

    /// Whether this rotation is the identity, within a fixed tolerance.
    #[must_use]
    pub fn is_zero_orientation(&self) -> bool {
        let q = self.as_quaternion();
        q.i.abs() <= EPS_ZERO_ORIENTATION
            && q.j.abs() <= EPS_ZERO_ORIENTATION
            && q.k.abs() <= EPS_ZERO_ORIENTATION
    }

    /// Whether this rotation maps the XY plane to itself (i.e. is a pure yaw), within a
    /// fixed tolerance.
    #[must_use]
    pub fn is_orientation_2d(&self) -> bool {
        match *self {
            Self::Yaw(_) => true,
            _ => {
                let q = self.as_quaternion();
                q.i.abs() <= EPS_ORIENTATION_2D && q.j.abs() <= EPS_ORIENTATION_2D
            }
        }
    }

    /// Asserts that this rotation maps the XY plane to itself.
    pub fn check_orientation_2d(&self) -> Result<(), TransformError> {
        if self.is_orientation_2d() {
            Ok(())
        } else {
            Err(TransformError::NotATransform2D)
        }
    }

    /// Whether any component of the stored representation is NaN.
    #[must_use]
    pub fn contains_nan(&self) -> bool {
        match self {
            Self::Quaternion(q) => q.coords.iter().any(|c| c.is_nan()),
            Self::RotationMatrix(r) => r.matrix().iter().any(|c| c.is_nan()),
            Self::AxisAngle { axis, angle } => {
                angle.is_nan() || axis.iter().any(|c| c.is_nan())
            }
            Self::Yaw(yaw) => yaw.is_nan(),
        }
    }
}

impl Default for Orientation3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Display for Orientation3D {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quaternion(q) => write!(f, "quaternion: {q}"),
            Self::RotationMatrix(r) => write!(f, "rotation matrix: {r}"),
            Self::AxisAngle { axis, angle } => {
                write!(f, "axis: {}, angle: {angle}", axis.into_inner())
            }
            Self::Yaw(yaw) => write!(f, "yaw: {yaw}"),
        }
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Orientation3D {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        let lhs = self.as_quaternion();
        let rhs = other.as_quaternion();
        // q and -q are the same rotation, so accept either sign.
        lhs.coords.abs_diff_eq(&rhs.coords, epsilon) || lhs.coords.abs_diff_eq(&-rhs.coords, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Orientation3D {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        let lhs = self.as_quaternion();
        let rhs = other.as_quaternion();
        lhs.coords.relative_eq(&rhs.coords, epsilon, max_relative)
            || lhs.coords.relative_eq(&-rhs.coords, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rstest::rstest;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[rstest]
    #[case(0.0, [1.0, 0.0, 0.0], [1.0, 0.0, 0.0])]
    #[case(FRAC_PI_2, [1.0, 0.0, 0.0], [0.0, 1.0, 0.0])]
    #[case(PI, [1.0, 0.0, 0.0], [-1.0, 0.0, 0.0])]
    #[case(-FRAC_PI_2, [0.0, 1.0, 0.0], [1.0, 0.0, 0.0])]
    #[case(FRAC_PI_2, [0.0, 0.0, 1.0], [0.0, 0.0, 1.0])]
    fn yaw_rotates_about_z(#[case] yaw: f64, #[case] input: [f64; 3], #[case] expected: [f64; 3]) {
        let orientation = Orientation3D::from_yaw(yaw);
        let mut rotated = Point3::origin();
        orientation.transform_point(&Point3::from(input), &mut rotated);
        assert_relative_eq!(rotated, Point3::from(expected), epsilon = 1e-10);
    }

    #[test]
    fn representations_agree() {
        let yaw = 0.3;
        let pitch = -0.6;
        let roll = 1.1;
        let from_angles = Orientation3D::from_yaw_pitch_roll(yaw, pitch, roll);
        let from_matrix =
            Orientation3D::from_rotation_matrix(from_angles.as_rotation_matrix());
        let q = from_angles.as_quaternion();
        let (axis, angle) = q.axis_angle().expect("rotation is not the identity");
        let from_axis_angle = Orientation3D::from_axis_angle(axis, angle);

        let probe = Point3::new(0.2, -1.5, 3.0);
        for orientation in [from_angles, from_matrix, from_axis_angle] {
            let mut rotated = Point3::origin();
            orientation.transform_point(&probe, &mut rotated);
            assert_relative_eq!(rotated, q.transform_point(&probe), epsilon = 1e-12);
        }
    }

    #[test]
    fn transform_then_inverse_transform_round_trips() {
        let orientation = Orientation3D::from_yaw_pitch_roll(0.4, 0.9, -0.2);
        let original = Vector3::new(-2.0, 0.5, 4.0);
        let mut rotated = Vector3::zeros();
        orientation.transform_vector(&original, &mut rotated);
        let mut back = Vector3::zeros();
        orientation.inverse_transform_vector(&rotated, &mut back);
        assert_relative_eq!(back, original, epsilon = 1e-10);
    }

    #[test]
    fn append_and_prepend_compose_in_opposite_orders() {
        let a = Orientation3D::from_yaw_pitch_roll(0.5, 0.1, 0.0);
        let b = Orientation3D::from_yaw_pitch_roll(-0.3, 0.0, 0.7);

        let mut appended = a;
        appended.append(&b);
        assert_abs_diff_eq!(
            appended.as_quaternion(),
            a.as_quaternion() * b.as_quaternion(),
            epsilon = 1e-12
        );

        let mut prepended = a;
        prepended.prepend(&b);
        assert_abs_diff_eq!(
            prepended.as_quaternion(),
            b.as_quaternion() * a.as_quaternion(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn invert_variants_match_explicit_inverses() {
        let a = Orientation3D::from_yaw_pitch_roll(1.2, -0.4, 0.3);
        let b = Orientation3D::from_yaw_pitch_roll(0.1, 0.8, -0.9);

        let mut sut = a;
        sut.append_invert_other(&b);
        assert_abs_diff_eq!(
            sut.as_quaternion(),
            a.as_quaternion() * b.as_quaternion().inverse(),
            epsilon = 1e-12
        );

        let mut sut = a;
        sut.append_invert_this(&b);
        assert_abs_diff_eq!(
            sut.as_quaternion(),
            a.as_quaternion().inverse() * b.as_quaternion(),
            epsilon = 1e-12
        );

        let mut sut = a;
        sut.prepend_invert_other(&b);
        assert_abs_diff_eq!(
            sut.as_quaternion(),
            b.as_quaternion().inverse() * a.as_quaternion(),
            epsilon = 1e-12
        );

        let mut sut = a;
        sut.prepend_invert_this(&b);
        assert_abs_diff_eq!(
            sut.as_quaternion(),
            b.as_quaternion() * a.as_quaternion().inverse(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn mutation_preserves_representation() {
        let mut matrix = Orientation3D::from_rotation_matrix(Rotation3::from_euler_angles(
            0.1, 0.2, 0.3,
        ));
        matrix.append(&Orientation3D::from_yaw(0.5));
        assert!(matches!(matrix, Orientation3D::RotationMatrix(_)));

        let mut yaw = Orientation3D::from_yaw(0.25);
        yaw.append_yaw_rotation(0.5);
        assert!(matches!(yaw, Orientation3D::Yaw(_)));
        assert_relative_eq!(yaw.yaw(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn yaw_promotes_to_quaternion_when_leaving_the_plane() {
        let mut orientation = Orientation3D::from_yaw(0.25);
        orientation.append_roll_rotation(0.5);
        assert!(matches!(orientation, Orientation3D::Quaternion(_)));
        assert_abs_diff_eq!(
            orientation.as_quaternion(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.25)
                * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.5),
            epsilon = 1e-12
        );
    }

    #[rstest]
    #[case(Orientation3D::from_yaw(1.0), true)]
    #[case(Orientation3D::from_yaw_pitch_roll(1.0, 0.0, 0.0), true)]
    #[case(Orientation3D::from_yaw_pitch_roll(0.0, 0.5, 0.0), false)]
    #[case(Orientation3D::from_yaw_pitch_roll(0.0, 0.0, 0.5), false)]
    fn orientation_2d_predicate(#[case] orientation: Orientation3D, #[case] expected: bool) {
        assert_eq!(orientation.is_orientation_2d(), expected);
        assert_eq!(orientation.check_orientation_2d().is_ok(), expected);
    }

    #[test]
    fn point2_transform_honors_the_plane_check() {
        let tilted = Orientation3D::from_yaw_pitch_roll(0.0, 0.4, 0.0);
        let mut out = Point2::origin();
        let result = tilted.transform_point2(&Point2::new(1.0, 0.0), &mut out, true);
        assert!(matches!(result, Err(TransformError::NotATransform2D)));

        // without the check the z component is silently dropped
        tilted
            .transform_point2(&Point2::new(1.0, 0.0), &mut out, false)
            .expect("check disabled");
        assert_relative_eq!(out.x, 0.4_f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(out.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_orientation_predicate() {
        assert!(Orientation3D::identity().is_zero_orientation());
        assert!(Orientation3D::from_yaw(0.0).is_zero_orientation());
        assert!(!Orientation3D::from_yaw(1e-3).is_zero_orientation());
        assert!(Orientation3D::from_yaw(1e-9).is_zero_orientation());
    }

    #[test]
    fn vector4_scalar_part_passes_through() {
        let orientation = Orientation3D::from_yaw(FRAC_PI_2);
        let mut out = Vector4::zeros();
        orientation.transform_vector4(&Vector4::new(1.0, 0.0, 0.0, 2.5), &mut out);
        assert_relative_eq!(out, Vector4::new(0.0, 1.0, 0.0, 2.5), epsilon = 1e-10);
    }

    #[test]
    fn matrix3_similarity_transform_round_trips() {
        let orientation = Orientation3D::from_yaw_pitch_roll(0.7, -0.1, 0.9);
        let m = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0);
        let mut rotated = Matrix3::zeros();
        orientation.transform_matrix3(&m, &mut rotated);
        let mut back = Matrix3::zeros();
        orientation.inverse_transform_matrix3(&rotated, &mut back);
        assert_relative_eq!(back, m, epsilon = 1e-10);
    }

    #[test]
    fn transform_orientation_prepends() {
        let rotation = Orientation3D::from_yaw(FRAC_PI_4);
        let original = Orientation3D::from_yaw_pitch_roll(0.0, 0.3, 0.0);
        let mut transformed = Orientation3D::identity();
        rotation.transform_orientation(&original, &mut transformed);
        assert_abs_diff_eq!(
            transformed.as_quaternion(),
            rotation.as_quaternion() * original.as_quaternion(),
            epsilon = 1e-12
        );

        let mut back = Orientation3D::identity();
        rotation.inverse_transform_orientation(&transformed, &mut back);
        assert_abs_diff_eq!(back, original, epsilon = 1e-12);
    }

    #[test]
    fn set_preserves_the_target_representation() {
        let source = Orientation3D::from_yaw_pitch_roll(0.2, 0.4, -0.3);
        let mut target = Orientation3D::from_rotation_matrix(Rotation3::identity());
        target.set(&source);
        assert!(matches!(target, Orientation3D::RotationMatrix(_)));
        assert_abs_diff_eq!(target, source, epsilon = 1e-12);
    }

    #[test]
    fn nan_is_detected_but_never_raised() {
        let mut orientation = Orientation3D::identity();
        assert!(!orientation.contains_nan());
        orientation.set_to_nan();
        assert!(orientation.contains_nan());
    }
}
