//! The uniform apply/inverse-apply contract shared by all transform kinds.

use crate::affine::AffineTransform;
use crate::errors::TransformError;
use crate::orientation::Orientation3D;
use crate::rigid::RigidBodyTransform;
use crate::{Matrix3, Point2, Point3, Rotation3, Vector2, Vector3, Vector4};

/// The operations every transform kind exposes to geometric primitives.
///
/// Both [`RigidBodyTransform`] and [`AffineTransform`] implement this trait, so code
/// that moves points, vectors, orientations, homogeneous 4-vectors, 2D tuples, 3×3
/// matrices, or whole transforms between frames can accept `&dyn Transform` (or a
/// generic bound) and stay agnostic of whether the motion carries scale.
///
/// Every operation comes in a two-argument form that writes into a caller-provided
/// destination, and an `_in_place` form that overwrites its single argument; the two
/// are always equivalent. Only the destination argument is ever mutated.
///
/// The 2D operations take a `check_if_transform_in_xy_plane` flag: when set, they fail
/// with [`TransformError::NotATransform2D`] if the transform's rotation does not map
/// the XY plane to itself, instead of silently dropping the out-of-plane component.
///
/// The `inverse_transform_*` operations undo the corresponding `transform_*`; for an
/// [`AffineTransform`] they can fail with [`TransformError::SingularMatrix`] when the
/// linear part is not invertible. A [`RigidBodyTransform`] is always invertible, so
/// its implementations never return that error.
///
/// Transforming a nested [`RigidBodyTransform`] or [`AffineTransform`] re-expresses
/// the operand under this transform: the operand is copied, then left-multiplied by
/// `self`.
pub trait Transform {
    /// Transforms the 3D point `original` into `transformed`.
    fn transform_point(&self, original: &Point3, transformed: &mut Point3);

    /// Undoes this transform on the 3D point `original`.
    fn inverse_transform_point(
        &self,
        original: &Point3,
        transformed: &mut Point3,
    ) -> Result<(), TransformError>;

    /// Transforms the 3D vector `original` into `transformed`.
    ///
    /// A vector is a displacement without an origin: it is subject to the rotation
    /// (and, for affine transforms, scale) of this transform but not its translation.
    fn transform_vector(&self, original: &Vector3, transformed: &mut Vector3);

    /// Undoes this transform on the 3D vector `original`.
    fn inverse_transform_vector(
        &self,
        original: &Vector3,
        transformed: &mut Vector3,
    ) -> Result<(), TransformError>;

    /// Transforms the orientation `original` into `transformed`.
    ///
    /// Orientations are only affected by the rotational aspect of a transform; scale
    /// and translation have no effect on them.
    fn transform_orientation(&self, original: &Orientation3D, transformed: &mut Orientation3D);

    /// Undoes this transform on the orientation `original`.
    fn inverse_transform_orientation(
        &self,
        original: &Orientation3D,
        transformed: &mut Orientation3D,
    );

    /// Transforms the homogeneous 4-vector `original` into `transformed`: the vector
    /// part is rotated/scaled, and the translation is added weighted by the scalar
    /// part, which itself passes through untouched.
    fn transform_vector4(&self, original: &Vector4, transformed: &mut Vector4);

    /// Undoes this transform on the homogeneous 4-vector `original`.
    fn inverse_transform_vector4(
        &self,
        original: &Vector4,
        transformed: &mut Vector4,
    ) -> Result<(), TransformError>;

    /// Transforms the 2D point `original`, treating it as lying in the XY plane.
    fn transform_point2(
        &self,
        original: &Point2,
        transformed: &mut Point2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError>;

    /// Undoes this transform on the 2D point `original`.
    fn inverse_transform_point2(
        &self,
        original: &Point2,
        transformed: &mut Point2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError>;

    /// Transforms the 2D vector `original`, treating it as lying in the XY plane.
    fn transform_vector2(
        &self,
        original: &Vector2,
        transformed: &mut Vector2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError>;

    /// Undoes this transform on the 2D vector `original`.
    fn inverse_transform_vector2(
        &self,
        original: &Vector2,
        transformed: &mut Vector2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError>;

    /// Transforms the 3×3 matrix `original` as a similarity transform:
    /// `transformed = M · original · M⁻¹` where `M` is this transform's linear part.
    fn transform_matrix3(
        &self,
        original: &Matrix3,
        transformed: &mut Matrix3,
    ) -> Result<(), TransformError>;

    /// Undoes this transform on the 3×3 matrix `original`.
    fn inverse_transform_matrix3(
        &self,
        original: &Matrix3,
        transformed: &mut Matrix3,
    ) -> Result<(), TransformError>;

    /// Transforms the rotation matrix `original`:
    /// `transformed = R · original` where `R` is this transform's rotational aspect.
    fn transform_rotation_matrix(&self, original: &Rotation3, transformed: &mut Rotation3);

    /// Undoes this transform on the rotation matrix `original`.
    fn inverse_transform_rotation_matrix(&self, original: &Rotation3, transformed: &mut Rotation3);

    /// Re-expresses the rigid-body transform `original` under this transform:
    /// `transformed = this · original`.
    fn transform_rigid(&self, original: &RigidBodyTransform, transformed: &mut RigidBodyTransform);

    /// Undoes this transform on the rigid-body transform `original`:
    /// `transformed = this⁻¹ · original`.
    fn inverse_transform_rigid(
        &self,
        original: &RigidBodyTransform,
        transformed: &mut RigidBodyTransform,
    ) -> Result<(), TransformError>;

    /// Re-expresses the affine transform `original` under this transform:
    /// `transformed = this · original`.
    fn transform_affine(&self, original: &AffineTransform, transformed: &mut AffineTransform);

    /// Undoes this transform on the affine transform `original`:
    /// `transformed = this⁻¹ · original`.
    fn inverse_transform_affine(
        &self,
        original: &AffineTransform,
        transformed: &mut AffineTransform,
    ) -> Result<(), TransformError>;

    /// Transforms `point` in place.
    fn transform_point_in_place(&self, point: &mut Point3) {
        let original = *point;
        self.transform_point(&original, point);
    }

    /// Undoes this transform on `point` in place.
    fn inverse_transform_point_in_place(&self, point: &mut Point3) -> Result<(), TransformError> {
        let original = *point;
        self.inverse_transform_point(&original, point)
    }

    /// Transforms `vector` in place.
    fn transform_vector_in_place(&self, vector: &mut Vector3) {
        let original = *vector;
        self.transform_vector(&original, vector);
    }

    /// Undoes this transform on `vector` in place.
    fn inverse_transform_vector_in_place(
        &self,
        vector: &mut Vector3,
    ) -> Result<(), TransformError> {
        let original = *vector;
        self.inverse_transform_vector(&original, vector)
    }

    /// Transforms `orientation` in place.
    fn transform_orientation_in_place(&self, orientation: &mut Orientation3D) {
        let original = *orientation;
        self.transform_orientation(&original, orientation);
    }

    /// Undoes this transform on `orientation` in place.
    fn inverse_transform_orientation_in_place(&self, orientation: &mut Orientation3D) {
        let original = *orientation;
        self.inverse_transform_orientation(&original, orientation);
    }

    /// Transforms `vector` in place.
    fn transform_vector4_in_place(&self, vector: &mut Vector4) {
        let original = *vector;
        self.transform_vector4(&original, vector);
    }

    /// Undoes this transform on `vector` in place.
    fn inverse_transform_vector4_in_place(
        &self,
        vector: &mut Vector4,
    ) -> Result<(), TransformError> {
        let original = *vector;
        self.inverse_transform_vector4(&original, vector)
    }

    /// Transforms `point` in place.
    fn transform_point2_in_place(
        &self,
        point: &mut Point2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        let original = *point;
        self.transform_point2(&original, point, check_if_transform_in_xy_plane)
    }

    /// Undoes this transform on `point` in place.
    fn inverse_transform_point2_in_place(
        &self,
        point: &mut Point2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        let original = *point;
        self.inverse_transform_point2(&original, point, check_if_transform_in_xy_plane)
    }

    /// Transforms `vector` in place.
    fn transform_vector2_in_place(
        &self,
        vector: &mut Vector2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        let original = *vector;
        self.transform_vector2(&original, vector, check_if_transform_in_xy_plane)
    }

    /// Undoes this transform on `vector` in place.
    fn inverse_transform_vector2_in_place(
        &self,
        vector: &mut Vector2,
        check_if_transform_in_xy_plane: bool,
    ) -> Result<(), TransformError> {
        let original = *vector;
        self.inverse_transform_vector2(&original, vector, check_if_transform_in_xy_plane)
    }

    /// Transforms `matrix` in place.
    fn transform_matrix3_in_place(&self, matrix: &mut Matrix3) -> Result<(), TransformError> {
        let original = *matrix;
        self.transform_matrix3(&original, matrix)
    }

    /// Undoes this transform on `matrix` in place.
    fn inverse_transform_matrix3_in_place(
        &self,
        matrix: &mut Matrix3,
    ) -> Result<(), TransformError> {
        let original = *matrix;
        self.inverse_transform_matrix3(&original, matrix)
    }

    /// Transforms `rotation` in place.
    fn transform_rotation_matrix_in_place(&self, rotation: &mut Rotation3) {
        let original = *rotation;
        self.transform_rotation_matrix(&original, rotation);
    }

    /// Undoes this transform on `rotation` in place.
    fn inverse_transform_rotation_matrix_in_place(&self, rotation: &mut Rotation3) {
        let original = *rotation;
        self.inverse_transform_rotation_matrix(&original, rotation);
    }

    /// Re-expresses `transform` under this transform, in place.
    fn transform_rigid_in_place(&self, transform: &mut RigidBodyTransform) {
        let original = *transform;
        self.transform_rigid(&original, transform);
    }

    /// Undoes this transform on `transform` in place.
    fn inverse_transform_rigid_in_place(
        &self,
        transform: &mut RigidBodyTransform,
    ) -> Result<(), TransformError> {
        let original = *transform;
        self.inverse_transform_rigid(&original, transform)
    }

    /// Re-expresses `transform` under this transform, in place.
    fn transform_affine_in_place(&self, transform: &mut AffineTransform) {
        let original = transform.clone();
        self.transform_affine(&original, transform);
    }

    /// Undoes this transform on `transform` in place.
    fn inverse_transform_affine_in_place(
        &self,
        transform: &mut AffineTransform,
    ) -> Result<(), TransformError> {
        let original = transform.clone();
        self.inverse_transform_affine(&original, transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn transform_kinds_are_interchangeable_behind_the_trait() {
        let rigid = RigidBodyTransform::new(
            Orientation3D::from_yaw(FRAC_PI_2),
            Vector3::new(1.0, 0.0, 0.0),
        );
        let affine = AffineTransform::from_rigid(&rigid);

        let transforms: [&dyn Transform; 2] = [&rigid, &affine];
        for transform in transforms {
            let mut transformed = Point3::origin();
            transform.transform_point(&Point3::new(1.0, 0.0, 0.0), &mut transformed);
            assert_relative_eq!(transformed, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-10);

            let mut back = transformed;
            transform
                .inverse_transform_point_in_place(&mut back)
                .expect("both transforms are invertible");
            assert_relative_eq!(back, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-10);
        }
    }

    #[test]
    fn in_place_forms_match_the_destination_forms() {
        let transform = RigidBodyTransform::new(
            Orientation3D::from_yaw_pitch_roll(0.3, -0.8, 0.1),
            Vector3::new(0.5, -2.0, 1.0),
        );

        let original = Vector4::new(1.0, 2.0, 3.0, 0.5);
        let mut destination = Vector4::zeros();
        transform.transform_vector4(&original, &mut destination);

        let mut in_place = original;
        transform.transform_vector4_in_place(&mut in_place);
        assert_relative_eq!(in_place, destination, epsilon = 1e-12);
    }
}
