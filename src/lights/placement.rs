use bevy::prelude::*;

use crate::settings::UpAxis;

/// Remap a Y-up position into a Z-up scene: `(x, y, z) -> (x, -z, y)`.
pub fn y_up_to_z_up(position: [f32; 3]) -> Vec3 {
    let [x, y, z] = position;
    Vec3::new(x, -z, y)
}

/// Local location of a light authored at `position`.
pub fn local_location(position: [f32; 3], up_axis: UpAxis) -> Vec3 {
    match up_axis {
        UpAxis::ZUp => y_up_to_z_up(position),
        UpAxis::YUp => Vec3::from_array(position),
    }
}

fn transform_matrix(transform: &Transform) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        transform.scale,
        transform.rotation,
        transform.translation,
    )
}

/// World matrix of `entity`, composed from the `Transform` of every ancestor.
///
/// Computed from local transforms rather than `GlobalTransform`, which is not
/// propagated yet for entities spawned earlier in the same frame.
pub fn world_matrix(world: &World, entity: Entity) -> Mat4 {
    let mut matrix = Mat4::IDENTITY;
    let mut current = Some(entity);
    while let Some(node) = current {
        if let Some(transform) = world.get::<Transform>(node) {
            matrix = transform_matrix(transform) * matrix;
        }
        current = world.get::<ChildOf>(node).map(ChildOf::parent);
    }
    matrix
}

/// Inverse of the parent's current world matrix, or `None` when it is singular.
pub fn parent_inverse(world: &World, parent: Entity) -> Option<Mat4> {
    let matrix = world_matrix(world, parent);
    let determinant = matrix.determinant();
    if determinant == 0.0 || !determinant.is_finite() {
        return None;
    }
    Some(matrix.inverse())
}

/// Child transform that keeps a light at `location` in world space at the
/// moment of parenting, then follows the parent afterwards.
pub fn parented_transform(parent_inverse: Mat4, location: Vec3) -> Transform {
    Transform::from_matrix(parent_inverse * Mat4::from_translation(location))
}
