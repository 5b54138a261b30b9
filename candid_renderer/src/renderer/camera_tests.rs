use super::*;

const EPS: f32 = 1e-5;

#[test]
fn test_default_camera() {
    let camera = Camera::default();
    assert_eq!(camera.position, Vec3::new(0.0, 0.0, 5.0));
    assert_eq!(camera.target, Vec3::ZERO);
    assert_eq!(camera.up, Vec3::Y);
    assert!((camera.fov_y - std::f32::consts::FRAC_PI_3).abs() < EPS);
    assert_eq!(camera.aspect_ratio, 0.0);
}

#[test]
fn test_view_matrix_moves_target_in_front() {
    let camera = Camera::default();
    let view = camera.view_matrix().unwrap();

    // Right-handed: the target ends up on the -Z axis at the camera distance
    let target = view.transform_point3(camera.target);
    assert!(target.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), EPS));
    let eye = view.transform_point3(camera.position);
    assert!(eye.abs_diff_eq(Vec3::ZERO, EPS));
}

#[test]
fn test_view_matrix_basis_is_orthonormal() {
    let camera = Camera {
        position: Vec3::new(3.0, 2.0, -4.0),
        target: Vec3::new(-1.0, 0.5, 2.0),
        up: Vec3::new(0.0, 3.0, 0.0),
        ..Default::default()
    };
    let view = camera.view_matrix().unwrap();
    let forward = (camera.target - camera.position).normalize();
    let right = forward.cross(Vec3::Y).normalize();
    let up = right.cross(forward);

    // Rows of the rotation part are right, up and -forward
    let rotation = view.transpose();
    assert!(rotation.x_axis.truncate().abs_diff_eq(right, EPS));
    assert!(rotation.y_axis.truncate().abs_diff_eq(up, EPS));
    assert!(rotation.z_axis.truncate().abs_diff_eq(-forward, EPS));
}

#[test]
fn test_view_matrix_rejects_degenerate_cameras() {
    let same = Camera::looking_at(Vec3::ONE, Vec3::ONE);
    assert!(matches!(same.view_matrix(), Err(Error::InvalidArgument(_))));

    let parallel = Camera { position: Vec3::ZERO, target: Vec3::new(0.0, 10.0, 0.0), ..Default::default() };
    assert!(matches!(parallel.view_matrix(), Err(Error::InvalidArgument(_))));

    let no_up = Camera { up: Vec3::ZERO, ..Default::default() };
    assert!(no_up.view_matrix().is_err());
}

#[test]
fn test_projection_uses_surface_aspect_when_unset() {
    let camera = Camera::default();
    let aspect = 800.0 / 600.0;
    let projection = camera.projection_matrix(aspect).unwrap();
    let expected = 1.0 / (aspect * (30f32.to_radians()).tan());
    assert!((projection.x_axis.x - expected).abs() < EPS);
    assert!((projection.y_axis.y - 1.0 / 30f32.to_radians().tan()).abs() < EPS);
}

#[test]
fn test_projection_prefers_camera_aspect() {
    let camera = Camera { aspect_ratio: 2.0, ..Default::default() };
    let projection = camera.projection_matrix(0.5).unwrap();
    let expected = 1.0 / (2.0 * (30f32.to_radians()).tan());
    assert!((projection.x_axis.x - expected).abs() < EPS);
}

#[test]
fn test_projection_depth_range_is_zero_to_one() {
    let camera = Camera::default();
    let projection = camera.projection_matrix(1.0).unwrap();
    let near = projection.project_point3(Vec3::new(0.0, 0.0, -camera.near_plane));
    let far = projection.project_point3(Vec3::new(0.0, 0.0, -camera.far_plane));
    assert!((near.z - 0.0).abs() < 1e-4);
    assert!((far.z - 1.0).abs() < 1e-4);
}

#[test]
fn test_projection_rejects_invalid_lens() {
    let camera = Camera::default();
    assert!(camera.projection_matrix(0.0).is_err());
    assert!(camera.projection_matrix(f32::NAN).is_err());

    let flat = Camera { fov_y: 0.0, ..Default::default() };
    assert!(flat.projection_matrix(1.0).is_err());

    let inverted = Camera { near_plane: 10.0, far_plane: 1.0, ..Default::default() };
    assert!(inverted.projection_matrix(1.0).is_err());

    let zero_near = Camera { near_plane: 0.0, ..Default::default() };
    assert!(zero_near.projection_matrix(1.0).is_err());
}
