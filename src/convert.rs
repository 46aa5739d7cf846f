//! Rotation conversions between exponential maps, rotation matrices and
//! Euler angles.

use crate::{common::*, params};

/// Converts an exponential map (axis-angle) into a rotation matrix with
/// Rodrigues' formula.
pub fn expmap_to_rotmat(expmap: &Vector3<f64>) -> Matrix3<f64> {
    let theta = expmap.norm();
    let axis = expmap / (theta + f32::EPSILON as f64);
    let axis_skew = skew(&axis);

    Matrix3::identity()
        + axis_skew * theta.sin()
        + (axis_skew * axis_skew) * (1.0 - theta.cos())
}

/// Converts a rotation matrix into `[E1, E2, E3]` Euler angles.
///
/// When `R[0, 2]` is exactly ±1 the decomposition is degenerate; `E3` is
/// pinned to zero and the remaining rotation is folded into `E1`.
pub fn rotmat_to_euler(rotmat: &Matrix3<f64>) -> Vector3<f64> {
    let r02 = rotmat[(0, 2)];

    if r02 == 1.0 || r02 == -1.0 {
        let e3 = 0.0;
        let delta = rotmat[(0, 1)].atan2(r02);
        let (e1, e2) = if r02 == -1.0 {
            (e3 + delta, std::f64::consts::FRAC_PI_2)
        } else {
            (-e3 + delta, -std::f64::consts::FRAC_PI_2)
        };
        Vector3::new(e1, e2, e3)
    } else {
        let e2 = -r02.asin();
        let cos_e2 = e2.cos();
        let e1 = (rotmat[(1, 2)] / cos_e2).atan2(rotmat[(2, 2)] / cos_e2);
        let e3 = (rotmat[(0, 1)] / cos_e2).atan2(rotmat[(0, 0)] / cos_e2);
        Vector3::new(e1, e2, e3)
    }
}

pub fn expmap_to_euler(expmap: &Vector3<f64>) -> Vector3<f64> {
    rotmat_to_euler(&expmap_to_rotmat(expmap))
}

/// Rewrites every joint of every frame from exponential map to Euler angles.
/// The root position columns are left untouched.
pub fn pose_to_euler(frames: &mut Array2<f64>) -> Fallible<()> {
    ensure!(
        frames.ncols() >= params::POSE_DIM,
        "expect at least {} pose dimensions, but get {}",
        params::POSE_DIM,
        frames.ncols()
    );

    for mut frame in frames.rows_mut() {
        for begin in (params::JOINT_BEGIN..params::JOINT_END).step_by(params::EXPMAP_SIZE) {
            let mut joint = frame.slice_mut(s![begin..(begin + params::EXPMAP_SIZE)]);
            let euler = expmap_to_euler(&Vector3::new(joint[0], joint[1], joint[2]));
            joint[0] = euler[0];
            joint[1] = euler[1];
            joint[2] = euler[2];
        }
    }

    Ok(())
}

fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y, //
        v.z, 0.0, -v.x, //
        -v.y, v.x, 0.0,
    )
}
