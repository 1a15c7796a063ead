//! Linear algebra aliases for the attitude and kinematics stages

use nalgebra::{UnitQuaternion, Vector3};

pub type Vec3 = Vector3<f64>;
pub type Quat = UnitQuaternion<f64>;

/// Standard gravity (m/s²), the scale between g and SI acceleration
pub const GRAVITY: f64 = 9.81;

/// Global-frame gravity direction (unit, z up)
#[inline]
pub fn gravity_up() -> Vec3 {
    Vec3::z()
}
