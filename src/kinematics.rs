// kinematics.rs: Global-frame acceleration to drift-corrected position
//
// Pass 1 integrates velocity and clamps it to zero on stationary samples
// (ZUPT). Pass 2 removes, per active segment, the linear velocity drift that
// accumulated by the segment's end. Position is the plain integral of the
// corrected velocity.

use crate::types::{gravity_up, ActiveSegment, Quat, Vec3, GRAVITY};

/// Body acceleration (g) rotated to the global frame with gravity removed, m/s².
pub fn global_linear_acceleration(attitudes: &[Quat], accel_g: &[Vec3]) -> Vec<Vec3> {
    let up = gravity_up();
    attitudes
        .iter()
        .zip(accel_g)
        .map(|(q, a)| (q * a - up) * GRAVITY)
        .collect()
}

/// Pass 1: cumulative velocity, forced to zero on stationary samples.
pub fn zupt_velocity(accel: &[Vec3], stationary: &[bool], dt: f64) -> Vec<Vec3> {
    let mut vel = Vec::with_capacity(accel.len());
    let mut v = Vec3::zeros();
    for (t, (a, &still)) in accel.iter().zip(stationary).enumerate() {
        if t > 0 {
            v += a * dt;
        }
        if still {
            v = Vec3::zeros();
        }
        vel.push(v);
    }
    vel
}

/// Pass 2: subtract a linear ramp per segment so velocity returns to zero.
///
/// For segment `(s, e)` the drift rate is `vel[e - 1] / (e - s)`, and sample
/// `s + k` loses `(k + 1) * rate`.
pub fn remove_drift(vel: &[Vec3], segments: &[ActiveSegment]) -> Vec<Vec3> {
    let mut corrected = vel.to_vec();
    for seg in segments {
        let len = seg.len();
        if len == 0 || seg.end > vel.len() {
            continue;
        }
        let rate = vel[seg.end - 1] / len as f64;
        for k in 0..len {
            corrected[seg.start + k] -= rate * (k + 1) as f64;
        }
    }
    corrected
}

/// Position by cumulative integration, starting at the origin.
pub fn integrate_position(vel: &[Vec3], dt: f64) -> Vec<Vec3> {
    let mut pos = Vec::with_capacity(vel.len());
    let mut p = Vec3::zeros();
    for (t, v) in vel.iter().enumerate() {
        if t > 0 {
            p += v * dt;
        }
        pos.push(p);
    }
    pos
}

/// Full ZUPT pipeline; returns global-frame position per sample.
pub struct KinematicIntegrator {
    dt: f64,
}

impl KinematicIntegrator {
    pub fn new(dt: f64) -> Self {
        Self { dt }
    }

    pub fn position(
        &self,
        attitudes: &[Quat],
        accel_g: &[Vec3],
        stationary: &[bool],
        segments: &[ActiveSegment],
    ) -> Vec<Vec3> {
        let acc = global_linear_acceleration(attitudes, accel_g);
        let vel = zupt_velocity(&acc, stationary, self.dt);
        let vel = if segments.is_empty() {
            vel
        } else {
            remove_drift(&vel, segments)
        };
        integrate_position(&vel, self.dt)
    }
}
