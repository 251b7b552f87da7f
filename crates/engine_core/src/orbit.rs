//! Orbital mechanics: elliptical paths around the central star.
//!
//! Kepler-flavored: angular speed comes from ω = √(μ/a³), so inner bodies
//! orbit faster than outer ones without a physics integrator. Positions are
//! parametric ellipses; velocity is the analytic derivative, used by ships
//! to lead moving planets and by the combat AI to judge collision courses.

use glam::Vec2;

/// Gravitational constant × star mass in game units, chosen so a ≈ 400
/// gives a comfortable on-screen period. Kepler: ω = √(G·M / a³).
pub const GRAVITATIONAL_PARAM: f64 = 2.4e7;

/// Elliptical orbit description for one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitParams {
    /// Semi-major axis in game units.
    pub semi_major: f32,
    /// Semi-minor axis in game units.
    pub semi_minor: f32,
    /// Angle along the orbit at t = 0, in radians.
    pub phase: f32,
    /// Signed angular speed in radians per second; sign picks the orbit
    /// direction.
    pub angular_speed: f32,
    /// When set, the major axis runs vertically instead of horizontally.
    pub swap_axes: bool,
    /// Draw-order layer for presentation; no effect on motion.
    pub depth: u8,
}

impl OrbitParams {
    /// Circular orbit helper.
    pub fn circular(radius: f32, phase: f32, angular_speed: f32) -> Self {
        Self {
            semi_major: radius,
            semi_minor: radius,
            phase,
            angular_speed,
            swap_axes: false,
            depth: 0,
        }
    }

    /// Position relative to the orbit center after `time` seconds.
    pub fn position_at(&self, center: Vec2, time: f64) -> Vec2 {
        let theta = self.angle_at(time);
        let (x, y) = (self.semi_major * theta.cos(), self.semi_minor * theta.sin());
        if self.swap_axes {
            center + Vec2::new(y, x)
        } else {
            center + Vec2::new(x, y)
        }
    }

    /// Instantaneous velocity after `time` seconds (analytic derivative of
    /// the parametric ellipse).
    pub fn velocity_at(&self, time: f64) -> Vec2 {
        let theta = self.angle_at(time);
        let w = self.angular_speed;
        let (vx, vy) = (-self.semi_major * w * theta.sin(), self.semi_minor * w * theta.cos());
        if self.swap_axes {
            Vec2::new(vy, vx)
        } else {
            Vec2::new(vx, vy)
        }
    }

    /// Average of the two axes; good enough for spacing heuristics.
    pub fn mean_radius(&self) -> f32 {
        0.5 * (self.semi_major + self.semi_minor)
    }

    fn angle_at(&self, time: f64) -> f32 {
        (self.phase as f64 + time * self.angular_speed as f64)
            .rem_euclid(std::f64::consts::TAU) as f32
    }
}

/// Kepler angular speed for a given semi-major axis: ω = √(μ/a³).
pub fn angular_speed_for_radius(semi_major: f32) -> f32 {
    let a = semi_major.max(1.0) as f64;
    (GRAVITATIONAL_PARAM / (a * a * a)).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_position_stays_on_ellipse() {
        let orbit = OrbitParams {
            semi_major: 300.0,
            semi_minor: 240.0,
            phase: 0.7,
            angular_speed: 0.2,
            swap_axes: false,
            depth: 0,
        };
        for i in 0..24 {
            let p = orbit.position_at(Vec2::ZERO, i as f64 * 1.3);
            let e = (p.x / 300.0).powi(2) + (p.y / 240.0).powi(2);
            assert!((e - 1.0).abs() < 1e-4, "off ellipse at sample {i}: {e}");
        }
    }

    #[test]
    fn orbit_swap_axes_transposes_position() {
        let mut orbit = OrbitParams::circular(200.0, 0.3, 0.1);
        orbit.semi_minor = 120.0;
        let plain = orbit.position_at(Vec2::ZERO, 2.0);
        orbit.swap_axes = true;
        let swapped = orbit.position_at(Vec2::ZERO, 2.0);
        assert!((plain.x - swapped.y).abs() < 1e-5);
        assert!((plain.y - swapped.x).abs() < 1e-5);
    }

    #[test]
    fn orbit_velocity_matches_finite_difference() {
        let orbit = OrbitParams {
            semi_major: 350.0,
            semi_minor: 290.0,
            phase: 1.1,
            angular_speed: -0.15,
            swap_axes: true,
            depth: 2,
        };
        let t = 4.0;
        // h sized for f32 positions: small enough for accuracy, large
        // enough to dodge cancellation noise.
        let h = 0.1;
        let numeric = (orbit.position_at(Vec2::ZERO, t + h) - orbit.position_at(Vec2::ZERO, t - h))
            / (2.0 * h as f32);
        let analytic = orbit.velocity_at(t);
        assert!((numeric - analytic).length() < 1.0, "{numeric} vs {analytic}");
    }

    #[test]
    fn kepler_inner_orbits_are_faster() {
        let inner = angular_speed_for_radius(200.0);
        let outer = angular_speed_for_radius(800.0);
        assert!(inner > outer);
    }
}
