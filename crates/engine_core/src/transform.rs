//! Transform component for positioning in the 2D play field.

use glam::Vec2;

/// Position and facing of a simulation entity. Rotation is the facing angle
/// in radians, counter-clockwise from +X.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Unit vector the entity is facing.
    pub fn facing(&self) -> Vec2 {
        Vec2::new(self.rotation.cos(), self.rotation.sin())
    }

    /// Face toward a target position; no-op when coincident.
    pub fn look_at(&mut self, target: Vec2) {
        let to_target = target - self.position;
        if to_target.length_squared() > 1e-6 {
            self.rotation = to_target.y.atan2(to_target.x);
        }
    }

    /// Face along a direction vector; no-op on a degenerate direction.
    pub fn face_along(&mut self, dir: Vec2) {
        if dir.length_squared() > 1e-6 {
            self.rotation = dir.y.atan2(dir.x);
        }
    }

    /// Translate the transform by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_look_at_faces_target() {
        let mut t = Transform::from_position(Vec2::ZERO);
        t.look_at(Vec2::new(0.0, 5.0));
        assert!((t.rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        let f = t.facing();
        assert!(f.x.abs() < 1e-5 && (f.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn transform_look_at_degenerate_keeps_rotation() {
        let mut t = Transform::from_position(Vec2::new(3.0, 4.0));
        t.rotation = 1.25;
        t.look_at(Vec2::new(3.0, 4.0));
        assert_eq!(t.rotation, 1.25);
    }
}
