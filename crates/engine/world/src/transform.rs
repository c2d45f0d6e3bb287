//! Authoritative object transform

use glam::Vec3;

/// Position, rotation and scale of a live object.
///
/// Rotation is stored as Euler angles in radians, matching what the GameSpec
/// document carries and what scripts read and write through the bridge. The
/// host side is the single source of truth; scripts only ever see marshalled
/// copies of these vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as Euler angles (radians)
    pub rotation: Vec3,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Transform {
    /// Create a transform at the given position with identity rotation and scale
    pub fn at_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scale_is_one() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn test_at_position() {
        let t = Transform::at_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.scale, Vec3::ONE);
    }
}
