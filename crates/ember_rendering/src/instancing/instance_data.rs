//! Instance data structures for GPU upload.

use bytemuck::{Pod, Zeroable};

/// Per-instance transform for one body part of one entity.
///
/// Uploaded verbatim to the part's instance buffer. 16-byte aligned rows.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform {
    /// World position (x, y, z) + uniform scale in w.
    pub position_scale: [f32; 4],
    /// Yaw, pitch, roll in radians, w unused.
    pub rotation: [f32; 4],
    /// RGBA tint.
    pub tint: [f32; 4],
}

impl InstanceTransform {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Zero-scale transform for unused slots. Draws nothing.
    pub const HIDDEN: Self = Self {
        position_scale: [0.0; 4],
        rotation: [0.0; 4],
        tint: [0.0; 4],
    };

    /// Creates a transform.
    #[must_use]
    pub const fn new(position: [f32; 3], scale: f32, yaw: f32, pitch: f32, tint: [f32; 4]) -> Self {
        Self {
            position_scale: [position[0], position[1], position[2], scale],
            rotation: [yaw, pitch, 0.0, 0.0],
            tint,
        }
    }

    /// Uniform scale.
    #[inline]
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.position_scale[3]
    }

    /// True for the zero-scale placeholder.
    #[inline]
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.scale() == 0.0
    }
}

/// Body parts drawn for every avatar. One instance buffer each, all sharing
/// the same slot index per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BodyPart {
    /// Torso
    Body = 0,
    /// Head
    Head = 1,
    /// Left arm
    LeftArm = 2,
    /// Right arm, also swings on attack
    RightArm = 3,
    /// Left leg
    LeftLeg = 4,
    /// Right leg
    RightLeg = 5,
}

impl BodyPart {
    /// Number of parts.
    pub const COUNT: usize = 6;

    /// Every part, in buffer order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Body,
        Self::Head,
        Self::LeftArm,
        Self::RightArm,
        Self::LeftLeg,
        Self::RightLeg,
    ];

    /// Buffer index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Offset from the entity origin: (sideways, up). Positive side is right.
    #[must_use]
    pub const fn mount(self) -> (f32, f32) {
        match self {
            Self::Body => (0.0, 1.0),
            Self::Head => (0.0, 1.7),
            Self::LeftArm => (-0.4, 1.3),
            Self::RightArm => (0.4, 1.3),
            Self::LeftLeg => (-0.2, 0.5),
            Self::RightLeg => (0.2, 0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_size() {
        assert_eq!(InstanceTransform::SIZE, 48);
    }

    #[test]
    fn test_hidden_is_zeroed() {
        assert!(InstanceTransform::HIDDEN.is_hidden());
        assert_eq!(InstanceTransform::HIDDEN, InstanceTransform::zeroed());
    }

    #[test]
    fn test_part_indices_are_dense() {
        for (i, part) in BodyPart::ALL.iter().enumerate() {
            assert_eq!(part.index(), i);
        }
    }
}
